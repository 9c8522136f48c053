//! The posted task board: shared jobs several agents can work on at once.
//!
//! A posting tracks its own worker list and progress independently of any
//! agent's active task. Postings stay in posting order, which is the
//! tie-break when several are equally close.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use colony_types::{AgentId, PostedTaskId, PostingState, Position, ResourceId, TaskData};

/// A job on the board plus its runtime state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedTask {
    id: PostedTaskId,
    data: TaskData,
    owner: ResourceId,
    state: PostingState,
    workers: Vec<AgentId>,
    progress: f32,
}

impl PostedTask {
    /// Identifier.
    pub const fn id(&self) -> PostedTaskId {
        self.id
    }

    /// What the job is.
    pub const fn data(&self) -> &TaskData {
        &self.data
    }

    /// The world object that posted the job and is responsible for
    /// removing it.
    pub const fn owner(&self) -> ResourceId {
        self.owner
    }

    /// Current posting state.
    pub const fn state(&self) -> PostingState {
        self.state
    }

    /// Agents currently assigned.
    pub fn workers(&self) -> &[AgentId] {
        &self.workers
    }

    /// Number of agents currently assigned.
    pub fn worker_count(&self) -> u32 {
        u32::try_from(self.workers.len()).unwrap_or(u32::MAX)
    }

    /// Work accumulated so far.
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether `agent` is assigned.
    pub fn has_worker(&self, agent: AgentId) -> bool {
        self.workers.contains(&agent)
    }

    fn open_state(&self) -> PostingState {
        if self.workers.is_empty() {
            PostingState::Available
        } else if self.worker_count() >= self.data.max_workers {
            PostingState::Full
        } else {
            PostingState::InProgress
        }
    }
}

/// Shared pool of posted jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostedTaskBoard {
    postings: Vec<PostedTask>,
}

impl PostedTaskBoard {
    /// Create an empty board.
    pub const fn new() -> Self {
        Self {
            postings: Vec::new(),
        }
    }

    /// Post a job. It starts `Available` with no workers.
    pub fn post(&mut self, data: TaskData, owner: ResourceId) -> PostedTaskId {
        let id = PostedTaskId::new();
        debug!(posted = %id, kind = ?data.kind, max_workers = data.max_workers, "Task posted");
        self.postings.push(PostedTask {
            id,
            data,
            owner,
            state: PostingState::Available,
            workers: Vec::new(),
            progress: 0.0,
        });
        id
    }

    /// Look up a posting.
    pub fn get(&self, id: PostedTaskId) -> Option<&PostedTask> {
        self.postings.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: PostedTaskId) -> Option<&mut PostedTask> {
        self.postings.iter_mut().find(|p| p.id == id)
    }

    /// Posting owned by `owner`, if any is still open.
    pub fn find_by_owner(&self, owner: ResourceId) -> Option<&PostedTask> {
        self.postings
            .iter()
            .find(|p| p.owner == owner && !p.state.is_closed())
    }

    /// Add `agent` as a worker.
    ///
    /// Fails for unknown, full, completed, or cancelled postings. An agent
    /// already assigned is accepted again without counting twice.
    pub fn try_assign(&mut self, id: PostedTaskId, agent: AgentId) -> bool {
        let Some(posting) = self.get_mut(id) else {
            return false;
        };
        if posting.has_worker(agent) {
            return true;
        }
        if !posting.state.accepts_workers() || posting.worker_count() >= posting.data.max_workers {
            debug!(posted = %id, agent = %agent, state = ?posting.state, "Posting rejected worker");
            return false;
        }
        posting.workers.push(agent);
        posting.state = posting.open_state();
        debug!(
            posted = %id,
            agent = %agent,
            workers = posting.worker_count(),
            state = ?posting.state,
            "Worker joined posting"
        );
        true
    }

    /// Remove `agent` from the worker list. Returns `false` if it was not
    /// assigned. Closed postings keep their state.
    pub fn release(&mut self, id: PostedTaskId, agent: AgentId) -> bool {
        let Some(posting) = self.get_mut(id) else {
            return false;
        };
        let before = posting.workers.len();
        posting.workers.retain(|w| *w != agent);
        if posting.workers.len() == before {
            return false;
        }
        if !posting.state.is_closed() {
            posting.state = posting.open_state();
        }
        debug!(posted = %id, agent = %agent, state = ?posting.state, "Worker left posting");
        true
    }

    /// Remove `agent` from every posting. Returns the postings it left.
    pub fn release_agent(&mut self, agent: AgentId) -> Vec<PostedTaskId> {
        let ids: Vec<PostedTaskId> = self
            .postings
            .iter()
            .filter(|p| p.has_worker(agent))
            .map(|p| p.id)
            .collect();
        for id in &ids {
            self.release(*id, agent);
        }
        ids
    }

    /// Accumulate `amount` work. Returns `true` if this call completed
    /// the posting.
    pub fn advance(&mut self, id: PostedTaskId, amount: f32) -> bool {
        let Some(posting) = self.get_mut(id) else {
            return false;
        };
        if posting.state.is_closed() {
            warn!(posted = %id, state = ?posting.state, "Work applied to closed posting");
            return false;
        }
        posting.progress = (posting.progress + amount.max(0.0)).min(posting.data.required_work);
        if posting.progress >= posting.data.required_work {
            posting.state = PostingState::Completed;
            debug!(posted = %id, "Posting completed");
            return true;
        }
        false
    }

    /// Mark a posting completed regardless of progress (the owning object
    /// finished by other means).
    pub fn complete(&mut self, id: PostedTaskId) -> bool {
        match self.get_mut(id) {
            Some(posting) if !posting.state.is_closed() => {
                posting.state = PostingState::Completed;
                true
            }
            _ => false,
        }
    }

    /// Cancel a posting. Returns the workers that were assigned so the
    /// caller can cancel their tasks.
    pub fn cancel(&mut self, id: PostedTaskId) -> Vec<AgentId> {
        let Some(posting) = self.get_mut(id) else {
            return Vec::new();
        };
        if posting.state.is_closed() {
            return Vec::new();
        }
        posting.state = PostingState::Cancelled;
        debug!(posted = %id, workers = posting.workers.len(), "Posting cancelled");
        posting.workers.clone()
    }

    /// Nearest posting that accepts another worker. Ties go to the
    /// earliest posting.
    pub fn find_available(&self, position: Position) -> Option<&PostedTask> {
        let mut best: Option<(&PostedTask, f32)> = None;
        for posting in &self.postings {
            if !posting.state.accepts_workers() {
                continue;
            }
            let distance = position.distance(posting.data.target);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((posting, distance));
            }
        }
        best.map(|(p, _)| p)
    }

    /// Drop completed and cancelled postings, returning them.
    pub fn remove_closed(&mut self) -> Vec<PostedTask> {
        let (closed, open): (Vec<_>, Vec<_>) = core::mem::take(&mut self.postings)
            .into_iter()
            .partition(|p| p.state.is_closed());
        self.postings = open;
        closed
    }

    /// All postings in posting order.
    pub fn iter(&self) -> impl Iterator<Item = &PostedTask> {
        self.postings.iter()
    }

    /// Number of postings.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Whether the board is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}
