//! Optimistic board reconciler.
//!
//! A [`Board`] owns the locally displayed tree of one project. Moves are applied
//! to that tree at once and persisted afterwards; if persisting fails the local
//! tree is thrown away and the project is fetched again.
//!
//! # States
//!
//! ```text
//! Loading ──fetch ok──> Synced(tree) ──stage──> Pending(tree', gen)
//!    │                     ^   ^                   │   │
//!    └──fetch err──> Unavailable   └──persist ok───┘   │
//!                          ^   └──persist err, refetch ok─┘
//!                          └──────persist err, refetch err
//! ```
//!
//! Every staged move bumps a generation counter. Only the newest generation may
//! settle the board: an older request finishing late never marks the board
//! `Synced`, and a failed older request leaves the recovery fetch to whichever
//! move is newest when it settles.
//!
//! Readers observe the state through a [`watch::Receiver`], so they see whole
//! trees only. Aggregate views (task counts) listen on [`Board::events`].

pub mod render;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use trackboard_core::board::{apply_move, check_layout};

pub use trackboard_core::board::Locator;

use crate::models::{CreateTaskInput, Project, Task, TaskPlacement};

const EVENT_CHANNEL_SIZE: usize = 64;

/// The remote operations a board needs.
#[async_trait]
pub trait BoardApi: Send + Sync {
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Fetch the whole project tree.
    async fn fetch_project(&self, id: Uuid) -> Result<Project, Self::Error>;

    /// Persist a batch of task placements.
    async fn reorder(&self, placements: &[TaskPlacement]) -> Result<(), Self::Error>;

    async fn create_task(&self, input: &CreateTaskInput) -> Result<Task, Self::Error>;
}

/// What the board currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardState {
    /// Nothing fetched yet.
    Loading,
    /// The tree as last confirmed by the server.
    Synced(Arc<Project>),
    /// A local draft whose newest move (`generation`) is not yet confirmed.
    Pending {
        project: Arc<Project>,
        generation: u64,
    },
    /// The project could not be fetched.
    Unavailable,
}

impl BoardState {
    /// The tree to render, if there is one.
    pub fn project(&self) -> Option<&Arc<Project>> {
        match self {
            Self::Synced(project) | Self::Pending { project, .. } => Some(project),
            Self::Loading | Self::Unavailable => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Notifications for views that depend on a board without rendering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A task was created; anything showing task counts should refresh.
    TaskCountChanged { project_id: Uuid },
    /// The local tree was replaced with a fresh copy from the server.
    Resynced { project_id: Uuid },
    /// The project could not be fetched.
    Unavailable { project_id: Uuid },
}

/// How a move ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing to do: identical locators, unknown column, bad index, or no board.
    Skipped,
    /// The server accepted the move and the board is `Synced`.
    Persisted,
    /// A newer move was staged before this one settled; that one decides.
    Superseded,
    /// Persisting failed and the board was replaced with server truth.
    Resynced,
    /// Persisting failed and the recovery fetch failed too.
    Unavailable,
}

/// A move applied locally and waiting to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedMove {
    pub generation: u64,
    pub task_id: Uuid,
    pub placements: Vec<TaskPlacement>,
}

/// The reconciler for one project's board.
pub struct Board<A> {
    api: A,
    project_id: Uuid,
    state: watch::Sender<BoardState>,
    events: broadcast::Sender<BoardEvent>,
    /// Generation of the newest staged move. Only touched under the state lock.
    latest: AtomicU64,
    /// Set when a failure was deferred to a newer move.
    resync_due: AtomicBool,
}

impl<A: BoardApi> Board<A> {
    pub fn new(api: A, project_id: Uuid) -> Self {
        let (state, _) = watch::channel(BoardState::Loading);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            api,
            project_id,
            state,
            events,
            latest: AtomicU64::new(0),
            resync_due: AtomicBool::new(false),
        }
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> BoardState {
        self.state.borrow().clone()
    }

    /// The tree to render, if there is one.
    pub fn project(&self) -> Option<Arc<Project>> {
        self.state.borrow().project().cloned()
    }

    /// Follow state changes.
    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.state.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Fetch the project and replace whatever the board holds.
    ///
    /// Returns `false` if the board ended up `Unavailable`.
    pub async fn load(&self) -> bool {
        self.resync_due.store(false, Ordering::SeqCst);
        !matches!(self.resync(None).await, Some(MoveOutcome::Unavailable))
    }

    /// Stage and persist a move. Never fails; see [`MoveOutcome`].
    pub async fn move_task(&self, source: Locator, destination: Locator) -> MoveOutcome {
        match self.stage_move(source, destination) {
            Some(staged) => self.persist(staged).await,
            None => MoveOutcome::Skipped,
        }
    }

    /// Apply a move to the local tree without contacting the server.
    ///
    /// Returns `None` when the move is a no-op; nothing is staged and nothing
    /// needs persisting. Otherwise the board is `Pending` when this returns.
    pub fn stage_move(&self, source: Locator, destination: Locator) -> Option<StagedMove> {
        let mut staged = None;

        self.state.send_if_modified(|state| {
            let Some(current) = state.project() else {
                return false;
            };
            let Some(plan) = apply_move(current, source, destination) else {
                return false;
            };

            let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = BoardState::Pending {
                project: Arc::new(plan.project),
                generation,
            };
            staged = Some(StagedMove {
                generation,
                task_id: plan.task_id,
                placements: plan.placements,
            });
            true
        });

        match &staged {
            Some(s) => tracing::debug!(
                project_id = %self.project_id,
                task_id = %s.task_id,
                generation = s.generation,
                placements = s.placements.len(),
                "Staged move"
            ),
            None => tracing::trace!(project_id = %self.project_id, "Move skipped"),
        }
        staged
    }

    /// Send a staged move to the server and settle the board.
    pub async fn persist(&self, staged: StagedMove) -> MoveOutcome {
        match self.api.reorder(&staged.placements).await {
            Ok(()) => self.settle_success(staged.generation).await,
            Err(e) => {
                tracing::warn!(
                    project_id = %self.project_id,
                    generation = staged.generation,
                    "Failed to reorder tasks: {}",
                    e
                );
                self.settle_failure(staged.generation).await
            }
        }
    }

    /// Create a task in `input.column_id`, then re-fetch the whole board.
    ///
    /// A blank title is ignored (`Ok(None)`, no request). The created task is
    /// never inserted locally; the server's tree replaces the board instead.
    pub async fn create_task(&self, mut input: CreateTaskInput) -> Result<Option<Task>, A::Error> {
        let title = input.title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        input.title = title.to_string();

        let task = match self.api.create_task(&input).await {
            Ok(task) => task,
            Err(e) => {
                tracing::warn!(project_id = %self.project_id, "Failed to create task: {}", e);
                return Err(e);
            }
        };

        self.resync(None).await;
        self.emit(BoardEvent::TaskCountChanged {
            project_id: self.project_id,
        });
        Ok(Some(task))
    }

    async fn settle_success(&self, generation: u64) -> MoveOutcome {
        let mut newest = false;
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != generation {
                return false;
            }
            newest = true;
            if self.resync_due.load(Ordering::SeqCst) {
                return false;
            }
            match state {
                BoardState::Pending { project, .. } => {
                    let project = Arc::clone(project);
                    *state = BoardState::Synced(project);
                    true
                }
                _ => {
                    // Something replaced the draft while this move was in
                    // flight; that tree may predate the move.
                    self.resync_due.store(true, Ordering::SeqCst);
                    false
                }
            }
        });

        if !newest {
            return MoveOutcome::Superseded;
        }

        if self.resync_due.swap(false, Ordering::SeqCst) {
            // An earlier move failed, or a fetch was dropped, while this one
            // was in flight. The local tree may not match the server.
            return self
                .resync(Some(generation))
                .await
                .unwrap_or(MoveOutcome::Superseded);
        }
        MoveOutcome::Persisted
    }

    async fn settle_failure(&self, generation: u64) -> MoveOutcome {
        if self.latest.load(Ordering::SeqCst) != generation {
            self.resync_due.store(true, Ordering::SeqCst);
            return MoveOutcome::Superseded;
        }
        self.resync_due.store(false, Ordering::SeqCst);
        self.resync(Some(generation))
            .await
            .unwrap_or(MoveOutcome::Superseded)
    }

    /// Replace the board with a fresh fetch.
    ///
    /// `settling` is the generation of the move whose request just finished,
    /// if any. A `Pending` draft for any other generation still has a request
    /// in flight, so the fetch may predate it. The result is then dropped,
    /// as it is when a move was staged while fetching, and the newest move
    /// re-fetches when it settles. Returns `None` in both cases.
    async fn resync(&self, settling: Option<u64>) -> Option<MoveOutcome> {
        let started = self.latest.load(Ordering::SeqCst);
        let fetched = self.api.fetch_project(self.project_id).await;

        let mut outcome = None;
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != started {
                return false;
            }
            if let BoardState::Pending { generation, .. } = state {
                if settling != Some(*generation) {
                    return false;
                }
            }
            *state = match fetched {
                Ok(project) => {
                    if let Err(violation) = check_layout(&project) {
                        tracing::warn!(
                            project_id = %self.project_id,
                            "Server returned an inconsistent board: {}",
                            violation
                        );
                    }
                    outcome = Some(MoveOutcome::Resynced);
                    BoardState::Synced(Arc::new(project))
                }
                Err(e) => {
                    tracing::error!(
                        project_id = %self.project_id,
                        "Failed to fetch project: {}",
                        e
                    );
                    outcome = Some(MoveOutcome::Unavailable);
                    BoardState::Unavailable
                }
            };
            true
        });

        match outcome {
            Some(MoveOutcome::Resynced) => {
                tracing::info!(project_id = %self.project_id, "Board resynced");
                self.emit(BoardEvent::Resynced {
                    project_id: self.project_id,
                });
            }
            Some(MoveOutcome::Unavailable) => self.emit(BoardEvent::Unavailable {
                project_id: self.project_id,
            }),
            _ => {
                self.resync_due.store(true, Ordering::SeqCst);
                tracing::debug!(project_id = %self.project_id, "Dropped stale fetch");
            }
        }
        outcome
    }

    fn emit(&self, event: BoardEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}
