//! Event loop and handle for running a [`Synchronizer`] in its own task.
//!
//! The synchronizer owns its session exclusively, so other tasks talk to it
//! through [`Command`]s and watch its snapshots. The loop multiplexes four
//! inputs: commands, confirmation events, poll outcomes, and the shutdown
//! signal. On exit it tears the synchronizer down.

use aim_types::{AccountAddress, CompletionRecord, ConfirmationEvent, RequestId};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{SubmitError, SyncError};
use crate::session::{Session, SessionId};
use crate::synchronizer::Synchronizer;

/// A request to the synchronizer task.
#[derive(Debug)]
pub enum Command {
    Submit {
        text: String,
        reply: oneshot::Sender<Result<SessionId, SubmitError>>,
    },
    Refresh {
        reply: oneshot::Sender<Result<CompletionRecord, SyncError>>,
    },
    Lookup {
        request_id: RequestId,
        reply: oneshot::Sender<Result<CompletionRecord, SyncError>>,
    },
    SetAccount(Option<AccountAddress>),
    Teardown,
}

/// Cloneable handle to a running synchronizer.
#[derive(Clone)]
pub struct SyncHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Option<Session>>,
}

impl SyncHandle {
    pub async fn submit(&self, text: impl Into<String>) -> Result<SessionId, SubmitError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Submit {
                text: text.into(),
                reply,
            })
            .await
            .map_err(|_| SubmitError::Stopped)?;
        rx.await.map_err(|_| SubmitError::Stopped)?
    }

    pub async fn refresh(&self) -> Result<CompletionRecord, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Refresh { reply }).await?;
        rx.await.map_err(|_| SyncError::Stopped)?
    }

    pub async fn lookup(&self, request_id: RequestId) -> Result<CompletionRecord, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Lookup { request_id, reply }).await?;
        rx.await.map_err(|_| SyncError::Stopped)?
    }

    pub async fn set_account(&self, account: Option<AccountAddress>) -> Result<(), SyncError> {
        self.send(Command::SetAccount(account)).await
    }

    pub async fn teardown(&self) -> Result<(), SyncError> {
        self.send(Command::Teardown).await
    }

    /// The latest published session.
    pub fn snapshot(&self) -> Option<Session> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.snapshots.clone()
    }

    /// Wait until the published session satisfies `pred`.
    pub async fn wait_until(
        &self,
        mut pred: impl FnMut(&Session) -> bool,
    ) -> Result<Session, SyncError> {
        let mut rx = self.snapshots.clone();
        let current = rx
            .wait_for(|s| s.as_ref().is_some_and(&mut pred))
            .await
            .map_err(|_| SyncError::Stopped)?;
        (*current).clone().ok_or(SyncError::NoSession)
    }

    async fn send(&self, command: Command) -> Result<(), SyncError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SyncError::Stopped)
    }
}

impl Synchronizer {
    /// Move the synchronizer into a task and return a handle to it.
    pub fn spawn(
        self,
        confirmations: mpsc::Receiver<ConfirmationEvent>,
        shutdown: broadcast::Receiver<()>,
    ) -> (SyncHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::channel(self.config().command_buffer.max(1));
        let handle = SyncHandle {
            commands: commands_tx,
            snapshots: self.subscribe(),
        };
        let task = tokio::spawn(self.run(commands_rx, confirmations, shutdown));
        (handle, task)
    }

    /// Process inputs until shutdown or until every command sender is gone.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut confirmations: mpsc::Receiver<ConfirmationEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        info!("synchronizer started");
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("synchronizer shutting down");
                    break;
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("all handles dropped");
                        break;
                    }
                },
                Some(event) = confirmations.recv() => {
                    self.handle_confirmation(&event);
                }
                Some(outcome) = self.outcome_rx.recv() => {
                    self.handle_poll_outcome(outcome);
                }
            }
        }
        self.teardown();
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit { text, reply } => {
                let _ = reply.send(self.submit_proposal(&text).await);
            }
            Command::Refresh { reply } => {
                let _ = reply.send(self.refresh().await);
            }
            Command::Lookup { request_id, reply } => {
                let _ = reply.send(self.lookup(request_id).await);
            }
            Command::SetAccount(account) => self.set_account(account),
            Command::Teardown => self.teardown(),
        }
    }
}
