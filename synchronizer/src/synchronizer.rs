//! The lifecycle synchronizer.

use aim_gateway::{ReadGateway, WriteGateway};
use aim_types::{AccountAddress, CompletionRecord, ConfirmationEvent, RequestId, Wei};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::config::SyncConfig;
use crate::context::AccountContext;
use crate::correlation::{CorrelationKey, CorrelationTable};
use crate::error::{SubmitError, SyncError};
use crate::poller::{PollOutcome, PollTimer};
use crate::session::{Phase, Session, SessionId};

type AbandonListener = Box<dyn Fn(&Session) + Send + Sync>;

/// Owns the current submission session and drives it to completion.
///
/// All state changes happen through `&mut self`, so the synchronizer is
/// meant to sit inside one task (see [`Synchronizer::run`]). Readers observe
/// sessions through [`Synchronizer::subscribe`].
///
/// A new submission replaces the previous session outright: its poll timer is
/// cancelled, its pending correlation is dropped, and any poll outcome still
/// in flight for it is discarded on arrival.
pub struct Synchronizer {
    config: SyncConfig,
    context: AccountContext,
    read: Arc<dyn ReadGateway>,
    write: Arc<dyn WriteGateway>,
    session: Option<Session>,
    next_session: u64,
    correlations: CorrelationTable,
    poll_timer: Option<PollTimer>,
    poll_generation: u64,
    outcome_tx: mpsc::Sender<PollOutcome>,
    pub(crate) outcome_rx: mpsc::Receiver<PollOutcome>,
    snapshot_tx: watch::Sender<Option<Session>>,
    abandon_listeners: Vec<AbandonListener>,
}

impl Synchronizer {
    pub fn new(
        config: SyncConfig,
        context: AccountContext,
        read: Arc<dyn ReadGateway>,
        write: Arc<dyn WriteGateway>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(config.outcome_buffer.max(1));
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            config,
            context,
            read,
            write,
            session: None,
            next_session: 1,
            correlations: CorrelationTable::new(),
            poll_timer: None,
            poll_generation: 0,
            outcome_tx,
            outcome_rx,
            snapshot_tx,
            abandon_listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn context(&self) -> &AccountContext {
        &self.context
    }

    /// Switch the connected account. Sessions already in flight keep the
    /// account they were submitted from.
    pub fn set_account(&mut self, account: Option<AccountAddress>) {
        info!(account = ?account.as_ref().map(AccountAddress::as_str), "connected account changed");
        self.context.set_account(account);
    }

    /// The current session, if any submission has been accepted for processing.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Phase of the current session, `Idle` when there is none.
    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    /// Receive a snapshot of the session after every change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.snapshot_tx.subscribe()
    }

    /// Register a listener invoked when a session is abandoned.
    pub fn on_abandon(&mut self, listener: impl Fn(&Session) + Send + Sync + 'static) {
        self.abandon_listeners.push(Box::new(listener));
    }

    /// Whether a poll timer is currently running.
    pub fn is_polling(&self) -> bool {
        self.poll_timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Submit `text` for evaluation from the connected account.
    ///
    /// Preconditions (non-empty text, connected account, a non-empty
    /// constitution) are checked before anything else; if one fails nothing
    /// changes and no session is created. Otherwise the fee is read from the
    /// current estimate, the previous session is superseded, and exactly one
    /// write is issued. On acceptance the session waits for its confirmation event; on
    /// rejection it ends in `Errored`.
    pub async fn submit_proposal(&mut self, text: &str) -> Result<SessionId, SubmitError> {
        if text.is_empty() {
            return Err(SubmitError::EmptyProposal);
        }
        let account = self
            .context
            .account()
            .cloned()
            .ok_or(SubmitError::NoAccount)?;

        let constitution_set = self
            .read
            .constitution_set()
            .await
            .map_err(SubmitError::PreconditionRead)?;
        if !constitution_set {
            return Err(SubmitError::ConstitutionNotSet);
        }
        let constitution = self
            .read
            .constitution()
            .await
            .map_err(SubmitError::PreconditionRead)?;
        if constitution.is_empty() {
            return Err(SubmitError::ConstitutionNotSet);
        }

        let fee = self
            .read
            .estimate_fee()
            .await
            .map_err(SubmitError::PreconditionRead)?;

        let id = self.begin_session(account.clone(), text.to_string(), fee);
        info!(session = %id, account = %account, %fee, "submitting proposal");

        match self.write.evaluate_proposal(&account, text, fee).await {
            Ok(receipt) => {
                let tx_hash = receipt.tx_hash.clone();
                self.update_session(id, |s| s.accept(receipt));
                self.correlations
                    .register(CorrelationKey::new(account, text), id);
                info!(session = %id, %tx_hash, "submission accepted, awaiting request id");
                Ok(id)
            }
            Err(e) => {
                warn!(session = %id, "submission rejected: {e}");
                self.update_session(id, |s| s.fail(e.to_string()));
                Err(SubmitError::Rejected(e))
            }
        }
    }

    /// Offer a `ProposalSubmitted` event to the current session.
    ///
    /// Binds the event's request id and starts polling only if the event's
    /// proposer and proposal text both equal the pending submission's. Any
    /// other event is ignored. Returns whether the event was bound.
    pub fn handle_confirmation(&mut self, event: &ConfirmationEvent) -> bool {
        let Some(id) = self.correlations.take_match(event) else {
            trace!(request_id = %event.request_id, proposer = %event.proposer, "ignoring unrelated confirmation");
            return false;
        };

        let is_current = self
            .session
            .as_ref()
            .is_some_and(|s| s.id == id && s.phase == Phase::AwaitingIdentifier);
        if !is_current {
            debug!(session = %id, request_id = %event.request_id, "confirmation for stale session");
            return false;
        }

        self.update_session(id, |s| s.bind(event.request_id));
        info!(session = %id, request_id = %event.request_id, "request id bound, polling for result");
        self.start_polling(id, event.request_id);
        true
    }

    /// Apply a timer-driven read.
    ///
    /// Outcomes from a cancelled timer or a superseded session are dropped.
    /// Read failures are logged and polling continues at the next interval.
    pub fn handle_poll_outcome(&mut self, outcome: PollOutcome) {
        let active = self
            .poll_timer
            .as_ref()
            .is_some_and(|t| t.generation() == outcome.generation && t.session() == outcome.session);
        if !active {
            debug!(
                session = %outcome.session,
                generation = outcome.generation,
                "dropping poll outcome from inactive timer"
            );
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.phase != Phase::Polling {
            return;
        }
        session.poll_attempts = outcome.attempt;

        match outcome.result {
            Ok(record) => self.apply_record(outcome.session, record),
            Err(e) => {
                warn!(
                    session = %outcome.session,
                    request_id = %outcome.request_id,
                    attempt = outcome.attempt,
                    "result read failed, retrying next interval: {e}"
                );
                self.publish();
            }
        }

        self.check_attempt_limit(outcome.session);
    }

    /// Read the bound request's result once, right now.
    ///
    /// A completed session answers from its cached record without reading.
    /// Failures are returned to the caller rather than swallowed.
    pub async fn refresh(&mut self) -> Result<CompletionRecord, SyncError> {
        let session = self.session.as_ref().ok_or(SyncError::NoSession)?;
        let request_id = session.request_id.ok_or(SyncError::NoBoundRequest)?;
        let id = session.id;

        match session.phase {
            Phase::Completed => {
                if let Some(record) = session.record.clone() {
                    return Ok(record);
                }
            }
            Phase::Polling => {}
            from => {
                return Err(SyncError::InvalidTransition {
                    from,
                    action: "refresh",
                })
            }
        }

        let record = self.read.proposal_result(request_id).await?;
        if self.phase() == Phase::Polling && self.session.as_ref().is_some_and(|s| s.id == id) {
            self.apply_record(id, record.clone());
        }
        Ok(record)
    }

    /// Read any request's result without touching the session.
    pub async fn lookup(&self, request_id: RequestId) -> Result<CompletionRecord, SyncError> {
        Ok(self.read.proposal_result(request_id).await?)
    }

    /// Stop all background work for the current session. The last snapshot
    /// stays readable.
    pub fn teardown(&mut self) {
        self.cancel_polling();
        self.correlations.clear();
        debug!("synchronizer torn down");
    }

    /// Wait for the next poll outcome and apply it.
    pub async fn process_next_outcome(&mut self) {
        if let Some(outcome) = self.outcome_rx.recv().await {
            self.handle_poll_outcome(outcome);
        }
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn begin_session(&mut self, account: AccountAddress, proposal: String, fee: Wei) -> SessionId {
        if let Some(previous) = self.session.as_ref() {
            debug!(session = %previous.id, phase = %previous.phase, "superseding session");
            self.correlations.remove_session(previous.id);
        }
        self.cancel_polling();

        let id = SessionId::new(self.next_session);
        self.next_session += 1;
        self.session = Some(Session::submitting(id, account, proposal, fee));
        self.publish();
        id
    }

    fn start_polling(&mut self, session: SessionId, request_id: RequestId) {
        self.cancel_polling();
        self.poll_generation += 1;
        self.poll_timer = Some(PollTimer::start(
            session,
            self.poll_generation,
            request_id,
            Arc::clone(&self.read),
            self.config.poll_interval(),
            self.config.max_poll_attempts,
            self.outcome_tx.clone(),
        ));
    }

    fn cancel_polling(&mut self) {
        if let Some(timer) = self.poll_timer.take() {
            timer.cancel();
        }
    }

    fn apply_record(&mut self, id: SessionId, record: CompletionRecord) {
        let Some(session) = self.session.as_mut().filter(|s| s.id == id) else {
            return;
        };

        // A read that lands before inclusion returns the contract's zero value.
        if !record.proposal.is_empty() && record.proposal != session.proposal {
            warn!(
                session = %id,
                request_id = %record.request_id,
                "bound request holds a different proposal, giving up"
            );
            let reason = format!(
                "request {} holds a different proposal than the one submitted",
                record.request_id
            );
            self.cancel_polling();
            self.update_session(id, |s| s.fail(reason));
            return;
        }

        let request_id = record.request_id;
        let applied = session.apply_record(record);
        let decision = session.decision();
        match applied {
            Ok(true) => {
                self.cancel_polling();
                info!(session = %id, %request_id, ?decision, "evaluation completed");
            }
            Ok(false) => trace!(session = %id, %request_id, "evaluation still pending"),
            Err(e) => warn!(session = %id, "dropping read result: {e}"),
        }
        self.publish();
    }

    fn check_attempt_limit(&mut self, id: SessionId) {
        let Some(max) = self.config.max_poll_attempts else {
            return;
        };
        let exhausted = self
            .session
            .as_ref()
            .is_some_and(|s| s.id == id && s.phase == Phase::Polling && s.poll_attempts >= max);
        if !exhausted {
            return;
        }

        self.cancel_polling();
        self.update_session(id, |s| s.abandon());
        warn!(session = %id, attempts = max, "poll attempt limit reached, session abandoned");
        if let Some(session) = self.session.as_ref() {
            for listener in &self.abandon_listeners {
                listener(session);
            }
        }
    }

    /// Apply a transition to the session `id` and publish the result.
    fn update_session(
        &mut self,
        id: SessionId,
        transition: impl FnOnce(&mut Session) -> Result<(), SyncError>,
    ) {
        let Some(session) = self.session.as_mut().filter(|s| s.id == id) else {
            debug!(session = %id, "transition for superseded session ignored");
            return;
        };
        if let Err(e) = transition(session) {
            warn!(session = %id, "invalid transition: {e}");
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.session.clone());
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        self.cancel_polling();
    }
}
