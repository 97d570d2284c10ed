//! Authentication session manager
//!
//! Owns the one [`AuthSessionState`] instance of the application and every
//! resource a login attempt holds: the pairing channel, the popup handle,
//! and the multiplexed attempt task. Exactly one attempt can be pending at
//! a time; starting a new one cancels the previous attempt before anything
//! else happens.

use std::sync::Arc;
use std::time::Duration;

use larkwire_common::CredentialStore;
use larkwire_domain::constants::{
    LOGIN_TIMEOUT_SECS, POPUP_CLOSE_GRACE_MS, POPUP_POLL_INTERVAL_MS,
};
use larkwire_domain::{
    AuthSessionState, Credential, HandoffMessage, Identity, LarkwireError, Result,
};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::SessionApi;
use crate::pairing::{AttemptId, PairingChannel, PairingSender};
use crate::popup::{PopupDriver, PopupHandle};

const CLOSED_BEFORE_COMPLETION: &str = "login window was closed before completing authentication";

/// Drives the client authentication state machine
pub struct AuthSessionManager {
    api: Arc<dyn SessionApi>,
    store: Arc<dyn CredentialStore>,
    popups: Arc<dyn PopupDriver>,
    origin: String,
    state_tx: watch::Sender<AuthSessionState>,
    attempt: Mutex<Option<LoginAttempt>>,
}

struct LoginAttempt {
    id: AttemptId,
    sender: PairingSender,
    popup: Arc<dyn PopupHandle>,
    task: JoinHandle<()>,
}

enum AttemptOutcome {
    Success { credential: Credential, identity: Identity },
    Failed(String),
    TimedOut,
    PopupClosed,
}

impl AuthSessionManager {
    /// Create a manager for an application served from `origin`
    ///
    /// `origin` is the only origin the pairing channel accepts handoff
    /// messages from.
    #[must_use]
    pub fn new(
        api: Arc<dyn SessionApi>,
        store: Arc<dyn CredentialStore>,
        popups: Arc<dyn PopupDriver>,
        origin: impl Into<String>,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(AuthSessionState::Unauthenticated);
        Arc::new(Self {
            api,
            store,
            popups,
            origin: origin.into(),
            state_tx,
            attempt: Mutex::new(None),
        })
    }

    /// Current session state
    #[must_use]
    pub fn state(&self) -> AuthSessionState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to session state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSessionState> {
        self.state_tx.subscribe()
    }

    /// Re-verify any stored credential on application load
    ///
    /// Success resolves directly to `Authenticated` with the refreshed
    /// identity; any failure clears the stored credential and resolves to
    /// `Unauthenticated` without surfacing an error (an expired session is
    /// an expected path).
    pub async fn initialize(&self) -> AuthSessionState {
        match self.store.load().await {
            Ok(Some(credential)) => match self.api.verify(&credential.access_token).await {
                Ok(identity) => {
                    info!(username = %identity.username, "restored session from stored credential");
                    self.set_state(AuthSessionState::Authenticated(identity));
                }
                Err(err) => {
                    debug!(%err, "startup re-verification failed, clearing credential");
                    if let Err(err) = self.store.clear().await {
                        warn!(%err, "failed to clear stored credential");
                    }
                    self.set_state(AuthSessionState::Unauthenticated);
                }
            },
            Ok(None) => self.set_state(AuthSessionState::Unauthenticated),
            Err(err) => {
                debug!(%err, "credential store unavailable on startup");
                self.set_state(AuthSessionState::Unauthenticated);
            }
        }

        self.state()
    }

    /// Start a login attempt
    ///
    /// Cancels any pending attempt first (its listener and popup are
    /// released), then transitions to `Pending` and opens the popup at the
    /// relay-provided authorization URL.
    ///
    /// # Errors
    /// Returns an error if the relay call or the popup launch fails; the
    /// session resolves to `Error` in that case.
    pub async fn login(self: &Arc<Self>) -> Result<AttemptId> {
        let mut guard = self.attempt.lock().await;
        if let Some(previous) = guard.take() {
            debug!(attempt = %previous.id, "superseding pending login attempt");
            previous.task.abort();
            previous.popup.close();
        }

        self.set_state(AuthSessionState::Pending);

        let start = match self.api.start().await {
            Ok(start) => start,
            Err(err) => {
                self.set_state(AuthSessionState::Error(err.to_string()));
                return Err(err);
            }
        };

        let popup: Arc<dyn PopupHandle> = match self.popups.open(&start.auth_url) {
            Ok(handle) => Arc::from(handle),
            Err(err) => {
                self.set_state(AuthSessionState::Error(err.to_string()));
                return Err(err);
            }
        };

        let id = AttemptId::new();
        let (channel, sender) = PairingChannel::new(id, self.origin.clone());

        info!(attempt = %id, "login attempt started");

        let task =
            tokio::spawn(run_attempt(Arc::clone(self), id, channel, Arc::clone(&popup)));
        *guard = Some(LoginAttempt { id, sender, popup, task });

        Ok(id)
    }

    /// Sender for the pending attempt's pairing channel, if any
    ///
    /// The embedding shell forwards window messages through this handle;
    /// a handle from a superseded attempt no longer delivers.
    pub async fn pairing_sender(&self) -> Option<PairingSender> {
        self.attempt.lock().await.as_ref().map(|attempt| attempt.sender.clone())
    }

    /// Explicit logout: cancel any pending attempt, clear the stored
    /// credential, and resolve to `Unauthenticated`
    ///
    /// # Errors
    /// Returns `LarkwireError::Storage` if the credential store rejects the
    /// delete; the in-memory state still resolves to `Unauthenticated`.
    pub async fn logout(&self) -> Result<()> {
        self.cancel_attempt("logout").await;

        let cleared = self.store.clear().await;
        self.set_state(AuthSessionState::Unauthenticated);
        info!("logged out");

        cleared.map_err(LarkwireError::Storage)
    }

    /// Re-verify the stored credential against the relay
    ///
    /// An upstream rejection logs the session out fail-closed. A
    /// network-level failure leaves the session untouched and propagates.
    ///
    /// # Errors
    /// Returns the underlying error for network-level failures.
    pub async fn verify_session(&self) -> Result<bool> {
        let credential = match self.store.load().await.map_err(LarkwireError::Storage)? {
            Some(credential) => credential,
            None => {
                self.set_state(AuthSessionState::Unauthenticated);
                return Ok(false);
            }
        };

        match self.api.verify(&credential.access_token).await {
            Ok(identity) => {
                self.set_state(AuthSessionState::Authenticated(identity));
                Ok(true)
            }
            Err(LarkwireError::InvalidToken | LarkwireError::Unauthorized) => {
                warn!("credential rejected by verification, logging out");
                if let Err(err) = self.store.clear().await {
                    warn!(%err, "failed to clear rejected credential");
                }
                self.set_state(AuthSessionState::Unauthenticated);
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// Access token of the stored credential
    ///
    /// # Errors
    /// Returns `LarkwireError::Unauthorized` when no credential is stored.
    pub async fn access_token(&self) -> Result<String> {
        self.store
            .load()
            .await
            .map_err(LarkwireError::Storage)?
            .map(|credential| credential.access_token)
            .ok_or(LarkwireError::Unauthorized)
    }

    fn set_state(&self, state: AuthSessionState) {
        self.state_tx.send_replace(state);
    }

    async fn cancel_attempt(&self, reason: &str) {
        if let Some(attempt) = self.attempt.lock().await.take() {
            debug!(attempt = %attempt.id, reason, "cancelling login attempt");
            attempt.task.abort();
            attempt.popup.close();
        }
    }

    /// Resolve an attempt's outcome, unless it was already superseded
    async fn finish_attempt(
        &self,
        id: AttemptId,
        outcome: AttemptOutcome,
        popup: Arc<dyn PopupHandle>,
    ) {
        let mut guard = self.attempt.lock().await;
        let is_current = matches!(guard.as_ref(), Some(current) if current.id == id);
        if !is_current {
            debug!(attempt = %id, "attempt already superseded, discarding outcome");
            return;
        }
        *guard = None;

        popup.close();

        match outcome {
            AttemptOutcome::Success { credential, identity } => {
                if let Err(err) = self.store.store(&credential).await {
                    warn!(%err, "failed to persist credential");
                    self.set_state(AuthSessionState::Error(format!(
                        "failed to persist credential: {err}"
                    )));
                    return;
                }
                info!(username = %identity.username, "login completed");
                self.set_state(AuthSessionState::Authenticated(identity));
            }
            AttemptOutcome::Failed(reason) => {
                warn!(%reason, "login attempt failed");
                self.set_state(AuthSessionState::Error(reason));
            }
            AttemptOutcome::TimedOut => {
                warn!("login attempt timed out");
                self.set_state(AuthSessionState::Error("login timed out".to_string()));
            }
            AttemptOutcome::PopupClosed => {
                // Grace re-check: a fast success may have persisted the
                // credential just before the popup closed itself.
                match self.store.load().await {
                    Ok(Some(credential)) => {
                        match self.api.verify(&credential.access_token).await {
                            Ok(identity) => {
                                info!("popup closed after fast handoff, session verified");
                                self.set_state(AuthSessionState::Authenticated(identity));
                            }
                            Err(_) => self.set_state(AuthSessionState::Error(
                                CLOSED_BEFORE_COMPLETION.to_string(),
                            )),
                        }
                    }
                    _ => self
                        .set_state(AuthSessionState::Error(CLOSED_BEFORE_COMPLETION.to_string())),
                }
            }
        }
    }
}

/// Multiplex the three ways an attempt can resolve: a handoff message, the
/// popup being closed by the user, or the watchdog timeout
async fn run_attempt(
    manager: Arc<AuthSessionManager>,
    id: AttemptId,
    mut channel: PairingChannel,
    popup: Arc<dyn PopupHandle>,
) {
    let watchdog = tokio::time::sleep(Duration::from_secs(LOGIN_TIMEOUT_SECS));
    tokio::pin!(watchdog);
    let mut poll = tokio::time::interval(Duration::from_millis(POPUP_POLL_INTERVAL_MS));

    let outcome = loop {
        tokio::select! {
            message = channel.recv() => match message {
                Some(HandoffMessage::Success { access_token, refresh_token, identity }) => {
                    break AttemptOutcome::Success {
                        credential: Credential { access_token, refresh_token },
                        identity,
                    };
                }
                Some(HandoffMessage::Error { error }) => break AttemptOutcome::Failed(error),
                None => break AttemptOutcome::Failed("pairing channel closed".to_string()),
            },
            () = &mut watchdog => break AttemptOutcome::TimedOut,
            _ = poll.tick() => {
                if popup.is_closed() {
                    // Short grace window so a success message posted just
                    // before the popup closed itself can still win.
                    tokio::time::sleep(Duration::from_millis(POPUP_CLOSE_GRACE_MS)).await;
                    match channel.try_recv() {
                        Some(HandoffMessage::Success { access_token, refresh_token, identity }) => {
                            break AttemptOutcome::Success {
                                credential: Credential { access_token, refresh_token },
                                identity,
                            };
                        }
                        Some(HandoffMessage::Error { error }) => {
                            break AttemptOutcome::Failed(error);
                        }
                        None => break AttemptOutcome::PopupClosed,
                    }
                }
            }
        }
    };

    manager.finish_attempt(id, outcome, popup).await;
}
