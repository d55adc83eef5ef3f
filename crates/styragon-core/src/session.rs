//! Admin session context.
//!
//! The session is an explicit object handed to whatever needs it. Listeners
//! subscribe for session changes and get a [`Subscription`] guard back;
//! dropping the guard unsubscribes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::traits::AuthProvider;
use crate::AppError;

/// An authenticated admin session issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// What changed about the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Sent once to each new subscriber with the current state.
    InitialSession,
    SignedIn,
    SignedOut,
    UserUpdated,
    PasswordRecovery,
}

type Listener = Arc<dyn Fn(SessionEvent, Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    session: Option<Session>,
    listeners: BTreeMap<u64, Listener>,
    next_listener: u64,
}

/// Shared holder of the current admin session.
///
/// Cloning is cheap and all clones see the same session.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use styragon_core::session::{SessionContext, SessionEvent};
///
/// let ctx = SessionContext::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let subscription = ctx.subscribe(move |event, _| sink.lock().unwrap().push(event));
///
/// ctx.set_session(None);
/// drop(subscription);
/// ctx.set_session(None);
///
/// assert_eq!(
///     *seen.lock().unwrap(),
///     vec![SessionEvent::InitialSession, SessionEvent::SignedOut]
/// );
/// ```
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<Mutex<Inner>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking listener never runs under the lock, so poisoning only
        // means a panic elsewhere; the data is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn current(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock()
            .session
            .as_ref()
            .is_some_and(|s| !s.is_expired(Utc::now()))
    }

    /// Current session or [`AppError::Unauthorized`].
    pub fn require(&self) -> Result<Session, AppError> {
        match self.current() {
            Some(session) if !session.is_expired(Utc::now()) => Ok(session),
            _ => Err(AppError::Unauthorized),
        }
    }

    /// Registers a listener. It is called immediately with
    /// [`SessionEvent::InitialSession`] and then on every change until the
    /// returned guard is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(SessionEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let (id, current) = {
            let mut inner = self.lock();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.listeners.insert(id, Arc::clone(&listener));
            (id, inner.session.clone())
        };

        listener(SessionEvent::InitialSession, current.as_ref());

        Subscription {
            id,
            ctx: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Replaces the session and notifies listeners.
    pub fn set_session(&self, session: Option<Session>) {
        let event = if session.is_some() {
            SessionEvent::SignedIn
        } else {
            SessionEvent::SignedOut
        };
        self.replace(session, event);
    }

    fn replace(&self, session: Option<Session>, event: SessionEvent) {
        let listeners: Vec<Listener> = {
            let mut inner = self.lock();
            inner.session = session.clone();
            inner.listeners.values().cloned().collect()
        };

        debug!(?event, listeners = listeners.len(), "session changed");
        for listener in listeners {
            listener(event, session.as_ref());
        }
    }

    fn notify(&self, event: SessionEvent) {
        let session = self.current();
        let listeners: Vec<Listener> = self.lock().listeners.values().cloned().collect();
        for listener in listeners {
            listener(event, session.as_ref());
        }
    }

    /// Signs in through `auth` and stores the resulting session.
    pub async fn sign_in<A: AuthProvider>(
        &self,
        auth: &A,
        email: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        let session = auth.sign_in(email, password).await?;
        info!(user_id = %session.user_id, "admin signed in");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Signs out remotely (best effort) and always clears the local session.
    pub async fn sign_out<A: AuthProvider>(&self, auth: &A) -> Result<(), AppError> {
        let result = match self.current() {
            Some(session) => auth.sign_out(&session).await,
            None => Ok(()),
        };
        self.set_session(None);
        result
    }

    pub async fn update_password<A: AuthProvider>(
        &self,
        auth: &A,
        new_password: &str,
    ) -> Result<(), AppError> {
        let session = self.require()?;
        auth.update_password(&session, new_password).await?;
        self.notify(SessionEvent::UserUpdated);
        Ok(())
    }

    pub async fn request_password_reset<A: AuthProvider>(
        &self,
        auth: &A,
        email: &str,
    ) -> Result<(), AppError> {
        auth.request_password_reset(email).await?;
        self.notify(SessionEvent::PasswordRecovery);
        Ok(())
    }
}

/// Guard returned by [`SessionContext::subscribe`]. Unsubscribes on drop.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    ctx: std::sync::Weak<Mutex<Inner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.ctx.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.listeners.remove(&self.id);
        }
    }
}
