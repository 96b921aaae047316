//! Server-side session registry with single-session-per-user semantics.
//!
//! Each successful login mints a brand-new session identifier; any id the
//! client held before authenticating is never promoted, so a fixated id is
//! worthless. Starting a session evicts the user's previous one: the old id
//! stops resolving as active and its next presentation is answered with an
//! eviction marker, which the HTTP layer turns into a redirect to the
//! session-expired endpoint.
//!
//! Both indexes (user -> session id, session id -> record) live behind one
//! mutex so eviction and creation are observed atomically. A user has at
//! most one pending eviction marker: repeated logins replace it, presenting
//! the stale id consumes it, and logout discards it.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::token::generate_opaque;

/// Number of random bytes in a session identifier.
const SESSION_ID_BYTES: usize = 32;

/// An active server-side session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque session identifier carried by the session cookie.
    pub id: String,

    /// Owning user.
    pub user_id: Uuid,

    /// Owning user's login name.
    pub username: String,

    /// When the session was created.
    pub created_at: OffsetDateTime,
}

/// Outcome of resolving a presented session identifier.
#[derive(Debug, Clone)]
pub enum SessionLookup {
    /// The id belongs to a live session.
    Active(Session),

    /// The id was evicted by a newer login for the same user. Reported
    /// once; subsequent lookups return `Unknown`.
    Evicted,

    /// The id is not known to the registry.
    Unknown,
}

enum Record {
    Active(Session),
    Evicted { user_id: Uuid },
}

#[derive(Default)]
struct Inner {
    by_user: HashMap<Uuid, String>,
    // At most one pending eviction marker per user; older markers are
    // dropped when a newer eviction replaces them, and logout clears the
    // user's marker, so the table cannot outgrow the user population.
    marker_by_user: HashMap<Uuid, String>,
    by_id: HashMap<String, Record>,
}

/// In-process registry of live sessions.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for the user, evicting any existing one.
    ///
    /// The returned session carries a freshly generated identifier; callers
    /// must discard whatever id the client presented before authentication.
    pub fn begin(&self, user_id: Uuid, username: &str) -> Session {
        let session = Session {
            id: generate_opaque(SESSION_ID_BYTES),
            user_id,
            username: username.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };

        let mut inner = self.lock();
        if let Some(old_id) = inner.by_user.insert(user_id, session.id.clone()) {
            if let Some(stale) = inner.marker_by_user.insert(user_id, old_id.clone()) {
                inner.by_id.remove(&stale);
            }
            inner.by_id.insert(old_id, Record::Evicted { user_id });
            info!(user_id = %user_id, "Evicted previous session on new login");
        }
        inner
            .by_id
            .insert(session.id.clone(), Record::Active(session.clone()));

        debug!(user_id = %user_id, "Session started");
        session
    }

    /// Resolves a presented session identifier.
    ///
    /// An evicted id is reported as [`SessionLookup::Evicted`] exactly once
    /// and then forgotten, mirroring how a concurrent-session filter
    /// invalidates the stale session on the request that detects it.
    pub fn resolve(&self, id: &str) -> SessionLookup {
        let mut inner = self.lock();
        match inner.by_id.get(id) {
            Some(Record::Active(session)) => SessionLookup::Active(session.clone()),
            Some(Record::Evicted { user_id }) => {
                let user_id = *user_id;
                inner.by_id.remove(id);
                inner.marker_by_user.remove(&user_id);
                SessionLookup::Evicted
            }
            None => SessionLookup::Unknown,
        }
    }

    /// Ends a session by id, returning it if it was active.
    pub fn end(&self, id: &str) -> Option<Session> {
        let mut inner = self.lock();
        match inner.by_id.remove(id) {
            Some(Record::Active(session)) => {
                inner.by_user.remove(&session.user_id);
                // A still-pending eviction marker dies with the user's
                // session; the logged-out user has nowhere to redirect to.
                if let Some(marker) = inner.marker_by_user.remove(&session.user_id) {
                    inner.by_id.remove(&marker);
                }
                debug!(user_id = %session.user_id, "Session ended");
                Some(session)
            }
            Some(Record::Evicted { user_id }) => {
                inner.marker_by_user.remove(&user_id);
                None
            }
            None => None,
        }
    }

    /// Number of live sessions. Evicted markers do not count.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.lock().by_user.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
