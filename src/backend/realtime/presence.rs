/**
 * Presence Registry
 *
 * Live mapping of socket sessions to authenticated users. A user may hold
 * several sessions at once (tabs, devices); a session belongs to at most one
 * user. Both indexes live in one table behind a single `RwLock`, so they are
 * always updated together.
 *
 * The registry only reports transitions. Broadcasting `online` / `offline`
 * is left to the socket layer, which owns the transport.
 */

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Identifier of one live socket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Allocate a fresh session id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Online/offline edges caused by one registry mutation
///
/// `came_online` is set when a user went from zero to one session,
/// `went_offline` when a user's last session went away. Re-binding a session
/// to another user can produce both at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceTransition {
    pub came_online: Option<Uuid>,
    pub went_offline: Option<Uuid>,
}

impl PresenceTransition {
    pub fn is_empty(&self) -> bool {
        self.came_online.is_none() && self.went_offline.is_none()
    }
}

#[derive(Debug, Default)]
struct PresenceTable {
    /// Every connected session, bound or not
    sessions: HashMap<SessionId, Option<Uuid>>,
    /// Reverse index, never holds empty sets
    by_user: HashMap<Uuid, HashSet<SessionId>>,
    /// Token id each bound session authenticated with
    tokens: HashMap<SessionId, String>,
}

impl PresenceTable {
    /// Drop the session from its user's set
    ///
    /// # Returns
    /// The user if that was their last session
    fn unbind(&mut self, session_id: SessionId, user_id: Uuid) -> Option<Uuid> {
        let sessions = self.by_user.get_mut(&user_id)?;
        sessions.remove(&session_id);
        if sessions.is_empty() {
            self.by_user.remove(&user_id);
            Some(user_id)
        } else {
            None
        }
    }
}

/// Shared presence registry, cloned into handlers through the app state
#[derive(Clone, Debug, Default)]
pub struct PresenceRegistry {
    inner: Arc<RwLock<PresenceTable>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, unauthenticated session
    pub async fn connect(&self, session_id: SessionId) {
        let mut table = self.inner.write().await;
        table.sessions.entry(session_id).or_insert(None);
        tracing::debug!("[Presence] Session connected: {}", session_id);
    }

    /// Bind a session to a user
    ///
    /// Idempotent for the same user. Binding to another user first unbinds the
    /// previous one. Unknown sessions are registered on the fly.
    pub async fn authenticate(&self, session_id: SessionId, user_id: Uuid) -> PresenceTransition {
        self.authenticate_with(session_id, user_id, None).await
    }

    /// Bind a session to a user and remember the token id it presented
    ///
    /// The token id lets logout and deactivation find the sessions opened
    /// with a credential that is no longer valid.
    pub async fn authenticate_with(
        &self,
        session_id: SessionId,
        user_id: Uuid,
        jti: Option<String>,
    ) -> PresenceTransition {
        let mut table = self.inner.write().await;
        let mut transition = PresenceTransition::default();

        match jti {
            Some(jti) => table.tokens.insert(session_id, jti),
            None => table.tokens.remove(&session_id),
        };

        let previous = table.sessions.insert(session_id, Some(user_id)).flatten();
        match previous {
            Some(prev) if prev == user_id => return transition,
            Some(prev) => transition.went_offline = table.unbind(session_id, prev),
            None => {}
        }

        let sessions = table.by_user.entry(user_id).or_default();
        sessions.insert(session_id);
        if sessions.len() == 1 {
            transition.came_online = Some(user_id);
        }

        tracing::debug!("[Presence] Session {} bound to user {}", session_id, user_id);
        transition
    }

    /// Unbind a session from its user but keep it connected
    ///
    /// The session has to send `auth` again before acting.
    pub async fn unauthenticate(&self, session_id: SessionId) -> PresenceTransition {
        let mut table = self.inner.write().await;
        table.tokens.remove(&session_id);
        let went_offline = match table.sessions.get_mut(&session_id).and_then(Option::take) {
            Some(user_id) => table.unbind(session_id, user_id),
            None => None,
        };
        tracing::debug!("[Presence] Session {} unauthenticated", session_id);
        PresenceTransition {
            came_online: None,
            went_offline,
        }
    }

    /// Forget a session
    ///
    /// Unknown sessions are a no-op.
    pub async fn disconnect(&self, session_id: SessionId) -> PresenceTransition {
        let mut table = self.inner.write().await;
        table.tokens.remove(&session_id);
        let went_offline = match table.sessions.remove(&session_id).flatten() {
            Some(user_id) => table.unbind(session_id, user_id),
            None => None,
        };
        tracing::debug!("[Presence] Session disconnected: {}", session_id);
        PresenceTransition {
            came_online: None,
            went_offline,
        }
    }

    /// Whether the user has at least one live session
    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.inner.read().await.by_user.contains_key(&user_id)
    }

    /// Whether any user in `user_ids` other than `caller_id` is online
    pub async fn is_any_online<'a, I>(&self, user_ids: I, caller_id: Uuid) -> bool
    where
        I: IntoIterator<Item = &'a Uuid>,
    {
        let table = self.inner.read().await;
        user_ids
            .into_iter()
            .any(|id| *id != caller_id && table.by_user.contains_key(id))
    }

    /// Live sessions of a user, empty if offline
    pub async fn sessions_for(&self, user_id: Uuid) -> HashSet<SessionId> {
        self.inner
            .read()
            .await
            .by_user
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// User bound to a session, if any
    pub async fn user_for(&self, session_id: SessionId) -> Option<Uuid> {
        self.inner
            .read()
            .await
            .sessions
            .get(&session_id)
            .copied()
            .flatten()
    }

    /// Token id a session authenticated with
    pub async fn token_for(&self, session_id: SessionId) -> Option<String> {
        self.inner.read().await.tokens.get(&session_id).cloned()
    }

    /// Sessions that authenticated with the token `jti`
    pub async fn sessions_with_token(&self, jti: &str) -> Vec<SessionId> {
        self.inner
            .read()
            .await
            .tokens
            .iter()
            .filter(|(_, token)| token.as_str() == jti)
            .map(|(session_id, _)| *session_id)
            .collect()
    }

    /// Every connected session, authenticated or not
    pub async fn all_sessions(&self) -> Vec<SessionId> {
        self.inner.read().await.sessions.keys().copied().collect()
    }

    /// Users with at least one live session
    pub async fn online_users(&self) -> Vec<Uuid> {
        self.inner.read().await.by_user.keys().copied().collect()
    }
}
