/**
 * Fanout Router
 *
 * Resolves recipients to their live sessions through the presence registry
 * and pushes one copy of the event to each session. Failed pushes are logged
 * and counted, never returned to the caller. Callers route only after the
 * message is committed.
 */

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use super::presence::{PresenceRegistry, SessionId};
use super::transport::EventSink;
use crate::shared::ServerEvent;

/// Outcome of one routing call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Sessions whose outbox accepted the event
    pub delivered: usize,
    /// Sessions whose outbox was full, closed or gone
    pub failed: usize,
}

impl FanoutReport {
    fn merge(&mut self, other: FanoutReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

#[derive(Clone)]
pub struct FanoutRouter {
    presence: PresenceRegistry,
    sink: Arc<dyn EventSink>,
}

impl FanoutRouter {
    pub fn new(presence: PresenceRegistry, sink: Arc<dyn EventSink>) -> Self {
        Self { presence, sink }
    }

    /// Push `event` to every live session of every distinct recipient
    ///
    /// Offline recipients are skipped silently.
    pub async fn route<'a, I>(&self, event: &ServerEvent, recipients: I) -> FanoutReport
    where
        I: IntoIterator<Item = &'a Uuid>,
    {
        let mut seen = HashSet::new();
        let mut report = FanoutReport::default();
        for user_id in recipients {
            if !seen.insert(*user_id) {
                continue;
            }
            let sessions = self.presence.sessions_for(*user_id).await;
            report.merge(self.push_all(event, sessions));
        }
        report
    }

    /// Push a per-recipient event, one variant per user
    pub async fn route_each<I>(&self, deliveries: I) -> FanoutReport
    where
        I: IntoIterator<Item = (Uuid, ServerEvent)>,
    {
        let mut report = FanoutReport::default();
        for (user_id, event) in deliveries {
            let sessions = self.presence.sessions_for(user_id).await;
            report.merge(self.push_all(&event, sessions));
        }
        report
    }

    /// Push `event` to every connected session
    pub async fn broadcast(&self, event: &ServerEvent) -> FanoutReport {
        let sessions = self.presence.all_sessions().await;
        let report = self.push_all(event, sessions);
        tracing::debug!(
            "[Fanout] Broadcast {} to {} sessions",
            event.name(),
            report.delivered
        );
        report
    }

    fn push_all<I>(&self, event: &ServerEvent, sessions: I) -> FanoutReport
    where
        I: IntoIterator<Item = SessionId>,
    {
        let mut report = FanoutReport::default();
        for session_id in sessions {
            match self.sink.push(session_id, event) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "[Fanout] Dropped {} for session {}: {}",
                        event.name(),
                        session_id,
                        e
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }
}

impl std::fmt::Debug for FanoutRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutRouter")
            .field("presence", &self.presence)
            .finish_non_exhaustive()
    }
}
