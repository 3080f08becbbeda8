/**
 * Message Delivery
 *
 * Pushes a committed message to every live session of every recipient,
 * each recipient getting their own payload variant.
 */

use crate::backend::chat::db::StoredMessage;
use crate::backend::realtime::{FanoutReport, FanoutRouter};
use crate::shared::messaging::ConversationKind;
use crate::shared::ServerEvent;

/// Fan a stored message out as `new_private_msg` or `new_group_msg`
///
/// The sender's other sessions receive it too.
pub async fn notify_new_message(
    fanout: &FanoutRouter,
    kind: ConversationKind,
    message: &StoredMessage,
) -> FanoutReport {
    let deliveries = message.recipients().filter_map(|user_id| {
        let view = message.view_for(*user_id)?;
        let event = match kind {
            ConversationKind::Direct => ServerEvent::NewPrivateMsg(view),
            ConversationKind::Group => ServerEvent::NewGroupMsg(view),
        };
        Some((*user_id, event))
    });
    let report = fanout.route_each(deliveries.collect::<Vec<_>>()).await;

    tracing::debug!(
        "[Fanout] Message {} delivered to {} sessions ({} failed)",
        message.id,
        report.delivered,
        report.failed
    );
    report
}
