//! Per-event pipeline: resolve context, classify, format, broadcast.
//!
//! Every stage is contained here. Resolution failures degrade to placeholder
//! identities, ignored events short-circuit before the broadcaster, and no
//! error escapes to the update listener: one bad event must never stop the
//! stream.

use tracing::{error, info, instrument, warn};

use crate::{
    base::types::{ChatContext, Identity, RawEvent, ResolvedContext, Void},
    interaction::{classifier, formatter},
    service::{alert::Broadcaster, chat::ChatClient},
};

/// Handle one platform event end to end. Never propagates an error.
#[instrument(skip_all)]
pub async fn handle_event(event: RawEvent, chat: &ChatClient, alerts: &Broadcaster) {
    // Process the event, and log any errors.
    if let Err(err) = handle_event_internal(event, chat, alerts).await {
        error!("Error while handling event: {}", err);
    }
}

async fn handle_event_internal(event: RawEvent, chat: &ChatClient, alerts: &Broadcaster) -> Void {
    let context = resolve_context(&event, chat).await;

    let classified = classifier::classify(&event, &context, chat.self_id());

    let Some(alert) = formatter::format(&classified) else {
        return Ok(());
    };

    info!("Alert triggered: {alert}");

    alerts.broadcast(&alert).await;

    Ok(())
}

/// Resolve the entities an event refers to, degrading to placeholders when
/// a lookup fails. Classification must never fail on an unresolvable
/// reference.
async fn resolve_context(event: &RawEvent, chat: &ChatClient) -> ResolvedContext {
    match event {
        RawEvent::NewMessage(message) => {
            let sender = match &message.sender {
                Some(entity) => match chat.resolve_user(entity).await {
                    Ok(identity) => identity,
                    Err(err) => {
                        warn!("Failed to resolve sender {}: {}", entity.id, err);
                        Identity::unknown_sender()
                    }
                },
                // Anonymous senders (channel posts and the like).
                None => Identity::unknown(0),
            };

            let chat_context = match chat.resolve_chat(&message.chat).await {
                Ok(context) => context,
                Err(err) => {
                    warn!("Failed to resolve chat {}: {}", message.chat.id, err);
                    ChatContext::unknown()
                }
            };

            ResolvedContext { sender, chat: chat_context }
        }
        RawEvent::ChatAction(action) => {
            // The acting party: the adder when the platform reports one,
            // else the affected user themselves.
            let actor_ref = action.actor.as_ref().unwrap_or(&action.user);

            let sender = match chat.resolve_user(actor_ref).await {
                Ok(identity) => identity,
                Err(err) => {
                    warn!("Failed to resolve actor {}: {}", actor_ref.id, err);
                    Identity::unknown(actor_ref.id)
                }
            };

            let chat_context = match chat.resolve_chat(&action.chat).await {
                Ok(context) => context,
                Err(err) => {
                    warn!("Failed to resolve chat {}: {}", action.chat.id, err);
                    ChatContext::unknown()
                }
            };

            ResolvedContext { sender, chat: chat_context }
        }
    }
}
