//! Turns a raw platform event plus resolved context into an alert category.
//!
//! This is the only branching logic in the pipeline. The rules fire in a
//! fixed order and the first match wins:
//!
//! 1. a private message,
//! 2. a group message mentioning the monitored account,
//! 3. a membership change affecting the monitored account itself,
//! 4. everything else is ignored.

use crate::base::types::{ClassifiedEvent, MembershipAction, RawEvent, ResolvedContext};

/// Classify one event. Pure and total: every event maps to exactly one
/// variant, and no input can make it fail.
///
/// `self_id` is the monitored account's own user id; membership changes for
/// anyone else are ignored.
pub fn classify(event: &RawEvent, context: &ResolvedContext, self_id: i64) -> ClassifiedEvent {
    match event {
        RawEvent::NewMessage(message) => {
            if message.private {
                return ClassifiedEvent::PrivateMessage {
                    sender: context.sender.clone(),
                    text: message.text.clone(),
                };
            }

            // Mentions are group-scoped. The platform can flag a self-mention
            // inside a private chat, so the guard above must win by
            // construction rather than by assumption.
            if message.mentioned {
                return ClassifiedEvent::Mention {
                    chat: context.chat.clone(),
                    sender: context.sender.clone(),
                    text: message.text.clone(),
                };
            }

            ClassifiedEvent::Ignored
        }
        RawEvent::ChatAction(action) => {
            // Only changes to our own membership are alert-worthy.
            if action.user.id != self_id {
                return ClassifiedEvent::Ignored;
            }

            if action.joined {
                ClassifiedEvent::GroupMembership {
                    chat: context.chat.clone(),
                    actor: context.sender.clone(),
                    action: MembershipAction::Joined,
                }
            } else if action.added {
                ClassifiedEvent::GroupMembership {
                    chat: context.chat.clone(),
                    actor: context.sender.clone(),
                    action: MembershipAction::AddedBySomeone,
                }
            } else {
                // Left, kicked, promoted, and similar changes.
                ClassifiedEvent::Ignored
            }
        }
    }
}
