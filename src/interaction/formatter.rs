//! Renders a classified event into the channel-agnostic alert text.
//!
//! Pure string templating: no timestamps and no hidden state, so formatting
//! the same event twice yields byte-identical output. Sink-specific wrapping
//! (payload field names, title prefixes) lives in the channel adapters.

use crate::base::types::{ClassifiedEvent, MembershipAction};

/// Render the alert for one classified event, or `None` for [`ClassifiedEvent::Ignored`].
pub fn format(event: &ClassifiedEvent) -> Option<String> {
    match event {
        ClassifiedEvent::PrivateMessage { sender, text } => {
            Some(format!("New Private Message\nFrom: {}\nContent: {}", sender.display(), text))
        }
        ClassifiedEvent::Mention { chat, sender, text } => Some(format!(
            "You were mentioned\nGroup: {}\nFrom: {}\nContent: {}",
            chat.title,
            sender.display(),
            text
        )),
        ClassifiedEvent::GroupMembership { chat, actor, action } => {
            let headline = match action {
                MembershipAction::Joined => "Joined Group",
                MembershipAction::AddedBySomeone => "Added to Group",
            };

            Some(format!("{}\nGroup: {}\nBy: {}", headline, chat.title, actor.display()))
        }
        ClassifiedEvent::Ignored => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::{ChatContext, Identity};

    #[test]
    fn private_message_with_handle() {
        let event = ClassifiedEvent::PrivateMessage {
            sender: Identity::new("Alice", Some("alice".into()), 1),
            text: "hi".into(),
        };

        assert_eq!(format(&event).unwrap(), "New Private Message\nFrom: Alice (@alice)\nContent: hi");
    }

    #[test]
    fn mention_without_handle() {
        let event = ClassifiedEvent::Mention {
            chat: ChatContext::new("Team"),
            sender: Identity::new("Bob", None, 2),
            text: "ping".into(),
        };

        assert_eq!(
            format(&event).unwrap(),
            "You were mentioned\nGroup: Team\nFrom: Bob\nContent: ping"
        );
    }

    #[test]
    fn joined_group() {
        let event = ClassifiedEvent::GroupMembership {
            chat: ChatContext::new("Team"),
            actor: Identity::new("Carol", Some("carol".into()), 3),
            action: MembershipAction::Joined,
        };

        assert_eq!(format(&event).unwrap(), "Joined Group\nGroup: Team\nBy: Carol (@carol)");
    }

    #[test]
    fn added_to_group() {
        let event = ClassifiedEvent::GroupMembership {
            chat: ChatContext::new("Team"),
            actor: Identity::unknown(0),
            action: MembershipAction::AddedBySomeone,
        };

        assert_eq!(format(&event).unwrap(), "Added to Group\nGroup: Team\nBy: Unknown");
    }

    #[test]
    fn ignored_produces_no_alert() {
        assert_eq!(format(&ClassifiedEvent::Ignored), None);
    }

    #[test]
    fn formatting_is_idempotent() {
        let event = ClassifiedEvent::PrivateMessage {
            sender: Identity::new("Alice", Some("alice".into()), 1),
            text: "hi".into(),
        };

        assert_eq!(format(&event), format(&event));
    }
}
