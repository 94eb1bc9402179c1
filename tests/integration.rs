#![cfg(test)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use mockall::mock;
use monitor_bot::{
    base::types::{ChatActionEvent, ChatContext, DeliveryAck, EntityRef, Identity, MessageEvent, RawEvent, Res, Void},
    interaction::dispatch,
    service::{
        alert::{AlertChannel, Broadcaster, DeliveryError, GenericAlertChannel},
        chat::{ChatClient, GenericChatClient},
    },
};

const SELF_ID: i64 = 777;

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn self_id(&self) -> i64;
        fn self_display(&self) -> &str;
        async fn start(&self) -> Void;
        async fn resolve_user(&self, entity: &EntityRef) -> Res<Identity>;
        async fn resolve_chat(&self, entity: &EntityRef) -> Res<ChatContext>;
    }
}

/// Chat client whose resolutions succeed with embedded details.
fn get_mock_chat() -> MockChat {
    let mut mock = MockChat::new();

    mock.expect_self_id().return_const(SELF_ID);
    mock.expect_self_display().return_const("Monitor (@monitor)".to_string());
    mock.expect_start().returning(|| Ok(()));
    mock.expect_resolve_user().returning(|entity| {
        Ok(Identity::new(
            entity.name.clone().unwrap_or_else(|| "Alice".to_string()),
            entity.username.clone(),
            entity.id,
        ))
    });
    mock.expect_resolve_chat()
        .returning(|entity| Ok(entity.title.clone().map(ChatContext::new).unwrap_or_else(ChatContext::private)));

    mock
}

/// Chat client whose every lookup fails, e.g. a flood-limited session.
fn get_unresolving_chat() -> MockChat {
    let mut mock = MockChat::new();

    mock.expect_self_id().return_const(SELF_ID);
    mock.expect_self_display().return_const("Monitor (@monitor)".to_string());
    mock.expect_start().returning(|| Ok(()));
    mock.expect_resolve_user().returning(|_| Err(anyhow::anyhow!("flood wait")));
    mock.expect_resolve_chat().returning(|_| Err(anyhow::anyhow!("flood wait")));

    mock
}

// Recording alert channel, standing in for a webhook sink.

struct RecordingChannel {
    delivered: Mutex<Vec<String>>,
}

impl RecordingChannel {
    fn new() -> Arc<Self> {
        Arc::new(Self { delivered: Mutex::new(Vec::new()) })
    }

    fn alerts(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenericAlertChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, alert: &str) -> Result<DeliveryAck, DeliveryError> {
        self.delivered.lock().unwrap().push(alert.to_owned());
        Ok(DeliveryAck::Delivered)
    }
}

/// Channel that always rejects, to exercise failure isolation.
struct BrokenChannel {
    attempts: AtomicUsize,
}

impl BrokenChannel {
    fn new() -> Arc<Self> {
        Arc::new(Self { attempts: AtomicUsize::new(0) })
    }

    fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenericAlertChannel for BrokenChannel {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn deliver(&self, _alert: &str) -> Result<DeliveryAck, DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DeliveryError::Rejected { channel: "broken", status: 502, body: "bad gateway".into() })
    }
}

// Event builders.

fn private_message(text: &str) -> RawEvent {
    RawEvent::NewMessage(MessageEvent {
        text: text.to_owned(),
        sender: Some(EntityRef {
            id: 1,
            name: Some("Alice".into()),
            username: Some("alice".into()),
            title: None,
        }),
        chat: EntityRef::bare(1),
        private: true,
        mentioned: false,
    })
}

fn group_mention(text: &str) -> RawEvent {
    RawEvent::NewMessage(MessageEvent {
        text: text.to_owned(),
        sender: Some(EntityRef { id: 2, name: Some("Bob".into()), username: None, title: None }),
        chat: EntityRef { id: -100, name: None, username: None, title: Some("Team".into()) },
        private: false,
        mentioned: true,
    })
}

fn membership_change(user_id: i64) -> RawEvent {
    RawEvent::ChatAction(ChatActionEvent {
        chat: EntityRef { id: -100, name: None, username: None, title: Some("Team".into()) },
        user: EntityRef::bare(user_id),
        actor: Some(EntityRef { id: 3, name: Some("Carol".into()), username: Some("carol".into()), title: None }),
        joined: false,
        added: true,
    })
}

// Tests.

#[tokio::test]
async fn private_message_reaches_every_sink() {
    let chat = ChatClient::new(Arc::new(get_mock_chat()));
    let first = RecordingChannel::new();
    let second = RecordingChannel::new();
    let alerts = Broadcaster::new(vec![AlertChannel::new(first.clone()), AlertChannel::new(second.clone())]);

    dispatch::handle_event(private_message("hi"), &chat, &alerts).await;

    let expected = vec!["New Private Message\nFrom: Alice (@alice)\nContent: hi".to_string()];
    assert_eq!(first.alerts(), expected);
    assert_eq!(second.alerts(), expected);
}

#[tokio::test]
async fn resolution_failure_degrades_but_still_alerts() {
    let chat = ChatClient::new(Arc::new(get_unresolving_chat()));
    let sink = RecordingChannel::new();
    let alerts = Broadcaster::new(vec![AlertChannel::new(sink.clone())]);

    dispatch::handle_event(group_mention("ping"), &chat, &alerts).await;

    assert_eq!(
        sink.alerts(),
        vec!["You were mentioned\nGroup: Unknown Chat\nFrom: Unknown Sender\nContent: ping".to_string()]
    );
}

#[tokio::test]
async fn ignored_event_triggers_zero_deliveries() {
    let chat = ChatClient::new(Arc::new(get_mock_chat()));
    let sink = RecordingChannel::new();
    let alerts = Broadcaster::new(vec![AlertChannel::new(sink.clone())]);

    // A membership change for someone else is not our business.
    dispatch::handle_event(membership_change(42), &chat, &alerts).await;

    assert!(sink.alerts().is_empty());
}

#[tokio::test]
async fn own_membership_change_alerts_with_the_adder() {
    let chat = ChatClient::new(Arc::new(get_mock_chat()));
    let sink = RecordingChannel::new();
    let alerts = Broadcaster::new(vec![AlertChannel::new(sink.clone())]);

    dispatch::handle_event(membership_change(SELF_ID), &chat, &alerts).await;

    assert_eq!(sink.alerts(), vec!["Added to Group\nGroup: Team\nBy: Carol (@carol)".to_string()]);
}

#[tokio::test]
async fn failing_sink_does_not_poison_later_events() {
    let chat = ChatClient::new(Arc::new(get_mock_chat()));
    let broken = BrokenChannel::new();
    let sink = RecordingChannel::new();
    let alerts = Broadcaster::new(vec![AlertChannel::new(broken.clone()), AlertChannel::new(sink.clone())]);

    dispatch::handle_event(private_message("first"), &chat, &alerts).await;
    dispatch::handle_event(private_message("second"), &chat, &alerts).await;

    // The broken channel was attempted each time, and the healthy one
    // received both alerts in order.
    assert_eq!(broken.attempt_count(), 2);
    assert_eq!(
        sink.alerts(),
        vec![
            "New Private Message\nFrom: Alice (@alice)\nContent: first".to_string(),
            "New Private Message\nFrom: Alice (@alice)\nContent: second".to_string(),
        ]
    );
}
