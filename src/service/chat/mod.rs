pub mod telegram;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{ChatContext, EntityRef, Identity, Res, Void};

// Traits.

/// Generic "chat platform" trait that clients must implement.
///
/// This trait defines the event source side of the monitor: starting the
/// update listener and resolving entity references to display details.
/// Implementing it allows different messaging platforms to feed the
/// classifier.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// The monitored account's own user id.
    ///
    /// Membership changes are only alert-worthy when they affect this id,
    /// and text mentions are matched against it.
    fn self_id(&self) -> i64;

    /// Human-readable identity of the monitored account, for startup logs.
    fn self_display(&self) -> &str;

    /// Start the platform listener.
    ///
    /// Subscribes to the update stream and dispatches each incoming event;
    /// runs until the connection is torn down.
    async fn start(&self) -> Void;

    /// Resolve a user reference to a display identity.
    ///
    /// May need a platform round-trip when the originating update embedded
    /// no details; may be slow or fail. Callers degrade to placeholder
    /// identities on failure rather than propagating.
    async fn resolve_user(&self, entity: &EntityRef) -> Res<Identity>;

    /// Resolve a chat reference to its title.
    ///
    /// Private chats resolve to the fixed "Private Chat" title; failures are
    /// degraded by the caller.
    async fn resolve_chat(&self, entity: &EntityRef) -> Res<ChatContext>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
