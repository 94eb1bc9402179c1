use serde::Serialize;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Placeholder display name when an entity cannot be resolved at all.
pub const UNKNOWN: &str = "Unknown";
/// Placeholder display name when a message sender lookup fails.
pub const UNKNOWN_SENDER: &str = "Unknown Sender";
/// Chat title used for private chats, which have no title of their own.
pub const PRIVATE_CHAT: &str = "Private Chat";
/// Chat title used when a chat lookup fails.
pub const UNKNOWN_CHAT: &str = "Unknown Chat";

// Raw platform events.

/// Reference to a user or chat as it appeared in a platform update.
///
/// Updates usually embed display details alongside the id; when they do not,
/// resolving the reference needs a round-trip to the platform, which may be
/// slow or fail outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRef {
    pub id: i64,
    pub name: Option<String>,
    pub username: Option<String>,
    pub title: Option<String>,
}

impl EntityRef {
    /// A bare reference that carries nothing but the id.
    pub fn bare(id: i64) -> Self {
        Self { id, ..Default::default() }
    }
}

/// An incoming message, already reduced to the fields the classifier needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub text: String,
    pub sender: Option<EntityRef>,
    pub chat: EntityRef,
    /// The message arrived in a one-on-one chat.
    pub private: bool,
    /// The message explicitly references the monitored account.
    pub mentioned: bool,
}

/// A chat membership change observed on the platform.
///
/// `joined` and `added` mirror the platform's distinction between a user
/// entering a chat on their own and being brought in by someone else. A
/// change that is neither (left, kicked, promoted, ...) carries both flags
/// unset and is ignored downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatActionEvent {
    pub chat: EntityRef,
    /// The user whose membership changed.
    pub user: EntityRef,
    /// The party that performed the change, when the platform reports one.
    pub actor: Option<EntityRef>,
    pub joined: bool,
    pub added: bool,
}

/// A single event from the platform stream, consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    NewMessage(MessageEvent),
    ChatAction(ChatActionEvent),
}

// Resolved entities.

/// A resolved actor: someone who sent a message or changed a membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub username: Option<String>,
    pub id: i64,
}

impl Identity {
    pub fn new(name: impl Into<String>, username: Option<String>, id: i64) -> Self {
        Self { name: name.into(), username, id }
    }

    /// Fallback identity for an entity that could not be resolved.
    pub fn unknown(id: i64) -> Self {
        Self::new(UNKNOWN, None, id)
    }

    /// Fallback identity for a failed sender lookup.
    pub fn unknown_sender() -> Self {
        Self::new(UNKNOWN_SENDER, None, 0)
    }

    /// Render the identity the way alerts show it: `name` or `name (@username)`.
    pub fn display(&self) -> String {
        match &self.username {
            Some(username) => format!("{} (@{})", self.name, username),
            None => self.name.clone(),
        }
    }
}

/// A resolved chat. Private chats have no title and use [`PRIVATE_CHAT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatContext {
    pub title: String,
}

impl ChatContext {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    pub fn private() -> Self {
        Self::new(PRIVATE_CHAT)
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_CHAT)
    }
}

/// Entity context resolved ahead of classification.
///
/// For chat actions the `sender` is the acting party: the adder, or the
/// joining user themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedContext {
    pub sender: Identity,
    pub chat: ChatContext,
}

// Classification output.

/// How the monitored account ended up in a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MembershipAction {
    Joined,
    AddedBySomeone,
}

/// The classifier's verdict for one raw event. Exactly one variant applies
/// to every event; `Ignored` means no alert is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ClassifiedEvent {
    PrivateMessage { sender: Identity, text: String },
    Mention { chat: ChatContext, sender: Identity, text: String },
    GroupMembership { chat: ChatContext, actor: Identity, action: MembershipAction },
    Ignored,
}

// Delivery outcome.

/// Successful outcome of one delivery attempt to one sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryAck {
    /// The sink accepted the alert.
    Delivered,
    /// The sink is not configured; delivery is a no-op, not an error.
    Skipped,
}
