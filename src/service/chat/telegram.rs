//! Telegram platform integration for the monitor-bot.
//!
//! Wraps a teloxide [`Bot`]: receives message and membership updates,
//! decodes them into the platform-agnostic [`RawEvent`] model, and hands
//! each one to the dispatch pipeline. Also implements entity resolution,
//! preferring details embedded in the update and falling back to a
//! `getChat` round-trip.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{Chat, ChatMemberUpdated, MessageEntityKind, MessageKind, User},
};
use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{ChatActionEvent, ChatContext, EntityRef, Identity, MessageEvent, RawEvent, Res, UNKNOWN, Void},
    },
    interaction::dispatch,
    service::alert::Broadcaster,
};

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the telegram implementation.

impl ChatClient {
    /// Creates a new Telegram chat client.
    pub async fn telegram(config: &Config, alerts: Broadcaster) -> Res<Self> {
        let client = TelegramChatClient::new(config, alerts).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<TelegramChatClient> for ChatClient {
    fn from(client: TelegramChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// State handed to the teloxide update handlers.
struct TelegramState {
    chat: ChatClient,
    alerts: Broadcaster,
    self_id: i64,
    self_username: Option<String>,
}

/// Telegram client implementation.
#[derive(Clone)]
pub struct TelegramChatClient {
    bot: Bot,
    self_id: i64,
    self_username: Option<String>,
    self_display: String,
    alerts: Broadcaster,
}

impl TelegramChatClient {
    /// Create a new Telegram chat client.
    #[instrument(name = "TelegramChatClient::new", skip_all)]
    pub async fn new(config: &Config, alerts: Broadcaster) -> Res<Self> {
        // Initialize the bot, optionally tunneled through a proxy.

        let bot = match &config.telegram_proxy {
            Some(proxy) => {
                info!("Using proxy: {proxy}");

                let client = reqwest::Client::builder().proxy(reqwest::Proxy::all(proxy.as_str())?).build()?;

                Bot::with_client(config.telegram_bot_token.clone(), client)
            }
            None => Bot::new(config.telegram_bot_token.clone()),
        };

        // Identify the monitored account.

        let me = bot.get_me().await?;
        let self_id = me.user.id.0 as i64;
        let self_username = me.user.username.clone();
        let self_display = Identity::new(me.user.first_name.clone(), self_username.clone(), self_id).display();

        Ok(Self { bot, self_id, self_username, self_display, alerts })
    }
}

#[async_trait]
impl GenericChatClient for TelegramChatClient {
    fn self_id(&self) -> i64 {
        self.self_id
    }

    fn self_display(&self) -> &str {
        &self.self_display
    }

    async fn start(&self) -> Void {
        let state = Arc::new(TelegramState {
            chat: ChatClient::from(self.clone()),
            alerts: self.alerts.clone(),
            self_id: self.self_id,
            self_username: self.self_username.clone(),
        });

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handle_message_update))
            .branch(Update::filter_my_chat_member().endpoint(handle_chat_member_update));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![state])
            .default_handler(|update| async move {
                warn!("Unhandled update: {:?}", update.id);
            })
            .error_handler(LoggingErrorHandler::with_custom_text("monitor-bot"))
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve_user(&self, entity: &EntityRef) -> Res<Identity> {
        // Updates usually embed the sender; only bare references need the
        // network.
        if let Some(name) = &entity.name {
            return Ok(Identity::new(name.clone(), entity.username.clone(), entity.id));
        }

        let chat = self
            .bot
            .get_chat(ChatId(entity.id))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to look up entity {}: {}", entity.id, e))?;

        let name = chat.first_name().or_else(|| chat.title()).unwrap_or(UNKNOWN).to_owned();

        Ok(Identity::new(name, chat.username().map(ToOwned::to_owned), entity.id))
    }

    #[instrument(skip(self))]
    async fn resolve_chat(&self, entity: &EntityRef) -> Res<ChatContext> {
        if let Some(title) = &entity.title {
            return Ok(ChatContext::new(title.clone()));
        }

        // Positive ids are the user-id space: a one-on-one chat.
        if entity.id > 0 {
            return Ok(ChatContext::private());
        }

        let chat = self
            .bot
            .get_chat(ChatId(entity.id))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to look up chat {}: {}", entity.id, e))?;

        match chat.title() {
            Some(title) => Ok(ChatContext::new(title)),
            None => Ok(ChatContext::private()),
        }
    }
}

// Update handlers.

/// Handles message updates from Telegram.
#[instrument(skip_all)]
async fn handle_message_update(message: Message, state: Arc<TelegramState>) -> ResponseResult<()> {
    let Some(event) = decode_message(&message, state.self_id, state.self_username.as_deref()) else {
        return Ok(());
    };

    dispatch::handle_event(event, &state.chat, &state.alerts).await;

    Ok(())
}

/// Handles updates to the monitored account's own chat memberships.
#[instrument(skip_all)]
async fn handle_chat_member_update(update: ChatMemberUpdated, state: Arc<TelegramState>) -> ResponseResult<()> {
    let event = decode_chat_member(&update);

    dispatch::handle_event(event, &state.chat, &state.alerts).await;

    Ok(())
}

// Update decoding.

fn user_ref(user: &User) -> EntityRef {
    EntityRef {
        id: user.id.0 as i64,
        name: Some(user.first_name.clone()),
        username: user.username.clone(),
        title: None,
    }
}

fn chat_ref(chat: &Chat) -> EntityRef {
    EntityRef {
        id: chat.id.0,
        name: None,
        username: chat.username().map(ToOwned::to_owned),
        title: chat.title().map(ToOwned::to_owned),
    }
}

/// Decode a message update, or `None` for updates outside the monitor's
/// scope (service messages surface through the membership updates instead).
fn decode_message(message: &Message, self_id: i64, self_username: Option<&str>) -> Option<RawEvent> {
    if !matches!(message.kind, MessageKind::Common(_)) {
        return None;
    }

    // Media messages carry their text in the caption.
    let text = message.text().or_else(|| message.caption()).unwrap_or_default().to_owned();

    Some(RawEvent::NewMessage(MessageEvent {
        text,
        sender: message.from.as_ref().map(user_ref),
        chat: chat_ref(&message.chat),
        private: message.chat.is_private(),
        mentioned: is_self_mention(message, self_id, self_username),
    }))
}

/// Whether a message references the monitored account: an `@username` in the
/// text, a text mention carrying our id, or a reply to one of our messages.
fn is_self_mention(message: &Message, self_id: i64, self_username: Option<&str>) -> bool {
    let text = message.text().or_else(|| message.caption()).unwrap_or_default();

    if let Some(username) = self_username
        && text.contains(&format!("@{username}"))
    {
        return true;
    }

    let entity_mention = message
        .entities()
        .unwrap_or_default()
        .iter()
        .chain(message.caption_entities().unwrap_or_default())
        .any(|entity| match &entity.kind {
            MessageEntityKind::TextMention { user } => user.id.0 as i64 == self_id,
            _ => false,
        });

    if entity_mention {
        return true;
    }

    message
        .reply_to_message()
        .and_then(|replied| replied.from.as_ref())
        .is_some_and(|user| user.id.0 as i64 == self_id)
}

/// Decode a membership update into a chat action.
///
/// Only transitions into the chat set a flag: `joined` when the affected
/// user acted on their own, `added` when someone else brought them in.
/// Every other transition decodes flag-less and is ignored downstream.
fn decode_chat_member(update: &ChatMemberUpdated) -> RawEvent {
    let entered = !update.old_chat_member.is_present() && update.new_chat_member.is_present();

    let affected = &update.new_chat_member.user;
    let actor = &update.from;
    let self_action = actor.id == affected.id;

    RawEvent::ChatAction(ChatActionEvent {
        chat: chat_ref(&update.chat),
        user: user_ref(affected),
        actor: Some(user_ref(actor)),
        joined: entered && self_action,
        added: entered && !self_action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::UserId;

    fn user(id: u64, name: &str, username: Option<&str>) -> User {
        User {
            id: UserId(id),
            is_bot: false,
            first_name: name.to_owned(),
            last_name: None,
            username: username.map(ToOwned::to_owned),
            language_code: None,
            is_premium: false,
            added_to_attachment_menu: false,
        }
    }

    #[test]
    fn user_ref_carries_embedded_details() {
        let entity = user_ref(&user(7, "Alice", Some("alice")));

        assert_eq!(entity.id, 7);
        assert_eq!(entity.name.as_deref(), Some("Alice"));
        assert_eq!(entity.username.as_deref(), Some("alice"));
        assert_eq!(entity.title, None);
    }
}
