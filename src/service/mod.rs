//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the
//! monitor-bot:
//! - Chat platforms (e.g., Telegram), supplying the event stream
//! - Alert sinks (DingTalk, Feishu, ServerChan) behind one delivery trait
//!
//! Each service module defines both generic traits and concrete
//! implementations, allowing for extensibility and easy testing.

pub mod alert;
pub mod chat;
