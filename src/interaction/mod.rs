//! Event handling for the monitor-bot.
//!
//! This module turns raw platform events into delivered alerts:
//! - Classifying each event against the precedence rules
//! - Rendering the channel-agnostic alert text
//! - Driving the resolve → classify → format → broadcast pipeline

pub mod classifier;
pub mod dispatch;
pub mod formatter;
