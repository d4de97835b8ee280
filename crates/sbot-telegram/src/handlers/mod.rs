//! Telegram update handlers.
//!
//! Only text messages that look like commands are routed; everything else is
//! dropped without a reply.

use std::sync::Arc;

use teloxide::prelude::*;

use crate::router::AppState;

mod commands;

pub use commands::parse_command;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if !msg.text().is_some_and(|t| t.starts_with('/')) {
        return Ok(());
    }
    commands::handle_command(msg, state).await
}
