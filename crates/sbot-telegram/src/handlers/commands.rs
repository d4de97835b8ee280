use std::sync::Arc;

use teloxide::prelude::*;

use sbot_core::{
    audit::{AuditEvent, AuditLogger},
    dispatcher::{Dispatcher, Outcome, Reply, StatusCommand},
    domain::UserId,
    security::is_authorized,
};

use crate::router::AppState;

const UNAUTHORIZED_REPLY: &str = "Unauthorized. Contact the bot owner for access.";
const INTERNAL_FAILURE_REPLY: &str = "⚠️ Could not process command.";

/// Split `/cmd@botname arg1 ...` into a lowercased command name and the rest.
pub fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn audit(log: Option<&AuditLogger>, event: AuditEvent) {
    let Some(log) = log else {
        return;
    };
    if let Err(e) = log.write(event) {
        tracing::warn!("audit log write failed: {e}");
    }
}

async fn audit_off_thread(log: Option<Arc<AuditLogger>>, event: AuditEvent) {
    if log.is_none() {
        return;
    }
    if let Err(e) = tokio::task::spawn_blocking(move || audit(log.as_deref(), event)).await {
        tracing::warn!("audit task failed: {e}");
    }
}

/// Run the command against the store and record it, on the blocking pool.
async fn dispatch_off_thread(
    dispatcher: Dispatcher,
    log: Option<Arc<AuditLogger>>,
    cmd: StatusCommand,
    user_id: i64,
    username: String,
    command_text: String,
) -> Reply {
    let res = tokio::task::spawn_blocking(move || {
        let reply = dispatcher.dispatch(&cmd);
        audit(
            log.as_deref(),
            AuditEvent::command(user_id, &username, &command_text, &reply),
        );
        reply
    })
    .await;

    match res {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("dispatch task failed: {e}");
            Reply {
                text: INTERNAL_FAILURE_REPLY.to_string(),
                outcome: Outcome::Failed,
            }
        }
    }
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let (name, args) = parse_command(text);
    let Some(cmd) = StatusCommand::decode(&name, &args) else {
        return Ok(());
    };

    let user = msg.from();
    let user_id = user.map(|u| u.id.0 as i64);
    let username = user
        .and_then(|u| u.username.clone())
        .unwrap_or_else(|| "unknown".to_string());

    if !is_authorized(user_id.map(UserId), &state.cfg.telegram_allowed_users) {
        tracing::warn!(user = %username, "unauthorized /status attempt");
        audit_off_thread(
            state.audit.clone(),
            AuditEvent::auth(user_id.unwrap_or_default(), &username, false),
        )
        .await;
        if let Err(e) = state.messenger.send_text(msg.chat.id, UNAUTHORIZED_REPLY).await {
            tracing::error!("failed to send reply: {e}");
        }
        return Ok(());
    }

    let reply = dispatch_off_thread(
        state.dispatcher.clone(),
        state.audit.clone(),
        cmd,
        user_id.unwrap_or_default(),
        username,
        text.trim().to_string(),
    )
    .await;

    if let Err(e) = state.messenger.send_text(msg.chat.id, &reply.text).await {
        tracing::error!("failed to send reply: {e}");
    }
    Ok(())
}
