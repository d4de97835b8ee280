use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use sbot_core::{audit::AuditLogger, config::Config, dispatcher::Dispatcher as StatusDispatcher};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub dispatcher: StatusDispatcher,
    pub messenger: TelegramMessenger,
    pub audit: Option<Arc<AuditLogger>>,
}

/// Command list advertised to Telegram clients.
pub fn bot_commands() -> Vec<BotCommand> {
    vec![BotCommand::new(
        "status",
        "Manage or check system status: set <down|risk|good> | check",
    )]
}

pub async fn run_polling(cfg: Arc<Config>, dispatcher: StatusDispatcher) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!("logged in as @{}", me.username()),
        Err(e) => tracing::warn!("get_me failed: {e}"),
    }
    if cfg.telegram_allowed_users.is_empty() {
        tracing::info!("Allowed users: everyone");
    } else {
        tracing::info!("Allowed users: {}", cfg.telegram_allowed_users.len());
    }

    tracing::info!("registering bot commands...");
    match bot.set_my_commands(bot_commands()).await {
        Ok(_) => tracing::info!("bot commands registered"),
        Err(e) => tracing::error!("failed to register commands: {e}"),
    }

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        dispatcher,
        messenger: TelegramMessenger::new(bot.clone()),
        audit: cfg
            .audit_log_path
            .as_ref()
            .map(|p| Arc::new(AuditLogger::new(p.clone(), cfg.audit_log_json))),
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
