//! EchoBuddy Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Update;
use teloxide::update_listeners::{webhooks, Polling, UpdateListener};
use teloxide::utils::command::BotCommands as TeloxideBotCommands;
use tracing::{error, info, warn};

use EchoBuddy::{
    config::Settings,
    database::{connection::DatabaseConfig, create_pool, health_check, run_migrations, UserRepository},
    handlers::{
        commands::{help, settings as settings_cmd, start, stats},
        messages,
    },
    middleware::AccessDecision,
    services::ServiceFactory,
    utils::helpers::format_error_message,
    utils::{logging, BotError},
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    dotenv::dotenv().ok();
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    logging::init_logging(&settings)?;

    info!("Starting {}...", EchoBuddy::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = DatabaseConfig {
        url: settings.database_url.clone(),
        ..Default::default()
    };
    let db_pool = create_pool(&db_config).await?;

    info!("Running database migrations...");
    run_migrations(&db_pool).await?;
    health_check(&db_pool).await?;

    // Initialize services
    let user_repository = UserRepository::new(db_pool);
    let services = ServiceFactory::new(&settings, user_repository);

    let bot = Bot::new(&settings.bot_token);

    info!("Setting up bot handlers...");
    let handler = create_handler();

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![Arc::new(services)])
        .default_handler(|upd| async move {
            warn!(update_id = upd.id.0, "Unhandled update");
        })
        .enable_ctrlc_handler()
        .build();

    // Relay SIGTERM into a graceful dispatcher shutdown
    let shutdown_token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
        info!("SIGTERM received, shutting down...");
        if let Ok(shutdown) = shutdown_token.shutdown() {
            shutdown.await;
        }
    });

    info!("EchoBuddy bot is ready!");

    // Start the bot: webhook when a public URL is configured, long polling
    // otherwise
    match settings.public_webhook_url() {
        Some(public_url) => {
            info!(url = %public_url, port = settings.webhook_port, "Starting bot in webhook mode...");
            let addr = ([0, 0, 0, 0], settings.webhook_port).into();
            let url = public_url.parse()?;
            let mut options = webhooks::Options::new(addr, url);
            if let Some(secret) = &settings.webhook_secret {
                options = options.secret_token(secret.clone());
            }
            let listener = webhooks::axum(bot, options).await?;
            run_dispatcher(&mut dispatcher, listener).await;
        }
        None => {
            info!("Starting bot in polling mode...");
            let listener = Polling::builder(bot).drop_pending_updates().build();
            run_dispatcher(&mut dispatcher, listener).await;
        }
    }

    info!("EchoBuddy bot has been shut down.");

    Ok(())
}

async fn run_dispatcher<L>(
    dispatcher: &mut Dispatcher<Bot, Box<dyn std::error::Error + Send + Sync>, teloxide::dispatching::DefaultKey>,
    listener: L,
) where
    L: UpdateListener + Send,
    L::Err: std::fmt::Debug,
{
    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry().branch(
        Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<BotCommands>()
                    .endpoint(handle_commands),
            )
            .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text))
            .branch(dptree::filter(|msg: Message| msg.photo().is_some()).endpoint(handle_photo))
            .branch(
                dptree::filter(|msg: Message| msg.document().is_some()).endpoint(handle_document),
            )
            .branch(dptree::filter(|msg: Message| msg.voice().is_some()).endpoint(handle_voice))
            .branch(dptree::filter(|msg: Message| msg.video().is_some()).endpoint(handle_video))
            .branch(dptree::filter(|msg: Message| msg.audio().is_some()).endpoint(handle_audio))
            .branch(
                dptree::filter(|msg: Message| msg.sticker().is_some()).endpoint(handle_sticker),
            ),
    )
}

#[derive(TeloxideBotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "EchoBuddy Bot Commands")]
enum BotCommands {
    #[command(description = "Start the bot and see the welcome message")]
    Start,
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Configure your preferences")]
    Settings,
    #[command(description = "Show your usage statistics")]
    Stats,
}

/// Check the sender against the access gate; reply with the denial text when
/// there is one and report whether processing should continue
async fn gate_allows(bot: &Bot, msg: &Message, services: &ServiceFactory) -> bool {
    match services.gate.check_user_access(msg.from.as_ref()).await {
        AccessDecision::Allowed => true,
        AccessDecision::Denied(reason) => {
            warn!(chat_id = msg.chat.id.0, ?reason, "Update rejected by access gate");
            if let Some(text) = reason.user_message() {
                let _ = bot.send_message(msg.chat.id, text).await;
            }
            false
        }
    }
}

/// Log a handler error and send a generic apology, keeping the raw error out
/// of the chat
async fn report_handler_error(bot: &Bot, msg: &Message, err: &BotError) {
    logging::log_error(err, Some("update handler"));
    let _ = bot.send_message(msg.chat.id, format_error_message(err)).await;
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: BotCommands,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let services = (*services).clone();

    if !gate_allows(&bot, &msg, &services).await {
        return Ok(());
    }

    let result = match cmd {
        BotCommands::Start => start::handle_start(bot.clone(), msg.clone(), services).await,
        BotCommands::Help => help::handle_help(bot.clone(), msg.clone(), services).await,
        BotCommands::Settings => {
            settings_cmd::handle_settings(bot.clone(), msg.clone(), services).await
        }
        BotCommands::Stats => stats::handle_stats(bot.clone(), msg.clone(), services).await,
    };

    if let Err(e) = result {
        report_handler_error(&bot, &msg, &e).await;
    }

    Ok(())
}

macro_rules! content_handler {
    ($name:ident, $handler:path) => {
        async fn $name(bot: Bot, msg: Message, services: Arc<ServiceFactory>) -> HandlerResult {
            let services = (*services).clone();

            if !gate_allows(&bot, &msg, &services).await {
                return Ok(());
            }

            if let Err(e) = $handler(bot.clone(), msg.clone(), services).await {
                report_handler_error(&bot, &msg, &e).await;
            }

            Ok(())
        }
    };
}

content_handler!(handle_text, messages::handle_text);
content_handler!(handle_photo, messages::handle_photo);
content_handler!(handle_document, messages::handle_document);
content_handler!(handle_voice, messages::handle_voice);
content_handler!(handle_video, messages::handle_video);
content_handler!(handle_audio, messages::handle_audio);
content_handler!(handle_sticker, messages::handle_sticker);
