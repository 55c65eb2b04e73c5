mod bot;
mod classifier;
mod composer;
mod config;
mod openai;
mod scheduler;

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use bot::{Engine, EngineOptions, InboundMessage, TelegramTransport};
use classifier::Classifier;
use composer::Composer;
use config::Config;
use scheduler::ReplyScheduler;

struct BotState {
    engine: Engine,
    transport: Arc<TelegramTransport>,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "cumplebot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fatal: {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("cumplebot.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🎂 Starting cumplebot...");
    info!("Loaded config from {config_path}");
    if config.dry_run {
        info!("DRY RUN mode enabled");
    }

    // A bot that cannot identify itself cannot address replies; bail early.
    let me = match bot.get_me().await {
        Ok(me) => me,
        Err(e) => {
            error!("Failed to connect to Telegram: {e}");
            std::process::exit(1);
        }
    };
    info!("Bot user ID: {}, username: @{}", me.id, me.username());
    info!(
        "⏰ reply window: {}..{}s, typing simulation {}",
        config.delay_min_seconds,
        config.delay_max_seconds,
        if config.simulate_typing { "on" } else { "off" },
    );

    let transport = Arc::new(TelegramTransport::new(bot.clone(), me.id));
    let backend = Arc::new(openai::Client::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    ));
    let engine = Engine::new(
        Classifier::new(),
        Composer::new(backend),
        ReplyScheduler::new(config.delay_min_seconds, config.delay_max_seconds),
        transport.clone(),
        EngineOptions {
            simulate_typing: config.simulate_typing,
            dry_run: config.dry_run,
        },
    );

    let state = Arc::new(BotState { engine, transport });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_new_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_new_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    let sender_id = state.transport.remember(&msg);

    state
        .engine
        .handle_message(InboundMessage {
            sender_id,
            text,
            timestamp: msg.date,
        })
        .await;

    Ok(())
}
