use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use roomrelay::bot::{build_bot, run_polling, TelegramOutbound};
use roomrelay::{AdminAccess, AppContext, Config, Database, Dispatcher};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            if let Err(e) = config.apply_env_overrides() {
                eprintln!("Invalid environment override: {e}");
                return ExitCode::FAILURE;
            }
            config
        }
    };

    // Initialize logging
    if let Err(e) = roomrelay::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        roomrelay::logging::init_console_only(&config.logging.level);
    }

    info!("roomrelay starting");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> roomrelay::Result<()> {
    config.validate()?;

    let db = Database::open(&config.database.path).await?;
    let admins = AdminAccess::new(config.telegram.admin_ids.iter().copied());
    info!(admins = admins.len(), "Admin allow-list loaded");

    let bot = build_bot(&config.telegram)?;
    let outbound = Arc::new(TelegramOutbound::new(bot.clone()));
    let ctx = Arc::new(AppContext::new(db, admins, outbound));
    let dispatcher = Dispatcher::new(ctx);

    run_polling(bot, &config.telegram, dispatcher).await
}
