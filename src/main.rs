mod config;
mod driver;
mod game;
mod screen;
mod telegram;

use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use log::{error, info, warn};
use teloxide::{prelude::*, utils::command::BotCommands};
use telegram::{ChatStorage, Command};

#[tokio::main]
async fn main() {
    // .env is optional; RUST_LOG and TELOXIDE_TOKEN may come from the shell
    dotenv().ok();

    pretty_env_logger::init();
    info!("Starting nature challenge bot...");

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            error!("Invalid configuration: {err}");
            std::process::exit(1);
        }
    };
    if let Some(seed) = config.seed {
        info!("Shuffling with fixed seed {seed}");
    }

    let bot = Bot::from_env();
    if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Could not register bot commands: {err}");
    }

    Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![ChatStorage::new(), config])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
