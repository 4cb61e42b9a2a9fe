use anyhow::Context as _;
use syringe_pump::{
    commands::handle_line,
    config::{create_default_config, init_config},
    controllers::syringe_pump::{create_pump, create_transport},
    logging,
};
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
use tracing::{debug, info};

fn should_create_config() -> bool {
    std::env::var("CREATE_CONFIG")
        .map(|val| val == "1" || val.to_lowercase() == "true")
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if should_create_config() {
        create_default_config()?;
    }

    let (config_manager, config) = init_config().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Run with CREATE_CONFIG=1 to create a default configuration file.");
        e
    })?;

    let _log_guard = logging::init(&config.logging)?;
    info!("Loaded configuration from {}", config_manager.path().display());

    let transport = Box::new(create_transport(&config.pump));
    let (executor, sender) = create_pump(&config.pump, transport)
        .with_context(|| format!("Failed to initialize syringe pump on {}", config.pump.port))?;
    let executor_handle = executor.spawn();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        debug!("Received '{}'", line);
        let reply = handle_line(&line, &sender).await;

        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    drop(sender);
    executor_handle.await?;
    info!("Input closed, shutting down");

    Ok(())
}
