use std::{io, sync::Arc};

use anyhow::Result;
use clap::Parser;
use consul_chat::{
    api::HttpAskClient,
    cli::{Cli, Commands},
    config::Config,
    logging, oneshot, tui,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Some(Commands::Ask { question }) => {
            logging::init_stderr()?;
            let client = HttpAskClient::new(&config)?;

            let (answer, _) = oneshot::ask_once(&client, &question.join(" "), io::stdout()).await;
            if answer.is_none() {
                eprintln!("Nada que preguntar: la pregunta está vacía.");
            }
        }
        Some(Commands::Health) => {
            logging::init_stderr()?;
            let client = HttpAskClient::new(&config)?;

            let health = client.health().await?;
            println!("{}: {}", client.base_url(), health.status);
            if !health.is_ok() {
                anyhow::bail!("Service reported status '{}'", health.status);
            }
        }
        None => {
            logging::init_file(&config.log_file)?;
            tracing::info!(
                server = %config.server_url,
                session = %config.session_id,
                timeout = ?config.timeout,
                "starting chat screen"
            );

            let client = Arc::new(HttpAskClient::new(&config)?);
            tui::install_panic_hook();
            tui::run(client, &config.server_url, &config.session_id).await?;
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(server) = &cli.server {
        config = config.with_server_url(server)?;
    }
    if let Some(session_id) = &cli.session_id {
        config = config.with_session_id(session_id);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout_secs(secs);
    }
    if let Some(path) = &cli.log_file {
        config = config.with_log_file(path.clone());
    }

    Ok(config)
}
