use clap::Parser;
use member::app::App;
use member::cli::{Cli, Commands};
use member::client::AuthClient;
use member::config::AppConfig;
use member::logger::Logger;
use member::router::{Location, RouteGuard, Router};
use member::session::SessionState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.api_url.clone())?;
    log::debug!("using auth api at {}", config.api_url);

    // One client serves the session and the guard so both see the same token.
    let client = Arc::new(AuthClient::new(&config.api_url, config.token_store()?));
    let session = Arc::new(SessionState::new(client.clone()));
    let app = App::new(session, Router::new(RouteGuard::new(client)));

    let command = cli.command.unwrap_or(Commands::Open { path: None });
    match &command {
        Commands::Logout => app.logout(),
        Commands::Status => app.status().await?,
        _ => {
            let path = command.start_path().unwrap_or_else(|| "/".to_string());
            Logger::banner();
            app.run(Location::parse(&path)).await?;
        }
    }

    Ok(())
}
