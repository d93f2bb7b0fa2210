//! Tableau console entry point.

use std::error::Error;
use std::sync::Arc;

use tableau_core::clock::SystemClock;
use tableau_host::console::Console;
use tableau_host::story::Story;
use tableau_host::{App, HostConfig};
use tableau_persistence::FileSnapshotStore;
use tableau_session::SessionConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{MissedTickBehavior, interval};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so they never interleave with the story on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let config = HostConfig::from_env()?;
    tracing::info!(save_dir = %config.save_dir.display(), "Starting Tableau");

    let store = FileSnapshotStore::open(&config.save_dir).await?;
    let story = match &config.story {
        Some(path) => Story::load(path).await?,
        None => Story::demo(),
    };

    let mut app = App::new(
        SessionConfig::default().with_wait_timeout(config.wait_timeout_ticks),
        Arc::new(store),
        Arc::new(SystemClock),
        story,
        Console::stdout(),
        config.tick,
    );
    app.start();

    let mut ticker = interval(config.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    while !app.quit_requested() {
        tokio::select! {
            _ = ticker.tick() => app.pump().await,
            line = input.next_line() => match line? {
                Some(line) => app.handle_line(&line).await,
                None => break,
            },
        }
    }

    tracing::info!("Tableau stopped");
    Ok(())
}
