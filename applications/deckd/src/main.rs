/// Deck daemon - headless single-track player with a console front end
use clap::Parser;
use deckd::console::read_lines;
use deckd::{Console, DaemonConfig, Overrides, PlaybackService};
use std::io::BufReader;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deckd")]
#[command(about = "Headless music player controlled from the console", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "DECK_CONFIG")]
    config: Option<PathBuf>,

    /// Music directory to scan (repeatable, replaces configured directories)
    #[arg(short, long = "music-dir", value_name = "DIR")]
    music_dirs: Vec<PathBuf>,

    /// Progress reporting interval in milliseconds
    #[arg(long, value_name = "N")]
    interval_ms: Option<u64>,

    /// Log filter, e.g. "info" or "deck_playback=debug"
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DaemonConfig::load(cli.config.as_deref())?;
    config.apply(Overrides {
        music_dirs: cli.music_dirs,
        progress_interval_ms: cli.interval_ms,
        log_level: cli.log_level,
    });

    // Initialize tracing; stdout belongs to the console
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    config.validate()?;

    tracing::info!("Starting Deck daemon");
    for dir in &config.library.music_dirs {
        tracing::info!("Music directory: {}", dir.display());
    }

    let mut service = PlaybackService::start(&config)?;

    {
        let mut console = Console::new(&service);
        let input = read_lines(BufReader::new(std::io::stdin()));
        let mut stdout = std::io::stdout();

        println!("{} tracks, type 'help' for commands", service.library().len());

        tokio::select! {
            result = console.run(input, &mut stdout) => result?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
            }
        }
    }

    service.shutdown();
    Ok(())
}
