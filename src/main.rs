use assoc_client::{ClientConfig, QueryClient};
use assoc_core::{config::Config, Query};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "assoc", about = "assoc: explain word-association chains from the terminal")]
struct Cli {
    /// Write debug logs to /tmp/assoc-debug.log (tail -f to inspect).
    /// With `query`, logs go to stderr instead.
    #[arg(long, global = true)]
    debug: bool,

    /// Backend base URL, overriding `server.url` from the config file.
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run a single query and print the explained chains.
    Query {
        /// Comma-separated search terms.
        #[arg(long)]
        terms: String,
        /// Comma-separated stage names, e.g. Homophone,WikiArticleStem.
        #[arg(long)]
        stages: String,
        #[arg(long, default_value = "")]
        flavortext: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        match cli.command {
            Some(Cmd::Query { .. }) => init_stderr_logging(),
            None => init_file_logging()?,
        }
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config unreadable, using defaults");
        Config::defaults()
    });
    if let Some(url) = cli.server {
        config.server.url = url;
    }

    let client = QueryClient::new(ClientConfig::from(&config.server))?;
    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Some(Cmd::Query { terms, stages, flavortext }) => {
            let query = Query::from_fields(&terms, &stages, &flavortext);
            let outcome = runtime.block_on(client.query(&query))?;
            println!("{}", outcome.render());
            Ok(())
        }
        None => assoc_tui::run(config, client, runtime.handle().clone()),
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"))
}

fn init_file_logging() -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("/tmp/assoc-debug.log")?;
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(env_filter())
        .init();
    tracing::info!("assoc debug log started, tail -f /tmp/assoc-debug.log");
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter())
        .init();
}
