use clap::{Parser, Subcommand};
use shapeshift::{from_config, load_record, RestApi, ShapeshiftConfig};
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Reshape JSON records onto a target structure using embedding similarity
#[derive(Parser, Debug)]
#[command(name = "shapeshift")]
#[command(about = "Map JSON fields onto a target shape by meaning", long_about = None)]
struct Args {
    /// Embedding provider: cohere, openai or voyage
    #[arg(long, env = "SHAPESHIFT_PROVIDER", global = true, default_value = "voyage")]
    provider: String,

    /// API key for the embedding provider
    #[arg(long, env = "SHAPESHIFT_API_KEY", global = true, hide_env_values = true, default_value = "")]
    api_key: String,

    /// Embedding model (defaults depend on the provider)
    #[arg(long, env = "SHAPESHIFT_MODEL", global = true)]
    model: Option<String>,

    /// Minimum cosine similarity for a match
    #[arg(long, env = "SHAPESHIFT_THRESHOLD", global = true)]
    threshold: Option<f32>,

    /// Override the provider API root
    #[arg(long, env = "SHAPESHIFT_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Read provider settings from a JSON config file instead of flags
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reshape one source record and print the result
    Map {
        /// Path to the source JSON record
        #[arg(short, long)]
        source: PathBuf,

        /// Path to the target JSON template
        #[arg(short, long)]
        target: PathBuf,

        /// Print the match report alongside the result
        #[arg(long)]
        report: bool,
    },
    /// Serve the REST API
    Serve {
        /// HTTP API port
        #[arg(long, default_value_t = 6480)]
        http_port: u16,
    },
}

impl Args {
    fn shapeshift_config(&self) -> anyhow::Result<ShapeshiftConfig> {
        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)?;
            return Ok(ShapeshiftConfig::from_json(&text)?);
        }

        let mut config = ShapeshiftConfig::new(&self.provider, self.api_key.clone())?;
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        Ok(config)
    }
}

/// Best-effort text of a thread panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so `map` output stays pipeable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.shapeshift_config()?;
    let shifter = from_config(&config)?;
    info!(
        "shapeshift v{} using {} ({}), threshold {}",
        env!("CARGO_PKG_VERSION"),
        config.embedding_client,
        config.model(),
        config.threshold()
    );

    match args.command {
        Command::Map {
            source,
            target,
            report,
        } => {
            let source = load_record(&source)?;
            let target = load_record(&target)?;
            let shifted = shifter.shapeshift_with_report(&source, &target).await?;

            let output = if report {
                serde_json::json!({ "result": shifted.tree, "report": shifted.report })
            } else {
                shifted.tree
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Serve { http_port } => {
            let shifter = Arc::new(shifter);
            let http_handle = std::thread::spawn(move || {
                let sys = actix_web::rt::System::new();
                sys.block_on(RestApi::start(shifter, http_port))
            });

            info!("HTTP API: http://localhost:{}/", http_port);

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                }
                joined = tokio::task::spawn_blocking(move || http_handle.join()) => {
                    match joined {
                        Ok(Ok(Ok(()))) => {}
                        Ok(Ok(Err(e))) => error!("HTTP server error: {}", e),
                        Ok(Err(panic)) => error!("HTTP server thread panicked: {}", panic_message(&*panic)),
                        Err(e) => error!("HTTP server watcher failed: {}", e),
                    }
                    info!("HTTP server stopped");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_server_thread() {
        let joined = std::thread::spawn(|| -> std::io::Result<()> {
            panic!("bind failed on {}", 6480)
        })
        .join();
        let payload = joined.unwrap_err();
        assert_eq!(panic_message(&*payload), "bind failed on 6480");

        let payload = std::thread::spawn(|| std::panic::panic_any(7u8)).join().unwrap_err();
        assert_eq!(panic_message(&*payload), "non-string panic payload");

        let payload = std::thread::spawn(|| panic!("literal")).join().unwrap_err();
        assert_eq!(panic_message(&*payload), "literal");
    }
}
