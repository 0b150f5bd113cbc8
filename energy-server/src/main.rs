use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "energy-server")]
#[command(about = "Energy statistics explorer API")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "energy.toml")]
    config: String,

    /// Address to bind to (overrides server.bind_addr)
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<String>,

    /// Elastic Cloud ID
    #[arg(long, env = "CLOUD_ID", hide_env_values = true)]
    cloud_id: Option<String>,

    /// Elasticsearch URL, used instead of the cloud ID
    #[arg(long, env = "ELASTIC_URL")]
    elastic_url: Option<String>,

    /// Elasticsearch API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log output format: pretty or json
    #[arg(long, env = "LOG_FORMAT")]
    log_format: Option<String>,
}

fn init_tracing(config: &energy::config::ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load config
    let mut config = energy::config::Config::load_or_create(std::path::Path::new(&args.config))?;

    if let Some(format) = args.log_format {
        config.observability.log_format = format;
    }
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if args.cloud_id.is_some() {
        config.backend.cloud_id = args.cloud_id;
    }
    if args.elastic_url.is_some() {
        config.backend.url = args.elastic_url;
    }
    if args.api_key.is_some() {
        config.backend.api_key = args.api_key;
    }

    init_tracing(&config.observability);

    tracing::info!("Starting energy explorer on {}", config.server.bind_addr);
    tracing::info!("Config file: {}", args.config);
    tracing::info!("Backend index: {}", config.backend.index);

    if !config.backend.has_credentials() {
        tracing::warn!(
            "Backend credentials missing (CLOUD_ID/ELASTIC_URL and API_KEY); every request will fail until they are set"
        );
    }

    let service = Arc::new(energy::EnergyService::from_config(&config.backend)?);
    let server = energy::api::ApiServer::with_cors(service, config.server.cors.clone());

    server.serve(&config.server.bind_addr).await?;

    Ok(())
}
