use std::path::PathBuf;

use async_trait::async_trait;
use clap::Parser;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rest_pipeline::config::{load_config, AppConfig};
use rest_pipeline::{json, log_method_enter, log_method_exit, Action, ActionResult, Application, DefaultCustomization, Session};

#[derive(Parser, Debug)]
#[command(name = "rest-pipeline", version, about = "REST request pipeline server")]
struct Args {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    session_id: String,
}

struct Health;

#[async_trait]
impl Action for Health {
    async fn invoke(&self, session: &mut Session) -> ActionResult {
        log_method_enter!(session);
        let report = HealthReport {
            status: "ok",
            session_id: session.id().to_string(),
        };
        log_method_exit!(session);
        json(&report)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("rest-pipeline v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        routes = config.routes.len(),
        allowed_log_type = %config.logging.allowed_log_type,
        allowed_log_level = %config.logging.allowed_log_level,
        "Configuration loaded"
    );

    let bind_address = config.server.bind_address.clone();
    let has_health_route = config.routes.iter().any(|route| route.endpoint == "Health");

    let mut app = Application::new(config, DefaultCustomization)?;
    app.register_action("Health", Health);
    if !has_health_route {
        app.add_route("Health", "GET", "/health");
    }

    let listener = TcpListener::bind(&bind_address).await?;
    app.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
