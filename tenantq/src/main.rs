//! tenantq - deployment queue provisioning for tenants
//!
//! Runs the provisioning handler inside AWS Lambda, behind a local HTTP
//! endpoint, or once from the command line.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tenantq::config::{Backend, Config};
use tenantq::router::{self, AppState};
use tenantq::runtime::RuntimeClient;
use tenantq::{build_handler, ProvisioningHandler};
use tenantq_core::RequestId;
use tenantq_sqs::ExistenceProbe;

#[derive(Parser, Debug)]
#[command(name = "tenantq")]
#[command(about = "Provision and remove tenant deployment queues", long_about = None)]
struct Args {
    /// Configuration file (defaults to ./tenantq.{toml,yaml,json} if present)
    #[arg(short, long, env = "TENANTQ_CONFIG")]
    config: Option<PathBuf>,

    /// AWS region (overrides REGION)
    #[arg(long)]
    region: Option<String>,

    /// AWS endpoint override, e.g. a local emulator
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Service backend: aws or ephemeral
    #[arg(long)]
    backend: Option<Backend>,

    /// Existence probe policy: strict or fail-open
    #[arg(long)]
    existence_probe: Option<ExistenceProbe>,

    /// Notification topic ARN
    #[arg(long)]
    topic_arn: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve POST /invoke for local invocations
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Handle a single event and print the response
    Invoke {
        /// Event file, or `-` for stdin
        #[arg(long, default_value = "-")]
        event: String,
    },
    /// Process invocations from the Lambda Runtime API
    Lambda,
    /// Publish a JSON message to the notification topic
    Notify {
        /// JSON message body
        #[arg(long)]
        message: String,

        /// Message attribute as name=value
        #[arg(long, value_parser = parse_attribute)]
        attribute: (String, String),
    },
}

fn parse_attribute(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", s))
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(region) = &self.region {
            config.aws.region = region.clone();
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            config.aws.endpoint_url = Some(endpoint_url.clone());
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(probe) = self.existence_probe {
            config.existence_probe = probe;
        }
        if let Some(topic_arn) = &self.topic_arn {
            config.notification.topic_arn = Some(topic_arn.clone());
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone();
        }
        if let Command::Serve { host, port } = &self.command {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    args.apply(&mut config);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tenantq={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let handler = build_handler(&config).await;

    match args.command {
        Command::Serve { .. } => serve(&config, handler).await,
        Command::Invoke { event } => invoke(&handler, &event).await,
        Command::Lambda => {
            let client = RuntimeClient::from_env()?;
            client.run(&handler).await?;
            Ok(())
        }
        Command::Notify { message, attribute } => {
            let message: serde_json::Value =
                serde_json::from_str(&message).context("parsing --message")?;
            let ack = handler.notify(&message, &attribute.0, &attribute.1).await?;
            println!("{}", serde_json::to_string(&ack)?);
            Ok(())
        }
    }
}

async fn serve(config: &Config, handler: ProvisioningHandler) -> anyhow::Result<()> {
    let app = router::create_router(AppState::new(handler, config.backend));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn invoke(handler: &ProvisioningHandler, source: &str) -> anyhow::Result<()> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("reading {}", source))?
    };

    let request_id = RequestId::new();
    let event = serde_json::from_str(&raw).context("parsing event")?;

    match handler.handle_event(event, &request_id).await {
        Ok(response) => {
            println!("{}", response);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.to_response(&request_id).to_json());
            Err(e.into())
        }
    }
}
