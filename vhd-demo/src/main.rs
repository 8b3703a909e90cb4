//! vhd-demo - command-line driver for the VHD upload/prediction workflow
//!
//! Runs the same health check → intake → submit → result sequence as the
//! demo page, against either the backend directly or vhd-proxy's `/api`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vhd_common::api::ClassLabel;
use vhd_common::catalog::examples_for;
use vhd_common::config::{load_config, resolve_backend_url};
use vhd_demo::report::{render_examples, render_result};
use vhd_demo::{
    CandidateSource, DemoConfig, HealthProber, LocalFile, WorkflowController, WorkflowPhase,
    WorkflowState,
};

const DEFAULT_SITE_URL: &str = "http://127.0.0.1:3000";

/// Pause between availability retries
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Command-line arguments for vhd-demo
#[derive(Parser, Debug)]
#[command(name = "vhd-demo")]
#[command(about = "Classify heart-sound recordings with the VHD backend")]
#[command(version)]
struct Args {
    /// Classification API base URL (backend, or `<proxy>/api`)
    #[arg(long, env = "VHD_DEMO_API_URL")]
    api_url: Option<String>,

    /// Site serving example recordings under /sound
    #[arg(long, env = "VHD_DEMO_SITE_URL", default_value = DEFAULT_SITE_URL)]
    site_url: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Re-check an unavailable service this many times
    #[arg(long, default_value_t = 0)]
    retry: u32,

    /// Per-request timeout in seconds (overrides config file)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the classification service is available
    Health,
    /// Classify a local recording
    Analyze {
        path: PathBuf,
        /// MIME type to declare instead of sniffing the content
        #[arg(long)]
        mime: Option<String>,
    },
    /// Classify one of the bundled example recordings
    Example { filename: String },
    /// List the bundled example recordings
    Examples {
        /// Only list recordings of this class (AS, MR, MS, MVP, N)
        #[arg(long)]
        label: Option<ClassLabel>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref());

    let default_level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vhd_demo={0},vhd_common={0}", default_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config.context("Failed to load configuration")?;

    if let Command::Examples { label } = args.command {
        let examples = examples_for(label);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&examples)?);
        } else {
            print!("{}", render_examples(&examples));
        }
        return Ok(());
    }

    let api_url = resolve_backend_url(args.api_url.as_deref(), &config)
        .context("Invalid API URL")?;
    let mut demo_config =
        DemoConfig::new(&api_url, &args.site_url).context("Invalid site URL")?;
    if let Some(secs) = args.timeout_secs.or(config.request_timeout_secs) {
        demo_config = demo_config.with_timeout(Duration::from_secs(secs));
    }
    info!("API: {}", demo_config.api_base_url);

    match args.command {
        Command::Health => check_health(&demo_config, args.retry, args.json).await,
        Command::Analyze { path, mime } => {
            let mut file = LocalFile::from_path(&path)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            if mime.is_some() {
                file.declared_mime = mime;
            }
            analyze(&demo_config, CandidateSource::Selected(file), args.retry, args.json).await
        }
        Command::Example { filename } => {
            analyze(&demo_config, CandidateSource::Example(filename), args.retry, args.json).await
        }
        Command::Examples { .. } => Ok(()),
    }
}

async fn check_health(config: &DemoConfig, retries: u32, json: bool) -> Result<()> {
    let http_client = config.http_client().context("Failed to build HTTP client")?;
    let prober = HealthProber::new(http_client, &config.api_base_url);

    let mut attempt = 0;
    let health = loop {
        match prober.probe().await {
            Ok(health) => break health,
            Err(e) if attempt < retries => {
                attempt += 1;
                warn!("{} (retry {}/{})", e, attempt, retries);
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => bail!("{}", e),
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        println!(
            "Service available: {} {} (model loaded)",
            health.service, health.version
        );
    }
    Ok(())
}

async fn analyze(
    config: &DemoConfig,
    source: CandidateSource,
    retries: u32,
    json: bool,
) -> Result<()> {
    let controller = WorkflowController::new(config).context("Failed to build HTTP client")?;

    controller.start().await;
    let mut attempt = 0;
    while controller.phase() == WorkflowPhase::Unavailable && attempt < retries {
        attempt += 1;
        warn!("Service unavailable (retry {}/{})", attempt, retries);
        tokio::time::sleep(RETRY_DELAY).await;
        controller.retry().await;
    }
    if let WorkflowState::Unavailable { reason } = controller.state() {
        bail!("Classification service unavailable: {}", reason);
    }

    controller
        .accept(source)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    controller.submit().await;

    match controller.state() {
        WorkflowState::Result { result, .. } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", render_result(&result));
            }
            Ok(())
        }
        WorkflowState::Idle {
            error: Some(error), ..
        } => bail!("{}", error),
        other => bail!("Unexpected workflow phase {:?}", other.phase()),
    }
}
