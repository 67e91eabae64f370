//! Picolytics simulator — replays a scripted page session through the
//! beacon lifecycle and delivers the beacons to a collection server.

mod host;
mod runner;
mod scenario;
mod transport;

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use picolytics_beacon::BeaconContext;
use picolytics_core::SimConfig;
use tracing::{info, warn};

use crate::host::SimHost;
use crate::runner::SessionRunner;
use crate::scenario::Step;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "picolytics-sim")]
#[command(about = "Simulate a page session and send its analytics beacons")]
#[command(version)]
struct Cli {
    /// URL the beacon script was served from; the endpoint is derived from it
    #[arg(long, env = "PICOLYTICS__SCRIPT_SRC")]
    script_src: Option<String>,

    /// Page URL the session starts on
    #[arg(long, env = "PICOLYTICS__PAGE__URL")]
    page_url: Option<String>,

    /// Referrer reported with every event
    #[arg(long)]
    referrer: Option<String>,

    /// Session length in seconds
    #[arg(long, env = "PICOLYTICS__DURATION_SECS")]
    duration_secs: Option<u64>,

    /// Delay between scripted steps, in milliseconds
    #[arg(long)]
    step_interval_ms: Option<u64>,

    /// Ping period in milliseconds
    #[arg(long)]
    ping_interval_ms: Option<u64>,

    /// Scripted step, repeatable: hidden, visible, popstate[:url],
    /// hashchange:#frag, dnt:on|off, event:name
    #[arg(long = "step")]
    steps: Vec<Step>,

    /// Signal Do-Not-Track from the start
    #[arg(long, default_value_t = false)]
    dnt: bool,

    /// Start with the page hidden (background tab)
    #[arg(long, default_value_t = false)]
    hidden: bool,

    /// Print beacon bodies to stdout instead of sending them
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "picolytics_sim=info,picolytics_beacon=info".into());
    match cli.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    let mut config = SimConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        SimConfig::default()
    });

    // Apply CLI overrides
    if let Some(src) = cli.script_src {
        config.script_src = src;
    }
    if let Some(url) = cli.page_url {
        config.page.url = url;
    }
    if let Some(referrer) = cli.referrer {
        config.page.referrer = referrer;
    }
    if let Some(secs) = cli.duration_secs {
        config.duration_secs = secs;
    }
    if let Some(ms) = cli.step_interval_ms {
        config.step_interval_ms = ms;
    }
    if let Some(ms) = cli.ping_interval_ms {
        config.beacon.ping_interval_ms = ms;
    }
    if cli.dnt {
        config.page.do_not_track = Some("1".to_string());
    }
    if cli.hidden {
        config.page.start_hidden = true;
    }

    let context = BeaconContext::with_options(&config.script_src, config.beacon.clone());
    info!(
        endpoint = %context.endpoint(),
        page_url = %config.page.url,
        duration_secs = config.duration_secs,
        steps = cli.steps.len(),
        dry_run = cli.dry_run,
        "Picolytics simulator starting"
    );

    let transport = if cli.dry_run {
        transport::stdout_transport()
    } else {
        transport::http_transport(config.request_timeout())?
    };
    let host = Arc::new(SimHost::from_config(&config.page, transport));

    let summary = SessionRunner::new(
        host,
        context,
        cli.steps,
        config.step_interval(),
        config.duration(),
    )
    .run()
    .await;

    if summary.queued == 0 {
        warn!("no beacons were queued during the session");
    }

    // Give detached deliveries a moment to finish before the runtime drops them.
    if !cli.dry_run {
        tokio::time::sleep(config.request_timeout().min(std::time::Duration::from_secs(1))).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_steps() {
        let cli = Cli::try_parse_from([
            "picolytics-sim",
            "--script-src",
            "https://analytics.example.com/picolytics.js",
            "--step",
            "hidden",
            "--step",
            "hashchange:#pricing",
            "--dry-run",
        ])
        .expect("valid arguments");
        assert_eq!(cli.steps.len(), 2);
        assert!(cli.dry_run);
        assert_eq!(cli.script_src.as_deref(), Some("https://analytics.example.com/picolytics.js"));
    }

    #[test]
    fn test_cli_rejects_bad_step() {
        assert!(Cli::try_parse_from(["picolytics-sim", "--step", "scroll"]).is_err());
    }
}
