//! The visitor side of the pipeline.
//!
//! Runs the screen sequence while the identity lookup is in flight, then
//! posts exactly one [`VisitorEvent`] to the notification server.

use std::time::Duration;

use chrono::Utc;
use clap::Args;
use pagewatch_core::{AppConfig, VisitorEvent};
use pagewatch_geo::{GeoLookupClient, VisitorLocationInfo};
use pagewatch_screens::{Identity, ScreenSequencer, ScreenTimings};
use reqwest::{Client, StatusCode};

use crate::render;

#[derive(Debug, Args)]
pub struct VisitArgs {
    /// Base URL of the pagewatch server.
    #[arg(long, env = "PAGEWATCH_SERVER_URL", default_value = "http://localhost:5000")]
    pub server: String,
    /// User agent reported in the visitor event.
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Only resolve and post; do not play the screens.
    #[arg(long)]
    pub no_screens: bool,
    /// Emit one JSON line per frame instead of drawing to the terminal.
    #[arg(long)]
    pub json: bool,
}

/// Runs one visit. With screens enabled this only returns on Ctrl-C, since
/// the breach screen is terminal.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built or the Ctrl-C handler
/// cannot be installed. Lookup and delivery failures are logged, not
/// returned.
pub async fn run(config: &AppConfig, args: VisitArgs) -> anyhow::Result<()> {
    let screens = if args.no_screens {
        None
    } else {
        let (sequencer, handle) = ScreenSequencer::new(ScreenTimings::default());
        let sequencer_task = tokio::spawn(sequencer.run());
        let render_task = tokio::spawn(render::render_loop(handle.subscribe(), args.json));
        Some((handle, sequencer_task, render_task))
    };

    let geo = GeoLookupClient::new(config.geo_timeout_secs, &config.user_agent)?;
    let info = geo.resolve().await;
    if let Some((handle, _, _)) = &screens {
        handle.set_identity(identity_for(&info));
    }

    let user_agent = args.user_agent.unwrap_or_else(default_user_agent);
    let event = build_event(info, user_agent);

    let http = Client::builder()
        .timeout(Duration::from_secs(config.dispatch_timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()?;
    match post_visitor_event(&http, &args.server, &event).await {
        Ok(status) if status.is_success() => {
            tracing::info!(ip = %event.ip, "visitor event accepted");
        }
        Ok(status) => {
            tracing::warn!(ip = %event.ip, status = status.as_u16(), "visitor event not accepted");
        }
        Err(e) => tracing::warn!(error = %e, "failed to reach notification server"),
    }

    if let Some((_handle, sequencer_task, render_task)) = screens {
        tokio::signal::ctrl_c().await?;
        sequencer_task.abort();
        render_task.abort();
    }
    Ok(())
}

fn identity_for(info: &VisitorLocationInfo) -> Identity {
    Identity {
        ip: info.ip.clone(),
        country: info.country().to_string(),
    }
}

fn build_event(info: VisitorLocationInfo, user_agent: String) -> VisitorEvent {
    VisitorEvent {
        ip: info.ip,
        location: info.location,
        timestamp: Utc::now(),
        user_agent,
    }
}

fn default_user_agent() -> String {
    format!(
        "pagewatch-cli/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Posts `event` to `{server}/api/notify` once and returns the status.
async fn post_visitor_event(
    http: &Client,
    server: &str,
    event: &VisitorEvent,
) -> Result<StatusCode, reqwest::Error> {
    let url = format!("{}/api/notify", server.trim_end_matches('/'));
    let response = http.post(url).json(event).send().await?;
    Ok(response.status())
}
