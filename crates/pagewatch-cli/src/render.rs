//! Plain-text rendering of screen views.

use std::time::Duration;

use chrono::Local;
use pagewatch_screens::{ScreenState, ScreenView};
use tokio::sync::watch;

const BAR_WIDTH: usize = 30;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Draws every view change until the sequencer goes away. Frames are
/// throttled; intermediate views are skipped, never reordered.
pub async fn render_loop(mut views: watch::Receiver<ScreenView>, json: bool) {
    loop {
        let view = views.borrow_and_update().clone();
        if json {
            println!("{}", frame_json(&view));
        } else {
            print!("{CLEAR}{}", render_frame(&view));
        }
        tokio::time::sleep(FRAME_INTERVAL).await;
        if views.changed().await.is_err() {
            break;
        }
    }
}

pub fn frame_json(view: &ScreenView) -> serde_json::Value {
    serde_json::json!({
        "state": view.state,
        "advisory": view.advisory,
        "typed": view.typed_text(),
        "ip": view.identity.ip,
        "country": view.identity.country,
    })
}

pub fn render_frame(view: &ScreenView) -> String {
    match view.state {
        ScreenState::Loading { progress } => {
            format!("{} {progress}%\n{}\n", bar(progress), view.advisory)
        }
        ScreenState::ThankYou => "✔ Thank you!\nYour request has been received.\n".to_string(),
        ScreenState::Breach(breach) => {
            let cursor = if breach.cursor_visible { "_" } else { " " };
            format!(
                "{typed}{cursor}\n\
                 \n\
                 ⚠ CRITICAL ALERT\n\
                 Trace progress     {trace_bar} {progress}%\n\
                 Data extraction    {extraction_bar} {extraction}%\n\
                 \n\
                 TIMESTAMP: {now}\n\
                 YOUR IP:   {ip}\n\
                 LOCATION:  {country}\n\
                 STATUS:    TRACKED & LOGGED\n",
                typed = view.typed_text(),
                trace_bar = bar(breach.progress),
                progress = breach.progress,
                extraction_bar = bar(breach.extraction),
                extraction = breach.extraction,
                now = Local::now().format("%Y-%m-%d %H:%M:%S"),
                ip = view.identity.ip,
                country = view.identity.country,
            )
        }
    }
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
