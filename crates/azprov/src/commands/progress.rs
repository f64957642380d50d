//! Terminal progress for provisioning
//!
//! Step announcements go to stdout in text mode. Waiting on a long-running
//! operation shows a spinner on stderr, which indicatif hides automatically
//! when stderr is not a terminal.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use azprov_core::{ProgressCallback, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::OutputFormat;

/// Build the progress callback for the given output format
pub fn reporter(format: OutputFormat) -> ProgressCallback {
    let announce = format == OutputFormat::Text;
    let spinner: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));

    Arc::new(move |event: ProgressEvent| {
        if announce && let Some(line) = announcement(&event) {
            println!("{}", line);
        }

        let Ok(mut slot) = spinner.lock() else {
            return;
        };
        match &event {
            ProgressEvent::Started { resource } => {
                let pb = new_spinner();
                pb.set_message(format!("Waiting for {}", resource));
                *slot = Some(pb);
            }
            ProgressEvent::Polling {
                resource, status, ..
            } => {
                if let Some(pb) = slot.as_ref() {
                    pb.set_message(format!("{}: {}", resource, format_state(status)));
                }
            }
            ProgressEvent::Completed { resource } => {
                if let Some(pb) = slot.take() {
                    pb.finish_and_clear();
                }
                tracing::debug!("{} finished", resource);
            }
            ProgressEvent::Failed { resource, error } => {
                if let Some(pb) = slot.take() {
                    pb.abandon_with_message(format!("{} failed: {}", resource, error));
                }
            }
            _ => {}
        }
    })
}

/// Text-mode line for step events
fn announcement(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::ResourceGroupCreating { name, region } => Some(format!(
            "Creating Resource Group: {} in {}...",
            name, region
        )),
        ProgressEvent::ResourceGroupExists { name } => {
            Some(format!("Resource Group {} already exists.", name))
        }
        _ => None,
    }
}

fn new_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Format operation state for display with status icons
fn format_state(state: &str) -> String {
    match state.to_lowercase().as_str() {
        "succeeded" => format!("\u{2713} {}", state),
        "failed" => format!("\u{2717} {}", state),
        "canceled" => format!("\u{2298} {}", state),
        "inprogress" | "accepted" | "creating" | "resolvingdns" => {
            format!("\u{21bb} {}", state)
        }
        _ => state.to_string(),
    }
}
