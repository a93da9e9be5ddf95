//! Terminal front end: the interactive authorization prompt and the
//! presenter that renders engine notifications.

use crate::engine::{Control, UiEvent};
use crate::reddit::{Authorizer, RedditError};
use crate::store::{Cooldown, UsageStats};
use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

/// Asks the user to open the authorize URL and paste back the redirect
pub struct ConsoleAuthorizer;

#[async_trait]
impl Authorizer for ConsoleAuthorizer {
    async fn authorize(&self, authorize_url: &Url) -> Result<String, RedditError> {
        println!();
        println!("Open this URL in a browser and approve access:");
        println!("  {}", authorize_url);
        println!();
        println!("Then paste the full address you were redirected to (empty to cancel):");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let line = lines
            .next_line()
            .await
            .map_err(|e| RedditError::AuthDeclined(format!("could not read input: {}", e)))?;

        match line.map(|l| l.trim().to_string()) {
            Some(redirect) if !redirect.is_empty() => Ok(redirect),
            _ => Err(RedditError::AuthDeclined(
                "no redirect address entered".to_string(),
            )),
        }
    }
}

/// Prints engine events until every notifier is dropped
pub struct ConsolePresenter;

impl ConsolePresenter {
    pub fn spawn(mut events: UnboundedReceiver<UiEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    UiEvent::Print(entry) => println!("[{}] {}", entry.stamp(), entry.message),
                    UiEvent::Usage(usage) => println!("{}", render_usage(&usage)),
                    UiEvent::Cooldown {
                        cooldown,
                        lock_controls,
                    } => {
                        if lock_controls {
                            println!("{}", render_cooldown(Some(&cooldown)));
                        } else {
                            debug!("Advisory cooldown of {}s", cooldown.duration_secs);
                        }
                    }
                    UiEvent::Lock(control) => debug!("Lock {}", control_name(control)),
                    UiEvent::Unlock(control) => debug!("Unlock {}", control_name(control)),
                    UiEvent::Phase(phase) => debug!("Phase {:?}", phase),
                }
            }
        })
    }
}

fn control_name(control: Control) -> &'static str {
    match control {
        Control::Abort => "abort",
        Control::All => "start controls",
    }
}

pub fn render_usage(usage: &UsageStats) -> String {
    format!(
        "Lifetime: {} run(s), {} item(s) deleted",
        usage.runs, usage.deleted
    )
}

pub fn render_cooldown(cooldown: Option<&Cooldown>) -> String {
    match cooldown.map(|c| c.remaining_at(Utc::now())) {
        Some(remaining) if remaining > 0 => {
            format!("Cooldown: ready again in {} seconds", remaining)
        }
        _ => "Cooldown: none, ready to run".to_string(),
    }
}
