//! Live admin view: stats and the rendered queue, refreshed on a fixed
//! cadence. Stats and the message list are fetched concurrently; a
//! failed refresh keeps the previous screen and tries again next cycle.

use std::time::Duration;

use chrono::Local;
use tokio::time::interval;
use tracing::warn;

use signboard_core::{Config, CoreError, Gateway};

pub async fn run(gateway: Gateway, config: &Config) -> Result<(), CoreError> {
    let mut refresh = interval(Duration::from_secs(config.poll.admin_secs));
    loop {
        refresh.tick().await;
        let (stats, messages) = tokio::join!(gateway.stats(), gateway.list_messages());
        match (stats, messages) {
            (Ok(stats), Ok(messages)) => {
                // Clear screen, cursor home.
                print!("\x1b[2J\x1b[H");
                println!("SIGNBOARD ADMIN  ({})", Local::now().format("%H:%M:%S"));
                println!(
                    "submitted: {}   displayed: {}   in queue: {}",
                    stats.total_submitted,
                    stats.shown_messages,
                    messages.len()
                );
                println!();
                if messages.is_empty() {
                    println!("  (queue empty)");
                }
                for (index, message) in messages.iter().enumerate() {
                    let badge = if message.shown { "shown  " } else { "unshown" };
                    let current = if index == 0 { "  << next up" } else { "" };
                    println!(
                        "  #{:<3} [{badge}] {}  {}{current}",
                        index + 1,
                        message
                            .timestamp
                            .with_timezone(&Local)
                            .format("%H:%M:%S"),
                        message.line1,
                    );
                }
            }
            (stats, messages) => {
                if let Err(e) = stats {
                    warn!(error = %e, "stats refresh failed");
                }
                if let Err(e) = messages {
                    warn!(error = %e, "queue refresh failed");
                }
            }
        }
    }
}
