//! The unattended display loop.
//!
//! One cooperative `select!` loop drives everything: the 100ms rotation
//! tick, the 3s queue-growth poll, the 1s trigger poll, and an optional
//! stdin command channel (`f` toggles fast mode, `c` fires confetti,
//! `q` quits). Each arm swallows and logs its own gateway failures so a
//! flaky backend never stops the board.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::interval;
use tracing::{info, warn};

use signboard_core::celebration::{Burst, ConfettiRenderer};
use signboard_core::rotation::RotationEvent;
use signboard_core::{Config, CoreError, DisplaySession, Gateway, Intensity, RotationMode};

/// Confetti capability for a terminal: bursts become printed lines.
struct TermRenderer;

impl ConfettiRenderer for TermRenderer {
    fn burst(&self, burst: &Burst) {
        println!(
            "  *** confetti x{} (spread {} deg at {:.1},{:.1}) ***",
            burst.particle_count, burst.spread_deg, burst.origin_x, burst.origin_y
        );
    }
}

pub async fn run(gateway: Gateway, config: &Config, fast: bool) -> Result<(), CoreError> {
    let mode = if fast {
        RotationMode::Fast
    } else {
        RotationMode::Normal
    };
    let mut session = DisplaySession::new(
        gateway,
        config.placeholder(),
        mode,
        Arc::new(TermRenderer),
    )
    .with_timings(
        config.rotation.normal_secs * 1000,
        config.rotation.fast_secs * 1000,
        config.rotation.settle_ms,
    );

    if let Err(e) = session.load_initial().await {
        warn!(error = %e, "initial queue load failed; starting with placeholder");
    }
    render_sign(&session);

    let mut tick = interval(Duration::from_millis(config.rotation.tick_ms));
    let mut queue_poll = interval(Duration::from_secs(config.poll.queue_secs));
    let mut trigger_poll = interval(Duration::from_secs(config.poll.trigger_secs));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                match session.tick() {
                    Some(RotationEvent::Expired { .. }) => {
                        match session.advance().await {
                            Ok(()) => render_sign(&session),
                            // Abandon this cycle; the queue poll recovers.
                            Err(e) => warn!(error = %e, "rotation advance abandoned"),
                        }
                    }
                    None => render_progress(&session),
                }
            }
            _ = queue_poll.tick() => {
                let was_idle = !session.rotation().is_running();
                if let Err(e) = session.poll_queue().await {
                    warn!(error = %e, "queue poll failed");
                } else if was_idle && session.rotation().is_running() {
                    render_sign(&session);
                }
            }
            _ = trigger_poll.tick() => {
                if let Err(e) = session.poll_triggers().await {
                    warn!(error = %e, "celebration trigger poll failed");
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(cmd)) => match cmd.trim() {
                        "f" => {
                            let mode = session.toggle_mode();
                            info!(?mode, "rotation mode toggled");
                            render_sign(&session);
                        }
                        "c" => session.fire_manual(Intensity::High),
                        "q" => break,
                        _ => {}
                    },
                    // Stdin closed (e.g. running under a supervisor):
                    // keep displaying, just stop listening.
                    Ok(None) | Err(_) => stdin_open = false,
                }
            }
        }
    }
    Ok(())
}

fn render_sign(session: &DisplaySession) {
    let text = session.rotation().sign_text();
    println!();
    println!("+{}+", "-".repeat(16));
    for line in text.lines() {
        println!("| {line:^14} |");
    }
    println!("+{}+", "-".repeat(16));
}

fn render_progress(session: &DisplaySession) {
    let rotation = session.rotation();
    if rotation.is_running() {
        print!(
            "\r  {:>3.0}%  {:>2}s left ",
            rotation.progress_pct(),
            rotation.remaining_secs()
        );
        use std::io::Write;
        let _ = std::io::stdout().flush();
    }
}
