//! Operator actions against the backend. Destructive ones prompt for
//! confirmation first unless `--yes` was passed.

use std::io::{self, BufRead, Write};

use signboard_core::{CoreError, Gateway};

pub async fn list(gateway: &Gateway) -> Result<(), CoreError> {
    let messages = gateway.list_messages().await?;
    println!("{}", serde_json::to_string_pretty(&messages)?);
    Ok(())
}

pub async fn stats(gateway: &Gateway) -> Result<(), CoreError> {
    let stats = gateway.stats().await?;
    let queue_len = gateway.list_messages().await?.len();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "total_submitted": stats.total_submitted,
            "shown_messages": stats.shown_messages,
            "in_queue": queue_len,
        }))?
    );
    Ok(())
}

pub async fn delete(gateway: &Gateway, id: i64, yes: bool) -> Result<(), CoreError> {
    if !yes && !confirm(&format!("Remove message {id}? This cannot be undone."))? {
        println!("aborted");
        return Ok(());
    }
    gateway.delete_message(id).await?;
    println!("message {id} removed");
    Ok(())
}

pub async fn clear(gateway: &Gateway, yes: bool) -> Result<(), CoreError> {
    if !yes && !confirm("Clear ALL messages? This cannot be undone.")? {
        println!("aborted");
        return Ok(());
    }
    gateway.clear_messages().await?;
    println!("queue cleared");
    Ok(())
}

pub async fn reset_shown(gateway: &Gateway) -> Result<(), CoreError> {
    gateway.reset_shown().await?;
    println!("all messages reset to unshown");
    Ok(())
}

pub async fn celebrate(gateway: &Gateway) -> Result<(), CoreError> {
    gateway.trigger_celebration().await?;
    println!("celebration triggered");
    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
