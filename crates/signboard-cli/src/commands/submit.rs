use signboard_core::{CoreError, Gateway, MessageDraft};

pub async fn run(
    gateway: &Gateway,
    line1: &str,
    line2: &str,
    line3: &str,
    line4: &str,
) -> Result<(), CoreError> {
    // Validation and the 14-char truncation happen here, before send.
    let draft = MessageDraft::new(line1, line2, line3, line4)?;
    let id = gateway.submit(&draft).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "success": true,
            "id": id,
            "lines": [draft.line1, draft.line2, draft.line3, draft.line4],
        }))?
    );
    Ok(())
}
