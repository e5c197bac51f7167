use std::time::Duration;

/// Resolve a fixed message after `delay`.
pub async fn deferred_message(message: String, delay: Duration) -> anyhow::Result<String> {
    tokio::time::sleep(delay).await;
    Ok(message)
}
