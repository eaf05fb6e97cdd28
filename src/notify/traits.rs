use async_trait::async_trait;

/// Outbound messaging contract. New delivery channels only need to implement this trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Stable channel identifier (e.g. `telegram`).
    fn id(&self) -> &'static str;

    /// Deliver `text` to the configured chat.
    async fn send(&self, text: &str) -> crate::Result<()>;
}
