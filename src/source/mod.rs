//! Homework status sources.

pub mod practicum;

use async_trait::async_trait;

pub use practicum::PracticumClient;

/// Fetch capability for the raw status payload.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch statuses updated since `from_date` (unix seconds).
    async fn fetch(&self, from_date: i64) -> crate::Result<serde_json::Value>;
}
