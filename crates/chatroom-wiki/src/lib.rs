//! `chatroom-wiki`: page summary lookup against the MediaWiki action API.
//!
//! [`SummaryLookup`] is the seam the send pipeline depends on;
//! [`WikiClient`] is the HTTP implementation.

pub mod client;
pub mod error;
pub mod response;

pub use client::WikiClient;
pub use error::LookupError;
pub use response::Summary;

use async_trait::async_trait;

/// Resolves a topic to a short plain-text summary.
#[async_trait]
pub trait SummaryLookup: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(Summary::NotFound)` is a normal outcome. `Err` means the lookup
    /// itself broke (transport, status, unparseable body).
    async fn summary(&self, topic: &str) -> Result<Summary, LookupError>;
}
