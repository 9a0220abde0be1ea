//! Market data sources for put/call open interest

pub mod http_oi_client;

pub use http_oi_client::{HttpOiClient, OiEndpoint};

use async_trait::async_trait;
use crate::shared::errors::FetchError;
use crate::shared::types::OiSnapshot;

/// Source of one put/call OI reading per call
#[async_trait]
pub trait OiSource: Send + Sync {
    /// Fetch the current put and call open interest.
    async fn fetch(&self) -> Result<OiSnapshot, FetchError>;
}
