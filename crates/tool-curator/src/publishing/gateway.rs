use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::curation::EngagementMetrics;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReceipt {
    pub post_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("post rejected by platform: {0}")]
    Rejected(String),
    #[error("social platform unavailable: {0}")]
    Unavailable(String),
}

/// Outbound social platform. Implementations own authentication and rate limits.
pub trait SocialGateway: Debug + Send + Sync {
    fn post(&self, text: &str) -> Result<PostReceipt, GatewayError>;
    fn engagement(&self, post_id: &str) -> Result<EngagementMetrics, GatewayError>;
}
