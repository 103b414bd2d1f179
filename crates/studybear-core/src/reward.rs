//! Reward delivery after a successful redemption.
//!
//! The default reward is a random picture from an image search API that
//! answers with `[{"url": "...", ...}]` (TheCatAPI format).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::RewardError;

/// Something that produces a reward to show the member.
#[async_trait]
pub trait RewardDelivery: Send + Sync {
    /// Fetch one reward, returned as a link to post in chat.
    async fn fetch_reward(&self) -> Result<String, RewardError>;
}

#[derive(Debug, Deserialize)]
struct ImageRecord {
    url: String,
}

pub struct ImageApiReward {
    client: Client,
    endpoint: String,
}

impl ImageApiReward {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RewardDelivery for ImageApiReward {
    async fn fetch_reward(&self) -> Result<String, RewardError> {
        let resp = self.client.get(&self.endpoint).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RewardError::Status {
                status: status.as_u16(),
            });
        }
        let images: Vec<ImageRecord> = resp.json().await?;
        images
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or(RewardError::EmptyResponse)
    }
}
