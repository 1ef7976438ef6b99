//! Bounded polling for rendered mockups
//!
//! The provider renders mockups asynchronously after a product is created.
//! Polling waits a settle delay, then makes at most `max_attempts` fetches
//! spaced by a fixed interval. Delays go through a `Sleeper` so tests can run
//! the full schedule without waiting.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::MockupSettings;
use crate::providers::FulfillmentProvider;

/// Attempt ceiling and fixed delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub settle_delay: Duration,
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub fn from_settings(settings: &MockupSettings) -> Self {
        PollPolicy {
            settle_delay: settings.settle_delay(),
            max_attempts: settings.poll_max_attempts.max(1),
            interval: settings.poll_interval(),
        }
    }

    /// Worst-case wall time spent waiting
    pub fn budget(&self) -> Duration {
        self.settle_delay + self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Delay source for the poll loop
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How a poll run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Rendered { preview_url: String, attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Poll until the product reports an image or the attempts run out
///
/// Each attempt checks the alternate shop first when one is configured, then
/// the primary shop. Fetch errors are logged and count as attempts.
pub async fn poll_for_preview(
    provider: &dyn FulfillmentProvider,
    product_id: &str,
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
) -> PollOutcome {
    sleeper.sleep(policy.settle_delay).await;

    for attempt in 1..=policy.max_attempts {
        if let Some(shop_id) = provider.alternate_shop() {
            match provider.get_product_for_shop(shop_id, product_id).await {
                Ok(product) => {
                    if let Some(src) = product.preview_src() {
                        info!(product_id = %product_id, attempt, shop_id = %shop_id, "Mockup rendered");
                        return PollOutcome::Rendered { preview_url: src.to_string(), attempts: attempt };
                    }
                }
                Err(e) => debug!(product_id = %product_id, attempt, shop_id = %shop_id, error = %e, "Alternate shop fetch failed"),
            }
        }

        match provider.get_product(product_id).await {
            Ok(product) => {
                if let Some(src) = product.preview_src() {
                    info!(product_id = %product_id, attempt, "Mockup rendered");
                    return PollOutcome::Rendered { preview_url: src.to_string(), attempts: attempt };
                }
                debug!(product_id = %product_id, attempt, "No product images yet");
            }
            Err(e) => debug!(product_id = %product_id, attempt, error = %e, "Product fetch failed"),
        }

        if attempt < policy.max_attempts {
            sleeper.sleep(policy.interval).await;
        }
    }

    PollOutcome::Exhausted { attempts: policy.max_attempts }
}
