//! POD (Print-on-Demand) Provider Integration Module
//!
//! The mockup pipeline reaches the fulfillment backend only through the
//! `FulfillmentProvider` trait.
//!
//! ```text
//!          ┌─────────────────────────┐
//!          │ FulfillmentProvider     │
//!          └────────────┬────────────┘
//!                       │
//!               ┌───────┴────────┐
//!               │ PrintifyProvider│──> RateLimitedClient
//!               └────────────────┘
//! ```

pub mod traits;
pub mod http_client;
pub mod printify;

pub use traits::{FulfillmentProvider, ProviderError, ProviderResult};
pub use printify::PrintifyProvider;
