//! SMS delivery boundary for Parley.
//!
//! OTP codes leave the system through the [`SmsGateway`] trait. Delivery
//! failure is non-fatal to challenge creation: callers store the code
//! first and treat a failed send as a logged warning, so login is never
//! blocked on a flaky external channel.

mod gateway;
mod log;
mod recording;

pub use gateway::*;
pub use log::*;
pub use recording::*;

use thiserror::Error;

/// Errors that can occur during SMS delivery.
#[derive(Debug, Error)]
pub enum SmsError {
    /// The provider rejected or failed the send.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The provider was unreachable.
    #[error("Gateway unreachable: {0}")]
    Unreachable(String),
}

/// Result type for SMS operations.
pub type SmsResult<T> = Result<T, SmsError>;
