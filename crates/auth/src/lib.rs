//! OTP challenges and bearer credentials for Parley.
//!
//! This crate generates the secret material used by the login flow:
//! - short numeric OTP codes delivered over SMS
//! - opaque bearer tokens (40 hex chars, one per user)
//! - auto-generated usernames for first-time registrations

mod otp;
mod token;

pub use otp::*;
pub use token::*;
