//! Core entity definitions for Parley.
//!
//! This crate defines the data types shared across the Parley backend:
//! registered users, contact book entries, access tokens, and chat groups.

mod contact;
mod group;
mod token;
mod user;

pub use contact::*;
pub use group::*;
pub use token::*;
pub use user::*;
