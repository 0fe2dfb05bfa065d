//! Wire request/response types for the Parley API.
//!
//! These types define the JSON surface shared by the server and its
//! clients; domain entities are mapped to and from them at the handler
//! boundary.

mod error;
mod requests;
mod responses;
mod types;

pub use error::*;
pub use requests::*;
pub use responses::*;
pub use types::*;
