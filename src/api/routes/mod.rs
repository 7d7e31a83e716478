//! Route handlers for the REST API
//!
//! - [`search`]: Repository search
//! - [`system`]: Health and OpenAPI

mod search;
mod system;

pub use search::*;
pub use system::*;
