//! Common error type and logging setup shared by the ipset crates.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
