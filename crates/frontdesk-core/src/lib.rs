pub mod config;
pub mod error;
pub mod types;

pub use config::FrontdeskConfig;
pub use error::{FrontdeskError, Result};
pub use types::*;
