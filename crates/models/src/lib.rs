pub mod account;
pub mod config;
pub mod error;

pub use account::*;
pub use config::*;
pub use error::*;
