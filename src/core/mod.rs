pub mod config;
pub mod error;
pub mod margin;

#[cfg(test)]
mod config_test;

pub use config::*;
pub use error::*;
pub use margin::*;
