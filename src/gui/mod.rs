pub mod app;
pub mod feed;

#[cfg(test)]
mod app_test;

pub use app::*;
