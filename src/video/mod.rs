pub mod element;
pub mod simulated;

pub use element::*;
pub use simulated::*;
