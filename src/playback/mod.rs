pub mod arbiter;
pub mod controller;
pub mod executor;
pub mod frame;
pub mod intent;
pub mod preload;
pub mod visibility;


pub use arbiter::*;
pub use controller::*;
pub use executor::*;
pub use frame::*;
pub use intent::*;
pub use preload::*;
pub use visibility::*;
