pub mod physics;
pub mod registry;
pub mod session;

pub use physics::{Engine, TICK_INTERVAL};
pub use registry::SessionRegistry;
pub use session::Session;
