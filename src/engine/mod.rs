mod engine;
mod host;
mod tokio_engine;

pub use engine::*;
pub use host::*;
pub use tokio_engine::*;
