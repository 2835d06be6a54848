mod access_control;
mod builder;
mod context;
mod lifecycle;
mod request;
mod server;

pub use access_control::*;
pub use builder::*;
pub use context::*;
pub use lifecycle::*;
pub use request::*;
pub use server::*;

#[cfg(test)]
mod builder_test;
