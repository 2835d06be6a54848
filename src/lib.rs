//! # ua-space
//!
//! Server-side address space runtime for an OPC UA style protocol stack.
//!
//! - [`Server`]: the thread-safe node store. Every operation takes a
//!   store-wide readers-writer lock for its own duration and consults the
//!   injected [`AccessPolicy`].
//! - [`ServerNodeTree`]: folders and values addressed by `A/B/C` style paths.
//! - [`RepeatedCallback`]: named periodic actions driven by engine timers.
//! - [`ServerMethod`]: handlers behind Method nodes, invoked through
//!   [`Server::call`].
//! - [`ServerHost`]: the loop that feeds engine requests to the server and
//!   drives a [`ServerLifecycle`].
//!
//! ## Example
//! ```ignore
//! let server = ServerBuilder::from_env(None)?.build()?;
//! let ns = server.add_namespace("urn:example");
//! let folder = server.add_folder(&ids::OBJECTS_FOLDER, QualifiedName::new(ns, "Items"), NodeId::auto(ns))?;
//! let count = server.add_variable(&folder, QualifiedName::new(ns, "Count"), NodeId::auto(ns), VariableAttributes::new(1))?;
//! server.write_value(&count, 42)?;
//! ```

mod address_space;
mod callback;
mod config;
mod engine;
mod errors;
mod method;
mod node_tree;
mod server;
mod types;

pub use address_space::*;
pub use callback::*;
pub use config::*;
pub use engine::*;
pub use errors::*;
pub use method::*;
pub use node_tree::*;
pub use server::*;
pub use types::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
