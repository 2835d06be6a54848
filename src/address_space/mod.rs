mod address_space;
mod attributes;
mod bootstrap;
mod node;
mod reference;

pub use address_space::*;
pub use attributes::*;
pub use node::*;
pub use reference::*;

#[cfg(test)]
mod node_test;
