//! Path based view over the address space.
//!
//! Folders and values are addressed by logical paths such as `Plant/Line1`
//! or `Plant.Line1.Speed` instead of raw node ids. Creating a path is
//! idempotent; browsing a subtree materialises it as a [`TreeNode`].
mod path;
mod server_node_tree;
mod tree;

pub use path::*;
pub use server_node_tree::*;
pub use tree::*;

#[cfg(test)]
mod server_node_tree_test;
