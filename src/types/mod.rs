pub mod ids;
mod node_id;
mod qualified_name;
mod status_code;
mod variant;

pub use node_id::*;
pub use qualified_name::*;
pub use status_code::*;
pub use variant::*;

#[cfg(test)]
mod variant_test;
