mod registry;
mod repeated_callback;

pub use registry::*;
pub use repeated_callback::*;

#[cfg(test)]
mod repeated_callback_test;
#[cfg(test)]
mod registry_test;
