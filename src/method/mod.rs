mod argument;
mod server_method;

pub use argument::*;
pub use server_method::*;

#[cfg(test)]
mod method_test;
