//! Core traits for the dynamic-object engine
//!
//! - [`Transport`]: execute one command line on the gateway and return its
//!   captured output

pub mod transport;

pub use transport::{ExecOutput, Transport};
