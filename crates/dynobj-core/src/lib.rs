// # dynobj-core
//
// Core library for keeping a named "dynamic object" on a remote security
// gateway synchronized with a desired set of IP addresses.
//
// ## Architecture Overview
//
// The gateway owns all object state; this library never caches it between
// calls. Every mutating operation re-fetches current state, diffs it against
// the caller's intent, and issues text commands to the gateway CLI through a
// pluggable transport:
//
// - **addr**: canonical `[begin, end]` address ranges and the
//   single/range/CIDR address-spec grammar
// - **listing**: line-based state machine that reconstructs object state
//   from the gateway's `-l` output
// - **protocol**: validated, `&&`-chained, sentinel-terminated command
//   lines and their result interpretation
// - **engine**: the reconciliation engine driving list → diff → mutate
// - **Transport**: the single "execute a command line, return captured
//   output" contract implemented by the transport crates
//
// ## Design Principles
//
// 1. **Gateway as source of truth**: no persisted engine state, ever
// 2. **Injection-safe by construction**: every token is validated before it
//    reaches a shell command line
// 3. **Portable failure detection**: a sentinel token in stdout stands in
//    for the exit status the transports cannot uniformly deliver
// 4. **Interval arithmetic**: diffs scale with range count, not address
//    count

pub mod addr;
pub mod config;
pub mod engine;
pub mod error;
pub mod listing;
pub mod protocol;
pub mod traits;

// Re-export core types for convenience
pub use addr::{AddrRange, AddrSpec, format_addr, parse_addr};
pub use config::{ObjectMap, TransportConfig};
pub use engine::DynObjEngine;
pub use error::{Error, Result};
pub use traits::{ExecOutput, Transport};
