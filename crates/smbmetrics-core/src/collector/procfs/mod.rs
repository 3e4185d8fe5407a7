//! Readers for the Linux `/proc` filesystem and worker discovery.
//!
//! This module provides parsers, host-wide context and the per-process
//! reader used by the process resource collector.

pub mod discovery;
pub mod parser;
pub mod process;
pub mod system;

pub use discovery::{DiscoveryError, ProcessDiscovery};
pub use parser::ParseError;
pub use process::{ProcessStatReader, ReadError};
pub use system::SystemContext;
