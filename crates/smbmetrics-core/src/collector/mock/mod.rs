//! Test doubles for the OS seams.
//!
//! - `MockFs` — in-memory `/proc`
//! - `MockCommand` — scripted `pgrep`/`smbstatus`/`smbd`/`ctdb`
//! - `scenarios` — canned hosts built from both

mod command;
mod filesystem;
pub mod scenarios;

pub use command::MockCommand;
pub use filesystem::MockFs;
