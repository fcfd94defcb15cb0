//! Typed command builder and process wrapper for the Linux `ipset` tool.
//!
//! Commands are plain values. Each one validates its parameters against
//! the grammar of the target set type and translates them into the exact
//! argument vector ipset expects; running it hands that vector to a
//! [`Runner`]. A command whose translation is empty is malformed and is
//! never run.
//!
//! # Example
//!
//! ```no_run
//! use ipset::{CreateCommand, MembershipCommand, SetType, SystemRunner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = SystemRunner::default();
//!
//! CreateCommand::bitmap_ip("blocked", "192.168.0.0/16").run(&runner)?;
//! MembershipCommand::add("blocked", SetType::BitmapIp, "192.168.1.0/24").run(&runner)?;
//!
//! let probe = MembershipCommand::test("blocked", SetType::BitmapIp, "192.168.1.1");
//! println!("member: {}", probe.is_member(&runner));
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod grammar;
pub mod options;
pub mod output;
pub mod runner;
mod types;

pub use commands::{
    Command, CreateCommand, DestroySet, ExistsSet, FlushSet, ListPosition, ListSet,
    MembershipCommand,
};
pub use output::SetInfo;
pub use runner::{RunOutput, Runner, SystemRunner};
pub use types::{CommandName, IPSetVersion, ParseTypeError, ProtocolFamily, SetType};

pub use common::{Error, Result};
