//! ipset command objects.
//!
//! A command is a plain value describing one ipset invocation. Translating
//! it into arguments is pure; running it is a separate step that needs a
//! [`Runner`]. A command is well formed exactly when its translation is
//! non-empty: malformed entries, missing ranges and missing set names all
//! translate to an empty vector.

mod create;
mod entry;
mod set;

pub use create::CreateCommand;
pub use entry::{ListPosition, MembershipCommand};
pub use set::{DestroySet, ExistsSet, FlushSet, ListSet};

use common::{Error, Result};

use crate::runner::{RunOutput, Runner};
use crate::types::CommandName;

/// Common interface of all commands.
pub trait Command {
    /// The ipset verb this command issues.
    fn command_name(&self) -> CommandName;

    /// Arguments handed to ipset, without the program name. Empty when the
    /// command is not well formed.
    fn translate(&self) -> Vec<String>;

    /// True when [`translate`](Command::translate) yields at least one
    /// argument.
    fn is_well_formed(&self) -> bool {
        !self.translate().is_empty()
    }
}

/// Set name with surrounding spaces and newlines removed, `None` if blank.
pub(crate) fn set_name(raw: &str) -> Option<&str> {
    let name = raw.trim_matches(|c: char| c == ' ' || c == '\n');
    (!name.is_empty()).then_some(name)
}

/// Arguments asking ipset for XML output.
pub(crate) fn xml_output_args() -> [String; 2] {
    ["-output".to_string(), "xml".to_string()]
}

/// Translate `command` and run it, refusing empty translations.
pub(crate) fn execute<C, R>(command: &C, runner: &R) -> Result<RunOutput>
where
    C: Command + ?Sized,
    R: Runner + ?Sized,
{
    let args = command.translate();
    if args.is_empty() {
        return Err(Error::invalid_command(format!(
            "{} is missing mandatory options or has a malformed entry",
            command.command_name()
        )));
    }
    runner.run(&args)
}
