//! `ipset add`, `ipset del` and `ipset test`.

use common::{Error, Result};
use tracing::debug;

use super::{Command, execute, set_name};
use crate::grammar::{GrammarMode, matches_entry};
use crate::options::{comment_option, timeout_option};
use crate::runner::Runner;
use crate::types::{CommandName, SetType};

/// Where a list:set member goes relative to another member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPosition {
    Before(String),
    After(String),
}

/// Add, delete or test one entry.
///
/// The three verbs share one grammar per set type, except that `test` on
/// bitmap:ip and bitmap:port only takes single elements. The entry is
/// validated, never rewritten. list:set ignores `entry` and uses
/// `position` instead.
///
/// The set type is not remembered anywhere: the caller must pass the type
/// the set was created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipCommand {
    pub command: CommandName,
    pub name: String,
    pub set_type: SetType,
    pub entry: String,
    /// list:set only.
    pub position: Option<ListPosition>,
    /// Per-entry timeout, add only.
    pub timeout: u32,
    /// Per-entry comment, add only. The set must have been created with
    /// comments enabled.
    pub comment: String,
}

impl MembershipCommand {
    fn new(
        command: CommandName,
        name: impl Into<String>,
        set_type: SetType,
        entry: impl Into<String>,
        position: Option<ListPosition>,
    ) -> Self {
        Self {
            command,
            name: name.into(),
            set_type,
            entry: entry.into(),
            position,
            timeout: 0,
            comment: String::new(),
        }
    }

    pub fn add(name: impl Into<String>, set_type: SetType, entry: impl Into<String>) -> Self {
        Self::new(CommandName::Add, name, set_type, entry, None)
    }

    pub fn delete(name: impl Into<String>, set_type: SetType, entry: impl Into<String>) -> Self {
        Self::new(CommandName::Del, name, set_type, entry, None)
    }

    pub fn test(name: impl Into<String>, set_type: SetType, entry: impl Into<String>) -> Self {
        Self::new(CommandName::Test, name, set_type, entry, None)
    }

    pub fn add_list(name: impl Into<String>) -> Self {
        Self::new(CommandName::Add, name, SetType::ListSet, "", None)
    }

    pub fn add_list_before(name: impl Into<String>, before: impl Into<String>) -> Self {
        let position = Some(ListPosition::Before(before.into()));
        Self::new(CommandName::Add, name, SetType::ListSet, "", position)
    }

    pub fn add_list_after(name: impl Into<String>, after: impl Into<String>) -> Self {
        let position = Some(ListPosition::After(after.into()));
        Self::new(CommandName::Add, name, SetType::ListSet, "", position)
    }

    pub fn delete_list(name: impl Into<String>) -> Self {
        Self::new(CommandName::Del, name, SetType::ListSet, "", None)
    }

    pub fn delete_list_before(name: impl Into<String>, before: impl Into<String>) -> Self {
        let position = Some(ListPosition::Before(before.into()));
        Self::new(CommandName::Del, name, SetType::ListSet, "", position)
    }

    pub fn delete_list_after(name: impl Into<String>, after: impl Into<String>) -> Self {
        let position = Some(ListPosition::After(after.into()));
        Self::new(CommandName::Del, name, SetType::ListSet, "", position)
    }

    pub fn test_list(name: impl Into<String>) -> Self {
        Self::new(CommandName::Test, name, SetType::ListSet, "", None)
    }

    pub fn test_list_before(name: impl Into<String>, before: impl Into<String>) -> Self {
        let position = Some(ListPosition::Before(before.into()));
        Self::new(CommandName::Test, name, SetType::ListSet, "", position)
    }

    pub fn test_list_after(name: impl Into<String>, after: impl Into<String>) -> Self {
        let position = Some(ListPosition::After(after.into()));
        Self::new(CommandName::Test, name, SetType::ListSet, "", position)
    }

    pub fn with_timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    fn grammar_mode(&self) -> GrammarMode {
        if self.command == CommandName::Test {
            GrammarMode::Test
        } else {
            GrammarMode::Full
        }
    }

    fn position_args(&self) -> Vec<String> {
        let (keyword, other) = match &self.position {
            Some(ListPosition::Before(other)) => ("before", other),
            Some(ListPosition::After(other)) => ("after", other),
            None => return Vec::new(),
        };

        match set_name(other) {
            Some(other) => vec![keyword.to_string(), other.to_string()],
            None => Vec::new(),
        }
    }

    /// Run the command.
    ///
    /// For `test`, `Ok` means the entry is a member. An error means it is
    /// not, or that the tool failed for another reason (for instance the
    /// set does not exist); the two cases are not told apart.
    pub fn run<R: Runner + ?Sized>(&self, runner: &R) -> Result<()> {
        if !self.command.is_membership() {
            return Err(Error::unsupported_command(format!(
                "{} is not add, del or test",
                self.command
            )));
        }

        execute(self, runner)?;
        Ok(())
    }

    /// `test` view of [`run`](Self::run): true only when the tool reports
    /// the entry as present.
    pub fn is_member<R: Runner + ?Sized>(&self, runner: &R) -> bool {
        if self.command != CommandName::Test {
            return false;
        }

        match self.run(runner) {
            Ok(()) => true,
            Err(e) => {
                debug!(set = %self.name, entry = %self.entry, error = %e, "entry not a member");
                false
            }
        }
    }
}

impl Command for MembershipCommand {
    fn command_name(&self) -> CommandName {
        self.command
    }

    fn translate(&self) -> Vec<String> {
        if !self.command.is_membership() {
            return Vec::new();
        }
        let Some(name) = set_name(&self.name) else {
            return Vec::new();
        };

        let mut out = vec![self.command.to_string(), name.to_string()];

        if self.set_type == SetType::ListSet {
            out.extend(self.position_args());
        } else if matches_entry(self.set_type, self.grammar_mode(), &self.entry) {
            out.push(self.entry.clone());
        } else {
            return Vec::new();
        }

        if self.command == CommandName::Add {
            out.extend(timeout_option(self.timeout));
            out.extend(comment_option(&self.comment));
        }

        out
    }
}
