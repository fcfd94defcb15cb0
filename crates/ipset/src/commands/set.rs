//! Commands addressing a whole set: list, flush, destroy and the exists probe.

use common::{Error, Result};
use tracing::debug;

use super::{Command, execute, set_name, xml_output_args};
use crate::output::{SetInfo, decode_sets};
use crate::runner::Runner;
use crate::types::CommandName;

/// `[verb]` for a blank name, `[verb, name]` otherwise.
fn name_args(command: CommandName, name: &str) -> Vec<String> {
    let mut out = vec![command.to_string()];
    if let Some(name) = set_name(name) {
        out.push(name.to_string());
    }
    out
}

/// Run `command` with XML output requested and decode the result.
fn list_xml<C, R>(command: &C, runner: &R) -> Result<Vec<SetInfo>>
where
    C: Command + ?Sized,
    R: Runner + ?Sized,
{
    let mut args = command.translate();
    if args.is_empty() {
        return Err(Error::invalid_command(format!(
            "{} requires a set name",
            command.command_name()
        )));
    }
    args.extend(xml_output_args());

    let out = runner.run(&args)?;
    decode_sets(&out.output)
}

/// `ipset list`. A blank name lists every set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSet {
    pub name: String,
}

impl ListSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Members of the named set, in the order the tool lists them.
    ///
    /// Fails when the name is blank or the output does not contain exactly
    /// one set with that name.
    pub fn members<R: Runner + ?Sized>(&self, runner: &R) -> Result<Vec<String>> {
        let Some(name) = set_name(&self.name) else {
            return Err(Error::invalid_command("list needs a set name to return members"));
        };

        let mut matching: Vec<SetInfo> = list_xml(self, runner)?
            .into_iter()
            .filter(|set| set.name == name)
            .collect();

        match matching.len() {
            1 => Ok(matching.remove(0).members),
            0 => Err(Error::SetNotFound(name.to_string())),
            count => Err(Error::AmbiguousSet {
                name: name.to_string(),
                count,
            }),
        }
    }

    /// Every set in the tool's output. With a blank name that is every set
    /// on the host.
    pub fn sets<R: Runner + ?Sized>(&self, runner: &R) -> Result<Vec<SetInfo>> {
        list_xml(self, runner)
    }
}

impl Command for ListSet {
    fn command_name(&self) -> CommandName {
        CommandName::List
    }

    fn translate(&self) -> Vec<String> {
        name_args(CommandName::List, &self.name)
    }
}

/// `ipset flush`. A blank name flushes every set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushSet {
    pub name: String,
}

impl FlushSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn run<R: Runner + ?Sized>(&self, runner: &R) -> Result<()> {
        execute(self, runner)?;
        Ok(())
    }
}

impl Command for FlushSet {
    fn command_name(&self) -> CommandName {
        CommandName::Flush
    }

    fn translate(&self) -> Vec<String> {
        name_args(CommandName::Flush, &self.name)
    }
}

/// `ipset destroy`. A blank name destroys every set not referenced by a
/// rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestroySet {
    pub name: String,
}

impl DestroySet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn run<R: Runner + ?Sized>(&self, runner: &R) -> Result<()> {
        execute(self, runner)?;
        Ok(())
    }
}

impl Command for DestroySet {
    fn command_name(&self) -> CommandName {
        CommandName::Destroy
    }

    fn translate(&self) -> Vec<String> {
        name_args(CommandName::Destroy, &self.name)
    }
}

/// Presence probe built on `ipset -L <name> -output xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistsSet {
    pub name: String,
}

impl ExistsSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// True when the tool lists a set with this exact name.
    ///
    /// Any failure reads as absent, including undecodable output. The tool
    /// itself fails for unknown sets.
    pub fn run<R: Runner + ?Sized>(&self, runner: &R) -> bool {
        let Some(name) = set_name(&self.name) else {
            return false;
        };

        match list_xml(self, runner) {
            Ok(sets) => sets.iter().any(|set| set.name == name),
            Err(e) => {
                debug!(set = %name, error = %e, "set presence not confirmed");
                false
            }
        }
    }
}

impl Command for ExistsSet {
    fn command_name(&self) -> CommandName {
        CommandName::Exists
    }

    fn translate(&self) -> Vec<String> {
        match set_name(&self.name) {
            Some(name) => vec![CommandName::Exists.to_string(), name.to_string()],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{MockRunner, RunOutput};

    const TESTSET_XML: &str = r#"<?xml version="1.0"?>
<ipsets>
<ipset name="testset">
<type>hash:ip</type>
<revision>4</revision>
<header><family>inet</family><hashsize>1024</hashsize><maxelem>65536</maxelem></header>
<members>
<member><elem>10.0.0.2</elem></member>
<member><elem>10.0.0.1</elem></member>
</members>
</ipset>
</ipsets>
"#;

    fn xml_output(xml: &'static str) -> impl Fn(&[String]) -> Result<RunOutput> + Send + 'static {
        move |_| {
            Ok(RunOutput {
                invocation: String::new(),
                output: xml.to_string(),
            })
        }
    }

    #[test]
    fn test_translate_name_only_commands() {
        assert_eq!(ListSet::new("testset").translate(), ["list", "testset"]);
        assert_eq!(ListSet::new(" testset\n").translate(), ["list", "testset"]);
        assert_eq!(ListSet::default().translate(), ["list"]);
        assert_eq!(FlushSet::new("testset").translate(), ["flush", "testset"]);
        assert_eq!(FlushSet::new(" \n").translate(), ["flush"]);
        assert_eq!(DestroySet::new("testset").translate(), ["destroy", "testset"]);
        assert_eq!(DestroySet::default().translate(), ["destroy"]);
        assert!(FlushSet::default().is_well_formed());
        assert!(DestroySet::default().is_well_formed());
    }

    #[test]
    fn test_translate_exists() {
        assert_eq!(ExistsSet::new("testset").translate(), ["-L", "testset"]);
        assert!(ExistsSet::new("").translate().is_empty());
        assert!(!ExistsSet::new(" ").is_well_formed());
    }

    #[test]
    fn test_members() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|args: &[String]| args == ["list", "testset", "-output", "xml"])
            .times(1)
            .returning(xml_output(TESTSET_XML));

        let members = ListSet::new("testset").members(&runner).unwrap();
        assert_eq!(members, ["10.0.0.2", "10.0.0.1"]);
    }

    #[test]
    fn test_members_set_not_found() {
        let mut runner = MockRunner::new();
        runner.expect_run().returning(xml_output(TESTSET_XML));

        let err = ListSet::new("otherset").members(&runner).unwrap_err();
        assert!(matches!(err, Error::SetNotFound(name) if name == "otherset"));
    }

    #[test]
    fn test_members_ambiguous() {
        let mut runner = MockRunner::new();
        runner.expect_run().returning(xml_output(
            r#"<ipsets><ipset name="a" type="hash:ip"/><ipset name="a" type="hash:net"/></ipsets>"#,
        ));

        let err = ListSet::new("a").members(&runner).unwrap_err();
        assert!(matches!(err, Error::AmbiguousSet { count: 2, .. }));
    }

    #[test]
    fn test_members_blank_name() {
        let mut runner = MockRunner::new();
        runner.expect_run().never();

        let err = ListSet::default().members(&runner).unwrap_err();
        assert!(matches!(err, Error::InvalidCommand(_)));
    }

    #[test]
    fn test_members_decode_failure() {
        let mut runner = MockRunner::new();
        runner.expect_run().returning(xml_output("<ipsets><ipset>"));

        let err = ListSet::new("testset").members(&runner).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_sets_lists_everything() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|args: &[String]| args == ["list", "-output", "xml"])
            .returning(xml_output(
                r#"<ipsets>
<ipset name="a" type="hash:ip"><members><member elem="1.1.1.1"/></members></ipset>
<ipset name="b" type="bitmap:port"/>
</ipsets>"#,
            ));

        let sets = ListSet::default().sets(&runner).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].name, "a");
        assert_eq!(sets[0].members, ["1.1.1.1"]);
        assert_eq!(sets[1].set_type, "bitmap:port");
        assert!(sets[1].members.is_empty());
    }

    #[test]
    fn test_flush_and_destroy_propagate_errors() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|args: &[String]| args == ["flush", "testset"])
            .returning(|_| Ok(RunOutput::default()));
        runner
            .expect_run()
            .withf(|args: &[String]| args == ["destroy", "testset"])
            .returning(|_| Err(Error::ipset("Set cannot be destroyed: it is in use by a kernel component")));

        assert!(FlushSet::new("testset").run(&runner).is_ok());
        let err = DestroySet::new("testset").run(&runner).unwrap_err();
        assert!(err.is_tool_failure());
    }

    #[test]
    fn test_exists() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|args: &[String]| args == ["-L", "testset", "-output", "xml"])
            .returning(xml_output(TESTSET_XML));

        assert!(ExistsSet::new("testset").run(&runner));
    }

    #[test]
    fn test_exists_swallows_failures() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|args: &[String]| args[1] == "missing")
            .returning(|_| Err(Error::ipset("The set with the given name does not exist")));
        runner
            .expect_run()
            .withf(|args: &[String]| args[1] == "garbled")
            .returning(xml_output("<ipsets><ipset>"));
        runner
            .expect_run()
            .withf(|args: &[String]| args[1] == "other")
            .returning(xml_output(TESTSET_XML));

        assert!(!ExistsSet::new("missing").run(&runner));
        assert!(!ExistsSet::new("garbled").run(&runner));
        assert!(!ExistsSet::new("other").run(&runner));
        assert!(!ExistsSet::new("").run(&runner));
    }
}
