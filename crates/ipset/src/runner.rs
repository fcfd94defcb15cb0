//! Execution of ipset.
//!
//! Commands translate themselves into argument vectors; a [`Runner`] hands
//! one vector to the tool and reports the outcome. Each call is a single
//! blocking process invocation with no retry.

use std::path::{Path, PathBuf};
use std::process::Command as Process;
use std::sync::LazyLock;

use common::{Error, Result};
use regex::Regex;
use tracing::{debug, warn};

use crate::types::IPSetVersion;

/// Program looked up on PATH when no binary is configured.
pub const DEFAULT_BINARY: &str = "ipset";

/// Output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Human readable command line, e.g. `ipset list foo`.
    pub invocation: String,
    /// Standard output followed by standard error.
    pub output: String,
}

/// Runs ipset with an argument vector.
#[cfg_attr(test, mockall::automock)]
pub trait Runner {
    /// Invoke the tool once. A non-zero exit status is an `Error::IPSet`
    /// carrying the normalized diagnostic.
    fn run(&self, args: &[String]) -> Result<RunOutput>;
}

/// [`Runner`] spawning the ipset binary.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    binary: PathBuf,
}

impl SystemRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl Runner for SystemRunner {
    fn run(&self, args: &[String]) -> Result<RunOutput> {
        let invocation = invocation_line(&self.binary, args);
        debug!(%invocation, "running ipset");

        let out = Process::new(&self.binary).args(args).output()?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        if out.status.success() {
            return Ok(RunOutput { invocation, output });
        }

        let reason = normalize_error_output(&output);
        warn!(%invocation, status = ?out.status.code(), %reason, "ipset failed");

        if reason.is_empty() {
            Err(Error::ipset(format!("exited with {}", out.status)))
        } else {
            Err(Error::IPSet(reason))
        }
    }
}

fn invocation_line(binary: &Path, args: &[String]) -> String {
    let program = binary
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| binary.display().to_string());

    if args.is_empty() {
        program
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

static VERSION_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ipset v[0-9]+[.0-9]*[.0-9]*:\s").expect("static banner pattern compiles")
});

const HELP_HINT: &str = "Try `ipset help' for more information.";

/// Strip the `ipset vX.Y.Z: ` banner and the trailing help hint from the
/// tool's diagnostic output.
pub fn normalize_error_output(raw: &str) -> String {
    let reason = VERSION_BANNER.replace(raw, "");
    reason.replace(HELP_HINT, "").trim_matches('\n').to_string()
}

/// `ipset -v` output.
pub fn version<R: Runner + ?Sized>(runner: &R) -> Result<String> {
    let out = runner
        .run(&["-v".to_string()])
        .map_err(|_| Error::ipset("ipset command did fail"))?;

    let version = out.output.trim_end();
    if version.is_empty() {
        Err(Error::VersionUnavailable)
    } else {
        Ok(version.to_string())
    }
}

/// Parsed form of [`version`].
pub fn parsed_version<R: Runner + ?Sized>(runner: &R) -> Result<IPSetVersion> {
    let raw = version(runner)?;
    IPSetVersion::parse(&raw).ok_or(Error::VersionUnavailable)
}

/// True when `ipset -v` runs and prints something.
pub fn is_available<R: Runner + ?Sized>(runner: &R) -> bool {
    version(runner).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_banner_and_hint() {
        let raw = "ipset v7.15: The set with the given name does not exist\nTry `ipset help' for more information.\n";
        assert_eq!(
            normalize_error_output(raw),
            "The set with the given name does not exist"
        );
    }

    #[test]
    fn test_normalize_three_part_version() {
        let raw = "ipset v6.38.1: No command specified: unknown argument dummycommand\n";
        assert_eq!(
            normalize_error_output(raw),
            "No command specified: unknown argument dummycommand"
        );
    }

    #[test]
    fn test_normalize_leaves_other_text() {
        assert_eq!(normalize_error_output("something else\n"), "something else");
        assert_eq!(normalize_error_output(""), "");
    }

    #[test]
    fn test_invocation_line() {
        let args = vec!["list".to_string(), "foo".to_string()];
        assert_eq!(invocation_line(Path::new("/usr/sbin/ipset"), &args), "ipset list foo");
        assert_eq!(invocation_line(Path::new("ipset"), &[]), "ipset");
    }

    #[test]
    fn test_version() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|args: &[String]| args == ["-v"])
            .returning(|_| {
                Ok(RunOutput {
                    invocation: "ipset -v".into(),
                    output: "ipset v7.15, protocol version: 7\n".into(),
                })
            });

        assert_eq!(version(&runner).unwrap(), "ipset v7.15, protocol version: 7");
    }

    #[test]
    fn test_version_empty_output() {
        let mut runner = MockRunner::new();
        runner.expect_run().returning(|_| Ok(RunOutput::default()));

        assert!(matches!(version(&runner), Err(Error::VersionUnavailable)));
        assert!(!is_available(&runner));
    }

    #[test]
    fn test_version_tool_failure() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .returning(|_| Err(Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound))));

        let err = version(&runner).unwrap_err();
        assert_eq!(err.to_string(), r#"ipset returned error "ipset command did fail""#);
        assert!(!is_available(&runner));
    }

    #[test]
    fn test_parsed_version() {
        let mut runner = MockRunner::new();
        runner.expect_run().returning(|_| {
            Ok(RunOutput {
                invocation: "ipset -v".into(),
                output: "ipset v7.1, protocol version: 7\n".into(),
            })
        });

        let version = parsed_version(&runner).unwrap();
        assert_eq!(version, IPSetVersion { major: 7, minor: 1, patch: 0 });
    }

    #[test]
    fn test_system_runner_missing_binary() {
        let runner = SystemRunner::new("/nonexistent/ipset-binary");
        let err = runner.run(&["-v".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
