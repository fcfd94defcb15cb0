//! Subcommand arguments and their execution.

use anyhow::{Context as _, bail};
use clap::Args;
use ipset::runner::{parsed_version, version};
use ipset::{
    Command, CommandName, CreateCommand, DestroySet, ExistsSet, FlushSet, ListPosition, ListSet,
    MembershipCommand, ProtocolFamily, SetType, SystemRunner,
};

/// Result of a subcommand that answers a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// `test` found no member, `exists` found no set.
    Negative,
}

/// Shared state of one invocation.
pub struct Context {
    pub runner: SystemRunner,
    pub dry_run: bool,
}

impl Context {
    /// Refuse malformed commands. In dry-run mode print the command line and
    /// return false; the caller runs the command only on true.
    fn prepare(&self, command: &dyn Command) -> anyhow::Result<bool> {
        let args = command.translate();
        if args.is_empty() {
            bail!(
                "{} command is not well formed: a mandatory option is missing or the entry does not match the set type",
                command.command_name()
            );
        }

        if self.dry_run {
            println!("{} {}", self.runner.binary().display(), args.join(" "));
            return Ok(false);
        }
        Ok(true)
    }
}

#[derive(Args)]
pub struct CreateArgs {
    /// Set name
    pub name: String,

    /// Set type, e.g. hash:ip or bitmap:port
    pub set_type: SetType,

    /// IP range (bitmap:ip, bitmap:ip,mac) or port range (bitmap:port)
    #[arg(long)]
    pub range: Option<String>,

    /// Netmask applied to stored addresses (1-32)
    #[arg(long)]
    pub netmask: Option<u32>,

    /// Mark mask (hash:ip,mark)
    #[arg(long)]
    pub markmask: Option<u32>,

    /// Initial hash size
    #[arg(long)]
    pub hashsize: Option<u32>,

    /// Maximum number of elements
    #[arg(long)]
    pub maxelem: Option<u32>,

    /// Size of a list:set
    #[arg(long)]
    pub size: Option<u32>,

    /// Default entry timeout in seconds
    #[arg(long)]
    pub timeout: Option<u32>,

    /// Enable packet and byte counters
    #[arg(long)]
    pub counters: bool,

    /// Enable skbinfo extension
    #[arg(long)]
    pub skbinfo: bool,

    /// Evict a random entry when the set is full
    #[arg(long)]
    pub forceadd: bool,

    /// Enable per-entry comments
    #[arg(long)]
    pub comment: bool,

    /// Protocol family: inet or inet6
    #[arg(long, default_value = "default")]
    pub family: ProtocolFamily,
}

impl CreateArgs {
    fn command(self) -> CreateCommand {
        let mut command = CreateCommand::new(self.name, self.set_type)
            .with_counters(self.counters)
            .with_skb_info(self.skbinfo)
            .with_force_add(self.forceadd)
            .with_comments(self.comment)
            .with_family(self.family);

        if let Some(range) = self.range {
            command = match self.set_type {
                SetType::BitmapPort => command.with_port_range(range),
                _ => command.with_ip_range(range),
            };
        }

        command.netmask = self.netmask.unwrap_or_default();
        command.markmask = self.markmask.unwrap_or_default();
        command.hash_size = self.hashsize.unwrap_or_default();
        command.max_elements = self.maxelem.unwrap_or_default();
        command.size = self.size.unwrap_or_default();
        command.timeout = self.timeout.unwrap_or_default();
        command
    }

    pub fn run(self, ctx: &Context) -> anyhow::Result<Status> {
        let command = self.command();
        if ctx.prepare(&command)? {
            command
                .run(&ctx.runner)
                .with_context(|| format!("failed to create set {}", command.name))?;
        }
        Ok(Status::Success)
    }
}

#[derive(Args)]
pub struct EntryArgs {
    /// Set name
    pub name: String,

    /// Type the set was created with
    pub set_type: SetType,

    /// Entry, e.g. 10.0.0.1,tcp:80. Not used for list:set.
    #[arg(default_value = "")]
    pub entry: String,

    /// list:set only: place relative to this member
    #[arg(long, conflicts_with = "after")]
    pub before: Option<String>,

    /// list:set only: place relative to this member
    #[arg(long)]
    pub after: Option<String>,

    /// Entry timeout in seconds (add only)
    #[arg(long)]
    pub timeout: Option<u32>,

    /// Entry comment (add only)
    #[arg(long)]
    pub comment: Option<String>,
}

impl EntryArgs {
    fn command(self, verb: CommandName) -> MembershipCommand {
        let position = match (self.before, self.after) {
            (Some(before), _) => Some(ListPosition::Before(before)),
            (None, Some(after)) => Some(ListPosition::After(after)),
            (None, None) => None,
        };

        MembershipCommand {
            command: verb,
            name: self.name,
            set_type: self.set_type,
            entry: self.entry,
            position,
            timeout: self.timeout.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
        }
    }

    pub fn run(self, verb: CommandName, ctx: &Context) -> anyhow::Result<Status> {
        let command = self.command(verb);
        if !ctx.prepare(&command)? {
            return Ok(Status::Success);
        }

        if verb == CommandName::Test {
            let status = if command.is_member(&ctx.runner) {
                println!("{} is in set {}", command.entry, command.name);
                Status::Success
            } else {
                println!("{} is NOT in set {}", command.entry, command.name);
                Status::Negative
            };
            return Ok(status);
        }

        command
            .run(&ctx.runner)
            .with_context(|| format!("{verb} on set {} failed", command.name))?;
        Ok(Status::Success)
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// Set name; all sets when omitted
    pub name: Option<String>,

    /// Print every set with its type instead of only members
    #[arg(long)]
    pub all_sets: bool,

    /// Print sets as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run(self, ctx: &Context) -> anyhow::Result<Status> {
        let command = ListSet::new(self.name.unwrap_or_default());
        if !ctx.prepare(&command)? {
            return Ok(Status::Success);
        }

        if self.json {
            let sets = command.sets(&ctx.runner)?;
            println!("{}", serde_json::to_string_pretty(&sets)?);
        } else if command.name.trim().is_empty() || self.all_sets {
            for set in command.sets(&ctx.runner)? {
                println!("Name: {}", set.name);
                println!("Type: {}", set.set_type);
                println!("Members:");
                for member in set.members {
                    println!("{member}");
                }
                println!();
            }
        } else {
            for member in command.members(&ctx.runner)? {
                println!("{member}");
            }
        }
        Ok(Status::Success)
    }
}

/// `flush` and `destroy` arguments.
#[derive(Args)]
pub struct NameArgs {
    /// Set name; all sets when omitted
    #[arg(default_value = "")]
    pub name: String,
}

impl NameArgs {
    pub fn flush(self, ctx: &Context) -> anyhow::Result<Status> {
        let command = FlushSet::new(self.name);
        if ctx.prepare(&command)? {
            command.run(&ctx.runner)?;
        }
        Ok(Status::Success)
    }

    pub fn destroy(self, ctx: &Context) -> anyhow::Result<Status> {
        let command = DestroySet::new(self.name);
        if ctx.prepare(&command)? {
            command.run(&ctx.runner)?;
        }
        Ok(Status::Success)
    }

    pub fn exists(self, ctx: &Context) -> anyhow::Result<Status> {
        let command = ExistsSet::new(self.name);
        if !ctx.prepare(&command)? {
            return Ok(Status::Success);
        }

        if command.run(&ctx.runner) {
            Ok(Status::Success)
        } else {
            Ok(Status::Negative)
        }
    }
}

pub fn print_version(ctx: &Context) -> anyhow::Result<Status> {
    if ctx.dry_run {
        println!("{} -v", ctx.runner.binary().display());
        return Ok(Status::Success);
    }

    let raw = version(&ctx.runner)?;
    match parsed_version(&ctx.runner) {
        Ok(parsed) => tracing::debug!(version = %parsed, "parsed ipset version"),
        Err(e) => tracing::debug!(error = %e, "unrecognised ipset version banner"),
    }
    println!("{raw}");
    Ok(Status::Success)
}
