//! ipset data types: set types, protocol families, command verbs.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a string does not name a known enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseTypeError {
    kind: &'static str,
    value: String,
}

impl ParseTypeError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Set type supported by ipset.
///
/// The type is fixed when a set is created and decides which entries the
/// set accepts for every later add, del and test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetType {
    BitmapIp,
    BitmapIpMac,
    BitmapPort,
    HashIp,
    HashMac,
    HashIpMac,
    HashNet,
    HashNetNet,
    HashIpPort,
    HashNetPort,
    HashIpPortIp,
    HashIpPortNet,
    HashIpMark,
    HashNetPortNet,
    HashNetIface,
    ListSet,
    /// Sentinel for types this crate cannot describe. Never translates.
    Unsupported,
}

impl SetType {
    /// Every supported set type, `Unsupported` excluded.
    pub const ALL: [SetType; 16] = [
        SetType::BitmapIp,
        SetType::BitmapIpMac,
        SetType::BitmapPort,
        SetType::HashIp,
        SetType::HashMac,
        SetType::HashIpMac,
        SetType::HashNet,
        SetType::HashNetNet,
        SetType::HashIpPort,
        SetType::HashNetPort,
        SetType::HashIpPortIp,
        SetType::HashIpPortNet,
        SetType::HashIpMark,
        SetType::HashNetPortNet,
        SetType::HashNetIface,
        SetType::ListSet,
    ];

    /// Canonical ipset name, empty for `Unsupported`.
    pub fn name(&self) -> &'static str {
        match self {
            SetType::BitmapIp => "bitmap:ip",
            SetType::BitmapIpMac => "bitmap:ip,mac",
            SetType::BitmapPort => "bitmap:port",
            SetType::HashIp => "hash:ip",
            SetType::HashMac => "hash:mac",
            SetType::HashIpMac => "hash:ip,mac",
            SetType::HashNet => "hash:net",
            SetType::HashNetNet => "hash:net,net",
            SetType::HashIpPort => "hash:ip,port",
            SetType::HashNetPort => "hash:net,port",
            SetType::HashIpPortIp => "hash:ip,port,ip",
            SetType::HashIpPortNet => "hash:ip,port,net",
            SetType::HashIpMark => "hash:ip,mark",
            SetType::HashNetPortNet => "hash:net,port,net",
            SetType::HashNetIface => "hash:net,iface",
            SetType::ListSet => "list:set",
            SetType::Unsupported => "",
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(
            self,
            SetType::BitmapIp | SetType::BitmapIpMac | SetType::BitmapPort
        )
    }

    pub fn is_hash(&self) -> bool {
        self.name().starts_with("hash:")
    }

    /// Whether `create` accepts a `family` option for this type.
    ///
    /// Bitmap types, hash:mac and list:set never take one.
    pub fn supports_family(&self) -> bool {
        self.is_hash() && *self != SetType::HashMac
    }
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SetType {
    type Err = ParseTypeError;

    /// Parses canonical names. The dash spelling (`hash:ip-port`) is also
    /// accepted since it cannot be mistaken for anything else.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', ",");
        SetType::ALL
            .into_iter()
            .find(|t| t.name() == normalized)
            .ok_or_else(|| ParseTypeError::new("set type", s))
    }
}

/// Protocol family of the addresses stored in a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolFamily {
    /// Let ipset pick, which means inet. Never emitted.
    #[default]
    Default,
    INet,
    INet6,
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolFamily::INet6 => write!(f, "inet6"),
            _ => write!(f, "inet"),
        }
    }
}

impl FromStr for ProtocolFamily {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Ok(ProtocolFamily::Default),
            "inet" => Ok(ProtocolFamily::INet),
            "inet6" => Ok(ProtocolFamily::INet6),
            _ => Err(ParseTypeError::new("protocol family", s)),
        }
    }
}

/// ipset verbs issued by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandName {
    Create,
    Add,
    Del,
    Test,
    List,
    Flush,
    Destroy,
    /// Existence probe, issued as a list in XML mode.
    Exists,
}

impl CommandName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::Create => "create",
            CommandName::Add => "add",
            CommandName::Del => "del",
            CommandName::Test => "test",
            CommandName::List => "list",
            CommandName::Flush => "flush",
            CommandName::Destroy => "destroy",
            CommandName::Exists => "-L",
        }
    }

    /// Verbs handled by [`MembershipCommand`](crate::MembershipCommand).
    pub fn is_membership(&self) -> bool {
        matches!(self, CommandName::Add | CommandName::Del | CommandName::Test)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ipset userspace version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IPSetVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl IPSetVersion {
    /// Extract the version from `ipset -v` output, e.g.
    /// `ipset v7.15, protocol version: 7`.
    pub fn parse(output: &str) -> Option<Self> {
        let token = output
            .split(|c: char| c.is_whitespace() || c == ',' || c == ':')
            .find_map(|word| {
                let digits = word.strip_prefix('v')?;
                digits.starts_with(|c: char| c.is_ascii_digit()).then_some(digits)
            })?;

        let mut parts = token.split('.').map(|p| p.parse::<u32>());
        let major = parts.next()?.ok()?;
        let minor = match parts.next() {
            Some(p) => p.ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.ok()?,
            None => 0,
        };

        Some(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for IPSetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
