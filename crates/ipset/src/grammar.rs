//! Entry grammars.
//!
//! Every entry ipset accepts is built from a handful of primitive patterns
//! (an address, a port, a MAC...) glued together with `,`. Each set type
//! owns a fixed table of shapes; an entry is accepted when one shape
//! matches it from end to end. Entries are never decomposed or rewritten,
//! the tool re-parses them.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::SetType;

/// IPv4 dotted quad.
pub const IP: &str =
    r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

/// CIDR suffix, `/1` to `/32`.
pub const CIDR: &str = r"/(?:[1-9]|1[0-9]|2[0-9]|3[0-2])";

/// Six colon separated hex byte pairs.
pub const MAC: &str = r"[0-9a-fA-F]{2}(?::[0-9a-fA-F]{2}){5}";

pub const PORT: &str = r"[0-9]+";
pub const PROTO: &str = r".+";
pub const MARK: &str = r"[0-9]+";
pub const IFACE: &str = r".+";
pub const PHYSDEV: &str = r"physdev";

/// Separator between the components of a multi-dimension entry.
pub const SEPARATOR: &str = ",";

/// Which subset of a set type's grammar applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarMode {
    /// add and del.
    Full,
    /// test: bitmap:ip and bitmap:port only accept single elements.
    Test,
}

/// A unit of an entry shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Ip,
    IpCidr,
    IpRange,
    Mac,
    Port,
    ProtoPort,
    PortRange,
    ProtoPortRange,
    Mark,
    Iface,
    PhysdevIface,
}

impl Component {
    /// Unanchored pattern for this component.
    pub fn pattern(&self) -> String {
        match self {
            Component::Ip => IP.to_string(),
            Component::IpCidr => format!("{IP}{CIDR}"),
            Component::IpRange => format!("{IP}-{IP}"),
            Component::Mac => MAC.to_string(),
            Component::Port => PORT.to_string(),
            Component::ProtoPort => format!("{PROTO}:{PORT}"),
            Component::PortRange => format!("{PORT}-{PORT}"),
            Component::ProtoPortRange => format!("{PROTO}:{PORT}-{PORT}"),
            Component::Mark => MARK.to_string(),
            Component::Iface => IFACE.to_string(),
            Component::PhysdevIface => format!("{PHYSDEV}:{IFACE}"),
        }
    }
}

/// A sequence of components joined by [`SEPARATOR`].
pub type Shape = &'static [Component];

use Component::*;

const BITMAP_IP: &[Shape] = &[&[Ip], &[IpRange], &[IpCidr]];
const BITMAP_IP_TEST: &[Shape] = &[&[Ip]];
const BITMAP_IP_MAC: &[Shape] = &[&[Ip], &[Ip, Mac]];
const BITMAP_PORT: &[Shape] = &[&[Port], &[ProtoPort], &[PortRange], &[ProtoPortRange]];
const BITMAP_PORT_TEST: &[Shape] = &[&[Port], &[ProtoPort]];
const HASH_IP: &[Shape] = &[&[Ip]];
const HASH_MAC: &[Shape] = &[&[Mac]];
const HASH_IP_MAC: &[Shape] = &[&[Ip, Mac]];
const HASH_NET: &[Shape] = &[&[Ip], &[IpCidr]];
const HASH_NET_NET: &[Shape] = &[
    &[Ip, Ip],
    &[Ip, IpCidr],
    &[IpCidr, Ip],
    &[IpCidr, IpCidr],
];
const HASH_IP_PORT: &[Shape] = &[&[Ip, Port], &[Ip, ProtoPort]];
const HASH_NET_PORT: &[Shape] = &[
    &[Ip, Port],
    &[Ip, ProtoPort],
    &[IpCidr, Port],
    &[IpCidr, ProtoPort],
];
const HASH_IP_PORT_IP: &[Shape] = &[&[Ip, Port, Ip], &[Ip, ProtoPort, Ip]];
const HASH_IP_PORT_NET: &[Shape] = &[
    &[Ip, Port, Ip],
    &[Ip, Port, IpCidr],
    &[Ip, ProtoPort, Ip],
    &[Ip, ProtoPort, IpCidr],
];
const HASH_IP_MARK: &[Shape] = &[&[Ip, Mark]];
const HASH_NET_PORT_NET: &[Shape] = &[
    &[Ip, Port, Ip],
    &[Ip, Port, IpCidr],
    &[Ip, ProtoPort, Ip],
    &[Ip, ProtoPort, IpCidr],
    &[IpCidr, Port, Ip],
    &[IpCidr, Port, IpCidr],
    &[IpCidr, ProtoPort, Ip],
    &[IpCidr, ProtoPort, IpCidr],
];
const HASH_NET_IFACE: &[Shape] = &[
    &[Ip, Iface],
    &[Ip, PhysdevIface],
    &[IpCidr, Iface],
    &[IpCidr, PhysdevIface],
];

impl SetType {
    /// Accepted entry shapes. Empty for list:set, which takes no entry.
    pub fn shapes(&self, mode: GrammarMode) -> &'static [Shape] {
        match (self, mode) {
            (SetType::BitmapIp, GrammarMode::Full) => BITMAP_IP,
            (SetType::BitmapIp, GrammarMode::Test) => BITMAP_IP_TEST,
            (SetType::BitmapIpMac, _) => BITMAP_IP_MAC,
            (SetType::BitmapPort, GrammarMode::Full) => BITMAP_PORT,
            (SetType::BitmapPort, GrammarMode::Test) => BITMAP_PORT_TEST,
            (SetType::HashIp, _) => HASH_IP,
            (SetType::HashMac, _) => HASH_MAC,
            (SetType::HashIpMac, _) => HASH_IP_MAC,
            (SetType::HashNet, _) => HASH_NET,
            (SetType::HashNetNet, _) => HASH_NET_NET,
            (SetType::HashIpPort, _) => HASH_IP_PORT,
            (SetType::HashNetPort, _) => HASH_NET_PORT,
            (SetType::HashIpPortIp, _) => HASH_IP_PORT_IP,
            (SetType::HashIpPortNet, _) => HASH_IP_PORT_NET,
            (SetType::HashIpMark, _) => HASH_IP_MARK,
            (SetType::HashNetPortNet, _) => HASH_NET_PORT_NET,
            (SetType::HashNetIface, _) => HASH_NET_IFACE,
            (SetType::ListSet, _) | (SetType::Unsupported, _) => &[],
        }
    }
}

/// Anchored regular expression for one shape.
pub fn shape_pattern(shape: Shape) -> String {
    let body = shape
        .iter()
        .map(Component::pattern)
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    format!("^{body}$")
}

type ShapeKey = (SetType, GrammarMode);

static COMPILED: LazyLock<HashMap<ShapeKey, Vec<Regex>>> = LazyLock::new(|| {
    let mut compiled = HashMap::new();
    for set_type in SetType::ALL {
        for mode in [GrammarMode::Full, GrammarMode::Test] {
            let regexes = set_type
                .shapes(mode)
                .iter()
                .map(|shape| {
                    Regex::new(&shape_pattern(shape)).expect("static entry grammar compiles")
                })
                .collect();
            compiled.insert((set_type, mode), regexes);
        }
    }
    compiled
});

/// Whether `entry` matches one of the shapes of `set_type` under `mode`.
pub fn matches_entry(set_type: SetType, mode: GrammarMode, entry: &str) -> bool {
    COMPILED
        .get(&(set_type, mode))
        .is_some_and(|regexes| regexes.iter().any(|re| re.is_match(entry)))
}

// Create ranges.

pub(crate) static IP_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{IP}-{IP}$")).expect("static range grammar compiles")
});

pub(crate) static IP_CIDR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{IP}{CIDR}$")).expect("static range grammar compiles")
});

pub(crate) static PORT_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+-[0-9]+$").expect("static range grammar compiles"));
