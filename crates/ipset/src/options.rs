//! Option formatters.
//!
//! Each formatter turns one typed option into zero or more ipset arguments.
//! A value at its default (zero, false, empty) produces nothing, so a
//! command is the plain concatenation of its formatters' outputs.

use crate::grammar::{IP_CIDR_RANGE, IP_RANGE, PORT_RANGE};
use crate::types::{ProtocolFamily, SetType};

/// `[name, value]`, or nothing when `value` is 0.
pub fn int_option(name: &str, value: u32) -> Vec<String> {
    if value == 0 {
        Vec::new()
    } else {
        vec![name.to_string(), value.to_string()]
    }
}

/// `[name]` when `flag` is set.
pub fn flag_option(name: &str, flag: bool) -> Vec<String> {
    if flag {
        vec![name.to_string()]
    } else {
        Vec::new()
    }
}

/// `netmask` accepts a prefix length in 1..=32; anything else is dropped.
pub fn netmask_option(value: u32) -> Vec<String> {
    if (1..=32).contains(&value) {
        int_option("netmask", value)
    } else {
        Vec::new()
    }
}

pub fn markmask_option(value: u32) -> Vec<String> {
    int_option("markmask", value)
}

pub fn timeout_option(value: u32) -> Vec<String> {
    int_option("timeout", value)
}

pub fn hash_size_option(value: u32) -> Vec<String> {
    int_option("hashsize", value)
}

pub fn size_option(value: u32) -> Vec<String> {
    int_option("size", value)
}

pub fn max_elements_option(value: u32) -> Vec<String> {
    int_option("maxelem", value)
}

pub fn counters_option(flag: bool) -> Vec<String> {
    flag_option("counters", flag)
}

pub fn force_add_option(flag: bool) -> Vec<String> {
    flag_option("forceadd", flag)
}

pub fn skb_info_option(flag: bool) -> Vec<String> {
    flag_option("skbinfo", flag)
}

/// `comment` as a create flag: the set will accept per-entry comments.
pub fn comment_flag_option(flag: bool) -> Vec<String> {
    flag_option("comment", flag)
}

/// `[family, inet|inet6]` for hash types that take a family.
///
/// The default family is never emitted since ipset falls back to inet.
pub fn protocol_family_option(family: ProtocolFamily, set_type: SetType) -> Vec<String> {
    if family == ProtocolFamily::Default || !set_type.supports_family() {
        return Vec::new();
    }
    vec!["family".to_string(), family.to_string()]
}

/// `[range, def]` where `def` is `ip-ip` or `ip/cidr` (IPv4, cidr 1..=32).
///
/// The definition is passed through verbatim; any other shape yields nothing.
pub fn range_ip_option(def: &str) -> Vec<String> {
    if IP_RANGE.is_match(def) || IP_CIDR_RANGE.is_match(def) {
        vec!["range".to_string(), def.to_string()]
    } else {
        Vec::new()
    }
}

/// `[range, def]` where `def` is `port-port`, both ports in 0..=65535.
pub fn range_port_option(def: &str) -> Vec<String> {
    if !PORT_RANGE.is_match(def) {
        return Vec::new();
    }

    let in_range = def
        .split('-')
        .all(|port| port.parse::<u32>().is_ok_and(|p| p <= u32::from(u16::MAX)));

    if in_range {
        vec!["range".to_string(), def.to_string()]
    } else {
        Vec::new()
    }
}

/// `[comment, "text"]` for a per-entry comment.
///
/// Quotes and backslashes are removed rather than escaped, the tool has no
/// escaping rules for them. Blank comments yield nothing.
pub fn comment_option(comment: &str) -> Vec<String> {
    let cleaned: String = comment
        .trim_matches(|c: char| c == ' ' || c == '\n')
        .chars()
        .filter(|c| *c != '"' && *c != '\\')
        .collect();

    if cleaned.is_empty() {
        Vec::new()
    } else {
        vec!["comment".to_string(), format!("\"{cleaned}\"")]
    }
}
