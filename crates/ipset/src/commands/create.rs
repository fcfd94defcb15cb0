//! `ipset create`.

use common::Result;

use super::{Command, execute, set_name};
use crate::options::{
    comment_flag_option, counters_option, force_add_option, hash_size_option,
    markmask_option, max_elements_option, netmask_option, protocol_family_option,
    range_ip_option, range_port_option, size_option, skb_info_option, timeout_option,
};
use crate::runner::Runner;
use crate::types::{CommandName, ProtocolFamily, SetType};

/// Create a set.
///
/// Every option of every set type lives here; translation only reads the
/// ones meaningful for `set_type`:
///
/// ```text
/// bitmap:ip      range fromip-toip|ip/cidr [ netmask cidr ]
/// bitmap:ip,mac  range fromip-toip|ip/cidr
/// bitmap:port    range fromport-toport
/// hash:ip        [ family ] | [ hashsize ] [ maxelem ] [ netmask ]
/// hash:ip,mark   [ family ] | [ markmask ] [ hashsize ] [ maxelem ]
/// hash:mac       [ hashsize ] [ maxelem ]
/// hash:*         [ family ] | [ hashsize ] [ maxelem ]
/// list:set       [ size ]
/// ```
///
/// followed by `[ timeout ] [ counters ] [ comment ] [ skbinfo ]` and, for
/// hash types, `[ forceadd ]`. A non-default family replaces every other
/// option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommand {
    pub name: String,
    pub set_type: SetType,

    /// bitmap:ip and bitmap:ip,mac.
    pub ip_range: String,
    /// bitmap:port.
    pub port_range: String,
    /// bitmap:ip and hash:ip.
    pub netmask: u32,
    /// hash:ip,mark.
    pub markmask: u32,
    /// Hash types.
    pub hash_size: u32,
    /// Hash types.
    pub max_elements: u32,
    /// list:set.
    pub size: u32,
    pub timeout: u32,
    pub counters: bool,
    pub skb_info: bool,
    /// Hash types.
    pub force_add: bool,
    /// Allow per-entry comments.
    pub comments: bool,
    /// Hash types except hash:mac.
    pub family: ProtocolFamily,
}

impl CreateCommand {
    pub fn new(name: impl Into<String>, set_type: SetType) -> Self {
        Self {
            name: name.into(),
            set_type,
            ip_range: String::new(),
            port_range: String::new(),
            netmask: 0,
            markmask: 0,
            hash_size: 0,
            max_elements: 0,
            size: 0,
            timeout: 0,
            counters: false,
            skb_info: false,
            force_add: false,
            comments: false,
            family: ProtocolFamily::Default,
        }
    }

    pub fn bitmap_ip(name: impl Into<String>, ip_range: impl Into<String>) -> Self {
        Self::new(name, SetType::BitmapIp).with_ip_range(ip_range)
    }

    pub fn bitmap_ip_mac(name: impl Into<String>, ip_range: impl Into<String>) -> Self {
        Self::new(name, SetType::BitmapIpMac).with_ip_range(ip_range)
    }

    pub fn bitmap_port(name: impl Into<String>, port_range: impl Into<String>) -> Self {
        Self::new(name, SetType::BitmapPort).with_port_range(port_range)
    }

    pub fn hash_ip(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashIp)
    }

    pub fn hash_mac(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashMac)
    }

    pub fn hash_ip_mac(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashIpMac)
    }

    pub fn hash_net(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashNet)
    }

    pub fn hash_net_net(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashNetNet)
    }

    pub fn hash_ip_port(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashIpPort)
    }

    pub fn hash_net_port(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashNetPort)
    }

    pub fn hash_ip_port_ip(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashIpPortIp)
    }

    pub fn hash_ip_port_net(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashIpPortNet)
    }

    pub fn hash_ip_mark(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashIpMark)
    }

    pub fn hash_net_port_net(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashNetPortNet)
    }

    pub fn hash_net_iface(name: impl Into<String>) -> Self {
        Self::new(name, SetType::HashNetIface)
    }

    pub fn list_set(name: impl Into<String>) -> Self {
        Self::new(name, SetType::ListSet)
    }

    pub fn with_ip_range(mut self, ip_range: impl Into<String>) -> Self {
        self.ip_range = ip_range.into();
        self
    }

    pub fn with_port_range(mut self, port_range: impl Into<String>) -> Self {
        self.port_range = port_range.into();
        self
    }

    pub fn with_netmask(mut self, netmask: u32) -> Self {
        self.netmask = netmask;
        self
    }

    pub fn with_markmask(mut self, markmask: u32) -> Self {
        self.markmask = markmask;
        self
    }

    pub fn with_hash_size(mut self, hash_size: u32) -> Self {
        self.hash_size = hash_size;
        self
    }

    pub fn with_max_elements(mut self, max_elements: u32) -> Self {
        self.max_elements = max_elements;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_counters(mut self, counters: bool) -> Self {
        self.counters = counters;
        self
    }

    pub fn with_skb_info(mut self, skb_info: bool) -> Self {
        self.skb_info = skb_info;
        self
    }

    pub fn with_force_add(mut self, force_add: bool) -> Self {
        self.force_add = force_add;
        self
    }

    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_family(mut self, family: ProtocolFamily) -> Self {
        self.family = family;
        self
    }

    /// Type specific options, `None` when a mandatory range is missing.
    fn type_options(&self) -> Option<Vec<String>> {
        let mut out = Vec::new();

        match self.set_type {
            SetType::BitmapIp => {
                let range = range_ip_option(&self.ip_range);
                if range.is_empty() {
                    return None;
                }
                out.extend(range);
                out.extend(netmask_option(self.netmask));
            }
            SetType::BitmapIpMac => {
                let range = range_ip_option(&self.ip_range);
                if range.is_empty() {
                    return None;
                }
                out.extend(range);
            }
            SetType::BitmapPort => {
                let range = range_port_option(&self.port_range);
                if range.is_empty() {
                    return None;
                }
                out.extend(range);
            }
            SetType::HashIp => {
                out.extend(hash_size_option(self.hash_size));
                out.extend(max_elements_option(self.max_elements));
                out.extend(netmask_option(self.netmask));
            }
            SetType::HashIpMark => {
                out.extend(markmask_option(self.markmask));
                out.extend(hash_size_option(self.hash_size));
                out.extend(max_elements_option(self.max_elements));
            }
            SetType::ListSet => out.extend(size_option(self.size)),
            SetType::Unsupported => return None,
            _ => {
                out.extend(hash_size_option(self.hash_size));
                out.extend(max_elements_option(self.max_elements));
            }
        }

        Some(out)
    }

    /// Run `ipset create`.
    pub fn run<R: Runner + ?Sized>(&self, runner: &R) -> Result<()> {
        execute(self, runner)?;
        Ok(())
    }
}

impl Command for CreateCommand {
    fn command_name(&self) -> CommandName {
        CommandName::Create
    }

    fn translate(&self) -> Vec<String> {
        let Some(name) = set_name(&self.name) else {
            return Vec::new();
        };

        let mut out = vec![
            CommandName::Create.to_string(),
            name.to_string(),
            self.set_type.to_string(),
        ];

        let family = protocol_family_option(self.family, self.set_type);
        if !family.is_empty() {
            out.extend(family);
            return out;
        }

        let Some(type_options) = self.type_options() else {
            return Vec::new();
        };
        out.extend(type_options);

        out.extend(timeout_option(self.timeout));
        out.extend(counters_option(self.counters));
        out.extend(comment_flag_option(self.comments));
        out.extend(skb_info_option(self.skb_info));
        if self.set_type.is_hash() {
            out.extend(force_add_option(self.force_add));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SET: &str = "testset";

    fn args(tail: &[&str]) -> Vec<String> {
        tail.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bitmap_ip() {
        let cmd = CreateCommand::bitmap_ip(SET, "192.168.0.0/16");
        assert_eq!(
            cmd.translate(),
            args(&["create", SET, "bitmap:ip", "range", "192.168.0.0/16"])
        );

        let cmd = CreateCommand::bitmap_ip(SET, "1.1.1.1-2.2.2.2")
            .with_netmask(24)
            .with_timeout(10)
            .with_counters(true)
            .with_comments(true)
            .with_skb_info(true);
        assert_eq!(
            cmd.translate(),
            args(&[
                "create", SET, "bitmap:ip", "range", "1.1.1.1-2.2.2.2", "netmask", "24",
                "timeout", "10", "counters", "comment", "skbinfo",
            ])
        );
    }

    #[test]
    fn test_bitmap_ip_mac_ignores_netmask() {
        let cmd = CreateCommand::bitmap_ip_mac(SET, "10.0.0.0/24").with_netmask(24);
        assert_eq!(
            cmd.translate(),
            args(&["create", SET, "bitmap:ip,mac", "range", "10.0.0.0/24"])
        );
    }

    #[test]
    fn test_bitmap_port() {
        let cmd = CreateCommand::bitmap_port(SET, "1024-65535").with_timeout(300);
        assert_eq!(
            cmd.translate(),
            args(&["create", SET, "bitmap:port", "range", "1024-65535", "timeout", "300"])
        );
    }

    #[test]
    fn test_bitmap_requires_valid_range() {
        let cases = [
            CreateCommand::bitmap_ip(SET, ""),
            CreateCommand::bitmap_ip(SET, "invalid"),
            CreateCommand::bitmap_ip(SET, "192.168.0.0/40"),
            CreateCommand::bitmap_ip_mac(SET, "1.1.1.1"),
            CreateCommand::bitmap_port(SET, ""),
            CreateCommand::bitmap_port(SET, "1-70000"),
            // The port range is not read for IP bitmaps and vice versa.
            CreateCommand::bitmap_ip(SET, "").with_port_range("1-2"),
            CreateCommand::bitmap_port(SET, "").with_ip_range("1.1.1.1-2.2.2.2"),
        ];

        for cmd in cases {
            assert!(cmd.translate().is_empty(), "{cmd:?}");
            assert!(!cmd.is_well_formed(), "{cmd:?}");
        }
    }

    #[test]
    fn test_hash_ip_options() {
        let cmd = CreateCommand::hash_ip(SET)
            .with_hash_size(1024)
            .with_max_elements(65536)
            .with_netmask(24)
            .with_timeout(60)
            .with_force_add(true);
        assert_eq!(
            cmd.translate(),
            args(&[
                "create", SET, "hash:ip", "hashsize", "1024", "maxelem", "65536", "netmask",
                "24", "timeout", "60", "forceadd",
            ])
        );
    }

    #[test]
    fn test_family_excludes_other_options() {
        let cmd = CreateCommand::hash_ip(SET)
            .with_family(ProtocolFamily::INet6)
            .with_hash_size(1024)
            .with_netmask(24)
            .with_timeout(60)
            .with_counters(true);
        assert_eq!(
            cmd.translate(),
            args(&["create", SET, "hash:ip", "family", "inet6"])
        );

        let cmd = CreateCommand::hash_net_port(SET)
            .with_family(ProtocolFamily::INet)
            .with_max_elements(10);
        assert_eq!(
            cmd.translate(),
            args(&["create", SET, "hash:net,port", "family", "inet"])
        );
    }

    #[test]
    fn test_hash_mac_never_takes_family() {
        let cmd = CreateCommand::hash_mac(SET)
            .with_family(ProtocolFamily::INet6)
            .with_hash_size(256);
        assert_eq!(
            cmd.translate(),
            args(&["create", SET, "hash:mac", "hashsize", "256"])
        );
    }

    #[test]
    fn test_hash_ip_mark() {
        let cmd = CreateCommand::hash_ip_mark(SET)
            .with_markmask(0xff)
            .with_hash_size(64)
            .with_max_elements(128);
        assert_eq!(
            cmd.translate(),
            args(&[
                "create", SET, "hash:ip,mark", "markmask", "255", "hashsize", "64", "maxelem",
                "128",
            ])
        );
    }

    #[test]
    fn test_other_hashes_ignore_netmask_and_size() {
        let cmd = CreateCommand::hash_net_iface(SET)
            .with_netmask(24)
            .with_size(8)
            .with_markmask(1)
            .with_max_elements(10);
        assert_eq!(
            cmd.translate(),
            args(&["create", SET, "hash:net,iface", "maxelem", "10"])
        );
    }

    #[test]
    fn test_list_set() {
        let cmd = CreateCommand::list_set(SET).with_size(8).with_force_add(true);
        assert_eq!(cmd.translate(), args(&["create", SET, "list:set", "size", "8"]));
    }

    #[test]
    fn test_defaults_are_omitted() {
        for set_type in SetType::ALL.into_iter().filter(|t| !t.is_bitmap()) {
            let cmd = CreateCommand::new(SET, set_type);
            assert_eq!(
                cmd.translate(),
                args(&["create", SET, set_type.name()]),
                "{set_type}"
            );
            assert!(cmd.is_well_formed());
        }
    }

    #[test]
    fn test_missing_name_or_type() {
        assert!(!CreateCommand::hash_ip("").is_well_formed());
        assert!(!CreateCommand::hash_ip(" \n").is_well_formed());
        assert!(!CreateCommand::new(SET, SetType::Unsupported).is_well_formed());
        assert!(
            !CreateCommand::new(SET, SetType::Unsupported)
                .with_family(ProtocolFamily::INet)
                .is_well_formed()
        );
    }

    #[test]
    fn test_translation_is_repeatable() {
        let cmd = CreateCommand::hash_ip_port(SET).with_timeout(5).with_counters(true);
        assert_eq!(cmd.translate(), cmd.translate());
    }
}
