mod devices;

use std::collections::{BTreeMap, BTreeSet};

pub use devices::{DeviceRecord, OsFamily, Protocol};

/// Set of VLAN ids to search for, fixed before the first device is contacted
pub type VlanTargetSet = BTreeSet<u32>;

/// VLAN id -> normalized uplink (spanning-tree root port) interface name.
/// A missing VLAN means there is no uplink to exclude.
pub type UplinkMap = BTreeMap<u32, String>;

/// One row of a parsed MAC address table, fields as printed by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacTableEntry {
    pub vlan: String,
    pub mac: String,
    pub interface: String,
}

impl MacTableEntry {
    pub fn new(vlan: &str, mac: &str, interface: &str) -> Self {
        Self {
            vlan: vlan.to_string(),
            mac: mac.to_string(),
            interface: interface.to_string(),
        }
    }
}

/// A MAC table row that survived the VLAN and uplink filter, unmodified
pub type MatchedEntry = MacTableEntry;

/// Canonical failure tags written to the failure log
pub mod failure_tag {
    pub const CONNECT_FAILED: &str = "CONNECT-FAILED";
    pub const SESSION_FAILED: &str = "SESSION-FAILED";
    pub const UNSUPPORTED_OS: &str = "UNSUPPORTED-OS";
}

/// Terminal state of one device in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    Success(Vec<MatchedEntry>),
    ConnectFailed(String),
    SessionFailed(String),
    UnsupportedOs(String),
}

/// DeviceOutcome is produced exactly once per inventory device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOutcome {
    pub hostname: String,
    pub status: DeviceStatus,
}

impl DeviceOutcome {
    pub fn success(hostname: &str, matches: Vec<MatchedEntry>) -> Self {
        Self {
            hostname: hostname.to_string(),
            status: DeviceStatus::Success(matches),
        }
    }

    /// Failure-log tag and trimmed reason, or None for a success
    pub fn failure(&self) -> Option<(&'static str, &str)> {
        match &self.status {
            DeviceStatus::Success(_) => None,
            DeviceStatus::ConnectFailed(r) => Some((failure_tag::CONNECT_FAILED, r.trim())),
            DeviceStatus::SessionFailed(r) => Some((failure_tag::SESSION_FAILED, r.trim())),
            DeviceStatus::UnsupportedOs(r) => Some((failure_tag::UNSUPPORTED_OS, r.trim())),
        }
    }
}

/// Counters logged at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub devices: usize,
    pub with_matches: usize,
    pub empty: usize,
    pub failed: usize,
    pub matched_entries: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &DeviceOutcome) {
        self.devices += 1;
        match &outcome.status {
            DeviceStatus::Success(m) if m.is_empty() => self.empty += 1,
            DeviceStatus::Success(m) => {
                self.with_matches += 1;
                self.matched_entries += m.len();
            }
            _ => self.failed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(proxy: Option<&str>) -> DeviceRecord {
        DeviceRecord {
            hostname: "sw1".to_string(),
            protocol: Protocol::Ssh2,
            username: "admin".to_string(),
            password: "secret".to_string(),
            enable: String::new(),
            proxy: proxy.map(|p| p.to_string()),
        }
    }

    #[test]
    fn test_resolve_proxy() {
        assert_eq!(device(Some("jump1")).resolve_proxy(true, "jump0"), Some("jump1".to_string()));
        assert_eq!(device(None).resolve_proxy(true, "jump0"), Some("jump0".to_string()));
        assert_eq!(device(Some("  ")).resolve_proxy(true, "jump0"), Some("jump0".to_string()));
        assert_eq!(device(None).resolve_proxy(false, "jump0"), None);
        assert_eq!(device(None).resolve_proxy(true, ""), None);
    }

    #[test]
    fn test_os_family_from_name() {
        assert_eq!(OsFamily::from_name("IOS"), Some(OsFamily::Ios));
        assert_eq!(OsFamily::from_name("NX-OS"), Some(OsFamily::Nxos));
        assert_eq!(OsFamily::from_name("nxos"), Some(OsFamily::Nxos));
        assert_eq!(OsFamily::from_name("EOS"), None);
    }

    #[test]
    fn test_protocol_parse() {
        assert_eq!(Protocol::parse("ssh2"), Some(Protocol::Ssh2));
        assert_eq!(Protocol::parse(" Telnet "), Some(Protocol::Telnet));
        assert_eq!(Protocol::parse("rdp"), None);
    }

    #[test]
    fn test_failure_reason_is_trimmed() {
        let outcome = DeviceOutcome {
            hostname: "sw1".to_string(),
            status: DeviceStatus::ConnectFailed("  timed out \n".to_string()),
        };
        assert_eq!(outcome.failure(), Some((failure_tag::CONNECT_FAILED, "timed out")));
        assert_eq!(DeviceOutcome::success("sw1", vec![]).failure(), None);
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(&DeviceOutcome::success("a", vec![MacTableEntry::new("10", "aaaa.bbbb.cccc", "Gi1/0/2")]));
        summary.record(&DeviceOutcome::success("b", vec![]));
        summary.record(&DeviceOutcome {
            hostname: "c".to_string(),
            status: DeviceStatus::UnsupportedOs("EOS".to_string()),
        });
        assert_eq!(
            summary,
            RunSummary { devices: 3, with_matches: 1, empty: 1, failed: 1, matched_entries: 1 }
        );
    }
}
