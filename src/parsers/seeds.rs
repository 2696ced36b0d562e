use crate::models::OsFamily;

use super::{CommandPurpose, ExtractionTemplate};

/// Template seed: name, description, fields and line rules
pub(super) struct DefaultTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [&'static str],
    pub rules: &'static [&'static str],
}

impl DefaultTemplate {
    fn to_template(&self) -> ExtractionTemplate {
        ExtractionTemplate {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            fields: self.fields.iter().map(|f| f.to_string()).collect(),
            rules: self.rules.iter().map(|r| r.to_string()).collect(),
        }
    }
}

pub const IOS_STP_ROOT: &str = "cisco_ios_show_spanning-tree_root";
pub const NXOS_STP_ROOT: &str = "cisco_nxos_show_spanning-tree_root";
pub const IOS_MAC_TABLE: &str = "cisco_ios_show_mac_addr_table";
pub const NXOS_MAC_TABLE: &str = "cisco_nxos_show_mac_addr_table";

/// Template name serving a command purpose on an OS family
pub fn template_name(os: OsFamily, purpose: CommandPurpose) -> &'static str {
    match (os, purpose) {
        (OsFamily::Ios, CommandPurpose::SpanningTreeRoot) => IOS_STP_ROOT,
        (OsFamily::Nxos, CommandPurpose::SpanningTreeRoot) => NXOS_STP_ROOT,
        (OsFamily::Ios, CommandPurpose::MacAddressTable) => IOS_MAC_TABLE,
        (OsFamily::Nxos, CommandPurpose::MacAddressTable) => NXOS_MAC_TABLE,
    }
}

const STP_ROOT_FIELDS: &[&str] = &[
    "vlan",
    "root_priority",
    "root_id",
    "root_cost",
    "hello_time",
    "max_age",
    "fwd_delay",
    "root_port",
];

pub(super) fn seed_template_data() -> Vec<ExtractionTemplate> {
    vec![
        // IOS "show spanning-tree root"
        // Example output:
        //                                           Root    Hello Max Fwd
        //   Vlan                   Root ID          Cost    Time  Age Dly  Root Port
        //   ---------------- -------------------- --------- ----- --- ---  ------------
        //   VLAN0001         32769 0011.2233.4455         4    2   20  15  Gi1/0/49
        //   VLAN0020         32788 aaaa.bbbb.cccc         0    2   20  15
        DefaultTemplate {
            name: IOS_STP_ROOT,
            description: "Parses 'show spanning-tree root' on IOS",
            fields: STP_ROOT_FIELDS,
            rules: &[
                r"^\s*(?P<vlan>VLAN\d+)\s+(?P<root_priority>\d+)\s+(?P<root_id>[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4})\s+(?P<root_cost>\d+)\s+(?P<hello_time>\d+)\s+(?P<max_age>\d+)\s+(?P<fwd_delay>\d+)(?:\s+(?P<root_port>\S+))?\s*$",
            ],
        },
        // NX-OS "show spanning-tree root"
        // Example output:
        //   VLAN0001         32769 0011.2233.4455       2    2   20  15  Ethernet1/49
        //   VLAN0010         32778 002a.6a5e.1c41       0    2   20  15  This bridge is root
        DefaultTemplate {
            name: NXOS_STP_ROOT,
            description: "Parses 'show spanning-tree root' on NX-OS",
            fields: STP_ROOT_FIELDS,
            rules: &[
                r"^\s*(?P<vlan>VLAN\d+)\s+(?P<root_priority>\d+)\s+(?P<root_id>[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4})\s+(?P<root_cost>\d+)\s+(?P<hello_time>\d+)\s+(?P<max_age>\d+)\s+(?P<fwd_delay>\d+)\s+This bridge is root\s*$",
                r"^\s*(?P<vlan>VLAN\d+)\s+(?P<root_priority>\d+)\s+(?P<root_id>[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4})\s+(?P<root_cost>\d+)\s+(?P<hello_time>\d+)\s+(?P<max_age>\d+)\s+(?P<fwd_delay>\d+)(?:\s+(?P<root_port>\S+))?\s*$",
            ],
        },
        // IOS "show mac address-table"
        // Example output:
        //   Vlan    Mac Address       Type        Ports
        //   ----    -----------       --------    -----
        //    All    0100.0ccc.cccc    STATIC      CPU
        //     10    aaaa.bbbb.cccc    DYNAMIC     Gi1/0/1
        // Legacy "show mac-address-table dynamic" puts the MAC first:
        //   Destination Address  Address Type  VLAN  Destination Port
        //   0011.2233.4455       Dynamic          1  FastEthernet0/1
        DefaultTemplate {
            name: IOS_MAC_TABLE,
            description: "Parses 'show mac address-table' and legacy 'show mac-address-table' on IOS",
            fields: &["vlan", "mac", "type", "ports"],
            rules: &[
                r"^[*+]?\s*(?P<vlan>\S+)\s+(?P<mac>[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4})\s+(?P<type>\S+)\s+(?P<ports>\S+)\s*$",
                r"^\s*(?P<mac>[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4})\s+(?P<type>\S+)\s+(?P<vlan>\S+)\s+(?P<ports>\S+)\s*$",
            ],
        },
        // NX-OS "show mac address-table"
        // Example output:
        //      VLAN     MAC Address      Type      age     Secure NTFY Ports
        //   ---------+-----------------+--------+---------+------+----+------------------
        //   * 10       aaaa.bbbb.cccc   dynamic  0         F      F    Eth1/1
        //   G -        002a.6a5e.1c41   static   -         F      F    sup-eth1(R)
        DefaultTemplate {
            name: NXOS_MAC_TABLE,
            description: "Parses 'show mac address-table' on NX-OS",
            fields: &["vlan", "mac", "type", "age", "secure", "ntfy", "ports"],
            rules: &[
                r"^[*+GORWC~]?\s*(?P<vlan>\d+|-)\s+(?P<mac>[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4})\s+(?P<type>\S+)\s+(?P<age>\S+)\s+(?P<secure>[TF])\s+(?P<ntfy>[TF])\s+(?P<ports>\S+)\s*$",
            ],
        },
    ]
    .iter()
    .map(DefaultTemplate::to_template)
    .collect()
}
