use crate::error::VlanLabelError;
use crate::models::{MacTableEntry, MatchedEntry, UplinkMap, VlanTargetSet};
use crate::utils::long_int_name;

/// One parsed "show spanning-tree root" row, reduced to what the resolver needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StpRootRecord {
    pub vlan_label: String,
    pub root_port: String,
}

impl StpRootRecord {
    pub fn new(vlan_label: &str, root_port: &str) -> Self {
        Self {
            vlan_label: vlan_label.to_string(),
            root_port: root_port.to_string(),
        }
    }
}

/// Pull the VLAN number out of a label like "VLAN0010"
pub fn vlan_from_label(label: &str) -> Result<u32, VlanLabelError> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse()
        .map_err(|_| VlanLabelError(label.to_string()))
}

/// Build the VLAN -> uplink map from spanning-tree root records.
///
/// Rows with an empty root port (this switch is root) add nothing. Rows
/// whose label has no VLAN number are skipped with a warning. A repeated
/// VLAN keeps the last row seen.
pub fn resolve_uplinks(records: &[StpRootRecord]) -> UplinkMap {
    records
        .iter()
        .filter_map(|record| match vlan_from_label(&record.vlan_label) {
            Ok(vlan) => Some((vlan, long_int_name(&record.root_port))),
            Err(e) => {
                tracing::warn!("Skipping spanning-tree row: {}", e);
                None
            }
        })
        .filter(|(_, uplink)| !uplink.is_empty())
        .fold(UplinkMap::new(), |mut map, (vlan, uplink)| {
            if let Some(previous) = map.insert(vlan, uplink) {
                tracing::debug!("VLAN {} listed twice in spanning-tree root, dropping uplink {}", vlan, previous);
            }
            map
        })
}

/// Keep MAC table entries in the target VLANs that were not learned on
/// that VLAN's uplink. A VLAN without an uplink excludes nothing. Order is
/// preserved and entries are returned as parsed.
pub fn filter_mac_table(
    entries: &[MacTableEntry],
    targets: &VlanTargetSet,
    uplinks: &UplinkMap,
) -> Vec<MatchedEntry> {
    entries
        .iter()
        .filter(|entry| {
            let Ok(vlan) = entry.vlan.trim().parse::<u32>() else {
                return false;
            };
            if !targets.contains(&vlan) {
                return false;
            }
            uplinks
                .get(&vlan)
                .map_or(true, |uplink| long_int_name(&entry.interface) != *uplink)
        })
        .cloned()
        .collect()
}
