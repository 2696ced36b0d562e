use crate::error::CollectError;
use crate::models::{MacTableEntry, MatchedEntry, OsFamily, VlanTargetSet};
use crate::parsers::{CommandPurpose, CompiledTemplate, TemplateStore};
use crate::search::{filter_mac_table, resolve_uplinks, StpRootRecord};
use crate::session::DeviceSession;

/// Per-OS commands and retry policy, resolved once per device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub os: OsFamily,
    pub stp_root_command: &'static str,
    pub mac_table_command: &'static str,
    /// Older spelling retried when the primary MAC table command yields no data
    pub mac_table_fallback: Option<&'static str>,
}

pub fn platform_profile(os: OsFamily) -> PlatformProfile {
    match os {
        OsFamily::Ios => PlatformProfile {
            os,
            stp_root_command: "show spanning-tree root",
            mac_table_command: "show mac address-table",
            mac_table_fallback: Some("show mac-address-table dynamic"),
        },
        OsFamily::Nxos => PlatformProfile {
            os,
            stp_root_command: "show spanning-tree root",
            mac_table_command: "show mac address-table",
            mac_table_fallback: None,
        },
    }
}

/// Collector runs the MAC search on one connected device
pub struct Collector<'a> {
    templates: &'a TemplateStore,
    targets: &'a VlanTargetSet,
    retry_threshold: usize,
}

impl<'a> Collector<'a> {
    /// `retry_threshold`: the fallback MAC command is tried when the primary
    /// parse yields this many records or fewer
    pub fn new(templates: &'a TemplateStore, targets: &'a VlanTargetSet, retry_threshold: usize) -> Self {
        Self {
            templates,
            targets,
            retry_threshold,
        }
    }

    /// Return the device hostname and its matching MAC entries.
    ///
    /// Automation mode is always ended once it was begun, including when
    /// a command fails midway.
    pub async fn collect(
        &self,
        session: &mut dyn DeviceSession,
        enable_secret: &str,
    ) -> Result<(String, Vec<MatchedEntry>), CollectError> {
        let os_name = session.os_name().to_string();
        let os = OsFamily::from_name(&os_name)
            .ok_or_else(|| CollectError::UnsupportedOs(format!("no support for OS '{}'", os_name)))?;
        let profile = platform_profile(os);
        let stp_template = self.template(os, CommandPurpose::SpanningTreeRoot)?;
        let mac_template = self.template(os, CommandPurpose::MacAddressTable)?;

        session.begin_automation_mode(enable_secret).await?;

        let result = self.gather(session, &profile, stp_template, mac_template).await;
        let restored = session.end_automation_mode().await;

        let matches = match (result, restored) {
            (Ok(matches), Ok(())) => matches,
            (Ok(_), Err(e)) => return Err(e.into()),
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(restore_err)) => {
                tracing::warn!("Failed to restore terminal on {}: {}", session.hostname(), restore_err);
                return Err(e);
            }
        };

        Ok((session.hostname().to_string(), matches))
    }

    fn template(&self, os: OsFamily, purpose: CommandPurpose) -> Result<&'a CompiledTemplate, CollectError> {
        self.templates
            .get(os, purpose)
            .ok_or_else(|| CollectError::UnsupportedOs(format!("no {:?} template for {}", purpose, os)))
    }

    async fn gather(
        &self,
        session: &mut dyn DeviceSession,
        profile: &PlatformProfile,
        stp_template: &CompiledTemplate,
        mac_template: &CompiledTemplate,
    ) -> Result<Vec<MatchedEntry>, CollectError> {
        tracing::debug!("Collecting from {} as {}", session.hostname(), profile.os);

        // Uplinks from spanning-tree root ports
        let raw_stp = session.send_command(profile.stp_root_command).await?;
        let vlan_idx = stp_template.field_index("vlan")?;
        let port_idx = stp_template.field_index("root_port")?;
        let stp_records: Vec<StpRootRecord> = stp_template
            .parse(&raw_stp, false)
            .iter()
            .map(|row| StpRootRecord::new(field(row, vlan_idx), field(row, port_idx)))
            .collect();
        let uplinks = resolve_uplinks(&stp_records);
        tracing::debug!("{} uplinks: {:?}", session.hostname(), uplinks);

        let raw_mac = session.send_command(profile.mac_table_command).await?;
        let mut mac_rows = mac_template.parse(&raw_mac, false);

        if let Some(fallback) = profile.mac_table_fallback {
            if mac_rows.len() <= self.retry_threshold {
                tracing::debug!("Retrying with command set to '{}'", fallback);
                let raw_mac = session.send_command(fallback).await?;
                mac_rows = mac_template.parse(&raw_mac, false);
            }
        }

        tracing::debug!("{} MAC table records parsed with {}", mac_rows.len(), mac_template.name());

        let vlan_idx = mac_template.field_index("vlan")?;
        let mac_idx = mac_template.field_index("mac")?;
        let ports_idx = mac_template.field_index("ports")?;
        let entries: Vec<MacTableEntry> = mac_rows
            .iter()
            .map(|row| MacTableEntry::new(field(row, vlan_idx), field(row, mac_idx), field(row, ports_idx)))
            .collect();

        Ok(filter_mac_table(&entries, self.targets, &uplinks))
    }
}

fn field(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}
