use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::models::{DeviceOutcome, DeviceStatus, MatchedEntry};

const VLAN_WIDTH: usize = 8;
const MAC_WIDTH: usize = 20;

/// Report header line written once at the top of the report
pub fn report_header(range: &str) -> String {
    format!("MAC ADDRESS SEARCH IN VLANS: {}\n\n", range)
}

/// Device section: header, column titles, one fixed-width row per match, blank line
pub fn format_device_section(hostname: &str, matches: &[MatchedEntry]) -> String {
    let mut section = format!("### Device: {} ###\n", hostname);
    section.push_str(&format_row("VLAN", "MAC", "PORT"));
    for entry in matches {
        section.push_str(&format_row(&entry.vlan, &entry.mac, &entry.interface));
    }
    section.push('\n');
    section
}

fn format_row(vlan: &str, mac: &str, port: &str) -> String {
    format!("{:<vw$}{:<mw$}{}\n", vlan, mac, port, vw = VLAN_WIDTH, mw = MAC_WIDTH)
}

/// One failure-log line: "<timestamp> <TAG> <hostname>: <reason>"
pub fn format_failure_line(at: &DateTime<Local>, tag: &str, hostname: &str, reason: &str) -> String {
    format!(
        "{} {} {}: {}\n",
        at.format("%Y-%m-%d %H:%M:%S"),
        tag,
        hostname,
        reason.trim()
    )
}

/// RunReport owns the two run outputs: the report of matches and the
/// append-only failure log. Both are flushed after every device.
pub struct RunReport<W> {
    report: W,
    failures: W,
}

impl RunReport<BufWriter<File>> {
    /// Create the report file (truncating) and open the failure log for append
    pub async fn create(report_path: &Path, failure_path: &Path, range: &str) -> Result<Self> {
        if let Some(dir) = report_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }

        let report = File::create(report_path)
            .await
            .with_context(|| format!("Failed to create report {}", report_path.display()))?;
        let failures = OpenOptions::new()
            .create(true)
            .append(true)
            .open(failure_path)
            .await
            .with_context(|| format!("Failed to open failure log {}", failure_path.display()))?;

        Self::start(BufWriter::new(report), BufWriter::new(failures), range).await
    }
}

impl<W: AsyncWrite + Unpin> RunReport<W> {
    /// Wrap the writers and write the report header
    pub async fn start(report: W, failures: W, range: &str) -> Result<Self> {
        let mut run_report = Self { report, failures };
        run_report.report.write_all(report_header(range).as_bytes()).await?;
        run_report.report.flush().await?;
        Ok(run_report)
    }

    /// Write what a device produced: a section for matches, a line for failures,
    /// nothing for a device with no matches
    pub async fn record(&mut self, outcome: &DeviceOutcome, at: &DateTime<Local>) -> Result<()> {
        match (&outcome.status, outcome.failure()) {
            (DeviceStatus::Success(matches), _) if !matches.is_empty() => {
                let section = format_device_section(&outcome.hostname, matches);
                self.report.write_all(section.as_bytes()).await?;
                self.report.flush().await?;
            }
            (_, Some((tag, reason))) => {
                let line = format_failure_line(at, tag, &outcome.hostname, reason);
                self.failures.write_all(line.as_bytes()).await?;
                self.failures.flush().await?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Flush both outputs and hand the writers back
    pub async fn finish(mut self) -> Result<(W, W)> {
        self.report.flush().await?;
        self.failures.flush().await?;
        Ok((self.report, self.failures))
    }
}

/// Paths for one run's report and failure log
pub fn output_paths(output_dir: &str, started: &DateTime<Local>) -> (PathBuf, PathBuf) {
    (
        crate::utils::output_filename(output_dir, "mac-search-by-vlan", started),
        crate::utils::output_filename(output_dir, "mac-search-by-vlan-LOG", started),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{failure_tag, MacTableEntry};
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_format_device_section() {
        let section = format_device_section(
            "sw1",
            &[
                MacTableEntry::new("10", "aaaa.bbbb.0001", "Gi1/0/1"),
                MacTableEntry::new("200", "aaaa.bbbb.0002", "Gi1/0/2"),
            ],
        );
        assert_eq!(
            section,
            "### Device: sw1 ###\n\
             VLAN    MAC                 PORT\n\
             10      aaaa.bbbb.0001      Gi1/0/1\n\
             200     aaaa.bbbb.0002      Gi1/0/2\n\
             \n"
        );
    }

    #[test]
    fn test_overlong_field_is_not_truncated() {
        let section = format_device_section("sw1", &[MacTableEntry::new("123456789", "m", "p")]);
        assert!(section.contains("\n123456789m                   p\n"));
    }

    #[test]
    fn test_format_failure_line() {
        let line = format_failure_line(&at(), failure_tag::CONNECT_FAILED, "sw9", "  refused \n");
        assert_eq!(line, "2024-05-01 08:30:00 CONNECT-FAILED sw9: refused\n");
    }

    #[tokio::test]
    async fn test_record_routes_outcomes() {
        let mut report = RunReport::start(Vec::new(), Vec::new(), "10,20").await.unwrap();

        report
            .record(&DeviceOutcome::success("a", vec![MacTableEntry::new("10", "aaaa.bbbb.0001", "Gi1/0/1")]), &at())
            .await
            .unwrap();
        report.record(&DeviceOutcome::success("b", vec![]), &at()).await.unwrap();
        report
            .record(
                &DeviceOutcome {
                    hostname: "c".to_string(),
                    status: DeviceStatus::SessionFailed("timed out".to_string()),
                },
                &at(),
            )
            .await
            .unwrap();

        let (report_bytes, failure_bytes) = report.finish().await.unwrap();
        let report_text = String::from_utf8(report_bytes).unwrap();
        let failure_text = String::from_utf8(failure_bytes).unwrap();

        assert!(report_text.starts_with("MAC ADDRESS SEARCH IN VLANS: 10,20\n\n### Device: a ###\n"));
        assert!(!report_text.contains("Device: b"));
        assert_eq!(failure_text, "2024-05-01 08:30:00 SESSION-FAILED c: timed out\n");
    }

    #[tokio::test]
    async fn test_create_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let (report_path, log_path) = output_paths(out_dir.to_str().unwrap(), &at());

        let report = RunReport::create(&report_path, &log_path, "1-3").await.unwrap();
        report.finish().await.unwrap();

        let text = std::fs::read_to_string(&report_path).unwrap();
        assert_eq!(text, "MAC ADDRESS SEARCH IN VLANS: 1-3\n\n");
        assert!(log_path.exists());
        assert!(report_path.ends_with("mac-search-by-vlan-2024-05-01-08-30-00.txt"));
    }
}
