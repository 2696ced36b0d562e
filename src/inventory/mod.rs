use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::models::DeviceRecord;

const REQUIRED_COLUMNS: [&str; 4] = ["Hostname", "Protocol", "Username", "Password"];

/// Load the device inventory. `.json` files hold an array of device objects;
/// anything else is read as CSV with a header row naming the same keys.
pub async fn load_inventory(path: &str) -> Result<Vec<DeviceRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read inventory {}", path))?;

    let is_json = Path::new(path)
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    let devices = if is_json {
        serde_json::from_str(&content).with_context(|| format!("Invalid inventory JSON in {}", path))?
    } else {
        parse_csv_inventory(&content).with_context(|| format!("Invalid inventory CSV in {}", path))?
    };

    Ok(devices)
}

/// Parse CSV inventory text. Column order is free, quoted fields may hold
/// commas, and blank and `#` lines are skipped.
pub fn parse_csv_inventory(content: &str) -> Result<Vec<DeviceRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            bail!("missing column '{}'", required);
        }
    }

    let mut devices = Vec::new();
    for (i, row) in reader.deserialize::<DeviceRecord>().enumerate() {
        let device = row.with_context(|| format!("record {}", i + 1))?;
        if device.hostname.is_empty() {
            bail!("record {}: empty Hostname", i + 1);
        }
        devices.push(device);
    }

    Ok(devices)
}
