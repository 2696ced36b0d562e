use serde::Deserialize;
use std::fmt;

/// Remote-access protocol named in the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Protocol {
    Ssh2,
    Ssh1,
    Telnet,
}

impl Protocol {
    /// Parse an inventory protocol value, case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ssh2" | "ssh" => Some(Protocol::Ssh2),
            "ssh1" => Some(Protocol::Ssh1),
            "telnet" => Some(Protocol::Telnet),
            _ => None,
        }
    }
}

impl TryFrom<String> for Protocol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Protocol::parse(&value).ok_or_else(|| format!("unknown protocol '{}'", value))
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Ssh2 => "SSH2",
            Protocol::Ssh1 => "SSH1",
            Protocol::Telnet => "Telnet",
        };
        f.write_str(name)
    }
}

/// DeviceRecord is one row of the device inventory. Identity is the hostname.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "Hostname")]
    pub hostname: String,
    #[serde(rename = "Protocol")]
    pub protocol: Protocol,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Enable", default)]
    pub enable: String,
    #[serde(rename = "Proxy Session", default)]
    pub proxy: Option<String>,
}

impl DeviceRecord {
    /// Proxy to use for this device: its own if set, otherwise the default
    /// proxy when the global "use proxy" flag is on.
    pub fn resolve_proxy(&self, use_proxy: bool, default_proxy: &str) -> Option<String> {
        match self.proxy.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => Some(p.to_string()),
            _ if use_proxy && !default_proxy.trim().is_empty() => {
                Some(default_proxy.trim().to_string())
            }
            _ => None,
        }
    }
}

/// Device operating-system families the collector knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OsFamily {
    Ios,
    Nxos,
}

impl OsFamily {
    pub const ALL: [OsFamily; 2] = [OsFamily::Ios, OsFamily::Nxos];

    /// Map an OS label reported by a session ("IOS", "NX-OS", "nxos"...) to a family
    pub fn from_name(name: &str) -> Option<Self> {
        let clean: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match clean.as_str() {
            "IOS" | "IOSXE" => Some(OsFamily::Ios),
            "NXOS" => Some(OsFamily::Nxos),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Ios => "IOS",
            OsFamily::Nxos => "NXOS",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
