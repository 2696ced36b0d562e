pub mod ssh;

use async_trait::async_trait;

use crate::error::{ConnectError, SessionError};
use crate::models::DeviceRecord;

pub use ssh::SshConnector;

/// A live CLI session on one device. How it was opened (SSH, a jump host,
/// a test double) is the connector's business.
#[async_trait]
pub trait DeviceSession: Send {
    /// Hostname as reported by the device prompt
    fn hostname(&self) -> &str;

    /// OS label detected on login ("IOS", "NXOS", or whatever else was seen)
    fn os_name(&self) -> &str;

    /// Reach privileged mode with `enable_secret` if needed, disable paging
    /// and fix the terminal width
    async fn begin_automation_mode(&mut self, enable_secret: &str) -> Result<(), SessionError>;

    /// Send one command and return its output without echo or prompt
    async fn send_command(&mut self, command: &str) -> Result<String, SessionError>;

    /// Put terminal length/width back to interactive defaults
    async fn end_automation_mode(&mut self) -> Result<(), SessionError>;

    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Opens sessions to inventory devices
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        device: &DeviceRecord,
        proxy: Option<&str>,
    ) -> Result<Box<dyn DeviceSession>, ConnectError>;
}
