use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{ConnectError, SessionError};
use crate::models::DeviceRecord;
use crate::session::{Connector, DeviceSession};

pub const IOS_STP_ROOT: &str = "\
                                        Root    Hello Max Fwd
Vlan                   Root ID          Cost    Time  Age Dly  Root Port
---------------- -------------------- --------- ----- --- ---  ------------
VLAN0001         32769 0011.2233.4455         4    2   20  15  Gi1/0/49
VLAN0010         32778 0011.2233.4455         4    2   20  15  Gi1/0/49
VLAN0020         32788 aaaa.bbbb.cccc         0    2   20  15
";

pub const IOS_MAC_TABLE: &str = "\
          Mac Address Table
-------------------------------------------

Vlan    Mac Address       Type        Ports
----    -----------       --------    -----
 All    0100.0ccc.cccc    STATIC      CPU
   1    0011.2233.4455    DYNAMIC     Gi1/0/49
  10    0011.2233.4455    DYNAMIC     Gi1/0/49
  10    aaaa.bbbb.0001    DYNAMIC     Gi1/0/1
  10    aaaa.bbbb.0002    DYNAMIC     Gi1/0/2
  20    cccc.dddd.0003    DYNAMIC     Gi1/0/3
  30    eeee.ffff.0004    DYNAMIC     Gi1/0/4
Total Mac Addresses for this criterion: 7
";

pub const IOS_EMPTY_MAC_TABLE: &str = "\
                          ^
% Invalid input detected at '^' marker.
";

pub const IOS_LEGACY_MAC_TABLE: &str = "\
Dynamic Address Count:                 2
Destination Address  Address Type  VLAN  Destination Port
-------------------  ------------  ----  --------------------
0011.2233.4455          Dynamic       10     FastEthernet0/24
aaaa.bbbb.0009          Dynamic       10     FastEthernet0/9
";

pub const NXOS_STP_ROOT: &str = "\
VLAN0010         32778 0011.2233.4455       2    2   20  15  Ethernet1/49
VLAN0020         32788 002a.6a5e.1c41       0    2   20  15  This bridge is root
";

pub const NXOS_MAC_TABLE: &str = "\
Legend:
        * - primary entry, G - Gateway MAC, (R) - Routed MAC, O - Overlay MAC
   VLAN     MAC Address      Type      age     Secure NTFY Ports
---------+-----------------+--------+---------+------+----+------------------
* 10       0011.2233.4455   dynamic  0         F      F    Eth1/49
* 10       aaaa.bbbb.0101   dynamic  0         F      F    Eth1/1
* 20       aaaa.bbbb.0102   dynamic  0         F      F    Eth1/2
G -        002a.6a5e.1c41   static   -         F      F    sup-eth1(R)
";

/// Session whose command outputs are scripted; every call is recorded.
/// Used by the collector and batch tests.
pub struct ScriptedSession {
    pub hostname: String,
    pub os_name: String,
    pub responses: HashMap<String, String>,
    pub failing_command: Option<String>,
    pub fail_begin: bool,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSession {
    pub fn new(hostname: &str, os_name: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            os_name: os_name.to_string(),
            responses: HashMap::new(),
            failing_command: None,
            fail_begin: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn respond(mut self, command: &str, output: &str) -> Self {
        self.responses.insert(command.to_string(), output.to_string());
        self
    }

    pub fn fail_on(mut self, command: &str) -> Self {
        self.failing_command = Some(command.to_string());
        self
    }

    pub fn ios(hostname: &str) -> Self {
        Self::new(hostname, "IOS")
            .respond("show spanning-tree root", IOS_STP_ROOT)
            .respond("show mac address-table", IOS_MAC_TABLE)
    }

    pub fn nxos(hostname: &str) -> Self {
        Self::new(hostname, "NXOS")
            .respond("show spanning-tree root", NXOS_STP_ROOT)
            .respond("show mac address-table", NXOS_MAC_TABLE)
    }

    fn record(&self, call: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.to_string());
        }
    }
}

#[async_trait]
impl DeviceSession for ScriptedSession {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn os_name(&self) -> &str {
        &self.os_name
    }

    async fn begin_automation_mode(&mut self, enable_secret: &str) -> Result<(), SessionError> {
        self.record(&format!("begin:{}", enable_secret));
        if self.fail_begin {
            return Err(SessionError::Enable("bad secret".to_string()));
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String, SessionError> {
        self.record(command);
        if self.failing_command.as_deref() == Some(command) {
            return Err(SessionError::Command {
                command: command.to_string(),
                reason: "connection reset\n".to_string(),
            });
        }
        Ok(self.responses.get(command).cloned().unwrap_or_default())
    }

    async fn end_automation_mode(&mut self) -> Result<(), SessionError> {
        self.record("end");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.record("close");
        Ok(())
    }
}

/// Connector handing out scripted sessions by hostname; unknown hosts fail to connect
#[derive(Default)]
pub struct ScriptedConnector {
    sessions: Mutex<HashMap<String, ScriptedSession>>,
    pub proxies: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedConnector {
    pub fn with(self, session: ScriptedSession) -> Self {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(session.hostname.clone(), session);
        }
        self
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(
        &self,
        device: &DeviceRecord,
        proxy: Option<&str>,
    ) -> Result<Box<dyn DeviceSession>, ConnectError> {
        if let Ok(mut proxies) = self.proxies.lock() {
            proxies.push((device.hostname.clone(), proxy.map(|p| p.to_string())));
        }
        let session = self
            .sessions
            .lock()
            .ok()
            .and_then(|mut s| s.remove(&device.hostname));
        match session {
            Some(s) => Ok(Box::new(s)),
            None => Err(ConnectError::Tcp {
                addr: format!("{}:22", device.hostname),
                reason: "Connection refused (os error 111)".to_string(),
            }),
        }
    }
}
