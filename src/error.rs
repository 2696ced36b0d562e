use thiserror::Error;

/// A VLAN range expression that is not a comma-separated list of numbers
/// and `lo-hi` ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range token '{0}'")]
    InvalidToken(String),

    #[error("range '{token}' is reversed ({lo} > {hi})")]
    Reversed { token: String, lo: u32, hi: u32 },

    #[error("VLAN {value} in '{token}' is above the maximum of {max}")]
    OutOfRange { token: String, value: u32, max: u32 },
}

/// A spanning-tree VLAN label (e.g. `VLAN0010`) with no digits in it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no VLAN number in label '{0}'")]
pub struct VlanLabelError(pub String);

/// Failure to reach or log in to a device.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("TCP connection to {addr} failed: {reason}")]
    Tcp { addr: String, reason: String },

    #[error("SSH handshake failed: {0}")]
    Handshake(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("{0} sessions are not supported by this transport")]
    UnsupportedProtocol(String),

    #[error("proxy session '{0}' is not supported by this transport")]
    UnsupportedProxy(String),

    #[error("{0}")]
    Other(String),
}

/// Failure while exchanging commands with a connected device.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("command '{command}' failed: {reason}")]
    Command { command: String, reason: String },

    #[error("timed out waiting for the device prompt")]
    PromptTimeout,

    #[error("enable failed: {0}")]
    Enable(String),

    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session task failed: {0}")]
    Task(String),
}

/// A broken extraction template (bad regex, unknown field in a rule).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template '{template}': invalid rule '{rule}': {reason}")]
    InvalidRule {
        template: String,
        rule: String,
        reason: String,
    },

    #[error("template '{template}': rule '{rule}' captures unknown field '{field}'")]
    UnknownField {
        template: String,
        rule: String,
        field: String,
    },

    #[error("template '{template}' has no field named '{field}'")]
    MissingField { template: String, field: String },
}

/// Anything that stops the collector from producing matches for one device.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{0}")]
    UnsupportedOs(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}
