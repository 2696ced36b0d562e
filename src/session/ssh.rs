use async_trait::async_trait;
use regex_lite::Regex;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{ConnectError, SessionError};
use crate::models::{DeviceRecord, OsFamily, Protocol};

use super::{Connector, DeviceSession};

/// Paging prompt answered with a space while reading output
const MORE_PROMPT: &str = "--More--";

/// Keyboard-interactive prompt handler that always responds with the password
struct PasswordPrompt {
    password: String,
}

impl ssh2::KeyboardInteractivePrompt for PasswordPrompt {
    fn prompt<'a>(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[ssh2::Prompt<'a>],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.password.clone()).collect()
    }
}

const IOS_BEGIN: &[&str] = &["terminal length 0", "terminal width 0"];
const NXOS_BEGIN: &[&str] = &["terminal length 0", "terminal width 511"];
const RESTORE: &[&str] = &["terminal length 24", "terminal width 80"];

/// Terminal commands that enter and leave automation mode
fn automation_commands(os: OsFamily) -> (&'static [&'static str], &'static [&'static str]) {
    match os {
        OsFamily::Ios => (IOS_BEGIN, RESTORE),
        OsFamily::Nxos => (NXOS_BEGIN, RESTORE),
    }
}

/// Guess the OS label from "show version" output
pub fn detect_os(show_version: &str) -> String {
    if show_version.contains("NX-OS") {
        OsFamily::Nxos.as_str().to_string()
    } else if show_version.contains("IOS") {
        OsFamily::Ios.as_str().to_string()
    } else if show_version.contains("Arista") {
        "EOS".to_string()
    } else if show_version.contains("JUNOS") {
        "JUNOS".to_string()
    } else {
        "unknown".to_string()
    }
}

/// Output of one command without the echoed command line and the trailing prompt.
/// Device error text such as "% Invalid input" is kept; the parser finds no
/// records in it.
fn command_body(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    match lines.len() {
        0..=2 => String::new(),
        n => lines[1..n - 1].join("\n"),
    }
}

/// SshConnector opens interactive SSH2 shells using libssh2
pub struct SshConnector {
    port: u16,
    timeout: Duration,
}

impl SshConnector {
    pub fn new(port: u16, timeout_secs: u64) -> Self {
        Self {
            port,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        device: &DeviceRecord,
        proxy: Option<&str>,
    ) -> Result<Box<dyn DeviceSession>, ConnectError> {
        if device.protocol != Protocol::Ssh2 {
            return Err(ConnectError::UnsupportedProtocol(device.protocol.to_string()));
        }
        if let Some(proxy) = proxy {
            return Err(ConnectError::UnsupportedProxy(proxy.to_string()));
        }

        let host = device.hostname.clone();
        let user = device.username.clone();
        let pass = device.password.clone();
        let port = self.port;
        let timeout = self.timeout;

        let session = tokio::task::spawn_blocking(move || -> Result<SshSession, ConnectError> {
            let ssh = ssh_connect(&host, port, &user, &pass, timeout)?;
            let mut shell = SshShell::open(ssh, timeout)?;

            let version = shell
                .run("show version")
                .map_err(|e| ConnectError::Other(format!("show version failed: {}", e)))?;
            let os_name = detect_os(&version);
            let hostname = shell.hostname().to_string();

            Ok(SshSession {
                shell: Arc::new(Mutex::new(shell)),
                hostname,
                os_name,
            })
        })
        .await
        .map_err(|e| ConnectError::Other(format!("Task join error: {}", e)))??;

        tracing::debug!("Connected to {} ({})", session.hostname, session.os_name);
        Ok(Box::new(session))
    }
}

/// Create an SSH session and authenticate with password + keyboard-interactive.
/// This is blocking, so call from a spawn_blocking context.
fn ssh_connect(
    host: &str,
    port: u16,
    user: &str,
    pass: &str,
    timeout: Duration,
) -> Result<ssh2::Session, ConnectError> {
    let addr_str = format!("{}:{}", host, port);
    let tcp_err = |reason: String| ConnectError::Tcp {
        addr: addr_str.clone(),
        reason,
    };

    let addr = addr_str
        .to_socket_addrs()
        .map_err(|e| tcp_err(e.to_string()))?
        .next()
        .ok_or_else(|| tcp_err("no address found".to_string()))?;
    let tcp = TcpStream::connect_timeout(&addr, timeout).map_err(|e| tcp_err(e.to_string()))?;

    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session =
        ssh2::Session::new().map_err(|e| ConnectError::Other(format!("Failed to create SSH session: {}", e)))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(timeout.as_millis() as u32);
    session
        .handshake()
        .map_err(|e| ConnectError::Handshake(e.to_string()))?;

    // Try password auth first
    match session.userauth_password(user, pass) {
        Ok(_) if session.authenticated() => return Ok(session),
        _ => {}
    }

    // Keyboard-interactive is what most IOS images offer
    let mut prompter = PasswordPrompt {
        password: pass.to_string(),
    };
    let _ = session.userauth_keyboard_interactive(user, &mut prompter);

    if session.authenticated() {
        Ok(session)
    } else {
        Err(ConnectError::Auth("all methods exhausted".to_string()))
    }
}

/// Interactive PTY shell on a device. All calls block.
struct SshShell {
    session: ssh2::Session,
    channel: ssh2::Channel,
    prompt: String,
    prompt_re: Regex,
    timeout: Duration,
}

impl SshShell {
    fn open(session: ssh2::Session, timeout: Duration) -> Result<Self, ConnectError> {
        let open_err = |e: ssh2::Error| ConnectError::Other(format!("Failed to open shell: {}", e));
        let mut channel = session.channel_session().map_err(open_err)?;
        channel
            .request_pty("vt100", None, Some((200, 24, 0, 0)))
            .map_err(open_err)?;
        channel.shell().map_err(open_err)?;

        // Short per-read timeout so the prompt deadline is checked regularly
        session.set_timeout(1000);

        let prompt_re = Regex::new(r"^[\w.\-@/:()]+[>#]\s*$")
            .map_err(|e| ConnectError::Other(e.to_string()))?;

        let mut shell = Self {
            session,
            channel,
            prompt: String::new(),
            prompt_re,
            timeout,
        };

        let no_prompt = |e: SessionError| ConnectError::Other(format!("No prompt after login: {}", e));
        shell.write_line("").map_err(no_prompt)?;
        shell.read_until_prompt().map_err(no_prompt)?;

        Ok(shell)
    }

    fn hostname(&self) -> &str {
        self.prompt.trim_end_matches(['>', '#'])
    }

    fn is_privileged(&self) -> bool {
        self.prompt.ends_with('#')
    }

    fn write_line(&mut self, line: &str) -> Result<(), SessionError> {
        self.channel.write_all(format!("{}\n", line).as_bytes())?;
        self.channel.flush()?;
        Ok(())
    }

    /// Read until the last line looks like a prompt (or `extra` matches), answering paging prompts
    fn read_until(&mut self, extra: Option<&str>) -> Result<String, SessionError> {
        let deadline = Instant::now() + self.timeout;
        let mut output = String::new();
        let mut buf = [0u8; 4096];

        loop {
            if Instant::now() > deadline {
                return Err(SessionError::PromptTimeout);
            }

            match self.channel.read(&mut buf) {
                Ok(0) => {
                    return Err(SessionError::Io(std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "channel closed by device",
                    )))
                }
                Ok(n) => output.push_str(&String::from_utf8_lossy(&buf[..n])),
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
                Err(e) => return Err(e.into()),
            }

            let raw_last = output.rsplit('\n').next().unwrap_or("");
            let last_line = raw_last.trim_end_matches('\r');

            if last_line.contains(MORE_PROMPT) {
                let cut = output.len() - raw_last.len();
                output.truncate(cut);
                self.channel.write_all(b" ")?;
                continue;
            }
            if let Some(extra) = extra {
                if last_line.trim_end().ends_with(extra) {
                    return Ok(output);
                }
            }
            if self.prompt_re.is_match(last_line.trim()) {
                self.prompt = last_line.trim().to_string();
                return Ok(output);
            }
        }
    }

    fn read_until_prompt(&mut self) -> Result<String, SessionError> {
        self.read_until(None)
    }

    /// Send a command and return its output without the echoed command and trailing prompt
    fn run(&mut self, command: &str) -> Result<String, SessionError> {
        self.write_line(command)?;
        let raw = self.read_until_prompt().map_err(|e| SessionError::Command {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

        Ok(command_body(&raw))
    }

    fn enable(&mut self, secret: &str) -> Result<(), SessionError> {
        if self.is_privileged() {
            return Ok(());
        }
        self.write_line("enable")?;
        let out = self.read_until(Some("assword:"))?;
        if out.trim_end().ends_with("assword:") {
            self.write_line(secret)?;
            self.read_until_prompt()?;
        }
        if self.is_privileged() {
            Ok(())
        } else {
            Err(SessionError::Enable("still not in privileged mode".to_string()))
        }
    }

    fn close(&mut self) {
        let _ = self.write_line("exit");
        let _ = self.channel.send_eof();
        let _ = self.channel.close();
        let _ = self.session.disconnect(None, "session finished", None);
    }
}

/// SshSession adapts the blocking shell to the async session trait
pub struct SshSession {
    shell: Arc<Mutex<SshShell>>,
    hostname: String,
    os_name: String,
}

impl SshSession {
    /// Run a closure against the shell on the blocking pool
    async fn with_shell<T, F>(&self, f: F) -> Result<T, SessionError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SshShell) -> Result<T, SessionError> + Send + 'static,
    {
        let shell = self.shell.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = shell
                .lock()
                .map_err(|_| SessionError::Task("shell lock poisoned".to_string()))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| SessionError::Task(e.to_string()))?
    }

    fn family(&self) -> Result<OsFamily, SessionError> {
        OsFamily::from_name(&self.os_name).ok_or_else(|| SessionError::Command {
            command: "terminal".to_string(),
            reason: format!("no terminal settings for OS '{}'", self.os_name),
        })
    }
}

#[async_trait]
impl DeviceSession for SshSession {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn os_name(&self) -> &str {
        &self.os_name
    }

    async fn begin_automation_mode(&mut self, enable_secret: &str) -> Result<(), SessionError> {
        let (begin, _) = automation_commands(self.family()?);
        let secret = enable_secret.to_string();
        self.with_shell(move |shell| {
            shell.enable(&secret)?;
            for cmd in begin {
                shell.run(cmd)?;
            }
            Ok(())
        })
        .await
    }

    async fn send_command(&mut self, command: &str) -> Result<String, SessionError> {
        let command = command.to_string();
        self.with_shell(move |shell| shell.run(&command)).await
    }

    async fn end_automation_mode(&mut self) -> Result<(), SessionError> {
        let (_, end) = automation_commands(self.family()?);
        self.with_shell(move |shell| {
            for cmd in end {
                shell.run(cmd)?;
            }
            Ok(())
        })
        .await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.with_shell(|shell| {
            shell.close();
            Ok(())
        })
        .await
    }
}
