//! Line-oriented GTP transport and protocol client for a child engine.
//!
//! The protocol is synchronous request/response: one command line out, one
//! reply block back. A successful reply begins with `"= "` and is followed
//! by exactly one blank line; the terminator must always be consumed or
//! every subsequent exchange is desynchronized.
//!
//! Failure domains are split per the crate design: [`GtpTransport`] owns
//! the process and raw blocking line I/O, [`GtpClient`] owns reply parsing
//! and the command set. Neither decides what is fatal to the whole run.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::{info, warn};

use crate::constants::{GTP_SUCCESS, PROCESS_DIED};
use crate::error::{DriverError, Result};

/// Resolved path and arguments used to launch an engine process.
#[derive(Clone, Debug)]
pub struct EngineCommand {
    binary: PathBuf,
    args: Vec<String>,
}

impl EngineCommand {
    pub fn new(binary: impl Into<PathBuf>) -> EngineCommand {
        EngineCommand {
            binary: binary.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> EngineCommand {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> EngineCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Human-readable engine name, derived from the binary file stem.
    pub fn display_name(&self) -> String {
        self.binary
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.binary.display().to_string())
    }
}

/// Blocking line transport over a child process's standard streams.
pub struct GtpTransport {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

impl GtpTransport {
    /// Launch the engine with piped stdio. A missing or unlaunchable
    /// binary is [`DriverError::EngineNotFound`].
    pub fn spawn(command: &EngineCommand) -> Result<GtpTransport> {
        let mut child = Command::new(command.binary())
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(DriverError::EngineNotFound)?;
        let stdin = child.stdin.take().ok_or(DriverError::EngineCrashed)?;
        let stdout = child.stdout.take().ok_or(DriverError::EngineCrashed)?;
        Ok(GtpTransport {
            child,
            stdin,
            reader: BufReader::new(stdout),
        })
    }

    /// Write one command line and flush. Blocks until the engine has
    /// accepted the input.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Block until a full line is available. End of stream means the
    /// engine process died.
    pub fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let count = self.reader.read_line(&mut line)?;
        if count == 0 {
            return Err(DriverError::EngineCrashed);
        }
        Ok(line)
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Forcibly stop the engine process.
    pub fn terminate(&mut self) {
        if self.is_running() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }

    /// Block until the process has exited on its own.
    pub fn wait(&mut self) -> Result<()> {
        self.child.wait()?;
        Ok(())
    }

    /// OS process id of the engine.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

/// A transport abandoned on an error path must not orphan a running
/// engine; terminate no-ops when the process already exited after `quit`.
impl Drop for GtpTransport {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// GTP protocol client: command formatting, reply validation, version
/// negotiation.
pub struct GtpClient {
    transport: GtpTransport,
}

impl GtpClient {
    pub fn new(transport: GtpTransport) -> GtpClient {
        GtpClient { transport }
    }

    /// Consume the blank line terminating a reply block.
    pub fn eat_terminator(&mut self) -> Result<()> {
        self.transport.read_line().map(|_| ())
    }

    /// Send a command and report whether the reply carried the success
    /// marker. The terminator is consumed either way.
    pub fn send_command(&mut self, cmd: &str) -> bool {
        self.send_command_for_response(cmd).starts_with(GTP_SUCCESS)
    }

    /// Send a command and return the full reply line, marker included.
    /// Any read failure substitutes the [`PROCESS_DIED`] sentinel.
    pub fn send_command_for_response(&mut self, cmd: &str) -> String {
        if self.transport.write_line(cmd).is_err() {
            warn!("engine process died while sending {cmd:?}");
            return PROCESS_DIED.into();
        }
        let line = match self.transport.read_line() {
            Ok(line) => line,
            Err(_) => {
                warn!("engine process died while awaiting reply to {cmd:?}");
                return PROCESS_DIED.into();
            }
        };
        if !line.starts_with('=') {
            warn!("GTP: {}", line.trim_end());
        }
        if self.eat_terminator().is_err() {
            warn!("engine process died before the reply terminator");
        }
        line
    }

    /// Send a command and return the reply payload with the `"= "` marker
    /// and surrounding whitespace stripped.
    pub fn send_command_trimmed(&mut self, cmd: &str) -> String {
        let response = self.send_command_for_response(cmd);
        response.get(2..).unwrap_or("").trim().to_string()
    }

    /// Write a raw command line without reading the reply; pairs with
    /// [`Self::read_raw_line`] so bookkeeping can interleave with the
    /// engine's thinking time.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.transport.write_line(line)
    }

    /// Read one raw reply line.
    pub fn read_raw_line(&mut self) -> Result<String> {
        self.transport.read_line()
    }

    /// Negotiate the engine version. Leading `#` comment lines are echoed
    /// and skipped (engines may emit tuning diagnostics first). Returns
    /// the version text on success; too-old or unparsable versions come
    /// back as error values for the caller to treat as fatal.
    pub fn check_version(&mut self, min_version: (u32, u32, u32)) -> Result<String> {
        self.transport.write_line("version")?;
        let mut line = self.transport.read_line()?;
        while line.starts_with('#') {
            info!("{}", line.trim_end());
            line = self.transport.read_line()?;
        }
        // Expect at least "=, space, something".
        let trimmed = line.trim_end();
        if trimmed.len() < 3 || !trimmed.starts_with('=') {
            return Err(DriverError::ProtocolViolation(trimmed.to_string()));
        }
        let version = trimmed.get(2..).unwrap_or("").trim().to_string();
        let triple = parse_version_triple(&version)?;
        if version_delta(triple, min_version) < 0 {
            return Err(DriverError::VersionTooOld {
                seen: version,
                required: format!(
                    "{}.{}.{}",
                    min_version.0, min_version.1, min_version.2
                ),
            });
        }
        self.eat_terminator()?;
        Ok(version)
    }

    /// Disable the engine's clock so it never stops on time.
    pub fn set_infinite_time(&mut self) -> bool {
        self.send_command("time_settings 0 1 0")
    }

    /// Query a numeric reply. A parse failure is reported as a protocol
    /// error but yields 0.0, keeping the score pipeline best-effort.
    fn send_command_for_float(&mut self, cmd: &str) -> f32 {
        let text = self.send_command_trimmed(cmd);
        match text.parse::<f32>() {
            Ok(value) => value,
            Err(_) => {
                warn!("error in GTP response: {cmd} returned {text:?}");
                0.0
            }
        }
    }

    pub fn estimate_score_mean(&mut self) -> f32 {
        self.send_command_for_float("estimate_score_mean")
    }

    pub fn estimate_score_standard_deviation(&mut self) -> f32 {
        self.send_command_for_float("estimate_score_standard_deviation")
    }

    pub fn final_score(&mut self) -> String {
        self.send_command_trimmed("final_score")
    }

    pub fn is_running(&mut self) -> bool {
        self.transport.is_running()
    }

    pub fn terminate(&mut self) {
        self.transport.terminate()
    }

    /// Send `quit` and block until the process has fully exited.
    pub fn quit(&mut self) -> Result<()> {
        self.transport.write_line("quit")?;
        self.transport.wait()
    }
}

/// Parse a dotted version into (major, minor, patch); a missing patch
/// component defaults to 0.
pub fn parse_version_triple(version: &str) -> Result<(u32, u32, u32)> {
    let unparsable = || DriverError::VersionUnparsable(version.to_string());
    let mut parts = version.split('.');
    let major = parts
        .next()
        .and_then(|p| p.trim().parse().ok())
        .ok_or_else(unparsable)?;
    let minor = parts
        .next()
        .and_then(|p| p.trim().parse().ok())
        .ok_or_else(unparsable)?;
    let patch = match parts.next() {
        Some(p) => p.trim().parse().map_err(|_| unparsable())?,
        None => 0,
    };
    Ok((major, minor, patch))
}

/// Signed ordering between a seen version and a required minimum, weighted
/// major*10000 + minor*100 + patch. Negative means too old.
pub fn version_delta(seen: (u32, u32, u32), min: (u32, u32, u32)) -> i64 {
    (seen.0 as i64 - min.0 as i64) * 10000
        + (seen.1 as i64 - min.1 as i64) * 100
        + (seen.2 as i64 - min.2 as i64)
}
