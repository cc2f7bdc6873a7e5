use anyhow::{bail, Result};

use crate::logger;
use super::{DeviceChannel, DUMP_COMMAND};

const EMPTY_HIERARCHY: &str =
    "<?xml version='1.0' encoding='UTF-8' standalone='yes' ?><hierarchy rotation=\"0\"></hierarchy>";

/// Channel that talks to no device: logs and records every command and
/// answers dump requests with a fixed document.
pub struct StubChannel {
    dump: String,
    sent: Vec<String>,
    fail_at: Option<usize>,
}

impl StubChannel {
    pub fn new(dump: impl Into<String>) -> Self {
        Self { dump: dump.into(), sent: Vec::new(), fail_at: None }
    }

    pub fn empty() -> Self {
        Self::new(EMPTY_HIERARCHY)
    }

    /// Reject the command with this zero-based sequence number.
    pub fn failing_at(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    /// Every command received so far, dump requests included.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }
}

impl DeviceChannel for StubChannel {
    fn send_command(&mut self, command: &str) -> Result<String> {
        let seq = self.sent.len();
        logger::info_p("stub", &format!("shell({}) {}", seq, command));
        self.sent.push(command.to_string());

        if self.fail_at == Some(seq) {
            bail!("stub rejected command {}", seq);
        }
        if command == DUMP_COMMAND {
            return Ok(self.dump.clone());
        }
        Ok(String::new())
    }
}
