//! Local hosts-file records for freshly created guests.
//!
//! When the director runs on the operator's machine (no director address was
//! configured), it reaches new guests by name. Each guest gets a
//! `<private-ip>  <fqdn>` line appended to the hosts file. Records are never
//! removed.

use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default hosts file.
pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// Loopback record written ahead of the first guest record.
pub const LOCALHOST_RECORD: &str = "127.0.0.1 localhost";

/// Format the hosts-file record for a guest.
pub fn format_record(ip: &str, fqdn: &str) -> String {
    format!("{}  {}", ip, fqdn)
}

/// Append-only handle on a hosts file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsFile {
    path: PathBuf,
}

impl Default for HostsFile {
    fn default() -> Self {
        Self::new(DEFAULT_HOSTS_PATH)
    }
}

impl HostsFile {
    /// Handle on the hosts file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the hosts file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record mapping `ip` to `fqdn`.
    ///
    /// The file is only ever appended to, never rewritten, so existing
    /// entries survive. [`LOCALHOST_RECORD`] is written ahead of the record
    /// only when no `127.0.0.1` line already names `localhost`; repeated
    /// calls add exactly one line each. Creates the file if missing.
    pub fn append_record(&self, ip: &str, fqdn: &str) -> Result<()> {
        self.try_append(ip, fqdn).map_err(|cause| Error::HostsFile {
            path: self.path.clone(),
            cause,
        })
    }

    fn try_append(&self, ip: &str, fqdn: &str) -> io::Result<()> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let mut buf = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            buf.push('\n');
        }
        if !has_localhost(&existing) {
            buf.push_str(LOCALHOST_RECORD);
            buf.push('\n');
        }
        let record = format_record(ip, fqdn);
        buf.push_str(&record);
        buf.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buf.as_bytes())?;

        tracing::info!(path = %self.path.display(), record = %record, "appended hosts record");
        Ok(())
    }
}

fn has_localhost(contents: &str) -> bool {
    contents.lines().any(|line| {
        let mut fields = line.split_whitespace();
        fields.next() == Some("127.0.0.1") && fields.any(|name| name == "localhost")
    })
}
