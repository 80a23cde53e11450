use std::{fmt, path::PathBuf, process::Stdio};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::{io::AsyncReadExt, process::Command};
use tracing::debug;
use zbus::{zvariant::OwnedObjectPath, Connection, Proxy};

use crate::errors::CheckError;

const MIN_FIELDS: usize = 5;

/// One row of `systemctl list-units` output.
///
/// ```text
/// UNIT           LOAD   ACTIVE SUB        DESCRIPTION
/// foobar.service loaded active waiting    Description text
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UnitStateRecord {
    pub unit: String,
    pub load: String,
    pub active: String,
    pub sub: String,
    pub description: String,
}

impl fmt::Display for UnitStateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{:?} {:?} {:?} {:?} {:?}}}",
            self.unit, self.load, self.active, self.sub, self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineParseError {
    #[error("expected at least 5 fields in unit listing line, found {found}")]
    TooFewFields { found: usize },
}

pub fn parse_unit_state_line(line: &str) -> Result<UnitStateRecord, LineParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Err(LineParseError::TooFewFields {
            found: fields.len(),
        });
    }

    Ok(UnitStateRecord {
        unit: fields[0].to_string(),
        load: fields[1].to_string(),
        active: fields[2].to_string(),
        sub: fields[3].to_string(),
        description: fields[4..].join(" "),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitListing {
    pub records: Vec<UnitStateRecord>,
    /// Lines dropped because they did not parse, blank lines included.
    pub skipped_lines: usize,
}

pub fn parse_unit_listing(raw: &str) -> UnitListing {
    let mut listing = UnitListing::default();
    for line in raw.lines() {
        match parse_unit_state_line(line) {
            Ok(record) => listing.records.push(record),
            Err(_) => listing.skipped_lines += 1,
        }
    }
    listing
}

/// Produces the raw failed-unit listing consumed by the check.
#[async_trait]
pub trait UnitSource: Send + Sync {
    async fn failed_unit_listing(&self) -> Result<String, CheckError>;
}

#[derive(Debug, Default)]
pub struct SystemctlSource;

impl SystemctlSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnitSource for SystemctlSource {
    async fn failed_unit_listing(&self) -> Result<String, CheckError> {
        let output = Command::new("systemctl")
            .args(["--failed", "--no-legend", "--plain"])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| CheckError::source_unavailable(format!("failed to run systemctl: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CheckError::source_unavailable(format!(
                "systemctl exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        debug!(bytes = output.stdout.len(), "read systemctl output");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

type ListUnitRecord = (
    String,
    String,
    String,
    String,
    String,
    String,
    OwnedObjectPath,
    u32,
    String,
    OwnedObjectPath,
);

#[derive(Debug, Clone)]
struct RawUnit {
    name: String,
    description: String,
    load_state: String,
    active_state: String,
    sub_state: String,
}

#[derive(Debug, Default)]
pub struct DbusSystemdSource;

impl DbusSystemdSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnitSource for DbusSystemdSource {
    async fn failed_unit_listing(&self) -> Result<String, CheckError> {
        let connection = Connection::system().await.map_err(|err| {
            CheckError::source_unavailable(format!("failed to connect to system dbus: {err}"))
        })?;

        let proxy = Proxy::new(
            &connection,
            "org.freedesktop.systemd1",
            "/org/freedesktop/systemd1",
            "org.freedesktop.systemd1.Manager",
        )
        .await
        .map_err(|err| {
            CheckError::source_unavailable(format!("failed to create systemd dbus proxy: {err}"))
        })?;

        let rows: Vec<ListUnitRecord> = proxy.call("ListUnits", &()).await.map_err(|err| {
            CheckError::source_unavailable(format!("failed to list units from systemd: {err}"))
        })?;

        let raw_units = rows
            .into_iter()
            .map(
                |(
                    name,
                    description,
                    load_state,
                    active_state,
                    sub_state,
                    _following,
                    _unit_path,
                    _job_id,
                    _job_type,
                    _job_path,
                )| RawUnit {
                    name,
                    description,
                    load_state,
                    active_state,
                    sub_state,
                },
            )
            .collect();

        Ok(render_failed_units(raw_units))
    }
}

fn render_failed_units(raw_units: Vec<RawUnit>) -> String {
    let mut units: Vec<RawUnit> = raw_units
        .into_iter()
        .filter(|unit| unit.active_state == "failed")
        .collect();
    units.sort_by(|left, right| left.name.cmp(&right.name));

    units
        .into_iter()
        .map(|unit| {
            // systemd shows the unit name when no description is set
            let description = if unit.description.trim().is_empty() {
                unit.name.clone()
            } else {
                unit.description
            };
            format!(
                "{} {} {} {} {}\n",
                unit.name, unit.load_state, unit.active_state, unit.sub_state, description
            )
        })
        .collect()
}

/// Reads a previously captured listing; a path of `-` means stdin.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl UnitSource for FileSource {
    async fn failed_unit_listing(&self) -> Result<String, CheckError> {
        if self.path.as_os_str() == "-" {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .map_err(|err| {
                    CheckError::source_unavailable(format!("failed to read stdin: {err}"))
                })?;
            return Ok(buffer);
        }

        tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            CheckError::source_unavailable(format!(
                "failed to read {}: {err}",
                self.path.display()
            ))
        })
    }
}
