/*!
 * Remote entry metadata
 *
 * [`FileStatus`] is built from one wire `FileStatus` object plus the path the
 * request was issued for. [`ContentSummary`] is the aggregate returned by a
 * usage query.
 */

use crate::error::{HdfsError, Result};
use crate::path;
use crate::protocol::wire::{FileKind, FileStatusJson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const S_ISUID: u16 = 0o4000;
const S_ISGID: u16 = 0o2000;
const S_ISVTX: u16 = 0o1000;

/// Metadata of one remote file or directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    parent: String,
    name: String,
    kind: FileKind,
    length: u64,
    replication: u32,
    owner: String,
    group: String,
    permission: u16,
    modified: DateTime<Utc>,
    children: Option<u64>,
}

impl FileStatus {
    /// Build a record from a wire object returned for `request_path`
    ///
    /// Entries describing the request path itself carry an empty suffix; the
    /// parent and name are then taken from `request_path`. The root is named
    /// `/` and is its own parent.
    pub fn from_wire(request_path: &str, wire: FileStatusJson) -> Result<Self> {
        let request_path = path::normalize(request_path);

        let (parent, name) = if !wire.path_suffix.is_empty() {
            (request_path, wire.path_suffix)
        } else if request_path == "/" {
            ("/".to_string(), "/".to_string())
        } else {
            path::split(&request_path)
        };

        let permission = if wire.permission.is_empty() {
            0
        } else {
            u16::from_str_radix(&wire.permission, 8).map_err(|_| {
                HdfsError::Protocol(format!(
                    "invalid permission '{}' for {}",
                    wire.permission, name
                ))
            })? & 0o7777
        };

        let modified = DateTime::<Utc>::from_timestamp_millis(wire.modification_time)
            .ok_or_else(|| {
                HdfsError::Protocol(format!(
                    "invalid modification time {} for {}",
                    wire.modification_time, name
                ))
            })?;

        Ok(Self {
            parent,
            name,
            kind: wire.kind,
            length: wire.length,
            replication: wire.replication,
            owner: wire.owner,
            group: wire.group,
            permission,
            modified,
            children: wire.children_num,
        })
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the entry
    pub fn full(&self) -> String {
        path::join(&self.parent, &self.name)
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Byte length; directories report 0
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Replication factor; meaningless for directories
    pub fn replication(&self) -> u32 {
        self.replication
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Permission bits including setuid, setgid and sticky
    pub fn permission(&self) -> u16 {
        self.permission
    }

    /// `ls -l` style mode string, e.g. `drwxr-xr-t`
    pub fn mode(&self) -> String {
        mode_string(self.is_dir(), self.permission)
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Child count, directories only
    pub fn children(&self) -> Option<u64> {
        self.children
    }

    /// Directory without children, or zero-length file
    pub fn is_empty(&self) -> bool {
        if self.is_dir() {
            self.children == Some(0)
        } else {
            self.length == 0
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}

/// Render permission bits the way `ls -l` does
pub fn mode_string(is_dir: bool, permission: u16) -> String {
    let mut mode = String::with_capacity(10);
    mode.push(if is_dir { 'd' } else { '-' });

    let classes = [
        (0o400, 0o200, 0o100, S_ISUID, 's', 'S'),
        (0o040, 0o020, 0o010, S_ISGID, 's', 'S'),
        (0o004, 0o002, 0o001, S_ISVTX, 't', 'T'),
    ];

    for (read, write, exec, special, with_exec, without_exec) in classes {
        mode.push(if permission & read != 0 { 'r' } else { '-' });
        mode.push(if permission & write != 0 { 'w' } else { '-' });
        mode.push(
            match (permission & exec != 0, permission & special != 0) {
                (true, true) => with_exec,
                (false, true) => without_exec,
                (true, false) => 'x',
                (false, false) => '-',
            },
        );
    }

    mode
}

/// Aggregate usage of a directory tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub directory_count: u64,
    pub file_count: u64,
    /// Logical bytes
    pub length: u64,
    /// Physical bytes, replication included
    pub space_consumed: u64,
    /// Name quota; -1 when unset
    pub quota: i64,
    /// Space quota; -1 when unset
    pub space_quota: i64,
}

/// Named field of a [`ContentSummary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryField {
    Dirs,
    Files,
    HdfsUsage,
    DiskUsage,
    HdfsQuota,
    DiskQuota,
}

impl SummaryField {
    pub const ALL: [SummaryField; 6] = [
        SummaryField::Dirs,
        SummaryField::Files,
        SummaryField::HdfsUsage,
        SummaryField::DiskUsage,
        SummaryField::HdfsQuota,
        SummaryField::DiskQuota,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SummaryField::Dirs => "dirs",
            SummaryField::Files => "files",
            SummaryField::HdfsUsage => "hdfs_usage",
            SummaryField::DiskUsage => "disk_usage",
            SummaryField::HdfsQuota => "hdfs_quota",
            SummaryField::DiskQuota => "disk_quota",
        }
    }

    /// Look up a field by name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| {
                HdfsError::IllegalArgument(format!("'{}' is an invalid summary attribute", name))
            })
    }
}

impl ContentSummary {
    pub fn get(&self, field: SummaryField) -> i64 {
        match field {
            SummaryField::Dirs => self.directory_count as i64,
            SummaryField::Files => self.file_count as i64,
            SummaryField::HdfsUsage => self.length as i64,
            SummaryField::DiskUsage => self.space_consumed as i64,
            SummaryField::HdfsQuota => self.quota,
            SummaryField::DiskQuota => self.space_quota,
        }
    }

    /// Logical total, or physical when `real`
    pub fn usage(&self, real: bool) -> u64 {
        if real {
            self.space_consumed
        } else {
            self.length
        }
    }
}
