//! Directory traversal and pattern expansion
//!
//! [`Listing`] is a pull-based pre-order walk: a directory entry is yielded
//! before its children, and the children follow it contiguously. Nothing is
//! requested until the first call to `next`, and each directory costs one
//! `LISTSTATUS` exchange. The first error ends the walk.

use crate::client::WebHdfsClient;
use crate::error::{HdfsError, Result};
use crate::path;
use crate::status::FileStatus;
use glob::Pattern;

type Filter<'a> = Box<dyn FnMut(&FileStatus) -> bool + 'a>;

/// Lazy, optionally recursive directory listing
pub struct Listing<'a> {
    client: &'a mut WebHdfsClient,
    recurse: bool,
    filter: Option<Filter<'a>>,
    stack: Vec<std::vec::IntoIter<FileStatus>>,
    /// Directory to list before taking the next entry
    pending: Option<String>,
    done: bool,
}

impl<'a> Listing<'a> {
    pub(crate) fn new(
        client: &'a mut WebHdfsClient,
        path: &str,
        recurse: bool,
        filter: Option<Filter<'a>>,
    ) -> Self {
        Self {
            client,
            recurse,
            filter,
            stack: Vec::new(),
            pending: Some(path::normalize(path)),
            done: false,
        }
    }
}

impl Iterator for Listing<'_> {
    type Item = Result<FileStatus>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            if let Some(dir) = self.pending.take() {
                match self.client.list_dir(&dir) {
                    Ok(entries) => self.stack.push(entries.into_iter()),
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                }
            }

            let Some(level) = self.stack.last_mut() else {
                self.done = true;
                return None;
            };

            let Some(entry) = level.next() else {
                self.stack.pop();
                continue;
            };

            if let Some(filter) = self.filter.as_mut() {
                if !filter(&entry) {
                    continue;
                }
            }

            if self.recurse && entry.is_dir() {
                self.pending = Some(entry.full());
            }
            return Some(Ok(entry));
        }
    }
}

/// Expand `pattern` one path level at a time
///
/// Every level but the last keeps only matching directories as the
/// candidates for the next level. An empty result is an error, not an empty
/// vector. The root has no segments to match and expands to itself.
pub(crate) fn glob(client: &mut WebHdfsClient, pattern: &str) -> Result<Vec<FileStatus>> {
    let normalized = path::normalize(pattern);
    if normalized == "/" {
        return Ok(vec![client.stat("/")?]);
    }

    let segments: Vec<&str> = normalized[1..].split('/').collect();
    let mut candidates = vec!["/".to_string()];
    let mut matches = Vec::new();

    for (depth, segment) in segments.iter().enumerate() {
        let matcher = Pattern::new(segment).map_err(|e| {
            HdfsError::IllegalArgument(format!("'{}' is an invalid pattern: {}", segment, e))
        })?;
        let last = depth + 1 == segments.len();
        let mut next = Vec::new();

        for dir in &candidates {
            for entry in client.list_dir(dir)? {
                if !matcher.matches(entry.name()) {
                    continue;
                }
                if last {
                    matches.push(entry);
                } else if entry.is_dir() {
                    next.push(entry.full());
                }
            }
        }

        if next.is_empty() && !last {
            break;
        }
        candidates = next;
    }

    if matches.is_empty() {
        return Err(HdfsError::FileNotFound(format!(
            "{}: no matching file or directory",
            normalized
        )));
    }
    Ok(matches)
}
