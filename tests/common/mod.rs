//! Shared fixtures for integration tests
//!
//! A [`FakeNamenode`] answers metadata requests from an in-memory tree so
//! listing and glob tests can run without a cluster.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::BTreeMap;
use webhdfs::transport::{MockReply, MockTransport, RecordedRequest};
use webhdfs::{ClientConfig, EndpointSet, WebHdfsClient};

pub const NN1: &str = "http://nn1:50070";
pub const NN2: &str = "http://nn2:50070";
pub const NN3: &str = "http://nn3:50070";
pub const DATANODE: &str = "http://dn1:50075";

pub fn config() -> ClientConfig {
    ClientConfig {
        user: "tester".to_string(),
        ..Default::default()
    }
}

pub fn client(endpoints: &[&str], mock: &MockTransport) -> WebHdfsClient {
    client_with(config(), endpoints, mock)
}

pub fn client_with(config: ClientConfig, endpoints: &[&str], mock: &MockTransport) -> WebHdfsClient {
    let endpoints = EndpointSet::new(endpoints.iter().map(|e| e.to_string()).collect()).unwrap();
    WebHdfsClient::with_transport(&config, endpoints, Box::new(mock.clone()))
}

pub fn file_entry(name: &str, length: u64) -> Value {
    json!({
        "pathSuffix": name,
        "type": "FILE",
        "length": length,
        "owner": "tester",
        "group": "supergroup",
        "permission": "644",
        "modificationTime": 1_320_173_277_227u64,
        "accessTime": 1_320_173_277_227u64,
        "blockSize": 134_217_728u64,
        "replication": 3
    })
}

pub fn dir_entry(name: &str, children: u64) -> Value {
    json!({
        "pathSuffix": name,
        "type": "DIRECTORY",
        "length": 0,
        "owner": "tester",
        "group": "supergroup",
        "permission": "755",
        "modificationTime": 1_320_171_722_771u64,
        "replication": 0,
        "childrenNum": children
    })
}

/// `GETFILESTATUS` reply for a file of `length` bytes
pub fn stat_reply(length: u64) -> MockReply {
    MockReply::ok_json(json!({ "FileStatus": file_entry("", length) }))
}

pub fn listing_reply(entries: Vec<Value>) -> MockReply {
    MockReply::ok_json(json!({ "FileStatuses": { "FileStatus": entries } }))
}

pub fn not_found(path: &str) -> MockReply {
    MockReply::remote_exception(
        404,
        "FileNotFoundException",
        &format!("File does not exist: {}", path),
    )
}

/// In-memory namespace answering `LISTSTATUS` and `GETFILESTATUS`
#[derive(Debug, Clone, Default)]
pub struct FakeNamenode {
    dirs: BTreeMap<String, Vec<Value>>,
}

impl FakeNamenode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, path: &str, entries: Vec<Value>) -> Self {
        self.dirs.insert(path.to_string(), entries);
        self
    }

    pub fn reply(&self, request: &RecordedRequest) -> MockReply {
        let path = request.path().unwrap_or_default();
        match request.op() {
            Some("LISTSTATUS") => match self.dirs.get(&path) {
                Some(entries) => listing_reply(entries.clone()),
                None => not_found(&path),
            },
            Some("GETFILESTATUS") => match self.lookup(&path) {
                Some(mut entry) => {
                    entry["pathSuffix"] = json!("");
                    MockReply::ok_json(json!({ "FileStatus": entry }))
                }
                None => not_found(&path),
            },
            other => MockReply::remote_exception(
                400,
                "UnsupportedOperationException",
                &format!("{:?} is not supported", other),
            ),
        }
    }

    fn lookup(&self, path: &str) -> Option<Value> {
        if path == "/" {
            return Some(dir_entry("", self.dirs.get("/").map_or(0, |d| d.len() as u64)));
        }
        let (parent, name) = webhdfs::path::split(path);
        self.dirs
            .get(&parent)?
            .iter()
            .find(|entry| entry["pathSuffix"] == name.as_str())
            .cloned()
    }

    /// Transport serving this namespace
    pub fn transport(self) -> MockTransport {
        MockTransport::with_handler(move |request| self.reply(request))
    }
}

/// Full paths of a listing, panicking on the first error
pub fn full_paths<I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = webhdfs::Result<webhdfs::FileStatus>>,
{
    entries
        .into_iter()
        .map(|entry| entry.unwrap().full())
        .collect()
}
