//! JSON payloads of successful responses

use serde::Deserialize;

/// File type as reported by the namenode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FileKind {
    #[serde(rename = "FILE", alias = "SYMLINK")]
    File,
    #[serde(rename = "DIRECTORY")]
    Directory,
}

/// One `FileStatus` object as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatusJson {
    #[serde(default)]
    pub path_suffix: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub group: String,
    /// Octal permission string, e.g. `"755"`
    #[serde(default)]
    pub permission: String,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub modification_time: i64,
    #[serde(default)]
    pub access_time: i64,
    #[serde(default)]
    pub replication: u32,
    #[serde(default)]
    pub block_size: u64,
    #[serde(default)]
    pub children_num: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct FileStatusEnvelope {
    #[serde(rename = "FileStatus")]
    pub file_status: FileStatusJson,
}

#[derive(Debug, Deserialize)]
pub struct FileStatusList {
    #[serde(rename = "FileStatus", default)]
    pub file_status: Vec<FileStatusJson>,
}

#[derive(Debug, Deserialize)]
pub struct FileStatusesEnvelope {
    #[serde(rename = "FileStatuses")]
    pub file_statuses: FileStatusList,
}

#[derive(Debug, Deserialize)]
pub struct BooleanEnvelope {
    pub boolean: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContentSummaryEnvelope {
    #[serde(rename = "ContentSummary")]
    pub content_summary: crate::status::ContentSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_status_payload() {
        let body = r#"{"FileStatus":{"accessTime":0,"blockSize":0,"group":"supergroup",
            "length":0,"modificationTime":1320173277227,"owner":"webuser",
            "pathSuffix":"","permission":"777","replication":0,"type":"DIRECTORY",
            "childrenNum":2}}"#;
        let envelope: FileStatusEnvelope = serde_json::from_str(body).unwrap();
        let status = envelope.file_status;
        assert_eq!(status.kind, FileKind::Directory);
        assert_eq!(status.permission, "777");
        assert_eq!(status.modification_time, 1320173277227);
        assert_eq!(status.children_num, Some(2));
        assert!(status.path_suffix.is_empty());
    }

    #[test]
    fn test_listing_payload() {
        let body = r#"{"FileStatuses":{"FileStatus":[
            {"pathSuffix":"a.txt","type":"FILE","length":24930,"owner":"u","group":"g",
             "permission":"644","modificationTime":1,"replication":3},
            {"pathSuffix":"link","type":"SYMLINK","length":0,"owner":"u","group":"g",
             "permission":"777","modificationTime":1,"replication":0}]}}"#;
        let envelope: FileStatusesEnvelope = serde_json::from_str(body).unwrap();
        let entries = envelope.file_statuses.file_status;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].length, 24930);
        assert_eq!(entries[1].kind, FileKind::File);
    }

    #[test]
    fn test_empty_listing() {
        let envelope: FileStatusesEnvelope =
            serde_json::from_str(r#"{"FileStatuses":{"FileStatus":[]}}"#).unwrap();
        assert!(envelope.file_statuses.file_status.is_empty());
    }

    #[test]
    fn test_boolean_payload() {
        let envelope: BooleanEnvelope = serde_json::from_str(r#"{"boolean": false}"#).unwrap();
        assert!(!envelope.boolean);
    }
}
