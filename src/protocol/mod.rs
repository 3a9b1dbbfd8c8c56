/*!
 * WebHDFS wire protocol
 *
 * Requests go to `<base>/webhdfs/v1/<url-encoded path>` with the operation
 * name in the `op` query parameter and the acting user in `user.name`.
 * Responses are JSON envelopes keyed by operation:
 * - `FileStatus` and `FileStatuses.FileStatus[]` for stat and listing
 * - `boolean` for most mutations
 * - `ContentSummary` for usage queries
 * - empty bodies for owner/permission/time updates
 *
 * Errors come back as a `RemoteException` envelope; see [`remote`].
 */

pub mod remote;
pub mod wire;

use crate::error::{HdfsError, Result};
use crate::transport::Method;
use url::Url;

/// Path prefix under which the REST API is served
pub const PROTOCOL_ROOT: &str = "webhdfs";

/// API version segment
pub const PROTOCOL_VERSION: &str = "v1";

/// Operations issued by the client (`op=` query parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetFileStatus,
    ListStatus,
    GetContentSummary,
    Mkdirs,
    Rename,
    Delete,
    SetReplication,
    SetOwner,
    SetPermission,
    SetTimes,
    Open,
    Create,
}

impl Operation {
    /// Protocol name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GetFileStatus => "GETFILESTATUS",
            Operation::ListStatus => "LISTSTATUS",
            Operation::GetContentSummary => "GETCONTENTSUMMARY",
            Operation::Mkdirs => "MKDIRS",
            Operation::Rename => "RENAME",
            Operation::Delete => "DELETE",
            Operation::SetReplication => "SETREPLICATION",
            Operation::SetOwner => "SETOWNER",
            Operation::SetPermission => "SETPERMISSION",
            Operation::SetTimes => "SETTIMES",
            Operation::Open => "OPEN",
            Operation::Create => "CREATE",
        }
    }

    /// HTTP verb the protocol assigns to the operation
    pub fn method(&self) -> Method {
        match self {
            Operation::GetFileStatus
            | Operation::ListStatus
            | Operation::GetContentSummary
            | Operation::Open => Method::Get,
            Operation::Delete => Method::Delete,
            Operation::Mkdirs
            | Operation::Rename
            | Operation::SetReplication
            | Operation::SetOwner
            | Operation::SetPermission
            | Operation::SetTimes
            | Operation::Create => Method::Put,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the request URL for `path` on endpoint `base`
///
/// `path` must already be normalized. Each path segment is percent-encoded;
/// the root maps to `<base>/webhdfs/v1/`.
pub fn request_url(base: &str, path: &str) -> Result<String> {
    let mut url = Url::parse(base)
        .map_err(|e| HdfsError::Config(format!("Invalid endpoint URL '{}': {}", base, e)))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| HdfsError::Config(format!("Endpoint URL cannot be a base: {}", base)))?;
        segments
            .pop_if_empty()
            .push(PROTOCOL_ROOT)
            .push(PROTOCOL_VERSION)
            .extend(path.trim_start_matches('/').split('/'));
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::ListStatus.as_str(), "LISTSTATUS");
        assert_eq!(Operation::GetContentSummary.to_string(), "GETCONTENTSUMMARY");
    }

    #[test]
    fn test_operation_methods() {
        assert_eq!(Operation::Open.method(), Method::Get);
        assert_eq!(Operation::Create.method(), Method::Put);
        assert_eq!(Operation::Delete.method(), Method::Delete);
        assert_eq!(Operation::SetTimes.method(), Method::Put);
    }

    #[test]
    fn test_request_url() {
        assert_eq!(
            request_url("http://nn1:50070", "/user/hdfs/data.csv").unwrap(),
            "http://nn1:50070/webhdfs/v1/user/hdfs/data.csv"
        );
    }

    #[test]
    fn test_request_url_root() {
        assert_eq!(
            request_url("http://nn1:50070", "/").unwrap(),
            "http://nn1:50070/webhdfs/v1/"
        );
    }

    #[test]
    fn test_request_url_encodes_segments() {
        assert_eq!(
            request_url("http://nn1:50070/", "/dir with space/a#b").unwrap(),
            "http://nn1:50070/webhdfs/v1/dir%20with%20space/a%23b"
        );
    }

    #[test]
    fn test_request_url_invalid_base() {
        assert!(matches!(
            request_url("nn1:50070", "/"),
            Err(HdfsError::Config(_))
        ));
    }
}
