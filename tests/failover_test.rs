/*!
 * Integration tests for namenode fail-over and endpoint rotation
 */

mod common;

use common::{client, listing_reply, NN1, NN2, NN3};
use serde_json::json;
use webhdfs::transport::{MockReply, MockTransport};
use webhdfs::{HdfsError, Operation};

#[test]
fn test_two_standby_then_active() {
    let mock = MockTransport::new();
    mock.push(MockReply::standby())
        .push(MockReply::standby())
        .push(MockReply::boolean(true));
    let mut client = client(&[NN1, NN2, NN3], &mock);

    assert!(client.mkdir("/data").unwrap());

    let origins: Vec<String> = mock.requests().iter().map(|r| r.origin()).collect();
    assert_eq!(origins, vec![NN1, NN2, NN3]);
    assert_eq!(client.endpoints().as_slice(), [NN3, NN1, NN2]);
    assert_eq!(client.calls(), 3);
}

#[test]
fn test_next_call_starts_at_last_active() {
    let mock = MockTransport::new();
    mock.push(MockReply::standby())
        .push(MockReply::standby())
        .push(MockReply::boolean(true))
        .push(MockReply::boolean(true));
    let mut client = client(&[NN1, NN2, NN3], &mock);

    client.mkdir("/a").unwrap();
    client.mkdir("/b").unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].origin(), NN3);
}

#[test]
fn test_every_endpoint_times_out() {
    let mock = MockTransport::new();
    mock.push(MockReply::Timeout)
        .push(MockReply::Timeout)
        .push(MockReply::Timeout);
    let mut client = client(&[NN1, NN2, NN3], &mock);

    match client.stat("/x") {
        Err(HdfsError::Connection(message)) => {
            assert_eq!(message, "cannot connect to any webhdfs endpoint")
        }
        other => panic!("expected connection error, got {:?}", other),
    }
    assert_eq!(mock.requests().len(), 3);
    assert_eq!(client.calls(), 0);
    // The last endpoint tried becomes the head
    assert_eq!(client.endpoints().head(), NN3);
}

#[test]
fn test_every_endpoint_standby() {
    let mock = MockTransport::new();
    mock.push(MockReply::standby()).push(MockReply::standby());
    let mut client = client(&[NN1, NN2], &mock);

    assert!(matches!(client.delete("/x"), Err(HdfsError::Connection(_))));
}

#[test]
fn test_refused_then_active() {
    let mock = MockTransport::new();
    mock.push(MockReply::Refused)
        .push(listing_reply(vec![common::file_entry("f", 1)]));
    let mut client = client(&[NN1, NN2], &mock);

    let entries: Vec<_> = client.ls("/", false).collect::<Result<_, _>>().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(client.endpoints().head(), NN2);
}

#[test]
fn test_classified_error_stops_fail_over() {
    let mock = MockTransport::new();
    mock.push(MockReply::Refused).push(common::not_found("/missing"));
    let mut client = client(&[NN1, NN2, NN3], &mock);

    match client.stat("/missing") {
        Err(HdfsError::FileNotFound(message)) => {
            assert_eq!(message, "File does not exist: /missing")
        }
        other => panic!("expected not found, got {:?}", other),
    }
    assert_eq!(mock.requests().len(), 2);
    assert_eq!(client.endpoints().as_slice(), [NN2, NN3, NN1]);
}

#[test]
fn test_unparseable_error_body() {
    let mock = MockTransport::new();
    mock.push(MockReply::Response {
        status: 500,
        headers: vec![("Content-Type".to_string(), "text/html".to_string())],
        body: b"<html><body>oops</body></html>".to_vec(),
    });
    let mut client = client(&[NN1, NN2], &mock);

    match client.mkdir("/x") {
        Err(HdfsError::UnknownRemote(message)) => {
            assert_eq!(message, "Internal Server Error: /x")
        }
        other => panic!("expected unknown remote error, got {:?}", other),
    }
    assert_eq!(mock.requests().len(), 1);
}

#[test]
fn test_rotation_survives_across_operations() {
    let mock = MockTransport::with_handler(|request| {
        if request.origin() == NN2 {
            MockReply::boolean(true)
        } else {
            MockReply::standby()
        }
    });
    let mut client = client(&[NN1, NN2, NN3], &mock);

    for _ in 0..3 {
        assert!(client.mkdir("/x").unwrap());
    }

    // Only the first operation has to skip past the standby
    assert_eq!(mock.requests().len(), 4);
    assert_eq!(client.calls(), 4);
    assert_eq!(client.endpoints().head(), NN2);
}

#[test]
fn test_invoke_runs_any_operation_through_failover() {
    let mock = MockTransport::new();
    mock.push(MockReply::standby())
        .push(MockReply::standby())
        .push(MockReply::ok_json(json!({"boolean": true})));
    let mut client = client(&[NN1, NN2, NN3], &mock);

    let params = [("destination", "/archive/2024".to_string())];
    let mut response = client
        .invoke(Operation::Rename, "/staging/./2024/", &params)
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.read_body().unwrap(), br#"{"boolean":true}"#);
    assert_eq!(client.endpoints().as_slice(), [NN3, NN1, NN2]);
    assert_eq!(client.calls(), 3);

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(request.op(), Some("RENAME"));
        assert_eq!(request.path().as_deref(), Some("/staging/2024"));
        assert_eq!(request.param("user.name"), Some("tester"));
        assert_eq!(request.param("destination"), Some("/archive/2024"));
    }
}

#[test]
fn test_invoke_create_returns_redirect() {
    let mock = MockTransport::new();
    mock.push(MockReply::redirect("http://dn1:50075/webhdfs/v1/f?op=CREATE"));
    let mut client = client(&[NN1], &mock);

    let response = client.invoke(Operation::Create, "/f", &[]).unwrap();
    assert_eq!(response.status, 307);
    assert_eq!(
        response.header("location"),
        Some("http://dn1:50075/webhdfs/v1/f?op=CREATE")
    );
    assert!(!mock.requests()[0].follow_redirects);
}
