//! Header set tests.

use inspector_client::{ConfigError, HeaderSet};

#[test]
fn names_are_case_insensitive_and_last_write_wins() {
    let mut headers = HeaderSet::new();
    headers.insert("Authorization", "Bearer one");
    headers.insert("X-Trace", "1");
    headers.insert("authorization", "Bearer two");

    assert_eq!(headers.len(), 2);
    assert_eq!(headers.get("AUTHORIZATION"), Some("Bearer two"));
    let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Authorization", "X-Trace"]);
}

#[test]
fn blank_names_are_skipped() {
    let headers: HeaderSet = [("", "ignored"), ("  ", "ignored"), ("X-Ok", "yes")]
        .into_iter()
        .collect();
    assert_eq!(headers.len(), 1);
    assert!(headers.validate().is_ok());
}

#[test]
fn command_line_pairs() {
    let mut headers = HeaderSet::new();
    headers.insert_pair("X-Api-Key: secret").unwrap();
    headers.insert_pair("X-Empty:").unwrap();
    assert_eq!(headers.get("x-api-key"), Some("secret"));
    assert_eq!(headers.get("x-empty"), Some(""));

    assert!(matches!(
        headers.insert_pair("no-colon"),
        Err(ConfigError::MalformedHeader(_))
    ));
    assert!(matches!(
        headers.insert_pair(": value"),
        Err(ConfigError::MalformedHeader(_))
    ));
}

#[test]
fn invalid_tokens_are_config_errors() {
    let bad_name = HeaderSet::new().with("Bad Header", "x");
    assert!(matches!(
        bad_name.validate(),
        Err(ConfigError::InvalidHeaderName(_))
    ));

    let bad_value = HeaderSet::new().with("X-Ok", "line\nbreak");
    assert!(matches!(
        bad_value.validate(),
        Err(ConfigError::InvalidHeaderValue(_))
    ));
}

#[test]
fn header_map_and_json_views() {
    let headers = HeaderSet::new().with("X-One", "1").with("X-Two", "2");
    let map = headers.to_header_map().unwrap();
    assert_eq!(map.get("x-one").unwrap(), "1");
    assert_eq!(headers.to_json()["X-Two"], "2");
}
