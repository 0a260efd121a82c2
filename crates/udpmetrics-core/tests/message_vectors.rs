//! Inbound datagram vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]


use udpmetrics_core::protocol::message::{decode, Command, MAX_DATAGRAM_BYTES};

#[test]
fn message_vectors() {
    for v in vector_loader::load("messages.json") {
        let res = decode(v.input.as_bytes());
        match (&v.expect, &v.expect_error) {
            (Some(expect), None) => {
                let msg = res.unwrap_or_else(|e| panic!("{}: unexpected error {e}", v.description));
                assert_eq!(msg.name, expect["name"].as_str().unwrap(), "{}", v.description);
                let labels: Vec<String> = expect["labels"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|l| l.as_str().unwrap().to_string())
                    .collect();
                assert_eq!(msg.labels, labels, "{}", v.description);
                assert_eq!(msg.command, expect["command"].as_str().unwrap(), "{}", v.description);
                assert_eq!(msg.value, expect["value"].as_f64().unwrap(), "{}", v.description);
            }
            (None, Some(err)) => {
                let e = res.expect_err(&v.description);
                assert_eq!(e.code(), err.code, "{}", v.description);
            }
            _ => panic!("{}: vector must set exactly one of expect/expect_error", v.description),
        }
    }
}

#[test]
fn commands_resolve_from_wire_spelling() {
    let inc = decode(br#"{"name":"a","command":"inc","value":42}"#).unwrap();
    assert_eq!(inc.command().unwrap(), Command::Increment);
    let add = decode(br#"{"name":"a","command":"add","value":1.5}"#).unwrap();
    assert_eq!(add.command().unwrap(), Command::Add);
    assert_eq!(add.value, 1.5);
    let empty = decode(br#"{"name":"a"}"#).unwrap();
    assert!(empty.command().is_err());
}

#[test]
fn datagram_limit_matches_receiver_buffer() {
    assert_eq!(MAX_DATAGRAM_BYTES, 2048);
}
