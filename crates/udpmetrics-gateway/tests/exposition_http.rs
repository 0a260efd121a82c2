//! `/metrics` and `/healthz` over a real listener.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use udpmetrics_gateway::{app_state::AppState, config, router};

async fn get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();
    let mut out = String::new();
    stream.read_to_string(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn metrics_endpoint_renders_store() {
    let cfg = config::load_from_str("version: 1\nmetrics_file: m.json\n").unwrap();
    let defs = config::load_definitions_from_str(
        r#"[{"type":"counter","name":"requests","help":"requests served"},
            {"type":"gauge","name":"queue","labels":["status"]}]"#,
    )
    .unwrap();
    let state = AppState::new(cfg, defs).unwrap();
    let receiver = state.receiver().unwrap();
    receiver.handle_datagram(br#"{"name":"utm_app_requests","command":"add","value":2}"#);
    receiver.handle_datagram(br#"{"name":"utm_app_queue","labels":["ok"],"command":"inc"}"#);
    receiver.handle_datagram(b"garbage");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router::build_router(state);
    tokio::spawn(async move { axum::serve(listener, app).await });

    let resp = get(addr, "/metrics").await;
    assert!(resp.starts_with("HTTP/1.1 200"), "{resp}");
    assert!(resp.contains("text/plain; version=0.0.4"));
    assert!(resp.contains("# HELP utm_app_requests requests served\n"));
    assert!(resp.contains("# TYPE utm_app_requests counter\nutm_app_requests 2\n"));
    assert!(resp.contains("utm_app_queue{status=\"ok\"} 1\n"));
    assert!(resp.contains("utm_app_receive_errors{error=\"json_unmarshal_error\"} 1\n"));
    assert!(resp.contains("utm_app_handled{metric=\"utm_app_queue\"} 1\n"));

    let resp = get(addr, "/healthz").await;
    assert!(resp.starts_with("HTTP/1.1 200"));
    assert!(resp.ends_with("ok"));
}
