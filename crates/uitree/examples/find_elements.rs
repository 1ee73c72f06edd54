//! Find elements example - drive a session against a JSON view dump
//!
//! Run with `RUST_LOG=debug` to watch routing and poll attempts.

use driver::{Driver, DriverConfig, Method, Request};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use uitree::UiTree;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let tree = UiTree::from_value(&json!({
        "root": { "kind": "Window", "children": [
            { "kind": "Label", "name": "foo", "text": "Inbox" },
            { "kind": "List", "children": [
                { "kind": "Cell", "name": "baz", "text": "Hello" },
                { "kind": "Cell", "name": "baz", "text": "Invoice" }
            ]}
        ]}
    }))?;

    let config = DriverConfig::from_json(r#"{ "default_implicit_wait_ms": 250 }"#)?;
    let driver = Driver::new(tree, config)?;

    let mut event_rx = driver.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            tracing::info!(?event, "Driver event");
        }
    });

    let requests = [
        Request::new(Method::Post, "/session"),
        Request::new(Method::Get, "/session/1"),
        Request::new(Method::Post, "/session/1/element")
            .with_body(json!({ "using": "name", "value": "foo" })),
        Request::new(Method::Post, "/session/1/elements")
            .with_body(json!({ "using": "name", "value": "baz" })),
        Request::new(Method::Post, "/session/1/element")
            .with_body(json!({ "using": "partial text", "value": "Invo" })),
        Request::new(Method::Post, "/session/1/element")
            .with_body(json!({ "using": "name", "value": "missing" })),
        Request::new(Method::Delete, "/session/1"),
    ];

    for request in requests {
        let line = format!("{} {}", request.method, request.path);
        let response = driver.handle(request).await;
        match &response.location {
            Some(location) => println!("{line} → {} {}", response.status, location),
            None => println!("{line} → {} {}", response.status, response.body),
        }
    }

    Ok(())
}
