//! Protocol Types
//!
//! HTTP-shaped request/response values. Transport parsing happens elsewhere;
//! by the time a request gets here it is already method + path + JSON body.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::DriverError;

/// Session ID - monotonically increasing, never reused
pub type SessionId = u64;

/// Element ID - monotonically increasing within one session
pub type ElementId = u64;

/// JSON wire protocol status codes
pub mod status {
    pub const SUCCESS: u32 = 0;
    pub const NO_SUCH_ELEMENT: u32 = 7;
    pub const UNKNOWN_COMMAND: u32 = 9;
    pub const STALE_ELEMENT_REFERENCE: u32 = 10;
    pub const UNKNOWN_ERROR: u32 = 13;
    pub const INVALID_SELECTOR: u32 = 32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            other => Err(DriverError::InvalidArgument(format!(
                "unknown HTTP method {other}"
            ))),
        }
    }
}

/// Inbound request, already demultiplexed by the transport
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Value::Null,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Non-empty path segments, in order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// Session id named by the path, if it has the `/session/{id}` shape
    pub fn session_id(&self) -> Option<SessionId> {
        let mut segments = self.segments();
        match (segments.next(), segments.next()) {
            (Some("session"), Some(id)) => id.parse().ok(),
            _ => None,
        }
    }
}

/// A request as seen by the node it was routed to
#[derive(Debug, Clone, Copy)]
pub struct Command<'a> {
    pub method: Method,
    pub path: &'a str,
    pub body: &'a Value,
}

impl<'a> Command<'a> {
    pub fn new(request: &'a Request) -> Self {
        Self {
            method: request.method,
            path: &request.path,
            body: &request.body,
        }
    }
}

/// What a node produces on success
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(Value),
    Redirect(String),
    Empty,
}

/// `{"ELEMENT": id}` as handed back to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "ELEMENT")]
    pub element: ElementId,
}

impl ElementRef {
    pub fn new(element: ElementId) -> Self {
        Self { element }
    }
}

/// Outbound response in the JSON wire protocol envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub location: Option<String>,
    pub body: Value,
}

impl Response {
    pub fn from_reply(session_id: Option<SessionId>, reply: Reply) -> Self {
        match reply {
            Reply::Redirect(location) => Self {
                status: 303,
                location: Some(location),
                body: Value::Null,
            },
            Reply::Value(value) => Self::envelope(200, session_id, status::SUCCESS, value),
            Reply::Empty => Self::envelope(200, session_id, status::SUCCESS, Value::Null),
        }
    }

    pub fn from_error(session_id: Option<SessionId>, err: &DriverError) -> Self {
        Self::envelope(
            err.http_status(),
            session_id,
            err.wire_status(),
            json!({ "message": err.to_string(), "kind": err.kind() }),
        )
    }

    fn envelope(http: u16, session_id: Option<SessionId>, code: u32, value: Value) -> Self {
        Self {
            status: http,
            location: None,
            body: json!({
                "sessionId": session_id,
                "status": code,
                "value": value,
            }),
        }
    }

    /// The `value` member of the envelope
    pub fn value(&self) -> &Value {
        &self.body["value"]
    }

    /// The wire status code of the envelope, if there is one
    pub fn wire_status(&self) -> Option<u64> {
        self.body["status"].as_u64()
    }
}
