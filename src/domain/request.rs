use std::time::Duration;

/// Endpoint accepting a single JSON comment.
pub const ADD_COMMENT_PATH: &str = "comment";
/// Endpoint returning the most recent comments as a JSON array.
pub const LIST_COMMENTS_PATH: &str = "comments";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Get,
    Post,
}

impl RequestKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RequestKind::Get => "GET",
            RequestKind::Post => "POST",
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            RequestKind::Get => LIST_COMMENTS_PATH,
            RequestKind::Post => ADD_COMMENT_PATH,
        }
    }
}

/// Measurements of one successful logical request.
///
/// `latency` covers only the attempt that produced the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestReport {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub latency: Duration,
}
