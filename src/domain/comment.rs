use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Username attached to every comment the load generator posts.
pub const LOADTEST_USERNAME: &str = "test";

/// A single guestbook entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub username: String,
    pub message: String,
    pub time: DateTime<Utc>,
}

impl Comment {
    #[must_use]
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
            time: Utc::now(),
        }
    }

    /// Encode the comment as the JSON body sent to `POST /comment`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the comment cannot be encoded.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
