//! Guestbook data shared by the load generator and the service.
mod comment;
mod request;
mod run;

pub use comment::{Comment, LOADTEST_USERNAME};
pub use request::{ADD_COMMENT_PATH, LIST_COMMENTS_PATH, RequestKind, RequestReport};
pub use run::RunConfig;
