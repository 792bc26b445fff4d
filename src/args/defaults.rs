pub(crate) const DEFAULT_USER_AGENT: &str = concat!("gbload/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
