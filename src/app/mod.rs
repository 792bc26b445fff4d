//! Load-test orchestration: spawning workers, joining their results, and
//! reporting the summary.
mod export;
mod runner;
mod summary;


pub use export::{export_json, summary_json};
pub use runner::{run_load_test, run_with_transport, worker_rng};
pub use summary::{ordinal, print_summary, summary_lines};
