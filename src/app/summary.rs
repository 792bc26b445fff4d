use std::time::Duration;

use crate::metrics::RunSummary;

/// Text summary, one line per entry.
#[must_use]
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::with_capacity(12);
    lines.push(format!("Elapsed Time: {:?}", summary.elapsed));
    lines.push(format!("Total Bytes Sent: {}", summary.bytes_sent));
    lines.push(format!("Total Bytes Received: {}", summary.bytes_received));
    lines.push(format!(
        "Successful GET Requests: {}",
        summary.successful_get
    ));
    lines.push(format!(
        "Successful POST Requests: {}",
        summary.successful_post
    ));
    lines.push(format!("Total Errors: {}", summary.errors));
    for (percentile, latency) in summary.percentiles.entries() {
        lines.push(format!(
            "{} Percentile Latency: {}",
            ordinal(percentile),
            format_latency(latency)
        ));
    }
    lines.push(format!(
        "Requests per Second: {}",
        summary.requests_per_second()
    ));
    if summary.interrupted {
        let completed = summary.successes().saturating_add(summary.errors);
        lines.push(format!(
            "Interrupted: {} of {} requests completed",
            completed, summary.total_requests
        ));
    }
    lines
}

pub fn print_summary(summary: &RunSummary) {
    for line in summary_lines(summary) {
        println!("{}", line);
    }
}

fn format_latency(latency: Option<Duration>) -> String {
    latency.map_or_else(|| "no data".to_owned(), |value| format!("{:?}", value))
}

/// English ordinal for a percentile: `1st`, `2nd`, `50th`, `99th`.
#[must_use]
pub fn ordinal(value: u8) -> String {
    let suffix = match (value % 10, value % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", value, suffix)
}
