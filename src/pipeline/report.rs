//! Console output of the source and sink stages.
//!
//! Output goes through the `Reporter` trait so runs can be observed in tests
//! without capturing stdout. `ConsoleReporter` is the only production
//! implementation.

use crate::pipeline::id::StageId;
use crate::pipeline::message::Element;
use crate::pipeline::stage::Totals;
use std::time::Duration;

/// Receives the user-visible results of a run.
#[cfg_attr(test, mockall::automock)]
pub trait Reporter: Send {
    /// The generated input sequence (source).
    fn sequence(&mut self, elements: &[Element]);

    /// Resolution of the clock used for timing (source).
    fn timer_resolution(&mut self, resolution: Duration);

    /// Final aggregates (sink), emitted before the acknowledgment is sent.
    fn totals(&mut self, stage: StageId, totals: &Totals);

    /// Wall-clock time from the first send to the acknowledgment (source).
    fn elapsed(&mut self, elapsed: Duration);
}

/// Prints results to stdout, one fact per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn sequence(&mut self, elements: &[Element]) {
        for line in format_sequence(elements) {
            println!("{line}");
        }
    }

    fn timer_resolution(&mut self, resolution: Duration) {
        println!("Timer resolution (seconds): {}", format_seconds(resolution));
    }

    fn totals(&mut self, _stage: StageId, totals: &Totals) {
        for line in format_totals(totals) {
            println!("{line}");
        }
    }

    fn elapsed(&mut self, elapsed: Duration) {
        println!("Elapsed (seconds): {}", format_seconds(elapsed));
    }
}

pub fn format_sequence(elements: &[Element]) -> Vec<String> {
    elements
        .iter()
        .enumerate()
        .map(|(i, v)| format!("element[{i}] = {v}"))
        .collect()
}

pub fn format_totals(totals: &Totals) -> [String; 3] {
    [
        format!("Sum = {}", totals.sum),
        format!("Negated sum = {}", totals.negated_sum),
        format!("Product = {}", totals.product),
    ]
}

/// Seconds with nanosecond precision.
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.9}", duration.as_secs_f64())
}
