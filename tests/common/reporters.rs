//! Reporters that record or sabotage a run

use reduction_pipeline::pipeline::{Element, Reporter, StageId, Totals};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One call made on a reporter, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Sequence(Vec<Element>),
    TimerResolution(Duration),
    Totals(StageId, Totals),
    Elapsed(Duration),
}

/// Records every call from every clone into one shared log
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn totals(&self) -> Vec<Totals> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Totals(_, t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn sequence(&mut self, elements: &[Element]) {
        self.push(Event::Sequence(elements.to_vec()));
    }

    fn timer_resolution(&mut self, resolution: Duration) {
        self.push(Event::TimerResolution(resolution));
    }

    fn totals(&mut self, stage: StageId, totals: &Totals) {
        self.push(Event::Totals(stage, *totals));
    }

    fn elapsed(&mut self, elapsed: Duration) {
        self.push(Event::Elapsed(elapsed));
    }
}

/// Panics when asked to report totals, killing the sink thread
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingSinkReporter;

impl Reporter for PanickingSinkReporter {
    fn sequence(&mut self, _elements: &[Element]) {}

    fn timer_resolution(&mut self, _resolution: Duration) {}

    fn totals(&mut self, stage: StageId, _totals: &Totals) {
        panic!("{stage} lost its output");
    }

    fn elapsed(&mut self, _elapsed: Duration) {}
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietReporter;

impl Reporter for QuietReporter {
    fn sequence(&mut self, _elements: &[Element]) {}
    fn timer_resolution(&mut self, _resolution: Duration) {}
    fn totals(&mut self, _stage: StageId, _totals: &Totals) {}
    fn elapsed(&mut self, _elapsed: Duration) {}
}
