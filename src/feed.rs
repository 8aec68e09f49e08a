use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::models::FlowEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Flow(FlowEvent),
    Malformed { line_number: usize, error: String },
    System(String),
    Finished,
}

/// Reads a JSON-Lines flow-event feed on a background thread and hands the
/// decoded events to the UI loop over a channel. A malformed line is
/// reported and skipped; it never ends the feed.
pub struct FeedAdapter {
    event_tx: Sender<FeedEvent>,
    event_rx: Receiver<FeedEvent>,
}

impl FeedAdapter {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self { event_tx, event_rx }
    }

    pub fn start_file(&self, path: PathBuf) {
        let tx = self.event_tx.clone();
        thread::spawn(move || match File::open(&path) {
            Ok(file) => read_feed(BufReader::new(file), &tx),
            Err(err) => {
                let _ = tx.send(FeedEvent::System(format!(
                    "Failed to open feed file '{}': {err}",
                    path.display()
                )));
                let _ = tx.send(FeedEvent::Finished);
            }
        });
    }

    pub fn start_stdin(&self) {
        let tx = self.event_tx.clone();
        thread::spawn(move || read_feed(BufReader::new(io::stdin()), &tx));
    }

    pub fn drain_events_limited(&self, max_events: usize) -> Vec<FeedEvent> {
        let mut events = Vec::new();
        if max_events == 0 {
            return events;
        }
        while events.len() < max_events {
            let Ok(event) = self.event_rx.try_recv() else {
                break;
            };
            events.push(event);
        }
        events
    }

    #[cfg(test)]
    pub fn drain_events(&self) -> Vec<FeedEvent> {
        self.drain_events_limited(usize::MAX)
    }

    #[cfg(test)]
    fn start_reader<R: io::Read + Send + 'static>(&self, reader: R) {
        let tx = self.event_tx.clone();
        thread::spawn(move || read_feed(BufReader::new(reader), &tx));
    }
}

impl Default for FeedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn read_feed<R: BufRead>(reader: R, tx: &Sender<FeedEvent>) {
    for (index, line) in reader.lines().map_while(Result::ok).enumerate() {
        let line_number = index + 1;
        match parse_feed_line(&line) {
            None => {}
            Some(Ok(event)) => {
                let _ = tx.send(FeedEvent::Flow(event));
            }
            Some(Err(err)) => {
                tracing::warn!(line_number, %err, "skipping malformed feed line");
                let _ = tx.send(FeedEvent::Malformed {
                    line_number,
                    error: err.to_string(),
                });
            }
        }
    }
    let _ = tx.send(FeedEvent::Finished);
}

/// Decodes one feed line. Blank lines yield `None`.
pub fn parse_feed_line(line: &str) -> Option<Result<FlowEvent, serde_json::Error>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(serde_json::from_str(trimmed))
}

/// Synchronous replay of a whole feed, for headless mode. Malformed lines
/// are skipped with a warning, matching the streaming adapter.
pub fn replay<R: BufRead>(reader: R) -> io::Result<Vec<FlowEvent>> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_feed_line(&line) {
            None => {}
            Some(Ok(event)) => events.push(event),
            Some(Err(err)) => {
                tracing::warn!(line_number = index + 1, %err, "skipping malformed feed line");
            }
        }
    }
    Ok(events)
}

#[cfg(test)]
#[path = "../tests/unit/feed_tests.rs"]
mod tests;
