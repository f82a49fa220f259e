use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TraceEntry {
    /// Time since the log was created.
    pub elapsed: Duration,
    pub direction: Direction,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rx,
    Tx,
}

/// Bounded record of the frames exchanged with the adapter.
#[derive(Debug)]
pub struct TrafficLog {
    entries: VecDeque<TraceEntry>,
    max_entries: usize,
    started: Instant,
}

impl TrafficLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
            started: Instant::now(),
        }
    }

    pub fn push(&mut self, direction: Direction, data: &[u8]) {
        if self.max_entries == 0 {
            return;
        }
        self.entries.push_back(TraceEntry {
            elapsed: self.started.elapsed(),
            direction,
            data: data.to_vec(),
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_hex_text(&self, show_timestamp: bool) -> String {
        let mut result = String::new();
        for entry in &self.entries {
            if show_timestamp {
                let secs = entry.elapsed.as_secs();
                let millis = entry.elapsed.subsec_millis();
                result.push_str(&format!("[{secs:4}.{millis:03}] "));
            }
            result.push_str(match entry.direction {
                Direction::Rx => "RX:",
                Direction::Tx => "TX:",
            });
            for byte in &entry.data {
                result.push_str(&format!(" {byte:02X}"));
            }
            result.push('\n');
        }
        result
    }
}
