//! Call History
//!
//! Counts calls per method and keeps a bounded log of their inputs and
//! outputs so past activity can be replayed.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use serde::Serialize;

/// Longest input or output text kept per record, in bytes
pub const MAX_RECORD_TEXT: usize = 128;

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Default)]
struct MethodLog {
    calls: u64,
    records: VecDeque<CallRecord>,
}

/// Per-method call counters and input/output history.
#[derive(Debug)]
pub struct CallHistory {
    methods: Mutex<HashMap<String, MethodLog>>,
    /// Records kept per method; older ones are dropped
    limit: usize,
}

impl CallHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            methods: Mutex::new(HashMap::new()),
            limit,
        }
    }

    /// Counts one call to `method` and logs its input and output.
    ///
    /// Text longer than [`MAX_RECORD_TEXT`] bytes is cut and marked with `...`.
    pub fn record(&self, method: &str, input: impl Into<String>, output: impl Into<String>) {
        let mut methods = self.methods.lock();
        let log = methods.entry(method.to_string()).or_default();
        log.calls += 1;

        if self.limit == 0 {
            return;
        }
        if log.records.len() >= self.limit {
            log.records.pop_front();
        }
        log.records.push_back(CallRecord {
            input: truncate_text(input.into()),
            output: truncate_text(output.into()),
        });
    }

    /// Total calls ever made to `method`, including ones no longer retained.
    pub fn count(&self, method: &str) -> u64 {
        self.methods
            .lock()
            .get(method)
            .map(|log| log.calls)
            .unwrap_or(0)
    }

    /// Retained records, oldest first.
    pub fn records(&self, method: &str) -> Vec<CallRecord> {
        self.methods
            .lock()
            .get(method)
            .map(|log| log.records.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Human-readable replay of a method's history.
    ///
    /// ```text
    /// store was called 2 times:
    /// store(*foo) -> 3f2c...
    /// store(*bar) -> 91ab...
    /// ```
    pub fn replay(&self, method: &str) -> Vec<String> {
        let methods = self.methods.lock();
        let Some(log) = methods.get(method) else {
            return vec![format!("{} was called 0 times:", method)];
        };

        std::iter::once(format!("{} was called {} times:", method, log.calls))
            .chain(
                log.records
                    .iter()
                    .map(|r| format!("{}(*{}) -> {}", method, r.input, r.output)),
            )
            .collect()
    }
}

impl Default for CallHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

fn truncate_text(mut text: String) -> String {
    if text.len() <= MAX_RECORD_TEXT {
        return text;
    }
    let mut end = MAX_RECORD_TEXT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text.push_str("...");
    text
}
