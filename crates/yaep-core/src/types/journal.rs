//! Per-grammar diagnostics.
//!
//! A creation timestamp and a small ordered log of named events. When
//! `debug_level == 0` the journal never allocates a log entry or evaluates
//! its detail closure, so diagnostics are zero-cost for callers who don't
//! ask for them.

use std::time::Instant;

#[derive(Clone, Debug)]
pub struct JournalEntry {
  pub label: &'static str,
  pub elapsed: std::time::Duration,
  pub detail: String,
}

#[derive(Debug)]
pub struct Journal {
  debug_level: u32,
  created: Instant,
  entries: Vec<JournalEntry>,
}

impl Journal {
  pub fn new(debug_level: u32) -> Self {
    Self { debug_level, created: Instant::now(), entries: Vec::new() }
  }

  pub fn debug_level(&self) -> u32 {
    self.debug_level
  }

  /// Records `detail` under `label` if `debug_level > 0`. No-op otherwise.
  pub fn record(&mut self, label: &'static str, detail: impl FnOnce() -> String) {
    if self.debug_level > 0 {
      self.entries.push(JournalEntry { label, elapsed: self.created.elapsed(), detail: detail() });
    }
  }

  pub fn entries(&self) -> &[JournalEntry] {
    &self.entries
  }

  /// Renders the accumulated log, one line per entry. Intended for a
  /// caller-driven `eprintln!`, never printed internally.
  pub fn render(&self) -> String {
    self.entries.iter().map(|e| format!("[{:>8.3?}] {}: {}", e.elapsed, e.label, e.detail)).collect::<Vec<_>>().join("\n")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_debug_level_records_nothing() {
    let mut j = Journal::new(0);
    j.record("phase", || panic!("must not be called at debug_level 0"));
    assert!(j.entries().is_empty());
  }

  #[test]
  fn nonzero_debug_level_records() {
    let mut j = Journal::new(1);
    j.record("phase", || "did a thing".to_string());
    assert_eq!(j.entries().len(), 1);
    assert_eq!(j.entries()[0].detail, "did a thing");
  }
}
