//! Parse-time configuration surface.
//!
//! A `Default` baseline, a `new()` convenience constructor, and chainable
//! `with_*` setters that clamp out-of-range inputs rather than trusting the
//! caller to pre-clamp.

/// Lookahead mode used by the Earley driver's predict/complete filtering.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LookaheadLevel {
  /// No filtering, no contexts; every situation carries [ContextId::ANY](crate::types::ContextId::ANY).
  #[default]
  None,
  /// Contexts are precomputed from FIRST/FOLLOW at analysis time.
  Static,
  /// Contexts are narrowed per parse position from the actual next token(s).
  Dynamic,
}

impl LookaheadLevel {
  /// Clamps an arbitrary signed level: negative values clamp to `None`,
  /// values `>= 2` clamp to `Dynamic`.
  pub fn clamp(level: i32) -> Self {
    match level {
      i32::MIN..=0 => LookaheadLevel::None,
      1 => LookaheadLevel::Static,
      _ => LookaheadLevel::Dynamic,
    }
  }
}

/// Default number of consecutive successful scans required to accept a
/// proposed error recovery.
pub const DEFAULT_RECOVERY_MATCH: u32 = 3;

#[derive(Clone, Copy, Debug)]
pub struct ParserConfig {
  pub lookahead_level: LookaheadLevel,
  /// `true`: build a single deterministic derivation. `false`: build the
  /// full packed forest over every derivation.
  pub one_parse: bool,
  /// `true`: Anode costs sum over children and only minimum-cost
  /// derivations are retained.
  pub cost: bool,
  /// `true`: attempt bounded error recovery on a scan failure instead of
  /// failing immediately.
  pub error_recovery: bool,
  /// Number of consecutive successful scans required to accept a proposed
  /// recovery.
  pub recovery_match: u32,
  /// Opaque to core semantics; only affects what the [Journal](crate::types::Journal) records.
  pub debug_level: u32,
  /// When `true`, an unreachable non-terminal is a hard
  /// [UnreachableNonterminal](crate::types::ErrorCode::UnreachableNonterminal)
  /// error. When `false` (the default), unreachable non-terminals are
  /// silently excluded from the analysis.
  pub strict_reachability: bool,
}

impl Default for ParserConfig {
  fn default() -> Self {
    Self {
      lookahead_level: LookaheadLevel::None,
      one_parse: false,
      cost: false,
      error_recovery: false,
      recovery_match: DEFAULT_RECOVERY_MATCH,
      debug_level: 0,
      strict_reachability: false,
    }
  }
}

impl ParserConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_lookahead_level(mut self, level: i32) -> Self {
    self.lookahead_level = LookaheadLevel::clamp(level);
    self
  }

  pub fn with_one_parse(mut self, one_parse: bool) -> Self {
    self.one_parse = one_parse;
    self
  }

  pub fn with_cost(mut self, cost: bool) -> Self {
    self.cost = cost;
    self
  }

  pub fn with_error_recovery(mut self, enabled: bool) -> Self {
    self.error_recovery = enabled;
    self
  }

  /// Negative values clamp to 0.
  pub fn with_recovery_match(mut self, matches: i64) -> Self {
    self.recovery_match = matches.max(0) as u32;
    self
  }

  pub fn with_debug_level(mut self, level: u32) -> Self {
    self.debug_level = level;
    self
  }

  pub fn with_strict_reachability(mut self, strict: bool) -> Self {
    self.strict_reachability = strict;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookahead_clamps_out_of_range() {
    assert_eq!(LookaheadLevel::clamp(-5), LookaheadLevel::None);
    assert_eq!(LookaheadLevel::clamp(0), LookaheadLevel::None);
    assert_eq!(LookaheadLevel::clamp(1), LookaheadLevel::Static);
    assert_eq!(LookaheadLevel::clamp(2), LookaheadLevel::Dynamic);
    assert_eq!(LookaheadLevel::clamp(99), LookaheadLevel::Dynamic);
  }

  #[test]
  fn recovery_match_clamps_negative() {
    let cfg = ParserConfig::new().with_recovery_match(-10);
    assert_eq!(cfg.recovery_match, 0);
  }

  #[test]
  fn builder_chain() {
    let cfg = ParserConfig::new().with_one_parse(true).with_cost(true).with_error_recovery(true);
    assert!(cfg.one_parse && cfg.cost && cfg.error_recovery);
  }
}
