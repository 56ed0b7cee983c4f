//! Error taxonomy.
//!
//! Internal routines propagate failures with ordinary `Result`s; nothing in
//! this crate panics or unwinds across a public boundary on a malformed
//! grammar or input. [YaepError] is the single closed error type; the public
//! façade (`yaep::Grammar`) flattens it into a per-grammar `(ErrorCode,
//! String)` pair.

use std::fmt;

/// Minimum size of the truncated diagnostic message buffer. Messages longer
/// than this are truncated at a char boundary and suffixed with an ellipsis.
pub const MIN_ERROR_MESSAGE_CAPACITY: usize = 1024;

/// The stable, enumerable error classification surfaced by
/// `Grammar::error_code`, plus `None` for "no error recorded".
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[non_exhaustive]
pub enum ErrorCode {
  #[default]
  None,
  NoMemory,
  UndefinedOrBadGrammar,
  GrammarDescriptionSyntax,
  ReservedNameUse,
  DuplicateTerminalDeclaration,
  NegativeTerminalCode,
  DuplicateTerminalCode,
  NoRules,
  TerminalOnLhs,
  BadTranslation,
  BadTranslationIndex,
  NegativeCost,
  UnreachableNonterminal,
  NonderivableNonterminal,
  LoopInGrammar,
  InvalidTokenCode,
  SyntaxError,
  InvalidUtf8,
}

/// Every failure this crate can produce. Carries enough context to render
/// a human-readable `error_message()` string.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum YaepError {
  NoMemory,
  UndefinedOrBadGrammar { detail: String },
  GrammarDescriptionSyntax { detail: String },
  ReservedNameUse { name: String },
  DuplicateTerminalDeclaration { name: String },
  NegativeTerminalCode { name: String, code: i64 },
  DuplicateTerminalCode { name: String, code: u32, existing: String },
  NoRules,
  TerminalOnLhs { name: String },
  BadTranslation { detail: String },
  BadTranslationIndex { rule: String, index: i32 },
  NegativeCost { rule: String, cost: i64 },
  UnreachableNonterminal { name: String },
  NonderivableNonterminal { name: String },
  LoopInGrammar { name: String },
  InvalidTokenCode { code: u32 },
  SyntaxError { position: usize },
  InvalidUtf8,
}

impl YaepError {
  pub fn code(&self) -> ErrorCode {
    match self {
      YaepError::NoMemory => ErrorCode::NoMemory,
      YaepError::UndefinedOrBadGrammar { .. } => ErrorCode::UndefinedOrBadGrammar,
      YaepError::GrammarDescriptionSyntax { .. } => ErrorCode::GrammarDescriptionSyntax,
      YaepError::ReservedNameUse { .. } => ErrorCode::ReservedNameUse,
      YaepError::DuplicateTerminalDeclaration { .. } => ErrorCode::DuplicateTerminalDeclaration,
      YaepError::NegativeTerminalCode { .. } => ErrorCode::NegativeTerminalCode,
      YaepError::DuplicateTerminalCode { .. } => ErrorCode::DuplicateTerminalCode,
      YaepError::NoRules => ErrorCode::NoRules,
      YaepError::TerminalOnLhs { .. } => ErrorCode::TerminalOnLhs,
      YaepError::BadTranslation { .. } => ErrorCode::BadTranslation,
      YaepError::BadTranslationIndex { .. } => ErrorCode::BadTranslationIndex,
      YaepError::NegativeCost { .. } => ErrorCode::NegativeCost,
      YaepError::UnreachableNonterminal { .. } => ErrorCode::UnreachableNonterminal,
      YaepError::NonderivableNonterminal { .. } => ErrorCode::NonderivableNonterminal,
      YaepError::LoopInGrammar { .. } => ErrorCode::LoopInGrammar,
      YaepError::InvalidTokenCode { .. } => ErrorCode::InvalidTokenCode,
      YaepError::SyntaxError { .. } => ErrorCode::SyntaxError,
      YaepError::InvalidUtf8 => ErrorCode::InvalidUtf8,
    }
  }

  /// Renders the full message, then truncates it at a char boundary to at
  /// most `max_len` bytes (never below [MIN_ERROR_MESSAGE_CAPACITY]),
  /// appending an ellipsis when truncated.
  pub fn message_truncated(&self, max_len: usize) -> String {
    let max_len = max_len.max(MIN_ERROR_MESSAGE_CAPACITY);
    let full = self.to_string();
    if full.len() <= max_len {
      return full;
    }
    let mut end = max_len;
    while end > 0 && !full.is_char_boundary(end) {
      end -= 1;
    }
    format!("{}…", &full[..end])
  }
}

impl fmt::Display for YaepError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      YaepError::NoMemory => write!(f, "allocation failed"),
      YaepError::UndefinedOrBadGrammar { detail } => write!(f, "parse attempted on an undefined or invalid grammar: {detail}"),
      YaepError::GrammarDescriptionSyntax { detail } => write!(f, "grammar description syntax error: {detail}"),
      YaepError::ReservedNameUse { name } => write!(f, "'{name}' is a reserved name and cannot be declared"),
      YaepError::DuplicateTerminalDeclaration { name } => write!(f, "terminal '{name}' was already declared"),
      YaepError::NegativeTerminalCode { name, code } => write!(f, "terminal '{name}' has a negative code ({code})"),
      YaepError::DuplicateTerminalCode { name, code, existing } => {
        write!(f, "terminal '{name}' reuses code {code} already assigned to '{existing}'")
      }
      YaepError::NoRules => write!(f, "grammar has no rules"),
      YaepError::TerminalOnLhs { name } => write!(f, "'{name}' is a terminal and cannot appear on a rule's left-hand side"),
      YaepError::BadTranslation { detail } => write!(f, "malformed translation descriptor: {detail}"),
      YaepError::BadTranslationIndex { rule, index } => write!(f, "translation index {index} is out of range for rule '{rule}'"),
      YaepError::NegativeCost { rule, cost } => write!(f, "rule '{rule}' has a negative cost ({cost})"),
      YaepError::UnreachableNonterminal { name } => write!(f, "non-terminal '{name}' is unreachable from the start symbol"),
      YaepError::NonderivableNonterminal { name } => write!(f, "non-terminal '{name}' derives no terminal string"),
      YaepError::LoopInGrammar { name } => write!(f, "non-terminal '{name}' derives itself (N ⇒+ N)"),
      YaepError::InvalidTokenCode { code } => write!(f, "token code {code} does not match any declared terminal"),
      YaepError::SyntaxError { position } => write!(f, "syntax error at token {position}"),
      YaepError::InvalidUtf8 => write!(f, "invalid UTF-8 in grammar source"),
    }
  }
}

impl std::error::Error for YaepError {}

impl From<std::io::Error> for YaepError {
  fn from(err: std::io::Error) -> Self {
    YaepError::UndefinedOrBadGrammar { detail: err.to_string() }
  }
}

pub type YaepResult<T> = Result<T, YaepError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_message_is_unchanged() {
    let err = YaepError::InvalidUtf8;
    assert_eq!(err.message_truncated(4), err.to_string());
  }

  #[test]
  fn long_message_is_truncated_with_ellipsis() {
    let err = YaepError::GrammarDescriptionSyntax { detail: "x".repeat(4000) };
    let msg = err.message_truncated(0);
    assert!(msg.len() <= MIN_ERROR_MESSAGE_CAPACITY + "…".len());
    assert!(msg.ends_with('…'));
  }

  #[test]
  fn code_matches_variant() {
    let err = YaepError::LoopInGrammar { name: "A".into() };
    assert_eq!(err.code(), ErrorCode::LoopInGrammar);
  }
}
