//! # yaep_core
//!
//! The Earley recognizer, Leo optimization, bounded error recovery, and
//! translation-forest construction that back the [`yaep`](https://docs.rs/yaep)
//! public crate.
//!
//! This crate is the engine; it is not meant to be depended on directly by
//! applications (use `yaep` instead), but every type here is `pub` so the
//! façade crate can re-export the subset it chooses without duplicating
//! code.
//!
//! Module layout mirrors the four analysis/parsing stages: [grammar]
//! (symbol/rule tables and static analysis), [compile] (the Earley driver,
//! Leo table, error recovery, and translation builder), and [types] (arena,
//! bitset, config, error, and other primitives shared across both).

pub mod compile;
pub mod grammar;
pub mod types;

pub use compile::{
  build_translation, drive, parse, Core, CoreTable, DriveOutcome, LeoItem, LeoTable, ParseList, ParseSetKey, ParseSetTable,
  PositionOrigin, Situation, SituationTable, SyntaxErrorInfo, Token, TokenReader, TranslationNode, Translator,
};
pub use grammar::{
  Grammar, Nonterminal, Rule, RuleDecl, RuleReader, SymbolRef, Terminal, TerminalDecl, TerminalReader, Translation,
  EMPTY_TRANSLATION_INDEX,
};
pub use types::{
  Arena, Bitset, CachedString, ContextId, CoreId, ErrorCode, IString, IStringStore, Journal, JournalEntry, LookaheadLevel, NodeId,
  NontermId, ParserConfig, RuleId, SituationId, TermId, TranslationOwner, YaepError, YaepResult, DEFAULT_RECOVERY_MATCH,
  MIN_ERROR_MESSAGE_CAPACITY,
};
