//! # yaep
//!
//! General context-free parsing: give it a grammar (possibly ambiguous,
//! possibly with empty productions) and a token stream, and it returns
//! either a single translation tree, or — when ambiguity is left
//! unresolved — a shared packed parse forest covering every valid parse. On
//! a syntax error it can attempt bounded error recovery that minimizes how
//! much input gets ignored.
//!
//! This crate is the thin public façade over [`yaep_core`], which holds the
//! grammar analysis, Earley recognizer, Leo optimization, error recovery,
//! and translation builder. Application code should depend on `yaep`, not
//! `yaep_core` directly; the subset re-exported here is the stable surface.
//!
//! ```
//! use yaep::{Grammar, Translation};
//!
//! let mut g = Grammar::new();
//! g.intern_terminal("a", 1).unwrap();
//! g.intern_terminal("b", 2).unwrap();
//! g.add_rule("s", &["a", "s", "b"], Translation::Empty).unwrap();
//! g.add_rule("s", &[], Translation::Empty).unwrap();
//! g.analyze().unwrap();
//! ```

mod parse;
mod tree;

pub use yaep_core::{
  Arena, Bitset, CachedString, Core, CoreId, CoreTable, DriveOutcome, ErrorCode, Grammar, IString, IStringStore, Journal, JournalEntry,
  LeoItem, LeoTable, LookaheadLevel, NodeId, Nonterminal, ParseList, ParseSetKey, ParseSetTable, ParserConfig, PositionOrigin,
  Rule, RuleDecl, RuleId, RuleReader, Situation, SituationTable, SymbolRef, SyntaxErrorInfo, Terminal, TerminalDecl,
  TerminalReader, Token, TokenReader, Translation, TranslationNode, TranslationOwner, YaepError, YaepResult,
  DEFAULT_RECOVERY_MATCH, EMPTY_TRANSLATION_INDEX, MIN_ERROR_MESSAGE_CAPACITY,
};

pub use parse::{parse, ParseOutcome};
pub use tree::free_tree;
