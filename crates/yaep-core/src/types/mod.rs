//! Shared primitive types used across grammar analysis, the Earley driver,
//! and the translation builder.

mod arena;
mod bitset;
mod config;
mod error;
mod ids;
mod istring;
mod journal;

pub use arena::{Arena, TranslationOwner};
pub use bitset::Bitset;
pub use config::{LookaheadLevel, ParserConfig, DEFAULT_RECOVERY_MATCH};
pub use error::{ErrorCode, YaepError, YaepResult, MIN_ERROR_MESSAGE_CAPACITY};
pub use ids::{ContextId, CoreId, NodeId, NontermId, RuleId, SituationId, TermId};
pub use istring::{CachedString, IString, IStringStore};
pub use journal::{Journal, JournalEntry};

/// A growable, ordered collection. Alias kept distinct from `Vec` so the
/// reference lineage's `Array<T>` naming carries over to table fields.
pub type Array<T> = Vec<T>;
/// An order-preserving map, used wherever iteration order must be
/// deterministic.
pub type OrderedMap<K, V> = std::collections::BTreeMap<K, V>;
/// An order-preserving set.
pub type OrderedSet<T> = std::collections::BTreeSet<T>;
/// A hash map used purely for O(1) membership/lookup where iteration order
/// is irrelevant (e.g. per-parse dedup tables that are drained before use).
pub type Map<K, V> = std::collections::HashMap<K, V>;
/// A hash set used purely for O(1) membership.
pub type Set<T> = std::collections::HashSet<T>;

/// Reserved terminal name for the end-of-input marker `⊥` injected by the
/// start-rule rewrite `S′ → S ⊥`.
pub const EOI_TERMINAL_NAME: &str = "$eoi";
/// Reserved terminal name a grammar author places in a rule's RHS to mark a
/// recovery point.
pub const ERROR_TERMINAL_NAME: &str = "error";
/// Reserved nonterminal name for the synthetic start symbol `S′`.
pub const START_NONTERM_NAME: &str = "$start";
