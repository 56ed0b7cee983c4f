//! Grammar lifecycle: symbol & rule ingestion, analysis, and the frozen,
//! read-only view the Earley driver and translation builder consume.

pub(crate) mod analysis;
mod rule;
mod symbol;

pub use rule::{Rule, Translation, EMPTY_TRANSLATION_INDEX};
pub use symbol::{Nonterminal, SymbolRef, Terminal};

use crate::types::{
  Array, Bitset, CachedString, ContextId, ErrorCode, IString, IStringStore, Journal, Map, NontermId, ParserConfig, RuleId, TermId,
  YaepError, YaepResult, ERROR_TERMINAL_NAME, EOI_TERMINAL_NAME, MIN_ERROR_MESSAGE_CAPACITY, START_NONTERM_NAME,
};

/// A terminal delivered by [TerminalReader], for the programmatic
/// grammar-entry contract.
pub struct TerminalDecl {
  pub name: String,
  pub code: u32,
}

/// A rule delivered by [RuleReader].
pub struct RuleDecl {
  pub lhs: String,
  pub rhs: Array<String>,
  pub anode_name: Option<String>,
  pub anode_cost: u32,
  /// Translation indices into `rhs`, with [EMPTY_TRANSLATION_INDEX] as the
  /// "empty translation" sentinel. At most one element when `anode_name` is
  /// `None` (single-symbol passthrough).
  pub translation_indices: Array<i32>,
}

pub trait TerminalReader {
  /// Returns the next terminal declaration, or `None` at end of stream.
  fn next_terminal(&mut self) -> Option<TerminalDecl>;
}

pub trait RuleReader {
  fn next_rule(&mut self) -> Option<RuleDecl>;
}

/// The symbol & rule table, grammar analysis results, and (once frozen) the
/// read-only grammar the Earley driver operates over.
#[derive(Debug)]
pub struct Grammar {
  terminals: Array<Terminal>,
  term_by_name: Map<IString, TermId>,
  term_by_code: Map<u32, TermId>,
  nonterminals: Array<Nonterminal>,
  nonterm_by_name: Map<IString, NontermId>,
  rules: Array<Rule>,
  string_store: IStringStore,
  start_nonterm: Option<NontermId>,
  first_declared_nonterm: Option<NontermId>,
  eoi_term: Option<TermId>,
  error_term: Option<TermId>,
  /// Interned static-lookahead context bitsets; `contexts[0]` is always the
  /// reserved "any" (empty/no-filter) context.
  contexts: Array<Bitset>,
  context_lookup: Map<Bitset, ContextId>,
  config: ParserConfig,
  frozen: bool,
  valid: bool,
  last_error: Option<YaepError>,
  journal: Journal,
}

impl Default for Grammar {
  fn default() -> Self {
    Self::new()
  }
}

impl Grammar {
  pub fn new() -> Self {
    let mut g = Self {
      terminals: Array::new(),
      term_by_name: Map::new(),
      term_by_code: Map::new(),
      nonterminals: Array::new(),
      nonterm_by_name: Map::new(),
      rules: Array::new(),
      string_store: IStringStore::new(),
      start_nonterm: None,
      first_declared_nonterm: None,
      eoi_term: None,
      error_term: None,
      contexts: vec![Bitset::new()],
      context_lookup: Map::new(),
      config: ParserConfig::default(),
      frozen: false,
      valid: false,
      last_error: None,
      journal: Journal::new(0),
    };
    // Reserved terminals are always present so rule RHS can reference `error`
    // without an explicit declaration, and so the injected start rule can
    // reference the end-of-input marker.
    let eoi = g.intern_terminal(EOI_TERMINAL_NAME, u32::MAX).expect("reserved terminal");
    let error = g.intern_terminal(ERROR_TERMINAL_NAME, u32::MAX - 1).expect("reserved terminal");
    g.eoi_term = Some(eoi);
    g.error_term = Some(error);
    g
  }

  pub fn with_config(config: ParserConfig) -> Self {
    let mut g = Self::new();
    g.journal = Journal::new(config.debug_level);
    g.config = config;
    g
  }

  pub fn config(&self) -> &ParserConfig {
    &self.config
  }

  pub fn set_config(&mut self, config: ParserConfig) {
    self.journal = Journal::new(config.debug_level);
    self.config = config;
  }

  pub fn journal(&self) -> &Journal {
    &self.journal
  }

  pub fn journal_mut(&mut self) -> &mut Journal {
    &mut self.journal
  }

  pub fn last_error(&self) -> Option<&YaepError> {
    self.last_error.as_ref()
  }

  /// Records a freshly-surfaced error on the grammar without treating the
  /// operation as a mutation failure — used by the public façade's `parse`
  /// entrypoint, which drives a frozen grammar rather than calling back into
  /// `Grammar` methods that already route through [Grammar::fail].
  pub fn record_error(&mut self, err: YaepError) {
    self.last_error = Some(err);
  }

  /// `ErrorCode::None` when no operation on this grammar has failed yet.
  pub fn error_code(&self) -> ErrorCode {
    self.last_error.as_ref().map(YaepError::code).unwrap_or(ErrorCode::None)
  }

  /// The last recorded error's message, truncated at a code-point boundary
  /// to at most `max_len` bytes (never below [MIN_ERROR_MESSAGE_CAPACITY]).
  /// Empty when no error has been recorded.
  pub fn error_message(&self, max_len: usize) -> String {
    self.last_error.as_ref().map(|e| e.message_truncated(max_len)).unwrap_or_default()
  }

  fn fail(&mut self, err: YaepError) -> YaepError {
    self.last_error = Some(err.clone());
    err
  }

  pub fn string_store(&self) -> &IStringStore {
    &self.string_store
  }

  /// Interns an arbitrary string (e.g. an abstract-node name for a
  /// [Translation::Anode] built outside the grammar-callback contract).
  pub fn intern_string(&mut self, s: &str) -> IString {
    s.to_token(&mut self.string_store)
  }

  // ---------------------------------------------------------------------
  // Ingestion
  // ---------------------------------------------------------------------

  pub fn intern_terminal(&mut self, name: &str, code: u32) -> YaepResult<TermId> {
    if self.frozen {
      return Err(YaepError::UndefinedOrBadGrammar { detail: "grammar is frozen".into() });
    }
    let istr = name.to_token(&mut self.string_store);
    if let Some(&existing) = self.term_by_name.get(&istr) {
      if self.terminals[existing.index()].code != code {
        let err = YaepError::DuplicateTerminalDeclaration { name: name.to_string() };
        return Err(self.fail(err));
      }
      return Ok(existing);
    }
    if let Some(&other) = self.term_by_code.get(&code) {
      if code != u32::MAX && code != u32::MAX - 1 {
        let existing_name = self.string_store.resolve(self.terminals[other.index()].name).to_string();
        let err = YaepError::DuplicateTerminalCode { name: name.to_string(), code, existing: existing_name };
        return Err(self.fail(err));
      }
    }
    let id = TermId::from(self.terminals.len());
    self.terminals.push(Terminal { id, name: istr, code });
    self.term_by_name.insert(istr, id);
    self.term_by_code.insert(code, id);
    Ok(id)
  }

  pub fn intern_nonterminal(&mut self, name: &str) -> YaepResult<NontermId> {
    if self.frozen {
      return Err(YaepError::UndefinedOrBadGrammar { detail: "grammar is frozen".into() });
    }
    if name == START_NONTERM_NAME {
      return Err(YaepError::ReservedNameUse { name: name.to_string() });
    }
    let istr = name.to_token(&mut self.string_store);
    if let Some(&t) = self.term_by_name.get(&istr) {
      let _ = t;
      return Err(YaepError::TerminalOnLhs { name: name.to_string() });
    }
    if let Some(&existing) = self.nonterm_by_name.get(&istr) {
      return Ok(existing);
    }
    let id = NontermId::from(self.nonterminals.len());
    self.nonterminals.push(Nonterminal::new(id, istr));
    self.nonterm_by_name.insert(istr, id);
    if self.first_declared_nonterm.is_none() {
      self.first_declared_nonterm = Some(id);
    }
    Ok(id)
  }

  /// Adds a rule whose RHS symbols are named by string. Any name not already
  /// known as a terminal is implicitly interned as a nonterminal.
  pub fn add_rule(&mut self, lhs: &str, rhs: &[&str], translation: Translation) -> YaepResult<RuleId> {
    if self.frozen {
      return Err(YaepError::UndefinedOrBadGrammar { detail: "grammar is frozen".into() });
    }
    let lhs_id = self.intern_nonterminal(lhs)?;
    let mut rhs_syms = Array::with_capacity(rhs.len());
    for name in rhs {
      rhs_syms.push(self.resolve_rhs_symbol(name)?);
    }
    self.validate_translation(lhs, &rhs_syms, &translation)?;
    let id = RuleId::from(self.rules.len());
    self.rules.push(Rule { id, lhs: lhs_id, rhs: rhs_syms, translation });
    self.nonterminals[lhs_id.index()].rules.push(id);
    Ok(id)
  }

  fn resolve_rhs_symbol(&mut self, name: &str) -> YaepResult<SymbolRef> {
    let istr = name.to_token(&mut self.string_store);
    if let Some(&t) = self.term_by_name.get(&istr) {
      return Ok(SymbolRef::Term(t));
    }
    Ok(SymbolRef::Nonterm(self.intern_nonterminal(name)?))
  }

  fn validate_translation(&self, rule_name: &str, rhs: &[SymbolRef], translation: &Translation) -> YaepResult<()> {
    match translation {
      Translation::Empty => Ok(()),
      Translation::Passthrough(idx) => {
        if *idx >= rhs.len() {
          return Err(YaepError::BadTranslationIndex { rule: rule_name.to_string(), index: *idx as i32 });
        }
        Ok(())
      }
      Translation::Anode { cost, children, .. } => {
        if (*cost as i64) < 0 {
          return Err(YaepError::NegativeCost { rule: rule_name.to_string(), cost: *cost as i64 });
        }
        for &c in children {
          if c != EMPTY_TRANSLATION_INDEX && (c < 0 || c as usize >= rhs.len()) {
            return Err(YaepError::BadTranslationIndex { rule: rule_name.to_string(), index: c });
          }
        }
        Ok(())
      }
    }
  }

  /// Programmatic ingestion via the grammar-callback contract.
  pub fn from_callbacks(mut terminals: impl TerminalReader, mut rules: impl RuleReader) -> YaepResult<Self> {
    let mut g = Self::new();
    while let Some(TerminalDecl { name, code }) = terminals.next_terminal() {
      g.intern_terminal(&name, code)?;
    }
    while let Some(decl) = rules.next_rule() {
      let rhs_refs: Array<&str> = decl.rhs.iter().map(|s| s.as_str()).collect();
      let translation = match decl.anode_name {
        None => {
          if decl.translation_indices.len() > 1 {
            return Err(YaepError::BadTranslation {
              detail: "null abstract-node name requires at most one translation index".into(),
            });
          }
          match decl.translation_indices.first() {
            Some(&idx) if idx != EMPTY_TRANSLATION_INDEX => Translation::Passthrough(idx as usize),
            _ => Translation::Empty,
          }
        }
        Some(name) => {
          let istr = name.to_token(&mut g.string_store);
          Translation::Anode { name: istr, cost: decl.anode_cost, children: decl.translation_indices }
        }
      };
      g.add_rule(&decl.lhs, &rhs_refs, translation)?;
    }
    Ok(g)
  }

  // ---------------------------------------------------------------------
  // Freeze / analysis
  // ---------------------------------------------------------------------

  /// Runs grammar analysis and freezes the grammar. Idempotent: calling this
  /// more than once simply re-validates.
  pub fn analyze(&mut self) -> YaepResult<()> {
    if self.rules.is_empty() {
      return Err(self.fail(YaepError::NoRules));
    }
    let start_user_nonterm = match self.first_declared_nonterm {
      Some(n) => n,
      None => return Err(self.fail(YaepError::NoRules)),
    };
    if self.start_nonterm.is_none() {
      let start = self.intern_nonterminal(START_NONTERM_NAME)?;
      // Deliberately a single-symbol rhs, not `S eoi`: acceptance is only ever
      // checked once the token reader is exhausted (see `run_loop`'s
      // `token.is_none()` branch), so there is nothing for an explicit eoi
      // symbol to be scanned against. `$start`'s FOLLOW is still seeded with
      // eoi below, which is all FIRST/FOLLOW analysis needs to put eoi into
      // FOLLOW(S) for lookahead filtering near the end of input.
      let id = RuleId::from(self.rules.len());
      self.rules.push(Rule { id, lhs: start, rhs: vec![SymbolRef::Nonterm(start_user_nonterm)], translation: Translation::Passthrough(0) });
      self.nonterminals[start.index()].rules.push(id);
      self.start_nonterm = Some(start);
    }
    analysis::analyze(self)?;
    self.frozen = true;
    self.valid = true;
    Ok(())
  }

  pub fn is_frozen(&self) -> bool {
    self.frozen
  }

  pub fn is_valid(&self) -> bool {
    self.valid
  }

  // ---------------------------------------------------------------------
  // Read-only accessors used by the compile/translate stages
  // ---------------------------------------------------------------------

  pub fn start_nonterm(&self) -> NontermId {
    self.start_nonterm.expect("grammar not analyzed")
  }

  pub fn eoi_term(&self) -> TermId {
    self.eoi_term.expect("reserved terminal")
  }

  pub fn error_term(&self) -> TermId {
    self.error_term.expect("reserved terminal")
  }

  pub fn rule(&self, id: RuleId) -> &Rule {
    &self.rules[id.index()]
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn nonterm(&self, id: NontermId) -> &Nonterminal {
    &self.nonterminals[id.index()]
  }

  pub fn nonterminals(&self) -> &[Nonterminal] {
    &self.nonterminals
  }

  pub fn term(&self, id: TermId) -> &Terminal {
    &self.terminals[id.index()]
  }

  pub fn terminals(&self) -> &[Terminal] {
    &self.terminals
  }

  pub fn term_count(&self) -> usize {
    self.terminals.len()
  }

  pub fn term_by_code(&self, code: u32) -> Option<TermId> {
    self.term_by_code.get(&code).copied()
  }

  pub fn nonterm_name(&self, id: NontermId) -> &str {
    self.string_store.resolve(self.nonterminals[id.index()].name)
  }

  /// Looks up a nonterminal by name without interning, usable after the
  /// grammar is frozen.
  pub fn find_nonterm(&self, name: &str) -> Option<NontermId> {
    self.nonterminals.iter().find(|n| self.string_store.resolve(n.name) == name).map(|n| n.id)
  }

  pub fn term_name(&self, id: TermId) -> &str {
    self.string_store.resolve(self.terminals[id.index()].name)
  }

  /// Interns `context` into the static-context pool, returning the existing
  /// id if an identical bitset was already interned.
  pub(crate) fn intern_context(&mut self, context: Bitset) -> ContextId {
    if context.is_empty() {
      return ContextId::ANY;
    }
    if let Some(&id) = self.context_lookup.get(&context) {
      return id;
    }
    let id = ContextId::from(self.contexts.len());
    self.context_lookup.insert(context.clone(), id);
    self.contexts.push(context);
    id
  }

  pub fn context(&self, id: ContextId) -> &Bitset {
    &self.contexts[id.index()]
  }

  pub(crate) fn nonterminals_mut(&mut self) -> &mut [Nonterminal] {
    &mut self.nonterminals
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duplicate_terminal_code_rejected() {
    let mut g = Grammar::new();
    g.intern_terminal("A", 1).unwrap();
    let err = g.intern_terminal("B", 1).unwrap_err();
    assert_eq!(err.code(), crate::types::ErrorCode::DuplicateTerminalCode);
  }

  #[test]
  fn reserved_name_rejected() {
    let mut g = Grammar::new();
    let err = g.intern_nonterminal("$start").unwrap_err();
    assert_eq!(err.code(), crate::types::ErrorCode::ReservedNameUse);
  }

  #[test]
  fn empty_grammar_fails_analysis() {
    let mut g = Grammar::new();
    let err = g.analyze().unwrap_err();
    assert_eq!(err.code(), crate::types::ErrorCode::NoRules);
  }

  #[test]
  fn terminal_on_lhs_rejected() {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    let err = g.add_rule("a", &[], Translation::Empty).unwrap_err();
    assert_eq!(err.code(), crate::types::ErrorCode::TerminalOnLhs);
  }

  #[test]
  fn analysis_journals_phases_only_above_debug_level_zero() {
    let mut quiet = Grammar::new();
    quiet.intern_terminal("a", 1).unwrap();
    quiet.add_rule("s", &["a"], Translation::Passthrough(0)).unwrap();
    quiet.analyze().unwrap();
    assert!(quiet.journal().entries().is_empty());

    let mut verbose = Grammar::with_config(ParserConfig::new().with_debug_level(1));
    verbose.intern_terminal("a", 1).unwrap();
    verbose.add_rule("s", &["a"], Translation::Passthrough(0)).unwrap();
    verbose.analyze().unwrap();
    let labels: Vec<&str> = verbose.journal().entries().iter().map(|e| e.label).collect();
    assert_eq!(labels, ["reachability", "derivability", "nullable_closure", "loop_check", "first_follow"]);
  }
}
