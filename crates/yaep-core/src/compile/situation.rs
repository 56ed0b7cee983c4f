//! Dotted items ("situations"): (rule, dot, context) interned by identity so
//! two occurrences of the same triple share one dense id.

use crate::{
  grammar::{Grammar, SymbolRef},
  types::{ContextId, Map, RuleId, SituationId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SituationKey {
  rule: RuleId,
  dot: usize,
  context: ContextId,
}

#[derive(Clone, Debug)]
pub struct Situation {
  pub rule: RuleId,
  pub dot: usize,
  pub context: ContextId,
  /// `true` when every symbol from `dot` to the end of the rule is nullable,
  /// i.e. this situation can complete without consuming more input.
  pub empty_tail: bool,
  pub next_symbol: Option<SymbolRef>,
}

impl Situation {
  pub fn is_complete(&self) -> bool {
    self.next_symbol.is_none()
  }
}

/// Per-parse interning table for situations. Lives in the scratch arena for
/// the duration of one `parse` call.
#[derive(Clone, Debug, Default)]
pub struct SituationTable {
  records: Vec<Situation>,
  lookup: Map<SituationKey, SituationId>,
}

impl SituationTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Interns (rule, dot, context), computing its derived fields from the
  /// grammar on first insertion.
  pub fn intern(&mut self, grammar: &Grammar, rule: RuleId, dot: usize, context: ContextId) -> SituationId {
    let key = SituationKey { rule, dot, context };
    if let Some(&id) = self.lookup.get(&key) {
      return id;
    }
    let rhs = &grammar.rule(rule).rhs;
    let next_symbol = rhs.get(dot).copied();
    let empty_tail = rhs[dot..].iter().all(|sym| match sym {
      SymbolRef::Term(_) => false,
      SymbolRef::Nonterm(nt) => grammar.nonterm(*nt).nullable,
    });
    let id = SituationId::from(self.records.len());
    self.records.push(Situation { rule, dot, context, empty_tail, next_symbol });
    self.lookup.insert(key, id);
    id
  }

  pub fn get(&self, id: SituationId) -> &Situation {
    &self.records[id.index()]
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::Translation;

  fn sample_grammar() -> Grammar {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    g.add_rule("start", &["a", "start"], Translation::Empty).unwrap();
    g.add_rule("start", &[], Translation::Empty).unwrap();
    g.analyze().unwrap();
    g
  }

  #[test]
  fn identical_triples_share_one_id() {
    let g = sample_grammar();
    let mut table = SituationTable::new();
    let rule = g.rules()[0].id;
    let a = table.intern(&g, rule, 0, ContextId::ANY);
    let b = table.intern(&g, rule, 0, ContextId::ANY);
    assert_eq!(a, b);
    assert_eq!(table.len(), 1);
  }

  #[test]
  fn empty_tail_detected_on_nullable_suffix() {
    let g = sample_grammar();
    let mut table = SituationTable::new();
    // start -> . a start : tail is not nullable (has a terminal head)
    let rule0 = g.rules()[0].id;
    let s0 = table.intern(&g, rule0, 0, ContextId::ANY);
    assert!(!table.get(s0).empty_tail);
    // start -> a start . : empty tail, dot at end
    let s1 = table.intern(&g, rule0, 2, ContextId::ANY);
    assert!(table.get(s1).empty_tail);
    assert!(table.get(s1).is_complete());
  }
}
