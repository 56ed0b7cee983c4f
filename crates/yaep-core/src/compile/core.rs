//! Hash-consed cores: the situation-id set shared by every parse set that
//! differs only in distances.

use crate::{
  compile::situation::SituationTable,
  grammar::{Grammar, SymbolRef},
  types::{CoreId, Map, SituationId},
};

#[derive(Clone, Debug)]
pub struct Core {
  /// Sorted, deduplicated situation ids.
  pub situations: Vec<SituationId>,
  /// Indices (into `situations`) of situations with a nonempty origin
  /// prefix: the ones a parse set must carry a distance for.
  pub start: Vec<usize>,
  /// Indices of situations introduced fresh by prediction at this position
  /// (dot == 0, origin == current position — not distance-tracked).
  pub predicted: Vec<usize>,
  /// Symbol -> situation indices that advance on that symbol, precomputed
  /// once per core so scan/complete can dispatch without rescanning.
  transitions: Map<TransitionKey, Vec<usize>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum TransitionKey {
  Term(crate::types::TermId),
  Nonterm(crate::types::NontermId),
}

impl Core {
  fn build(situations: Vec<SituationId>, situation_table: &SituationTable) -> Self {
    let mut start = Vec::new();
    let mut predicted = Vec::new();
    let mut transitions: Map<TransitionKey, Vec<usize>> = Map::new();
    for (idx, &sid) in situations.iter().enumerate() {
      let situation = situation_table.get(sid);
      if situation.dot == 0 {
        predicted.push(idx);
      } else {
        start.push(idx);
      }
      match situation.next_symbol {
        Some(SymbolRef::Term(t)) => transitions.entry(TransitionKey::Term(t)).or_default().push(idx),
        Some(SymbolRef::Nonterm(n)) => transitions.entry(TransitionKey::Nonterm(n)).or_default().push(idx),
        None => {}
      }
    }
    Self { situations, start, predicted, transitions }
  }

  pub fn situations_for_term(&self, term: crate::types::TermId) -> &[usize] {
    self.transitions.get(&TransitionKey::Term(term)).map(|v| v.as_slice()).unwrap_or(&[])
  }

  pub fn situations_for_nonterm(&self, nonterm: crate::types::NontermId) -> &[usize] {
    self.transitions.get(&TransitionKey::Nonterm(nonterm)).map(|v| v.as_slice()).unwrap_or(&[])
  }

  pub fn len(&self) -> usize {
    self.situations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.situations.is_empty()
  }
}

/// Hash-conses situation-id sets into [Core]s, so two positions whose item
/// sets are identical (up to distance) share one `Core` instance.
#[derive(Clone, Debug, Default)]
pub struct CoreTable {
  cores: Vec<Core>,
  lookup: Map<Vec<SituationId>, CoreId>,
}

impl CoreTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Interns an unsorted, possibly-duplicated set of situation ids.
  pub fn intern(&mut self, mut situations: Vec<SituationId>, situation_table: &SituationTable) -> CoreId {
    situations.sort_unstable_by_key(|s| s.index());
    situations.dedup();
    if let Some(&id) = self.lookup.get(&situations) {
      return id;
    }
    let id = CoreId::from(self.cores.len());
    self.lookup.insert(situations.clone(), id);
    self.cores.push(Core::build(situations, situation_table));
    id
  }

  pub fn get(&self, id: CoreId) -> &Core {
    &self.cores[id.index()]
  }

  pub fn len(&self) -> usize {
    self.cores.len()
  }
}

#[allow(dead_code)]
fn next_symbol_name(grammar: &Grammar, sym: SymbolRef) -> String {
  match sym {
    SymbolRef::Term(t) => grammar.term_name(t).to_string(),
    SymbolRef::Nonterm(n) => grammar.nonterm_name(n).to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{grammar::Translation, types::ContextId};

  #[test]
  fn identical_situation_sets_share_one_core() {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    g.add_rule("start", &["a"], Translation::Empty).unwrap();
    g.analyze().unwrap();
    let rule = g.rules()[0].id;
    let mut situations = SituationTable::new();
    let s0 = situations.intern(&g, rule, 0, ContextId::ANY);
    let mut cores = CoreTable::new();
    let c1 = cores.intern(vec![s0], &situations);
    let c2 = cores.intern(vec![s0, s0], &situations);
    assert_eq!(c1, c2);
    assert_eq!(cores.len(), 1);
  }
}
