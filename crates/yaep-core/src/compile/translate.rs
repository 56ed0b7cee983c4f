//! Translation builder: projects an accepted [ParseList] into a translation
//! DAG (Shared Packed Parse Forest), post-order over completed items,
//! memoized by `(nonterminal, start, end)` so ambiguity never blows up the
//! result past polynomial size.
//!
//! There are no parent/child backpointers recorded during driving — the
//! driver only ever needs "does a situation with this origin exist here",
//! never "which situation produced it". So this module rediscovers split
//! points by walking a completed rule's RHS backward, re-checking presence
//! in the already-built parse sets rather than following stored links. That
//! rediscovery is exactly what memoization on `(rule, dot, origin, position)`
//! is for: the same split search over the same span is never repeated.

use crate::{
  compile::driver::{ParseList, PositionOrigin},
  grammar::{Grammar, SymbolRef, Translation, EMPTY_TRANSLATION_INDEX},
  types::{Array, IString, Map, NodeId, NontermId, ParserConfig, RuleId, TranslationOwner},
};

/// A node in the translation DAG. `Nil` and `Error` are singletons, shared
/// across the whole arena; `Term` carries the caller's opaque attribute;
/// `Anode` is the constructed-node form named by a rule's translation
/// descriptor; `Alt` chains together sibling derivations of one ambiguous
/// span.
#[derive(Clone, Debug)]
pub enum TranslationNode<A> {
  Nil,
  Error,
  Term { code: u32, attr: A },
  Anode { name: IString, cost: u32, children: Array<NodeId> },
  Alt { node: NodeId, next: Option<NodeId> },
}

/// One pass over a [ParseList], building the translation DAG rooted at the
/// grammar's start nonterminal. Not reused across parses: construct, call
/// [build], discard.
pub struct Translator<'a, 'o, A> {
  grammar: &'a Grammar,
  list: &'a ParseList<A>,
  config: &'a ParserConfig,
  owner: &'a mut TranslationOwner<'o, TranslationNode<A>>,
  nil: Option<NodeId>,
  error: Option<NodeId>,
  term_cache: Map<u32, NodeId>,
  split_cache: Map<(RuleId, usize, u32, u32), Array<Array<u32>>>,
  span_cache: Map<(NontermId, u32, u32), (NodeId, u32)>,
  ambiguous: bool,
}

/// Builds the translation DAG for an accepted parse, returning its root node
/// and whether more than one derivation was found anywhere in the DAG (after
/// cost-based filtering, when `config.cost` is set — cost filtering discards
/// genuinely suboptimal parses rather than breaking an arbitrary tie, so the
/// flag should reflect what survives it, same as it does for `one_parse`).
pub fn build<A: Clone>(
  grammar: &Grammar,
  list: &ParseList<A>,
  config: &ParserConfig,
  owner: &mut TranslationOwner<'_, TranslationNode<A>>,
) -> (NodeId, bool) {
  let mut translator = Translator {
    grammar,
    list,
    config,
    owner,
    nil: None,
    error: None,
    term_cache: Map::new(),
    split_cache: Map::new(),
    span_cache: Map::new(),
    ambiguous: false,
  };
  let end = translator.list.last_position() as u32;
  let (node, _cost) = translator.build_span(grammar.start_nonterm(), 0, end);
  (node, translator.ambiguous)
}

impl<'a, 'o, A: Clone> Translator<'a, 'o, A> {
  fn nil(&mut self) -> NodeId {
    if let Some(id) = self.nil {
      return id;
    }
    let id = NodeId::from(self.owner.arena_mut().push(TranslationNode::Nil));
    self.nil = Some(id);
    id
  }

  fn error_node(&mut self) -> NodeId {
    if let Some(id) = self.error {
      return id;
    }
    let id = NodeId::from(self.owner.arena_mut().push(TranslationNode::Error));
    self.error = Some(id);
    id
  }

  /// The `Term` node for the scan that closed `position`, or the shared
  /// `Error` node when that position was reached by error recovery's
  /// synthetic advance rather than a real scan.
  fn term_node(&mut self, position: u32) -> NodeId {
    if let Some(&id) = self.term_cache.get(&position) {
      return id;
    }
    let id = match self.list.position_origin(position as usize) {
      PositionOrigin::Scanned(tok_idx) => {
        let tok = &self.list.tokens[tok_idx];
        let (code, attr) = (tok.code, tok.attr.clone());
        NodeId::from(self.owner.arena_mut().push(TranslationNode::Term { code, attr }))
      }
      PositionOrigin::Recovered => self.error_node(),
      PositionOrigin::Start => unreachable!("a terminal's span never starts at position 0"),
    };
    self.term_cache.insert(position, id);
    id
  }

  fn alt_chain(&mut self, candidates: Array<NodeId>) -> NodeId {
    let mut iter = candidates.into_iter().rev();
    let mut next = iter.next().expect("at least one derivation");
    for cand in iter {
      next = NodeId::from(self.owner.arena_mut().push(TranslationNode::Alt { node: cand, next: Some(next) }));
    }
    next
  }

  /// Whether a situation `(rule, dot, origin)` was actually present in the
  /// parse set closed at `position`. Dot `0` on an empty rule means
  /// "complete", same as any other rule whose dot has reached its length.
  fn situation_present(&self, position: u32, rule: RuleId, dot: usize, origin: u32) -> bool {
    let core = self.list.core_at(position as usize);
    core.situations.iter().enumerate().any(|(idx, &sid)| {
      let s = self.list.situations.get(sid);
      s.rule == rule && s.dot == dot && self.list.origin_at(position as usize, idx) == origin
    })
  }

  /// Every interior split-point sequence `p₁ ≤ … ≤ p_{dot-1}` (origin and
  /// `position` are the already-known endpoints, so excluded) consistent
  /// with `(rule, dot, origin)` being present at `position`.
  fn splits(&mut self, rule: RuleId, dot: usize, origin: u32, position: u32) -> Array<Array<u32>> {
    let key = (rule, dot, origin, position);
    if let Some(cached) = self.split_cache.get(&key) {
      return cached.clone();
    }
    let result = self.splits_uncached(rule, dot, origin, position);
    self.split_cache.insert(key, result.clone());
    result
  }

  fn splits_uncached(&mut self, rule: RuleId, dot: usize, origin: u32, position: u32) -> Array<Array<u32>> {
    if dot == 0 {
      return if origin == position { vec![vec![]] } else { vec![] };
    }
    let sym = self.grammar.rule(rule).rhs[dot - 1];
    let mut out = Array::new();
    match sym {
      SymbolRef::Term(t) => {
        if position == 0 {
          return out;
        }
        let k = position - 1;
        let matches = match self.list.position_origin(position as usize) {
          PositionOrigin::Scanned(tok_idx) => self.list.tokens[tok_idx].code == self.grammar.term(t).code,
          PositionOrigin::Recovered => t == self.grammar.error_term(),
          PositionOrigin::Start => false,
        };
        if matches && self.situation_present(k, rule, dot - 1, origin) {
          for prefix in self.splits(rule, dot - 1, origin, k) {
            let mut full = prefix;
            full.push(k);
            out.push(full);
          }
        }
      }
      SymbolRef::Nonterm(nt) => {
        for k in origin..=position {
          if self.situation_present(k, rule, dot - 1, origin) && self.nonterm_spans(nt, k, position) {
            for prefix in self.splits(rule, dot - 1, origin, k) {
              let mut full = prefix;
              full.push(k);
              out.push(full);
            }
          }
        }
      }
    }
    out
  }

  /// Whether any rule of `nt` completes over exactly `[start, end)`.
  fn nonterm_spans(&self, nt: NontermId, start: u32, end: u32) -> bool {
    self.grammar.nonterm(nt).rules.iter().any(|&r| self.situation_present(end, r, self.grammar.rule(r).rhs.len(), start))
  }

  fn symbol_child(&mut self, sym: SymbolRef, start: u32, end: u32) -> (NodeId, u32) {
    match sym {
      SymbolRef::Term(_) => (self.term_node(end), 0),
      SymbolRef::Nonterm(n) => self.build_span(n, start, end),
    }
  }

  /// Every `(node, cost)` derivation of `rule` over exactly `[start, end)`,
  /// one per valid split sequence, assembled according to the rule's
  /// translation descriptor.
  fn build_rule_derivations(&mut self, rule: RuleId, start: u32, end: u32) -> Array<(NodeId, u32)> {
    let rhs = self.grammar.rule(rule).rhs.clone();
    let splits = self.splits(rule, rhs.len(), start, end);
    let mut out = Array::with_capacity(splits.len());
    for interior in splits {
      let mut bounds = Array::with_capacity(rhs.len() + 1);
      bounds.push(start);
      bounds.extend(interior);
      bounds.push(end);
      let children: Array<(NodeId, u32)> = rhs.iter().enumerate().map(|(i, &sym)| self.symbol_child(sym, bounds[i], bounds[i + 1])).collect();
      let translation = self.grammar.rule(rule).translation.clone();
      out.push(self.assemble(translation, &children));
    }
    out
  }

  fn assemble(&mut self, translation: Translation, children: &[(NodeId, u32)]) -> (NodeId, u32) {
    match translation {
      Translation::Empty => (self.nil(), 0),
      Translation::Passthrough(idx) => children[idx],
      Translation::Anode { name, cost: self_cost, children: positions } => {
        let mut node_children = Array::with_capacity(positions.len());
        let mut total = self_cost;
        for pos in positions {
          if pos == EMPTY_TRANSLATION_INDEX {
            node_children.push(self.nil());
          } else {
            let (node, cost) = children[pos as usize];
            node_children.push(node);
            if self.config.cost {
              total += cost;
            }
          }
        }
        let node = NodeId::from(self.owner.arena_mut().push(TranslationNode::Anode { name, cost: total, children: node_children }));
        (node, total)
      }
    }
  }

  /// The memoized translation of nonterminal `nt` over exactly `[start,
  /// end)`, aggregating every rule that completes there.
  fn build_span(&mut self, nt: NontermId, start: u32, end: u32) -> (NodeId, u32) {
    let key = (nt, start, end);
    if let Some(&cached) = self.span_cache.get(&key) {
      return cached;
    }
    let rule_ids = self.grammar.nonterm(nt).rules.clone();
    let mut all: Array<(NodeId, u32)> = Array::new();
    for rule in rule_ids {
      if self.situation_present(end, rule, self.grammar.rule(rule).rhs.len(), start) {
        all.extend(self.build_rule_derivations(rule, start, end));
      }
    }
    debug_assert!(!all.is_empty(), "build_span called on a span with no completing rule");

    if self.config.cost {
      if let Some(&min_cost) = all.iter().map(|(_, c)| c).min() {
        all.retain(|(_, c)| *c == min_cost);
      }
    }
    if all.len() > 1 {
      self.ambiguous = true;
    }

    let cost = all[0].1;
    let node = if self.config.one_parse || all.len() == 1 {
      all[0].0
    } else {
      self.alt_chain(all.into_iter().map(|(n, _)| n).collect())
    };
    self.span_cache.insert(key, (node, cost));
    (node, cost)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    compile::driver::{drive, Token, TokenReader},
    types::Arena,
  };

  struct VecReader {
    codes: std::vec::IntoIter<u32>,
  }

  impl TokenReader<u32> for VecReader {
    fn next_token(&mut self) -> Option<Token<u32>> {
      self.codes.next().map(|code| Token { code, attr: code })
    }
  }

  fn sum_grammar() -> Grammar {
    let mut g = Grammar::new();
    g.intern_terminal("n", 1).unwrap();
    g.intern_terminal("plus", 2).unwrap();
    let add = g.intern_string("Add");
    g.add_rule("sum", &["sum", "plus", "n"], Translation::Anode { name: add, cost: 0, children: vec![0, 2] }).unwrap();
    g.add_rule("sum", &["n"], Translation::Passthrough(0)).unwrap();
    g.analyze().unwrap();
    g
  }

  #[test]
  fn builds_left_nested_anode_chain() {
    let mut g = sum_grammar();
    let cfg = g.config().clone();
    let mut reader = VecReader { codes: vec![1, 2, 1, 2, 1].into_iter() };
    let (list, outcome) = drive(&mut g, &cfg, &mut reader).unwrap();
    assert!(outcome.accepted);
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let (root, ambiguous) = build(&g, &list, &cfg, &mut owner);
    assert!(!ambiguous);
    match &arena[root.index()] {
      TranslationNode::Anode { children, .. } => {
        assert_eq!(children.len(), 2);
        assert!(matches!(arena[children[1].index()], TranslationNode::Term { code: 1, attr: 1 }));
      }
      other => panic!("expected Anode, got {other:?}"),
    }
  }

  #[test]
  fn ambiguous_grammar_sets_flag_and_builds_alt_chain() {
    let mut g = Grammar::new();
    g.intern_terminal("n", 1).unwrap();
    let cat = g.intern_string("Cat");
    g.add_rule("e", &["e", "e"], Translation::Anode { name: cat, cost: 0, children: vec![0, 1] }).unwrap();
    g.add_rule("e", &["n"], Translation::Passthrough(0)).unwrap();
    g.analyze().unwrap();
    let cfg = g.config().clone();
    let mut reader = VecReader { codes: vec![1, 1, 1].into_iter() };
    let (list, outcome) = drive(&mut g, &cfg, &mut reader).unwrap();
    assert!(outcome.accepted);
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let (root, ambiguous) = build(&g, &list, &cfg, &mut owner);
    assert!(ambiguous);
    assert!(matches!(arena[root.index()], TranslationNode::Alt { .. }));
  }

  #[test]
  fn one_parse_flag_still_reports_ambiguous_without_alt_chain() {
    let mut g = Grammar::new();
    g.intern_terminal("n", 1).unwrap();
    let cat = g.intern_string("Cat");
    g.add_rule("e", &["e", "e"], Translation::Anode { name: cat, cost: 0, children: vec![0, 1] }).unwrap();
    g.add_rule("e", &["n"], Translation::Passthrough(0)).unwrap();
    g.analyze().unwrap();
    let cfg = g.config().clone().with_one_parse(true);
    let mut reader = VecReader { codes: vec![1, 1, 1].into_iter() };
    let (list, outcome) = drive(&mut g, &cfg, &mut reader).unwrap();
    assert!(outcome.accepted);
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let (root, ambiguous) = build(&g, &list, &cfg, &mut owner);
    assert!(ambiguous);
    assert!(!matches!(arena[root.index()], TranslationNode::Alt { .. }));
  }

  #[test]
  fn nullable_rule_produces_shared_nil() {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    g.add_rule("s", &["opt", "a"], Translation::Passthrough(1)).unwrap();
    g.add_rule("opt", &[], Translation::Empty).unwrap();
    g.analyze().unwrap();
    let cfg = g.config().clone();
    let mut reader = VecReader { codes: vec![1].into_iter() };
    let (list, outcome) = drive(&mut g, &cfg, &mut reader).unwrap();
    assert!(outcome.accepted);
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let (root, _) = build(&g, &list, &cfg, &mut owner);
    assert!(matches!(arena[root.index()], TranslationNode::Term { code: 1, .. }));
  }
}
