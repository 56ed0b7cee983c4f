//! Static grammar analysis: reachability, derivability, the self-derivation
//! loop check, nullability, FIRST/FOLLOW, and per-(rule, dot) static
//! lookahead contexts. Runs once, during [Grammar::analyze], and populates
//! the flags and bitsets consumed by the Earley driver.

use crate::{
  grammar::{Grammar, SymbolRef},
  types::{Bitset, ContextId, RuleId, Set, YaepError, YaepResult},
};

/// Computes FIRST(rhs[dot..]), unioned with FOLLOW(lhs) when that suffix is
/// entirely nullable, and interns the result as a static lookahead context.
pub(crate) fn static_context_for(grammar: &mut Grammar, rule: RuleId, dot: usize) -> ContextId {
  let (lhs, suffix_nullable, mut bitset) = {
    let r = grammar.rule(rule);
    let lhs = r.lhs;
    let mut bitset = Bitset::new();
    let mut nullable_so_far = true;
    for sym in &r.rhs[dot..] {
      match sym {
        SymbolRef::Term(t) => {
          bitset.set(t.index());
          nullable_so_far = false;
          break;
        }
        SymbolRef::Nonterm(nt) => {
          bitset.union_with(&grammar.nonterm(*nt).first);
          if !grammar.nonterm(*nt).nullable {
            nullable_so_far = false;
            break;
          }
        }
      }
    }
    (lhs, nullable_so_far, bitset)
  };
  if suffix_nullable {
    let follow = grammar.nonterm(lhs).follow.clone();
    bitset.union_with(&follow);
  }
  grammar.intern_context(bitset)
}

pub(super) fn analyze(grammar: &mut Grammar) -> YaepResult<()> {
  let start = std::time::Instant::now();

  mark_reachable(grammar)?;
  let accessible = grammar.nonterminals().iter().filter(|n| n.accessible).count();
  let elapsed = start.elapsed();
  grammar.journal_mut().record("reachability", || format!("{accessible} accessible nonterminal(s), {elapsed:?} elapsed"));

  mark_derivable(grammar)?;
  let derivable = grammar.nonterminals().iter().filter(|n| n.derivable).count();
  grammar.journal_mut().record("derivability", || format!("{derivable} derivable nonterminal(s)"));

  compute_nullable(grammar);
  let nullable = grammar.nonterminals().iter().filter(|n| n.nullable).count();
  grammar.journal_mut().record("nullable_closure", || format!("{nullable} nullable nonterminal(s)"));

  check_loops(grammar)?;
  grammar.journal_mut().record("loop_check", || "no self-derivation (N =>+ N) cycles found".to_string());

  compute_first_follow(grammar);
  let total_elapsed = start.elapsed();
  grammar.journal_mut().record("first_follow", || format!("FIRST/FOLLOW fixpoint converged, {total_elapsed:?} total analysis time"));

  Ok(())
}

/// Worklist closure from the start symbol over every rule's RHS
/// nonterminals. A nonterminal left unmarked is either silently dropped from
/// further analysis, or rejected outright when `strict_reachability` is set.
fn mark_reachable(grammar: &mut Grammar) -> YaepResult<()> {
  let start = grammar.start_nonterm();
  let mut seen = Set::new();
  let mut stack = vec![start];
  seen.insert(start);
  while let Some(nonterm) = stack.pop() {
    let rule_ids = grammar.nonterm(nonterm).rules.clone();
    for rule_id in rule_ids {
      for sym in &grammar.rule(rule_id).rhs {
        if let SymbolRef::Nonterm(next) = sym {
          if seen.insert(*next) {
            stack.push(*next);
          }
        }
      }
    }
  }
  let strict = grammar.config().strict_reachability;
  for nonterm in grammar.nonterminals_mut() {
    nonterm.accessible = seen.contains(&nonterm.id);
  }
  if strict {
    for nonterm in grammar.nonterminals() {
      if !nonterm.accessible {
        let name = grammar.nonterm_name(nonterm.id).to_string();
        return Err(YaepError::UnreachableNonterminal { name });
      }
    }
  }
  Ok(())
}

/// Fixpoint over "N derives some terminal string": a nonterminal is
/// derivable once it has a rule whose every RHS symbol is either a terminal
/// or an already-derivable nonterminal (including the empty rule, vacuously).
fn mark_derivable(grammar: &mut Grammar) -> YaepResult<()> {
  let n = grammar.nonterminals().len();
  let mut derivable = vec![false; n];
  let mut changed = true;
  while changed {
    changed = false;
    for idx in 0..n {
      if derivable[idx] {
        continue;
      }
      let rule_ids = grammar.nonterminals()[idx].rules.clone();
      let ok = rule_ids.iter().any(|&rid| {
        grammar.rule(rid).rhs.iter().all(|sym| match sym {
          SymbolRef::Term(_) => true,
          SymbolRef::Nonterm(nt) => derivable[nt.index()],
        })
      });
      if ok {
        derivable[idx] = true;
        changed = true;
      }
    }
  }
  for (idx, nonterm) in grammar.nonterminals_mut().iter_mut().enumerate() {
    nonterm.derivable = derivable[idx];
  }
  for nonterm in grammar.nonterminals() {
    if nonterm.accessible && !nonterm.derivable {
      let name = grammar.nonterm_name(nonterm.id).to_string();
      return Err(YaepError::NonderivableNonterminal { name });
    }
  }
  Ok(())
}

/// Rejects any nonterminal that derives itself through a chain of
/// unit-derivation edges (`N ⇒+ N`), which would make the Earley completer
/// loop forever re-adding the same item. Requires [compute_nullable] to have
/// already run: a rule `N -> ... M ...` is a unit-derivation edge `N -> M`
/// whenever every RHS symbol other than `M` is nullable, since the Earley
/// closure can then advance past the whole rule on zero input, the same as a
/// plain `N -> M` unit rule.
fn check_loops(grammar: &Grammar) -> YaepResult<()> {
  let n = grammar.nonterminals().len();
  let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
  for rule in grammar.rules() {
    for (pos, sym) in rule.rhs.iter().enumerate() {
      let SymbolRef::Nonterm(target) = sym else { continue };
      let rest_nullable = rule.rhs.iter().enumerate().all(|(other_pos, other_sym)| {
        other_pos == pos
          || match other_sym {
            SymbolRef::Term(_) => false,
            SymbolRef::Nonterm(nt) => grammar.nonterm(*nt).nullable,
          }
      });
      if rest_nullable {
        adj[rule.lhs.index()].push(target.index());
      }
    }
  }
  for start in 0..n {
    let mut stack = vec![start];
    let mut seen = vec![false; n];
    seen[start] = true;
    while let Some(node) = stack.pop() {
      for &next in &adj[node] {
        if next == start {
          let name = grammar.nonterm_name(grammar.nonterminals()[start].id).to_string();
          return Err(YaepError::LoopInGrammar { name });
        }
        if !seen[next] {
          seen[next] = true;
          stack.push(next);
        }
      }
    }
  }
  Ok(())
}

/// Fixpoint over "N can derive the empty string".
fn compute_nullable(grammar: &mut Grammar) {
  let n = grammar.nonterminals().len();
  let mut nullable = vec![false; n];
  let mut changed = true;
  while changed {
    changed = false;
    for idx in 0..n {
      if nullable[idx] {
        continue;
      }
      let rule_ids = grammar.nonterminals()[idx].rules.clone();
      let ok = rule_ids.iter().any(|&rid| {
        grammar.rule(rid).rhs.iter().all(|sym| match sym {
          SymbolRef::Term(_) => false,
          SymbolRef::Nonterm(nt) => nullable[nt.index()],
        })
      });
      if ok {
        nullable[idx] = true;
        changed = true;
      }
    }
  }
  for (idx, nonterm) in grammar.nonterminals_mut().iter_mut().enumerate() {
    nonterm.nullable = nullable[idx];
  }
}

/// Fixpoint over FIRST, then a second fixpoint over FOLLOW seeded by
/// end-of-input on the start symbol. Both are dense [Bitset]s over terminal
/// ids, interned later as static lookahead contexts.
fn compute_first_follow(grammar: &mut Grammar) {
  let n = grammar.nonterminals().len();
  let mut first: Vec<Bitset> = vec![Bitset::new(); n];
  let mut changed = true;
  while changed {
    changed = false;
    for idx in 0..n {
      let rule_ids = grammar.nonterminals()[idx].rules.clone();
      let mut acc = first[idx].clone();
      for rid in rule_ids {
        for sym in &grammar.rule(rid).rhs {
          match sym {
            SymbolRef::Term(t) => {
              acc.set(t.index());
              break;
            }
            SymbolRef::Nonterm(nt) => {
              acc.union_with(&first[nt.index()]);
              if !grammar.nonterminals()[nt.index()].nullable {
                break;
              }
            }
          }
        }
      }
      if acc != first[idx] {
        first[idx] = acc;
        changed = true;
      }
    }
  }

  let mut follow: Vec<Bitset> = vec![Bitset::new(); n];
  let eoi = grammar.eoi_term();
  follow[grammar.start_nonterm().index()].set(eoi.index());

  let mut changed = true;
  while changed {
    changed = false;
    for rule in grammar.rules().to_vec() {
      for (pos, sym) in rule.rhs.iter().enumerate() {
        let SymbolRef::Nonterm(target) = sym else { continue };
        let rest = &rule.rhs[pos + 1..];
        let mut addition = Bitset::new();
        let mut rest_nullable = true;
        for next in rest {
          match next {
            SymbolRef::Term(t) => {
              addition.set(t.index());
              rest_nullable = false;
              break;
            }
            SymbolRef::Nonterm(nt) => {
              addition.union_with(&first[nt.index()]);
              if !grammar.nonterminals()[nt.index()].nullable {
                rest_nullable = false;
                break;
              }
            }
          }
        }
        if rest_nullable {
          let lhs_follow = follow[rule.lhs.index()].clone();
          addition.union_with(&lhs_follow);
        }
        if follow[target.index()].union_with(&addition) {
          changed = true;
        }
      }
    }
  }

  for (idx, nonterm) in grammar.nonterminals_mut().iter_mut().enumerate() {
    nonterm.first = first[idx].clone();
    nonterm.follow = follow[idx].clone();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::Translation;

  #[test]
  fn detects_self_derivation_loop() {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    // A -> B, B -> A: a direct unit-rule cycle.
    g.add_rule("a_rule", &["a"], Translation::Empty).unwrap();
    g.add_rule("looped_a", &["looped_b"], Translation::Passthrough(0)).unwrap();
    g.add_rule("looped_b", &["looped_a"], Translation::Passthrough(0)).unwrap();
    let err = g.analyze().unwrap_err();
    assert_eq!(err.code(), crate::types::ErrorCode::LoopInGrammar);
  }

  #[test]
  fn detects_loop_through_rule_with_nullable_sibling() {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    g.add_rule("a_rule", &["a"], Translation::Empty).unwrap();
    // b -> a_loop c ; c -> (empty), so b -> a_loop is a unit-derivation edge
    // once c's nullability is accounted for, and a_loop -> b closes the loop.
    g.add_rule("c", &[], Translation::Empty).unwrap();
    g.add_rule("b", &["a_loop", "c"], Translation::Passthrough(0)).unwrap();
    g.add_rule("a_loop", &["b"], Translation::Passthrough(0)).unwrap();
    let err = g.analyze().unwrap_err();
    assert_eq!(err.code(), crate::types::ErrorCode::LoopInGrammar);
  }

  #[test]
  fn nullable_and_first_follow_fixpoint() {
    let mut g = Grammar::new();
    g.intern_terminal("x", 1).unwrap();
    // start: s -> a ; a -> x | (empty)
    g.add_rule("start", &["a"], Translation::Passthrough(0)).unwrap();
    g.add_rule("a", &["x"], Translation::Passthrough(0)).unwrap();
    g.add_rule("a", &[], Translation::Empty).unwrap();
    g.analyze().unwrap();
    let a_id = g.find_nonterm("a").unwrap();
    assert!(g.nonterm(a_id).nullable);
    let x_id = g.term_by_code(1).unwrap();
    assert!(g.nonterm(a_id).first.get(x_id.index()));
  }

  #[test]
  fn unreachable_nonterminal_is_dropped_when_lenient() {
    let mut g = Grammar::new();
    g.intern_terminal("x", 1).unwrap();
    g.add_rule("start", &["x"], Translation::Passthrough(0)).unwrap();
    g.add_rule("dead", &["x"], Translation::Passthrough(0)).unwrap();
    g.analyze().unwrap();
    let dead_id = g.find_nonterm("dead").unwrap();
    assert!(!g.nonterm(dead_id).accessible);
  }

  #[test]
  fn unreachable_nonterminal_is_rejected_when_strict() {
    let mut g = Grammar::with_config(crate::types::ParserConfig::new().with_strict_reachability(true));
    g.intern_terminal("x", 1).unwrap();
    g.add_rule("start", &["x"], Translation::Passthrough(0)).unwrap();
    g.add_rule("dead", &["x"], Translation::Passthrough(0)).unwrap();
    let err = g.analyze().unwrap_err();
    assert_eq!(err.code(), crate::types::ErrorCode::UnreachableNonterminal);
  }
}
