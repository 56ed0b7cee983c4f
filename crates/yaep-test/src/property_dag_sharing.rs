//! Testable property 8 (DAG sharing): identical sub-derivations of the same
//! nonterminal over the same span are built once and shared by reference,
//! not duplicated per parent. Exercises both the `Nil`/`Error` singletons and
//! a genuine `Anode` common-subexpression case (two distinct top-level rules
//! both wrapping the same inner `Sum` derivation).

use crate::utils::VecReader;
use yaep::{Arena, Grammar, Translation, TranslationNode, TranslationOwner};

#[test]
fn shared_subderivation_is_one_node_referenced_twice() {
  let mut g = Grammar::new();
  g.intern_terminal("n", 1).unwrap();
  g.intern_terminal("plus", 2).unwrap();
  let digit = g.intern_string("Digit");
  let sum = g.intern_string("Sum");
  let wrap1 = g.intern_string("Wrap1");
  let wrap2 = g.intern_string("Wrap2");
  // "Top" is the first-declared nonterminal, so it becomes the start symbol.
  g.add_rule("Top", &["Sum"], Translation::Anode { name: wrap1, cost: 0, children: vec![0] }).unwrap();
  g.add_rule("Top", &["Sum"], Translation::Anode { name: wrap2, cost: 0, children: vec![0] }).unwrap();
  g.add_rule("Sum", &["Digit", "plus", "Digit"], Translation::Anode { name: sum, cost: 0, children: vec![0, 2] }).unwrap();
  g.add_rule("Digit", &["n"], Translation::Anode { name: digit, cost: 0, children: vec![0] }).unwrap();
  g.analyze().unwrap();

  let mut reader = VecReader::new([1, 2, 1]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
  assert!(outcome.ambiguous);

  let (first, second) = match &arena[outcome.root.index()] {
    TranslationNode::Alt { node, next: Some(next) } => (*node, *next),
    other => panic!("expected a two-way Alt at the top, got {other:?}"),
  };
  let child_of = |n: yaep::NodeId| match &arena[n.index()] {
    TranslationNode::Anode { children, .. } => children[0],
    other => panic!("expected Anode, got {other:?}"),
  };
  assert_eq!(child_of(first), child_of(second), "both Top alternatives must share the identical Sum node");
}

#[test]
fn nil_and_error_are_arena_singletons() {
  let mut g = Grammar::new();
  g.intern_terminal("n", 1).unwrap();
  let top = g.intern_string("Top");
  g.add_rule("Top", &["opt1", "opt2", "n"], Translation::Anode { name: top, cost: 0, children: vec![0, 1, 2] }).unwrap();
  g.add_rule("opt1", &[], Translation::Empty).unwrap();
  g.add_rule("opt2", &[], Translation::Empty).unwrap();
  g.analyze().unwrap();

  let mut reader = VecReader::new([1]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
  let children = match &arena[outcome.root.index()] {
    TranslationNode::Anode { children, .. } => children.clone(),
    other => panic!("expected Anode, got {other:?}"),
  };
  assert_eq!(children[0], children[1], "two unrelated Nil derivations must collapse to one singleton node");
}
