//! Testable property 5 (lookahead-level transparency). `LookaheadLevel`
//! narrows which predictions the closure keeps around (`driver.rs`'s
//! `predicted_context`, fed by `analysis.rs`'s `static_context_for`), but it
//! must never change what a grammar accepts or how an unambiguous derivation
//! is shaped — only how much of the search space gets pruned along the way.
//! None of the other scenarios or properties ever set `lookahead_level`
//! above its `None` default, so this is the only place the Static (L=1) and
//! Dynamic (L=2) analysis paths run end-to-end.

use crate::utils::{render, VecReader};
use yaep::{Arena, Grammar, LookaheadLevel, ParserConfig, Translation, TranslationNode, TranslationOwner};

const LEVELS: [i32; 3] = [0, 1, 2];

fn balanced_brackets(level: i32) -> Grammar {
  let mut g = Grammar::with_config(ParserConfig::new().with_lookahead_level(level));
  g.intern_terminal("a", 1).unwrap();
  g.intern_terminal("b", 2).unwrap();
  let s_name = g.intern_string("S");
  g.add_rule("S", &["a", "S", "b"], Translation::Anode { name: s_name, cost: 0, children: vec![0, 1, 2] }).unwrap();
  g.add_rule("S", &[], Translation::Anode { name: s_name, cost: 0, children: vec![] }).unwrap();
  g.analyze().unwrap();
  g
}

fn render_shape(g: &Grammar, arena: &Arena<TranslationNode<u32>>, node: yaep::NodeId) -> String {
  let names = |istr: yaep::IString| istr.as_str(g.string_store()).to_string();
  render(arena, node, &names)
}

#[test]
fn lookahead_level_clamps_to_the_same_enum_every_scenario_relies_on() {
  assert_eq!(ParserConfig::new().with_lookahead_level(0).lookahead_level, LookaheadLevel::None);
  assert_eq!(ParserConfig::new().with_lookahead_level(1).lookahead_level, LookaheadLevel::Static);
  assert_eq!(ParserConfig::new().with_lookahead_level(2).lookahead_level, LookaheadLevel::Dynamic);
}

#[test]
fn balanced_brackets_accept_identically_at_every_lookahead_level() {
  let mut shapes = Vec::new();
  for &level in &LEVELS {
    let mut g = balanced_brackets(level);
    let mut reader = VecReader::new([1, 1, 2, 2]);
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
    assert!(!outcome.ambiguous);
    shapes.push(render_shape(&g, &arena, outcome.root));
  }
  assert!(shapes.iter().all(|s| s == &shapes[0]), "shapes diverged across lookahead levels: {shapes:?}");
}

#[test]
fn unbalanced_input_is_rejected_at_every_lookahead_level() {
  for &level in &LEVELS {
    let mut g = balanced_brackets(level);
    let mut reader = VecReader::new([1, 2, 2]);
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let mut errors = Vec::new();
    let result = yaep::parse(&mut g, &mut reader, &mut |info| errors.push(info), &mut owner);
    assert!(result.is_err(), "level {level:?} unexpectedly accepted unbalanced input");
    assert_eq!(errors.len(), 1);
  }
}

/// `S : A c | B d ;`, `A : a ;`, `B : a ;` — two rules for `S` share an
/// identical-looking first terminal through distinct nonterminals, so a
/// static or dynamic context actually has to distinguish `S -> A c` from
/// `S -> B d` by what follows, not just by what's predicted first.
fn diverging_prefixes(level: i32) -> Grammar {
  let mut g = Grammar::with_config(ParserConfig::new().with_lookahead_level(level));
  g.intern_terminal("a", 1).unwrap();
  g.intern_terminal("c", 2).unwrap();
  g.intern_terminal("d", 3).unwrap();
  g.add_rule("A", &["a"], Translation::Passthrough(0)).unwrap();
  g.add_rule("B", &["a"], Translation::Passthrough(0)).unwrap();
  g.add_rule("S", &["A", "c"], Translation::Passthrough(0)).unwrap();
  g.add_rule("S", &["B", "d"], Translation::Passthrough(0)).unwrap();
  g.analyze().unwrap();
  g
}

#[test]
fn diverging_prefixes_resolve_the_same_way_at_every_lookahead_level() {
  for &level in &LEVELS {
    let mut g = diverging_prefixes(level);
    let mut reader = VecReader::new([1, 2]);
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
    assert!(!outcome.ambiguous, "level {level:?} unexpectedly reported ambiguity");

    let mut g2 = diverging_prefixes(level);
    let mut reader2 = VecReader::new([1, 3]);
    let mut arena2 = Arena::new();
    let mut owner2 = TranslationOwner::Scratch(&mut arena2);
    let outcome2 = yaep::parse(&mut g2, &mut reader2, &mut |_| panic!("no syntax error expected"), &mut owner2).unwrap();
    assert!(!outcome2.ambiguous, "level {level:?} unexpectedly reported ambiguity");
  }
}

#[test]
fn ambiguous_arithmetic_keeps_two_alternatives_at_every_lookahead_level() {
  const PLUS: u32 = 43;
  const STAR: u32 = 42;
  const A: u32 = 1;

  fn alt_len<Attr: Clone>(arena: &Arena<TranslationNode<Attr>>, root: yaep::NodeId) -> usize {
    match &arena[root.index()] {
      TranslationNode::Alt { next: Some(n), .. } => 1 + alt_len(arena, *n),
      TranslationNode::Alt { next: None, .. } => 1,
      _ => 1,
    }
  }

  for &level in &LEVELS {
    let mut g = Grammar::with_config(ParserConfig::new().with_lookahead_level(level));
    g.intern_terminal("a", A).unwrap();
    g.intern_terminal("plus", PLUS).unwrap();
    g.intern_terminal("star", STAR).unwrap();
    let add = g.intern_string("Add");
    let mul = g.intern_string("Mul");
    g.add_rule("E", &["E", "plus", "E"], Translation::Anode { name: add, cost: 0, children: vec![0, 2] }).unwrap();
    g.add_rule("E", &["E", "star", "E"], Translation::Anode { name: mul, cost: 0, children: vec![0, 2] }).unwrap();
    g.add_rule("E", &["a"], Translation::Passthrough(0)).unwrap();
    g.analyze().unwrap();

    let mut reader = VecReader::new([A, PLUS, A, STAR, A]);
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
    assert!(outcome.ambiguous);
    assert_eq!(alt_len(&arena, outcome.root), 2, "level {level:?} produced a different alternative count");
  }
}
