//! Testable property 1 (determinism): the same grammar, config, and token
//! stream produce the same result — same acceptance, same ambiguity flag,
//! same rendered shape — no matter how many times the parse is repeated.

use crate::utils::{render, VecReader};
use yaep::{Arena, Grammar, ParserConfig, Translation, TranslationOwner};

fn grammar() -> Grammar {
  let mut g = Grammar::with_config(ParserConfig::new());
  g.intern_terminal("a", 1).unwrap();
  g.intern_terminal("plus", 2).unwrap();
  g.intern_terminal("star", 3).unwrap();
  let add = g.intern_string("Add");
  let mul = g.intern_string("Mul");
  g.add_rule("E", &["E", "plus", "E"], Translation::Anode { name: add, cost: 0, children: vec![0, 2] }).unwrap();
  g.add_rule("E", &["E", "star", "E"], Translation::Anode { name: mul, cost: 0, children: vec![0, 2] }).unwrap();
  g.add_rule("E", &["a"], Translation::Passthrough(0)).unwrap();
  g.analyze().unwrap();
  g
}

fn run_once(g: &mut Grammar) -> (bool, String) {
  let mut reader = VecReader::new([1, 2, 1, 3, 1]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let outcome = yaep::parse(g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
  let names = |istr: yaep::IString| istr.as_str(g.string_store()).to_string();
  (outcome.ambiguous, render(&arena, outcome.root, &names))
}

#[test]
fn repeated_runs_over_the_same_grammar_agree() {
  let mut g = grammar();
  let first = run_once(&mut g);
  for _ in 0..10 {
    assert_eq!(run_once(&mut g), first);
  }
}

#[test]
fn independently_built_grammars_agree() {
  let mut a = grammar();
  let mut b = grammar();
  assert_eq!(run_once(&mut a), run_once(&mut b));
}
