//! Testable property 7 (bounded allocation): nothing from one parse survives
//! into the next unless the caller explicitly asks for it. Repeatedly parsing
//! into the same arena and freeing the tree after each call keeps the arena
//! empty between calls — if any per-parse state leaked into the persistent
//! arena, the length would grow without bound across iterations.

use crate::utils::VecReader;
use yaep::{Arena, Grammar, Translation, TranslationOwner};

fn grammar() -> Grammar {
  let mut g = Grammar::new();
  g.intern_terminal("a", 1).unwrap();
  g.intern_terminal("b", 2).unwrap();
  let s_name = g.intern_string("S");
  g.add_rule("S", &["a", "S", "b"], Translation::Anode { name: s_name, cost: 0, children: vec![0, 1, 2] }).unwrap();
  g.add_rule("S", &[], Translation::Anode { name: s_name, cost: 0, children: vec![] }).unwrap();
  g.analyze().unwrap();
  g
}

#[test]
fn repeated_parses_leave_no_residue_between_calls() {
  let mut g = grammar();
  let mut arena = Arena::new();
  for depth in 0..50 {
    let mut tokens = Vec::with_capacity(depth * 2);
    tokens.extend(std::iter::repeat(1u32).take(depth));
    tokens.extend(std::iter::repeat(2u32).take(depth));
    let mut reader = VecReader::new(tokens);
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
    assert!(!outcome.ambiguous);
    yaep::free_tree(&mut arena, outcome.root, |_, _| {});
    assert_eq!(arena.len(), 0, "translation arena must return to empty after freeing each parse's tree");
  }
}

#[test]
fn persistent_owner_retains_tree_until_explicitly_freed() {
  let mut g = grammar();
  let mut arena = Arena::new();
  let outcome = {
    let mut reader = VecReader::new([1, 2]);
    let mut owner = TranslationOwner::Persistent(&mut arena);
    yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap()
  };
  assert!(arena.len() > 0, "persistent owner must keep nodes alive past the parse call");
  yaep::free_tree(&mut arena, outcome.root, |_, _| {});
  assert_eq!(arena.len(), 0);
}
