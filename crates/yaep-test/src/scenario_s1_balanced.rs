//! S1 (balanced): `S : 'a' S 'b' | ;`, input "aabb". Expected: accept,
//! unambiguous, tree shape `S[a S[a S[] b] b]`.

use crate::utils::{render, VecReader};
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
fn accepts_and_builds_exact_shape() {
  let mut g = grammar();
  let mut reader = VecReader::new([1, 1, 2, 2]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
  assert!(!outcome.ambiguous);
  let names = |istr: yaep::IString| istr.as_str(g.string_store()).to_string();
  assert_eq!(render(&arena, outcome.root, &names), "S[Term(1) S[Term(1) S[] Term(2)] Term(2)]");
}

#[test]
fn rejects_unbalanced_input() {
  let mut g = grammar();
  let mut reader = VecReader::new([1, 2, 2]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let mut errors = Vec::new();
  let result = yaep::parse(&mut g, &mut reader, &mut |info| errors.push(info), &mut owner);
  assert!(result.is_err());
  assert_eq!(errors.len(), 1);
}
