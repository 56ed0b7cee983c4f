//! S2 (arithmetic, ambiguous without one-parse): terminals PLUS=43, STAR=42;
//! rules `E : E PLUS E # Add(0 2) | E STAR E # Mul(0 2) | 'a' #;`, input
//! "aPLUSaSTARa". Expected: with `one_parse=0` the result is ambiguous (two
//! parses: left-grouped vs right-grouped) and the `Alt` chain at the top has
//! exactly two alternatives; with `one_parse=1` the ambiguous flag is still
//! set but exactly one DAG is returned.

use crate::utils::VecReader;
use yaep::{Arena, Grammar, ParserConfig, Translation, TranslationNode, TranslationOwner};

const PLUS: u32 = 43;
const STAR: u32 = 42;
const A: u32 = 1;

fn grammar(config: ParserConfig) -> Grammar {
  let mut g = Grammar::with_config(config);
  g.intern_terminal("a", A).unwrap();
  g.intern_terminal("plus", PLUS).unwrap();
  g.intern_terminal("star", STAR).unwrap();
  let add = g.intern_string("Add");
  let mul = g.intern_string("Mul");
  g.add_rule("E", &["E", "plus", "E"], Translation::Anode { name: add, cost: 0, children: vec![0, 2] }).unwrap();
  g.add_rule("E", &["E", "star", "E"], Translation::Anode { name: mul, cost: 0, children: vec![0, 2] }).unwrap();
  g.add_rule("E", &["a"], Translation::Passthrough(0)).unwrap();
  g.analyze().unwrap();
  g
}

fn alt_len<A2: Clone>(arena: &Arena<TranslationNode<A2>>, root: yaep::NodeId) -> usize {
  match &arena[root.index()] {
    TranslationNode::Alt { next: Some(n), .. } => 1 + alt_len(arena, *n),
    TranslationNode::Alt { next: None, .. } => 1,
    _ => 1,
  }
}

#[test]
fn full_forest_is_ambiguous_with_two_alternatives() {
  let mut g = grammar(ParserConfig::new());
  let mut reader = VecReader::new([A, PLUS, A, STAR, A]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
  assert!(outcome.ambiguous);
  assert!(matches!(arena[outcome.root.index()], TranslationNode::Alt { .. }));
  assert_eq!(alt_len(&arena, outcome.root), 2);
}

#[test]
fn one_parse_still_reports_ambiguous_but_returns_single_dag() {
  let mut g = grammar(ParserConfig::new().with_one_parse(true));
  let mut reader = VecReader::new([A, PLUS, A, STAR, A]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
  assert!(outcome.ambiguous);
  assert!(!matches!(arena[outcome.root.index()], TranslationNode::Alt { .. }));
}
