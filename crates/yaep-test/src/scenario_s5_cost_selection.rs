//! S5 (cost selection): ambiguous grammar where two derivations differ only
//! in Anode cost (5 vs 7) with cost flag on. Expected: the returned DAG
//! contains only the cost-5 derivation; its root Anode cost equals 5 plus
//! children sums.

use crate::utils::VecReader;
use yaep::{Arena, Grammar, ParserConfig, Translation, TranslationNode, TranslationOwner};

#[test]
fn only_minimum_cost_derivation_survives() {
  let mut g = Grammar::with_config(ParserConfig::new().with_cost(true));
  g.intern_terminal("n", 1).unwrap();
  g.add_rule("sum", &["n"], Translation::Passthrough(0)).unwrap();
  let fast = g.intern_string("Fast");
  let slow = g.intern_string("Slow");
  g.add_rule("expr", &["sum"], Translation::Anode { name: fast, cost: 5, children: vec![0] }).unwrap();
  g.add_rule("expr", &["sum"], Translation::Anode { name: slow, cost: 7, children: vec![0] }).unwrap();
  g.analyze().unwrap();

  let mut reader = VecReader::new([1]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
  match &arena[outcome.root.index()] {
    TranslationNode::Anode { name, cost, .. } => {
      assert_eq!(name.as_str(g.string_store()), "Fast");
      assert_eq!(*cost, 5);
    }
    other => panic!("expected Anode, got {other:?}"),
  }
  assert!(!matches!(arena[outcome.root.index()], TranslationNode::Alt { .. }));
}
