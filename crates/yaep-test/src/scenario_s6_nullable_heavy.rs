//! S6 (nullable-heavy): ten nonterminals, each deriving either the empty
//! string or a single terminal, combined by a start rule requiring all ten in
//! sequence. Input is empty. Expected: accept, and every nullable subnode
//! collapses to the single shared `Nil` node (there is exactly one `Nil`
//! entry in the arena once the tree is built).

use crate::utils::VecReader;
use yaep::{Arena, Grammar, Translation, TranslationNode, TranslationOwner};

const COUNT: usize = 10;

#[test]
fn all_nullable_children_share_one_nil_node() {
  let mut g = Grammar::new();
  let start_name = g.intern_string("Start");
  let mut rhs_names = Vec::with_capacity(COUNT);
  for i in 0..COUNT {
    let term = format!("t{i}");
    g.intern_terminal(&term, (i + 1) as u32).unwrap();
    rhs_names.push(format!("n{i}"));
  }
  let rhs: Vec<&str> = rhs_names.iter().map(String::as_str).collect();
  g.add_rule("Start", &rhs, Translation::Anode { name: start_name, cost: 0, children: (0..COUNT as i32).collect() }).unwrap();
  for (i, name) in rhs_names.iter().enumerate() {
    let term = format!("t{i}");
    g.add_rule(name, &[], Translation::Empty).unwrap();
    g.add_rule(name, &[term.as_str()], Translation::Passthrough(0)).unwrap();
  }
  g.analyze().unwrap();

  let mut reader = VecReader::new(std::iter::empty());
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
  assert!(!outcome.ambiguous);

  match &arena[outcome.root.index()] {
    TranslationNode::Anode { children, .. } => {
      assert_eq!(children.len(), COUNT);
      for &c in children {
        assert!(matches!(arena[c.index()], TranslationNode::Nil));
      }
    }
    other => panic!("expected Anode, got {other:?}"),
  }
  let nil_count = (0..arena.len()).filter(|&i| matches!(arena[i], TranslationNode::Nil)).count();
  assert_eq!(nil_count, 1);
}
