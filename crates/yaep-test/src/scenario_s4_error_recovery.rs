//! S4 (recovery): grammar with rule `stmt : 'i' expr ';' | error ';' ;`,
//! input with a malformed expression between two `;`. Expected: one
//! invocation of the syntax-error callback; the ignored-prefix length
//! reported equals the minimum among valid recoveries; translation contains
//! one `Error` node at the `stmt` position.

use crate::utils::VecReader;
use yaep::{Arena, Grammar, ParserConfig, Translation, TranslationNode, TranslationOwner};

const I: u32 = 1;
const N: u32 = 2;
const SEMI: u32 = 3;
const BAD: u32 = 4;

fn grammar() -> Grammar {
  let mut g = Grammar::with_config(ParserConfig::new().with_error_recovery(true).with_recovery_match(1));
  g.intern_terminal("i", I).unwrap();
  g.intern_terminal("n", N).unwrap();
  g.intern_terminal("semi", SEMI).unwrap();
  g.intern_terminal("bad", BAD).unwrap();
  g.add_rule("expr", &["n"], Translation::Passthrough(0)).unwrap();
  g.add_rule("expr", &["error"], Translation::Empty).unwrap();
  let stmt_name = g.intern_string("Stmt");
  g.add_rule("stmt", &["i", "expr", "semi"], Translation::Anode { name: stmt_name, cost: 0, children: vec![1] }).unwrap();
  let prog_name = g.intern_string("Prog");
  g.add_rule("prog", &["stmt", "stmt"], Translation::Anode { name: prog_name, cost: 0, children: vec![0, 1] }).unwrap();
  g.analyze().unwrap();
  g
}

fn count_errors<A: Clone>(arena: &Arena<TranslationNode<A>>, node: yaep::NodeId) -> usize {
  match &arena[node.index()] {
    TranslationNode::Error => 1,
    TranslationNode::Anode { children, .. } => children.iter().map(|&c| count_errors(arena, c)).sum(),
    TranslationNode::Alt { node, next } => count_errors(arena, *node) + next.map(|n| count_errors(arena, n)).unwrap_or(0),
    _ => 0,
  }
}

#[test]
fn recovers_with_minimal_ignored_prefix_and_single_error_node() {
  let mut g = grammar();
  // "i <bad> ;" then "i n ;": the first statement's expression is malformed.
  let mut reader = VecReader::new([I, BAD, SEMI, I, N, SEMI]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let mut errors = Vec::new();
  let outcome = yaep::parse(&mut g, &mut reader, &mut |info| errors.push(info), &mut owner).unwrap();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].first_ignored_token, 1);
  assert_eq!(errors[0].first_recovered_token, 2);
  assert_eq!(count_errors(&arena, outcome.root), 1);
}

#[test]
fn recovery_disabled_surfaces_syntax_error() {
  let mut g = Grammar::with_config(ParserConfig::new().with_error_recovery(false));
  g.intern_terminal("i", I).unwrap();
  g.intern_terminal("n", N).unwrap();
  g.intern_terminal("semi", SEMI).unwrap();
  g.intern_terminal("bad", BAD).unwrap();
  g.add_rule("expr", &["n"], Translation::Passthrough(0)).unwrap();
  g.add_rule("expr", &["error"], Translation::Empty).unwrap();
  g.add_rule("stmt", &["i", "expr", "semi"], Translation::Passthrough(1)).unwrap();
  g.analyze().unwrap();

  let mut reader = VecReader::new([I, BAD, SEMI]);
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let mut errors = Vec::new();
  let result = yaep::parse(&mut g, &mut reader, &mut |info| errors.push(info), &mut owner);
  assert!(result.is_err());
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].first_ignored_token, -1);
  assert_eq!(errors[0].first_recovered_token, -1);
  assert_eq!(g.error_code(), yaep::ErrorCode::SyntaxError);
}
