//! S3 (right-recursive, Leo): `A : 'a' A | 'a' ;`, input "aaaa…a" (length
//! 10000). Expected: parse completes (linear in input thanks to the Leo
//! shortcut, rather than the O(n^3) a naive right-recursive Earley parse
//! would take), accepts, no ambiguity.

use crate::utils::VecReader;
use yaep::{Arena, Grammar, Translation, TranslationOwner};

#[test]
fn accepts_long_right_recursive_chain_without_ambiguity() {
  let mut g = Grammar::new();
  g.intern_terminal("a", 1).unwrap();
  g.add_rule("A", &["a", "A"], Translation::Passthrough(1)).unwrap();
  g.add_rule("A", &["a"], Translation::Passthrough(0)).unwrap();
  g.analyze().unwrap();

  let mut reader = VecReader::new(std::iter::repeat(1u32).take(10_000));
  let mut arena = Arena::new();
  let mut owner = TranslationOwner::Scratch(&mut arena);
  let outcome = yaep::parse(&mut g, &mut reader, &mut |_| panic!("no syntax error expected"), &mut owner).unwrap();
  assert!(!outcome.ambiguous);
}
