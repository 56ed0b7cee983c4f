//! Explicit translation-tree teardown.
//!
//! Per §3's Lifecycles, translation nodes are never individually freed —
//! they live in a bulk-freed [Arena] — but the caller's terminal attributes
//! (arbitrary opaque payloads attached to `Term` nodes) need their own
//! release hook. `free_tree` walks the DAG once, in post-order with a
//! visited set so a node shared by more than one parent (the whole point of
//! a packed forest) is only ever reported to the callback once, then bulk
//! frees the arena.

use yaep_core::{Arena, NodeId, TranslationNode};

/// Walks every node reachable from `root` in `arena`, invoking
/// `on_terminal(code, attr)` exactly once per distinct `Term` node, then
/// bulk-frees `arena`. Pass `|_, _| {}` when terminal attributes need no
/// release step.
pub fn free_tree<A: Clone>(arena: &mut Arena<TranslationNode<A>>, root: NodeId, mut on_terminal: impl FnMut(u32, A)) {
  let mut visited = vec![false; arena.len()];
  let mut stack = vec![root];
  while let Some(id) = stack.pop() {
    let idx = id.index();
    if idx >= visited.len() || visited[idx] {
      continue;
    }
    visited[idx] = true;
    match &arena[idx] {
      TranslationNode::Term { code, attr } => on_terminal(*code, attr.clone()),
      TranslationNode::Anode { children, .. } => stack.extend(children.iter().copied()),
      TranslationNode::Alt { node, next } => {
        stack.push(*node);
        if let Some(n) = next {
          stack.push(*n);
        }
      }
      TranslationNode::Nil | TranslationNode::Error => {}
    }
  }
  arena.free_all();
}

#[cfg(test)]
mod tests {
  use super::*;
  use yaep_core::{Grammar, Token, TokenReader, Translation, TranslationOwner};

  struct VecReader {
    codes: std::vec::IntoIter<u32>,
  }

  impl TokenReader<u32> for VecReader {
    fn next_token(&mut self) -> Option<Token<u32>> {
      self.codes.next().map(|code| Token { code, attr: code })
    }
  }

  #[test]
  fn visits_each_shared_terminal_once() {
    // `e : e e | n ;` over "n n n" is ambiguous (two groupings of the same
    // three terminals); every position's `Term` node is memoized once and
    // shared across both derivations' `Alt` chain, so a correct traversal
    // must report exactly the three underlying terminals, not more.
    let mut g = Grammar::new();
    g.intern_terminal("n", 1).unwrap();
    let cat = g.intern_string("Cat");
    g.add_rule("e", &["e", "e"], Translation::Anode { name: cat, cost: 0, children: vec![0, 1] }).unwrap();
    g.add_rule("e", &["n"], Translation::Passthrough(0)).unwrap();
    g.analyze().unwrap();
    let mut reader = VecReader { codes: vec![1, 1, 1].into_iter() };
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let outcome = crate::parse(&mut g, &mut reader, &mut |_| {}, &mut owner).unwrap();
    assert!(outcome.ambiguous);
    let mut seen = Vec::new();
    free_tree(&mut arena, outcome.root, |code, attr| seen.push((code, attr)));
    assert_eq!(seen, vec![(1, 1); 3]);
    assert_eq!(arena.len(), 0);
  }
}
