//! Shared scenario helpers: a `Vec<u32>`-backed [TokenReader] and an
//! s-expression renderer for translation DAGs, used to assert tree shape
//! without depending on internal node-id values.

#![allow(dead_code)]

use yaep::{Arena, NodeId, Token, TokenReader, TranslationNode};

pub struct VecReader {
  codes: std::vec::IntoIter<u32>,
}

impl VecReader {
  pub fn new(codes: impl IntoIterator<Item = u32>) -> Self {
    Self { codes: codes.into_iter().collect::<Vec<_>>().into_iter() }
  }
}

impl TokenReader<u32> for VecReader {
  fn next_token(&mut self) -> Option<Token<u32>> {
    self.codes.next().map(|code| Token { code, attr: code })
  }
}

/// Renders a translation DAG as an s-expression: `Term(code)`, `Nil`,
/// `Error`, `Name[child child ...]` for an `Anode`, and `(alt | alt | ...)`
/// for an `Alt` chain. Used by scenario tests to assert tree shape without
/// depending on raw node-id values, which are an implementation detail of
/// arena insertion order.
pub fn render(arena: &Arena<TranslationNode<u32>>, node: NodeId, names: &dyn Fn(yaep::IString) -> String) -> String {
  match &arena[node.index()] {
    TranslationNode::Nil => "Nil".to_string(),
    TranslationNode::Error => "Error".to_string(),
    TranslationNode::Term { code, .. } => format!("Term({code})"),
    TranslationNode::Anode { name, children, .. } => {
      let child_strs: Vec<String> = children.iter().map(|&c| render(arena, c, names)).collect();
      format!("{}[{}]", names(*name), child_strs.join(" "))
    }
    TranslationNode::Alt { node: first, next } => {
      let mut parts = vec![render(arena, *first, names)];
      let mut cur = *next;
      while let Some(n) = cur {
        match &arena[n.index()] {
          TranslationNode::Alt { node, next } => {
            parts.push(render(arena, *node, names));
            cur = *next;
          }
          _ => {
            parts.push(render(arena, n, names));
            break;
          }
        }
      }
      format!("({})", parts.join(" | "))
    }
  }
}
