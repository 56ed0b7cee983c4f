//! Rule storage and translation descriptors.

use crate::{
  grammar::SymbolRef,
  types::{Array, IString, NontermId, RuleId},
};

/// Reserved position value denoting the empty translation, surfaced at the
/// public boundary as the `-1` sentinel in a translation index list.
pub const EMPTY_TRANSLATION_INDEX: i32 = -1;

/// How a completed rule's children are assembled into a translation node.
#[derive(Clone, Debug)]
pub enum Translation {
  /// No translation: the rule always contributes `Nil`.
  Empty,
  /// Take the child at RHS position `usize` as the whole translation
  /// ("single-symbol passthrough").
  Passthrough(usize),
  /// Construct `Anode(name, cost, children)` where each child is sourced
  /// from the RHS position named in `children` (or is `Nil` for an entry
  /// equal to [EMPTY_TRANSLATION_INDEX] cast to `usize`, handled by the
  /// caller before construction).
  Anode { name: IString, cost: u32, children: Array<i32> },
}

#[derive(Clone, Debug)]
pub struct Rule {
  pub id: RuleId,
  pub lhs: NontermId,
  pub rhs: Array<SymbolRef>,
  pub translation: Translation,
}

impl Rule {
  pub fn is_empty(&self) -> bool {
    self.rhs.is_empty()
  }
}
