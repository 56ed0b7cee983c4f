//! Leo's right-recursion optimization: per-parse-set shortcuts that collapse
//! a deterministic completion chain into a single jump.
//!
//! Leo items are rebuilt per parse set after closure, not interned with the
//! core: the same core can carry different Leo items at different positions
//! because the precondition depends on which situations are actually
//! waiting, not just which core shape they share.

use crate::types::{Map, NontermId, SituationId};

#[derive(Clone, Copy, Debug)]
pub struct LeoItem {
  /// The topmost situation in the deterministic completion chain.
  pub topmost: SituationId,
  /// The token position at which that topmost situation originated.
  pub origin: u32,
}

#[derive(Clone, Debug, Default)]
pub struct LeoTable {
  items: Map<NontermId, LeoItem>,
}

impl LeoTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, nonterm: NontermId) -> Option<LeoItem> {
    self.items.get(&nonterm).copied()
  }

  pub fn set(&mut self, nonterm: NontermId, item: LeoItem) {
    self.items.insert(nonterm, item);
  }

  /// Drops the item for `nonterm`, used when a second waiter appears and the
  /// deterministic precondition no longer holds.
  pub fn invalidate(&mut self, nonterm: NontermId) {
    self.items.remove(&nonterm);
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invalidate_removes_installed_item() {
    let mut table = LeoTable::new();
    let n = NontermId::from(3u32);
    table.set(n, LeoItem { topmost: SituationId::from(1u32), origin: 0 });
    assert!(table.get(n).is_some());
    table.invalidate(n);
    assert!(table.get(n).is_none());
  }
}
