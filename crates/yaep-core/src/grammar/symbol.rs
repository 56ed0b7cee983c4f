//! Interned terminals and nonterminals.

use crate::types::{Array, Bitset, IString, NontermId, RuleId, TermId};

/// A reference to either kind of symbol, as stored in a rule's RHS.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolRef {
  Term(TermId),
  Nonterm(NontermId),
}

impl SymbolRef {
  pub fn as_term(&self) -> Option<TermId> {
    match self {
      SymbolRef::Term(t) => Some(*t),
      SymbolRef::Nonterm(_) => None,
    }
  }

  pub fn as_nonterm(&self) -> Option<NontermId> {
    match self {
      SymbolRef::Nonterm(n) => Some(*n),
      SymbolRef::Term(_) => None,
    }
  }

  pub fn is_term(&self) -> bool {
    matches!(self, SymbolRef::Term(_))
  }
}

/// A terminal: a dense id, a printable name, and the arbitrary nonnegative
/// "code" exposed to the token reader callback.
#[derive(Clone, Debug)]
pub struct Terminal {
  pub id: TermId,
  pub name: IString,
  pub code: u32,
}

/// A nonterminal: a dense id, a printable name, its rule list, and the
/// FIRST/FOLLOW bitsets plus accessible/derivable/nullable flags computed
/// once by grammar analysis.
#[derive(Clone, Debug)]
pub struct Nonterminal {
  pub id: NontermId,
  pub name: IString,
  pub rules: Array<RuleId>,
  pub first: Bitset,
  pub follow: Bitset,
  pub accessible: bool,
  pub derivable: bool,
  pub nullable: bool,
}

impl Nonterminal {
  pub fn new(id: NontermId, name: IString) -> Self {
    Self {
      id,
      name,
      rules: Array::new(),
      first: Bitset::new(),
      follow: Bitset::new(),
      accessible: false,
      derivable: false,
      nullable: false,
    }
  }
}
