//! The public parse entrypoint: drives the Earley recognizer (with bounded
//! error recovery, when configured) to completion over one frozen grammar,
//! then projects the result into a translation DAG.

use yaep_core::{
  build_translation, Grammar, NodeId, SyntaxErrorInfo, TokenReader, TranslationNode, TranslationOwner, YaepError, YaepResult,
};

/// Result of a successful [parse]: the translation DAG's root, and whether
/// more than one derivation was found for any span (set even when
/// `one_parse` suppressed building the `Alt` chain that would otherwise
/// represent it).
#[derive(Clone, Copy, Debug)]
pub struct ParseOutcome {
  pub root: NodeId,
  pub ambiguous: bool,
}

/// Parses `reader`'s token stream against `grammar`, which must already be
/// frozen (via [Grammar::analyze]). `on_syntax_error` is invoked exactly
/// once if and only if a syntax error was encountered, whether or not
/// recovery was attempted or succeeded (see
/// [SyntaxErrorInfo](yaep_core::SyntaxErrorInfo)).
///
/// `owner` selects where translation nodes live: a [TranslationOwner::Scratch]
/// arena is torn down with the rest of this call's per-parse state once the
/// caller drops it, while a [TranslationOwner::Persistent] arena (and
/// therefore the tree built into it) outlives the call. Per §3's Lifecycles,
/// nothing about `parse` itself frees the arena; that is [crate::free_tree]'s
/// job once the caller is done with the tree.
///
/// On failure the grammar's `error_code()`/`error_message()` are updated to
/// reflect the failure before it is returned, matching the per-grammar
/// error-reporting contract of the original C API this crate's surface is
/// modeled on.
pub fn parse<A: Clone>(
  grammar: &mut Grammar,
  reader: &mut dyn TokenReader<A>,
  on_syntax_error: &mut dyn FnMut(SyntaxErrorInfo),
  owner: &mut TranslationOwner<'_, TranslationNode<A>>,
) -> YaepResult<ParseOutcome> {
  if !grammar.is_frozen() || !grammar.is_valid() {
    let err = YaepError::UndefinedOrBadGrammar { detail: "parse attempted before a successful Grammar::analyze()".into() };
    grammar.record_error(err.clone());
    return Err(err);
  }
  let config = grammar.config().clone();
  let (list, outcome) = match yaep_core::parse(grammar, &config, reader, on_syntax_error) {
    Ok(pair) => pair,
    Err(err) => {
      grammar.record_error(err.clone());
      return Err(err);
    }
  };
  debug_assert!(outcome.accepted, "yaep_core::parse only returns Ok on acceptance");
  let (root, ambiguous) = build_translation(grammar, &list, &config, owner);
  Ok(ParseOutcome { root, ambiguous })
}

#[cfg(test)]
mod tests {
  use super::*;
  use yaep_core::{Arena, Token, Translation};

  struct VecReader {
    codes: std::vec::IntoIter<u32>,
  }

  impl TokenReader<()> for VecReader {
    fn next_token(&mut self) -> Option<Token<()>> {
      self.codes.next().map(|code| Token { code, attr: () })
    }
  }

  #[test]
  fn parse_before_analyze_is_rejected() {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    g.add_rule("s", &["a"], Translation::Empty).unwrap();
    let mut reader = VecReader { codes: vec![1].into_iter() };
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let err = parse(&mut g, &mut reader, &mut |_| {}, &mut owner).unwrap_err();
    assert_eq!(err.code(), yaep_core::ErrorCode::UndefinedOrBadGrammar);
    assert_eq!(g.error_code(), yaep_core::ErrorCode::UndefinedOrBadGrammar);
  }

  #[test]
  fn accepts_and_builds_tree() {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    g.add_rule("s", &["a"], Translation::Passthrough(0)).unwrap();
    g.analyze().unwrap();
    let mut reader = VecReader { codes: vec![1].into_iter() };
    let mut arena = Arena::new();
    let mut owner = TranslationOwner::Scratch(&mut arena);
    let outcome = parse(&mut g, &mut reader, &mut |_| {}, &mut owner).unwrap();
    assert!(!outcome.ambiguous);
    assert!(matches!(arena[outcome.root.index()], TranslationNode::Term { code: 1, .. }));
  }
}
