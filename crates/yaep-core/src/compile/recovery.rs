//! Bounded exploratory error recovery.
//!
//! Triggered when [drive] stops short of accepting because some position had
//! no scan successor. Recovery scans every already-closed parse set from 0
//! up to the failure position for situations whose next symbol is the
//! reserved `error` terminal — not just the failure position itself, since
//! the production using `error` as a fallback (`stmt : 'i' expr ';' | error
//! ';'`) is typically predicted at the *start* of the construct that later
//! failed partway through, not at the failure point. For each candidate it
//! tries a bounded search over how many of the following tokens to ignore
//! before resuming ordinary scanning: exactly the "exploratory re-parsing
//! over windowed suffixes" data flow described for this component — each
//! trial rewinds to the candidate's own position and re-drives a (possibly
//! shifted) suffix of the same buffered token vector.
//!
//! Buffering the whole token stream up front (rather than pulling lazily
//! from the caller's [TokenReader] one token at a time) is what makes
//! "windowed suffix" re-driving simple. Unbounded streaming input is out of
//! scope for this component, so this is not a regression.

use crate::{
  compile::{
    driver::{drive, run_loop, DriveOutcome, ParseList, PositionOrigin, Token, TokenReader},
    leo::LeoTable,
  },
  grammar::{Grammar, SymbolRef},
  types::{ParserConfig, RuleId, SituationId, YaepError, YaepResult},
};

/// Upper bound on the number of tokens recovery will ignore before giving up
/// on a candidate. Chosen generously relative to typical statement/line
/// lengths; recovery's own cost-minimization means a successful recovery
/// with a small `k` is always preferred over one that needed a larger bound,
/// so raising this constant only affects how hard recovery tries before
/// concluding failure, not which recovery it picks.
const MAX_IGNORED_TOKENS: u32 = 64;

/// Reported to the syntax-error callback once per `parse` call. Negative
/// markers (`-1`) for `first_ignored` / `first_recovered` mean "error
/// recovery was not attempted" (disabled, or no candidate existed).
#[derive(Clone, Copy, Debug)]
pub struct SyntaxErrorInfo {
  pub error_token_position: i64,
  pub first_ignored_token: i64,
  pub first_recovered_token: i64,
}

impl SyntaxErrorInfo {
  fn no_recovery(position: u32) -> Self {
    Self { error_token_position: position as i64, first_ignored_token: -1, first_recovered_token: -1 }
  }
}

struct SliceReader<'a, A> {
  tokens: &'a [Token<A>],
  next: usize,
}

impl<'a, A: Clone> TokenReader<A> for SliceReader<'a, A> {
  fn next_token(&mut self) -> Option<Token<A>> {
    let tok = self.tokens.get(self.next).cloned();
    self.next += 1;
    tok
  }
}

/// Runs the recognizer to completion, attempting bounded error recovery on
/// a syntax error when `config.error_recovery` is set. Invokes
/// `on_syntax_error` exactly once if and only if a syntax error was
/// encountered (whether or not recovery was attempted or succeeded).
pub fn parse<A: Clone>(
  grammar: &mut Grammar,
  config: &ParserConfig,
  reader: &mut dyn TokenReader<A>,
  on_syntax_error: &mut dyn FnMut(SyntaxErrorInfo),
) -> YaepResult<(ParseList<A>, DriveOutcome)> {
  let mut all_tokens: Vec<Token<A>> = Vec::new();
  while let Some(tok) = reader.next_token() {
    all_tokens.push(tok);
  }

  let (list, outcome) = drive(grammar, config, &mut SliceReader { tokens: &all_tokens, next: 0 })?;
  if outcome.accepted {
    return Ok((list, outcome));
  }

  let fail_pos = match outcome.failure_position {
    Some(p) => p,
    // Reached end-of-input without the start rule completing: there is no
    // scan failure position to recover from, only a structurally incomplete
    // derivation. Report it at the final position.
    None => list.last_position() as u32,
  };

  if !config.error_recovery {
    on_syntax_error(SyntaxErrorInfo::no_recovery(fail_pos));
    return Err(YaepError::SyntaxError { position: fail_pos as usize });
  }

  match try_recover(grammar, config, &list, &all_tokens, fail_pos) {
    Some((resolved_list, resolved_outcome, info)) => {
      on_syntax_error(info);
      Ok((resolved_list, resolved_outcome))
    }
    None => {
      on_syntax_error(SyntaxErrorInfo::no_recovery(fail_pos));
      Err(YaepError::SyntaxError { position: fail_pos as usize })
    }
  }
}

/// One candidate a recovery trial can pursue: a situation waiting on the
/// reserved `error` terminal, the parse-set position it was found in, and
/// its origin (the start of the production it belongs to).
#[derive(Clone, Copy, Debug)]
struct Candidate {
  position: u32,
  situation: SituationId,
  origin: u32,
  rule: RuleId,
}

/// Every `error`-waiting situation across all parse sets built so far
/// (positions `0..=fail_pos`), sorted by the tie-break order named for
/// recovery minimality: lowest origin, then lowest rule id.
fn error_candidates<A>(grammar: &Grammar, list: &ParseList<A>, fail_pos: u32) -> Vec<Candidate> {
  let error_term = grammar.error_term();
  let mut found = Vec::new();
  for position in 0..=fail_pos {
    let core = list.core_at(position as usize);
    for &idx in core.situations_for_term(error_term) {
      let sid = core.situations[idx];
      let origin = list.origin_at(position as usize, idx);
      let rule = list.situations.get(sid).rule;
      found.push(Candidate { position, situation: sid, origin, rule });
    }
  }
  found.sort_by_key(|c| (c.origin, c.rule.0));
  found
}

/// Bounded best-first search over `(k, candidate)`: the minimum `k` across
/// all candidates wins; ties break on lowest candidate origin then lowest
/// rule id (already the candidate order produced by [error_candidates]).
fn try_recover<A: Clone>(
  grammar: &mut Grammar,
  config: &ParserConfig,
  list: &ParseList<A>,
  all_tokens: &[Token<A>],
  fail_pos: u32,
) -> Option<(ParseList<A>, DriveOutcome, SyntaxErrorInfo)> {
  let candidates = error_candidates(grammar, list, fail_pos);
  if candidates.is_empty() {
    return None;
  }

  let max_k = (all_tokens.len() as u32).min(MAX_IGNORED_TOKENS);
  for k in 0..=max_k {
    for cand in &candidates {
      if cand.position + k > all_tokens.len() as u32 {
        continue;
      }
      if let Some((resolved_list, resolved_outcome)) = attempt_one(grammar, config, list, all_tokens, *cand, k) {
        let info = SyntaxErrorInfo {
          error_token_position: fail_pos as i64,
          first_ignored_token: if k == 0 { -1 } else { cand.position as i64 },
          first_recovered_token: (cand.position + k) as i64,
        };
        return Some((resolved_list, resolved_outcome, info));
      }
    }
  }
  None
}

/// Tries one `(candidate, k)` pair: rewinds the parse list to the
/// candidate's own position, scans the `error` terminal in place of its next
/// symbol, skips `k` real tokens starting there, then requires
/// `config.recovery_match` consecutive successful scans before accepting.
/// On success, continues unbounded driving from there to produce the final
/// parse list.
fn attempt_one<A: Clone>(
  grammar: &mut Grammar,
  config: &ParserConfig,
  list: &ParseList<A>,
  all_tokens: &[Token<A>],
  cand: Candidate,
  k: u32,
) -> Option<(ParseList<A>, DriveOutcome)> {
  let resume_at = (cand.position + k) as usize;
  if resume_at > all_tokens.len() {
    return None;
  }

  let mut situations = list.situations.clone();
  let mut cores = list.cores.clone();
  let mut parse_sets = list.parse_sets.clone();
  // Rewind: discard everything built at or after the candidate's own
  // position, since the recovery branch replaces that production's
  // continuation from here on.
  let mut positions = list.positions[..=cand.position as usize].to_vec();
  let mut leo_list: Vec<LeoTable> = list.leo[..=cand.position as usize].to_vec();
  let mut tokens: Vec<Token<A>> = list.tokens[..cand.position as usize].to_vec();
  let mut origins: Vec<PositionOrigin> = list.origins[..=cand.position as usize].to_vec();

  let sit = situations.get(cand.situation).clone();
  if !matches!(sit.next_symbol, Some(SymbolRef::Term(t)) if t == grammar.error_term()) {
    return None;
  }
  let advanced = situations.intern(grammar, sit.rule, sit.dot + 1, sit.context);
  let seeds = vec![(advanced, cand.origin)];
  let start_position = cand.position + 1;

  let mut reader = SliceReader { tokens: all_tokens, next: resume_at };
  let match_target = config.recovery_match.max(1);
  let probe = run_loop(
    grammar,
    config,
    &mut situations,
    &mut cores,
    &mut parse_sets,
    &mut positions,
    &mut leo_list,
    &mut tokens,
    &mut origins,
    seeds,
    start_position,
    PositionOrigin::Recovered,
    &mut || reader.next_token(),
    Some(match_target),
  )
  .ok()?;

  let (resume_seeds, resume_position) = match probe {
    DriveOutcome { failure_position: Some(_), .. } => return None,
    DriveOutcome { accepted: true, .. } => {
      return Some((ParseList { situations, cores, parse_sets, positions, leo: leo_list, tokens, origins }, probe));
    }
    DriveOutcome { resume: Some((seeds, position)), .. } => (seeds, position),
    _ => return None,
  };

  let continuation_origin = PositionOrigin::Scanned(tokens.len() - 1);
  let outcome = run_loop(
    grammar,
    config,
    &mut situations,
    &mut cores,
    &mut parse_sets,
    &mut positions,
    &mut leo_list,
    &mut tokens,
    &mut origins,
    resume_seeds,
    resume_position,
    continuation_origin,
    &mut || reader.next_token(),
    None,
  )
  .ok()?;

  Some((ParseList { situations, cores, parse_sets, positions, leo: leo_list, tokens, origins }, outcome))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::Translation;

  struct VecReader {
    codes: std::vec::IntoIter<u32>,
  }

  impl TokenReader<()> for VecReader {
    fn next_token(&mut self) -> Option<Token<()>> {
      self.codes.next().map(|code| Token { code, attr: () })
    }
  }

  /// `expr : 'n' | error ;`, `stmt : 'i' expr ';' ;`, `prog : stmt stmt ;`:
  /// the error fallback is predicted right where the malformed expression
  /// is expected, matching the scenario's "malformed expression between two
  /// `;`" shape.
  fn recovery_grammar() -> Grammar {
    let mut g = Grammar::with_config(ParserConfig::new().with_error_recovery(true).with_recovery_match(1));
    g.intern_terminal("i", 1).unwrap();
    g.intern_terminal("n", 2).unwrap();
    g.intern_terminal("semi", 3).unwrap();
    g.intern_terminal("bad", 4).unwrap();
    g.add_rule("expr", &["n"], Translation::Empty).unwrap();
    g.add_rule("expr", &["error"], Translation::Empty).unwrap();
    g.add_rule("stmt", &["i", "expr", "semi"], Translation::Empty).unwrap();
    g.add_rule("prog", &["stmt", "stmt"], Translation::Empty).unwrap();
    g.analyze().unwrap();
    g
  }

  #[test]
  fn recovers_from_malformed_statement() {
    let mut g = recovery_grammar();
    let cfg = g.config().clone();
    // "i <bad> ;" then "i n ;": the first statement's expression is
    // malformed, recovery should swallow just the one bad token.
    let mut reader = VecReader { codes: vec![1, 4, 3, 1, 2, 3].into_iter() };
    let mut seen = Vec::new();
    let result = parse(&mut g, &cfg, &mut reader, &mut |info| seen.push(info));
    let (_, outcome) = result.expect("recovery should succeed");
    assert!(outcome.accepted);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].first_ignored_token, 1);
    assert_eq!(seen[0].first_recovered_token, 2);
  }

  #[test]
  fn disabled_recovery_surfaces_syntax_error() {
    let mut g = recovery_grammar();
    let mut cfg = g.config().clone();
    cfg.error_recovery = false;
    let mut reader = VecReader { codes: vec![1, 4, 3, 1, 2, 3].into_iter() };
    let mut seen = Vec::new();
    let result = parse(&mut g, &cfg, &mut reader, &mut |info| seen.push(info));
    assert!(result.is_err());
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].first_ignored_token, -1);
    assert_eq!(seen[0].first_recovered_token, -1);
  }
}
