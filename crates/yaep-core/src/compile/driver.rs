//! The Earley recognizer: builds the parse-set sequence via a predict / scan
//! / complete loop, dispatching on lookahead mode and shortcutting
//! deterministic right-recursive completion chains through [LeoTable].
//!
//! The outer loop is factored into [run_loop] so that error recovery
//! (`compile::recovery`) can resume driving from an arbitrary mid-stream
//! seed set over a windowed suffix of the token stream, rather than
//! restarting the whole recognizer from scratch.

use crate::{
  compile::{
    core::{Core, CoreTable},
    leo::{LeoItem, LeoTable},
    parse_set::{ParseSetKey, ParseSetTable},
    situation::SituationTable,
  },
  grammar::{analysis, Grammar, SymbolRef},
  types::{
    Bitset, ContextId, CoreId, LookaheadLevel, Map, NontermId, ParserConfig, RuleId, Set, SituationId, TermId, YaepError, YaepResult,
  },
};

/// One token delivered by a [TokenReader]: a declared terminal code plus an
/// opaque, caller-owned attribute.
#[derive(Clone, Debug)]
pub struct Token<A> {
  pub code: u32,
  pub attr: A,
}

/// How a closed position was reached, recorded once per position so the
/// translation builder can tell a real scan apart from the synthetic
/// `error`-terminal advance error recovery makes, without requiring
/// `tokens` to carry a placeholder entry for the latter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionOrigin {
  /// Position 0: nothing was scanned to reach it.
  Start,
  /// Reached by scanning a real token, at this index into `tokens`.
  Scanned(usize),
  /// Reached by error recovery advancing a candidate past the reserved
  /// `error` terminal without consuming any input.
  Recovered,
}

/// The only re-entry point into user code during normal driving; error
/// recovery re-enters it to peek further into the stream and buffers what it
/// reads for replay.
pub trait TokenReader<A> {
  /// Returns the next token, or `None` once the stream is exhausted (the
  /// sentinel end-of-input marker).
  fn next_token(&mut self) -> Option<Token<A>>;
}

/// The parse-set sequence and consumed token stream built by one call to
/// [drive] (or one successful leg of error recovery). Consumed by the
/// translation builder.
#[derive(Clone)]
pub struct ParseList<A> {
  pub situations: SituationTable,
  pub cores: CoreTable,
  pub parse_sets: ParseSetTable,
  /// Slot index (into `parse_sets`) for each position, `0..=n`.
  pub positions: Vec<usize>,
  /// Leo table per position, aligned with `positions`.
  pub leo: Vec<LeoTable>,
  /// Consumed tokens, one per position before the end-of-input marker. A
  /// position introduced by error recovery (the synthetic `error` scan)
  /// carries no entry here; `tokens[k]` corresponds to the `k`-th *real*
  /// scan, not necessarily to parse-set index `k`.
  pub tokens: Vec<Token<A>>,
  /// How each position in `positions` was reached, aligned 1:1 with it.
  pub origins: Vec<PositionOrigin>,
}

impl<A> ParseList<A> {
  pub fn core_at(&self, position: usize) -> &Core {
    self.cores.get(self.parse_sets.get(self.positions[position]).core)
  }

  pub fn distances_at(&self, position: usize) -> &[u32] {
    &self.parse_sets.get(self.positions[position]).distances
  }

  /// Origin of the situation at `core_index` within the parse set at
  /// `position`.
  pub fn origin_at(&self, position: usize, core_index: usize) -> u32 {
    let core = self.core_at(position);
    origin_of(core, self.distances_at(position), core_index, position as u32)
  }

  /// The last closed parse-set index, i.e. the current length of the parse
  /// list minus one.
  pub fn last_position(&self) -> usize {
    self.positions.len() - 1
  }

  pub fn position_origin(&self, position: usize) -> PositionOrigin {
    self.origins[position]
  }
}

#[derive(Clone, Debug)]
pub struct DriveOutcome {
  pub accepted: bool,
  pub accepting_situation: Option<SituationId>,
  /// Set when scanning found no successor at some position: the driver
  /// stopped there rather than treating it as a hard error, so error
  /// recovery (or the caller, if recovery is disabled) can act on it.
  pub failure_position: Option<u32>,
  /// Set only when `scan_limit` was reached before a failure or acceptance:
  /// the seeds and position the loop would have continued from, so a
  /// recovery trial that validated `recovery_match` consecutive scans can
  /// resume unbounded driving without redoing them.
  pub resume: Option<(Vec<(SituationId, u32)>, u32)>,
}

/// Runs the recognizer to completion (or to the first scan failure, recorded
/// as [DriveOutcome::failure_position] rather than propagated as an `Err`:
/// only a malformed token stream — an unknown terminal code — is a hard
/// `Err` here).
pub fn drive<A>(grammar: &mut Grammar, config: &ParserConfig, reader: &mut dyn TokenReader<A>) -> YaepResult<(ParseList<A>, DriveOutcome)> {
  let start = std::time::Instant::now();
  let mut situations = SituationTable::new();
  let mut cores = CoreTable::new();
  let mut parse_sets = ParseSetTable::new();
  let mut positions: Vec<usize> = Vec::new();
  let mut leo_list: Vec<LeoTable> = Vec::new();
  let mut tokens: Vec<Token<A>> = Vec::new();
  let mut origins: Vec<PositionOrigin> = Vec::new();

  let seeds: Vec<(SituationId, u32)> = grammar
    .nonterm(grammar.start_nonterm())
    .rules
    .clone()
    .into_iter()
    .map(|rule| (situations.intern(grammar, rule, 0, ContextId::ANY), 0u32))
    .collect();

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
    seeds,
    0,
    PositionOrigin::Start,
    &mut || reader.next_token(),
    None,
  )?;
  let position_count = positions.len();
  let core_count = cores.len();
  let elapsed = start.elapsed();
  let accepted = outcome.accepted;
  grammar.journal_mut().record("earley_drive", || {
    format!("{position_count} position(s), {core_count} distinct core(s), accepted={accepted}, {elapsed:?} elapsed")
  });
  Ok((ParseList { situations, cores, parse_sets, positions, leo: leo_list, tokens, origins }, outcome))
}

/// Runs the predict/scan/complete loop starting at `position` with `seeds`
/// already selected as the situations to close into that position (the
/// advanced items produced by the previous successful scan, or — for a
/// recovery leg — the single situation advanced past the `error` terminal).
///
/// When `scan_limit` is `Some(m)`, the loop stops after `m` *successful*
/// scans (even if the stream has not reached end-of-input) and reports that
/// via `DriveOutcome::accepted == false` with `failure_position == None`;
/// the caller (recovery) distinguishes "ran out of scans to check" from "hit
/// a real failure" by inspecting which one is set.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run_loop<A>(
  grammar: &mut Grammar,
  config: &ParserConfig,
  situations: &mut SituationTable,
  cores: &mut CoreTable,
  parse_sets: &mut ParseSetTable,
  positions: &mut Vec<usize>,
  leo_list: &mut Vec<LeoTable>,
  tokens: &mut Vec<Token<A>>,
  origins: &mut Vec<PositionOrigin>,
  mut seeds: Vec<(SituationId, u32)>,
  mut position: u32,
  initial_origin: PositionOrigin,
  next_token: &mut dyn FnMut() -> Option<Token<A>>,
  scan_limit: Option<u32>,
) -> YaepResult<DriveOutcome> {
  let mut scans_done = 0u32;
  let mut pending_origin = initial_origin;
  loop {
    let token = next_token();
    let lookahead_term = match &token {
      Some(t) => Some(lookup_term(grammar, t.code)?),
      None => Some(grammar.eoi_term()),
    };

    let (core_id, distances, leo) =
      close_position(grammar, situations, cores, parse_sets, positions, position, seeds, config, lookahead_term);
    let slot = parse_sets.intern(ParseSetKey { core: core_id, distances });
    positions.push(slot);
    leo_list.push(leo);
    origins.push(pending_origin);

    if token.is_none() {
      let core = cores.get(core_id);
      let dist = &parse_sets.get(slot).distances;
      let accepting = find_accepting_situation(grammar, situations, core, dist, position);
      return Ok(DriveOutcome { accepted: accepting.is_some(), accepting_situation: accepting, failure_position: None, resume: None });
    }

    let tok = token.unwrap();
    let term = lookahead_term.unwrap();
    let core = cores.get(core_id);
    let dist = parse_sets.get(slot).distances.clone();
    let candidates: Vec<usize> = core.situations_for_term(term).to_vec();
    if candidates.is_empty() {
      return Ok(DriveOutcome { accepted: false, accepting_situation: None, failure_position: Some(position), resume: None });
    }
    let mut next_seeds = Vec::with_capacity(candidates.len());
    for idx in candidates {
      let sid = core.situations[idx];
      let situation = situations.get(sid).clone();
      let origin = origin_of(core, &dist, idx, position);
      let advanced = situations.intern(grammar, situation.rule, situation.dot + 1, situation.context);
      next_seeds.push((advanced, origin));
    }
    tokens.push(tok);
    pending_origin = PositionOrigin::Scanned(tokens.len() - 1);
    seeds = next_seeds;
    position += 1;
    scans_done += 1;
    if let Some(limit) = scan_limit {
      if scans_done >= limit {
        return Ok(DriveOutcome { accepted: false, accepting_situation: None, failure_position: None, resume: Some((seeds, position)) });
      }
    }
  }
}

fn lookup_term(grammar: &Grammar, code: u32) -> YaepResult<TermId> {
  grammar.term_by_code(code).ok_or(YaepError::InvalidTokenCode { code })
}

/// A situation's origin: `distances[k]` for start situations (`k` = its
/// position in `core.start`), or `position` for predicted ones.
pub fn origin_of(core: &Core, distances: &[u32], core_index: usize, position: u32) -> u32 {
  match core.start.iter().position(|&i| i == core_index) {
    Some(k) => distances[k],
    None => position,
  }
}

fn find_accepting_situation(
  grammar: &Grammar,
  situations: &SituationTable,
  core: &Core,
  distances: &[u32],
  position: u32,
) -> Option<SituationId> {
  let start_rule = grammar
    .nonterm(grammar.start_nonterm())
    .rules
    .iter()
    .copied()
    .find(|&r| grammar.rule(r).lhs == grammar.start_nonterm())?;
  for (idx, &sid) in core.situations.iter().enumerate() {
    let s = situations.get(sid);
    if s.rule == start_rule && s.is_complete() && origin_of(core, distances, idx, position) == 0 {
      return Some(sid);
    }
  }
  None
}

/// Builds the closure (predict + complete fixpoint) for one position,
/// returning its hash-consed core, the distance vector aligned to that
/// core's `start` list, and the Leo table rebuilt for this position.
#[allow(clippy::too_many_arguments)]
fn close_position(
  grammar: &mut Grammar,
  situations: &mut SituationTable,
  cores: &mut CoreTable,
  parse_sets: &ParseSetTable,
  closed_positions: &[usize],
  position: u32,
  seeds: Vec<(SituationId, u32)>,
  config: &ParserConfig,
  lookahead_term: Option<TermId>,
) -> (ContextAwareCore, Vec<u32>, LeoTable) {
  let mut origins: Map<SituationId, u32> = Map::new();
  let mut seen: Set<SituationId> = Set::new();
  let mut worklist: Vec<SituationId> = Vec::new();
  let mut local_waiting_on: Map<NontermId, Vec<SituationId>> = Map::new();
  // Nonterminals that have already completed a zero-width (origin == position)
  // derivation within this closure. A waiter registered on such a nonterminal
  // *after* its completion already fired would otherwise never be advanced,
  // since `try_enqueue` only dedups and re-registers — it doesn't replay past
  // completions. `pending_nullable_replays` carries newly registered waiters
  // on an already-epsilon-complete nonterminal back through the loop below so
  // they get advanced immediately, same as if they'd been registered in time.
  let mut epsilon_done: Set<NontermId> = Set::new();
  let mut pending_nullable_replays: Vec<SituationId> = Vec::new();

  for (sid, origin) in seeds {
    try_enqueue(
      sid,
      origin,
      situations,
      &mut seen,
      &mut origins,
      &mut worklist,
      &mut local_waiting_on,
      &epsilon_done,
      &mut pending_nullable_replays,
    );
  }
  drain_nullable_replays(
    grammar,
    situations,
    &mut seen,
    &mut origins,
    &mut worklist,
    &mut local_waiting_on,
    &epsilon_done,
    &mut pending_nullable_replays,
  );

  let mut leo = LeoTable::new();
  let mut head = 0;
  while head < worklist.len() {
    let sid = worklist[head];
    head += 1;
    let origin = origins[&sid];
    let situation = situations.get(sid).clone();

    match situation.next_symbol {
      None => {
        let lhs = grammar.rule(situation.rule).lhs;
        if origin == position {
          epsilon_done.insert(lhs);
        }
        let waiters = collect_waiters(grammar, situations, cores, parse_sets, closed_positions, &local_waiting_on, &origins, position, origin, lhs);

        if let Some(item) = &leo.get(lhs) {
          try_enqueue(
            item.topmost,
            item.origin,
            situations,
            &mut seen,
            &mut origins,
            &mut worklist,
            &mut local_waiting_on,
            &epsilon_done,
            &mut pending_nullable_replays,
          );
          continue;
        }

        for (waiter_sid, waiter_origin) in &waiters {
          let waiter = situations.get(*waiter_sid).clone();
          let advanced = situations.intern(grammar, waiter.rule, waiter.dot + 1, waiter.context);
          try_enqueue(
            advanced,
            *waiter_origin,
            situations,
            &mut seen,
            &mut origins,
            &mut worklist,
            &mut local_waiting_on,
            &epsilon_done,
            &mut pending_nullable_replays,
          );
        }

        if waiters.len() == 1 {
          let (waiter_sid, waiter_origin) = waiters[0];
          let waiter = situations.get(waiter_sid).clone();
          if waiter.dot + 1 == grammar.rule(waiter.rule).rhs.len() {
            let advanced = situations.intern(grammar, waiter.rule, waiter.dot + 1, waiter.context);
            leo.set(lhs, LeoItem { topmost: advanced, origin: waiter_origin });
          }
        } else if waiters.len() > 1 {
          leo.invalidate(lhs);
        }
      }
      Some(SymbolRef::Term(_)) => {}
      Some(SymbolRef::Nonterm(c)) => {
        let rule_ids = grammar.nonterm(c).rules.clone();
        for rule in rule_ids {
          if let Some(ctx) = predicted_context(grammar, config.lookahead_level, rule, lookahead_term) {
            let predicted = situations.intern(grammar, rule, 0, ctx);
            try_enqueue(
              predicted,
              position,
              situations,
              &mut seen,
              &mut origins,
              &mut worklist,
              &mut local_waiting_on,
              &epsilon_done,
              &mut pending_nullable_replays,
            );
          }
        }
      }
    }

    drain_nullable_replays(
      grammar,
      situations,
      &mut seen,
      &mut origins,
      &mut worklist,
      &mut local_waiting_on,
      &epsilon_done,
      &mut pending_nullable_replays,
    );
  }

  let final_situations: Vec<SituationId> = worklist;
  let core_id = cores.intern(final_situations, situations);
  let core = cores.get(core_id);
  let distances: Vec<u32> = core.start.iter().map(|&idx| origins[&core.situations[idx]]).collect();
  (core_id, distances, leo)
}

type ContextAwareCore = crate::types::CoreId;

#[allow(clippy::too_many_arguments)]
fn try_enqueue(
  sid: SituationId,
  origin: u32,
  situations: &SituationTable,
  seen: &mut Set<SituationId>,
  origins: &mut Map<SituationId, u32>,
  worklist: &mut Vec<SituationId>,
  local_waiting_on: &mut Map<NontermId, Vec<SituationId>>,
  epsilon_done: &Set<NontermId>,
  pending_nullable_replays: &mut Vec<SituationId>,
) {
  if seen.insert(sid) {
    origins.insert(sid, origin);
    if let Some(SymbolRef::Nonterm(c)) = situations.get(sid).next_symbol {
      local_waiting_on.entry(c).or_default().push(sid);
      if epsilon_done.contains(&c) {
        pending_nullable_replays.push(sid);
      }
    }
    worklist.push(sid);
  }
}

/// Advances every situation in `pending_nullable_replays` past its
/// already-epsilon-complete next nonterminal, as if it had been registered as
/// a waiter before that nonterminal's zero-width completion fired. Draining
/// is a fixpoint: advancing one replay can itself land on another
/// already-epsilon-done nonterminal (e.g. `S -> A A A` with `A -> ε`), which
/// queues a further replay.
#[allow(clippy::too_many_arguments)]
fn drain_nullable_replays(
  grammar: &Grammar,
  situations: &mut SituationTable,
  seen: &mut Set<SituationId>,
  origins: &mut Map<SituationId, u32>,
  worklist: &mut Vec<SituationId>,
  local_waiting_on: &mut Map<NontermId, Vec<SituationId>>,
  epsilon_done: &Set<NontermId>,
  pending_nullable_replays: &mut Vec<SituationId>,
) {
  while let Some(sid) = pending_nullable_replays.pop() {
    let origin = origins[&sid];
    let waiter = situations.get(sid).clone();
    let advanced = situations.intern(grammar, waiter.rule, waiter.dot + 1, waiter.context);
    try_enqueue(advanced, origin, situations, seen, origins, worklist, local_waiting_on, epsilon_done, pending_nullable_replays);
  }
}

/// Finds every situation waiting on `lhs` whose origin is `completed_origin`:
/// either the in-progress closure at `position` (when `completed_origin ==
/// position`) or an already-closed parse set further back in the stream.
#[allow(clippy::too_many_arguments)]
fn collect_waiters(
  grammar: &Grammar,
  situations: &SituationTable,
  cores: &CoreTable,
  parse_sets: &ParseSetTable,
  closed_positions: &[usize],
  local_waiting_on: &Map<NontermId, Vec<SituationId>>,
  origins: &Map<SituationId, u32>,
  position: u32,
  completed_origin: u32,
  lhs: NontermId,
) -> Vec<(SituationId, u32)> {
  let _ = grammar;
  let _ = situations;
  if completed_origin == position {
    local_waiting_on.get(&lhs).map(|v| v.iter().map(|&sid| (sid, origins[&sid])).collect()).unwrap_or_default()
  } else {
    let slot = closed_positions[completed_origin as usize];
    let key = parse_sets.get(slot);
    let core = cores.get(key.core);
    core
      .situations_for_nonterm(lhs)
      .iter()
      .map(|&idx| {
        let sid = core.situations[idx];
        let origin = origin_of(core, &key.distances, idx, completed_origin);
        (sid, origin)
      })
      .collect()
  }
}

/// Determines the static-lookahead context for a freshly predicted
/// `rule → ·rhs` at `dot == 0`, or `None` if the prediction should be
/// suppressed because it cannot possibly agree with `lookahead_term`.
fn predicted_context(grammar: &mut Grammar, level: LookaheadLevel, rule: RuleId, lookahead_term: Option<TermId>) -> Option<ContextId> {
  if level == LookaheadLevel::None {
    return Some(ContextId::ANY);
  }
  let static_ctx = analysis::static_context_for(grammar, rule, 0);
  let term = lookahead_term?;
  if !grammar.context(static_ctx).get(term.index()) {
    return None;
  }
  if level == LookaheadLevel::Dynamic {
    let mut narrowed = Bitset::new();
    narrowed.set(term.index());
    return Some(grammar.intern_context(narrowed));
  }
  Some(static_ctx)
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

  fn balanced_brackets_grammar() -> Grammar {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    g.intern_terminal("b", 2).unwrap();
    g.add_rule("s", &["a", "s", "b"], Translation::Empty).unwrap();
    g.add_rule("s", &[], Translation::Empty).unwrap();
    g.analyze().unwrap();
    g
  }

  #[test]
  fn accepts_balanced_input() {
    let mut g = balanced_brackets_grammar();
    let mut reader = VecReader { codes: vec![1, 1, 2, 2].into_iter() };
    let (_, outcome) = drive(&mut g, &g.config().clone(), &mut reader).unwrap();
    assert!(outcome.accepted);
  }

  #[test]
  fn rejects_unbalanced_input() {
    let mut g = balanced_brackets_grammar();
    let mut reader = VecReader { codes: vec![1, 2, 2].into_iter() };
    let (_, outcome) = drive(&mut g, &g.config().clone(), &mut reader).unwrap();
    assert!(!outcome.accepted);
    assert!(outcome.failure_position.is_some());
  }

  #[test]
  fn right_recursive_grammar_accepts_long_input() {
    let mut g = Grammar::new();
    g.intern_terminal("a", 1).unwrap();
    g.add_rule("a_seq", &["a", "a_seq"], Translation::Empty).unwrap();
    g.add_rule("a_seq", &["a"], Translation::Empty).unwrap();
    g.analyze().unwrap();
    let mut reader = VecReader { codes: vec![1; 500].into_iter() };
    let (_, outcome) = drive(&mut g, &g.config().clone(), &mut reader).unwrap();
    assert!(outcome.accepted);
  }

  #[test]
  fn drive_journals_a_summary_entry_when_debug_level_set() {
    let mut g = Grammar::with_config(crate::types::ParserConfig::new().with_debug_level(1));
    g.intern_terminal("a", 1).unwrap();
    g.add_rule("s", &["a"], Translation::Empty).unwrap();
    g.analyze().unwrap();
    let cfg = g.config().clone();
    let mut reader = VecReader { codes: vec![1].into_iter() };
    let (_, outcome) = drive(&mut g, &cfg, &mut reader).unwrap();
    assert!(outcome.accepted);
    let entries = g.journal().entries();
    assert!(entries.iter().any(|e| e.label == "earley_drive"));
  }

  #[test]
  fn accepts_empty_input_with_repeated_nullable_nonterminal() {
    // s -> a a ; a -> (empty). A second waiter on `a` is registered only
    // after the first `a -> (empty)` completion has already fired at this
    // position, so this only accepts if that late waiter still gets advanced.
    let mut g = Grammar::new();
    g.add_rule("s", &["a", "a"], Translation::Empty).unwrap();
    g.add_rule("a", &[], Translation::Empty).unwrap();
    g.analyze().unwrap();
    let mut reader = VecReader { codes: Vec::new().into_iter() };
    let (_, outcome) = drive(&mut g, &g.config().clone(), &mut reader).unwrap();
    assert!(outcome.accepted);
  }

  #[test]
  fn accepts_empty_input_with_a_chain_of_nullable_waiters() {
    // Three repeated nullable nonterminals: the replay must chain across all
    // of them, not just advance the first late waiter.
    let mut g = Grammar::new();
    g.add_rule("s", &["a", "a", "a"], Translation::Empty).unwrap();
    g.add_rule("a", &[], Translation::Empty).unwrap();
    g.analyze().unwrap();
    let mut reader = VecReader { codes: Vec::new().into_iter() };
    let (_, outcome) = drive(&mut g, &g.config().clone(), &mut reader).unwrap();
    assert!(outcome.accepted);
  }

  #[test]
  fn accepts_mixed_nullable_and_terminal_input() {
    // s -> a a ; a -> 'x' | (empty). Exercises the same late-waiter replay
    // path alongside a normal scanned completion of the other `a`.
    let mut g = Grammar::new();
    g.intern_terminal("x", 1).unwrap();
    g.add_rule("s", &["a", "a"], Translation::Empty).unwrap();
    g.add_rule("a", &["x"], Translation::Empty).unwrap();
    g.add_rule("a", &[], Translation::Empty).unwrap();
    g.analyze().unwrap();
    let mut reader = VecReader { codes: vec![1].into_iter() };
    let (_, outcome) = drive(&mut g, &g.config().clone(), &mut reader).unwrap();
    assert!(outcome.accepted);
  }
}
