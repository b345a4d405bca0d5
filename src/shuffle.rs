//! Original-order-avoiding shuffles for the scrambled half of an exercise.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;

/// Redraw budget when a permutation comes back equal to the input. Keeps the
/// degenerate duplicate-heavy cases (e.g. all-identical tokens, where no
/// distinct permutation exists) terminating in bounded time.
const MAX_REDRAWS: usize = 10;

/// Deterministic generator for batch runs: seeding with the same value over a
/// sorted file list reproduces the exact same exercise sets.
pub fn seeded_rng(seed: u64) -> StdRng {
  StdRng::seed_from_u64(seed)
}

/// Uniformly random permutation of `tokens`, redrawn while it equals the
/// original order (up to `MAX_REDRAWS`, after which the last draw is
/// accepted). Sequences shorter than two tokens are returned unchanged.
pub fn scramble<R: Rng>(tokens: &[String], rng: &mut R) -> Vec<String> {
  let mut out = tokens.to_vec();
  if tokens.len() < 2 {
    return out;
  }
  for _ in 0..MAX_REDRAWS {
    out.shuffle(rng);
    if out != tokens {
      break;
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn toks(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn differs_from_original_when_possible() {
    let tokens = toks(&["How", "long", "is", "the", "Great", "Wall?"]);
    let mut rng = seeded_rng(42);
    for _ in 0..50 {
      assert_ne!(scramble(&tokens, &mut rng), tokens);
    }
  }

  #[test]
  fn preserves_the_token_multiset() {
    let tokens = toks(&["它", "有", "两千多年", "历史", "了", "。"]);
    let mut rng = seeded_rng(7);
    let mut scrambled = scramble(&tokens, &mut rng);
    let mut original = tokens.clone();
    scrambled.sort();
    original.sort();
    assert_eq!(scrambled, original);
  }

  #[test]
  fn seeded_runs_are_reproducible() {
    let tokens = toks(&["A", "B", "C", "D", "E"]);
    let first = scramble(&tokens, &mut seeded_rng(42));
    let second = scramble(&tokens, &mut seeded_rng(42));
    assert_eq!(first, second);
  }

  #[test]
  fn short_sequences_are_untouched() {
    let mut rng = seeded_rng(1);
    assert!(scramble(&[], &mut rng).is_empty());
    let one = toks(&["只"]);
    assert_eq!(scramble(&one, &mut rng), one);
  }

  #[test]
  fn all_identical_tokens_terminate_unchanged() {
    let tokens = toks(&["X", "X"]);
    let mut rng = seeded_rng(3);
    assert_eq!(scramble(&tokens, &mut rng), tokens);
  }
}
