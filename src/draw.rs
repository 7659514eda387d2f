//! Weighted gift selection
//!
//! Probabilities are percentages. They are scaled to integer weights
//! (`scale = 100` gives basis points) and walked in id order against a single
//! uniform draw in `[1, 100 * scale]`. Whatever the weights do not cover is
//! the "no gift" share.

use rand::Rng;

use crate::{entity::gift, prelude::*};

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_LEN: usize = 8;
/// Largest scale whose `100 * scale` ceiling fits in a `u32`.
pub const MAX_SCALE: u32 = u32::MAX / 100;

/// Source of uniform draws in `[1, ceiling]`.
pub trait Draw {
  fn draw(&mut self, ceiling: u32) -> u32;
}

impl<R: Rng + ?Sized> Draw for R {
  fn draw(&mut self, ceiling: u32) -> u32 {
    self.gen_range(1..=ceiling.max(1))
  }
}

/// Integer weight of a tier for the given scale.
pub fn weight(probability: f64, scale: u32) -> u32 {
  if !probability.is_finite() || probability <= 0.0 {
    return 0;
  }
  (probability.min(100.0) * scale.min(MAX_SCALE) as f64).round() as u32
}

pub fn ceiling(scale: u32) -> u32 {
  100 * scale.min(MAX_SCALE)
}

/// Whether a tier can be awarded for `score` at `now`.
pub fn eligible(tier: &gift::Model, score: i32, now: DateTime) -> bool {
  tier.is_active
    && tier.accepts_score(score)
    && tier.in_stock()
    && tier.valid_at(now)
}

/// First tier (by id) whose cumulative weight reaches `roll`.
pub fn pick(tiers: &[gift::Model], roll: u32, scale: u32) -> Option<&gift::Model> {
  let mut ordered: Vec<&gift::Model> = tiers.iter().collect();
  ordered.sort_by_key(|tier| tier.id);

  let mut cumulative = 0u32;
  for tier in ordered {
    cumulative = cumulative.saturating_add(weight(tier.probability, scale));
    if cumulative >= roll {
      return Some(tier);
    }
  }

  None
}

/// Draws once and picks a tier, `None` when the draw misses every tier.
pub fn select_by_probability<'a, D: Draw + ?Sized>(
  tiers: &'a [gift::Model],
  scale: u32,
  rng: &mut D,
) -> Option<&'a gift::Model> {
  if tiers.is_empty() {
    return None;
  }
  let roll = rng.draw(ceiling(scale));
  pick(tiers, roll, scale)
}

/// Tiers in fallback order: highest probability first, then id. Tiers the
/// draw could never pick are left out.
pub fn by_preference(tiers: Vec<gift::Model>, scale: u32) -> Vec<gift::Model> {
  let mut tiers: Vec<_> =
    tiers.into_iter().filter(|tier| weight(tier.probability, scale) > 0).collect();
  tiers.sort_by(|a, b| {
    b.probability.total_cmp(&a.probability).then(a.id.cmp(&b.id))
  });
  tiers
}

/// `PREFIX-XXXXXXXX` with characters from `[A-Z0-9]`.
pub fn gift_code<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
  let suffix: String = (0..CODE_LEN)
    .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
    .collect();
  format!("{prefix}-{suffix}")
}
