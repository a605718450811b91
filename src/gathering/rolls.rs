//! Rarity and quality roll engine.
//!
//! Both rolls take the random source as a closure so tests can pin
//! outcomes; gameplay passes a closure over the shared `GameRng`.

use crate::shared::{Quality, Rarity};

/// Cascade thresholds, rarest first. Each is an independent trial; the
/// first success wins. Because the trials are independent, the effective
/// Common rate is the chance of failing all five — noticeably more than
/// the nominal 20% complement. That is the intended tuning; do not
/// normalize these into a single weighted table.
const RARITY_CASCADE: &[(Rarity, f64)] = &[
    (Rarity::Godlike, 0.0001),
    (Rarity::Mythic, 0.01),
    (Rarity::Legendary, 0.10),
    (Rarity::Rare, 0.25),
    (Rarity::Uncommon, 0.50),
];

/// Cumulative quality weights in fixed order. One draw; the first bucket
/// whose cumulative sum exceeds it wins.
const QUALITY_WEIGHTS: &[(Quality, f64)] = &[
    (Quality::Dull, 0.60),
    (Quality::Normal, 0.30),
    (Quality::Refined, 0.08),
    (Quality::Pristine, 0.015),
    (Quality::Exquisite, 0.005),
];

/// Ordered cascading trials: one uniform draw per tier, rarest first,
/// first success wins; all failures fall through to Common.
pub fn roll_rarity(source: &mut impl FnMut() -> f64) -> Rarity {
    for &(rarity, threshold) in RARITY_CASCADE {
        if source() < threshold {
            return rarity;
        }
    }
    Rarity::Common
}

/// Single draw against cumulative weights. A draw equal to a cumulative
/// boundary belongs to the next bucket; floating-point residue past the
/// final sum falls back to the last category.
pub fn roll_quality(source: &mut impl FnMut() -> f64) -> Quality {
    let draw = source();
    let mut cumulative = 0.0;
    for &(quality, weight) in QUALITY_WEIGHTS {
        cumulative += weight;
        if draw < cumulative {
            return quality;
        }
    }
    QUALITY_WEIGHTS[QUALITY_WEIGHTS.len() - 1].0
}
