//! Sale pricing for gathered items.
//!
//! price = round(category_base × rarity_multiplier × quality_multiplier),
//! never below 1. Unknown rarity/quality (migrated stacks) price at the
//! neutral multiplier.

use crate::shared::{DecorCategory, Quality, Rarity};

/// Base value by the category the item came from. Items with no recorded
/// category (legacy stacks with lost meta) use the default.
pub fn category_base(category: Option<DecorCategory>) -> f64 {
    match category {
        Some(DecorCategory::Mineral) => 15.0,
        Some(DecorCategory::Tree) => 12.0,
        Some(DecorCategory::Flower) => 8.0,
        _ => 10.0,
    }
}

pub fn compute_sale_price(
    category: Option<DecorCategory>,
    rarity: Option<Rarity>,
    quality: Option<Quality>,
) -> u32 {
    let base = category_base(category);
    let rarity_mult = rarity.map(Rarity::price_multiplier).unwrap_or(1.0);
    let quality_mult = quality.map(Quality::price_multiplier).unwrap_or(1.0);
    ((base * rarity_mult * quality_mult).round() as u32).max(1)
}

/// Whether a sale needs an explicit confirmation before it may mutate
/// state. This is the precondition for sell handlers, not a UI nicety.
pub fn needs_confirmation(rarity: Option<Rarity>, quality: Option<Quality>) -> bool {
    rarity.map(Rarity::is_high_tier).unwrap_or(false)
        || quality.map(Quality::is_high_tier).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_combines_all_multipliers() {
        // mineral 15 × rare 2.5 × refined 1.3 = 48.75 → 49
        assert_eq!(
            compute_sale_price(
                Some(DecorCategory::Mineral),
                Some(Rarity::Rare),
                Some(Quality::Refined)
            ),
            49
        );
    }

    #[test]
    fn test_price_floor_is_one() {
        // flower 8 × common 1.0 × dull 0.6 = 4.8 → 5; force below 1 via default:
        // there is no combination below 1 with these tables, so check the clamp
        // survives the cheapest real item.
        assert!(
            compute_sale_price(
                Some(DecorCategory::Flower),
                Some(Rarity::Common),
                Some(Quality::Dull)
            ) >= 1
        );
    }

    #[test]
    fn test_unknown_identity_prices_neutral() {
        assert_eq!(compute_sale_price(None, None, None), 10);
    }

    #[test]
    fn test_rarity_multipliers_are_monotone() {
        let order = [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Legendary,
            Rarity::Mythic,
            Rarity::Godlike,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].price_multiplier() < pair[1].price_multiplier());
        }
    }

    #[test]
    fn test_quality_multipliers_are_monotone() {
        let order = [
            Quality::Dull,
            Quality::Normal,
            Quality::Refined,
            Quality::Pristine,
            Quality::Exquisite,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].price_multiplier() < pair[1].price_multiplier());
        }
    }

    #[test]
    fn test_high_tier_needs_confirmation() {
        assert!(needs_confirmation(Some(Rarity::Legendary), Some(Quality::Normal)));
        assert!(needs_confirmation(Some(Rarity::Common), Some(Quality::Pristine)));
        assert!(!needs_confirmation(Some(Rarity::Rare), Some(Quality::Refined)));
        assert!(!needs_confirmation(None, None));
    }
}
