//! Economy domain — currency ledger, pricing, and sell/buy flows.

use bevy::prelude::*;

use crate::shared::*;

pub mod pricing;
pub mod sell;

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                sell::handle_sell_item,
                sell::handle_sell_all,
                sell::handle_buy_seeds,
                apply_currency_changes,
            )
                .chain()
                .in_set(SimSet::Player)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Applies CurrencyChangeEvents to the balances. Spending is validated
/// by the sender; a short balance is clamped to zero with a warning
/// rather than a panic.
pub fn apply_currency_changes(
    mut currency_events: EventReader<CurrencyChangeEvent>,
    mut currencies: ResMut<Currencies>,
) {
    for ev in currency_events.read() {
        if ev.amount >= 0 {
            currencies.credit(ev.kind, ev.amount as u32);
            info!(
                "[Economy] {:?} +{}: {}. New balance: {}",
                ev.kind,
                ev.amount,
                ev.reason,
                currencies.balance(ev.kind)
            );
        } else {
            let cost = (-ev.amount) as u32;
            if !currencies.debit(ev.kind, cost) {
                warn!(
                    "[Economy] Tried to spend {} {:?} without the balance (reason: {}). Clamped to 0.",
                    cost, ev.kind, ev.reason
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_and_debit() {
        let mut currencies = Currencies::default();
        currencies.credit(CurrencyKind::Coins, 100);
        assert_eq!(currencies.coins, STARTING_COINS + 100);
        assert!(currencies.debit(CurrencyKind::Coins, 30));
        assert_eq!(currencies.coins, STARTING_COINS + 70);
    }

    #[test]
    fn test_debit_clamps_to_zero() {
        let mut currencies = Currencies {
            coins: 10,
            scrap: 0,
            gems: 0,
        };
        assert!(!currencies.debit(CurrencyKind::Coins, 999));
        assert_eq!(currencies.coins, 0);
    }
}
