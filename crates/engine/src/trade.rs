use tickwatch_core::engine::entity::TradeState;
use tickwatch_core::market::entity::paise;

/// # Summary
/// A state change of the single position, produced by [`advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Flat -> Long at `price`.
    Entered { price: f64 },
    /// Long -> Flat, price reached `entry + profit`.
    TookProfit { entry: f64, price: f64 },
    /// Long -> Flat, price fell to `entry - stoploss`.
    StoppedOut { entry: f64, price: f64 },
}

/// Profit and stop-loss distances, in currency units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub profit: f64,
    pub stoploss: f64,
}

/// # Summary
/// Applies one observed price change to the position.
///
/// # Logic
/// 1. Flat and `price > previous`: enter Long at `price`.
/// 2. Then, if Long: exit with profit when `price >= entry + profit`,
///    otherwise stop out when `price <= entry - stoploss`.
///
/// All comparisons are made in whole paise.
///
/// The exit checks run after a possible entry in the same call; with positive
/// thresholds a fresh entry can never exit at its own price.
///
/// # Returns
/// Transitions in the order they happened (at most two).
///
/// # Invariants
/// - Never both a profit exit and a stop-loss for the same price.
/// - Sideways or falling prices never open a position.
pub fn advance(
    state: &mut TradeState,
    previous: f64,
    price: f64,
    thresholds: Thresholds,
) -> Vec<Transition> {
    let mut transitions = Vec::new();

    if !state.in_trade() && paise(price) > paise(previous) {
        *state = TradeState::Long { entry: price };
        transitions.push(Transition::Entered { price });
    }

    if let TradeState::Long { entry } = *state {
        if paise(price) >= paise(entry) + paise(thresholds.profit) {
            *state = TradeState::Flat;
            transitions.push(Transition::TookProfit { entry, price });
        } else if paise(price) <= paise(entry) - paise(thresholds.stoploss) {
            *state = TradeState::Flat;
            transitions.push(Transition::StoppedOut { entry, price });
        }
    }

    transitions
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: Thresholds = Thresholds {
        profit: 2.0,
        stoploss: 5.0,
    };

    #[test]
    fn test_entry_on_rise_only() {
        let mut state = TradeState::Flat;
        assert!(advance(&mut state, 1000.0, 999.0, DEFAULTS).is_empty());
        assert_eq!(state, TradeState::Flat);

        let t = advance(&mut state, 1000.0, 1004.0, DEFAULTS);
        assert_eq!(t, vec![Transition::Entered { price: 1004.0 }]);
        assert_eq!(state, TradeState::Long { entry: 1004.0 });
    }

    #[test]
    fn test_profit_exit_at_threshold() {
        let mut state = TradeState::Long { entry: 1000.0 };
        assert!(advance(&mut state, 1000.0, 1001.99, DEFAULTS).is_empty());

        let t = advance(&mut state, 1001.99, 1002.0, DEFAULTS);
        assert_eq!(
            t,
            vec![Transition::TookProfit {
                entry: 1000.0,
                price: 1002.0
            }]
        );
        assert_eq!(state, TradeState::Flat);
    }

    #[test]
    fn test_stoploss_at_threshold() {
        let mut state = TradeState::Long { entry: 1000.0 };
        assert!(advance(&mut state, 1000.0, 995.01, DEFAULTS).is_empty());

        let t = advance(&mut state, 1000.0, 994.0, DEFAULTS);
        assert_eq!(
            t,
            vec![Transition::StoppedOut {
                entry: 1000.0,
                price: 994.0
            }]
        );
        assert!(!state.in_trade());
    }

    #[test]
    fn test_exits_exactly_at_threshold_despite_float_noise() {
        // 1022.07 + 2.0 lands above 1024.07 in binary floating point
        let mut state = TradeState::Long { entry: 1022.07 };
        let t = advance(&mut state, 1023.0, 1024.07, DEFAULTS);
        assert_eq!(
            t,
            vec![Transition::TookProfit {
                entry: 1022.07,
                price: 1024.07
            }]
        );

        // 1024.07 - 5.0 lands below 1019.07
        let mut state = TradeState::Long { entry: 1024.07 };
        let t = advance(&mut state, 1020.0, 1019.07, DEFAULTS);
        assert_eq!(
            t,
            vec![Transition::StoppedOut {
                entry: 1024.07,
                price: 1019.07
            }]
        );
    }

    #[test]
    fn test_long_does_not_reenter() {
        let mut state = TradeState::Long { entry: 1000.0 };
        assert!(advance(&mut state, 1000.0, 1001.0, DEFAULTS).is_empty());
        assert_eq!(state.trade_price(), Some(1000.0));
    }

    #[test]
    fn test_invariants_over_price_walk() {
        // deterministic zig-zag walk covering rises, falls and plateaus
        let steps = [3.0, -1.5, 0.0, 2.5, -7.0, 4.0, 0.5, -0.25, 6.0, -5.0];
        let mut state = TradeState::Flat;
        let mut price = 1000.0;
        for i in 0..500 {
            let previous = price;
            price += steps[i % steps.len()] * [1.0, 1.5, 2.0][i % 3];
            let was_flat = !state.in_trade();
            let t = advance(&mut state, previous, price, DEFAULTS);

            assert_eq!(state.in_trade(), state.trade_price().is_some());
            let exits = t
                .iter()
                .filter(|x| !matches!(x, Transition::Entered { .. }))
                .count();
            assert!(exits <= 1);
            if t.iter().any(|x| matches!(x, Transition::Entered { .. })) {
                assert!(was_flat && paise(price) > paise(previous));
            }
            for x in &t {
                match *x {
                    Transition::TookProfit { entry, price } => {
                        assert!(paise(price) >= paise(entry) + 200.0)
                    }
                    Transition::StoppedOut { entry, price } => {
                        assert!(paise(price) <= paise(entry) - 500.0)
                    }
                    Transition::Entered { .. } => {}
                }
            }
        }
    }
}
