//! Participation-rate market impact model.
//!
//! Per instrument the cost is
//! `alpha * (trade_limit / adv20)^beta * volatility * (entry_price + exit_price)`.
//! Entry and exit legs are summed rather than netted.

use super::execution::SizedTrade;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlippageParams {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for SlippageParams {
    fn default() -> Self {
        SlippageParams {
            alpha: 0.2,
            beta: 0.7,
        }
    }
}

/// Impact cost for one leg pair, or `None` when the inputs cannot be priced
/// (missing ADV20 or volatility, non-positive ADV20, non-finite result).
pub fn slippage_cost(
    trade_limit: f64,
    adv20: Option<f64>,
    volatility: Option<f64>,
    entry_price: f64,
    exit_price: f64,
    params: &SlippageParams,
) -> Option<f64> {
    let adv20 = adv20.filter(|a| a.is_finite() && *a > 0.0)?;
    let volatility = volatility.filter(|v| v.is_finite())?;

    let impact = params.alpha * (trade_limit / adv20).powf(params.beta);
    let cost = impact * entry_price * volatility + impact * exit_price * volatility;
    cost.is_finite().then_some(cost)
}

/// Batch-level slippage. Rows without a priced slippage contribute nothing.
pub fn total_slippage(trades: &[SizedTrade]) -> f64 {
    trades.iter().filter_map(|t| t.slippage_cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn defaults() {
        let p = SlippageParams::default();
        assert_eq!(p.alpha, 0.2);
        assert_eq!(p.beta, 0.7);
    }

    #[test]
    fn reference_scenario() {
        let cost = slippage_cost(20.0, Some(2000.0), Some(0.01), 100.0, 102.0, &SlippageParams::default())
            .unwrap();
        let expected = 0.2 * (0.01_f64).powf(0.7) * (100.0 * 0.01 + 102.0 * 0.01);
        assert_relative_eq!(cost, expected, epsilon = 1e-12);
        assert!(cost > 0.0 && cost < 1.0);
    }

    #[test]
    fn missing_adv20_is_excluded() {
        assert!(slippage_cost(20.0, None, Some(0.01), 100.0, 102.0, &SlippageParams::default()).is_none());
    }

    #[test]
    fn missing_volatility_is_excluded() {
        assert!(slippage_cost(20.0, Some(2000.0), None, 100.0, 102.0, &SlippageParams::default()).is_none());
    }

    #[test]
    fn zero_adv20_is_excluded() {
        assert!(slippage_cost(20.0, Some(0.0), Some(0.01), 100.0, 102.0, &SlippageParams::default()).is_none());
    }

    #[test]
    fn zero_volatility_costs_nothing() {
        let cost = slippage_cost(20.0, Some(2000.0), Some(0.0), 100.0, 102.0, &SlippageParams::default());
        assert_eq!(cost, Some(0.0));
    }

    #[test]
    fn higher_participation_costs_more() {
        let p = SlippageParams::default();
        let small = slippage_cost(10.0, Some(2000.0), Some(0.02), 50.0, 50.0, &p).unwrap();
        let large = slippage_cost(20.0, Some(2000.0), Some(0.02), 50.0, 50.0, &p).unwrap();
        assert!(large > small);
    }

    proptest! {
        #[test]
        fn non_negative_for_non_negative_inputs(
            trade_limit in 0.0..1e6_f64,
            adv20 in 1.0..1e8_f64,
            volatility in 0.0..1.0_f64,
            entry in 0.01..5000.0_f64,
            exit in 0.01..5000.0_f64,
            alpha in 0.0..2.0_f64,
            beta in 0.0..2.0_f64,
        ) {
            let params = SlippageParams { alpha, beta };
            let cost = slippage_cost(trade_limit, Some(adv20), Some(volatility), entry, exit, &params);
            prop_assert!(cost.is_some());
            prop_assert!(cost.unwrap() >= 0.0);
        }
    }
}
