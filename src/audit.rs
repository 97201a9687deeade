//! Price audit engine
//!
//! Estimates a fair list/sale price from cost and market signals and scores
//! the "inflate the list price, then discount back to normal" pattern.
//! Pure computation: no I/O, no shared state, same input -> same output.

use crate::config_manager::{AuditDefaults, CostModel};
use crate::stats::{clamp, format_amount, median, pct};
use crate::types::{AuditFlag, AuditMetrics, Baseline, PriceAuditInput, PriceAuditOutput, RiskLevel};
use tracing::debug;

/// Share of the expected list price assumed as a normal sale price (12% off)
const FALLBACK_SALE_RATIO: f64 = 0.88;

// Score weights, sum to 100
const WEIGHT_LIST_OVER_BASELINE: f64 = 28.0;
const WEIGHT_DISCOUNT: f64 = 24.0;
const WEIGHT_SALE_NEAR_BASELINE: f64 = 20.0;
const WEIGHT_COMPETITOR_PARITY: f64 = 16.0;
const WEIGHT_HISTORICAL: f64 = 12.0;

// Flag thresholds
const LIST_OVER_BASELINE_FLAG: f64 = 0.3;
const DEEP_DISCOUNT_FLAG: f64 = 0.5;
const SALE_NEAR_BASELINE_FLAG: f64 = 0.7;
const PARITY_BAND: (f64, f64) = (0.9, 1.1);
const HISTORICAL_RUN_UP_FLAG: f64 = 0.5;

// Historical hint weighting: reported cost jumps count more than list jumps
const COST_JUMP_WEIGHT: f64 = 0.6;
const LIST_JUMP_WEIGHT: f64 = 0.4;

/// Price audit engine bound to a set of input defaults
#[derive(Debug, Clone, Default)]
pub struct PriceAuditEngine {
    defaults: AuditDefaults,
}

impl PriceAuditEngine {
    pub fn new(defaults: AuditDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &AuditDefaults {
        &self.defaults
    }

    /// Run a full audit.
    ///
    /// Never fails: missing competitors, history or sale price degrade to
    /// neutral values. Callers must reject non-finite `cost`/`list_price`.
    pub fn audit(&self, input: &PriceAuditInput) -> PriceAuditOutput {
        let model = self.defaults.resolve(input);
        let effective = input.effective_price();

        let expected_list = expected_list_price(input.cost, &model);
        let expected_sale = expected_sale_price(input, expected_list);

        let discount = discount_rate(input.list_price, input.sale_price);
        let list_over_raw = input.list_price / expected_list.max(1.0) - 1.0;
        let list_over_baseline = clamp(list_over_raw, 0.0, 2.0);
        let sale_near_baseline = clamp(
            1.0 - (effective - expected_sale).abs() / expected_sale.max(1.0),
            0.0,
            1.0,
        );

        let competitor_median = median(&competitor_prices(input));
        let has_competitors = competitor_median.is_finite();
        let competitor_index = if has_competitors {
            effective / competitor_median
        } else {
            1.0
        };

        let historical_hint = historical_inflation_hint(input);

        let metrics = AuditMetrics {
            discount_rate: discount,
            list_over_baseline,
            sale_near_baseline,
            competitor_index,
            historical_inflation_hint: historical_hint,
        };

        let flags = evaluate_flags(&metrics);
        let score = score(&metrics);

        let explanation = vec![
            format!("Expected list price: {}", money(expected_list, &model.currency)),
            format!("Expected sale price: {}", money(expected_sale, &model.currency)),
            format!("Current discount: {}%", pct(discount)),
            // Narrative line caps the overshoot at 100% even though the metric allows 200%
            format!("List price over baseline: {}%", pct(clamp(list_over_raw, 0.0, 1.0))),
            if has_competitors {
                format!("Price index vs competitor median: {:.2}", competitor_index)
            } else {
                "No competitor data".to_string()
            },
            format!("Historical run-up signal: {}%", pct(historical_hint)),
        ];

        debug!(
            "Audit {} cost={} list={} -> score={} flags=[{}]",
            model.currency,
            input.cost,
            input.list_price,
            score,
            flags.iter().map(|f| f.code()).collect::<Vec<_>>().join(",")
        );

        PriceAuditOutput {
            baseline: Baseline {
                expected_list_price: expected_list,
                expected_sale_price: expected_sale,
            },
            metrics,
            score,
            risk_level: RiskLevel::from_score(score),
            flags,
            explanation,
        }
    }
}

/// Audit with the stock defaults
pub fn audit_price(input: &PriceAuditInput) -> PriceAuditOutput {
    PriceAuditEngine::default().audit(input)
}

/// Cost -> margin -> platform fee -> tax -> shipping, each step compounding
/// on the previous subtotal
pub fn expected_list_price(cost: f64, model: &CostModel) -> f64 {
    let base = cost * (1.0 + model.margin.midpoint());
    let with_fee = base * (1.0 + model.platform_fee_rate);
    let with_tax = with_fee * (1.0 + model.tax_rate);
    with_tax + model.shipping_fee
}

/// Median of the finite candidates among competitor median, history median
/// and the fixed fallback. Falls back to `expected_list` when none is finite.
pub fn expected_sale_price(input: &PriceAuditInput, expected_list: f64) -> f64 {
    let candidates = [
        median(&competitor_prices(input)),
        median(&history_prices(input)),
        expected_list * FALLBACK_SALE_RATIO,
    ];

    let finite: Vec<f64> = candidates.into_iter().filter(|c| c.is_finite()).collect();
    if finite.is_empty() {
        return expected_list;
    }
    median(&finite)
}

/// Advertised discount depth in [0, 1]
pub fn discount_rate(list_price: f64, sale_price: Option<f64>) -> f64 {
    match sale_price {
        Some(sale) if sale.is_finite() && sale > 0.0 && list_price > 0.0 => {
            clamp((list_price - sale) / list_price, 0.0, 1.0)
        }
        _ => 0.0,
    }
}

/// Cost/list escalation from the first history point to the current input, in [0, 1]
pub fn historical_inflation_hint(input: &PriceAuditInput) -> f64 {
    if input.history.len() < 2 {
        return 0.0;
    }
    let first = &input.history[0];

    let cost_jump = match first.cost {
        Some(first_cost) if first_cost != 0.0 && input.cost != 0.0 => {
            clamp((input.cost - first_cost) / first_cost.max(1.0), 0.0, 1.0)
        }
        _ => 0.0,
    };
    // Missing first list price reads as NaN and clamps to no jump
    let first_list = first.list_price.unwrap_or(f64::NAN);
    let list_jump = clamp(
        (input.list_price - first_list) / first_list.max(1.0),
        0.0,
        1.0,
    );

    clamp(cost_jump * COST_JUMP_WEIGHT + list_jump * LIST_JUMP_WEIGHT, 0.0, 1.0)
}

/// Weighted blend of the clamped metrics, rounded onto 0-100
pub fn score(metrics: &AuditMetrics) -> u8 {
    let raw = clamp(metrics.list_over_baseline, 0.0, 1.0) * WEIGHT_LIST_OVER_BASELINE
        + clamp(metrics.discount_rate, 0.0, 1.0) * WEIGHT_DISCOUNT
        + clamp(metrics.sale_near_baseline, 0.0, 1.0) * WEIGHT_SALE_NEAR_BASELINE
        + clamp(1.0 - (1.0 - metrics.competitor_index).abs(), 0.0, 1.0) * WEIGHT_COMPETITOR_PARITY
        + clamp(metrics.historical_inflation_hint, 0.0, 1.0) * WEIGHT_HISTORICAL;

    clamp(raw.round(), 0.0, 100.0) as u8
}

fn evaluate_flags(metrics: &AuditMetrics) -> Vec<AuditFlag> {
    let mut flags = Vec::new();
    if metrics.list_over_baseline > LIST_OVER_BASELINE_FLAG {
        flags.push(AuditFlag::ListOverBaseline);
    }
    if metrics.discount_rate >= DEEP_DISCOUNT_FLAG {
        flags.push(AuditFlag::DeepDiscount);
    }
    if metrics.sale_near_baseline > SALE_NEAR_BASELINE_FLAG {
        flags.push(AuditFlag::SaleNearBaseline);
    }
    if metrics.competitor_index >= PARITY_BAND.0 && metrics.competitor_index <= PARITY_BAND.1 {
        flags.push(AuditFlag::MarketParity);
    }
    if metrics.historical_inflation_hint > HISTORICAL_RUN_UP_FLAG {
        flags.push(AuditFlag::HistoricalRunUp);
    }
    flags
}

fn competitor_prices(input: &PriceAuditInput) -> Vec<f64> {
    positive_finite(input.competitors.iter().map(|c| c.effective_price()))
}

fn history_prices(input: &PriceAuditInput) -> Vec<f64> {
    positive_finite(input.history.iter().map(|h| h.effective_price()))
}

fn positive_finite(prices: impl Iterator<Item = f64>) -> Vec<f64> {
    prices.filter(|p| p.is_finite() && *p > 0.0).collect()
}

fn money(value: f64, currency: &str) -> String {
    if currency.is_empty() {
        format_amount(value)
    } else {
        format!("{} {}", format_amount(value), currency)
    }
}
