//! Demo inputs shown on the landing page

use crate::types::{CompetitorPrice, HistoricalPrice, PriceAuditInput};
use serde::Serialize;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize)]
pub struct AuditExample {
    pub name: &'static str,
    pub input: PriceAuditInput,
}

/// Cost reported up, list price inflated to 59,000, then "66% off" to 19,900.
/// History timestamps are placed 60 and 30 days before `now_ms`.
pub fn suspicious_input(now_ms: i64) -> PriceAuditInput {
    PriceAuditInput {
        sale_price: Some(19900.0),
        shipping_fee: Some(3000.0),
        platform_fee_rate: Some(0.1),
        tax_rate: Some(0.1),
        competitors: vec![
            competitor("Mall A", 21900.0, None),
            competitor("Mall B", 20900.0, Some(19900.0)),
            competitor("Mall C", 22900.0, None),
        ],
        history: vec![
            HistoricalPrice {
                ts: Some(now_ms - 60 * DAY_MS),
                list_price: Some(24900.0),
                sale_price: Some(19900.0),
                cost: Some(9000.0),
            },
            HistoricalPrice {
                ts: Some(now_ms - 30 * DAY_MS),
                list_price: Some(26900.0),
                sale_price: Some(19900.0),
                cost: Some(9500.0),
            },
        ],
        ..PriceAuditInput::new("KRW", 12000.0, 59000.0)
    }
}

/// Modest discount in line with the market, no history
pub fn fair_input() -> PriceAuditInput {
    PriceAuditInput {
        sale_price: Some(22900.0),
        shipping_fee: Some(3000.0),
        platform_fee_rate: Some(0.1),
        tax_rate: Some(0.1),
        competitors: vec![
            competitor("Mall A", 25900.0, Some(23900.0)),
            competitor("Mall B", 24900.0, Some(22900.0)),
            competitor("Mall C", 26900.0, Some(24900.0)),
        ],
        ..PriceAuditInput::new("KRW", 15000.0, 24900.0)
    }
}

pub fn examples(now_ms: i64) -> Vec<AuditExample> {
    vec![
        AuditExample {
            name: "Suspicious: inflated cost, then discounted",
            input: suspicious_input(now_ms),
        },
        AuditExample {
            name: "Fair: reasonable pricing",
            input: fair_input(),
        },
    ]
}

fn competitor(name: &str, list_price: f64, sale_price: Option<f64>) -> CompetitorPrice {
    CompetitorPrice {
        name: name.to_string(),
        list_price: Some(list_price),
        sale_price,
    }
}
