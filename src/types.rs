//! Type definitions for the price audit engine
//!
//! Wire names are camelCase to match what the landing page sends.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Market entries are best-effort: a field of the wrong type reads as absent
/// instead of failing the whole request.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, String>(deserializer)?.unwrap_or_default())
}

/// Sale price when present, else list price; NaN when neither is usable
fn effective(sale_price: Option<f64>, list_price: Option<f64>) -> f64 {
    sale_price.or(list_price).unwrap_or(f64::NAN)
}

/// Competitor reference price for the same or an equivalent product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorPrice {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub list_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
}

impl CompetitorPrice {
    /// Price actually offered: sale price when present, else list price
    pub fn effective_price(&self) -> f64 {
        effective(self.sale_price, self.list_price)
    }
}

/// Past observation of this product's own pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPrice {
    /// UNIX milliseconds
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub list_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl HistoricalPrice {
    pub fn effective_price(&self) -> f64 {
        effective(self.sale_price, self.list_price)
    }
}

/// Band of acceptable markup over cost (0.2 = 20%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginRange {
    pub min: f64,
    pub max: f64,
}

impl MarginRange {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl Default for MarginRange {
    fn default() -> Self {
        Self { min: 0.2, max: 0.5 }
    }
}

/// Audit request. Optional cost components are resolved against
/// [`crate::config_manager::AuditDefaults`] before any arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAuditInput {
    /// Carried through to the explanation, never converted
    #[serde(default)]
    pub currency: String,
    pub cost: f64,
    pub list_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_fee_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub competitors: Vec<CompetitorPrice>,
    /// Oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoricalPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_margin_range: Option<MarginRange>,
}

impl PriceAuditInput {
    /// Bare input with only the required fields set
    pub fn new(currency: &str, cost: f64, list_price: f64) -> Self {
        Self {
            currency: currency.to_string(),
            cost,
            list_price,
            sale_price: None,
            shipping_fee: None,
            platform_fee_rate: None,
            tax_rate: None,
            competitors: Vec::new(),
            history: Vec::new(),
            normal_margin_range: None,
        }
    }

    pub fn effective_price(&self) -> f64 {
        self.sale_price.unwrap_or(self.list_price)
    }
}

/// Model estimate of fair prices
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub expected_list_price: f64,
    pub expected_sale_price: f64,
}

/// Derived ratios feeding the score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditMetrics {
    /// [0, 1]
    pub discount_rate: f64,
    /// [0, 2]
    pub list_over_baseline: f64,
    /// [0, 1]
    pub sale_near_baseline: f64,
    /// Unclamped, 1.0 = parity with competitor median
    pub competitor_index: f64,
    /// [0, 1]
    pub historical_inflation_hint: f64,
}

/// Rule-based condition. Market parity counts as corroborating evidence:
/// a discounted price that lands on the market median is what a successful
/// inflate-then-discount looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditFlag {
    ListOverBaseline,
    DeepDiscount,
    SaleNearBaseline,
    MarketParity,
    HistoricalRunUp,
}

impl AuditFlag {
    pub fn code(&self) -> &'static str {
        match self {
            AuditFlag::ListOverBaseline => "list_over_baseline",
            AuditFlag::DeepDiscount => "deep_discount",
            AuditFlag::SaleNearBaseline => "sale_near_baseline",
            AuditFlag::MarketParity => "market_parity",
            AuditFlag::HistoricalRunUp => "historical_run_up",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuditFlag::ListOverBaseline => "List price unreasonably exceeds the fair baseline",
            AuditFlag::DeepDiscount => "Discount of 50% or more, suggests viral-bait framing",
            AuditFlag::SaleNearBaseline => "The 'discounted' price is actually close to the fair price",
            AuditFlag::MarketParity => "Current price matches the competitor median",
            AuditFlag::HistoricalRunUp => "Evidence of a prior cost/price run-up",
        }
    }
}

impl Serialize for AuditFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Display banding of the suspicion score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => RiskLevel::VeryHigh,
            50..=69 => RiskLevel::High,
            30..=49 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

/// Audit result, entirely derived from the input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAuditOutput {
    pub baseline: Baseline,
    pub metrics: AuditMetrics,
    /// 0-100, higher = stronger inflate-then-discount suspicion
    pub score: u8,
    pub risk_level: RiskLevel,
    /// Evaluation order
    pub flags: Vec<AuditFlag>,
    /// Computation order
    pub explanation: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_deserializes_camel_case_with_defaults() {
        let input: PriceAuditInput = serde_json::from_str(
            r#"{
                "currency": "KRW",
                "cost": 12000,
                "listPrice": 59000,
                "salePrice": 19900,
                "competitors": [{"name": "A", "listPrice": 21900}],
                "history": [{"ts": 1700000000000, "listPrice": 24900, "cost": 9000}]
            }"#,
        )
        .unwrap();

        assert_eq!(input.currency, "KRW");
        assert_eq!(input.sale_price, Some(19900.0));
        assert_eq!(input.shipping_fee, None);
        assert_eq!(input.competitors[0].effective_price(), 21900.0);
        assert_eq!(input.history[0].cost, Some(9000.0));
        assert!(input.normal_margin_range.is_none());
    }

    #[test]
    fn test_market_entries_tolerate_bad_prices() {
        let input: PriceAuditInput = serde_json::from_str(
            r#"{
                "cost": 100,
                "listPrice": 200,
                "competitors": [
                    {"name": "A", "salePrice": 150},
                    {"name": null, "listPrice": "n/a"},
                    {"listPrice": null, "salePrice": 140}
                ],
                "history": [{"ts": "yesterday", "listPrice": 180, "cost": "?"}]
            }"#,
        )
        .unwrap();

        assert_eq!(input.competitors[0].effective_price(), 150.0);
        assert_eq!(input.competitors[1].name, "");
        assert!(input.competitors[1].effective_price().is_nan());
        assert_eq!(input.competitors[2].effective_price(), 140.0);
        assert_eq!(input.history[0].ts, None);
        assert_eq!(input.history[0].cost, None);
        assert_eq!(input.history[0].effective_price(), 180.0);
    }

    #[test]
    fn test_effective_price_prefers_sale() {
        let mut input = PriceAuditInput::new("KRW", 100.0, 200.0);
        assert_eq!(input.effective_price(), 200.0);
        input.sale_price = Some(150.0);
        assert_eq!(input.effective_price(), 150.0);
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::VeryHigh);
    }

    #[test]
    fn test_flag_serializes_as_message() {
        let json = serde_json::to_string(&vec![AuditFlag::DeepDiscount]).unwrap();
        assert_eq!(json, format!("[\"{}\"]", AuditFlag::DeepDiscount.message()));
    }
}
