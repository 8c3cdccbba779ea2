//! Finance data returned by the remote flows.
//!
//! Every field is defaulted: the flows wrap third-party market data and
//! routinely omit values or send them as `null`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One symbol match from a stock search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StockSuggestion {
    #[serde(deserialize_with = "or_default")]
    pub symbol: String,
    #[serde(deserialize_with = "or_default")]
    pub name: String,
    #[serde(deserialize_with = "or_default")]
    pub currency: String,
    #[serde(deserialize_with = "or_default")]
    pub exchange_full_name: String,
    #[serde(deserialize_with = "or_default")]
    pub exchange: String,
}

/// Company profile and quote snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    #[serde(deserialize_with = "or_default")]
    pub symbol: String,
    #[serde(deserialize_with = "or_default")]
    pub company_name: String,

    // Quote
    #[serde(deserialize_with = "or_default")]
    pub price: f64,
    #[serde(deserialize_with = "or_default")]
    pub market_cap: f64,
    #[serde(deserialize_with = "or_default")]
    pub beta: f64,
    #[serde(deserialize_with = "or_default")]
    pub last_dividend: f64,
    #[serde(deserialize_with = "or_default")]
    pub range: String,
    #[serde(deserialize_with = "or_default")]
    pub change: f64,
    #[serde(deserialize_with = "or_default")]
    pub change_percentage: f64,
    #[serde(deserialize_with = "or_default")]
    pub volume: f64,
    #[serde(deserialize_with = "or_default")]
    pub average_volume: f64,
    #[serde(deserialize_with = "or_default")]
    pub currency: String,

    // Identifiers
    #[serde(deserialize_with = "or_default")]
    pub cik: String,
    #[serde(deserialize_with = "or_default")]
    pub isin: String,
    #[serde(deserialize_with = "or_default")]
    pub cusip: String,
    #[serde(deserialize_with = "or_default")]
    pub exchange_full_name: String,
    #[serde(deserialize_with = "or_default")]
    pub exchange: String,

    // Company
    #[serde(deserialize_with = "or_default")]
    pub industry: String,
    #[serde(deserialize_with = "or_default")]
    pub sector: String,
    #[serde(deserialize_with = "or_default")]
    pub website: String,
    #[serde(deserialize_with = "or_default")]
    pub description: String,
    #[serde(deserialize_with = "or_default")]
    pub ceo: String,
    #[serde(deserialize_with = "or_default")]
    pub country: String,
    #[serde(deserialize_with = "string_or_number")]
    pub full_time_employees: String,
    #[serde(deserialize_with = "or_default")]
    pub phone: String,
    #[serde(deserialize_with = "or_default")]
    pub address: String,
    #[serde(deserialize_with = "or_default")]
    pub city: String,
    #[serde(deserialize_with = "or_default")]
    pub state: String,
    #[serde(deserialize_with = "or_default")]
    pub zip: String,
    #[serde(deserialize_with = "or_default")]
    pub image: String,
    #[serde(deserialize_with = "or_default")]
    pub ipo_date: String,

    // Flags
    #[serde(deserialize_with = "or_default")]
    pub default_image: bool,
    #[serde(deserialize_with = "or_default")]
    pub is_etf: bool,
    #[serde(deserialize_with = "or_default")]
    pub is_actively_trading: bool,
    #[serde(deserialize_with = "or_default")]
    pub is_adr: bool,
    #[serde(deserialize_with = "or_default")]
    pub is_fund: bool,
}

/// A chart produced by the analysis flow. `code` is an opaque chart
/// definition carried through as data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSpec {
    #[serde(deserialize_with = "or_default")]
    pub title: String,
    #[serde(deserialize_with = "or_default")]
    pub description: String,
    #[serde(deserialize_with = "or_default")]
    pub code: String,
}

/// Markdown analysis comparing several companies, plus chart specs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativeAnalysis {
    pub analysis: String,
    pub charts: Vec<ChartSpec>,
}

/// Group suggestions by exchange, keeping first-seen exchange order.
pub fn group_by_exchange(suggestions: &[StockSuggestion]) -> Vec<(String, Vec<StockSuggestion>)> {
    let mut groups: Vec<(String, Vec<StockSuggestion>)> = Vec::new();
    for suggestion in suggestions {
        match groups.iter_mut().find(|(ex, _)| *ex == suggestion.exchange) {
            Some((_, members)) => members.push(suggestion.clone()),
            None => groups.push((suggestion.exchange.clone(), vec![suggestion.clone()])),
        }
    }
    groups
}

/// Treat an explicit `null` like a missing key.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
