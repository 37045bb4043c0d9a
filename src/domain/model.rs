use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Target currency code -> multiplier relative to one unit of the base currency.
pub type RateTable = HashMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

pub const SUPPORTED_CURRENCIES: [Currency; 9] = [
    Currency { code: "USD", name: "US Dollar", symbol: "$" },
    Currency { code: "EUR", name: "Euro", symbol: "€" },
    Currency { code: "GBP", name: "British Pound", symbol: "£" },
    Currency { code: "PKR", name: "Pakistani Rupee", symbol: "₨" },
    Currency { code: "INR", name: "Indian Rupee", symbol: "₹" },
    Currency { code: "JPY", name: "Japanese Yen", symbol: "¥" },
    Currency { code: "CAD", name: "Canadian Dollar", symbol: "C$" },
    Currency { code: "AUD", name: "Australian Dollar", symbol: "A$" },
    Currency { code: "CHF", name: "Swiss Franc", symbol: "CHF" },
];

impl Currency {
    pub fn find(code: &str) -> Option<&'static Currency> {
        SUPPORTED_CURRENCIES
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}

/// Upper-cased, trimmed currency code used as a cache key.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Per-session exchange-rate cache. Entries are added lazily per base currency
/// and never evicted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RateCache {
    pub tables: HashMap<String, RateTable>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl RateCache {
    /// Replaces the table for `base`, forcing the self-rate to 1.
    pub fn store(&mut self, base: &str, mut table: RateTable, at: DateTime<Utc>) {
        let base = normalize_code(base);
        table.insert(base.clone(), 1.0);
        self.tables.insert(base, table);
        self.last_updated = Some(at);
    }

    pub fn table(&self, base: &str) -> Option<&RateTable> {
        self.tables.get(&normalize_code(base))
    }

    pub fn lookup(&self, from: &str, to: &str) -> Option<f64> {
        self.table(from)
            .and_then(|table| table.get(&normalize_code(to)))
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConverterState {
    Idle,
    Fetching,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConverterStatus {
    pub state: ConverterState,
    pub in_flight: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub warning: Option<String>,
}

impl Default for ConverterStatus {
    fn default() -> Self {
        Self {
            state: ConverterState::Idle,
            in_flight: 0,
            last_updated: None,
            warning: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub result: f64,
}
