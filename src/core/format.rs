use crate::domain::model::Currency;

pub fn currency_symbol(code: &str) -> String {
    Currency::find(code)
        .map(|c| c.symbol.to_string())
        .unwrap_or_else(|| code.trim().to_ascii_uppercase())
}

/// `$12.50`, `€3.00`, or `XYZ1.00` for codes outside the catalog.
pub fn format_money(amount: f64, code: &str) -> String {
    format!("{}{:.2}", currency_symbol(code), amount)
}

pub fn format_rate(from: &str, to: &str, rate: f64) -> String {
    format!("1 {} = {:.4} {}", from, rate, to)
}
