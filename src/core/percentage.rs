use crate::core::input::parse_number;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PercentageMode {
    /// What is `percentage`% of `base`?
    PercentOf { percentage: f64, base: f64 },
    /// `part` is what percent of `total`?
    WhatPercent { part: f64, total: f64 },
}

impl PercentageMode {
    pub fn percent_of_text(percentage: &str, base: &str) -> Self {
        PercentageMode::PercentOf {
            percentage: parse_number(percentage),
            base: parse_number(base),
        }
    }

    pub fn what_percent_text(part: &str, total: &str) -> Self {
        PercentageMode::WhatPercent {
            part: parse_number(part),
            total: parse_number(total),
        }
    }

    pub fn calculate(self) -> f64 {
        match self {
            PercentageMode::PercentOf { percentage, base } => percent_of(percentage, base),
            PercentageMode::WhatPercent { part, total } => what_percent(part, total),
        }
    }

    /// Sentence form of the result, two decimals.
    pub fn describe(self) -> String {
        let result = self.calculate();
        match self {
            PercentageMode::PercentOf { percentage, base } => {
                format!("{}% of {} = {:.2}", percentage, base, result)
            }
            PercentageMode::WhatPercent { part, total } => {
                format!("{} is {:.2}% of {}", part, result, total)
            }
        }
    }
}

pub fn percent_of(percentage: f64, base: f64) -> f64 {
    (percentage / 100.0) * base
}

/// Zero when `total` is zero.
pub fn what_percent(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        (part / total) * 100.0
    }
}
