use crate::core::input::{parse_number, parse_optional_number, parse_party_size};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TipPreset {
    #[default]
    #[cfg_attr(feature = "cli", value(name = "10"))]
    Ten,
    #[cfg_attr(feature = "cli", value(name = "15"))]
    Fifteen,
    #[cfg_attr(feature = "cli", value(name = "18"))]
    Eighteen,
    #[cfg_attr(feature = "cli", value(name = "20"))]
    Twenty,
}

impl TipPreset {
    pub const ALL: [TipPreset; 4] = [
        TipPreset::Ten,
        TipPreset::Fifteen,
        TipPreset::Eighteen,
        TipPreset::Twenty,
    ];

    pub fn percentage(self) -> f64 {
        match self {
            TipPreset::Ten => 10.0,
            TipPreset::Fifteen => 15.0,
            TipPreset::Eighteen => 18.0,
            TipPreset::Twenty => 20.0,
        }
    }

    pub fn from_percentage(percentage: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.percentage() == percentage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TipRate {
    Preset(TipPreset),
    Custom(f64),
}

impl Default for TipRate {
    fn default() -> Self {
        TipRate::Preset(TipPreset::default())
    }
}

impl TipRate {
    pub fn percentage(self) -> f64 {
        match self {
            TipRate::Preset(preset) => preset.percentage(),
            TipRate::Custom(percentage) => percentage,
        }
    }

    /// A filled-in custom field overrides the selected preset.
    pub fn from_inputs(preset: TipPreset, custom: &str) -> Self {
        match parse_optional_number(custom) {
            Some(percentage) => TipRate::Custom(percentage),
            None => TipRate::Preset(preset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TipBreakdown {
    pub tip_amount: f64,
    pub total: f64,
    pub per_person: f64,
}

/// `party_size` of zero is treated as one.
pub fn calculate_tip(bill: f64, rate: TipRate, party_size: u32) -> TipBreakdown {
    let tip_amount = bill * (rate.percentage() / 100.0);
    let total = bill + tip_amount;
    let per_person = total / party_size.max(1) as f64;

    TipBreakdown {
        tip_amount,
        total,
        per_person,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TipInput {
    pub bill: f64,
    pub rate: TipRate,
    pub party_size: u32,
}

impl TipInput {
    pub fn from_text(bill: &str, preset: TipPreset, custom: &str, people: &str) -> Self {
        Self {
            bill: parse_number(bill),
            rate: TipRate::from_inputs(preset, custom),
            party_size: parse_party_size(people),
        }
    }

    pub fn calculate(&self) -> TipBreakdown {
        calculate_tip(self.bill, self.rate, self.party_size)
    }
}
