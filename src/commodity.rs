// src/commodity.rs
//! Commodity types and the factor identifiers derived from them.
//!
//! Factor display names are resolved into a [`FactorId`] once, by exact match, at the
//! edge of the workflow. Nothing downstream inspects display strings again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IntakeError;

/// Coffee types the forecasting service is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommodityType {
    Arabica,
    Excelsa,
    Robusta,
}

impl CommodityType {
    pub const ALL: [CommodityType; 3] = [
        CommodityType::Arabica,
        CommodityType::Excelsa,
        CommodityType::Robusta,
    ];

    /// Wire discriminator sent in the `type` part and stored as `coffee_type`.
    pub fn slug(self) -> &'static str {
        match self {
            CommodityType::Arabica => "arabica",
            CommodityType::Excelsa => "excelsa",
            CommodityType::Robusta => "robusta",
        }
    }

    /// Capitalized name used in factor labels ("Arabica Farmgate Price").
    pub fn display_name(self) -> &'static str {
        match self {
            CommodityType::Arabica => "Arabica",
            CommodityType::Excelsa => "Excelsa",
            CommodityType::Robusta => "Robusta",
        }
    }

    pub fn required_set(self) -> RequiredSet {
        RequiredSet { commodity: self }
    }
}

impl fmt::Display for CommodityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for CommodityType {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CommodityType::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| IntakeError::UnknownCommodity {
                slug: wanted.to_string(),
            })
    }
}

/// The two type-specific series every commodity needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MainFactorKind {
    PriceSeries,
    VolumeSeries,
}

impl MainFactorKind {
    pub const ALL: [MainFactorKind; 2] = [MainFactorKind::PriceSeries, MainFactorKind::VolumeSeries];

    pub fn label(self, commodity: CommodityType) -> String {
        let suffix = match self {
            MainFactorKind::PriceSeries => "Farmgate Price",
            MainFactorKind::VolumeSeries => "Production Volume",
        };
        format!("{} {}", commodity.display_name(), suffix)
    }
}

/// Macro-economic inputs common to every commodity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharedFactor {
    InflationRate,
    NetReturn,
    ProductionCost,
}

impl SharedFactor {
    pub const ALL: [SharedFactor; 3] = [
        SharedFactor::InflationRate,
        SharedFactor::NetReturn,
        SharedFactor::ProductionCost,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SharedFactor::InflationRate => "Inflation rate",
            SharedFactor::NetReturn => "Net Return",
            SharedFactor::ProductionCost => "Production Cost",
        }
    }

    /// Exact-match lookup; no trimming, no case folding, no containment.
    pub fn from_label(name: &str) -> Option<Self> {
        SharedFactor::ALL.into_iter().find(|f| f.label() == name)
    }
}

/// Tagged identifier for any factor a session can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactorId {
    Main(MainFactorKind),
    Shared(SharedFactor),
}

impl FactorId {
    /// Resolve a display name within one commodity's session.
    pub fn resolve(commodity: CommodityType, name: &str) -> Result<Self, IntakeError> {
        if let Some(kind) = MainFactorKind::ALL
            .into_iter()
            .find(|k| k.label(commodity) == name)
        {
            return Ok(FactorId::Main(kind));
        }
        SharedFactor::from_label(name)
            .map(FactorId::Shared)
            .ok_or_else(|| IntakeError::unknown_factor(name))
    }

    pub fn label(self, commodity: CommodityType) -> String {
        match self {
            FactorId::Main(kind) => kind.label(commodity),
            FactorId::Shared(shared) => shared.label().to_string(),
        }
    }
}

/// The five factors a forecast needs: both main series, then the shared factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredSet {
    commodity: CommodityType,
}

impl RequiredSet {
    pub fn ids(&self) -> [FactorId; 5] {
        [
            FactorId::Main(MainFactorKind::PriceSeries),
            FactorId::Main(MainFactorKind::VolumeSeries),
            FactorId::Shared(SharedFactor::InflationRate),
            FactorId::Shared(SharedFactor::NetReturn),
            FactorId::Shared(SharedFactor::ProductionCost),
        ]
    }

    pub fn labels(&self) -> Vec<String> {
        self.ids()
            .into_iter()
            .map(|id| id.label(self.commodity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabica_required_set_is_canonical() {
        assert_eq!(
            CommodityType::Arabica.required_set().labels(),
            vec![
                "Arabica Farmgate Price",
                "Arabica Production Volume",
                "Inflation rate",
                "Net Return",
                "Production Cost",
            ]
        );
    }

    #[test]
    fn slug_parsing_is_case_insensitive() {
        assert_eq!("Robusta".parse::<CommodityType>().unwrap(), CommodityType::Robusta);
        assert_eq!(" excelsa ".parse::<CommodityType>().unwrap(), CommodityType::Excelsa);
        assert!(matches!(
            "liberica".parse::<CommodityType>(),
            Err(IntakeError::UnknownCommodity { .. })
        ));
    }

    #[test]
    fn resolve_uses_exact_identity() {
        let c = CommodityType::Arabica;
        assert_eq!(
            FactorId::resolve(c, "Arabica Farmgate Price").unwrap(),
            FactorId::Main(MainFactorKind::PriceSeries)
        );
        assert_eq!(
            FactorId::resolve(c, "Net Return").unwrap(),
            FactorId::Shared(SharedFactor::NetReturn)
        );
        // Containment and near-misses are not matches.
        for name in [
            "Farmgate Price",
            "Arabica Farmgate Price (2024)",
            "arabica farmgate price",
            "Arabica Production",
            "Net Return ",
            "Robusta Farmgate Price",
        ] {
            assert!(
                matches!(FactorId::resolve(c, name), Err(IntakeError::UnknownFactor { .. })),
                "{name:?} must not resolve"
            );
        }
    }

    #[test]
    fn label_round_trips_through_resolve() {
        for c in CommodityType::ALL {
            for id in c.required_set().ids() {
                assert_eq!(FactorId::resolve(c, &id.label(c)).unwrap(), id);
            }
        }
    }
}
