// src/table/indicator.rs

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::TableError;

/// Dashboard grouping of indicators (the economic / education / health views).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Economic,
    Education,
    Health,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Economic, Category::Education, Category::Health];

    pub fn indicators(self) -> Vec<Indicator> {
        Indicator::ALL
            .iter()
            .copied()
            .filter(|i| i.category() == self)
            .collect()
    }
}

/// The fixed set of indicators known to the dashboard.
///
/// Each variant has a snake_case column key (used in tables, config and
/// reports) and a World Bank indicator code (used by the live provider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    GdpPerCapita,
    GiniIndex,
    PovertyRate,
    LiteracyRate,
    PrimaryEnrollment,
    SecondaryEnrollment,
    EducationSpending,
    LifeExpectancy,
    InfantMortality,
    HealthSpending,
}

impl Indicator {
    pub const ALL: [Indicator; 10] = [
        Indicator::GdpPerCapita,
        Indicator::GiniIndex,
        Indicator::PovertyRate,
        Indicator::LiteracyRate,
        Indicator::PrimaryEnrollment,
        Indicator::SecondaryEnrollment,
        Indicator::EducationSpending,
        Indicator::LifeExpectancy,
        Indicator::InfantMortality,
        Indicator::HealthSpending,
    ];

    /// Column key, e.g. `gdp_per_capita`.
    pub fn key(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "gdp_per_capita",
            Indicator::GiniIndex => "gini_index",
            Indicator::PovertyRate => "poverty_rate",
            Indicator::LiteracyRate => "literacy_rate",
            Indicator::PrimaryEnrollment => "primary_enrollment",
            Indicator::SecondaryEnrollment => "secondary_enrollment",
            Indicator::EducationSpending => "education_spending",
            Indicator::LifeExpectancy => "life_expectancy",
            Indicator::InfantMortality => "infant_mortality",
            Indicator::HealthSpending => "health_spending",
        }
    }

    /// World Bank Indicators API code.
    pub fn code(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "NY.GDP.PCAP.PP.CD",
            Indicator::GiniIndex => "SI.POV.GINI",
            Indicator::PovertyRate => "SI.POV.DDAY",
            Indicator::LiteracyRate => "SE.ADT.LITR.ZS",
            Indicator::PrimaryEnrollment => "SE.PRM.ENRR",
            Indicator::SecondaryEnrollment => "SE.SEC.ENRR",
            Indicator::EducationSpending => "SE.XPD.TOTL.GD.ZS",
            Indicator::LifeExpectancy => "SP.DYN.LE00.IN",
            Indicator::InfantMortality => "SP.DYN.IMRT.IN",
            Indicator::HealthSpending => "SH.XPD.CHEX.PC.CD",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "GDP per capita (PPP)",
            Indicator::GiniIndex => "Gini index",
            Indicator::PovertyRate => "Poverty headcount ratio",
            Indicator::LiteracyRate => "Literacy rate",
            Indicator::PrimaryEnrollment => "School enrollment (primary)",
            Indicator::SecondaryEnrollment => "School enrollment (secondary)",
            Indicator::EducationSpending => "Government education spending",
            Indicator::LifeExpectancy => "Life expectancy",
            Indicator::InfantMortality => "Infant mortality rate",
            Indicator::HealthSpending => "Health spending per capita",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Indicator::GdpPerCapita | Indicator::GiniIndex | Indicator::PovertyRate => {
                Category::Economic
            }
            Indicator::LiteracyRate
            | Indicator::PrimaryEnrollment
            | Indicator::SecondaryEnrollment
            | Indicator::EducationSpending => Category::Education,
            Indicator::LifeExpectancy | Indicator::InfantMortality | Indicator::HealthSpending => {
                Category::Health
            }
        }
    }

    /// False for indicators where a larger value means a worse outcome.
    pub fn higher_is_better(self) -> bool {
        !matches!(
            self,
            Indicator::GiniIndex | Indicator::PovertyRate | Indicator::InfantMortality
        )
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.key() == key)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Accepts either the column key or the World Bank code.
impl FromStr for Indicator {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_key(s)
            .or_else(|| Self::from_code(s))
            .ok_or_else(|| TableError::UnknownIndicator(s.to_string()))
    }
}
