use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AuditError;

/// Reimbursement rate applied to an approved medication line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CoveragePercentage {
    Fifty,
    Seventy,
    Hundred,
}

impl CoveragePercentage {
    pub fn percent(&self) -> u8 {
        match self {
            CoveragePercentage::Fifty => 50,
            CoveragePercentage::Seventy => 70,
            CoveragePercentage::Hundred => 100,
        }
    }

    /// Rate as a fraction of one, e.g. `0.70`.
    pub fn as_rate(&self) -> Decimal {
        Decimal::new(i64::from(self.percent()), 2)
    }
}

impl TryFrom<u8> for CoveragePercentage {
    type Error = AuditError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            50 => Ok(CoveragePercentage::Fifty),
            70 => Ok(CoveragePercentage::Seventy),
            100 => Ok(CoveragePercentage::Hundred),
            other => Err(AuditError::ValidationError(format!(
                "unsupported coverage percentage: {other}"
            ))),
        }
    }
}

impl From<CoveragePercentage> for u8 {
    fn from(value: CoveragePercentage) -> Self {
        value.percent()
    }
}

/// Coverage category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageType {
    #[serde(rename = "STD")]
    Standard,
    #[serde(rename = "CRO")]
    Chronic,
    #[serde(rename = "DIS")]
    Disability,
    #[serde(rename = "ONC")]
    Oncology,
}

impl CoverageType {
    pub fn code(&self) -> &'static str {
        match self {
            CoverageType::Standard => "STD",
            CoverageType::Chronic => "CRO",
            CoverageType::Disability => "DIS",
            CoverageType::Oncology => "ONC",
        }
    }
}

impl std::fmt::Display for CoverageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CoverageType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STD" => Ok(CoverageType::Standard),
            "CRO" => Ok(CoverageType::Chronic),
            "DIS" => Ok(CoverageType::Disability),
            "ONC" => Ok(CoverageType::Oncology),
            other => Err(AuditError::ValidationError(format!(
                "unknown coverage type code: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coverage {
    pub percentage: CoveragePercentage,
    pub coverage_type: CoverageType,
}

impl Coverage {
    pub fn new(percentage: CoveragePercentage, coverage_type: CoverageType) -> Self {
        Self {
            percentage,
            coverage_type,
        }
    }

    /// Parses raw caller input; unknown values are validation errors.
    pub fn parse(percentage: u8, coverage_type: &str) -> Result<Self, AuditError> {
        Ok(Self {
            percentage: CoveragePercentage::try_from(percentage)?,
            coverage_type: coverage_type.parse()?,
        })
    }
}

impl Default for Coverage {
    fn default() -> Self {
        Self {
            percentage: CoveragePercentage::Fifty,
            coverage_type: CoverageType::Standard,
        }
    }
}
