//! Sale valuation: converts a dollar amount into Case Credits.
//!
//! Pure: no state, no clock, no logging. Rejections happen here, before any
//! participant state is touched.

use crate::{
    config::ValuationConfig,
    error::{EngineError, EngineResult},
    types::{round_cc, Cc, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const RETAIL_DIVISOR: f64 = 346.0;
pub const WHOLESALE_DIVISOR: f64 = 242.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleType {
    Retail,
    Wholesale,
}

impl SaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retail    => "RETAIL",
            Self::Wholesale => "WHOLESALE",
        }
    }
}

impl fmt::Display for SaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RETAIL"    => Ok(Self::Retail),
            "WHOLESALE" => Ok(Self::Wholesale),
            _ => Err(EngineError::InvalidSaleType { sale_type: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Completed,
}

/// A sale as reported by the sales UI, before validation.
///
/// `sale_type` stays a raw string so unknown types surface as
/// `INVALID_SALE_TYPE` instead of a deserialisation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleSubmission {
    pub amount:         f64,
    pub sale_type:      String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub timestamp:      Option<Timestamp>,
}

impl SaleSubmission {
    pub fn new(amount: f64, sale_type: SaleType) -> Self {
        Self {
            amount,
            sale_type: sale_type.as_str().to_string(),
            transaction_id: None,
            timestamp: None,
        }
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }
}

/// A validated, valued sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub transaction_id: String,
    pub amount:         f64,
    pub sale_type:      SaleType,
    pub cc_earned:      Cc,
    pub timestamp:      Timestamp,
    pub status:         SaleStatus,
}

impl ValuationConfig {
    pub fn divisor(&self, sale_type: SaleType) -> f64 {
        match sale_type {
            SaleType::Retail    => self.retail_divisor,
            SaleType::Wholesale => self.wholesale_divisor,
        }
    }

    /// `round(amount / divisor, 3)` for the given sale type.
    pub fn calculate_cc(&self, amount: f64, sale_type: SaleType) -> EngineResult<Cc> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(EngineError::InvalidAmount { amount });
        }
        if amount == 0.0 {
            return Ok(0.0);
        }
        Ok(round_cc(amount / self.divisor(sale_type)))
    }
}

/// Value a sale with the standard divisors.
pub fn calculate_cc(amount: f64, sale_type: SaleType) -> EngineResult<Cc> {
    ValuationConfig::default().calculate_cc(amount, sale_type)
}
