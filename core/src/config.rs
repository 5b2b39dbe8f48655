use crate::{
    error::{EngineError, EngineResult},
    participant::Role,
    rank::RankDefinition,
    valuation::{RETAIL_DIVISOR, WHOLESALE_DIVISOR},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Dollars of retail sales per 1 CC.
    pub retail_divisor: f64,
    /// Dollars of wholesale sales per 1 CC.
    pub wholesale_divisor: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            retail_divisor: RETAIL_DIVISOR,
            wholesale_divisor: WHOLESALE_DIVISOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMapping {
    pub rank_id: String,
    pub role: Role,
}

/// How many ranks a single credit application may clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadePolicy {
    /// At most one promotion per event, however large the credit.
    #[default]
    SingleStep,
    /// Keep promoting while a next rank exists and the cycle target is met.
    Cascade,
}

/// What happens to cycle CC above the target when a promotion fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvershootPolicy {
    /// New cycle starts at exactly 0.
    #[default]
    HardReset,
    /// New cycle starts at `cycle_cc - target_cc`.
    CarryForward,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromotionConfig {
    #[serde(default)]
    pub cascade: CascadePolicy,
    #[serde(default)]
    pub overshoot: OvershootPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub valuation: ValuationConfig,
    /// Lowest tier first.
    pub ranks: Vec<RankDefinition>,
    #[serde(default)]
    pub role_mappings: Vec<RoleMapping>,
    #[serde(default)]
    pub promotion: PromotionConfig,
}

impl EngineConfig {
    /// Load from a JSON file, e.g. `data/engine_config.json`.
    /// In tests, use EngineConfig::standard().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    /// The built-in Forever Business Owner ladder.
    pub fn standard() -> Self {
        let rank = |id: &str, name: &str, target: f64, next: Option<&str>| RankDefinition {
            id: id.into(),
            display_name: name.into(),
            target_cc: target,
            next_rank_id: next.map(Into::into),
        };

        Self {
            valuation: ValuationConfig::default(),
            ranks: vec![
                rank("NOVUS",  "Novus Customer",       2.0,   Some("AS_SUP")),
                rank("AS_SUP", "Assistant Supervisor", 25.0,  Some("SUP")),
                rank("SUP",    "Supervisor",           75.0,  Some("AS_MGR")),
                rank("AS_MGR", "Assistant Manager",    120.0, Some("MGR")),
                rank("MGR",    "Manager",              150.0, None),
            ],
            role_mappings: vec![RoleMapping {
                rank_id: "AS_SUP".into(),
                role: Role::Sponsor,
            }],
            promotion: PromotionConfig::default(),
        }
    }

    /// Checks that need no rank table. Rank and role validation happen when
    /// the engine builds its tables.
    pub fn validate_valuation(&self) -> EngineResult<()> {
        let v = &self.valuation;
        for (name, divisor) in [
            ("retail_divisor", v.retail_divisor),
            ("wholesale_divisor", v.wholesale_divisor),
        ] {
            if !divisor.is_finite() || divisor <= 0.0 {
                return Err(EngineError::InvalidConfig {
                    reason: format!("{name} must be finite and > 0, got {divisor}"),
                });
            }
        }
        Ok(())
    }
}
