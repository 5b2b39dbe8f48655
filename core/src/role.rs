//! Role mapper: which rank tiers carry a role upgrade.
//!
//! Consulted only by the promotion state machine, only on the rank being
//! entered. Tiers with no entry leave the role alone.

use crate::{
    config::RoleMapping,
    error::{EngineError, EngineResult},
    participant::Role,
    rank::RankTable,
    types::RankId,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RoleMapper {
    table: HashMap<RankId, Role>,
}

impl RoleMapper {
    /// Build and validate against the rank table. Each rank may appear once.
    pub fn new(mappings: &[RoleMapping], ranks: &RankTable) -> EngineResult<Self> {
        let mut table = HashMap::with_capacity(mappings.len());
        for m in mappings {
            if !ranks.contains(&m.rank_id) {
                return Err(EngineError::InvalidRoleMapping {
                    rank_id: m.rank_id.clone(),
                    reason:  "rank not in rank table".into(),
                });
            }
            if table.insert(m.rank_id.clone(), m.role).is_some() {
                return Err(EngineError::InvalidRoleMapping {
                    rank_id: m.rank_id.clone(),
                    reason:  "rank mapped more than once".into(),
                });
            }
        }
        Ok(Self { table })
    }

    pub fn role_for_rank(&self, rank_id: &str) -> Option<Role> {
        self.table.get(rank_id).copied()
    }

    /// The role a participant holds after entering `rank_id`.
    /// Mappings only ever raise a role.
    pub fn resolve(&self, current: Role, rank_id: &str) -> Role {
        match self.role_for_rank(rank_id) {
            Some(mapped) if mapped > current => mapped,
            _ => current,
        }
    }
}
