//! Rank table: the validated promotion ladder.
//!
//! Built once from config. After `RankTable::new` succeeds the ladder is
//! guaranteed to be a set of finite chains with no dangling or cyclic
//! `next_rank_id` links, so the promotion state machine never has to
//! re-check it.

use crate::{
    error::{EngineError, EngineResult},
    types::{Cc, RankId},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankDefinition {
    pub id:           RankId,
    pub display_name: String,
    pub target_cc:    Cc,
    /// `None` marks the terminal rank.
    pub next_rank_id: Option<RankId>,
}

impl RankDefinition {
    pub fn is_terminal(&self) -> bool {
        self.next_rank_id.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct RankTable {
    ranks: Vec<RankDefinition>,
    index: HashMap<RankId, usize>,
}

impl RankTable {
    /// Validate and index a ladder. The first entry is the lowest tier.
    pub fn new(ranks: Vec<RankDefinition>) -> EngineResult<Self> {
        if ranks.is_empty() {
            return Err(EngineError::rank_table("ladder has no ranks"));
        }

        let mut index = HashMap::with_capacity(ranks.len());
        for (i, rank) in ranks.iter().enumerate() {
            if rank.id.trim().is_empty() {
                return Err(EngineError::rank_table(format!("rank #{i} has an empty id")));
            }
            if !rank.target_cc.is_finite() || rank.target_cc <= 0.0 {
                return Err(EngineError::rank_table(format!(
                    "rank '{}' target_cc must be finite and > 0, got {}",
                    rank.id, rank.target_cc
                )));
            }
            if index.insert(rank.id.clone(), i).is_some() {
                return Err(EngineError::rank_table(format!("duplicate rank id '{}'", rank.id)));
            }
        }

        for rank in &ranks {
            if let Some(next) = &rank.next_rank_id {
                if !index.contains_key(next) {
                    return Err(EngineError::rank_table(format!(
                        "rank '{}' points to unknown next rank '{next}'",
                        rank.id
                    )));
                }
            }
        }

        let lowest = &ranks[0].id;
        if let Some(pred) = ranks.iter().find(|r| r.next_rank_id.as_ref() == Some(lowest)) {
            return Err(EngineError::rank_table(format!(
                "lowest rank '{lowest}' is the successor of '{}'",
                pred.id
            )));
        }

        let table = Self { ranks, index };
        table.check_acyclic()?;
        Ok(table)
    }

    /// Every walk along `next_rank_id` must reach a terminal rank.
    fn check_acyclic(&self) -> EngineResult<()> {
        let mut terminates: HashSet<&str> = HashSet::new();

        for start in &self.ranks {
            let mut path: HashSet<&str> = HashSet::new();
            let mut cursor = Some(start);

            while let Some(rank) = cursor {
                if terminates.contains(rank.id.as_str()) {
                    break;
                }
                if !path.insert(rank.id.as_str()) {
                    return Err(EngineError::rank_table(format!(
                        "cycle detected through rank '{}'",
                        rank.id
                    )));
                }
                cursor = rank.next_rank_id.as_deref().and_then(|id| self.get(id));
            }

            terminates.extend(path);
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&RankDefinition> {
        self.index.get(id).map(|&i| &self.ranks[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn lowest(&self) -> &RankDefinition {
        &self.ranks[0]
    }

    pub fn next_of(&self, id: &str) -> Option<&RankDefinition> {
        self.get(id)
            .and_then(|r| r.next_rank_id.as_deref())
            .and_then(|next| self.get(next))
    }

    pub fn ranks(&self) -> &[RankDefinition] {
        &self.ranks
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}
