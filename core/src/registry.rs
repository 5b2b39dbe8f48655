//! In-memory participant registry for hosts that take sales concurrently.
//!
//! RULE: Sales for the same participant run one at a time (one Mutex per
//! participant). Sales for different participants never wait on each other.
//! The map lock is only held long enough to find or insert a slot.

use crate::{
    engine::{CreditEngine, SaleOutcome},
    error::{EngineError, EngineResult},
    event::EngineEvent,
    participant::{Participant, ParticipantRecord, Role},
    types::ParticipantId,
    valuation::SaleSubmission,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

struct Slot {
    participant: Participant,
    journal:     Vec<EngineEvent>,
}

pub struct ParticipantRegistry {
    engine: Arc<CreditEngine>,
    slots:  RwLock<HashMap<ParticipantId, Arc<Mutex<Slot>>>>,
}

impl ParticipantRegistry {
    pub fn new(engine: Arc<CreditEngine>) -> Self {
        Self {
            engine,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &CreditEngine {
        &self.engine
    }

    pub fn enroll(&self, participant_id: &str, role: Role) -> EngineResult<Participant> {
        let participant = self.engine.enroll(participant_id, role);
        self.insert(participant)
    }

    /// Register a stored record, filling in default progress if it has none.
    pub fn load(&self, record: ParticipantRecord) -> EngineResult<Participant> {
        let participant = self.engine.load_participant(record)?;
        self.insert(participant)
    }

    fn insert(&self, participant: Participant) -> EngineResult<Participant> {
        let mut slots = self.slots.write().unwrap_or_else(|p| p.into_inner());
        if slots.contains_key(&participant.participant_id) {
            return Err(EngineError::DuplicateParticipant {
                participant_id: participant.participant_id,
            });
        }
        slots.insert(
            participant.participant_id.clone(),
            Arc::new(Mutex::new(Slot {
                participant: participant.clone(),
                journal:     Vec::new(),
            })),
        );
        Ok(participant)
    }

    fn slot(&self, participant_id: &str) -> EngineResult<Arc<Mutex<Slot>>> {
        let slots = self.slots.read().unwrap_or_else(|p| p.into_inner());
        slots
            .get(participant_id)
            .cloned()
            .ok_or_else(|| EngineError::ParticipantNotFound {
                participant_id: participant_id.to_string(),
            })
    }

    // A slot's state is only replaced after a sale fully succeeds, so a
    // poisoned lock still guards a consistent record.
    fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
        slot.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Run one sale for one participant, serialised against any other sale
    /// for the same participant.
    pub fn process_sale(
        &self,
        participant_id: &str,
        submission: &SaleSubmission,
    ) -> EngineResult<SaleOutcome> {
        let slot = self.slot(participant_id)?;
        let mut guard = Self::lock(&slot);

        match self.engine.process_sale(&guard.participant, submission) {
            Ok(outcome) => {
                guard.participant = outcome.participant.clone();
                guard.journal.extend(outcome.events.iter().cloned());
                Ok(outcome)
            }
            Err(e) => {
                let rejected = self.engine.rejection_event(participant_id, &e);
                guard.journal.push(rejected);
                Err(e)
            }
        }
    }

    pub fn snapshot(&self, participant_id: &str) -> EngineResult<Participant> {
        let slot = self.slot(participant_id)?;
        let guard = Self::lock(&slot);
        Ok(guard.participant.clone())
    }

    /// Every event recorded for the participant, oldest first.
    pub fn journal(&self, participant_id: &str) -> EngineResult<Vec<EngineEvent>> {
        let slot = self.slot(participant_id)?;
        let guard = Self::lock(&slot);
        Ok(guard.journal.clone())
    }

    /// Sorted for stable output.
    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        let slots = self.slots.read().unwrap_or_else(|p| p.into_inner());
        let mut ids: Vec<_> = slots.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
