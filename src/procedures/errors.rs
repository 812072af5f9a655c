use thiserror::Error;

use crate::models::TransitionError;
use crate::types::{RecordId, UserId};

#[derive(Debug, Error)]
pub enum ProcedureError {
    #[error("{kind} [{id}] was not found")]
    NotFound {
        kind: &'static str,
        id: RecordId
    },
    #[error("Position [{position_id}] does not belong to user [{user_id}]")]
    NotOwner {
        position_id: RecordId,
        user_id: UserId
    },
    #[error(transparent)]
    Transition(#[from] TransitionError)
}

impl ProcedureError {
    pub fn deposit_not_found(id: RecordId) -> Self {
        Self::NotFound { kind: "Deposit", id }
    }

    pub fn withdrawal_not_found(id: RecordId) -> Self {
        Self::NotFound { kind: "Withdrawal", id }
    }

    pub fn position_not_found(id: RecordId) -> Self {
        Self::NotFound { kind: "Position", id }
    }
}
