use thiserror::Error;

use crate::auth::AccessError;
use crate::procedures::ProcedureError;
use crate::storage::LoadError;
use crate::types::RecordId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Procedure(#[from] ProcedureError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Action [{action}] on record [{id}] is missing [{field}]")]
    IncompleteAction {
        action: &'static str,
        id: RecordId,
        field: &'static str
    }
}

impl EngineError {
    pub fn incomplete_action(action: &'static str, id: RecordId, field: &'static str) -> Self {
        Self::IncompleteAction { action, id, field }
    }
}
