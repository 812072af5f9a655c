use thiserror::Error;

use crate::auth::{Query, Role};
use crate::types::UserId;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("User [{user_id}] with role [{role:?}] may not run [{query}]")]
    Forbidden {
        user_id: UserId,
        role: Role,
        query: Query
    }
}
