use std::fmt;
use std::fmt::{Display, Formatter};

use tracing::warn;

use crate::auth::AccessError;
use crate::models::{Deposit, DepositStatus, Withdrawal, WithdrawalStatus};
use crate::types::UserId;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Role {
    Admin,
    User
}

/// The identity a request runs as.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role
}

impl Caller {
    pub fn admin(user_id: UserId) -> Self {
        Self { user_id, role: Role::Admin }
    }

    pub fn user(user_id: UserId) -> Self {
        Self { user_id, role: Role::User }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Query {
    /// Platform-wide report over every user's records.
    AdminReport,
    /// Report restricted to the caller's own records.
    OwnReport,
    /// A named financial procedure such as `approve_deposit`.
    Procedure(&'static str)
}

impl Display for Query {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Query::AdminReport => formatter.write_str("admin report"),
            Query::OwnReport => formatter.write_str("own report"),
            Query::Procedure(name) => write!(formatter, "procedure {name}")
        }
    }
}

/// Rows a caller is allowed to see.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum RowScope {
    All,
    /// Rows owned by `user_id`. With `settled_only`, pending and rejected rows
    /// are hidden as well.
    Own {
        user_id: UserId,
        settled_only: bool
    }
}

impl RowScope {
    pub fn admits_deposit(&self, deposit: &Deposit) -> bool {
        match *self {
            RowScope::All => true,
            RowScope::Own { user_id, settled_only } => {
                deposit.user_id == user_id && (!settled_only || deposit.status == DepositStatus::Approved)
            }
        }
    }

    pub fn admits_withdrawal(&self, withdrawal: &Withdrawal) -> bool {
        match *self {
            RowScope::All => true,
            RowScope::Own { user_id, settled_only } => {
                withdrawal.user_id == user_id && (!settled_only || withdrawal.status == WithdrawalStatus::Completed)
            }
        }
    }
}

/// Decides whether `caller` may run `query` and, if so, which rows it sees.
///
/// Admins see every row of every status. Regular users only get their own
/// settled rows and may not invoke procedures.
pub fn authorize(caller: &Caller, query: Query) -> Result<RowScope, AccessError> {
    match (caller.role, query) {
        (Role::Admin, Query::OwnReport) => Ok(RowScope::Own {
            user_id: caller.user_id,
            settled_only: false
        }),
        (Role::Admin, _) => Ok(RowScope::All),
        (Role::User, Query::OwnReport) => Ok(RowScope::Own {
            user_id: caller.user_id,
            settled_only: true
        }),
        (Role::User, query) => {
            warn!("Denied [{query}] for user [{}]", caller.user_id);
            Err(AccessError::Forbidden {
                user_id: caller.user_id,
                role: caller.role,
                query
            })
        }
    }
}
