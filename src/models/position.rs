use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::errors::TransitionError;
use crate::types::{deserialize_timestamp, Grams, Monetary, RecordId, UserId};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver
}

impl Metal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Gold => "gold",
            Metal::Silver => "silver"
        }
    }
}

/// A purchased lot of metal held by one user until it is sold.
#[derive(Debug, Clone, Deserialize)]
pub struct Position {
    pub id: RecordId,
    pub user_id: UserId,
    pub metal: Metal,
    #[serde(with = "rust_decimal::serde::str")]
    pub grams: Grams,
    /// Price per gram paid when the position was opened.
    pub buy_price: Monetary,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub closed: bool,
    /// Price per gram the position was sold at, once closed.
    #[serde(default)]
    pub sell_price: Option<Monetary>
}

impl Position {
    /// Closes the position at `sell_price` per gram. What the sale pays out is
    /// settled by the pricing backend, not here.
    pub fn close(&mut self, sell_price: Monetary) -> Result<(), TransitionError> {
        if self.closed {
            return Err(TransitionError::position_closed(self));
        }

        if sell_price.is_negative() || sell_price.is_zero() {
            return Err(TransitionError::non_positive_sell_price(self, sell_price));
        }

        self.closed = true;
        self.sell_price = Some(sell_price);

        Ok(())
    }
}
