use thiserror::Error;

use crate::model::{Rank, Suit};

pub type Res<T = ()> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("pattern not registered: {0}")]
    UnregisteredPatternRequested(String),

    #[error("malformed requirement: {0}")]
    MalformedRequirement(String),

    #[error("invalid tile: {suit:?} {rank}")]
    InvalidTile { suit: Suit, rank: Rank },

    #[error("rule data error: {0}")]
    RuleData(#[from] serde_json::Error),
}
