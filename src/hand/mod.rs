// 牌の分解と役の判定を行うモジュール
mod evaluate;
mod parse;
mod pool;
mod registry;
mod requirement;
mod rule;
mod yaku;

pub mod standard;

pub use self::{
    evaluate::{MatchMap, Matcher},
    parse::{parse_into_units, MeldKind, Unit, Units, DEFAULT_ORDER},
    pool::TilePool,
    registry::{global, Registry},
    requirement::{ContextEntry, Evaluation, Requirement, UnitKind},
    rule::{Combine, PatternRule, Preconditions},
    yaku::{Predicate, PredicateArgs},
};
