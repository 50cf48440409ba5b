use serde::{Deserialize, Serialize};

use super::requirement::Requirement;
use super::yaku::Predicate;
use crate::model::*;

// [Combine]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    #[default]
    And, // 全ての要件を順番に満たす
    Or,  // いずれかの要件を満たす (最初に成功したもの)
}

// [Preconditions]
// Contextに対する前提条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preconditions {
    pub closed_required: bool,
    pub open_required: bool,
    pub self_draw_required: bool,
    pub first_turn_required: bool,
    pub last_turn_required: bool,
    pub single_suit_required: bool, // 全ての牌が同じ牌種
    pub wait_shape: Option<WaitShape>,
}

impl Preconditions {
    pub fn is_satisfied(&self, groups: &[TileGroup], ctx: &Context) -> bool {
        if self.closed_required && !ctx.closed {
            return false;
        }
        if self.open_required && !ctx.open {
            return false;
        }
        if self.self_draw_required && !ctx.self_draw {
            return false;
        }
        if self.first_turn_required && !ctx.first_turn {
            return false;
        }
        if self.last_turn_required && !ctx.last_turn {
            return false;
        }
        if self.single_suit_required {
            let mut suits = groups.iter().flat_map(|g| g.tiles.iter()).map(|t| t.suit());
            if let Some(s0) = suits.next() {
                if suits.any(|s| s != s0) {
                    return false;
                }
            }
        }
        match self.wait_shape {
            None | Some(WaitShape::Any) => true,
            Some(w) => ctx.wait_shape == Some(w),
        }
    }
}

// [PatternRule]
// 役の定義 (コードではなくデータとして表現)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternRule {
    pub requirements: Vec<Requirement>,
    pub combine: Combine,
    pub preconditions: Preconditions,
    pub repeat: usize,                   // 外側の繰り返し回数
    pub prerequisites: Vec<Requirement>, // 作業領域全体に対して全て満たす必要がある要件
    pub predicate: Option<Predicate>,    // 指定がある場合は要件の代わりにこちらで判定
}

impl Default for PatternRule {
    fn default() -> Self {
        Self {
            requirements: vec![],
            combine: Combine::And,
            preconditions: Preconditions::default(),
            repeat: 1,
            prerequisites: vec![],
            predicate: None,
        }
    }
}

impl PatternRule {
    pub fn with_requirements(combine: Combine, requirements: Vec<Requirement>) -> Self {
        Self {
            requirements,
            combine,
            ..Default::default()
        }
    }

    pub fn with_predicate(predicate: Predicate) -> Self {
        Self {
            predicate: Some(predicate),
            ..Default::default()
        }
    }
}

#[test]
fn test_preconditions() {
    let m = |r| Tile::new(Suit::Man, r).unwrap();
    let groups = vec![TileGroup::ungrouped(vec![m(1), m(2), m(3)])];
    let pre = Preconditions {
        closed_required: true,
        single_suit_required: true,
        wait_shape: Some(WaitShape::TwoSided),
        ..Default::default()
    };
    let mut ctx = Context::closed();
    assert!(!pre.is_satisfied(&groups, &ctx));
    ctx.wait_shape = Some(WaitShape::TwoSided);
    assert!(pre.is_satisfied(&groups, &ctx));

    let any = Preconditions {
        wait_shape: Some(WaitShape::Any),
        ..Default::default()
    };
    assert!(any.is_satisfied(&groups, &Context::default()));

    let mixed = vec![
        groups[0].clone(),
        TileGroup::ungrouped(vec![Tile::new(Suit::Pin, 1).unwrap()]),
    ];
    assert!(!pre.is_satisfied(&mixed, &ctx));
}

#[test]
fn test_rule_serde_default() {
    let rule: PatternRule =
        serde_json::from_str(r#"{"requirements":[{"min_units":[["pair",1]]}],"combine":"or"}"#)
            .unwrap();
    assert_eq!(rule.repeat, 1);
    assert_eq!(rule.combine, Combine::Or);
    assert!(rule.predicate.is_none());
    assert_eq!(rule.requirements.len(), 1);
}
