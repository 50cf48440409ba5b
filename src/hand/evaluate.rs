use serde::ser::{self, SerializeMap};

use super::parse::Units;
use super::pool::TilePool;
use super::registry::{self, Registry};
use super::requirement::{Evaluation, Requirement};
use super::rule::{Combine, PatternRule};
use super::yaku::PredicateArgs;
use crate::error::{Error, Res};
use crate::model::*;

use log::{debug, warn};

// [MatchMap]
// 成立した役のIDと使用されたグループ (判定した順)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchMap {
    entries: Vec<(PatternId, Vec<TileGroup>)>,
}

impl MatchMap {
    pub fn get(&self, id: &str) -> Option<&[TileGroup]> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.as_slice())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TileGroup])> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl ser::Serialize for MatchMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// [Matcher]
// 手牌のグループと状況から登録済みの役を判定
#[derive(Debug, Clone)]
pub struct Matcher {
    pool: TilePool,
    units: Units,
    context: Context,
    selection: Option<Vec<PatternId>>,
}

impl Matcher {
    pub fn new(groups: Vec<TileGroup>, context: Context) -> Self {
        let (pool, units) = TilePool::new(groups);
        Self {
            pool,
            units,
            context,
            selection: None,
        }
    }

    // 判定する役を限定 (指定しない場合は登録済みの全ての役を登録順に判定)
    pub fn with_selection<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PatternId>,
    {
        self.selection = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    #[inline]
    pub fn pool(&self) -> &TilePool {
        &self.pool
    }

    #[inline]
    pub fn units(&self) -> &Units {
        &self.units
    }

    // プロセス全体のRegistryで判定
    pub fn check(&self) -> Res<MatchMap> {
        self.check_with(&registry::global().read())
    }

    pub fn check_with(&self, registry: &Registry) -> Res<MatchMap> {
        let ids: Vec<&str> = match &self.selection {
            Some(ids) => ids.iter().map(String::as_str).collect(),
            None => registry.keys().collect(),
        };

        let mut res = MatchMap::default();
        for id in ids {
            let rule = registry
                .get(id)
                .ok_or_else(|| Error::UnregisteredPatternRequested(id.to_string()))?;
            if !self.pool.has_typed_groups() {
                continue;
            }
            if let Some(groups) = self.evaluate_rule(id, rule) {
                debug!("{}: matched {} groups", id, groups.len());
                res.entries.push((id.to_string(), groups));
            }
        }

        Ok(res)
    }

    fn evaluate_rule(&self, id: &str, rule: &PatternRule) -> Option<Vec<TileGroup>> {
        let groups = self.pool.groups();
        if !rule.preconditions.is_satisfied(groups, &self.context) {
            return None;
        }

        // 独自判定がある場合はその結果のみを使用
        if let Some(pred) = &rule.predicate {
            let args = PredicateArgs {
                tiles: self.pool.tiles(),
                units: &self.units,
                groups,
                context: &self.context,
            };
            return if pred.eval(&args) {
                Some(groups.to_vec())
            } else {
                None
            };
        }

        for req in &rule.prerequisites {
            if !self.evaluate_requirement(id, req, &self.pool).matched {
                return None;
            }
        }

        let mut pool = self.pool.clone();
        let mut matched = vec![];
        let mut previous: Option<Vec<TileGroup>> = None;
        for _ in 0..rule.repeat.max(1) {
            let claimed = match rule.combine {
                Combine::Or => self.evaluate_or(id, &rule.requirements, &mut pool)?,
                Combine::And => self.evaluate_and(id, &rule.requirements, &mut pool)?,
            };

            // 外側の繰り返しでは各回で同じ牌の組み合わせを使用する必要がある
            if let Some(prev) = &previous {
                let same = prev.len() == claimed.len()
                    && prev
                        .iter()
                        .zip(&claimed)
                        .all(|(a, b)| a.is_equivalent(b, TileMatch::IGNORE_BONUS));
                if !same {
                    return None;
                }
            }
            matched.extend(claimed.iter().cloned());
            previous = Some(claimed);
        }

        // グループを使用しない役は作業領域全体を返却
        if matched.is_empty() {
            matched = groups.to_vec();
        }
        Some(matched)
    }

    // 最初に成立した要件のグループを使用
    fn evaluate_or(
        &self,
        id: &str,
        requirements: &[Requirement],
        pool: &mut TilePool,
    ) -> Option<Vec<TileGroup>> {
        if requirements.is_empty() {
            return Some(vec![]);
        }
        for req in requirements {
            let ev = self.evaluate_requirement(id, req, pool);
            if ev.matched {
                pool.claim(&ev.groups);
                return Some(ev.groups);
            }
        }
        None
    }

    // 全ての要件を順番に評価し, 使用したグループは以降の要件では使用しない
    fn evaluate_and(
        &self,
        id: &str,
        requirements: &[Requirement],
        pool: &mut TilePool,
    ) -> Option<Vec<TileGroup>> {
        let mut claimed = vec![];
        for req in requirements {
            for _ in 0..req.repeat.max(1) {
                let ev = self.evaluate_requirement(id, req, pool);
                if !ev.matched {
                    return None;
                }
                pool.claim(&ev.groups);
                claimed.extend(ev.groups);
            }
        }
        Some(claimed)
    }

    // 不正な要件は警告を出力して不成立として扱う
    fn evaluate_requirement(&self, id: &str, req: &Requirement, pool: &TilePool) -> Evaluation {
        match req.evaluate(pool, &self.context) {
            Ok(ev) => ev,
            Err(e) => {
                warn!("{}: {}", id, e);
                Evaluation::default()
            }
        }
    }
}

#[cfg(test)]
use super::requirement::UnitKind;

#[cfg(test)]
fn tiles_of(suit: Suit, ranks: &[Rank]) -> Vec<Tile> {
    ranks.iter().map(|&r| Tile::new(suit, r).unwrap()).collect()
}

#[cfg(test)]
fn run_group(suit: Suit, rank: Rank) -> TileGroup {
    TileGroup::new(GroupKind::Run, tiles_of(suit, &[rank, rank + 1, rank + 2]), false)
}

#[cfg(test)]
fn repeated_run_rule() -> PatternRule {
    PatternRule {
        repeat: 2,
        ..PatternRule::with_requirements(
            Combine::And,
            vec![Requirement::units(&[(UnitKind::Run, 1)])],
        )
    }
}

#[test]
fn test_outer_repeat_same_run() {
    let mut reg = Registry::new();
    reg.register("double_run", repeated_run_rule());

    // 同じ順子が2回選択される
    let groups = vec![
        run_group(Suit::Man, 1),
        run_group(Suit::Man, 1),
        run_group(Suit::Pin, 4),
    ];
    let res = Matcher::new(groups, Context::default()).check_with(&reg).unwrap();
    let matched = res.get("double_run").unwrap();
    assert_eq!(matched.len(), 2);
    assert!(matched[0].is_equivalent(&matched[1], TileMatch::IGNORE_BONUS));

    // 2回目に異なる順子が選択される
    let groups = vec![
        run_group(Suit::Man, 1),
        run_group(Suit::Pin, 4),
        run_group(Suit::Man, 1),
    ];
    let res = Matcher::new(groups, Context::default()).check_with(&reg).unwrap();
    assert!(!res.contains("double_run"));
}

#[test]
fn test_empty_hand() {
    let mut reg = Registry::new();
    reg.register("double_run", repeated_run_rule());
    reg.register("anything", PatternRule::default());
    let res = Matcher::new(vec![], Context::closed()).check_with(&reg).unwrap();
    assert!(res.is_empty());
    let res = Matcher::new(vec![TileGroup::ungrouped(vec![])], Context::closed())
        .check_with(&reg)
        .unwrap();
    assert!(res.is_empty());
}

#[test]
fn test_unregistered() {
    let reg = Registry::new();
    let m = Matcher::new(vec![run_group(Suit::Sou, 2)], Context::default())
        .with_selection(["missing"]);
    assert!(matches!(
        m.check_with(&reg),
        Err(Error::UnregisteredPatternRequested(id)) if id == "missing"
    ));

    let m = Matcher::new(vec![run_group(Suit::Sou, 2)], Context::default())
        .with_selection(["matcher_test_unregistered"]);
    assert!(m.check().is_err());
}

#[test]
fn test_or_and() {
    let pair = Requirement::units(&[(UnitKind::Pair, 1)]);
    let quad = Requirement::units(&[(UnitKind::Quad, 1)]);
    let mut reg = Registry::new();
    reg.register("or", PatternRule::with_requirements(Combine::Or, vec![quad.clone(), pair.clone()]));
    reg.register("and", PatternRule::with_requirements(Combine::And, vec![quad, pair.clone()]));
    let two_pairs = Requirement {
        repeat: 2,
        ..pair
    };
    reg.register("two_pairs", PatternRule::with_requirements(Combine::And, vec![two_pairs]));

    let hand = TileGroup::ungrouped(tiles_of(Suit::Pin, &[1, 2, 3, 5, 5]));
    let res = Matcher::new(vec![hand], Context::default()).check_with(&reg).unwrap();
    assert_eq!(res.ids().collect::<Vec<_>>(), vec!["or"]);
    assert_eq!(res.get("or").unwrap()[0].kind, GroupKind::Pair);

    let hand = TileGroup::ungrouped(tiles_of(Suit::Pin, &[2, 2, 5, 5]));
    let res = Matcher::new(vec![hand], Context::default()).check_with(&reg).unwrap();
    assert!(res.contains("two_pairs"));
    assert_eq!(res.get("two_pairs").unwrap().len(), 2);
}

#[test]
fn test_claim_regroup() {
    // 222333444m: 刻子優先で1つ使用した後, 残りは分解し直される
    let mut reg = Registry::new();
    let triplet_first = Requirement {
        unit_order: vec![crate::hand::MeldKind::Triplet],
        ..Requirement::units(&[(UnitKind::Triplet, 1)])
    };
    let rule = PatternRule::with_requirements(
        Combine::And,
        vec![triplet_first, Requirement::units(&[(UnitKind::Triplet, 2)])],
    );
    reg.register("three_triplets", rule);

    let hand = TileGroup::ungrouped(tiles_of(Suit::Man, &[2, 2, 2, 3, 3, 3, 4, 4, 4]));
    let res = Matcher::new(vec![hand], Context::default()).check_with(&reg).unwrap();
    let matched = res.get("three_triplets").unwrap();
    assert_eq!(matched.len(), 3);
    assert!(matched.iter().all(|g| g.kind == GroupKind::Triplet));
}

#[test]
fn test_prerequisites_and_predicate() {
    use super::yaku::Predicate;

    let mut reg = Registry::new();
    reg.register(
        "no_terminals",
        PatternRule {
            prerequisites: vec![Requirement {
                forbidden_ranks: vec![1, 9],
                ..Default::default()
            }],
            ..PatternRule::with_requirements(Combine::And, vec![Requirement::units(&[(UnitKind::Run, 1)])])
        },
    );
    reg.register("flush", PatternRule::with_predicate(Predicate::FullFlush));

    let hand = TileGroup::ungrouped(tiles_of(Suit::Sou, &[2, 3, 4, 6, 6]));
    let m = Matcher::new(vec![hand], Context::default());
    let res = m.check_with(&reg).unwrap();
    assert_eq!(res.get("no_terminals").unwrap().len(), 1);
    // 独自判定が成立した場合は作業領域全体
    assert_eq!(res.get("flush").unwrap().len(), m.pool().groups().len());

    let hand = TileGroup::ungrouped(tiles_of(Suit::Sou, &[1, 2, 3, 6, 6]));
    let res = Matcher::new(vec![hand], Context::default()).check_with(&reg).unwrap();
    assert!(!res.contains("no_terminals"));
    assert!(res.contains("flush"));
}

#[test]
fn test_malformed_isolated() {
    let mut reg = Registry::new();
    reg.register(
        "broken",
        PatternRule::with_requirements(Combine::And, vec![Requirement::units(&[(UnitKind::PartialRun, 1)])]),
    );
    reg.register(
        "run",
        PatternRule::with_requirements(Combine::And, vec![Requirement::units(&[(UnitKind::Run, 1)])]),
    );
    let hand = TileGroup::ungrouped(tiles_of(Suit::Man, &[4, 5, 6]));
    let res = Matcher::new(vec![hand], Context::default()).check_with(&reg).unwrap();
    assert_eq!(res.ids().collect::<Vec<_>>(), vec!["run"]);
}

#[test]
fn test_preconditions_gate() {
    let mut reg = Registry::new();
    reg.register(
        "closed_tsumo",
        PatternRule {
            preconditions: super::rule::Preconditions {
                closed_required: true,
                self_draw_required: true,
                ..Default::default()
            },
            ..Default::default()
        },
    );
    let hand = || vec![TileGroup::ungrouped(tiles_of(Suit::Man, &[4, 5, 6]))];
    let ctx = Context {
        self_draw: true,
        ..Context::closed()
    };
    let res = Matcher::new(hand(), ctx).check_with(&reg).unwrap();
    assert!(res.contains("closed_tsumo"));
    let res = Matcher::new(hand(), Context::closed()).check_with(&reg).unwrap();
    assert!(!res.contains("closed_tsumo"));
}

#[test]
fn test_match_map_serialize() {
    let mut reg = Registry::new();
    reg.register(
        "run",
        PatternRule::with_requirements(Combine::And, vec![Requirement::units(&[(UnitKind::Run, 1)])]),
    );
    let hand = TileGroup::ungrouped(tiles_of(Suit::Man, &[4, 5, 6]));
    let res = Matcher::new(vec![hand], Context::default()).check_with(&reg).unwrap();
    let v = serde_json::to_value(&res).unwrap();
    assert_eq!(v["run"][0]["kind"], "run");
    assert_eq!(v["run"][0]["tiles"][0]["rank"], 4);
}
