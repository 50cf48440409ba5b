use serde::{Deserialize, Serialize};

use super::parse::MeldKind;
use super::pool::TilePool;
use crate::error::{Error, Res};
use crate::model::*;

// [UnitKind]
// 要件で個数を指定する面子の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Run,
    Triplet,
    Quad,
    Pair,
    Set,        // 順子または刻子
    PartialRun, // 作業領域には存在しないため指定不可
    #[serde(other)]
    Unrecognized,
}

impl UnitKind {
    fn accepts(self, kind: GroupKind) -> bool {
        match self {
            UnitKind::Run => kind == GroupKind::Run,
            UnitKind::Triplet => kind == GroupKind::Triplet,
            UnitKind::Quad => kind == GroupKind::Quad,
            UnitKind::Pair => kind == GroupKind::Pair,
            UnitKind::Set => kind == GroupKind::Run || kind == GroupKind::Triplet,
            UnitKind::PartialRun | UnitKind::Unrecognized => false,
        }
    }
}

// [ContextEntry]
// Contextの牌で絞り込む条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextEntry {
    SeatWind,  // 自風
    RoundWind, // 場風
    #[serde(other)]
    Unrecognized,
}

impl ContextEntry {
    fn resolve(self, ctx: &Context) -> Res<Option<Tile>> {
        match self {
            ContextEntry::SeatWind => Ok(ctx.seat_wind),
            ContextEntry::RoundWind => Ok(ctx.round_wind),
            ContextEntry::Unrecognized => Err(Error::MalformedRequirement(
                "unrecognized context entry".to_string(),
            )),
        }
    }
}

// [Requirement]
// 牌グループの集合に対する宣言的な条件
// 空のリストは条件の指定なしとして扱う
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirement {
    pub min_units: Vec<(UnitKind, usize)>, // 必要な面子の種類と個数
    pub unit_repeat: usize,                // min_unitsの選択を繰り返す回数 (同一面子の確認)
    pub search_equivalent: bool,           // unit_repeatの2回目以降で前回と同一の面子を探索する
    pub repeat: usize,                     // AND評価時にこの要件を繰り返す回数
    pub unit_order: Vec<MeldKind>,         // この要件専用の分解順

    // 含まれてはいけない
    pub forbidden_suits: Vec<Suit>,
    pub forbidden_ranks: Vec<Rank>,

    // これ以外を含むグループは除外
    pub allowed_suits: Vec<Suit>,
    pub allowed_ranks: Vec<Rank>,
    pub allowed_tiles: Vec<Tile>,

    // 全て存在する場合, これのみで構成されるグループに絞り込む
    pub required_tiles: Vec<Tile>,
    pub required_suits: Vec<Suit>,
    pub required_ranks: Vec<Rank>,

    pub same_suit: bool,             // 最初のグループと同じ牌種のみ
    pub open: Option<bool>,          // 副露の有無
    pub context: Vec<ContextEntry>,  // 状況依存の条件
}

// 要件の評価結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub matched: bool,
    pub groups: Vec<TileGroup>, // 要件で使用したグループ
}

impl Evaluation {
    fn failed() -> Self {
        Self::default()
    }

    fn success(groups: Vec<TileGroup>) -> Self {
        Self {
            matched: true,
            groups,
        }
    }
}

impl Requirement {
    // 種類を指定しない面子の個数条件
    pub fn units(min_units: &[(UnitKind, usize)]) -> Self {
        Self {
            min_units: min_units.to_vec(),
            ..Default::default()
        }
    }

    // 評価不能な指定が含まれていないかを確認
    pub fn validate(&self) -> Res {
        for &(kind, _) in &self.min_units {
            match kind {
                UnitKind::PartialRun => Err(Error::MalformedRequirement(
                    "partial run cannot be selected as a unit".to_string(),
                ))?,
                UnitKind::Unrecognized => Err(Error::MalformedRequirement(
                    "unrecognized unit kind".to_string(),
                ))?,
                _ => {}
            }
        }
        if self.context.contains(&ContextEntry::Unrecognized) {
            Err(Error::MalformedRequirement(
                "unrecognized context entry".to_string(),
            ))?;
        }
        Ok(())
    }

    fn ignores_suit(&self) -> bool {
        !self.allowed_suits.is_empty() || !self.required_suits.is_empty()
    }

    fn ignores_rank(&self) -> bool {
        !self.allowed_ranks.is_empty() || !self.required_ranks.is_empty()
    }

    // 同一面子の比較や必須牌の絞り込みで使用する比較方法
    fn tile_match(&self) -> TileMatch {
        TileMatch {
            ignore_suit: self.ignores_suit(),
            ignore_rank: self.ignores_rank(),
            ignore_bonus: true,
        }
    }

    // 作業領域の牌グループに対して要件を評価
    // 作業領域自体は変更しない (使用したグループの除去は呼び出し側で行う)
    pub fn evaluate(&self, pool: &TilePool, ctx: &Context) -> Res<Evaluation> {
        self.validate()?;

        // 独自の分解順
        let mut groups: Vec<TileGroup> = if self.unit_order.is_empty() {
            pool.groups().to_vec()
        } else {
            let mut gs: Vec<TileGroup> = pool
                .groups()
                .iter()
                .filter(|g| !g.regroupable)
                .cloned()
                .collect();
            gs.extend(pool.regroup(&self.unit_order));
            gs
        };

        // 禁止された牌種, 数字
        let forbidden = |t: &Tile| {
            self.forbidden_suits.contains(&t.suit()) || self.forbidden_ranks.contains(&t.rank())
        };
        if groups.iter().any(|g| g.tiles.iter().any(forbidden)) {
            return Ok(Evaluation::failed());
        }

        // 許可された牌種, 数字, 牌
        if !self.allowed_suits.is_empty() {
            groups.retain(|g| g.tiles.iter().all(|t| self.allowed_suits.contains(&t.suit())));
        }
        if !self.allowed_ranks.is_empty() {
            groups.retain(|g| g.tiles.iter().all(|t| self.allowed_ranks.contains(&t.rank())));
        }
        if !self.allowed_tiles.is_empty() {
            groups.retain(|g| {
                g.tiles
                    .iter()
                    .all(|t| self.allowed_tiles.iter().any(|a| t.same_kind(a)))
            });
        }

        // 同じ牌種 (基準は最初の種別のあるグループ)
        if self.same_suit {
            let first = groups
                .iter()
                .find(|g| g.is_typed())
                .or(groups.first())
                .and_then(|g| g.first_suit());
            if let Some(suit) = first {
                groups.retain(|g| g.tiles.iter().all(|t| t.suit() == suit));
            }
        }

        // 必須の牌, 牌種, 数字
        if !self.required_tiles.is_empty() {
            let exists = self.required_tiles.iter().all(|r| {
                groups
                    .iter()
                    .flat_map(|g| g.tiles.iter())
                    .any(|t| t.same_kind(r))
            });
            if exists {
                let opt = self.tile_match();
                groups.retain(|g| {
                    g.tiles
                        .iter()
                        .all(|t| self.required_tiles.iter().any(|r| t.matches(r, opt)))
                });
            }
        }
        if !self.required_suits.is_empty() {
            let exists = self.required_suits.iter().all(|&s| {
                groups
                    .iter()
                    .flat_map(|g| g.tiles.iter())
                    .any(|t| t.suit() == s)
            });
            if exists {
                groups.retain(|g| g.tiles.iter().all(|t| self.required_suits.contains(&t.suit())));
            }
        }
        if !self.required_ranks.is_empty() {
            let exists = self.required_ranks.iter().all(|&n| {
                groups
                    .iter()
                    .flat_map(|g| g.tiles.iter())
                    .any(|t| t.rank() == n)
            });
            if exists {
                groups.retain(|g| g.tiles.iter().all(|t| self.required_ranks.contains(&t.rank())));
            }
        }

        // 副露の有無 (未分解の牌は対象外)
        if let Some(open) = self.open {
            if pool.groups().iter().any(|g| g.is_typed() && g.open != open) {
                return Ok(Evaluation::failed());
            }
        }

        if groups.is_empty() {
            return Ok(Evaluation::failed());
        }

        // 状況依存の条件
        for &entry in &self.context {
            match entry.resolve(ctx)? {
                Some(t) => groups.retain(|g| g.tiles.iter().all(|t2| t2.same_kind(&t))),
                None => return Ok(Evaluation::failed()),
            }
        }

        Ok(self.select_units(&groups))
    }

    // 面子の個数条件
    fn select_units(&self, groups: &[TileGroup]) -> Evaluation {
        let repeat = self.unit_repeat.max(1);
        let claimed = if self.search_equivalent && repeat > 1 {
            // 1回目の選択で読み飛ばす候補数を順に増やして探索
            (0..=groups.len()).find_map(|skip| self.select_equivalent(groups, repeat, skip))
        } else {
            self.select_in_order(groups, repeat)
        };
        match claimed {
            Some(claimed) => {
                Evaluation::success(claimed.into_iter().map(|j| groups[j].clone()).collect())
            }
            None => Evaluation::failed(),
        }
    }

    // 各回で未使用のグループを作業領域の順に選択し, 前回の選択と同一であることを確認
    fn select_in_order(&self, groups: &[TileGroup], repeat: usize) -> Option<Vec<usize>> {
        let opt = self.tile_match();
        let mut claimed: Vec<usize> = vec![];
        let mut previous: Vec<Vec<usize>> = vec![vec![]; self.min_units.len()];
        for i in 0..repeat {
            for (k, &(kind, count)) in self.min_units.iter().enumerate() {
                let selection: Vec<usize> = (0..groups.len())
                    .filter(|&j| kind.accepts(groups[j].kind) && !claimed.contains(&j))
                    .take(count)
                    .collect();
                if selection.len() < count {
                    return None;
                }
                if i > 0
                    && !previous[k]
                        .iter()
                        .zip(&selection)
                        .all(|(&a, &b)| groups[a].is_equivalent(&groups[b], opt))
                {
                    return None;
                }
                claimed.extend(selection.iter().copied());
                previous[k] = selection;
            }
        }
        Some(claimed)
    }

    // 2回目以降は前回選択された面子と同一のものを作業領域の順に選択する
    // いずれかの選択に失敗した場合は途中までの選択も破棄
    fn select_equivalent(
        &self,
        groups: &[TileGroup],
        repeat: usize,
        skip: usize,
    ) -> Option<Vec<usize>> {
        let opt = self.tile_match();
        let mut claimed: Vec<usize> = vec![];
        let mut previous: Vec<Vec<usize>> = vec![vec![]; self.min_units.len()];
        for i in 0..repeat {
            for (k, &(kind, count)) in self.min_units.iter().enumerate() {
                let mut selection: Vec<usize> = vec![];
                if i == 0 {
                    selection = (0..groups.len())
                        .filter(|&j| kind.accepts(groups[j].kind) && !claimed.contains(&j))
                        .skip(skip)
                        .take(count)
                        .collect();
                    if selection.len() < count {
                        return None;
                    }
                } else {
                    for &a in &previous[k] {
                        let j = (0..groups.len()).find(|&j| {
                            kind.accepts(groups[j].kind)
                                && !claimed.contains(&j)
                                && !selection.contains(&j)
                                && groups[a].is_equivalent(&groups[j], opt)
                        })?;
                        selection.push(j);
                    }
                }
                claimed.extend(selection.iter().copied());
                previous[k] = selection;
            }
        }
        Some(claimed)
    }
}

#[cfg(test)]
fn tiles_of(suit: Suit, ranks: &[Rank]) -> Vec<Tile> {
    ranks.iter().map(|&r| Tile::new(suit, r).unwrap()).collect()
}

#[cfg(test)]
fn triplet(suit: Suit, rank: Rank) -> TileGroup {
    TileGroup::new(GroupKind::Triplet, tiles_of(suit, &[rank; 3]), false)
}

#[cfg(test)]
fn run(suit: Suit, rank: Rank) -> TileGroup {
    TileGroup::new(GroupKind::Run, tiles_of(suit, &[rank, rank + 1, rank + 2]), false)
}

#[cfg(test)]
fn ranks_of(ev: &Evaluation) -> Vec<Rank> {
    ev.groups.iter().map(|g| g.tiles[0].rank()).collect()
}

#[test]
fn test_allowed_suits_select_one() {
    let groups = vec![
        triplet(Suit::Dragon, DR),
        triplet(Suit::Dragon, DG),
        triplet(Suit::Dragon, DW),
        triplet(Suit::Man, 5),
    ];
    let (pool, _) = TilePool::new(groups);
    let req = Requirement {
        allowed_suits: vec![Suit::Dragon],
        ..Requirement::units(&[(UnitKind::Triplet, 1)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ev.groups.len(), 1);
    assert_eq!(ev.groups[0].first_suit(), Some(Suit::Dragon));
    // 作業領域は変更されない
    assert_eq!(pool.groups().len(), 4);
}

#[test]
fn test_forbidden_ranks() {
    let hand = TileGroup::ungrouped(tiles_of(Suit::Pin, &[1, 2, 3, 4, 5, 6]));
    let (pool, _) = TilePool::new(vec![hand]);
    let req = Requirement {
        forbidden_ranks: vec![1, 9],
        ..Default::default()
    };
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);

    let req = Requirement {
        forbidden_ranks: vec![9],
        ..Default::default()
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    // 面子の個数指定がない場合は何も使用しない
    assert!(ev.groups.is_empty());
}

#[test]
fn test_required_suits() {
    let mut tiles = tiles_of(Suit::Man, &[1, 2, 3]);
    tiles.extend(tiles_of(Suit::Dragon, &[DG, DG, DG]));
    let (pool, _) = TilePool::new(vec![TileGroup::ungrouped(tiles)]);

    let req = Requirement {
        required_suits: vec![Suit::Dragon],
        ..Requirement::units(&[(UnitKind::Set, 1)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ev.groups[0].kind, GroupKind::Triplet);

    // 存在しない場合は絞り込まない
    let req = Requirement {
        required_suits: vec![Suit::Wind],
        ..Requirement::units(&[(UnitKind::Set, 2)])
    };
    assert!(req.evaluate(&pool, &Context::default()).unwrap().matched);
}

#[test]
fn test_context_seat_wind() {
    let groups = vec![triplet(Suit::Wind, WS), triplet(Suit::Wind, WE)];
    let (pool, _) = TilePool::new(groups);
    let req = Requirement {
        context: vec![ContextEntry::SeatWind],
        ..Requirement::units(&[(UnitKind::Triplet, 1)])
    };

    let ctx = Context {
        seat_wind: Some(Tile::new(Suit::Wind, WE).unwrap()),
        ..Default::default()
    };
    let ev = req.evaluate(&pool, &ctx).unwrap();
    assert!(ev.matched);
    assert_eq!(ev.groups[0].tiles[0].rank(), WE);

    let ctx = Context {
        seat_wind: Some(Tile::new(Suit::Wind, WN).unwrap()),
        ..Default::default()
    };
    assert!(!req.evaluate(&pool, &ctx).unwrap().matched);
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);
}

#[test]
fn test_unit_repeat() {
    let mut tiles = tiles_of(Suit::Man, &[1, 1, 2, 2, 3, 3]);
    tiles.extend(tiles_of(Suit::Pin, &[4, 5, 6]));
    let (pool, _) = TilePool::new(vec![TileGroup::ungrouped(tiles)]);
    let req = Requirement {
        unit_repeat: 2,
        ..Requirement::units(&[(UnitKind::Run, 1)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ev.groups.len(), 2);
    assert!(ev.groups[0].is_equivalent(&ev.groups[1], TileMatch::IGNORE_BONUS));

    // m123 p123: 牌種が異なるため不一致, 牌種の許可指定があれば一致
    let mut tiles = tiles_of(Suit::Man, &[1, 2, 3]);
    tiles.extend(tiles_of(Suit::Pin, &[1, 2, 3]));
    let (pool, _) = TilePool::new(vec![TileGroup::ungrouped(tiles)]);
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(!ev.matched);
    assert!(ev.groups.is_empty());

    let req = Requirement {
        allowed_suits: Suit::NUMBERED.to_vec(),
        ..req
    };
    assert!(req.evaluate(&pool, &Context::default()).unwrap().matched);
}

#[test]
fn test_unit_repeat_in_order() {
    // m123 p456 m123: 2回目は作業領域の順でp456が選択されるため不一致
    let groups = vec![run(Suit::Man, 1), run(Suit::Pin, 4), run(Suit::Man, 1)];
    let (pool, _) = TilePool::new(groups);
    let req = Requirement {
        unit_repeat: 2,
        ..Requirement::units(&[(UnitKind::Run, 1)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(!ev.matched);
    assert!(ev.groups.is_empty());

    let req = Requirement {
        search_equivalent: true,
        ..req
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ev.groups.len(), 2);
    assert!(ev.groups.iter().all(|g| g.first_suit() == Some(Suit::Man)));
}

#[test]
fn test_unit_repeat_skips_unpaired() {
    // 123m 456m 456m: 最初の順子に同一のものがないため次の候補から選択
    let hand = TileGroup::ungrouped(tiles_of(Suit::Man, &[1, 2, 3, 4, 4, 5, 5, 6, 6]));
    let (pool, _) = TilePool::new(vec![hand]);
    let req = Requirement {
        unit_repeat: 2,
        ..Requirement::units(&[(UnitKind::Run, 1)])
    };
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);

    let req = Requirement {
        search_equivalent: true,
        ..req
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ranks_of(&ev), vec![4, 4]);
}

#[test]
fn test_same_suit() {
    let groups = vec![
        triplet(Suit::Pin, 2),
        triplet(Suit::Man, 3),
        triplet(Suit::Pin, 7),
    ];
    let (pool, _) = TilePool::new(groups);
    let req = Requirement {
        same_suit: true,
        ..Requirement::units(&[(UnitKind::Triplet, 2)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert!(ev.groups.iter().all(|g| g.first_suit() == Some(Suit::Pin)));

    let req = Requirement::units(&[(UnitKind::Triplet, 3)]);
    assert!(req.evaluate(&pool, &Context::default()).unwrap().matched);
    let req = Requirement {
        same_suit: true,
        ..req
    };
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);

    // 基準は絞り込み後に残った最初のグループ
    let req = Requirement {
        same_suit: true,
        allowed_ranks: vec![3, 7],
        ..Requirement::units(&[(UnitKind::Triplet, 1)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ev.groups[0].first_suit(), Some(Suit::Man));
    let req = Requirement {
        min_units: vec![(UnitKind::Triplet, 2)],
        ..req
    };
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);
}

#[test]
fn test_allowed_ranks() {
    let groups = vec![triplet(Suit::Man, 2), triplet(Suit::Man, 5)];
    let (pool, _) = TilePool::new(groups);
    let req = Requirement {
        allowed_ranks: vec![5],
        ..Requirement::units(&[(UnitKind::Triplet, 1)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ranks_of(&ev), vec![5]);

    let req = Requirement {
        min_units: vec![(UnitKind::Triplet, 2)],
        ..req
    };
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);
}

#[test]
fn test_required_ranks() {
    let groups = vec![
        triplet(Suit::Man, 2),
        triplet(Suit::Pin, 5),
        triplet(Suit::Sou, 8),
    ];
    let (pool, _) = TilePool::new(groups);
    let req = Requirement {
        required_ranks: vec![2, 5],
        ..Requirement::units(&[(UnitKind::Triplet, 2)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ranks_of(&ev), vec![2, 5]);
    let req = Requirement {
        min_units: vec![(UnitKind::Triplet, 3)],
        ..req
    };
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);

    // 全て存在しない場合は絞り込まない
    let req = Requirement {
        required_ranks: vec![2, 9],
        ..req
    };
    assert!(req.evaluate(&pool, &Context::default()).unwrap().matched);
}

#[test]
fn test_required_tiles() {
    let groups = vec![
        triplet(Suit::Man, 2),
        triplet(Suit::Pin, 5),
        triplet(Suit::Sou, 5),
    ];
    let (pool, _) = TilePool::new(groups);
    let p5 = Tile::new(Suit::Pin, 5).unwrap();
    let m9 = Tile::new(Suit::Man, 9).unwrap();

    let req = Requirement {
        required_tiles: vec![p5],
        ..Requirement::units(&[(UnitKind::Triplet, 1)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ev.groups[0].tiles[0], p5);
    let req = Requirement {
        min_units: vec![(UnitKind::Triplet, 2)],
        ..req
    };
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);

    // 全て存在しない場合は絞り込まない
    let req = Requirement {
        required_tiles: vec![p5, m9],
        min_units: vec![(UnitKind::Triplet, 3)],
        ..req
    };
    assert!(req.evaluate(&pool, &Context::default()).unwrap().matched);
}

#[test]
fn test_required_tiles_ignore_suit() {
    let groups = vec![
        triplet(Suit::Man, 2),
        triplet(Suit::Pin, 5),
        triplet(Suit::Sou, 5),
    ];
    let (pool, _) = TilePool::new(groups);

    // 牌種の許可指定がある場合は牌種を無視して絞り込む
    let req = Requirement {
        allowed_suits: Suit::NUMBERED.to_vec(),
        required_tiles: vec![Tile::new(Suit::Pin, 5).unwrap()],
        ..Requirement::units(&[(UnitKind::Triplet, 2)])
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    assert_eq!(ranks_of(&ev), vec![5, 5]);
    let req = Requirement {
        min_units: vec![(UnitKind::Triplet, 3)],
        ..req
    };
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);

    // 存在の確認は牌種を含めて比較
    let req = Requirement {
        required_tiles: vec![Tile::new(Suit::Man, 5).unwrap()],
        ..req
    };
    assert!(req.evaluate(&pool, &Context::default()).unwrap().matched);
}

#[test]
fn test_unit_order() {
    let hand = TileGroup::ungrouped(tiles_of(Suit::Sou, &[2, 2, 2, 3, 3, 3, 4, 4, 4]));
    let (pool, _) = TilePool::new(vec![hand]);
    let req = Requirement::units(&[(UnitKind::Triplet, 3)]);
    assert!(!req.evaluate(&pool, &Context::default()).unwrap().matched);

    let req = Requirement {
        unit_order: vec![MeldKind::Triplet, MeldKind::Run],
        ..req
    };
    let ev = req.evaluate(&pool, &Context::default()).unwrap();
    assert!(ev.matched);
    // 分解し直したグループは作業領域に存在しない
    assert!(ev
        .groups
        .iter()
        .all(|d| pool.groups().iter().all(|g| g.id != d.id)));
}

#[test]
fn test_open() {
    let pon = TileGroup::called(GroupKind::Triplet, tiles_of(Suit::Pin, &[7, 7, 7]));
    let hand = TileGroup::ungrouped(tiles_of(Suit::Man, &[1, 2, 3]));
    let (pool, _) = TilePool::new(vec![pon, hand]);
    let closed = Requirement {
        open: Some(false),
        ..Requirement::units(&[(UnitKind::Run, 1)])
    };
    assert!(!closed.evaluate(&pool, &Context::default()).unwrap().matched);

    let (pool, _) = TilePool::new(vec![TileGroup::ungrouped(tiles_of(Suit::Man, &[1, 2, 3]))]);
    assert!(closed.evaluate(&pool, &Context::default()).unwrap().matched);
}

#[test]
fn test_malformed() {
    let (pool, _) = TilePool::new(vec![TileGroup::ungrouped(tiles_of(Suit::Man, &[4, 5]))]);
    let req = Requirement::units(&[(UnitKind::PartialRun, 1)]);
    assert!(matches!(
        req.evaluate(&pool, &Context::default()),
        Err(Error::MalformedRequirement(_))
    ));

    let req: Requirement = serde_json::from_str(r#"{"min_units":[["kong",1]]}"#).unwrap();
    assert_eq!(req.min_units, vec![(UnitKind::Unrecognized, 1)]);
    assert!(req.validate().is_err());

    let req: Requirement = serde_json::from_str(r#"{"context":["dealer"]}"#).unwrap();
    assert!(matches!(
        req.evaluate(&pool, &Context::default()),
        Err(Error::MalformedRequirement(_))
    ));
}
