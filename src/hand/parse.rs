use serde::{Deserialize, Serialize};

use crate::model::*;

use MeldKind::*;

// [MeldKind]
// 分解処理で検出する面子の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldKind {
    Run,        // 順子
    Quad,       // 槓子
    Triplet,    // 刻子
    Pair,       // 対子
    PartialRun, // 両面搭子 (待ちの形の確認用, 面子としては扱わない)
}

pub const DEFAULT_ORDER: [MeldKind; 5] = [Run, Quad, Triplet, Pair, PartialRun];

impl MeldKind {
    pub fn group_kind(self) -> Option<GroupKind> {
        match self {
            Run => Some(GroupKind::Run),
            Quad => Some(GroupKind::Quad),
            Triplet => Some(GroupKind::Triplet),
            Pair => Some(GroupKind::Pair),
            PartialRun => None,
        }
    }

    // 検出に必要な最小枚数
    fn min_tiles(self) -> usize {
        match self {
            Run | Triplet => 3,
            Quad => 4,
            Pair | PartialRun => 2,
        }
    }
}

// [Unit]
// positionsは分解対象として渡された牌リスト上のindex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub kind: MeldKind,
    pub tiles: Vec<Tile>,
    pub positions: Vec<usize>,
}

impl Unit {
    fn new(kind: MeldKind, tiles: &[Tile], positions: Vec<usize>) -> Self {
        Self {
            kind,
            tiles: positions.iter().map(|&p| tiles[p]).collect(),
            positions,
        }
    }
}

// [Units]
// 面子の種類ごとの分解結果 (検出順)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Units {
    found: Vec<(MeldKind, Vec<Unit>)>,
}

impl Units {
    pub fn get(&self, kind: MeldKind) -> &[Unit] {
        self.found
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(&[], |(_, v)| v.as_slice())
    }

    pub fn count(&self, kind: MeldKind) -> usize {
        self.get(kind).len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.found.iter().flat_map(|(_, v)| v.iter())
    }

    // 面子(順子,刻子,槓子,対子)を一つも含まない
    pub fn has_no_melds(&self) -> bool {
        self.iter().all(|u| u.kind == PartialRun)
    }
}

// 牌リストをorderの順に面子へ分解
// 先に検出された種類に使われた牌は後の種類では使用しない
pub fn parse_into_units(tiles: &[Tile], order: &[MeldKind]) -> Units {
    let mut remaining: Vec<usize> = (0..tiles.len()).collect();
    let mut units = Units::default();
    for &kind in order {
        if units.found.iter().any(|(k, _)| *k == kind) {
            continue;
        }

        let found = if remaining.len() < kind.min_tiles() {
            vec![]
        } else {
            let rows = sort_by_suit(tiles, &remaining);
            match kind {
                Run => parse_runs(tiles, &rows),
                Quad => parse_same_ranks(tiles, &rows, Quad, 4),
                Triplet => parse_same_ranks(tiles, &rows, Triplet, 3),
                Pair => parse_pairs(tiles, &rows, Pair),
                PartialRun => parse_pairs(tiles, &rows, PartialRun),
            }
        };

        for u in &found {
            remaining.retain(|p| !u.positions.contains(p));
        }
        units.found.push((kind, found));
    }

    units
}

// 牌種ごとに数字の昇順で並べたindexのリスト
// 同じ牌は元の並び順を維持
fn sort_by_suit(tiles: &[Tile], positions: &[usize]) -> [Vec<usize>; SUIT] {
    let mut rows: [Vec<usize>; SUIT] = Default::default();
    for &p in positions {
        rows[tiles[p].suit().index()].push(p);
    }
    for row in &mut rows {
        row.sort_by_key(|&p| tiles[p].rank());
    }
    rows
}

// 順子
// 数字の小さい方から順に3つの連続する数字の最小枚数分だけ順子を取り出す
fn parse_runs(tiles: &[Tile], rows: &[Vec<usize>; SUIT]) -> Vec<Unit> {
    let mut res = vec![];
    for s in Suit::NUMBERED {
        let row = &rows[s.index()];
        let (min, max) = match (row.first(), row.last()) {
            (Some(&a), Some(&b)) => (tiles[a].rank() as usize, tiles[b].rank() as usize),
            _ => continue,
        };
        if max < min + 2 {
            continue;
        }

        let mut tr: [Vec<usize>; RANK] = Default::default();
        for &p in row {
            tr[tiles[p].rank() as usize].push(p);
        }

        for ni in min..=max - 2 {
            let n = tr[ni].len().min(tr[ni + 1].len()).min(tr[ni + 2].len());
            for _ in 0..n {
                let positions = vec![tr[ni].remove(0), tr[ni + 1].remove(0), tr[ni + 2].remove(0)];
                res.push(Unit::new(Run, tiles, positions));
            }
        }
    }
    res
}

// 刻子, 槓子
// 並べた時に同じ数字がsize枚連続している箇所を取り出す
fn parse_same_ranks(
    tiles: &[Tile],
    rows: &[Vec<usize>; SUIT],
    kind: MeldKind,
    size: usize,
) -> Vec<Unit> {
    let mut res = vec![];
    for row in rows {
        let mut i = 0;
        while i + size <= row.len() {
            let ni = tiles[row[i]].rank();
            if row[i..i + size].iter().all(|&p| tiles[p].rank() == ni) {
                res.push(Unit::new(kind, tiles, row[i..i + size].to_vec()));
                i += size;
            } else {
                i += 1;
            }
        }
    }
    res
}

// 対子, 両面搭子
// 並べた牌を先頭から2枚ずつ組にして判定 (組にならなかった牌はそのまま残る)
fn parse_pairs(tiles: &[Tile], rows: &[Vec<usize>; SUIT], kind: MeldKind) -> Vec<Unit> {
    let mut res = vec![];
    for (si, row) in rows.iter().enumerate() {
        if kind == PartialRun && !Suit::ALL[si].is_numbered() {
            continue;
        }
        for pair in row.chunks_exact(2) {
            let (n0, n1) = (tiles[pair[0]].rank(), tiles[pair[1]].rank());
            let ok = match kind {
                Pair => n0 == n1,
                _ => n0 + 1 == n1,
            };
            if ok {
                res.push(Unit::new(kind, tiles, pair.to_vec()));
            }
        }
    }
    res
}

#[cfg(test)]
fn tiles_of(suit: Suit, ranks: &[Rank]) -> Vec<Tile> {
    ranks.iter().map(|&r| Tile::new(suit, r).unwrap()).collect()
}

#[test]
fn test_parse_run() {
    let tiles = tiles_of(Suit::Man, &[1, 2, 3]);
    let units = parse_into_units(&tiles, &[Run]);
    assert_eq!(units.count(Run), 1);
    assert_eq!(units.get(Run)[0].tiles, tiles);
}

#[test]
fn test_parse_quad_consumes_triplet() {
    let tiles = tiles_of(Suit::Pin, &[5, 5, 5, 5]);
    let units = parse_into_units(&tiles, &[Quad, Triplet]);
    assert_eq!(units.count(Quad), 1);
    assert_eq!(units.count(Triplet), 0);
}

#[test]
fn test_parse_triplet_window_once() {
    // 4枚の同じ牌から刻子は1つのみ
    let tiles = tiles_of(Suit::Sou, &[7, 7, 7, 7]);
    let units = parse_into_units(&tiles, &[Triplet]);
    assert_eq!(units.count(Triplet), 1);
}

#[test]
fn test_parse_order_tie_break() {
    // 三連刻: 先に指定された種類が優先される
    let tiles = tiles_of(Suit::Man, &[2, 2, 2, 3, 3, 3, 4, 4, 4]);
    let units = parse_into_units(&tiles, &[Run, Triplet]);
    assert_eq!(units.count(Run), 3);
    assert_eq!(units.count(Triplet), 0);

    let units = parse_into_units(&tiles, &[Triplet, Run]);
    assert_eq!(units.count(Triplet), 3);
    assert_eq!(units.count(Run), 0);
}

#[test]
fn test_parse_runs_interleaved() {
    let tiles = tiles_of(Suit::Sou, &[1, 1, 2, 2, 3, 3, 4, 5, 6]);
    let units = parse_into_units(&tiles, &[Run]);
    let runs: Vec<Vec<Rank>> = units
        .get(Run)
        .iter()
        .map(|u| u.tiles.iter().map(|t| t.rank()).collect())
        .collect();
    assert_eq!(runs, vec![vec![1, 2, 3], vec![1, 2, 3], vec![4, 5, 6]]);
}

#[test]
fn test_parse_pairs() {
    // 1,1,1,2,2 -> (1,1)のみ, 残りの(1,2)は組にならない
    let tiles = tiles_of(Suit::Pin, &[1, 2, 1, 2, 1]);
    let units = parse_into_units(&tiles, &[Pair]);
    assert_eq!(units.count(Pair), 1);
    assert_eq!(units.get(Pair)[0].tiles, tiles_of(Suit::Pin, &[1, 1]));
}

#[test]
fn test_parse_partial_run() {
    let mut tiles = tiles_of(Suit::Man, &[4, 5]);
    tiles.extend(tiles_of(Suit::Wind, &[1, 2]));
    let units = parse_into_units(&tiles, &[PartialRun]);
    assert_eq!(units.count(PartialRun), 1);
    assert_eq!(units.get(PartialRun)[0].positions, vec![0, 1]);
    assert!(units.has_no_melds());
}

#[test]
fn test_parse_boundary() {
    let one = tiles_of(Suit::Man, &[1]);
    assert!(parse_into_units(&one, &DEFAULT_ORDER).iter().next().is_none());

    let two = tiles_of(Suit::Man, &[3, 3]);
    let units = parse_into_units(&two, &DEFAULT_ORDER);
    assert_eq!(units.count(Run) + units.count(Triplet) + units.count(Quad), 0);
    assert_eq!(units.count(Pair), 1);
}

#[test]
fn test_parse_honor_runs_ignored() {
    let tiles = tiles_of(Suit::Wind, &[1, 2, 3]);
    let units = parse_into_units(&tiles, &DEFAULT_ORDER);
    assert_eq!(units.count(Run), 0);
    assert_eq!(units.count(PartialRun), 0);
}
