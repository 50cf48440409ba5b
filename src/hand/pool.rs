use super::parse::{parse_into_units, MeldKind, Units, DEFAULT_ORDER};
use crate::model::*;

// [TilePool]
// 手牌の全ての牌を保持するアリーナと, それを参照する牌グループの作業領域
// 各TileGroupはslotsでアリーナ上の牌を参照する
#[derive(Debug, Clone, Default)]
pub struct TilePool {
    tiles: Vec<Tile>,        // アリーナ (slot -> 牌)
    groups: Vec<TileGroup>,  // 作業中の牌グループ
    next_id: GroupId,        // 次に割り当てるグループID
}

impl TilePool {
    // 呼び出し側のグループ(副露, 未分解の手牌)から作業領域を生成
    // 未分解の牌はDEFAULT_ORDERで分解し, 再分解可能なグループとして末尾に追加する
    // 返り値の2つ目は初回分解の結果
    pub fn new(groups: Vec<TileGroup>) -> (Self, Units) {
        let mut pool = Self::default();
        let mut ungrouped = vec![];
        for mut g in groups {
            g.slots = (pool.tiles.len()..pool.tiles.len() + g.tiles.len()).collect();
            pool.tiles.extend(g.tiles.iter().copied());
            if !g.is_typed() {
                ungrouped.extend(g.slots.iter().copied());
            }
            g.id = pool.next_id;
            g.regroupable = false;
            pool.next_id += 1;
            pool.groups.push(g);
        }

        let ungrouped_tiles: Vec<Tile> = ungrouped.iter().map(|&s| pool.tiles[s]).collect();
        let units = parse_into_units(&ungrouped_tiles, &DEFAULT_ORDER);
        let groups = pool.groups_from_units(&units, &ungrouped);
        pool.next_id += groups.len();
        pool.groups.extend(groups);

        (pool, units)
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn groups(&self) -> &[TileGroup] {
        &self.groups
    }

    // 種別のあるグループ(未分解以外)が存在するか
    pub fn has_typed_groups(&self) -> bool {
        self.groups.iter().any(|g| g.is_typed())
    }

    // 再分解可能なグループの牌のslot
    pub fn regroupable_slots(&self) -> Vec<Slot> {
        self.groups
            .iter()
            .filter(|g| g.regroupable)
            .flat_map(|g| g.slots.iter().copied())
            .collect()
    }

    // 再分解可能な牌をorderで分解し直したグループを返却 (作業領域は変更しない)
    // 返却されるグループには作業領域に存在しないIDが割り当てられる
    pub fn regroup(&self, order: &[MeldKind]) -> Vec<TileGroup> {
        let slots = self.regroupable_slots();
        let tiles: Vec<Tile> = slots.iter().map(|&s| self.tiles[s]).collect();
        let units = parse_into_units(&tiles, order);
        self.groups_from_units(&units, &slots)
    }

    // 要件に使用されたグループを作業領域から取り除く
    // 作業領域に存在しないグループ(regroupで生成されたもの)の牌が使われた場合は
    // 残りの再分解可能な牌をDEFAULT_ORDERで分解し直す
    pub fn claim(&mut self, claimed: &[TileGroup]) {
        let mut carved = vec![];
        for g in claimed {
            if let Some(i) = self.groups.iter().position(|p| p.id == g.id) {
                self.groups.remove(i);
            } else {
                carved.extend(g.slots.iter().copied());
            }
            self.next_id = self.next_id.max(g.id + 1);
        }
        if carved.is_empty() {
            return;
        }

        let rest: Vec<Slot> = self
            .regroupable_slots()
            .into_iter()
            .filter(|s| !carved.contains(s))
            .collect();
        self.groups.retain(|g| !g.regroupable);

        let tiles: Vec<Tile> = rest.iter().map(|&s| self.tiles[s]).collect();
        let units = parse_into_units(&tiles, &DEFAULT_ORDER);
        let groups = self.groups_from_units(&units, &rest);
        self.next_id += groups.len();
        self.groups.extend(groups);
    }

    // 分解結果をグループに変換 (両面搭子は含めない)
    // slotsは分解対象の牌リストのindexからアリーナ上の位置への対応
    fn groups_from_units(&self, units: &Units, slots: &[Slot]) -> Vec<TileGroup> {
        let mut res = vec![];
        for u in units.iter() {
            let kind = match u.kind.group_kind() {
                Some(k) => k,
                None => continue,
            };
            res.push(TileGroup {
                id: self.next_id + res.len(),
                kind,
                tiles: u.tiles.clone(),
                open: false,
                regroupable: true,
                slots: u.positions.iter().map(|&p| slots[p]).collect(),
            });
        }
        res
    }
}

#[cfg(test)]
fn man(ranks: &[Rank]) -> Vec<Tile> {
    ranks.iter().map(|&r| Tile::new(Suit::Man, r).unwrap()).collect()
}

#[test]
fn test_pool_new() {
    let pon = TileGroup::called(GroupKind::Triplet, man(&[9, 9, 9]));
    let hand = TileGroup::ungrouped(man(&[1, 2, 3, 5, 5]));
    let (pool, units) = TilePool::new(vec![pon, hand]);

    assert_eq!(pool.tiles().len(), 8);
    assert_eq!(units.count(MeldKind::Run), 1);
    assert_eq!(units.count(MeldKind::Pair), 1);

    let kinds: Vec<(GroupKind, bool)> = pool.groups().iter().map(|g| (g.kind, g.regroupable)).collect();
    assert_eq!(
        kinds,
        vec![
            (GroupKind::Triplet, false),
            (GroupKind::Ungrouped, false),
            (GroupKind::Run, true),
            (GroupKind::Pair, true),
        ]
    );

    // IDは重複しない
    let mut ids: Vec<GroupId> = pool.groups().iter().map(|g| g.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    // slotはアリーナ上の牌を指す
    for g in pool.groups() {
        let tiles: Vec<Tile> = g.slots.iter().map(|&s| pool.tiles()[s]).collect();
        assert_eq!(tiles, g.tiles);
    }
}

#[test]
fn test_pool_claim_carved() {
    // 222333444 -> 順子x3, 刻子優先で分解し直した刻子を1つ使用
    let hand = TileGroup::ungrouped(man(&[2, 2, 2, 3, 3, 3, 4, 4, 4]));
    let (mut pool, _) = TilePool::new(vec![hand]);
    assert_eq!(pool.groups().iter().filter(|g| g.kind == GroupKind::Run).count(), 3);

    let derived = pool.regroup(&[MeldKind::Triplet]);
    assert_eq!(derived.len(), 3);
    assert!(derived.iter().all(|d| pool.groups().iter().all(|g| g.id != d.id)));

    pool.claim(&derived[..1]);
    let rest: Vec<&TileGroup> = pool.groups().iter().filter(|g| g.regroupable).collect();
    // 333444 -> 順子は作れず刻子2つ
    assert_eq!(rest.len(), 2);
    assert!(rest.iter().all(|g| g.kind == GroupKind::Triplet));
    assert!(rest.iter().all(|g| g.id > derived[0].id));
}

#[test]
fn test_pool_claim_whole_group() {
    let hand = TileGroup::ungrouped(man(&[1, 2, 3, 7, 8, 9]));
    let (mut pool, _) = TilePool::new(vec![hand]);
    let first = pool.groups()[1].clone();
    pool.claim(&[first.clone()]);
    assert!(pool.groups().iter().all(|g| g.id != first.id));
    assert_eq!(pool.groups().len(), 2);
}
