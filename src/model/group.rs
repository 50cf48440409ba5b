use super::*;

// [GroupKind]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Run,       // 順子
    Triplet,   // 刻子
    Quad,      // 槓子
    Pair,      // 対子
    Ungrouped, // 未分解の牌
}

// [TileGroup]
// 呼び出し側から渡される牌グループ(副露, 未分解の手牌)と分解処理で生成される面子の両方を表す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGroup {
    #[serde(default)]
    pub id: GroupId,
    pub kind: GroupKind,
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub regroupable: bool, // 分解処理で生成されたグループのみtrue (再分解可能)
    #[serde(skip)]
    pub(crate) slots: Vec<Slot>, // tilesに対応するアリーナ上の位置
}

impl TileGroup {
    pub fn new(kind: GroupKind, tiles: Vec<Tile>, open: bool) -> Self {
        Self {
            id: 0,
            kind,
            tiles,
            open,
            regroupable: false,
            slots: vec![],
        }
    }

    // 未分解の手牌
    pub fn ungrouped(tiles: Vec<Tile>) -> Self {
        Self::new(GroupKind::Ungrouped, tiles, false)
    }

    // 副露
    pub fn called(kind: GroupKind, tiles: Vec<Tile>) -> Self {
        Self::new(kind, tiles, true)
    }

    #[inline]
    pub fn is_typed(&self) -> bool {
        self.kind != GroupKind::Ungrouped
    }

    #[inline]
    pub fn first_suit(&self) -> Option<Suit> {
        self.tiles.first().map(|t| t.suit())
    }

    // 牌の並び順に依存せず1枚ずつ対応がとれるかを判定
    pub fn is_equivalent(&self, other: &TileGroup, opt: TileMatch) -> bool {
        if self.tiles.len() != other.tiles.len() {
            return false;
        }
        let mut used = vec![false; other.tiles.len()];
        'outer: for t in &self.tiles {
            for (i, t2) in other.tiles.iter().enumerate() {
                if !used[i] && t.matches(t2, opt) {
                    used[i] = true;
                    continue 'outer;
                }
            }
            return false;
        }
        true
    }
}

impl fmt::Display for TileGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiles: Vec<String> = self.tiles.iter().map(|t| t.to_string()).collect();
        write!(f, "{:?}[{}]", self.kind, tiles.join(" "))?;
        if self.open {
            write!(f, "(open)")?;
        }
        Ok(())
    }
}

#[test]
fn test_group_equivalent() {
    let m = |r| Tile::new(Suit::Man, r).unwrap();
    let p = |r| Tile::new(Suit::Pin, r).unwrap();
    let a = TileGroup::new(GroupKind::Run, vec![m(1), m(2), m(3)], false);
    let b = TileGroup::new(GroupKind::Run, vec![m(3), m(1), m(2)], true);
    let c = TileGroup::new(GroupKind::Run, vec![p(1), p(2), p(3)], false);
    assert!(a.is_equivalent(&b, TileMatch::IGNORE_BONUS));
    assert!(!a.is_equivalent(&c, TileMatch::IGNORE_BONUS));
    let ignore_suit = TileMatch {
        ignore_suit: true,
        ..TileMatch::IGNORE_BONUS
    };
    assert!(a.is_equivalent(&c, ignore_suit));
}
