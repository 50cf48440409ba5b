use serde::{de, ser};

use super::*;
use crate::error::Error;

// [Suit]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Man,    // 萬子
    Pin,    // 筒子
    Sou,    // 索子
    Wind,   // 風牌
    Dragon, // 三元牌
}

impl Suit {
    pub const ALL: [Suit; SUIT] = [Suit::Man, Suit::Pin, Suit::Sou, Suit::Wind, Suit::Dragon];
    pub const NUMBERED: [Suit; 3] = [Suit::Man, Suit::Pin, Suit::Sou];
    pub const HONORS: [Suit; 2] = [Suit::Wind, Suit::Dragon];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_numbered(self) -> bool {
        matches!(self, Suit::Man | Suit::Pin | Suit::Sou)
    }

    #[inline]
    pub fn max_rank(self) -> Rank {
        match self {
            Suit::Man | Suit::Pin | Suit::Sou => 9,
            Suit::Wind => 4,
            Suit::Dragon => 3,
        }
    }

    fn symbol(self) -> char {
        ['m', 'p', 's', 'w', 'd'][self.index()]
    }
}

// [TileMatch]
// Tile::matchesで無視するフィールド
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TileMatch {
    pub ignore_suit: bool,
    pub ignore_rank: bool,
    pub ignore_bonus: bool,
}

impl TileMatch {
    pub const EXACT: TileMatch = TileMatch {
        ignore_suit: false,
        ignore_rank: false,
        ignore_bonus: false,
    };
    pub const IGNORE_BONUS: TileMatch = TileMatch {
        ignore_suit: false,
        ignore_rank: false,
        ignore_bonus: true,
    };
}

// [Tile]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    suit: Suit,
    rank: Rank,
    bonus: bool, // 赤ドラ
}

impl Tile {
    pub fn new(suit: Suit, rank: Rank) -> Result<Self, Error> {
        Self::with_bonus(suit, rank, false)
    }

    pub fn with_bonus(suit: Suit, rank: Rank, bonus: bool) -> Result<Self, Error> {
        if rank < 1 || rank > suit.max_rank() {
            return Err(Error::InvalidTile { suit, rank });
        }
        Ok(Self { suit, rank, bonus })
    }

    #[inline]
    pub fn suit(&self) -> Suit {
        self.suit
    }

    #[inline]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    #[inline]
    pub fn is_bonus(&self) -> bool {
        self.bonus
    }

    pub fn matches(&self, other: &Tile, opt: TileMatch) -> bool {
        (opt.ignore_suit || self.suit == other.suit)
            && (opt.ignore_rank || self.rank == other.rank)
            && (opt.ignore_bonus || self.bonus == other.bonus)
    }

    // 赤ドラを区別しない比較
    #[inline]
    pub fn same_kind(&self, other: &Tile) -> bool {
        self.matches(other, TileMatch::IGNORE_BONUS)
    }

    // 数牌
    #[inline]
    pub fn is_numbered(&self) -> bool {
        self.suit.is_numbered()
    }

    // 字牌
    #[inline]
    pub fn is_honor(&self) -> bool {
        !self.suit.is_numbered()
    }

    // 1,9牌
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.is_numbered() && (self.rank == 1 || self.rank == 9)
    }

    // 么九牌
    #[inline]
    pub fn is_terminal_or_honor(&self) -> bool {
        self.is_honor() || self.rank == 1 || self.rank == 9
    }

    // 中張牌
    #[inline]
    pub fn is_simple(&self) -> bool {
        !self.is_terminal_or_honor()
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit.symbol(), self.rank)?;
        if self.bonus {
            write!(f, "*")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[derive(Serialize, Deserialize)]
struct TileRepr {
    suit: Suit,
    rank: Rank,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    bonus: bool,
}

impl ser::Serialize for Tile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        TileRepr {
            suit: self.suit,
            rank: self.rank,
            bonus: self.bonus,
        }
        .serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for Tile {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        let r = TileRepr::deserialize(deserializer)?;
        Tile::with_bonus(r.suit, r.rank, r.bonus).map_err(de::Error::custom)
    }
}

// 評価処理内でのみ使用する妥当性確認済みの牌の生成
pub(crate) fn tile(suit: Suit, rank: Rank) -> Tile {
    debug_assert!(1 <= rank && rank <= suit.max_rank());
    Tile {
        suit,
        rank,
        bonus: false,
    }
}

#[test]
fn test_tile_range() {
    assert!(Tile::new(Suit::Man, 9).is_ok());
    assert!(Tile::new(Suit::Man, 0).is_err());
    assert!(Tile::new(Suit::Wind, 4).is_ok());
    assert!(Tile::new(Suit::Wind, 5).is_err());
    assert!(Tile::new(Suit::Dragon, 3).is_ok());
    assert!(matches!(
        Tile::new(Suit::Dragon, 4),
        Err(Error::InvalidTile {
            suit: Suit::Dragon,
            rank: 4
        })
    ));
}

#[test]
fn test_tile_matches() {
    let red5 = Tile::with_bonus(Suit::Pin, 5, true).unwrap();
    let p5 = Tile::new(Suit::Pin, 5).unwrap();
    let s5 = Tile::new(Suit::Sou, 5).unwrap();
    assert_ne!(red5, p5);
    assert!(red5.same_kind(&p5));
    assert!(!red5.matches(&p5, TileMatch::EXACT));
    assert!(red5.matches(&p5, TileMatch::IGNORE_BONUS));
    assert!(!p5.matches(&s5, TileMatch::IGNORE_BONUS));
    let opt = TileMatch {
        ignore_suit: true,
        ..TileMatch::IGNORE_BONUS
    };
    assert!(red5.matches(&s5, opt));
}

#[test]
fn test_tile_classify() {
    let m1 = Tile::new(Suit::Man, 1).unwrap();
    let s5 = Tile::new(Suit::Sou, 5).unwrap();
    let d1 = Tile::new(Suit::Dragon, 1).unwrap();
    assert!(m1.is_terminal() && !m1.is_simple());
    assert!(s5.is_simple() && !s5.is_terminal_or_honor());
    // 字牌の1は老頭牌ではない
    assert!(d1.is_honor() && !d1.is_terminal() && !d1.is_simple());
}

#[test]
fn test_tile_serde() {
    let t: Tile = serde_json::from_str(r#"{"suit":"sou","rank":5,"bonus":true}"#).unwrap();
    assert_eq!(t, Tile::with_bonus(Suit::Sou, 5, true).unwrap());
    assert_eq!(t.to_string(), "s5*");
    let s = serde_json::to_string(&Tile::new(Suit::Wind, 1).unwrap()).unwrap();
    assert_eq!(s, r#"{"suit":"wind","rank":1}"#);
    assert!(serde_json::from_str::<Tile>(r#"{"suit":"dragon","rank":7}"#).is_err());
}
