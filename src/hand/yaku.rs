use std::fmt;

use serde::{Deserialize, Serialize};

use super::parse::{parse_into_units, MeldKind, Units};
use crate::model::*;

type TileTable = [[usize; RANK]; SUIT];

// [PredicateArgs]
// 独自判定に渡される情報
#[derive(Debug)]
pub struct PredicateArgs<'a> {
    pub tiles: &'a [Tile],        // 手牌の全ての牌(副露を含む)
    pub units: &'a Units,         // 未分解の牌の初回分解結果
    pub groups: &'a [TileGroup],  // 作業領域の全てのグループ
    pub context: &'a Context,
}

impl<'a> PredicateArgs<'a> {
    // 種別のあるグループ
    fn typed_groups(&self) -> impl Iterator<Item = &'a TileGroup> + 'a {
        let groups = self.groups;
        groups.iter().filter(|g| g.is_typed())
    }

    // 種別のあるグループで全ての牌が使用されている
    fn is_fully_grouped(&self) -> bool {
        let n: usize = self.typed_groups().map(|g| g.tiles.len()).sum();
        n == self.tiles.len()
    }

    fn table(&self) -> TileTable {
        let mut tt = TileTable::default();
        for t in self.tiles {
            tt[t.suit().index()][t.rank() as usize] += 1;
        }
        tt
    }
}

// [Predicate]
// 要件の組み合わせでは表現できない役の判定
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Riichi,
    DoubleRiichi,
    SevenPairs,
    TerminalsAndHonors,
    TerminalsOnly,
    OutsideHand,
    PureOutsideHand,
    HalfFlush,
    FullFlush,
    ThirteenOrphans,
    ThirteenOrphansThirteenWait,
    NineGates,
    BlessingOfHeaven,
    TwoSidedRuns,
    FourWindsDiscarded,
    NineTerminals,
    Unsupported, // 状況役など判定に必要な情報がないもの (常にfalse)
    #[serde(skip)]
    External(fn(&PredicateArgs<'_>) -> bool),
}

impl Predicate {
    pub fn eval(&self, args: &PredicateArgs<'_>) -> bool {
        use Predicate::*;
        match self {
            Riichi => is_riichi(args),
            DoubleRiichi => is_dabururiichi(args),
            SevenPairs => is_chiitoitsu(args),
            TerminalsAndHonors => is_honroutou(args),
            TerminalsOnly => is_chinroutou(args),
            OutsideHand => is_chanta(args),
            PureOutsideHand => is_junchan(args),
            HalfFlush => is_honiisou(args),
            FullFlush => is_chiniisou(args),
            ThirteenOrphans => is_kokushimusou(args),
            ThirteenOrphansThirteenWait => is_kokushimusoujuusanmenmachi(args),
            NineGates => is_chuurenpoutou(args),
            BlessingOfHeaven => is_tenhou(args),
            TwoSidedRuns => is_pinfu(args),
            FourWindsDiscarded => is_suufuurenda(args),
            NineTerminals => is_kyuushukyuuhai(args),
            Unsupported => false,
            External(f) => f(args),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Predicate::*;
        let name = match self {
            Riichi => "Riichi",
            DoubleRiichi => "DoubleRiichi",
            SevenPairs => "SevenPairs",
            TerminalsAndHonors => "TerminalsAndHonors",
            TerminalsOnly => "TerminalsOnly",
            OutsideHand => "OutsideHand",
            PureOutsideHand => "PureOutsideHand",
            HalfFlush => "HalfFlush",
            FullFlush => "FullFlush",
            ThirteenOrphans => "ThirteenOrphans",
            ThirteenOrphansThirteenWait => "ThirteenOrphansThirteenWait",
            NineGates => "NineGates",
            BlessingOfHeaven => "BlessingOfHeaven",
            TwoSidedRuns => "TwoSidedRuns",
            FourWindsDiscarded => "FourWindsDiscarded",
            NineTerminals => "NineTerminals",
            Unsupported => "Unsupported",
            External(_) => "External(fn)",
        };
        write!(f, "{}", name)
    }
}

// 立直
fn is_riichi(args: &PredicateArgs<'_>) -> bool {
    args.context.riichi
}

// ダブル立直
fn is_dabururiichi(args: &PredicateArgs<'_>) -> bool {
    args.context.riichi && args.context.first_turn
}

// 七対子
fn is_chiitoitsu(args: &PredicateArgs<'_>) -> bool {
    if args.tiles.len() != HAND_MAX {
        return false;
    }
    let units = parse_into_units(args.tiles, &[MeldKind::Pair]);
    let pairs = units.get(MeldKind::Pair);
    if pairs.len() != 7 {
        return false;
    }
    // 同じ牌の対子を2つ含まない
    for (i, p) in pairs.iter().enumerate() {
        if pairs[i + 1..].iter().any(|p2| p2.tiles[0].same_kind(&p.tiles[0])) {
            return false;
        }
    }
    true
}

// 混老頭
fn is_honroutou(args: &PredicateArgs<'_>) -> bool {
    let mut has_honor = false;
    let mut has_terminal = false;
    for t in args.tiles {
        if t.is_honor() {
            has_honor = true;
        } else if t.is_terminal() {
            has_terminal = true;
        } else {
            return false;
        }
    }
    has_honor && has_terminal
}

// 清老頭
fn is_chinroutou(args: &PredicateArgs<'_>) -> bool {
    !args.tiles.is_empty() && args.tiles.iter().all(|t| t.is_terminal())
}

// 混全帯么九
fn is_chanta(args: &PredicateArgs<'_>) -> bool {
    if !args.is_fully_grouped() || !args.typed_groups().any(|g| g.kind == GroupKind::Run) {
        return false;
    }

    let mut has_honor = false;
    for g in args.typed_groups() {
        if g.tiles.iter().any(|t| t.is_honor()) {
            has_honor = true;
        } else if !g.tiles.iter().any(|t| t.is_terminal()) {
            return false;
        }
    }

    has_honor
}

// 純全帯么九
fn is_junchan(args: &PredicateArgs<'_>) -> bool {
    if !args.is_fully_grouped() || !args.typed_groups().any(|g| g.kind == GroupKind::Run) {
        return false;
    }

    args.typed_groups()
        .all(|g| g.tiles.iter().all(|t| t.is_numbered()) && g.tiles.iter().any(|t| t.is_terminal()))
}

// 数牌の種類数と字牌の有無
fn count_suits(tiles: &[Tile]) -> (usize, bool) {
    let numbered = Suit::NUMBERED
        .iter()
        .filter(|&&s| tiles.iter().any(|t| t.suit() == s))
        .count();
    let has_honor = tiles.iter().any(|t| t.is_honor());
    (numbered, has_honor)
}

// 混一色
fn is_honiisou(args: &PredicateArgs<'_>) -> bool {
    count_suits(args.tiles) == (1, true)
}

// 清一色
fn is_chiniisou(args: &PredicateArgs<'_>) -> bool {
    count_suits(args.tiles) == (1, false)
}

// 么九牌の種類数
fn count_terminal_kinds(tt: &TileTable) -> usize {
    let mut n = 0;
    for s in Suit::ALL {
        for ni in 1..=s.max_rank() as usize {
            if tile(s, ni as Rank).is_terminal_or_honor() && tt[s.index()][ni] > 0 {
                n += 1;
            }
        }
    }
    n
}

// 国士無双 (十三面待ちを含む)
fn is_kokushimusou(args: &PredicateArgs<'_>) -> bool {
    if !args.context.closed || args.tiles.len() != HAND_MAX {
        return false;
    }
    args.tiles.iter().all(|t| t.is_terminal_or_honor()) && count_terminal_kinds(&args.table()) == 13
}

// 国士無双十三面待ち
fn is_kokushimusoujuusanmenmachi(args: &PredicateArgs<'_>) -> bool {
    if !is_kokushimusou(args) {
        return false;
    }
    let prev = &args.context.previous_hand;
    let mut tt = TileTable::default();
    for t in prev {
        tt[t.suit().index()][t.rank() as usize] += 1;
    }
    prev.iter().all(|t| t.is_terminal_or_honor()) && count_terminal_kinds(&tt) == 13
}

// 九蓮宝燈(純正を含む)
fn is_chuurenpoutou(args: &PredicateArgs<'_>) -> bool {
    if !args.context.closed || args.tiles.len() != HAND_MAX {
        return false;
    }

    let suit = match args.tiles.first() {
        Some(t) if t.is_numbered() => t.suit(),
        _ => return false,
    };
    if args.tiles.iter().any(|t| t.suit() != suit) {
        return false;
    }

    let h = &args.table()[suit.index()];
    if h[1] < 3 || h[9] < 3 {
        return false;
    }
    for ni in 2..9 {
        if h[ni] == 0 {
            return false;
        }
    }

    true
}

// 天和, 地和
fn is_tenhou(args: &PredicateArgs<'_>) -> bool {
    let ctx = args.context;
    ctx.self_draw && ctx.closed && ctx.first_turn
}

// 平和
fn is_pinfu(args: &PredicateArgs<'_>) -> bool {
    let ctx = args.context;
    if ctx.wait_shape != Some(WaitShape::TwoSided) {
        return false;
    }

    let mut n_run = 0;
    let mut pair = None;
    for g in args.typed_groups() {
        if g.open {
            return false;
        }
        match g.kind {
            GroupKind::Run => n_run += 1,
            GroupKind::Pair if pair.is_none() => pair = g.tiles.first(),
            _ => return false,
        }
    }
    if n_run != 4 {
        return false;
    }

    // 役牌の雀頭は不可
    match pair {
        Some(pt) => {
            let is_wind = |w: Option<Tile>| w.map_or(false, |w| w.same_kind(pt));
            pt.suit() != Suit::Dragon && !is_wind(ctx.seat_wind) && !is_wind(ctx.round_wind)
        }
        None => false,
    }
}

// 四風連打
fn is_suufuurenda(args: &PredicateArgs<'_>) -> bool {
    let d = &args.context.discards;
    if d.len() < 4 {
        return false;
    }
    let last = &d[d.len() - 4..];
    last[0].suit() == Suit::Wind && last.iter().all(|t| t.same_kind(&last[0]))
}

// 九種九牌
fn is_kyuushukyuuhai(args: &PredicateArgs<'_>) -> bool {
    let ctx = args.context;
    if !ctx.first_turn || ctx.anyone_open {
        return false;
    }
    count_terminal_kinds(&args.table()) >= 9
}

#[cfg(test)]
fn eval_tiles(pred: Predicate, tiles: &[Tile], ctx: &Context) -> bool {
    let groups = vec![TileGroup::ungrouped(tiles.to_vec())];
    let units = parse_into_units(tiles, &super::parse::DEFAULT_ORDER);
    let args = PredicateArgs {
        tiles,
        units: &units,
        groups: &groups,
        context: ctx,
    };
    pred.eval(&args)
}

#[cfg(test)]
fn tiles_of(suit: Suit, ranks: &[Rank]) -> Vec<Tile> {
    ranks.iter().map(|&r| Tile::new(suit, r).unwrap()).collect()
}

#[cfg(test)]
fn kokushi_13() -> Vec<Tile> {
    let mut tiles = vec![];
    for s in Suit::NUMBERED {
        tiles.extend(tiles_of(s, &[1, 9]));
    }
    tiles.extend(tiles_of(Suit::Wind, &[WE, WS, WW, WN]));
    tiles.extend(tiles_of(Suit::Dragon, &[DR, DG, DW]));
    tiles
}

#[test]
fn test_chiitoitsu() {
    let mut tiles = tiles_of(Suit::Man, &[1, 1, 3, 3, 5, 5]);
    tiles.extend(tiles_of(Suit::Pin, &[2, 2, 8, 8]));
    tiles.extend(tiles_of(Suit::Dragon, &[DW, DW, DR, DR]));
    assert!(eval_tiles(Predicate::SevenPairs, &tiles, &Context::closed()));

    // 同じ牌4枚は2つの対子として扱わない
    let mut tiles = tiles_of(Suit::Man, &[1, 1, 1, 1, 5, 5]);
    tiles.extend(tiles_of(Suit::Pin, &[2, 2, 8, 8]));
    tiles.extend(tiles_of(Suit::Dragon, &[DW, DW, DR, DR]));
    assert!(!eval_tiles(Predicate::SevenPairs, &tiles, &Context::closed()));
}

#[test]
fn test_kokushimusou() {
    let mut tiles = kokushi_13();
    tiles.push(Tile::new(Suit::Dragon, DR).unwrap());
    let ctx = Context::closed();
    assert!(eval_tiles(Predicate::ThirteenOrphans, &tiles, &ctx));
    assert!(!eval_tiles(Predicate::ThirteenOrphansThirteenWait, &tiles, &ctx));
    assert!(!eval_tiles(Predicate::ThirteenOrphans, &tiles, &Context::default()));

    let ctx = Context {
        previous_hand: kokushi_13(),
        ..Context::closed()
    };
    assert!(eval_tiles(Predicate::ThirteenOrphansThirteenWait, &tiles, &ctx));
}

#[test]
fn test_chuurenpoutou() {
    let tiles = tiles_of(Suit::Sou, &[1, 1, 1, 2, 3, 4, 5, 5, 6, 7, 8, 9, 9, 9]);
    assert!(eval_tiles(Predicate::NineGates, &tiles, &Context::closed()));
    let tiles = tiles_of(Suit::Sou, &[1, 1, 2, 2, 3, 4, 5, 5, 6, 7, 8, 9, 9, 9]);
    assert!(!eval_tiles(Predicate::NineGates, &tiles, &Context::closed()));
}

#[test]
fn test_flush() {
    let mut tiles = tiles_of(Suit::Pin, &[1, 2, 3, 5, 5]);
    assert!(eval_tiles(Predicate::FullFlush, &tiles, &Context::default()));
    assert!(!eval_tiles(Predicate::HalfFlush, &tiles, &Context::default()));
    tiles.extend(tiles_of(Suit::Wind, &[WN, WN, WN]));
    assert!(!eval_tiles(Predicate::FullFlush, &tiles, &Context::default()));
    assert!(eval_tiles(Predicate::HalfFlush, &tiles, &Context::default()));
}

#[test]
fn test_chanta() {
    // 123m 789p 111s 99s 東東東
    let mut tiles = tiles_of(Suit::Man, &[1, 2, 3]);
    tiles.extend(tiles_of(Suit::Pin, &[7, 8, 9]));
    tiles.extend(tiles_of(Suit::Sou, &[1, 1, 1, 9, 9]));
    tiles.extend(tiles_of(Suit::Wind, &[WE, WE, WE]));
    let hand = vec![TileGroup::ungrouped(tiles.clone())];
    let (pool, units) = super::pool::TilePool::new(hand);
    let args = PredicateArgs {
        tiles: &tiles,
        units: &units,
        groups: pool.groups(),
        context: &Context::default(),
    };
    assert!(Predicate::OutsideHand.eval(&args));
    assert!(!Predicate::PureOutsideHand.eval(&args));
}

#[test]
fn test_situational() {
    let ctx = Context {
        riichi: true,
        first_turn: true,
        ..Context::closed()
    };
    let tiles = tiles_of(Suit::Man, &[1, 2, 3]);
    assert!(eval_tiles(Predicate::Riichi, &tiles, &ctx));
    assert!(eval_tiles(Predicate::DoubleRiichi, &tiles, &ctx));
    assert!(!eval_tiles(Predicate::BlessingOfHeaven, &tiles, &ctx));
    assert!(!eval_tiles(Predicate::Unsupported, &tiles, &ctx));

    let ctx = Context {
        discards: tiles_of(Suit::Wind, &[WS, WS, WS, WS]),
        ..Default::default()
    };
    assert!(eval_tiles(Predicate::FourWindsDiscarded, &tiles, &ctx));

    let ext = Predicate::External(|args| args.tiles.len() == 3);
    assert!(eval_tiles(ext, &tiles, &Context::default()));
    assert_eq!(format!("{:?}", ext), "External(fn)");
}

#[test]
fn test_kyuushukyuuhai() {
    let mut tiles = kokushi_13();
    tiles.truncate(9);
    tiles.extend(tiles_of(Suit::Man, &[2, 3, 4, 5, 6]));
    let ctx = Context {
        first_turn: true,
        ..Default::default()
    };
    assert!(eval_tiles(Predicate::NineTerminals, &tiles, &ctx));
    let ctx = Context {
        anyone_open: true,
        ..ctx
    };
    assert!(!eval_tiles(Predicate::NineTerminals, &tiles, &ctx));
}
