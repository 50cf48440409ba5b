use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use yakumatch::hand::standard::{self, *};
use yakumatch::hand::{parse_into_units, Matcher, MeldKind, DEFAULT_ORDER};
use yakumatch::model::*;

// "m123 p55 w1" 形式のテスト用の牌リスト
fn tiles(exp: &str) -> Vec<Tile> {
    let mut res = vec![];
    for part in exp.split_whitespace() {
        let suit = match &part[..1] {
            "m" => Suit::Man,
            "p" => Suit::Pin,
            "s" => Suit::Sou,
            "w" => Suit::Wind,
            "d" => Suit::Dragon,
            s => panic!("unknown suit: {}", s),
        };
        for c in part[1..].chars() {
            let rank = c.to_digit(10).unwrap() as Rank;
            res.push(Tile::new(suit, rank).unwrap());
        }
    }
    res
}

fn hand(exp: &str) -> Vec<TileGroup> {
    vec![TileGroup::ungrouped(tiles(exp))]
}

fn wind(rank: Rank) -> Option<Tile> {
    Some(Tile::new(Suit::Wind, rank).unwrap())
}

fn check(groups: Vec<TileGroup>, ctx: Context) -> Vec<String> {
    let reg = standard::standard_registry();
    let res = Matcher::new(groups, ctx).check_with(&reg).unwrap();
    res.ids().map(|id| id.to_string()).collect()
}

fn assert_has(ids: &[String], id: &str) {
    assert!(ids.iter().any(|x| x == id), "{} not in {:?}", id, ids);
}

fn assert_not(ids: &[String], id: &str) {
    assert!(ids.iter().all(|x| x != id), "{} in {:?}", id, ids);
}

#[test]
fn test_tanyao_pinfu() {
    let ctx = Context {
        self_draw: true,
        wait_shape: Some(WaitShape::TwoSided),
        seat_wind: wind(WS),
        round_wind: wind(WE),
        ..Context::closed()
    };
    let ids = check(hand("m234567 p23455 s678"), ctx);
    assert_has(&ids, TANYAO);
    assert_has(&ids, PINFU);
    assert_has(&ids, MENZEN_TSUMO);
    assert_not(&ids, IIPEIKOU);
    assert_not(&ids, RIICHI);
}

#[test]
fn test_tanyao_rejects_honor() {
    let ids = check(hand("m234567 p234 s678 d22"), Context::closed());
    assert_not(&ids, TANYAO);
    assert_not(&ids, HATSU);
}

#[test]
fn test_pinfu_rejects_yakuhai_pair() {
    let ctx = Context {
        wait_shape: Some(WaitShape::TwoSided),
        seat_wind: wind(WS),
        round_wind: wind(WE),
        ..Context::closed()
    };
    let ids = check(hand("m234567 p234 s678 w22"), ctx.clone());
    assert_not(&ids, PINFU);
    let ids = check(hand("m234567 p234 s678 w33"), ctx);
    assert_has(&ids, PINFU);
}

#[test]
fn test_jikaze_bakaze() {
    let pon = TileGroup::called(GroupKind::Triplet, tiles("w222"));
    let mut groups = vec![pon];
    groups.extend(hand("m123 p456 s78999"));
    let ctx = Context {
        open: true,
        seat_wind: wind(WS),
        round_wind: wind(WE),
        ..Default::default()
    };
    let ids = check(groups.clone(), ctx);
    assert_has(&ids, JIKAZE);
    assert_not(&ids, BAKAZE);

    // 連風牌
    let ctx = Context {
        open: true,
        seat_wind: wind(WS),
        round_wind: wind(WS),
        ..Default::default()
    };
    let ids = check(groups, ctx);
    assert_has(&ids, JIKAZE);
    assert_has(&ids, BAKAZE);
}

#[test]
fn test_iipeikou_ryanpeikou() {
    let ids = check(hand("m123456456 p789 s55"), Context::closed());
    assert_has(&ids, IIPEIKOU);
    assert_not(&ids, RYANPEIKOU);

    let ids = check(hand("m112233 p445566 s55"), Context::closed());
    assert_has(&ids, IIPEIKOU);
    assert_has(&ids, RYANPEIKOU);

    // 副露している場合は不成立
    let ids = check(hand("m112233 p456 s789 w44"), Context::default());
    assert_not(&ids, IIPEIKOU);
}

#[test]
fn test_toitoi() {
    let mut groups = vec![
        TileGroup::called(GroupKind::Triplet, tiles("p777")),
        TileGroup::called(GroupKind::Quad, tiles("d2222")),
    ];
    groups.extend(hand("m222333 s55"));
    let ids = check(groups, Context::default());
    assert_has(&ids, TOITOI);
    assert_has(&ids, HATSU);
    assert_not(&ids, SANANKOU);
}

#[test]
fn test_sanshoku() {
    let ids = check(hand("m222567 p22299 s222"), Context::closed());
    assert_has(&ids, SANSHOKU_DOUKOU);
    assert_has(&ids, SANANKOU);
    assert_not(&ids, SANSHOKU_DOUJUN);

    let ids = check(hand("m123456 p12399 s123"), Context::closed());
    assert_has(&ids, SANSHOKU_DOUJUN);
    assert_not(&ids, SANSHOKU_DOUKOU);
}

#[test]
fn test_sanshoku_doujun_needs_three_suits() {
    // 同じ牌種の順子3つは三色同順ではない
    let ids = check(hand("m111222333 p456 s55"), Context::closed());
    assert_has(&ids, IIPEIKOU);
    assert_not(&ids, SANSHOKU_DOUJUN);

    let ids = check(hand("m123123 p123 s123 w11"), Context::closed());
    assert_has(&ids, SANSHOKU_DOUJUN);

    // 副露した順子を含む場合も成立
    let mut groups = vec![TileGroup::called(GroupKind::Run, tiles("s567"))];
    groups.extend(hand("m567 p567 m234 d33"));
    let ids = check(groups, Context::default());
    assert_has(&ids, SANSHOKU_DOUJUN);
}

#[test]
fn test_sanankou_with_open_meld() {
    let mut groups = vec![TileGroup::called(GroupKind::Run, tiles("p234"))];
    groups.extend(hand("m111 s222 w333 m55"));
    let ids = check(groups, Context::default());
    assert_has(&ids, SANANKOU);

    // 副露した刻子は数えない
    let mut groups = vec![TileGroup::called(GroupKind::Triplet, tiles("p777"))];
    groups.extend(hand("m111 s222 m456 m55"));
    let ids = check(groups, Context::default());
    assert_not(&ids, SANANKOU);

    // 暗槓は数える
    let mut groups = vec![
        TileGroup::new(GroupKind::Quad, tiles("p7777"), false),
        TileGroup::called(GroupKind::Run, tiles("s345")),
    ];
    groups.extend(hand("m111 s222 m55"));
    let ids = check(groups, Context::default());
    assert_has(&ids, SANANKOU);
}

#[test]
fn test_chiitoitsu() {
    let ids = check(hand("m113355 p2288 d3311"), Context::closed());
    assert_has(&ids, CHIITOITSU);
    assert_not(&ids, TOITOI);
    let ids = check(hand("m113355 p2288 d3311"), Context::default());
    assert_not(&ids, CHIITOITSU);
}

#[test]
fn test_kokushi() {
    let ids = check(hand("m19 p19 s19 w1234 d1233"), Context::closed());
    assert_has(&ids, KOKUSHI);
    assert_not(&ids, KOKUSHI_13);

    let ctx = Context {
        previous_hand: tiles("m19 p19 s19 w1234 d123"),
        ..Context::closed()
    };
    let ids = check(hand("m19 p19 s19 w1234 d1233"), ctx);
    assert_has(&ids, KOKUSHI_13);
}

#[test]
fn test_flush() {
    let ids = check(hand("s12233445556789"), Context::closed());
    assert_has(&ids, CHINITSU);
    assert_has(&ids, ITTSU);
    assert_not(&ids, HONITSU);

    let ids = check(hand("s123456789 s55 w111"), Context::closed());
    assert_has(&ids, HONITSU);
    assert_has(&ids, ITTSU);
    assert_not(&ids, CHINITSU);
}

#[test]
fn test_dragons() {
    let ids = check(hand("d111222333 m234 p55"), Context::closed());
    assert_has(&ids, DAISANGEN);
    assert_not(&ids, SHOUSANGEN);

    let ids = check(hand("d11122233 m234 p555"), Context::closed());
    assert_has(&ids, SHOUSANGEN);
    assert_not(&ids, DAISANGEN);
}

#[test]
fn test_winds() {
    let ids = check(hand("w111222333444 m55"), Context::closed());
    assert_has(&ids, DAISUUSHI);
    assert_not(&ids, SHOUSUUSHI);

    let ids = check(hand("w11122233344 m555"), Context::closed());
    assert_has(&ids, SHOUSUUSHI);
    assert_not(&ids, DAISUUSHI);
}

#[test]
fn test_honors_only() {
    let ids = check(hand("w111222333 d11122"), Context::closed());
    assert_has(&ids, TSUUIISOU);
    assert_not(&ids, TANYAO);

    let ids = check(hand("s223344666888 d22"), Context::closed());
    assert_has(&ids, RYUUIISOU);
    let ids = check(hand("s223344666888 d33"), Context::closed());
    assert_not(&ids, RYUUIISOU);
}

#[test]
fn test_chuuren() {
    let ids = check(hand("m11123455678999"), Context::closed());
    assert_has(&ids, CHUUREN);
    assert_has(&ids, CHINITSU);
}

#[test]
fn test_empty_hand() {
    assert!(check(vec![], Context::closed()).is_empty());
    assert!(check(hand(""), Context::closed()).is_empty());
}

#[test]
fn test_shuffled_input_is_deterministic() {
    let reg = standard::standard_registry();
    let mut base = tiles("m234567 p23455 s678");
    let ctx = Context {
        self_draw: true,
        wait_shape: Some(WaitShape::TwoSided),
        ..Context::closed()
    };
    let expected = Matcher::new(vec![TileGroup::ungrouped(base.clone())], ctx.clone())
        .check_with(&reg)
        .unwrap();
    assert_eq!(
        expected,
        Matcher::new(vec![TileGroup::ungrouped(base.clone())], ctx.clone())
            .check_with(&reg)
            .unwrap()
    );

    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        base.shuffle(&mut rng);
        let res = Matcher::new(vec![TileGroup::ungrouped(base.clone())], ctx.clone())
            .check_with(&reg)
            .unwrap();
        assert_eq!(
            expected.ids().collect::<Vec<_>>(),
            res.ids().collect::<Vec<_>>()
        );
    }
}

fn arb_tile() -> impl Strategy<Value = Tile> {
    (0..Suit::ALL.len(), 1u8..=9).prop_map(|(si, r)| {
        let suit = Suit::ALL[si];
        let rank = (r - 1) % suit.max_rank() + 1;
        Tile::new(suit, rank).unwrap()
    })
}

fn arb_order() -> impl Strategy<Value = Vec<MeldKind>> {
    prop::sample::subsequence(DEFAULT_ORDER.to_vec(), 0..=DEFAULT_ORDER.len()).prop_shuffle()
}

proptest! {
    #[test]
    fn prop_decompose_idempotent(
        tiles in prop::collection::vec(arb_tile(), 0..=HAND_MAX),
        order in arb_order(),
    ) {
        prop_assert_eq!(parse_into_units(&tiles, &order), parse_into_units(&tiles, &order));
    }

    #[test]
    fn prop_decompose_conserves_tiles(
        tiles in prop::collection::vec(arb_tile(), 0..=HAND_MAX),
        order in arb_order(),
    ) {
        let units = parse_into_units(&tiles, &order);
        let mut used = vec![false; tiles.len()];
        for u in units.iter() {
            prop_assert_eq!(u.tiles.len(), u.positions.len());
            for (&p, t) in u.positions.iter().zip(&u.tiles) {
                prop_assert!(!used[p], "position {} used twice", p);
                used[p] = true;
                prop_assert_eq!(tiles[p], *t);
            }
            // 順子と両面搭子は数牌のみ
            if u.kind == MeldKind::Run || u.kind == MeldKind::PartialRun {
                prop_assert!(u.tiles.iter().all(|t| t.is_numbered()));
            }
        }
    }

    #[test]
    fn prop_small_input_has_no_sets(tiles in prop::collection::vec(arb_tile(), 0..=2)) {
        let units = parse_into_units(&tiles, &DEFAULT_ORDER);
        prop_assert_eq!(units.count(MeldKind::Run), 0);
        prop_assert_eq!(units.count(MeldKind::Triplet), 0);
        prop_assert_eq!(units.count(MeldKind::Quad), 0);
    }
}
