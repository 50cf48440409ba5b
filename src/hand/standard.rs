// 一般的な立直麻雀の役をPatternRuleとして定義
// Registryは空の状態で提供されるため, 使用する場合は呼び出し側で登録する
use super::parse::{parse_into_units, MeldKind};
use super::registry::Registry;
use super::requirement::{ContextEntry, Requirement, UnitKind};
use super::rule::{Combine, PatternRule, Preconditions};
use super::yaku::{Predicate, PredicateArgs};
use crate::model::*;

use UnitKind::*;

pub const RIICHI: &str = "riichi";
pub const DOUBLE_RIICHI: &str = "double_riichi";
pub const IPPATSU: &str = "ippatsu";
pub const MENZEN_TSUMO: &str = "menzen_tsumo";
pub const TANYAO: &str = "tanyao";
pub const PINFU: &str = "pinfu";
pub const IIPEIKOU: &str = "iipeikou";
pub const JIKAZE: &str = "jikaze";
pub const BAKAZE: &str = "bakaze";
pub const HAKU: &str = "haku";
pub const HATSU: &str = "hatsu";
pub const CHUN: &str = "chun";
pub const HAITEI: &str = "haitei";
pub const HOUTEI: &str = "houtei";
pub const RINSHAN: &str = "rinshan";
pub const CHANKAN: &str = "chankan";
pub const CHIITOITSU: &str = "chiitoitsu";
pub const TOITOI: &str = "toitoi";
pub const SANANKOU: &str = "sanankou";
pub const SANSHOKU_DOUKOU: &str = "sanshoku_doukou";
pub const SANSHOKU_DOUJUN: &str = "sanshoku_doujun";
pub const SANKANTSU: &str = "sankantsu";
pub const ITTSU: &str = "ittsu";
pub const CHANTA: &str = "chanta";
pub const SHOUSANGEN: &str = "shousangen";
pub const HONROUTOU: &str = "honroutou";
pub const RYANPEIKOU: &str = "ryanpeikou";
pub const JUNCHAN: &str = "junchan";
pub const HONITSU: &str = "honitsu";
pub const CHINITSU: &str = "chinitsu";
pub const KOKUSHI: &str = "kokushi";
pub const KOKUSHI_13: &str = "kokushi_13";
pub const SUUANKOU: &str = "suuankou";
pub const SUUANKOU_TANKI: &str = "suuankou_tanki";
pub const DAISANGEN: &str = "daisangen";
pub const SHOUSUUSHI: &str = "shousuushi";
pub const DAISUUSHI: &str = "daisuushi";
pub const TSUUIISOU: &str = "tsuuiisou";
pub const RYUUIISOU: &str = "ryuuiisou";
pub const CHINROUTOU: &str = "chinroutou";
pub const CHUUREN: &str = "chuuren";
pub const SUUKANTSU: &str = "suukantsu";
pub const TENHOU: &str = "tenhou";
pub const SUUFUU_RENDA: &str = "suufuu_renda";
pub const KYUUSHU: &str = "kyuushu";

// 刻子を優先する分解順
const TRIPLET_FIRST: [MeldKind; 3] = [MeldKind::Triplet, MeldKind::Pair, MeldKind::Run];

fn all_of(requirements: Vec<Requirement>) -> PatternRule {
    PatternRule::with_requirements(Combine::And, requirements)
}

fn any_of(requirements: Vec<Requirement>) -> PatternRule {
    PatternRule::with_requirements(Combine::Or, requirements)
}

fn closed(mut rule: PatternRule) -> PatternRule {
    rule.preconditions.closed_required = true;
    rule
}

fn situation(preconditions: Preconditions) -> PatternRule {
    PatternRule {
        preconditions,
        ..Default::default()
    }
}

// n個の刻子または槓子(+雀頭)の全ての組み合わせ
fn sets_of(n: usize, pair: bool, base: &Requirement) -> Vec<Requirement> {
    let mut res = vec![];
    for q in 0..=n {
        let mut min_units = vec![];
        if n > q {
            min_units.push((Triplet, n - q));
        }
        if q > 0 {
            min_units.push((Quad, q));
        }
        if pair {
            min_units.push((Pair, 1));
        }
        res.push(Requirement {
            min_units,
            ..base.clone()
        });
    }
    res
}

fn only_tiles(tiles: Vec<Tile>) -> Requirement {
    Requirement {
        allowed_tiles: tiles,
        ..Default::default()
    }
}

fn only_suits(suits: &[Suit]) -> Requirement {
    Requirement {
        allowed_suits: suits.to_vec(),
        unit_order: TRIPLET_FIRST.to_vec(),
        ..Default::default()
    }
}

// 牌種sの数字nから始まる順子があるか
fn has_run(args: &PredicateArgs<'_>, s: Suit, n: Rank) -> bool {
    args.groups.iter().any(|g| {
        g.kind == GroupKind::Run
            && g.first_suit() == Some(s)
            && g.tiles.iter().map(|t| t.rank()).min() == Some(n)
    })
}

// 一気通貫
// 同じ牌種の123, 456, 789の順子
fn is_ittsu(args: &PredicateArgs<'_>) -> bool {
    Suit::NUMBERED
        .iter()
        .any(|&s| [1, 4, 7].iter().all(|&n| has_run(args, s, n)))
}

// 三色同順
// 萬子, 筒子, 索子で同じ数字の順子
fn is_sanshoku_doujun(args: &PredicateArgs<'_>) -> bool {
    (1..=7).any(|n| Suit::NUMBERED.iter().all(|&s| has_run(args, s, n)))
}

// 三暗刻
// 副露していない刻子(槓子を含む)が3つ以上
// 未分解の牌は刻子を優先して分解し直す
fn is_sanankou(args: &PredicateArgs<'_>) -> bool {
    let called = args
        .groups
        .iter()
        .filter(|g| {
            !g.open && !g.regroupable && matches!(g.kind, GroupKind::Triplet | GroupKind::Quad)
        })
        .count();
    let free: Vec<Tile> = args
        .groups
        .iter()
        .filter(|g| !g.is_typed())
        .flat_map(|g| g.tiles.iter().copied())
        .collect();
    let units = parse_into_units(&free, &TRIPLET_FIRST);
    called + units.count(MeldKind::Triplet) >= 3
}

pub fn register_standard_rules(reg: &mut Registry) {
    // 1翻 ====================================================================

    reg.register(
        RIICHI,
        closed(PatternRule::with_predicate(Predicate::Riichi)),
    );
    reg.register(
        DOUBLE_RIICHI,
        closed(PatternRule::with_predicate(Predicate::DoubleRiichi)),
    );
    reg.register(IPPATSU, PatternRule::with_predicate(Predicate::Unsupported));
    reg.register(
        MENZEN_TSUMO,
        situation(Preconditions {
            closed_required: true,
            self_draw_required: true,
            ..Default::default()
        }),
    );
    reg.register(
        TANYAO,
        all_of(vec![Requirement {
            forbidden_suits: Suit::HONORS.to_vec(),
            forbidden_ranks: vec![1, 9],
            ..Default::default()
        }]),
    );
    reg.register(
        PINFU,
        closed(PatternRule::with_predicate(Predicate::TwoSidedRuns)),
    );
    reg.register(
        IIPEIKOU,
        closed(all_of(vec![Requirement {
            unit_repeat: 2,
            search_equivalent: true,
            ..Requirement::units(&[(Run, 1)])
        }])),
    );

    // 役牌
    let seat = Requirement {
        context: vec![ContextEntry::SeatWind],
        ..Default::default()
    };
    reg.register(JIKAZE, any_of(sets_of(1, false, &seat)));
    let round = Requirement {
        context: vec![ContextEntry::RoundWind],
        ..Default::default()
    };
    reg.register(BAKAZE, any_of(sets_of(1, false, &round)));
    for (id, n) in [(HAKU, DW), (HATSU, DG), (CHUN, DR)] {
        let dragon = only_tiles(vec![tile(Suit::Dragon, n)]);
        reg.register(id, any_of(sets_of(1, false, &dragon)));
    }

    reg.register(
        HAITEI,
        situation(Preconditions {
            last_turn_required: true,
            self_draw_required: true,
            ..Default::default()
        }),
    );
    reg.register(
        HOUTEI,
        PatternRule {
            preconditions: Preconditions {
                last_turn_required: true,
                ..Default::default()
            },
            ..PatternRule::with_predicate(Predicate::External(|args| !args.context.self_draw))
        },
    );
    reg.register(RINSHAN, PatternRule::with_predicate(Predicate::Unsupported));
    reg.register(CHANKAN, PatternRule::with_predicate(Predicate::Unsupported));

    // 2翻 ====================================================================

    reg.register(
        CHIITOITSU,
        closed(PatternRule::with_predicate(Predicate::SevenPairs)),
    );
    let triplet_first = Requirement {
        unit_order: TRIPLET_FIRST.to_vec(),
        ..Default::default()
    };
    reg.register(TOITOI, any_of(sets_of(4, true, &triplet_first)));
    reg.register(
        SANANKOU,
        PatternRule::with_predicate(Predicate::External(is_sanankou)),
    );
    reg.register(
        SANSHOKU_DOUKOU,
        all_of(vec![Requirement {
            allowed_suits: Suit::NUMBERED.to_vec(),
            unit_repeat: 3,
            search_equivalent: true,
            unit_order: vec![
                MeldKind::Triplet,
                MeldKind::Quad,
                MeldKind::Run,
                MeldKind::Pair,
                MeldKind::PartialRun,
            ],
            ..Requirement::units(&[(Triplet, 1)])
        }]),
    );
    reg.register(
        SANSHOKU_DOUJUN,
        PatternRule::with_predicate(Predicate::External(is_sanshoku_doujun)),
    );
    reg.register(SANKANTSU, all_of(vec![Requirement::units(&[(Quad, 3)])]));
    reg.register(ITTSU, PatternRule::with_predicate(Predicate::External(is_ittsu)));
    reg.register(CHANTA, PatternRule::with_predicate(Predicate::OutsideHand));
    reg.register(
        SHOUSANGEN,
        any_of(sets_of(2, true, &only_suits(&[Suit::Dragon]))),
    );
    reg.register(
        HONROUTOU,
        PatternRule::with_predicate(Predicate::TerminalsAndHonors),
    );

    // 3翻以上 ================================================================

    reg.register(
        RYANPEIKOU,
        closed(all_of(vec![Requirement {
            unit_repeat: 2,
            repeat: 2,
            search_equivalent: true,
            ..Requirement::units(&[(Run, 1)])
        }])),
    );
    reg.register(
        JUNCHAN,
        PatternRule::with_predicate(Predicate::PureOutsideHand),
    );
    reg.register(HONITSU, PatternRule::with_predicate(Predicate::HalfFlush));
    reg.register(CHINITSU, PatternRule::with_predicate(Predicate::FullFlush));

    // 役満 ==================================================================

    reg.register(
        KOKUSHI,
        closed(PatternRule::with_predicate(Predicate::ThirteenOrphans)),
    );
    reg.register(
        KOKUSHI_13,
        closed(PatternRule::with_predicate(
            Predicate::ThirteenOrphansThirteenWait,
        )),
    );
    let concealed = Requirement {
        open: Some(false),
        ..triplet_first
    };
    reg.register(
        SUUANKOU,
        closed(all_of(vec![Requirement {
            min_units: vec![(Triplet, 4)],
            ..concealed.clone()
        }])),
    );
    reg.register(
        SUUANKOU_TANKI,
        PatternRule {
            preconditions: Preconditions {
                closed_required: true,
                wait_shape: Some(WaitShape::Tanki),
                ..Default::default()
            },
            ..all_of(vec![Requirement {
                min_units: vec![(Triplet, 4), (Pair, 1)],
                ..concealed
            }])
        },
    );
    reg.register(
        DAISANGEN,
        any_of(sets_of(3, false, &only_suits(&[Suit::Dragon]))),
    );
    reg.register(
        SHOUSUUSHI,
        any_of(sets_of(3, true, &only_suits(&[Suit::Wind]))),
    );
    reg.register(
        DAISUUSHI,
        any_of(sets_of(4, false, &only_suits(&[Suit::Wind]))),
    );
    reg.register(
        TSUUIISOU,
        all_of(vec![Requirement {
            forbidden_suits: Suit::NUMBERED.to_vec(),
            ..Default::default()
        }]),
    );
    let green = vec![
        tile(Suit::Sou, 2),
        tile(Suit::Sou, 3),
        tile(Suit::Sou, 4),
        tile(Suit::Sou, 6),
        tile(Suit::Sou, 8),
        tile(Suit::Dragon, DG),
    ];
    reg.register(
        RYUUIISOU,
        all_of(vec![Requirement {
            forbidden_suits: vec![Suit::Man, Suit::Pin, Suit::Wind],
            min_units: vec![(Set, 4), (Pair, 1)],
            ..only_tiles(green)
        }]),
    );
    reg.register(
        CHINROUTOU,
        PatternRule::with_predicate(Predicate::TerminalsOnly),
    );
    reg.register(
        CHUUREN,
        closed(PatternRule::with_predicate(Predicate::NineGates)),
    );
    reg.register(SUUKANTSU, all_of(vec![Requirement::units(&[(Quad, 4)])]));
    reg.register(
        TENHOU,
        PatternRule::with_predicate(Predicate::BlessingOfHeaven),
    );

    // 流局 ==================================================================

    reg.register(
        SUUFUU_RENDA,
        PatternRule::with_predicate(Predicate::FourWindsDiscarded),
    );
    reg.register(KYUUSHU, PatternRule::with_predicate(Predicate::NineTerminals));
}

// 標準の役を登録したRegistryを生成
pub fn standard_registry() -> Registry {
    let mut reg = Registry::new();
    register_standard_rules(&mut reg);
    reg
}

#[test]
fn test_standard_rules_registered() {
    let reg = standard_registry();
    for id in [TANYAO, JIKAZE, IIPEIKOU, TOITOI, SANSHOKU_DOUKOU, KOKUSHI, KYUUSHU] {
        assert!(reg.has(id), "{}", id);
    }
    assert_eq!(reg.keys().next(), Some(RIICHI));
    // 役牌は刻子または槓子の2通り
    assert_eq!(reg.get(CHUN).unwrap().requirements.len(), 2);
    assert_eq!(reg.get(TOITOI).unwrap().requirements.len(), 5);
}
