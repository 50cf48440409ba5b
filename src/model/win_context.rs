use super::*;

// [WaitShape]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitShape {
    TwoSided, // 両面待ち
    Closed,   // 嵌張待ち
    Edge,     // 辺張待ち
    Shanpon,  // 双碰待ち
    Tanki,    // 単騎待ち
    DealIn,   // 放銃
    Any,      // 任意 (条件指定でのみ使用)
}

// [Context]
// 牌の組み合わせからは導出できない和了時の状況
// 卓の状態を管理する側で生成して渡す
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub closed: bool,                  // 門前
    pub open: bool,                    // 副露あり
    pub anyone_open: bool,             // 誰かが副露している
    pub riichi: bool,                  // 立直
    pub self_draw: bool,               // 自摸和了
    pub first_turn: bool,              // 第一巡
    pub last_turn: bool,               // 最終巡
    pub wait_shape: Option<WaitShape>, // 待ちの形
    pub seat_wind: Option<Tile>,       // 自風
    pub round_wind: Option<Tile>,      // 場風
    pub previous_hand: Vec<Tile>,      // 和了前の手牌 (国士無双十三面待ち用)
    pub discards: Vec<Tile>,           // 捨て牌の履歴 (全員分, 捨てた順)
}

impl Context {
    // 門前の状況を生成
    pub fn closed() -> Self {
        Self {
            closed: true,
            ..Default::default()
        }
    }
}
