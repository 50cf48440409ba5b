// 型エイリアス
pub type Rank = u8; // 牌の数字部分 (数牌: 1~9, 風牌: 1~4, 三元牌: 1~3)
pub type Slot = usize; // 手牌アリーナ内の牌の位置
pub type GroupId = usize; // 牌グループの識別子
pub type PatternId = String; // 役の識別子

// Number
pub const SUIT: usize = 5; // 牌の種別の数 (萬子,筒子,索子,風牌,三元牌)
pub const RANK: usize = 10; // 数字部分のindex数 (0は未使用)
pub const HAND_MAX: usize = 14; // 手牌の最大枚数

// Rank: Wind
pub const WE: Rank = 1; // Wind:    East  (東)
pub const WS: Rank = 2; // Wind:    South (南)
pub const WW: Rank = 3; // Wind:    West  (西)
pub const WN: Rank = 4; // Wind:    North (北)

// Rank: Dragon
pub const DR: Rank = 1; // Doragon: Red   (中)
pub const DG: Rank = 2; // Doragon: Green (發)
pub const DW: Rank = 3; // Doragon: White (白)
