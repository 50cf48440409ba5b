// 役判定のデータモデル
mod define;
mod group;
mod tile;
mod win_context;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use define::*;
pub use group::*;
pub(crate) use tile::tile;
pub use tile::{Suit, Tile, TileMatch};
pub use win_context::*;
