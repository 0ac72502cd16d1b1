mod grid;
mod tile;

pub use grid::{CellRange, Side, TileGrid, TileGridError};
pub use tile::{Tile, TileId, TileKey, TileKeys, DEFAULT_TILE_SIZE};
