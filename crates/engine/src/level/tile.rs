use std::collections::HashMap;

use serde::Deserialize;

use crate::physics::Aabb;

pub type TileId = u16;

pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// Property entry for one tile id in a level's key table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TileKey {
    pub id: TileId,
    pub solid: bool,
    pub color: String,
}

/// Id to property lookup used while building a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileKeys {
    keys_by_id: HashMap<TileId, TileKey>,
}

impl TileKeys {
    pub fn from_keys(keys: impl IntoIterator<Item = TileKey>) -> Self {
        // Later entries win when an id is listed twice.
        let keys_by_id = keys.into_iter().map(|key| (key.id, key)).collect();
        Self { keys_by_id }
    }

    pub fn get(&self, id: TileId) -> Option<&TileKey> {
        self.keys_by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.keys_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys_by_id.is_empty()
    }
}

impl Default for TileKeys {
    /// `0` is open air, `1` is a solid block.
    fn default() -> Self {
        Self::from_keys([
            TileKey {
                id: 0,
                solid: false,
                color: "WHITE".to_string(),
            },
            TileKey {
                id: 1,
                solid: true,
                color: "BLACK".to_string(),
            },
        ])
    }
}

/// One immutable grid cell. `x`/`y` is the world-space top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: TileId,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub is_solid: bool,
    pub color: String,
}

impl Tile {
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_rect(self.x, self.y, self.size, self.size)
    }
}
