use std::ops::Range;

use thiserror::Error;
use tracing::info;

use super::tile::{Tile, TileId, TileKeys};
use crate::physics::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TileGridError {
    #[error("tile map has no rows or no columns")]
    Empty,
    #[error("tile map row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("tile id {id} at row {row}, column {col} has no property entry")]
    UnknownTileId { id: TileId, row: usize, col: usize },
    #[error("tile size must be positive and finite, got {tile_size}")]
    InvalidTileSize { tile_size: f32 },
}

/// Half-open row/column window into the grid. Windows reaching past the
/// grid are clipped when iterated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl CellRange {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }
}

/// Static row-major tile grid. Built once per level and read-only afterwards.
///
/// All queries take world coordinates and silently drop cells outside the
/// grid, so bodies near the level edge just see fewer tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    tile_size: f32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn from_id_map(
        tile_map: &[Vec<TileId>],
        tile_size: f32,
        keys: &TileKeys,
    ) -> Result<Self, TileGridError> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(TileGridError::InvalidTileSize { tile_size });
        }
        let rows = tile_map.len();
        let cols = tile_map.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(TileGridError::Empty);
        }

        let mut tiles = Vec::with_capacity(rows * cols);
        for (row, ids) in tile_map.iter().enumerate() {
            if ids.len() != cols {
                return Err(TileGridError::RaggedRow {
                    row,
                    expected: cols,
                    actual: ids.len(),
                });
            }
            for (col, &id) in ids.iter().enumerate() {
                let key = keys
                    .get(id)
                    .ok_or(TileGridError::UnknownTileId { id, row, col })?;
                tiles.push(Tile {
                    id,
                    x: col as f32 * tile_size,
                    y: row as f32 * tile_size,
                    size: tile_size,
                    is_solid: key.solid,
                    color: key.color.clone(),
                });
            }
        }

        let solid_count = tiles.iter().filter(|tile| tile.is_solid).count();
        info!(rows, cols, tile_size, solid_count, "tile_grid_built");
        Ok(Self {
            rows,
            cols,
            tile_size,
            tiles,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World-space extent of the whole grid.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(
            0.0,
            0.0,
            self.cols as f32 * self.tile_size,
            self.rows as f32 * self.tile_size,
        )
    }

    /// Every tile in row-major order, for renderers.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.tiles.get(row * self.cols + col)
    }

    pub fn tile_at(&self, x: f32, y: f32) -> Option<&Tile> {
        let row = self.single_index(y, self.rows);
        let col = self.single_index(x, self.cols);
        if row.is_empty() || col.is_empty() {
            return None;
        }
        self.tile(row.start, col.start)
    }

    /// Cells covered by `area`, rounding the far edges up so partially
    /// covered cells are included.
    pub fn area_range(&self, area: &Aabb) -> CellRange {
        CellRange {
            rows: self.span(area.top, area.bottom, self.rows),
            cols: self.span(area.left, area.right, self.cols),
        }
    }

    /// The single row one unit below `area`, across its columns.
    pub fn below_range(&self, area: &Aabb) -> CellRange {
        CellRange {
            rows: self.single_index(area.bottom + 1.0, self.rows),
            cols: self.span(area.left, area.right, self.cols),
        }
    }

    /// The single column touching `area` on `side`, across its rows.
    pub fn adjacent_range(&self, area: &Aabb, side: Side) -> CellRange {
        let edge = match side {
            Side::Right => area.right,
            Side::Left => area.left - 1.0,
        };
        CellRange {
            rows: self.span(area.top, area.bottom, self.rows),
            cols: self.single_index(edge, self.cols),
        }
    }

    pub fn tiles_in(&self, range: CellRange) -> impl Iterator<Item = &Tile> + '_ {
        let rows = clip(range.rows, self.rows);
        let cols = clip(range.cols, self.cols);
        rows.flat_map(move |row| {
            let start = row * self.cols;
            cols.clone().map(move |col| &self.tiles[start + col])
        })
    }

    pub fn tiles_in_area(&self, area: &Aabb) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles_in(self.area_range(area))
    }

    pub fn tiles_below(&self, area: &Aabb) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles_in(self.below_range(area))
    }

    pub fn tiles_adjacent(&self, area: &Aabb, side: Side) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles_in(self.adjacent_range(area, side))
    }

    fn span(&self, start: f32, end: f32, limit: usize) -> Range<usize> {
        let first = clamp_cell((start / self.tile_size).floor(), limit);
        let last = clamp_cell((end / self.tile_size).ceil(), limit);
        first..last.max(first)
    }

    fn single_index(&self, coordinate: f32, limit: usize) -> Range<usize> {
        let index = (coordinate / self.tile_size).floor();
        if index.is_nan() || index < 0.0 || index >= limit as f32 {
            return 0..0;
        }
        let index = index as usize;
        index..index + 1
    }
}

fn clip(range: Range<usize>, limit: usize) -> Range<usize> {
    let end = range.end.min(limit);
    range.start.min(end)..end
}

fn clamp_cell(value: f32, limit: usize) -> usize {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= limit as f32 {
        limit
    } else {
        value as usize
    }
}
