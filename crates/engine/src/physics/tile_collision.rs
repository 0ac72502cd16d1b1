use tracing::trace;

use super::aabb::Aabb;
use super::body::Body;
use crate::level::{Side, TileGrid};

/// Keeps bodies out of solid tiles.
///
/// Holds a borrowed grid; the level owns it for its whole lifetime.
#[derive(Debug, Clone, Copy)]
pub struct TileCollisionResolver<'a> {
    grid: &'a TileGrid,
}

impl<'a> TileCollisionResolver<'a> {
    pub fn new(grid: &'a TileGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &'a TileGrid {
        self.grid
    }

    /// Pushes `body` out of every solid tile it overlaps.
    ///
    /// Tiles are visited in row-major order and the body's box is rebuilt
    /// after each correction, so a later tile sees the already corrected
    /// position. The result therefore depends on visiting order at corners.
    pub fn resolve(&self, body: &mut Body) {
        let mut body_box = body.bounding_box();
        for tile in self.grid.tiles_in_area(&body_box) {
            if !tile.is_solid {
                continue;
            }
            let tile_box = tile.bounding_box();
            if body_box.overlaps(&tile_box) {
                resolve_against(body, &body_box, &tile_box);
                trace!(
                    tile_x = tile.x,
                    tile_y = tile.y,
                    x = body.x,
                    y = body.y,
                    "tile_overlap_resolved"
                );
                body_box = body.bounding_box();
            }
        }
    }

    /// Sets `blocked.left` / `blocked.right` when a solid tile sits directly
    /// beside the body. Never clears a flag and never moves the body.
    pub fn check_horizontal_block(&self, body: &mut Body) {
        let body_box = body.bounding_box();
        if self.any_solid_adjacent(&body_box, Side::Right) {
            body.blocked.right = true;
        }
        if self.any_solid_adjacent(&body_box, Side::Left) {
            body.blocked.left = true;
        }
    }

    /// True when a solid tile lies one unit below the body's bottom edge.
    pub fn revalidate_grounded(&self, body: &Body) -> bool {
        let body_box = body.bounding_box();
        self.grid.tiles_below(&body_box).any(|tile| tile.is_solid)
    }

    fn any_solid_adjacent(&self, body_box: &Aabb, side: Side) -> bool {
        self.grid
            .tiles_adjacent(body_box, side)
            .any(|tile| tile.is_solid)
    }
}

/// Minimum-translation push along the shallower axis. Ties go vertical.
fn resolve_against(body: &mut Body, body_box: &Aabb, tile_box: &Aabb) {
    let (overlap_x, overlap_y) = body_box.overlap_depths(tile_box);

    if overlap_x < overlap_y {
        if body_box.left < tile_box.left {
            body.x -= overlap_x;
        } else {
            body.x += overlap_x;
        }
        body.v_x = 0.0;
    } else {
        if body_box.top < tile_box.top {
            body.y -= overlap_y;
            body.is_grounded = true;
        } else {
            body.y += overlap_y;
        }
        body.v_y = 0.0;
    }
}
