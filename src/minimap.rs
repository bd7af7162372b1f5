//! Top-down overview drawn into the frame's upper-right corner.
//!
//! Shows the wall layout, the sliding doors at their current travel, the
//! player, sprite markers, and the fan of rays cast this frame. Ray
//! endpoints are accumulated by the raycaster during the wall pass and
//! drained here, so the overlay always reflects exactly what was rendered.

use crate::buffer::PixelBuffer;
use crate::colors;
use crate::map::{DoorSide, GridMap};
use crate::math::vec2::Vec2;
use crate::sprite::Sprite;

pub struct MiniMap {
    block_size: i32,
    player_size: i32,
    padding: i32,
    rays: Vec<Vec2>,
}

impl MiniMap {
    /// Sizes the overlay relative to the screen so it occupies roughly the
    /// same fraction of the frame at any resolution.
    pub fn new(screen_width: u32) -> Self {
        let block_size = (screen_width as i32 / 110).max(1);
        let padding = block_size / 2;
        let player_size = (padding * 4 / 5).max(1);
        Self {
            block_size,
            player_size,
            padding,
            rays: Vec::new(),
        }
    }

    /// Records one cast ray's world-space endpoint for this frame.
    pub fn add_ray(&mut self, position: Vec2, ray_direction: Vec2, distance: f32) {
        self.rays.push(position + ray_direction * distance);
    }

    pub fn ray_count(&self) -> usize {
        self.rays.len()
    }

    /// Drops accumulated rays without drawing, for frames where the overlay
    /// is disabled.
    pub fn clear_rays(&mut self) {
        self.rays.clear();
    }

    /// Draws the overlay and drains this frame's rays.
    pub fn render(
        &mut self,
        buffer: &mut PixelBuffer,
        map: &GridMap,
        position: Vec2,
        sprites: &[Sprite],
    ) {
        let block = self.block_size;
        let origin_x = buffer.width() as i32 - map.width() as i32 * block - self.padding;
        let origin_y = self.padding;

        let (br, bg, bb) = colors::MINIMAP_BACKGROUND;
        buffer.fill_rect(
            origin_x,
            origin_y,
            map.width() as i32 * block,
            map.height() as i32 * block,
            br,
            bg,
            bb,
        );

        let to_pixels = |world: Vec2| {
            Vec2::new(
                origin_x as f32 + world.x * block as f32,
                origin_y as f32 + world.y * block as f32,
            )
        };

        let player = to_pixels(position);
        let (rr, rg, rb) = colors::MINIMAP_RAY;
        for &endpoint in &self.rays {
            buffer.draw_line(player, to_pixels(endpoint), rr, rg, rb);
        }

        let (wr, wg, wb) = colors::MINIMAP_WALL;
        for y in 0..map.height() as i32 {
            for x in 0..map.width() as i32 {
                if map.cell(x, y) > 0 {
                    buffer.fill_rect(
                        origin_x + x * block,
                        origin_y + y * block,
                        block - 1,
                        block - 1,
                        wr,
                        wg,
                        wb,
                    );
                }
            }
        }

        let (dr, dg, db) = colors::MINIMAP_DOOR;
        for door in map.doors() {
            // The drawn slab shrinks as the panel retracts.
            let travel = ((1.0 - door.offset) * block as f32) as i32;
            let x = origin_x + door.position.0 * block;
            let y = origin_y + door.position.1 * block;
            match door.side {
                DoorSide::Horizontal => {
                    let thickness = (block as f32 / 2.5) as i32;
                    buffer.fill_rect(
                        x + (block as f32 / 1.5 / 2.0) as i32,
                        y,
                        thickness.max(1),
                        travel,
                        dr,
                        dg,
                        db,
                    );
                }
                DoorSide::Vertical => {
                    let thickness = (block as f32 / 2.5) as i32;
                    buffer.fill_rect(
                        x,
                        y + (block as f32 / 1.5 / 2.0) as i32,
                        travel,
                        thickness.max(1),
                        dr,
                        dg,
                        db,
                    );
                }
            }
        }

        let (sr, sg, sb) = colors::MINIMAP_SPRITE;
        for sprite in sprites {
            let center = to_pixels(sprite.position);
            buffer.draw_circle_outline(
                center.x as i32,
                center.y as i32,
                (self.player_size / 2).max(1),
                sr,
                sg,
                sb,
            );
        }

        let (pr, pg, pb) = colors::MINIMAP_PLAYER;
        buffer.draw_filled_circle(
            player.x as i32,
            player.y as i32,
            self.player_size,
            pr,
            pg,
            pb,
        );

        self.rays.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rays_drain_after_render() {
        let mut minimap = MiniMap::new(640);
        let mut buffer = PixelBuffer::new(640, 360);
        let map = GridMap::from_cells(3, 3, vec![1, 1, 1, 1, 0, 1, 1, 1, 1]).unwrap();

        minimap.add_ray(Vec2::new(1.5, 1.5), Vec2::RIGHT, 0.5);
        assert_eq!(minimap.ray_count(), 1);

        minimap.render(&mut buffer, &map, Vec2::new(1.5, 1.5), &[]);
        assert_eq!(minimap.ray_count(), 0);
    }

    #[test]
    fn walls_are_drawn_in_the_overlay_region() {
        let mut minimap = MiniMap::new(640);
        let mut buffer = PixelBuffer::new(640, 360);
        let map = GridMap::from_cells(3, 3, vec![1, 1, 1, 1, 0, 1, 1, 1, 1]).unwrap();

        minimap.render(&mut buffer, &map, Vec2::new(1.5, 1.5), &[]);

        // Top-left wall block of the overlay.
        let block = (640 / 110i32).max(1);
        let origin_x = 640 - 3 * block - block / 2;
        let origin_y = block / 2;
        assert_eq!(
            buffer.get_pixel(origin_x, origin_y),
            Some(colors::MINIMAP_WALL)
        );
    }
}
