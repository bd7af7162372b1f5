//! The per-column DDA raycaster and the wall/floor/ceiling rasterizer.
//!
//! One ray per screen column steps from grid line to grid line until it
//! hits a wall cell or a door panel, producing the perpendicular wall
//! distance (projected onto the camera's forward axis, which is what keeps
//! vertical lines straight instead of fisheye-bent), the wall texture
//! u-coordinate, and a z-buffer entry for sprite occlusion. Screen rows
//! above and below the wall slice are reprojected into world space and
//! textured as ceiling and floor.

use crate::buffer::PixelBuffer;
use crate::camera::Camera;
use crate::colors::{self, Rgb};
use crate::engine::RenderOptions;
use crate::map::{DoorState, GridMap};
use crate::math::vec2::Vec2;
use crate::minimap::MiniMap;
use crate::texture::{Texture, TextureSet};

/// Defensive bound on DDA iterations. Legal maps are enclosed by walls so
/// rays terminate long before this; the cutoff only matters if that
/// invariant is ever breached.
pub const MAX_DDA_STEPS: u32 = 256;

/// Stand-in for IEEE infinity when a ray component is exactly zero: the ray
/// never crosses that axis, so its per-cell crossing distance is "never".
const UNREACHABLE: f32 = 1e30;

// Shading model: walls dim with distance, floors/ceilings slightly less,
// fog blends toward near-black.
const WALL_DIM_BASE: f32 = 0.8;
const FLOOR_DIM_BASE: f32 = 0.9;
const DIM_PER_DISTANCE: f32 = 0.2;
const FOG_PER_DISTANCE: f32 = 0.08;
const FOG_FLOOR: f32 = 0.1;

/// Which grid axis the DDA stepped across for the hit: `X` means a vertical
/// wall face, `Y` a horizontal one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    X,
    Y,
}

/// Per-axis distance the ray travels between grid-line crossings, with the
/// zero component special-cased to a large finite sentinel.
#[inline]
pub fn delta_distance(component: f32) -> f32 {
    if component == 0.0 {
        UNREACHABLE
    } else {
        (1.0 / component).abs()
    }
}

/// Dims a texel by distance, then blends it toward the fog color.
#[inline]
pub(crate) fn shade(texel: Rgb, dim: f32, fog: f32) -> Rgb {
    let apply = |c: u8| {
        let c = c as f32 / dim;
        (c * (1.0 - fog) + fog * FOG_FLOOR).clamp(0.0, 255.0) as u8
    };
    (apply(texel.0), apply(texel.1), apply(texel.2))
}

/// Result of casting a single ray.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// Perpendicular wall distance (not Euclidean ray length).
    pub distance: f32,
    pub side: Side,
    /// Hit cell coordinates, pushed half a cell along the stepped axis when
    /// a door was hit (the panel sits mid-cell).
    pub map: Vec2,
    pub ray_direction: Vec2,
    /// Index into the map's door list when a door blocked this ray.
    pub door: Option<usize>,
}

pub struct Raycaster {
    width: u32,
    height: u32,
    // Seeded with a far sentinel so sprite occlusion is defined even for
    // columns that have never been cast.
    z_buffer: Vec<f32>,
}

impl Raycaster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            z_buffer: vec![f32::MAX; width as usize],
        }
    }

    /// Per-column nearest wall distances from the most recent frame.
    pub fn z_buffer(&self) -> &[f32] {
        &self.z_buffer
    }

    /// Casts one ray through the grid. `camera_x` is the column's position
    /// on the camera plane in [-1, 1]. Mutates the map: stepping through a
    /// door cell triggers and animates that door.
    pub fn cast_ray(
        &self,
        map: &mut GridMap,
        camera: &Camera,
        camera_x: f32,
        delta_time: f32,
    ) -> RayHit {
        let position = camera.position;
        let ray_direction = camera.direction + camera.plane * camera_x;

        let mut map_x = position.x as i32;
        let mut map_y = position.y as i32;
        let delta = Vec2::new(
            delta_distance(ray_direction.x),
            delta_distance(ray_direction.y),
        );

        let mut side_distance = Vec2::ZERO;
        let step_x: i32 = if ray_direction.x < 0.0 {
            side_distance.x = (position.x - map_x as f32) * delta.x;
            -1
        } else {
            side_distance.x = (map_x as f32 + 1.0 - position.x) * delta.x;
            1
        };
        let step_y: i32 = if ray_direction.y < 0.0 {
            side_distance.y = (position.y - map_y as f32) * delta.y;
            -1
        } else {
            side_distance.y = (map_y as f32 + 1.0 - position.y) * delta.y;
            1
        };

        let mut side = Side::X;
        let mut door = None;
        let mut hit = false;
        let mut steps = 0;

        while !hit {
            // Advance whichever axis crosses its next grid line first.
            if side_distance.x < side_distance.y {
                side_distance.x += delta.x;
                map_x += step_x;
                side = Side::X;
            } else {
                side_distance.y += delta.y;
                map_y += step_y;
                side = Side::Y;
            }

            if map.cell(map_x, map_y) > 0 {
                hit = true;
            }

            // The probe also keeps door triggers and opening animation
            // running, so it is called even on wall-hit iterations.
            if let Some(index) = map.probe_door_collision(
                position,
                side,
                side_distance,
                delta,
                ray_direction,
                (map_x, map_y),
                delta_time,
            ) {
                hit = true;
                door = Some(index);
            }

            steps += 1;
            if steps >= MAX_DDA_STEPS {
                break;
            }
        }

        let mut hit_map = Vec2::new(map_x as f32, map_y as f32);
        let distance = match side {
            Side::X => {
                if door.is_some() {
                    hit_map.x += step_x as f32 / 2.0;
                    side_distance.x += delta.x / 2.0;
                }
                side_distance.x - delta.x
            }
            Side::Y => {
                if door.is_some() {
                    hit_map.y += step_y as f32 / 2.0;
                    side_distance.y += delta.y / 2.0;
                }
                side_distance.y - delta.y
            }
        };

        RayHit {
            distance,
            side,
            map: hit_map,
            ray_direction,
            door,
        }
    }

    /// Casts and rasterizes every screen column, filling the z-buffer and
    /// feeding each ray endpoint to the minimap.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        buffer: &mut PixelBuffer,
        map: &mut GridMap,
        camera: &Camera,
        textures: &TextureSet,
        minimap: &mut MiniMap,
        options: &RenderOptions,
        delta_time: f32,
    ) {
        for x in 0..self.width {
            let camera_x = 2.0 * x as f32 / self.width as f32 - 1.0;
            let hit = self.cast_ray(map, camera, camera_x, delta_time);

            // The z-buffer entry must land before any sprite pass reads it.
            self.z_buffer[x as usize] = hit.distance;
            minimap.add_ray(camera.position, hit.ray_direction, hit.distance);

            self.draw_column(buffer, x as i32, &hit, camera, map, textures, options);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_column(
        &self,
        buffer: &mut PixelBuffer,
        x: i32,
        hit: &RayHit,
        camera: &Camera,
        map: &GridMap,
        textures: &TextureSet,
        options: &RenderOptions,
    ) {
        let height = self.height as f32;
        let pitch = camera.pitch;
        let distance = hit.distance;

        let line_height = (height / distance) as i32;
        let mut draw_start = height / 2.0 - line_height as f32 / 2.0 + pitch;
        if draw_start < 0.0 {
            draw_start = 0.0;
        }
        let mut draw_end = height / 2.0 + line_height as f32 / 2.0 + pitch;
        if draw_end >= height {
            draw_end = height - 1.0;
        }

        // Fractional hit position along the non-stepped axis.
        let mut wall_x = match hit.side {
            Side::X => camera.position.y + distance * hit.ray_direction.y,
            Side::Y => camera.position.x + distance * hit.ray_direction.x,
        };
        wall_x -= wall_x.floor();

        let (texture, flat, slide): (&Texture, Rgb, f32) = match hit.door {
            Some(index) => {
                let door = &map.doors()[index];
                // Offset u by the door's travel so the texture slides with
                // the panel.
                let slide = if door.state != DoorState::Closed {
                    door.offset
                } else {
                    0.0
                };
                (&textures.door, colors::FLAT_DOOR, slide)
            }
            None => (&textures.wall, colors::FLAT_WALL, 0.0),
        };

        let texture_width = texture.width() as i32;
        let mut tex_x = ((wall_x + slide) * texture_width as f32) as i32;
        // Mirror so texture orientation is consistent from both approach
        // directions.
        if hit.side == Side::X && hit.ray_direction.x > 0.0 {
            tex_x = texture_width - tex_x - 1;
        }
        if hit.side == Side::Y && hit.ray_direction.y < 0.0 {
            tex_x = texture_width - tex_x - 1;
        }

        let dim = WALL_DIM_BASE + DIM_PER_DISTANCE * distance;
        let fog = if options.fog {
            (FOG_PER_DISTANCE * distance).min(1.0)
        } else {
            0.0
        };

        let tex_step = texture.height() as f32 / line_height as f32;
        let mut tex_pos = (draw_start - pitch - height / 2.0 + line_height as f32 / 2.0) * tex_step;
        for y in (draw_start as i32 + 1)..=(draw_end as i32) {
            let tex_y = tex_pos as i32;
            tex_pos += tex_step;

            let texel = if options.textures {
                texture.texel(tex_x, tex_y)
            } else {
                flat
            };
            let (r, g, b) = shade(texel, dim, fog);
            buffer.set_pixel(x, y, r, g, b);
        }

        self.draw_floor_and_ceiling(
            buffer, x, hit, camera, textures, options, wall_x, draw_start, draw_end,
        );
    }

    /// Reprojects the screen rows above and below the wall slice back into
    /// world space and samples the ceiling/floor textures there.
    #[allow(clippy::too_many_arguments)]
    fn draw_floor_and_ceiling(
        &self,
        buffer: &mut PixelBuffer,
        x: i32,
        hit: &RayHit,
        camera: &Camera,
        textures: &TextureSet,
        options: &RenderOptions,
        wall_x: f32,
        draw_start: f32,
        draw_end: f32,
    ) {
        let height = self.height as f32;
        let pitch = camera.pitch;

        // World position of the wall base, from which each row interpolates
        // back toward the camera.
        let wall_base = match (hit.side, hit.ray_direction.x > 0.0, hit.ray_direction.y > 0.0) {
            (Side::X, true, _) => Vec2::new(hit.map.x, hit.map.y + wall_x),
            (Side::X, false, _) => Vec2::new(hit.map.x + 1.0, hit.map.y + wall_x),
            (Side::Y, _, true) => Vec2::new(hit.map.x + wall_x, hit.map.y),
            (Side::Y, _, false) => Vec2::new(hit.map.x + wall_x, hit.map.y + 1.0),
        };

        let sample_row = |buffer: &mut PixelBuffer,
                              y: i32,
                              current_distance: f32,
                              texture: &Texture,
                              flat: Rgb| {
            if !current_distance.is_finite() {
                return;
            }
            let weight = current_distance / hit.distance;
            let world = wall_base * weight + camera.position * (1.0 - weight);

            let texel = if options.textures {
                texture.texel(
                    (world.x * texture.width() as f32) as i32,
                    (world.y * texture.height() as f32) as i32,
                )
            } else {
                flat
            };

            let dim = FLOOR_DIM_BASE + DIM_PER_DISTANCE * current_distance;
            let fog = if options.fog {
                (FOG_PER_DISTANCE * current_distance).min(1.0)
            } else {
                0.0
            };
            let (r, g, b) = shade(texel, dim, fog);
            buffer.set_pixel(x, y, r, g, b);
        };

        for y in 0..(draw_start as i32 + 1) {
            let current = height / (height - 2.0 * (y as f32 - pitch));
            sample_row(buffer, y, current, &textures.ceiling, colors::FLAT_CEILING);
        }

        let floor_top = if draw_end < 0.0 { height } else { draw_end };
        for y in (floor_top as i32 + 1)..self.height as i32 {
            let current = height / (2.0 * (y as f32 - pitch) - height);
            sample_row(buffer, y, current, &textures.floor, colors::FLAT_FLOOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn room(size: usize) -> GridMap {
        let mut cells = vec![0u8; size * size];
        for i in 0..size {
            cells[i] = 1;
            cells[(size - 1) * size + i] = 1;
            cells[i * size] = 1;
            cells[i * size + size - 1] = 1;
        }
        GridMap::from_cells(size, size, cells).unwrap()
    }

    #[test]
    fn zero_ray_component_yields_finite_sentinel() {
        assert!(delta_distance(0.0) >= 1e29);
        assert!(delta_distance(0.0).is_finite());
        assert_relative_eq!(delta_distance(-0.5), 2.0);
        assert_relative_eq!(delta_distance(4.0), 0.25);
    }

    #[test]
    fn center_ray_in_enclosed_room_hits_at_half_cell() {
        let mut map = room(3);
        let caster = Raycaster::new(64, 36);
        let camera = Camera::new(Vec2::new(1.5, 1.5));

        let hit = caster.cast_ray(&mut map, &camera, 0.0, 0.016);
        assert_relative_eq!(hit.distance, 0.5, epsilon = 1e-5);
        assert_eq!(hit.side, Side::X);
        assert!(hit.door.is_none());
    }

    #[test]
    fn perpendicular_distance_has_no_fisheye() {
        let mut map = room(9);
        let caster = Raycaster::new(64, 36);
        // Facing +x from x=1.5: the facing wall plane is at x=8.
        let camera = Camera::new(Vec2::new(1.5, 4.5));

        for camera_x in [-0.2, 0.0, 0.2] {
            let hit = caster.cast_ray(&mut map, &camera, camera_x, 0.016);
            assert_relative_eq!(hit.distance, 6.5, epsilon = 1e-4);
        }
    }

    #[test]
    fn axis_aligned_ray_never_crosses_perpendicular_axis() {
        let mut map = room(9);
        let caster = Raycaster::new(64, 36);
        let camera = Camera::new(Vec2::new(4.5, 4.5));

        let hit = caster.cast_ray(&mut map, &camera, 0.0, 0.016);
        // Direction (1, 0): all steps are x-steps.
        assert_eq!(hit.side, Side::X);
        assert_relative_eq!(hit.map.y, 4.0);
    }

    #[test]
    fn grid_boundary_reads_as_solid_for_unenclosed_maps() {
        // No walls at all: the ray must stop at the grid edge rather than
        // index out of bounds or run off forever.
        let mut map = GridMap::from_cells(5, 5, vec![0u8; 25]).unwrap();
        let caster = Raycaster::new(64, 36);
        let camera = Camera::new(Vec2::new(2.5, 2.5));

        let hit = caster.cast_ray(&mut map, &camera, 0.0, 0.016);
        assert_relative_eq!(hit.distance, 2.5, epsilon = 1e-5);
    }

    #[test]
    fn door_hit_lands_half_a_cell_into_the_cell() {
        use crate::map::{Door, DoorSide};

        let mut map = room(11);
        map.add_door(Door::new((5, 5), DoorSide::Horizontal));
        map.update_doors(0.016);

        let caster = Raycaster::new(64, 36);
        let camera = Camera::new(Vec2::new(3.5, 5.5));

        let hit = caster.cast_ray(&mut map, &camera, 0.0, 0.016);
        assert_eq!(hit.door, Some(0));
        // Panel sits mid-cell: 5.5 - 3.5 = 2 cells away.
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-5);
        assert_relative_eq!(hit.map.x, 5.5, epsilon = 1e-5);
    }

    #[test]
    fn z_buffer_starts_at_far_sentinel() {
        let caster = Raycaster::new(32, 18);
        assert!(caster.z_buffer().iter().all(|&d| d == f32::MAX));
    }

    #[test]
    fn render_fills_z_buffer_and_minimap() {
        let mut map = room(9);
        let mut caster = Raycaster::new(32, 18);
        let camera = Camera::new(Vec2::new(1.5, 4.5));
        let textures = TextureSet::builtin();
        let mut buffer = PixelBuffer::new(32, 18);
        let mut minimap = MiniMap::new(32);
        let options = RenderOptions::default();

        caster.render(
            &mut buffer,
            &mut map,
            &camera,
            &textures,
            &mut minimap,
            &options,
            0.016,
        );

        assert_eq!(minimap.ray_count(), 32);
        assert!(caster.z_buffer().iter().all(|&d| d < f32::MAX));
        assert_relative_eq!(caster.z_buffer()[16], 6.5, epsilon = 1e-3);
    }
}
