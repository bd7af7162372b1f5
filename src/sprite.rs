//! Billboard sprite rendering with painter's-algorithm compositing.
//!
//! Sprites are world points that always face the camera. Each frame they
//! are sorted far to near and drawn as screen-space vertical stripes,
//! tested per column against the wall z-buffer so walls occlude them.
//! Pure black texels are treated as transparent.

use crate::buffer::PixelBuffer;
use crate::camera::Camera;
use crate::engine::RenderOptions;
use crate::map::GridMap;
use crate::math::vec2::Vec2;
use crate::raycaster::shade;
use crate::texture::TextureSet;

use rand::Rng;

// Sprite shading runs on squared distance, which falls off faster than the
// linear wall model and keeps sprites from glowing in the murk.
const SPRITE_DIM_BASE: f32 = 0.8;
const SPRITE_DIM_FACTOR: f32 = 0.085;
const SPRITE_FOG_FACTOR: f32 = 0.015;

/// One empty cell in eight receives a sprite.
const SCATTER_ODDS: u32 = 8;

#[derive(Clone, Copy, Debug)]
pub struct Sprite {
    pub position: Vec2,
    /// Index into the texture set's sprite textures.
    pub texture: usize,
    /// Squared distance to the camera, refreshed each frame for sorting.
    distance: f32,
}

pub struct SpriteRenderer {
    sprites: Vec<Sprite>,
}

impl SpriteRenderer {
    pub fn with_sprites(sprites: Vec<Sprite>) -> Self {
        Self { sprites }
    }

    /// Scatters sprites across the map's empty cells, skipping the spawn
    /// cell and door cells. Each placed sprite sits at a jittered offset
    /// inside its cell with a randomly chosen texture.
    pub fn scatter<R: Rng>(map: &GridMap, texture_count: usize, rng: &mut R) -> Self {
        let mut sprites = Vec::new();
        if texture_count == 0 {
            return Self { sprites };
        }

        for y in 0..map.height() as i32 {
            for x in 0..map.width() as i32 {
                if map.cell(x, y) != 0 || (x, y) == (1, 1) {
                    continue;
                }
                if map.doors().iter().any(|d| d.position == (x, y)) {
                    continue;
                }
                if rng.gen_range(0..SCATTER_ODDS) != 0 {
                    continue;
                }

                let jitter_x = 0.3 + rng.gen::<f32>() / 4.0;
                let jitter_y = 0.3 + rng.gen::<f32>() / 4.0;
                sprites.push(Sprite {
                    position: Vec2::new(x as f32 + jitter_x, y as f32 + jitter_y),
                    texture: rng.gen_range(0..texture_count),
                    distance: 0.0,
                });
            }
        }

        Self { sprites }
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Draws all sprites back to front. `z_buffer` holds the perpendicular
    /// wall distance per screen column from the wall pass.
    pub fn render(
        &mut self,
        buffer: &mut PixelBuffer,
        camera: &Camera,
        textures: &TextureSet,
        z_buffer: &[f32],
        options: &RenderOptions,
    ) {
        for sprite in &mut self.sprites {
            sprite.distance = (sprite.position - camera.position).length_squared();
        }
        // Far to near, so later (closer) sprites paint over earlier ones.
        self.sprites
            .sort_by(|a, b| b.distance.partial_cmp(&a.distance).unwrap());

        let width = buffer.width() as i32;
        let height = buffer.height() as i32;
        let half_width = width as f32 / 2.0;
        let half_height = height / 2;
        let pitch = camera.pitch as i32;

        // Inverse of the [plane, direction] column matrix, for transforming
        // world offsets into camera space.
        let inv_det =
            1.0 / (camera.plane.x * camera.direction.y - camera.direction.x * camera.plane.y);

        for sprite in &self.sprites {
            let texture = match textures.sprites.get(sprite.texture) {
                Some(texture) => texture,
                None => continue,
            };

            let relative = sprite.position - camera.position;
            let transform = Vec2::new(
                inv_det * (camera.direction.y * relative.x - camera.direction.x * relative.y),
                inv_det * (-camera.plane.y * relative.x + camera.plane.x * relative.y),
            );
            // Behind the camera plane.
            if transform.y <= 0.0 {
                continue;
            }

            let screen_x = (half_width * (1.0 + transform.x / transform.y)) as i32;
            let sprite_height = ((height as f32 / transform.y).abs()) as i32;
            let sprite_width = sprite_height;
            if sprite_height <= 0 {
                continue;
            }

            let draw_start_y = (-sprite_height / 2 + half_height + pitch).max(0);
            let draw_end_y = (sprite_height / 2 + half_height + pitch).min(height - 1);
            let left_edge = -sprite_width / 2 + screen_x;
            let draw_start_x = left_edge.max(0);
            let draw_end_x = (sprite_width / 2 + screen_x).min(width - 1);

            let texture_width = texture.width() as i32;
            let texture_height = texture.height() as i32;

            let dim = SPRITE_DIM_BASE + SPRITE_DIM_FACTOR * sprite.distance;
            let fog = if options.fog {
                (SPRITE_FOG_FACTOR * sprite.distance).min(1.0)
            } else {
                0.0
            };

            for stripe in draw_start_x..=draw_end_x {
                // Fixed-point texel stepping, 8 fractional bits.
                let tex_x = (256 * (stripe - left_edge) * texture_width / sprite_width) / 256;

                if transform.y >= z_buffer[stripe as usize] {
                    continue;
                }

                for y in draw_start_y..=draw_end_y {
                    let d = (y - pitch) * 256 - height * 128 + sprite_height * 128;
                    let tex_y = (d * texture_height / sprite_height) / 256;

                    let texel = texture.texel(tex_x, tex_y);
                    // Pure black is the transparency key.
                    if texel == (0, 0, 0) {
                        continue;
                    }
                    let (r, g, b) = shade(texel, dim, fog);
                    buffer.set_pixel(stripe, y, r, g, b);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::Texture;

    fn camera_facing_x() -> Camera {
        Camera::new(Vec2::new(2.0, 2.0))
    }

    fn set_with_sprite(texture: Texture) -> TextureSet {
        let mut set = TextureSet::builtin();
        set.sprites = vec![texture];
        set
    }

    #[test]
    fn walls_occlude_sprites() {
        let mut buffer = PixelBuffer::new(32, 18);
        let camera = camera_facing_x();
        let textures = set_with_sprite(Texture::solid(4, 4, 255, 0, 0));
        let mut renderer = SpriteRenderer::with_sprites(vec![Sprite {
            position: Vec2::new(5.0, 2.0),
            texture: 0,
            distance: 0.0,
        }]);

        // Every wall column is closer than the sprite (depth 3).
        let z_buffer = vec![1.0f32; 32];
        renderer.render(&mut buffer, &camera, &textures, &z_buffer, &RenderOptions::default());

        assert_eq!(buffer.get_pixel(16, 9), Some((0, 0, 0)));
    }

    #[test]
    fn closer_sprite_paints_over_farther_one() {
        let mut buffer = PixelBuffer::new(32, 18);
        let camera = camera_facing_x();
        let mut textures = TextureSet::builtin();
        textures.sprites = vec![
            Texture::solid(4, 4, 255, 0, 0),
            Texture::solid(4, 4, 0, 0, 255),
        ];
        let mut renderer = SpriteRenderer::with_sprites(vec![
            Sprite {
                position: Vec2::new(4.0, 2.0),
                texture: 0,
                distance: 0.0,
            },
            Sprite {
                position: Vec2::new(8.0, 2.0),
                texture: 1,
                distance: 0.0,
            },
        ]);

        let z_buffer = vec![f32::MAX; 32];
        let options = RenderOptions {
            fog: false,
            ..RenderOptions::default()
        };
        renderer.render(&mut buffer, &camera, &textures, &z_buffer, &options);

        // The near red sprite wins the shared screen region.
        let (r, g, b) = buffer.get_pixel(16, 9).unwrap();
        assert!(r > 0 && g == 0 && b == 0);
    }

    #[test]
    fn pure_black_texels_are_transparent() {
        let mut buffer = PixelBuffer::new(32, 18);
        buffer.clear(10, 20, 30);
        let camera = camera_facing_x();
        let textures = set_with_sprite(Texture::solid(4, 4, 0, 0, 0));
        let mut renderer = SpriteRenderer::with_sprites(vec![Sprite {
            position: Vec2::new(4.0, 2.0),
            texture: 0,
            distance: 0.0,
        }]);

        let z_buffer = vec![f32::MAX; 32];
        renderer.render(&mut buffer, &camera, &textures, &z_buffer, &RenderOptions::default());

        assert_eq!(buffer.get_pixel(16, 9), Some((10, 20, 30)));
    }

    #[test]
    fn scatter_avoids_walls_and_spawn() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(7);
        let map = GridMap::with_rng(15, 15, &mut rng).unwrap();
        let renderer = SpriteRenderer::scatter(&map, 2, &mut rng);

        for sprite in renderer.sprites() {
            let cell_x = sprite.position.x as i32;
            let cell_y = sprite.position.y as i32;
            assert_eq!(map.cell(cell_x, cell_y), 0);
            assert_ne!((cell_x, cell_y), (1, 1));
            assert!(sprite.texture < 2);
        }
    }
}
