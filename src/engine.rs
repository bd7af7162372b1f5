//! Ties the simulation and the render passes together.
//!
//! The engine owns the frame pipeline: walls, floor and ceiling first
//! (which also fills the z-buffer and collects minimap rays), then sprites
//! composited against that z-buffer, then the minimap overlay and the
//! crosshair on top.

use log::info;
use rand::thread_rng;

use crate::buffer::PixelBuffer;
use crate::camera::Camera;
use crate::colors;
use crate::map::{GridMap, MapError};
use crate::math::vec2::Vec2;
use crate::minimap::MiniMap;
use crate::raycaster::Raycaster;
use crate::sprite::SpriteRenderer;
use crate::texture::TextureSet;
use crate::window::InputState;

/// Render feature toggles. Everything is on by default.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub textures: bool,
    pub fog: bool,
    pub minimap: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            textures: true,
            fog: true,
            minimap: true,
        }
    }
}

pub struct Engine {
    buffer: PixelBuffer,
    map: GridMap,
    camera: Camera,
    raycaster: Raycaster,
    sprites: SpriteRenderer,
    minimap: MiniMap,
    textures: TextureSet,
    pub options: RenderOptions,
}

impl Engine {
    /// Generates a fresh maze and populates it. `map_size` must be odd so
    /// the maze generator can carve a proper corridor lattice.
    pub fn new(
        width: u32,
        height: u32,
        map_size: usize,
        textures: TextureSet,
        options: RenderOptions,
    ) -> Result<Self, MapError> {
        let mut rng = thread_rng();
        let map = GridMap::with_rng(map_size, map_size, &mut rng)?;
        let sprites = SpriteRenderer::scatter(&map, textures.sprite_count(), &mut rng);

        info!(
            "generated {}x{} maze with {} doors and {} sprites",
            map.width(),
            map.height(),
            map.doors().len(),
            sprites.sprites().len()
        );

        Ok(Self {
            buffer: PixelBuffer::new(width, height),
            map,
            camera: Camera::new(Vec2::new(1.5, 1.5)),
            raycaster: Raycaster::new(width, height),
            sprites,
            minimap: MiniMap::new(width),
            textures,
            options,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Advances one simulation step: movement, mouse look, door timers.
    pub fn update(&mut self, input: &mut InputState, delta_time: f32) {
        self.camera.update_movement(&self.map, input, delta_time);

        let (mouse_dx, mouse_dy) = input.take_mouse_delta();
        if mouse_dx != 0.0 || mouse_dy != 0.0 {
            self.camera.rotate(
                mouse_dx,
                mouse_dy,
                delta_time,
                self.buffer.width(),
                self.buffer.height(),
            );
        }
        self.camera.clip_pitch(self.buffer.height());

        self.map.update_doors(delta_time);
    }

    /// Renders one frame into the internal pixel buffer.
    pub fn render(&mut self, delta_time: f32) {
        self.buffer.clear(0, 0, 0);

        self.raycaster.render(
            &mut self.buffer,
            &mut self.map,
            &self.camera,
            &self.textures,
            &mut self.minimap,
            &self.options,
            delta_time,
        );

        self.sprites.render(
            &mut self.buffer,
            &self.camera,
            &self.textures,
            self.raycaster.z_buffer(),
            &self.options,
        );

        if self.options.minimap {
            self.minimap.render(
                &mut self.buffer,
                &self.map,
                self.camera.position,
                self.sprites.sprites(),
            );
        } else {
            self.minimap.clear_rays();
        }

        self.draw_crosshair();
    }

    fn draw_crosshair(&mut self) {
        let center_x = self.buffer.width() as i32 / 2;
        let center_y = self.buffer.height() as i32 / 2;
        let (r, g, b) = colors::CROSSHAIR;
        self.buffer.fill_rect(center_x, center_y - 9, 2, 20, r, g, b);
        self.buffer.fill_rect(center_x - 9, center_y, 20, 2, r, g, b);
    }

    pub fn frame_buffer(&self) -> &PixelBuffer {
        &self.buffer
    }
}
