//! A CPU-based first-person raycasting engine.
//!
//! This crate renders a grid-based maze in the classic one-ray-per-column
//! style, with textured walls, floors and ceilings, sliding doors, billboard
//! sprites and a minimap overlay. SDL2 is used only for window management
//! and display; all rendering is done on the CPU.
//!
//! # Quick Start
//!
//! ```ignore
//! use mazeray::prelude::*;
//!
//! let mut window = Window::new("My Maze", 1280, 720)?;
//! let mut engine = Engine::new(1280, 720, 21, TextureSet::builtin(), RenderOptions::default())?;
//! ```

// Public API - exposed to library consumers
pub mod buffer;
pub mod camera;
pub mod colors;
pub mod engine;
pub mod map;
pub mod math;
pub mod minimap;
pub mod raycaster;
pub mod sprite;
pub mod texture;
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use engine::{Engine, RenderOptions};
pub use map::{Door, DoorSide, DoorState, GridMap, MapError};
pub use texture::{LoadError, TextureSet};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use mazeray::prelude::*;
/// ```
pub mod prelude {
    // Engine
    pub use crate::engine::{Engine, RenderOptions};

    // World
    pub use crate::camera::Camera;
    pub use crate::map::{Door, DoorSide, DoorState, GridMap};
    pub use crate::sprite::{Sprite, SpriteRenderer};

    // Rendering
    pub use crate::buffer::PixelBuffer;
    pub use crate::minimap::MiniMap;
    pub use crate::raycaster::{RayHit, Raycaster, Side};
    pub use crate::texture::{Texture, TextureSet};

    // Math
    pub use crate::math::vec2::Vec2;

    // Window & Input
    pub use crate::window::{FrameLimiter, InputState, Window, WindowEvent};
}
