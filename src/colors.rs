//! Named colors shared by the render passes and the minimap overlay.

pub type Rgb = (u8, u8, u8);

pub const MINIMAP_BACKGROUND: Rgb = (66, 66, 66);
pub const MINIMAP_PLAYER: Rgb = (255, 92, 92);
pub const MINIMAP_RAY: Rgb = (255, 92, 92);
pub const MINIMAP_DOOR: Rgb = (200, 200, 200);
pub const MINIMAP_WALL: Rgb = (255, 255, 255);
pub const MINIMAP_SPRITE: Rgb = (120, 200, 255);

pub const CROSSHAIR: Rgb = (255, 255, 255);

// Flat shading colors used when texturing is switched off.
pub const FLAT_WALL: Rgb = (170, 170, 170);
pub const FLAT_DOOR: Rgb = (180, 140, 80);
pub const FLAT_FLOOR: Rgb = (72, 171, 62);
pub const FLAT_CEILING: Rgb = (0, 191, 255);
