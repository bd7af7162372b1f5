//! Texture storage and sampling.
//!
//! Textures are flat RGBA pixel arrays with fixed dimensions (64×64 by
//! default). Power-of-two textures wrap coordinates with a bitwise AND
//! against `dimension - 1`; anything else falls back to euclidean modulo so
//! both give identical results for in-range and out-of-range coordinates.

use std::fmt;
use std::path::{Path, PathBuf};

/// Default texture edge length in pixels.
pub const TEXTURE_SIZE: u32 = 64;

/// Errors raised while assembling the texture set at startup.
///
/// These are fatal: the render loop never starts without its textures.
#[derive(Debug)]
pub enum LoadError {
    Image(image::ImageError),
    Io(std::io::Error),
    /// No `sprite*.png` files were found in the asset directory.
    NoSprites(PathBuf),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Image(err) => write!(f, "failed to decode texture: {err}"),
            LoadError::Io(err) => write!(f, "failed to read asset directory: {err}"),
            LoadError::NoSprites(dir) => {
                write!(f, "no sprite*.png textures in {}", dir.display())
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<image::ImageError> for LoadError {
    fn from(err: image::ImageError) -> Self {
        LoadError::Image(err)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err)
    }
}

/// A 2D RGBA pixel array sampled by the wall, floor/ceiling and sprite passes.
pub struct Texture {
    data: Vec<u8>,
    width: u32,
    height: u32,
    // Wrap masks when both dimensions are powers of two.
    mask: Option<(i32, i32)>,
}

impl Texture {
    /// Loads a texture from an image file (PNG, JPG, etc.).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_pixels(width, height, img.into_raw()))
    }

    /// Wraps an existing RGBA byte array. Panics if the length does not
    /// match `width * height * 4`; textures are fixed at construction.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), (width * height * 4) as usize);
        let pow2 = |v: u32| v > 0 && v & (v - 1) == 0;
        let mask = if pow2(width) && pow2(height) {
            Some((width as i32 - 1, height as i32 - 1))
        } else {
            None
        };
        Self {
            data,
            width,
            height,
            mask,
        }
    }

    /// A single-color texture, mostly useful in tests.
    pub fn solid(width: u32, height: u32, red: u8, green: u8, blue: u8) -> Self {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[red, green, blue, 255]);
        }
        Self::from_pixels(width, height, data)
    }

    /// Samples the texel at (x, y) with wrap-around on both axes.
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> (u8, u8, u8) {
        let (tx, ty) = match self.mask {
            Some((mx, my)) => ((x & mx) as u32, (y & my) as u32),
            None => (
                x.rem_euclid(self.width as i32) as u32,
                y.rem_euclid(self.height as i32) as u32,
            ),
        };
        let index = ((ty * self.width + tx) * 4) as usize;
        (self.data[index], self.data[index + 1], self.data[index + 2])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// The named texture handles every frame samples from, loaded once before
/// the render loop starts.
pub struct TextureSet {
    pub wall: Texture,
    pub floor: Texture,
    pub ceiling: Texture,
    pub door: Texture,
    pub sprites: Vec<Texture>,
}

impl TextureSet {
    /// Loads `wall.png`, `floor.png`, `ceiling.png`, `door.png` and every
    /// `sprite*.png` from a directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, LoadError> {
        let dir = dir.as_ref();

        let mut sprite_paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("sprite") && n.ends_with(".png"))
            })
            .collect();
        sprite_paths.sort();
        if sprite_paths.is_empty() {
            return Err(LoadError::NoSprites(dir.to_path_buf()));
        }

        let sprites = sprite_paths
            .iter()
            .map(Texture::from_file)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            wall: Texture::from_file(dir.join("wall.png"))?,
            floor: Texture::from_file(dir.join("floor.png"))?,
            ceiling: Texture::from_file(dir.join("ceiling.png"))?,
            door: Texture::from_file(dir.join("door.png"))?,
            sprites,
        })
    }

    /// Procedurally generated 64×64 textures so the renderer runs without
    /// any assets on disk.
    pub fn builtin() -> Self {
        Self {
            wall: generate(|x, y| {
                // Offset every other brick row by half a brick.
                let row = y / 16;
                let shifted = if row % 2 == 0 { x } else { (x + 16) & 63 };
                if y % 16 < 2 || shifted % 32 < 2 {
                    (90, 80, 76)
                } else {
                    (158, 74, 58)
                }
            }),
            floor: generate(|x, y| {
                if (x / 16 + y / 16) % 2 == 0 {
                    (96, 96, 104)
                } else {
                    (70, 70, 78)
                }
            }),
            ceiling: generate(|x, y| {
                if x % 16 < 1 || y % 16 < 1 {
                    (40, 40, 48)
                } else {
                    (58, 58, 70)
                }
            }),
            door: generate(|x, y| {
                if x % 16 < 2 {
                    (70, 52, 30)
                } else if y % 32 < 3 {
                    (96, 72, 40)
                } else {
                    (140, 104, 60)
                }
            }),
            sprites: vec![
                // A pillar and an orb on pure black, which the sprite pass
                // treats as transparent.
                generate(|x, y| {
                    let dx = x as i32 - 32;
                    if dx.abs() < 10 {
                        let shade = 150 - (dx.abs() as u8) * 6 - (y % 8) as u8;
                        (shade, shade, shade + 20)
                    } else {
                        (0, 0, 0)
                    }
                }),
                generate(|x, y| {
                    let dx = x as i32 - 32;
                    let dy = y as i32 - 32;
                    if dx * dx + dy * dy < 20 * 20 {
                        let shade = 220 - ((dx * dx + dy * dy) / 4) as u8;
                        (80, shade, 90)
                    } else {
                        (0, 0, 0)
                    }
                }),
            ],
        }
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }
}

fn generate(pattern: impl Fn(u32, u32) -> (u8, u8, u8)) -> Texture {
    let mut data = Vec::with_capacity((TEXTURE_SIZE * TEXTURE_SIZE * 4) as usize);
    for y in 0..TEXTURE_SIZE {
        for x in 0..TEXTURE_SIZE {
            let (r, g, b) = pattern(x, y);
            data.extend_from_slice(&[r, g, b, 255]);
        }
    }
    Texture::from_pixels(TEXTURE_SIZE, TEXTURE_SIZE, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Texture {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        Texture::from_pixels(width, height, data)
    }

    #[test]
    fn power_of_two_sampling_wraps_with_mask() {
        let texture = gradient(64, 64);
        assert_eq!(texture.texel(70, 70), texture.texel(6, 6));
        assert_eq!(texture.texel(70, 70), (6, 6, 0));
    }

    #[test]
    fn mask_and_modulo_agree() {
        let texture = gradient(64, 64);
        for &(x, y) in &[(70i32, 70i32), (-1, -1), (64, 0), (130, 200)] {
            let modulo = texture.texel(x.rem_euclid(64), y.rem_euclid(64));
            assert_eq!(texture.texel(x, y), modulo);
        }
    }

    #[test]
    fn non_power_of_two_falls_back_to_modulo() {
        let texture = gradient(48, 48);
        assert_eq!(texture.texel(50, 50), (2, 2, 0));
        assert_eq!(texture.texel(-1, 0), (47, 0, 0));
    }

    #[test]
    fn builtin_set_has_expected_shape() {
        let set = TextureSet::builtin();
        assert_eq!(set.wall.width(), TEXTURE_SIZE);
        assert_eq!(set.door.height(), TEXTURE_SIZE);
        assert!(set.sprite_count() >= 2);
    }

    #[test]
    fn builtin_sprites_carry_black_background() {
        let set = TextureSet::builtin();
        // Corner texels are the chroma-key color.
        for sprite in &set.sprites {
            assert_eq!(sprite.texel(0, 0), (0, 0, 0));
        }
    }
}
