//! Resource boundary: images, font metrics and sounds
//!
//! Everything is loaded once before the loop starts and never changes
//! afterwards. A missing or corrupt file is fatal: [`Assets::load_dir`]
//! returns an [`AssetError`] and the caller must not start the game.
//!
//! The browser build has no asset files; it uses [`Assets::procedural`],
//! which draws the same sprite set in code.

use std::f32::consts::TAU;
use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec2;
use thiserror::Error;

use crate::consts::{EXPLOSION_FRAMES, SCORE_FONT_SIZE};

/// Errors raised while loading the asset set
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid asset {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("explosion frame {index} of {expected} missing in {dir}")]
    MissingFrames {
        dir: PathBuf,
        index: usize,
        expected: usize,
    },
}

/// Stable identifier of a source image (index into the asset set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

/// Immutable RGBA8 image
///
/// Cloning shares the pixel buffer. `angle` records how far the pixels are
/// rotated (counter-clockwise degrees) relative to the source image `id`,
/// whose dimensions are kept in `source_size`.
#[derive(Debug, Clone)]
pub struct Image {
    id: ImageId,
    width: u32,
    height: u32,
    source_size: (u32, u32),
    angle: f32,
    pixels: Arc<[u8]>,
}

impl Image {
    pub fn from_rgba(id: ImageId, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            id,
            width,
            height,
            source_size: (width, height),
            angle: 0.0,
            pixels: pixels.into(),
        }
    }

    /// Rasterize `width`×`height` pixels from a shader-style closure
    fn paint(id: ImageId, width: u32, height: u32, f: impl Fn(f32, f32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x as f32 + 0.5, y as f32 + 0.5));
            }
        }
        Self::from_rgba(id, width, height, pixels)
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Size of the unrotated source image
    pub fn source_size(&self) -> Vec2 {
        Vec2::new(self.source_size.0 as f32, self.source_size.1 as f32)
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA at (x, y); transparent outside the image
    pub fn pixel(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return [0; 4];
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// New image rotated counter-clockwise by `degrees`
    ///
    /// The output grows to the rotated bounding box and is sampled
    /// nearest-neighbour from this image's pixels. Callers keep the source
    /// image and rotate it by the total angle each time, so quality never
    /// degrades across frames.
    pub fn rotated(&self, degrees: f32) -> Image {
        let (s, c) = degrees.to_radians().sin_cos();
        let (w, h) = (self.width as f32, self.height as f32);
        // Epsilon keeps float noise at right angles from adding a pixel
        let out_w = ((w * c.abs() + h * s.abs()) - 1e-3).ceil().max(1.0) as u32;
        let out_h = ((w * s.abs() + h * c.abs()) - 1e-3).ceil().max(1.0) as u32;

        let half_out = Vec2::new(out_w as f32, out_h as f32) / 2.0;
        let half_src = Vec2::new(w, h) / 2.0;

        let mut pixels = Vec::with_capacity((out_w * out_h * 4) as usize);
        for y in 0..out_h {
            for x in 0..out_w {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - half_out;
                let src = Vec2::new(d.x * c - d.y * s, d.x * s + d.y * c) + half_src;
                let px = self.pixel(src.x.floor() as i64, src.y.floor() as i64);
                pixels.extend_from_slice(&px);
            }
        }

        Image {
            id: self.id,
            width: out_w,
            height: out_h,
            source_size: self.source_size,
            angle: self.angle + degrees,
            pixels: pixels.into(),
        }
    }
}

/// Font handle: only metrics matter to the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    /// Pixel size (cap height of a digit)
    pub size: f32,
    /// Horizontal advance per glyph
    pub advance: f32,
}

impl Font {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            advance: size * 0.6,
        }
    }

    /// Font with a measured glyph advance
    pub fn with_advance(size: f32, advance: f32) -> Self {
        Self { size, advance }
    }

    /// Size of the rendered text box
    pub fn measure(&self, text: &str) -> Vec2 {
        Vec2::new(self.advance * text.chars().count() as f32, self.size)
    }
}

/// A validated sound handle
///
/// `data` holds the encoded file when loaded from disk; procedural sounds are
/// synthesized by the audio backend and carry no data.
#[derive(Debug, Clone)]
pub struct Sound {
    pub name: &'static str,
    pub data: Option<Arc<[u8]>>,
}

impl Sound {
    fn synthesized(name: &'static str) -> Self {
        Self { name, data: None }
    }
}

/// Every sound the game plays
#[derive(Debug, Clone)]
pub struct SoundBank {
    pub laser: Sound,
    pub explosion: Sound,
    pub damage: Sound,
    pub music: Sound,
}

/// The complete, validated resource set
#[derive(Debug, Clone)]
pub struct Assets {
    pub player: Image,
    pub star: Image,
    pub meteor: Image,
    pub laser: Image,
    pub explosion: Vec<Image>,
    pub font: Font,
    pub sounds: SoundBank,
}

impl Assets {
    /// All source images, in id order
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        [&self.player, &self.star, &self.meteor, &self.laser]
            .into_iter()
            .chain(self.explosion.iter())
    }

    /// Load and validate the asset directory
    ///
    /// Layout:
    /// - `images/{player,star,meteor,laser}.png`
    /// - `images/explosion/0.png` through `20.png`, every frame required
    /// - `fonts/score.ttf`
    /// - `audio/{laser.wav,explosion.wav,damage.ogg,music.wav}`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_dir(root: impl AsRef<std::path::Path>) -> Result<Self, AssetError> {
        let root = root.as_ref();
        let images = root.join("images");
        log::info!("Loading assets from {}", root.display());

        let mut next_id = 0u32;
        let mut load = |path: PathBuf| -> Result<Image, AssetError> {
            let image = disk::load_image(&path, ImageId(next_id))?;
            next_id += 1;
            Ok(image)
        };

        let player = load(images.join("player.png"))?;
        let star = load(images.join("star.png"))?;
        let meteor = load(images.join("meteor.png"))?;
        let laser = load(images.join("laser.png"))?;

        let frames_dir = images.join("explosion");
        let mut explosion = Vec::with_capacity(EXPLOSION_FRAMES);
        for index in 0..EXPLOSION_FRAMES {
            let path = frames_dir.join(format!("{index}.png"));
            if !path.is_file() {
                return Err(AssetError::MissingFrames {
                    dir: frames_dir,
                    index,
                    expected: EXPLOSION_FRAMES,
                });
            }
            explosion.push(load(path)?);
        }

        let font = disk::load_font(&root.join("fonts").join("score.ttf"), SCORE_FONT_SIZE)?;

        let audio = root.join("audio");
        let sounds = SoundBank {
            laser: disk::load_sound("laser", &audio.join("laser.wav"))?,
            explosion: disk::load_sound("explosion", &audio.join("explosion.wav"))?,
            damage: disk::load_sound("damage", &audio.join("damage.ogg"))?,
            music: disk::load_sound("music", &audio.join("music.wav"))?,
        };

        log::info!(
            "Loaded {} images ({} explosion frames) and 4 sounds",
            4 + explosion.len(),
            explosion.len()
        );

        Ok(Self {
            player,
            star,
            meteor,
            laser,
            explosion,
            font,
            sounds,
        })
    }

    /// Generate the full asset set in code
    pub fn procedural() -> Self {
        let explosion = (0..EXPLOSION_FRAMES)
            .map(|i| procedural::explosion_frame(ImageId(4 + i as u32), i))
            .collect();

        Self {
            player: procedural::player(ImageId(0)),
            star: procedural::star(ImageId(1)),
            meteor: procedural::meteor(ImageId(2)),
            laser: procedural::laser(ImageId(3)),
            explosion,
            font: Font::new(SCORE_FONT_SIZE),
            sounds: SoundBank {
                laser: Sound::synthesized("laser"),
                explosion: Sound::synthesized("explosion"),
                damage: Sound::synthesized("damage"),
                music: Sound::synthesized("music"),
            },
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod disk {
    use std::path::Path;

    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, Source};

    use super::{AssetError, Font, Image, ImageId, Sound};

    fn read(path: &Path) -> Result<Vec<u8>, AssetError> {
        std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn invalid(path: &Path, reason: impl Into<String>) -> AssetError {
        AssetError::Invalid {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn load_image(path: &Path, id: ImageId) -> Result<Image, AssetError> {
        let bytes = read(path)?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(invalid(path, "image has no pixels"));
        }
        log::debug!("Loaded {} ({}x{})", path.display(), width, height);
        Ok(Image::from_rgba(id, width, height, rgba.into_raw()))
    }

    /// Parse the score font; the layout advance is the widest digit
    pub fn load_font(path: &Path, size: f32) -> Result<Font, AssetError> {
        let bytes = read(path)?;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| invalid(path, format!("fontdue error: {e}")))?;

        let mut advance = 0.0f32;
        for digit in '0'..='9' {
            if font.lookup_glyph_index(digit) == 0 {
                return Err(invalid(path, format!("font has no glyph for '{digit}'")));
            }
            advance = advance.max(font.metrics(digit, size).advance_width);
        }
        log::debug!("Loaded {} (digit advance {advance:.1}px)", path.display());
        Ok(Font::with_advance(size, advance))
    }

    /// Read a sound file and make sure it decodes to audio samples
    pub fn load_sound(name: &'static str, path: &Path) -> Result<Sound, AssetError> {
        let data: Arc<[u8]> = read(path)?.into();
        let mut decoder = Decoder::new(Cursor::new(data.clone()))
            .map_err(|e| invalid(path, format!("undecodable audio: {e}")))?;
        let duration = decoder.total_duration();
        if decoder.next().is_none() {
            return Err(invalid(path, "no audio samples"));
        }
        log::debug!("Loaded {} ({duration:?})", path.display());
        Ok(Sound {
            name,
            data: Some(data),
        })
    }
}

/// Sprite set drawn in code
mod procedural {
    use super::*;

    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    pub fn player(id: ImageId) -> Image {
        let (w, h) = (96.0, 72.0);
        Image::paint(id, w as u32, h as u32, |x, y| {
            let dx = (x - w / 2.0).abs();
            // Arrowhead hull widening toward the bottom, with a notch for the engines
            let half_width = (y / h) * (w / 2.0);
            let notch = y > h * 0.8 && dx < w * 0.12;
            if dx > half_width || notch {
                return CLEAR;
            }
            let cockpit = (x - w / 2.0).powi(2) / 64.0 + (y - h * 0.45).powi(2) / 144.0 <= 1.0;
            if cockpit {
                [120, 220, 255, 255]
            } else {
                [200, 205, 215, 255]
            }
        })
    }

    pub fn star(id: ImageId) -> Image {
        let size = 24.0;
        Image::paint(id, size as u32, size as u32, |x, y| {
            let dx = (x - size / 2.0).abs();
            let dy = (y - size / 2.0).abs();
            // Four-point astroid
            if dx.sqrt() + dy.sqrt() <= (size / 2.0).sqrt() {
                [255, 245, 200, 255]
            } else {
                CLEAR
            }
        })
    }

    pub fn laser(id: ImageId) -> Image {
        let (w, h) = (8.0, 48.0);
        Image::paint(id, w as u32, h as u32, |x, y| {
            let r = w / 2.0;
            let cy = y.clamp(r, h - r);
            if (x - r).powi(2) + (y - cy).powi(2) <= r * r {
                [255, 90, 90, 255]
            } else {
                CLEAR
            }
        })
    }

    pub fn meteor(id: ImageId) -> Image {
        let (w, h) = (100.0, 84.0);
        Image::paint(id, w as u32, h as u32, |x, y| {
            let d = Vec2::new((x - w / 2.0) / (w / 2.0), (y - h / 2.0) / (h / 2.0));
            let theta = d.y.atan2(d.x);
            let edge = 0.86 + 0.08 * (3.0 * theta).sin() + 0.05 * (5.0 * theta + 1.3).cos();
            if d.length() > edge {
                return CLEAR;
            }
            let craters = [(-0.3, -0.2, 0.18), (0.35, 0.25, 0.14), (0.05, 0.45, 0.1)];
            let in_crater = craters
                .iter()
                .any(|&(cx, cy, r)| (d - Vec2::new(cx, cy)).length() < r);
            if in_crater {
                [96, 80, 72, 255]
            } else {
                [140, 118, 104, 255]
            }
        })
    }

    pub fn explosion_frame(id: ImageId, index: usize) -> Image {
        let size = 96.0;
        let t = index as f32 / (EXPLOSION_FRAMES.max(2) - 1) as f32;
        let outer = 8.0 + 38.0 * t;
        let inner = outer * t * 0.85;
        let alpha = (255.0 * (1.0 - t * 0.8)) as u8;
        Image::paint(id, size as u32, size as u32, |x, y| {
            let d = Vec2::new(x - size / 2.0, y - size / 2.0);
            let wobble = 1.0 + 0.1 * (7.0 * d.y.atan2(d.x) + t * TAU).sin();
            let r = d.length() / wobble;
            if r > outer || r < inner {
                return CLEAR;
            }
            let heat = 1.0 - (r - inner) / (outer - inner).max(1.0);
            [255, (120.0 + 120.0 * heat) as u8, (40.0 * heat) as u8, alpha]
        })
    }
}
