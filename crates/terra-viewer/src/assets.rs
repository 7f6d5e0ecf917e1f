//! Background texture decoding.
//!
//! Every image is decoded on the rayon pool and handed back over a channel.
//! The frame loop drains the channel without blocking, so the globe renders
//! against placeholders until (or unless) the real images arrive.

use crossbeam_channel::{Receiver, Sender};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The images the globe samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Round star sprite.
    StarSprite,
    /// Blended in under the cursor.
    Highlight,
    SurfaceColor,
    /// Grayscale height; red channel drives the displacement.
    Elevation,
    /// Grayscale, bright over water; red channel becomes transparency.
    OceanMask,
}

impl AssetKind {
    pub const ALL: [AssetKind; 5] = [
        AssetKind::StarSprite,
        AssetKind::Highlight,
        AssetKind::SurfaceColor,
        AssetKind::Elevation,
        AssetKind::OceanMask,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            AssetKind::StarSprite => "circle.png",
            AssetKind::Highlight => "04_rainbow1k.jpg",
            AssetKind::SurfaceColor => "00_earthmap1k.jpg",
            AssetKind::Elevation => "01_earthbump1k.jpg",
            AssetKind::OceanMask => "02_earthspec1k.jpg",
        }
    }

    /// Color images are stored sRGB-encoded; data maps are read raw.
    pub fn is_color(self) -> bool {
        matches!(
            self,
            AssetKind::StarSprite | AssetKind::Highlight | AssetKind::SurfaceColor
        )
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{} is empty", path.display())]
    Empty { path: PathBuf },

    #[error("{} is {width}x{height}, larger than the device limit of {limit}", path.display())]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        limit: u32,
    },
}

pub struct LoadedAsset {
    pub kind: AssetKind,
    pub path: PathBuf,
    pub result: Result<RgbaImage, AssetError>,
}

/// Decodes one image file to 8-bit RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, AssetError> {
    let img = image::open(path)
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    if img.width() == 0 || img.height() == 0 {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(img)
}

/// Rejects images the device cannot hold as a single 2D texture.
pub fn check_texture_size(path: &Path, image: &RgbaImage, limit: u32) -> Result<(), AssetError> {
    let (width, height) = image.dimensions();
    if width > limit || height > limit {
        return Err(AssetError::TooLarge {
            path: path.to_path_buf(),
            width,
            height,
            limit,
        });
    }
    Ok(())
}

/// Tracks the in-flight decodes started by [`AssetLoader::spawn`].
pub struct AssetLoader {
    rx: Receiver<LoadedAsset>,
    pending: usize,
}

impl AssetLoader {
    /// Starts decoding every [`AssetKind`] found under `dir`.
    pub fn spawn(dir: &Path) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        for kind in AssetKind::ALL {
            spawn_decode(kind, dir.join(kind.file_name()), tx.clone());
        }
        log::info!("Loading {} textures from '{}'", AssetKind::ALL.len(), dir.display());

        Self {
            rx,
            pending: AssetKind::ALL.len(),
        }
    }

    /// Number of images not yet received.
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Everything that finished since the last call. Never blocks.
    pub fn poll(&mut self) -> Vec<LoadedAsset> {
        if self.pending == 0 {
            return Vec::new();
        }
        let done: Vec<LoadedAsset> = self.rx.try_iter().collect();
        self.pending = self.pending.saturating_sub(done.len());
        done
    }
}

fn spawn_decode(kind: AssetKind, path: PathBuf, tx: Sender<LoadedAsset>) {
    rayon::spawn(move || {
        let result = load_rgba(&path);
        // The receiver is gone only when the app is shutting down.
        let _ = tx.send(LoadedAsset { kind, path, result });
    });
}
