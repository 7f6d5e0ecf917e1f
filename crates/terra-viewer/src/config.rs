use clap::Parser;
use std::path::PathBuf;
use terra::starfield::StarFieldParams;

/// `terra` - An interactive point-cloud globe.
///
/// Renders a wireframe sphere, a textured point-cloud terrain that bulges and
/// glows under the cursor, and a background star field.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory holding the sprite and globe textures.
    ///
    /// Expected files: `circle.png`, `04_rainbow1k.jpg`, `00_earthmap1k.jpg`,
    /// `01_earthbump1k.jpg` and `02_earthspec1k.jpg`. Missing files are
    /// logged and rendered black.
    #[arg(long, env = "TERRA_ASSETS_DIR", default_value = "assets")]
    pub assets_dir: PathBuf,

    /// Number of background stars.
    #[arg(long, env = "TERRA_STAR_COUNT", default_value_t = 4500)]
    pub star_count: usize,

    /// Seed for the star field. A fresh field is drawn every run when unset.
    #[arg(long, env = "TERRA_STAR_SEED")]
    pub star_seed: Option<u64>,

    /// Icosphere subdivision of the terrain point cloud.
    #[arg(
        long,
        env = "TERRA_POINT_DETAIL",
        default_value_t = 120,
        value_parser = clap::value_parser!(u32).range(0..=400)
    )]
    pub point_detail: u32,

    /// Icosphere subdivision of the wireframe scaffold, which is also the
    /// surface the cursor is picked against.
    #[arg(
        long,
        env = "TERRA_SCAFFOLD_DETAIL",
        default_value_t = 16,
        value_parser = clap::value_parser!(u32).range(0..=64)
    )]
    pub scaffold_detail: u32,

    /// Globe spin per frame, radians.
    #[arg(long, env = "TERRA_ROTATION_STEP", default_value_t = 0.002)]
    pub rotation_step: f32,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Show the diagnostics overlay.
    #[arg(long, env = "TERRA_HUD")]
    pub hud: bool,
}

impl Config {
    pub fn star_params(&self) -> StarFieldParams {
        StarFieldParams {
            count: self.star_count,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::try_parse_from(["terra"]).unwrap();
        assert_eq!(cfg.assets_dir, PathBuf::from("assets"));
        assert_eq!(cfg.star_count, 4500);
        assert_eq!(cfg.star_seed, None);
        assert_eq!(cfg.point_detail, 120);
        assert_eq!(cfg.scaffold_detail, 16);
        assert_eq!(cfg.rotation_step, 0.002);
        assert_eq!((cfg.width, cfg.height), (1280, 720));
        assert!(!cfg.hud);
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "terra",
            "--star-count",
            "0",
            "--star-seed",
            "42",
            "--point-detail",
            "8",
            "--hud",
        ])
        .unwrap();
        assert_eq!(cfg.star_params().count, 0);
        assert_eq!(cfg.star_params().outer_radius, 50.0);
        assert_eq!(cfg.star_seed, Some(42));
        assert_eq!(cfg.point_detail, 8);
        assert!(cfg.hud);
    }

    #[test]
    fn oversized_detail_is_rejected() {
        assert!(Config::try_parse_from(["terra", "--point-detail", "5000"]).is_err());
    }
}
