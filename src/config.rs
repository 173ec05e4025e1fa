//! Run configuration: built-in defaults, optionally overridden by a TOML file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::fonts::LayerFontPaths;
use crate::palette::{Palette, PaletteSet};
use crate::tiling::SheetLayout;

/// 72pt in an inch.
pub const PT_PER_INCH: f32 = 72.0;

/// Presentation page size for screen mode.
pub const SCREEN_WIDTH: f32 = 1920.0;
pub const SCREEN_HEIGHT: f32 = 1080.0;

/// Sizes in points.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BadgeConfig {
    pub badge_width: f32,
    pub badge_height: f32,

    pub sheet_width: f32,
    pub sheet_height: f32,
    pub margin: f32,

    /// Copies of each badge placed side by side on a sheet.
    pub multiple: usize,

    /// How far a badge background extends past its trim edge on a sheet.
    pub bleed: f32,

    /// Scale factor for single-badge pages.
    pub single_scale: f32,

    pub show_company: bool,
    pub company_size: f32,

    /// Palette used for every badge; random when unset.
    pub palette: Option<String>,

    /// Extra palettes, added to (or replacing) the built-in ones.
    pub palettes: BTreeMap<String, Palette>,

    /// Font files for the name layers; relative paths are taken from the
    /// directory of the configuration file.
    pub fonts: LayerFontPaths,
}

impl Default for BadgeConfig {
    fn default() -> BadgeConfig {
        BadgeConfig {
            badge_width: 4.0 * PT_PER_INCH,
            badge_height: 3.0 * PT_PER_INCH,
            sheet_width: 8.5 * PT_PER_INCH,
            sheet_height: 11.0 * PT_PER_INCH,
            margin: 0.25 * PT_PER_INCH,
            multiple: 2,
            bleed: 0.25 * PT_PER_INCH,
            single_scale: 5.0,
            show_company: true,
            company_size: 11.0,
            palette: None,
            palettes: BTreeMap::new(),
            fonts: LayerFontPaths::default(),
        }
    }
}

impl BadgeConfig {
    pub fn from_toml(content: &str) -> Result<BadgeConfig, AppError> {
        let config: BadgeConfig =
            toml::from_str(content).map_err(|e| AppError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<BadgeConfig, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let mut config = BadgeConfig::from_toml(&content)?;
        if let Some(dir) = path.parent() {
            config.fonts = config.fonts.relative_to(dir);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let sizes = [
            ("badge_width", self.badge_width),
            ("badge_height", self.badge_height),
            ("sheet_width", self.sheet_width),
            ("sheet_height", self.sheet_height),
            ("single_scale", self.single_scale),
            ("company_size", self.company_size),
        ];
        for (name, value) in sizes {
            if !value.is_finite() {
                return Err(AppError::ConfigError(format!("{} must be finite, got {}", name, value)));
            }
            if !(value > 0.0) {
                return Err(AppError::ConfigError(format!("{} must be positive, got {}", name, value)));
            }
        }
        for (name, value) in [("margin", self.margin), ("bleed", self.bleed)] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(AppError::ConfigError(format!("{} must not be negative, got {}", name, value)));
            }
        }
        if self.multiple == 0 {
            return Err(AppError::ConfigError("multiple must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Grid for sheet mode; fails if a badge does not fit on the sheet.
    pub fn sheet_layout(&self) -> Result<SheetLayout, AppError> {
        SheetLayout::new(
            self.sheet_width,
            self.sheet_height,
            self.badge_width,
            self.badge_height,
            self.margin,
        )
    }

    /// Built-in palettes plus any defined in the configuration.
    pub fn palette_set(&self) -> PaletteSet {
        let mut set = PaletteSet::default();
        for (name, palette) in &self.palettes {
            set.insert(name, *palette);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn defaults_describe_a_letter_sheet_of_four_by_three_badges() {
        let config = BadgeConfig::default();
        assert_eq!((config.badge_width, config.badge_height), (288.0, 216.0));
        let layout = config.sheet_layout().unwrap();
        assert_eq!((layout.cols, layout.rows), (2, 3));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = BadgeConfig::from_toml("multiple = 1\nshow_company = false\n").unwrap();
        assert_eq!(config.multiple, 1);
        assert!(!config.show_company);
        assert_eq!(config.margin, 18.0);
    }

    #[test]
    fn custom_palettes_join_the_builtins() {
        let config = BadgeConfig::from_toml(
            r##"
            palette = "night"

            [palettes.night]
            background = "#000000"
            text = "#FFFFFF"
            pattern = "#222222"
            name = "#FFE12E"
            shine = "#FFFFFF"
            shade = "#17388C"
            "##,
        )
        .unwrap();
        let set = config.palette_set();
        assert_eq!(set.get("night").unwrap().background, Rgba::BLACK);
        assert!(set.get("taffy").is_ok());
    }

    #[test]
    fn font_paths_follow_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("badges.toml");
        std::fs::write(&path, "[fonts]\nname = \"fonts/Name.otf\"\n").unwrap();

        let config = BadgeConfig::load(&path).unwrap();
        assert_eq!(config.fonts.name, Some(dir.path().join("fonts/Name.otf")));
        assert_eq!(config.fonts.shade, None);
    }

    #[test]
    fn unknown_font_layer_is_rejected() {
        assert!(BadgeConfig::from_toml("[fonts]\nbase = \"x.otf\"\n").is_err());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(BadgeConfig::from_toml("multiple = 0").is_err());
        assert!(BadgeConfig::from_toml("badge_width = -1.0").is_err());
        assert!(BadgeConfig::from_toml("margin = -2.0").is_err());
        assert!(BadgeConfig::from_toml("colour = \"red\"").is_err());
    }

    #[test]
    fn rejects_infinite_sizes() {
        for toml in ["sheet_width = inf", "badge_height = nan", "margin = inf", "bleed = -inf"] {
            assert!(
                matches!(BadgeConfig::from_toml(toml), Err(AppError::ConfigError(_))),
                "{} was accepted",
                toml
            );
        }
    }

    #[test]
    fn absurd_sheet_fails_layout_instead_of_overflowing() {
        let config = BadgeConfig::from_toml("sheet_width = 1e30").unwrap();
        assert!(matches!(config.sheet_layout(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn palette_with_missing_color_is_rejected() {
        let err = BadgeConfig::from_toml("[palettes.half]\nbackground = \"#000000\"\n");
        assert!(matches!(err, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn oversized_badge_fails_layout() {
        let config = BadgeConfig::from_toml("badge_width = 1000.0").unwrap();
        assert!(matches!(config.sheet_layout(), Err(AppError::ConfigError(_))));
    }
}
