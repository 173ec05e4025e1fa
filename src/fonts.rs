//! Fonts for the name layers.
//!
//! Each of the shade, name and shine layers can be set in its own TrueType or
//! OpenType file. Layers without a file fall back to the base-14 faces, and a
//! built-in shade face is drawn offset so the shadow shows behind the name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::metrics::{AfmMetrics, Face, TextMeasure};

/// Depth of the built-in drop shadow, as a fraction of the font size.
const SHADE_DEPTH: f32 = 0.04;

/// Font files per name layer, as given in the configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayerFontPaths {
    pub shade: Option<PathBuf>,
    pub name: Option<PathBuf>,
    pub shine: Option<PathBuf>,
}

impl LayerFontPaths {
    /// Resolves relative paths against `dir`.
    pub fn relative_to(self, dir: &Path) -> LayerFontPaths {
        let resolve = |path: Option<PathBuf>| {
            path.map(|p| if p.is_relative() { dir.join(p) } else { p })
        };
        LayerFontPaths {
            shade: resolve(self.shade),
            name: resolve(self.name),
            shine: resolve(self.shine),
        }
    }
}

/// The face chosen for each name layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameFaces {
    pub shade: Face,
    pub name: Face,
    pub shine: Face,
}

impl NameFaces {
    pub const BUILTIN: NameFaces = NameFaces {
        shade: Face::HelveticaBold,
        name: Face::HelveticaBold,
        shine: Face::Helvetica,
    };

    /// How far the shade layer sits from the name, right and down. A shade font
    /// carries its own shadow and is drawn in place.
    pub fn shade_offset(&self, font_size: f32) -> (f32, f32) {
        if self.shade.is_builtin() {
            let depth = font_size * SHADE_DEPTH;
            (depth, -depth)
        } else {
            (0.0, 0.0)
        }
    }
}

impl Default for NameFaces {
    fn default() -> NameFaces {
        NameFaces::BUILTIN
    }
}

/// A font file held in memory.
#[derive(Debug, Clone)]
pub struct FontFile {
    path: PathBuf,
    data: Vec<u8>,
    units_per_em: f32,
}

impl FontFile {
    pub fn load(path: &Path) -> Result<FontFile, AppError> {
        let data = std::fs::read(path)
            .map_err(|e| AppError::FontError(format!("{}: {}", path.display(), e)))?;
        FontFile::from_bytes(path, data)
    }

    pub fn from_bytes(path: &Path, data: Vec<u8>) -> Result<FontFile, AppError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| AppError::FontError(format!("{}: {}", path.display(), e)))?;
        let units_per_em = face.units_per_em() as f32;
        if units_per_em <= 0.0 {
            return Err(AppError::FontError(format!("{}: no units per em", path.display())));
        }
        Ok(FontFile {
            path: path.to_path_buf(),
            data,
            units_per_em,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Sum of the horizontal advances; unmapped characters take the advance of
    /// the missing glyph.
    pub fn line_width(&self, line: &str, size: f32) -> f32 {
        // validated in from_bytes()
        let Ok(face) = ttf_parser::Face::parse(&self.data, 0) else {
            return 0.0;
        };
        let units: u32 = line
            .chars()
            .map(|c| {
                let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
                face.glyph_hor_advance(glyph).unwrap_or(0) as u32
            })
            .sum();
        units as f32 * size / self.units_per_em
    }
}

/// Loaded fonts plus the face assignment for the name layers.
#[derive(Debug, Clone, Default)]
pub struct FontBook {
    files: Vec<FontFile>,
    faces: NameFaces,
}

impl FontBook {
    /// Only the base-14 faces.
    pub fn builtin() -> FontBook {
        FontBook::default()
    }

    /// Loads every configured layer font. A file named by several layers is
    /// loaded once.
    pub fn load(paths: &LayerFontPaths) -> Result<FontBook, AppError> {
        let mut book = FontBook::builtin();
        let mut by_path: HashMap<PathBuf, Face> = HashMap::new();

        let layers = [
            ("shade", &paths.shade, &mut book.faces.shade),
            ("name", &paths.name, &mut book.faces.name),
            ("shine", &paths.shine, &mut book.faces.shine),
        ];
        for (layer, path, face) in layers {
            let Some(path) = path else { continue };
            *face = match by_path.get(path) {
                Some(existing) => *existing,
                None => {
                    let file = FontFile::load(path)?;
                    let loaded = Face::External(book.files.len());
                    info!("{} font: {}", layer, path.display());
                    book.files.push(file);
                    by_path.insert(path.clone(), loaded);
                    loaded
                }
            };
        }

        debug!("name faces {:?}", book.faces);
        Ok(book)
    }

    pub fn faces(&self) -> NameFaces {
        self.faces
    }

    /// The external fonts with the face each is drawn as.
    pub fn external(&self) -> impl Iterator<Item = (Face, &FontFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| (Face::External(i), file))
    }
}

impl TextMeasure for FontBook {
    fn line_width(&self, face: Face, line: &str, size: f32) -> f32 {
        match face {
            Face::External(i) => match self.files.get(i) {
                Some(file) => file.line_width(line, size),
                None => AfmMetrics.line_width(face, line, size),
            },
            _ => AfmMetrics.line_width(face, line, size),
        }
    }
}
