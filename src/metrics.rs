//! Text measurement for the PDF base-14 faces the badges are set in.
//!
//! Widths come from the Adobe AFM files and are in 1/1000 em. The tables
//! cover ASCII 0x20..=0x7E; index = (char as usize) - 32. Accented letters
//! are measured by their base letter after canonical decomposition, which is
//! exact for the Latin-1 range of these faces. Anything else falls back to
//! [`FALLBACK_WIDTH`].

use unicode_normalization::UnicodeNormalization;

const FALLBACK_WIDTH: u16 = 600;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,      // 'p'..'~'
];

/// The faces used on a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Helvetica,
    HelveticaBold,
    CourierBold,
    /// A font file loaded at run time, by its index in the [`FontBook`](crate::fonts::FontBook).
    External(usize),
}

impl Face {
    pub const BUILTIN: [Face; 3] = [Face::Helvetica, Face::HelveticaBold, Face::CourierBold];

    pub fn is_builtin(self) -> bool {
        !matches!(self, Face::External(_))
    }

    /// Advance width of one character in 1/1000 em.
    fn advance(self, c: char) -> u16 {
        if let Face::CourierBold = self {
            return 600;
        }
        let table = match self {
            Face::Helvetica => &HELVETICA,
            _ => &HELVETICA_BOLD,
        };
        let base = if c.is_ascii() {
            c
        } else {
            c.nfd().next().unwrap_or(c)
        };
        match base as usize {
            i @ 0x20..=0x7E => table[i - 0x20],
            _ => FALLBACK_WIDTH,
        }
    }
}

/// Something that can tell how wide a run of text is.
pub trait TextMeasure {
    /// Width of a single line of text, in points, at `size`.
    fn line_width(&self, face: Face, line: &str, size: f32) -> f32;

    /// Width of the widest line of a multi-line text.
    fn text_width(&self, face: Face, text: &str, size: f32) -> f32 {
        text.split('\n')
            .map(|line| self.line_width(face, line, size))
            .fold(0.0, f32::max)
    }

    /// Width of a line set with extra `char_spacing` after every glyph and
    /// `word_spacing` after every space.
    fn tracked_width(
        &self,
        face: Face,
        line: &str,
        size: f32,
        char_spacing: f32,
        word_spacing: f32,
    ) -> f32 {
        let glyphs = line.chars().count() as f32;
        let spaces = line.chars().filter(|c| *c == ' ').count() as f32;
        self.line_width(face, line, size) + glyphs * char_spacing + spaces * word_spacing
    }
}

/// Measures with the AFM tables of the base-14 fonts. External faces are
/// measured as Helvetica-Bold.
#[derive(Debug, Clone, Copy, Default)]
pub struct AfmMetrics;

impl TextMeasure for AfmMetrics {
    fn line_width(&self, face: Face, line: &str, size: f32) -> f32 {
        let units: u32 = line.nfc().map(|c| face.advance(c) as u32).sum();
        units as f32 * size / 1000.0
    }
}
