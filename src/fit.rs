//! Sizes a broken name so it fills the width of its box.

use tracing::warn;

use crate::linebreak::LineBreakResult;
use crate::metrics::{Face, TextMeasure};

/// Fraction of the box width the name may occupy.
const WIDTH_FILL: f32 = 0.9;

/// Cap for any name set on more than one line (leaves room for the pattern).
const MULTI_LINE_MAX_SIZE: f32 = 84.0;
const ONE_LINE_MAX_SIZE: f32 = 160.0;
const THREE_LINE_MAX_SIZE: f32 = 70.0;
const MANY_LINE_MAX_SIZE: f32 = 50.0;

/// Floor applied when the measured text is degenerate.
pub const MIN_FONT_SIZE: f32 = 4.0;

const LINE_GAP_RATIO: f32 = 0.06;
const LEADING_RATIO: f32 = 0.5;
/// Cap height plus overshoot of the name faces, per em.
const CAP_RATIO: f32 = 0.7;

/// Horizontal inset added to the centring offset of every name layer.
pub const TEXT_INSET: f32 = 5.0;

/// Font size and spacing chosen for a name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub font_size: f32,
    pub line_height: f32,
    pub line_gap: f32,
    /// Vertical extent of the whole name block.
    pub block_height: f32,
}

impl FitResult {
    fn for_size(font_size: f32, line_count: usize) -> FitResult {
        let line_gap = font_size * LINE_GAP_RATIO;
        FitResult {
            font_size,
            line_height: font_size * LEADING_RATIO + line_gap,
            line_gap,
            block_height: (font_size * CAP_RATIO + line_gap) * line_count as f32,
        }
    }

    /// Distance between consecutive baselines when the block is drawn.
    pub fn baseline_pitch(&self) -> f32 {
        self.font_size * CAP_RATIO + self.line_gap
    }
}

/// Applies the per-line-count caps. Each cap only ever lowers the size.
pub fn clamp_font_size(font_size: f32, line_count: usize) -> f32 {
    let mut size = font_size;
    if line_count > 1 && size > MULTI_LINE_MAX_SIZE {
        size = MULTI_LINE_MAX_SIZE;
    }
    if line_count == 1 && size > ONE_LINE_MAX_SIZE {
        size = ONE_LINE_MAX_SIZE;
    }
    if line_count >= 3 && size > THREE_LINE_MAX_SIZE {
        size = THREE_LINE_MAX_SIZE;
    }
    if line_count >= 4 && size > MANY_LINE_MAX_SIZE {
        size = MANY_LINE_MAX_SIZE;
    }
    size
}

/// Computes the font size that makes the widest line fill 90% of `box_width`.
pub fn fit_name<M: TextMeasure + ?Sized>(
    measure: &M,
    face: Face,
    name: &LineBreakResult,
    box_width: f32,
) -> FitResult {
    let natural_width = measure.text_width(face, &name.text, 1.0);
    let candidate = box_width / natural_width * WIDTH_FILL;

    let font_size = if natural_width <= 0.0 || !candidate.is_finite() || candidate < MIN_FONT_SIZE {
        warn!(
            "degenerate layout for {:?} (natural width {}, box width {}), using {}pt",
            name.text, natural_width, box_width, MIN_FONT_SIZE
        );
        MIN_FONT_SIZE
    } else {
        clamp_font_size(candidate, name.line_count)
    };

    FitResult::for_size(font_size, name.line_count)
}

/// Left edge shared by every layer of a name, centring it in the box.
pub fn x_offset(box_width: f32, measured_width: f32) -> f32 {
    (box_width - measured_width) / 2.0 + TEXT_INSET
}
