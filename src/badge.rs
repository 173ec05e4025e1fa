//! Composes one badge: background, pattern texture, layered name and the
//! company bar.
//!
//! Everything is drawn in badge space: origin at the bottom-left trim corner,
//! `width` x `height` points. Bleed extends the background past the left or
//! right trim edge.

use tracing::debug;

use crate::canvas::{Canvas, SavedState, TextRun};
use crate::color::Rgba;
use crate::fit::{fit_name, x_offset, FitResult};
use crate::fonts::NameFaces;
use crate::linebreak::{break_name, LineBreakResult};
use crate::metrics::{Face, TextMeasure};
use crate::names::AttendeeName;
use crate::palette::Palette;
use crate::tiling::{Bleed, Rect, Segment};

/// Repeating units of the background texture; one is picked per badge.
pub const PATTERNS: [&str; 5] = [
    "ABabABabABabbaBAbaBAbaBA",
    "UuVvUuVvUuVvvVuUvVuUvVuU",
    ";:;:;:;:;:;::;:;:;:;:;:;",
    "Ll",
    "45",
];

const PATTERN_FACE: Face = Face::CourierBold;
const PATTERN_SIZE: f32 = 35.0;

/// Height of the company bar beyond the label size.
const COMPANY_BLOCK_PADDING: f32 = 19.0;
const COMPANY_BOTTOM_MARGIN: f32 = 12.0;
/// The label must leave this much of the badge width free.
const COMPANY_SIDE_ROOM: f32 = 50.0;
const COMPANY_TRACKING: f32 = 0.15;
const COMPANY_WORD_TRACKING: f32 = 0.75;
const COMPANY_RULE_WIDTH: f32 = 0.8;
/// Size of the condensed company label relative to the regular one.
const CONDENSED_SCALE: f32 = 0.86;

/// A badge about to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeBox {
    pub width: f32,
    pub height: f32,
    pub bleed_left: f32,
    pub bleed_right: f32,
}

impl BadgeBox {
    pub fn new(width: f32, height: f32) -> BadgeBox {
        BadgeBox {
            width,
            height,
            bleed_left: 0.0,
            bleed_right: 0.0,
        }
    }

    pub fn with_bleed(mut self, bleed: Bleed) -> BadgeBox {
        self.bleed_left = bleed.left;
        self.bleed_right = bleed.right;
        self
    }

    /// The trim box widened by the bleed on either side.
    pub fn bleed_rect(&self, height: f32) -> Rect {
        Rect {
            x: -self.bleed_left,
            y: 0.0,
            width: self.width + self.bleed_left + self.bleed_right,
            height,
        }
    }
}

/// Look of one badge.
#[derive(Debug, Clone, Copy)]
pub struct BadgeStyle<'a> {
    pub palette: &'a Palette,
    pub pattern: &'a str,
    pub faces: NameFaces,
    pub show_company: bool,
    pub company_size: f32,
}

/// Layout decisions made for a name.
#[derive(Debug, Clone, PartialEq)]
pub struct NameLayout {
    pub breaks: LineBreakResult,
    pub fit: FitResult,
    /// Left edge shared by every text layer.
    pub x_offset: f32,
}

/// Normalizes, breaks and sizes a name set in `face` for a box `box_width` wide.
pub fn layout_name<M: TextMeasure + ?Sized>(
    measure: &M,
    face: Face,
    name: &AttendeeName,
    box_width: f32,
) -> NameLayout {
    let breaks = break_name(&name.normalized_first(), &name.normalized_last());
    let fit = fit_name(measure, face, &breaks, box_width);
    let measured = measure.text_width(face, &breaks.text, fit.font_size);
    NameLayout {
        x_offset: x_offset(box_width, measured),
        breaks,
        fit,
    }
}

/// Draws a complete badge and returns the name layout it used.
pub fn draw_badge<C, M>(
    canvas: &mut C,
    measure: &M,
    badge: &BadgeBox,
    name: &AttendeeName,
    company: Option<&str>,
    style: &BadgeStyle,
) -> NameLayout
where
    C: Canvas + ?Sized,
    M: TextMeasure + ?Sized,
{
    let mut canvas = SavedState::new(canvas);

    canvas.set_fill(style.palette.background);
    canvas.fill_rect(badge.bleed_rect(badge.height));

    draw_pattern(&mut *canvas, badge, style);

    let company = company.filter(|c| style.show_company && !c.trim().is_empty());
    let company_block = match company {
        Some(_) => style.company_size + COMPANY_BLOCK_PADDING,
        None => 0.0,
    };

    let layout = {
        let mut name_area = SavedState::new(&mut *canvas);
        name_area.translate(0.0, company_block);
        draw_name(&mut *name_area, measure, name, badge.width, badge.height - company_block, style)
    };

    if let Some(company) = company {
        draw_company(&mut *canvas, measure, company, badge, company_block, style);
    }

    debug!(
        "badge {:?}: {} line(s) at {:.1}pt",
        layout.breaks.text, layout.breaks.line_count, layout.fit.font_size
    );
    layout
}

/// Rows of pattern glyphs from the top edge down, clipped to whole glyphs
/// inside the bleed box.
fn draw_pattern<C: Canvas + ?Sized>(canvas: &mut C, badge: &BadgeBox, style: &BadgeStyle) {
    let unit: Vec<char> = style.pattern.chars().collect();
    if unit.is_empty() {
        return;
    }

    let span = badge.bleed_rect(badge.height);
    // Courier: every glyph is 0.6em
    let per_row = (span.width / (PATTERN_SIZE * 0.6)).floor() as usize;
    if per_row == 0 {
        return;
    }

    canvas.set_fill(style.palette.pattern);
    let mut start = 0;
    let mut baseline = badge.height - PATTERN_SIZE * 0.75;
    while baseline > -PATTERN_SIZE * 0.25 {
        let row: String = unit.iter().cycle().skip(start).take(per_row).collect();
        canvas.draw_text(&TextRun::new(PATTERN_FACE, PATTERN_SIZE, span.x, baseline, &row));
        start = (start + per_row) % unit.len();
        baseline -= PATTERN_SIZE;
    }
}

/// Draws the name in four layers: a knockout in the background color and the
/// shade, both in the shade face, then the name and the shine. The name and
/// shine share one position; a built-in shade is pushed down and right, with
/// the knockout twice as far so it clears the pattern around the shadow.
fn draw_name<C, M>(
    canvas: &mut C,
    measure: &M,
    name: &AttendeeName,
    box_width: f32,
    box_height: f32,
    style: &BadgeStyle,
) -> NameLayout
where
    C: Canvas + ?Sized,
    M: TextMeasure + ?Sized,
{
    let faces = style.faces;
    let palette = style.palette;
    let layout = layout_name(measure, faces.name, name, box_width);
    let fit = &layout.fit;

    let top = (box_height + fit.block_height) / 2.0;
    let first_baseline = top - fit.baseline_pitch() + fit.line_gap;
    let (dx, dy) = faces.shade_offset(fit.font_size);

    let layers: [(Rgba, Face, (f32, f32)); 4] = [
        (palette.background, faces.shade, (2.0 * dx, 2.0 * dy)),
        (palette.shade, faces.shade, (dx, dy)),
        (palette.name, faces.name, (0.0, 0.0)),
        (palette.shine, faces.shine, (0.0, 0.0)),
    ];

    for (color, face, (ox, oy)) in layers {
        canvas.set_fill(color);
        for (i, line) in layout.breaks.lines().enumerate() {
            let y = first_baseline - i as f32 * fit.baseline_pitch() + oy;
            canvas.draw_text(&TextRun::new(face, fit.font_size, layout.x_offset + ox, y, line));
        }
    }

    layout
}

/// Settles the company label size: tracked at the regular size when it fits,
/// otherwise condensed, then shrunk until it leaves the side room free.
pub fn company_label<M: TextMeasure + ?Sized>(
    measure: &M,
    company: &str,
    size: f32,
    badge_width: f32,
) -> (f32, f32, f32) {
    let available = badge_width - COMPANY_SIDE_ROOM;
    let tracked = measure.tracked_width(Face::Helvetica, company, size, COMPANY_TRACKING, COMPANY_WORD_TRACKING);
    if tracked <= available {
        return (size, COMPANY_TRACKING, tracked);
    }

    let condensed = size * CONDENSED_SCALE;
    let width = measure.line_width(Face::Helvetica, company, condensed);
    if width <= available || width <= 0.0 {
        return (condensed, 0.0, width);
    }
    let shrunk = condensed * available.max(0.0) / width;
    (shrunk, 0.0, measure.line_width(Face::Helvetica, company, shrunk))
}

fn draw_company<C, M>(
    canvas: &mut C,
    measure: &M,
    company: &str,
    badge: &BadgeBox,
    block_height: f32,
    style: &BadgeStyle,
) where
    C: Canvas + ?Sized,
    M: TextMeasure + ?Sized,
{
    let mut canvas = SavedState::new(canvas);

    canvas.set_fill(style.palette.background);
    canvas.fill_rect(badge.bleed_rect(block_height));

    canvas.set_stroke(style.palette.text, COMPANY_RULE_WIDTH);
    canvas.stroke_line(Segment::new((0.0, block_height), (badge.width, block_height)));

    let (size, tracking, width) = company_label(measure, company, style.company_size, badge.width);
    let word_tracking = if tracking > 0.0 { COMPANY_WORD_TRACKING } else { 0.0 };
    canvas.set_fill(style.palette.text);
    canvas.draw_text(
        &TextRun::new(
            Face::Helvetica,
            size,
            (badge.width - width) / 2.0,
            COMPANY_BOTTOM_MARGIN,
            company,
        )
        .with_spacing(tracking, word_tracking),
    );
}
