//! The drawing surface badges are rendered onto.
//!
//! Layout code only talks to [`Canvas`]. [`PdfCanvas`] writes a PDF with
//! `printpdf`; [`RecordingCanvas`] keeps the draw calls in memory so the
//! geometry can be inspected.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::ops::{Deref, DerefMut};
use std::path::Path;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Pt, Rgb,
};

use crate::color::Rgba;
use crate::error::AppError;
use crate::fonts::FontBook;
use crate::metrics::Face;
use crate::tiling::{Rect, Segment};

/// One run of text on a single baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'a> {
    pub face: Face,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: &'a str,
    pub char_spacing: f32,
    pub word_spacing: f32,
}

impl<'a> TextRun<'a> {
    pub fn new(face: Face, size: f32, x: f32, y: f32, text: &'a str) -> TextRun<'a> {
        TextRun {
            face,
            size,
            x,
            y,
            text,
            char_spacing: 0.0,
            word_spacing: 0.0,
        }
    }

    pub fn with_spacing(mut self, char_spacing: f32, word_spacing: f32) -> TextRun<'a> {
        self.char_spacing = char_spacing;
        self.word_spacing = word_spacing;
        self
    }
}

/// The drawing operations badge layout needs. Coordinates are points, y up.
pub trait Canvas {
    /// Starts a new page; the transform is reset to identity.
    fn begin_page(&mut self, width: f32, height: f32) -> Result<(), AppError>;

    fn save_state(&mut self);
    fn restore_state(&mut self);

    fn translate(&mut self, dx: f32, dy: f32);
    fn scale(&mut self, factor: f32);

    fn set_fill(&mut self, color: Rgba);
    fn set_stroke(&mut self, color: Rgba, width: f32);

    fn fill_rect(&mut self, rect: Rect);
    fn stroke_line(&mut self, segment: Segment);
    fn draw_text(&mut self, run: &TextRun);
}

/// Graphics state held for the lifetime of the guard and restored on drop,
/// so every early return unwinds the colors and transform it changed.
pub struct SavedState<'a, C: Canvas + ?Sized> {
    canvas: &'a mut C,
}

impl<'a, C: Canvas + ?Sized> SavedState<'a, C> {
    pub fn new(canvas: &'a mut C) -> SavedState<'a, C> {
        canvas.save_state();
        SavedState { canvas }
    }
}

impl<'a, C: Canvas + ?Sized> Deref for SavedState<'a, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.canvas
    }
}

impl<'a, C: Canvas + ?Sized> DerefMut for SavedState<'a, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.canvas
    }
}

impl<'a, C: Canvas + ?Sized> Drop for SavedState<'a, C> {
    fn drop(&mut self) {
        self.canvas.restore_state();
    }
}

// ============================================================================
// Transform tracking
// ============================================================================

/// Translation + uniform scale, the only transforms badge layout uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub dx: f32,
    pub dy: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            dx: 0.0,
            dy: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn apply(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (x * self.scale + self.dx, y * self.scale + self.dy)
    }

    pub fn length(&self, len: f32) -> f32 {
        len * self.scale
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.dx += dx * self.scale;
        self.dy += dy * self.scale;
    }

    fn rect(&self, rect: Rect) -> Rect {
        let (x, y) = self.apply((rect.x, rect.y));
        Rect {
            x,
            y,
            width: self.length(rect.width),
            height: self.length(rect.height),
        }
    }
}

#[derive(Debug, Default)]
struct TransformStack {
    current: Transform,
    saved: Vec<Transform>,
}

impl TransformStack {
    fn push(&mut self) {
        self.saved.push(self.current);
    }

    fn pop(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.current = t;
        }
    }

    fn reset(&mut self) {
        self.current = Transform::default();
        self.saved.clear();
    }
}

// ============================================================================
// PDF output
// ============================================================================

fn pdf_color(color: Rgba) -> Color {
    Color::Rgb(Rgb::new(color.r, color.g, color.b, None))
}

fn mm(pt: f32) -> Mm {
    Mm::from(Pt(pt))
}

fn builtin(face: Face) -> BuiltinFont {
    match face {
        Face::Helvetica => BuiltinFont::Helvetica,
        Face::HelveticaBold => BuiltinFont::HelveticaBold,
        Face::CourierBold => BuiltinFont::CourierBold,
        Face::External(_) => BuiltinFont::HelveticaBold,
    }
}

/// Renders into a `printpdf` document, one layer per page.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: Option<PdfLayerReference>,
    fonts: HashMap<Face, IndirectFontRef>,
    transform: TransformStack,
    pages: usize,
}

impl PdfCanvas {
    pub fn new(title: &str) -> Result<PdfCanvas, AppError> {
        let doc = PdfDocument::empty(title);

        let mut fonts = HashMap::new();
        for face in Face::BUILTIN {
            let font = doc
                .add_builtin_font(builtin(face))
                .map_err(|e| AppError::PdfError(e.to_string()))?;
            fonts.insert(face, font);
        }

        Ok(PdfCanvas {
            doc,
            layer: None,
            fonts,
            transform: TransformStack::default(),
            pages: 0,
        })
    }

    /// Embeds the external fonts of `book` so their faces can be drawn.
    pub fn register_fonts(&mut self, book: &FontBook) -> Result<(), AppError> {
        for (face, file) in book.external() {
            let font = self
                .doc
                .add_external_font(Cursor::new(file.data()))
                .map_err(|e| AppError::FontError(format!("{}: {}", file.path().display(), e)))?;
            self.fonts.insert(face, font);
        }
        Ok(())
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn save(self, output_path: &Path) -> Result<(), AppError> {
        let file = File::create(output_path)?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save(&mut writer)
            .map_err(|e| AppError::PdfError(e.to_string()))?;
        Ok(())
    }
}

impl Canvas for PdfCanvas {
    fn begin_page(&mut self, width: f32, height: f32) -> Result<(), AppError> {
        let (page, layer) = self.doc.add_page(mm(width), mm(height), "Layer 1");
        self.layer = Some(self.doc.get_page(page).get_layer(layer));
        self.transform.reset();
        self.pages += 1;
        Ok(())
    }

    fn save_state(&mut self) {
        if let Some(layer) = &self.layer {
            layer.save_graphics_state();
        }
        self.transform.push();
    }

    fn restore_state(&mut self) {
        if let Some(layer) = &self.layer {
            layer.restore_graphics_state();
        }
        self.transform.pop();
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform.current.translate(dx, dy);
    }

    fn scale(&mut self, factor: f32) {
        self.transform.current.scale *= factor;
    }

    fn set_fill(&mut self, color: Rgba) {
        if let Some(layer) = &self.layer {
            layer.set_fill_color(pdf_color(color));
        }
    }

    fn set_stroke(&mut self, color: Rgba, width: f32) {
        let width = self.transform.current.length(width);
        if let Some(layer) = &self.layer {
            layer.set_outline_color(pdf_color(color));
            layer.set_outline_thickness(width);
        }
    }

    fn fill_rect(&mut self, rect: Rect) {
        let r = self.transform.current.rect(rect);
        let corners = [
            (r.x, r.y),
            (r.x + r.width, r.y),
            (r.x + r.width, r.y + r.height),
            (r.x, r.y + r.height),
        ];
        let ring = corners
            .iter()
            .map(|&(x, y)| (Point::new(mm(x), mm(y)), false))
            .collect();
        if let Some(layer) = &self.layer {
            layer.add_polygon(Polygon {
                rings: vec![ring],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
        }
    }

    fn stroke_line(&mut self, segment: Segment) {
        let (x1, y1) = self.transform.current.apply(segment.from);
        let (x2, y2) = self.transform.current.apply(segment.to);
        let line = Line {
            points: vec![
                (Point::new(mm(x1), mm(y1)), false),
                (Point::new(mm(x2), mm(y2)), false),
            ],
            is_closed: false,
        };
        if let Some(layer) = &self.layer {
            layer.add_line(line);
        }
    }

    fn draw_text(&mut self, run: &TextRun) {
        let t = self.transform.current;
        let (x, y) = t.apply((run.x, run.y));
        // an unregistered external face is set in Helvetica-Bold, as it was measured
        let font = self
            .fonts
            .get(&run.face)
            .or_else(|| self.fonts.get(&Face::HelveticaBold));
        let (Some(layer), Some(font)) = (&self.layer, font) else {
            return;
        };
        layer.begin_text_section();
        layer.set_font(font, t.length(run.size));
        layer.set_character_spacing(t.length(run.char_spacing));
        layer.set_word_spacing(t.length(run.word_spacing));
        layer.set_text_cursor(mm(x), mm(y));
        layer.write_text(run.text, font);
        layer.end_text_section();
    }
}

// ============================================================================
// In-memory recording
// ============================================================================

/// A draw call with its coordinates already mapped to page space.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Page { width: f32, height: f32 },
    Save,
    Restore,
    Fill(Rgba),
    Stroke(Rgba, f32),
    Rect(Rect),
    Line(Segment),
    Text {
        face: Face,
        size: f32,
        x: f32,
        y: f32,
        text: String,
        char_spacing: f32,
    },
}

/// Keeps every draw call; used to check layouts without producing a file.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<Command>,
    transform: TransformStack,
}

impl RecordingCanvas {
    pub fn new() -> RecordingCanvas {
        RecordingCanvas::default()
    }

    pub fn pages(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Page { .. }))
            .count()
    }

    /// Texts drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<Segment> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Line(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Saves minus restores; zero when every scope was closed.
    pub fn state_depth(&self) -> i64 {
        self.commands.iter().fold(0, |depth, c| match c {
            Command::Save => depth + 1,
            Command::Restore => depth - 1,
            _ => depth,
        })
    }

    pub fn current_transform(&self) -> Transform {
        self.transform.current
    }
}

impl Canvas for RecordingCanvas {
    fn begin_page(&mut self, width: f32, height: f32) -> Result<(), AppError> {
        self.transform.reset();
        self.commands.push(Command::Page { width, height });
        Ok(())
    }

    fn save_state(&mut self) {
        self.transform.push();
        self.commands.push(Command::Save);
    }

    fn restore_state(&mut self) {
        self.transform.pop();
        self.commands.push(Command::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform.current.translate(dx, dy);
    }

    fn scale(&mut self, factor: f32) {
        self.transform.current.scale *= factor;
    }

    fn set_fill(&mut self, color: Rgba) {
        self.commands.push(Command::Fill(color));
    }

    fn set_stroke(&mut self, color: Rgba, width: f32) {
        let width = self.transform.current.length(width);
        self.commands.push(Command::Stroke(color, width));
    }

    fn fill_rect(&mut self, rect: Rect) {
        let rect = self.transform.current.rect(rect);
        self.commands.push(Command::Rect(rect));
    }

    fn stroke_line(&mut self, segment: Segment) {
        let t = self.transform.current;
        self.commands
            .push(Command::Line(Segment::new(t.apply(segment.from), t.apply(segment.to))));
    }

    fn draw_text(&mut self, run: &TextRun) {
        let t = self.transform.current;
        let (x, y) = t.apply((run.x, run.y));
        self.commands.push(Command::Text {
            face: run.face,
            size: t.length(run.size),
            x,
            y,
            text: run.text.to_string(),
            char_spacing: t.length(run.char_spacing),
        });
    }
}
