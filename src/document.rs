//! Lays out a whole run: one page per badge, or badges tiled onto sheets.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::badge::{draw_badge, BadgeBox, BadgeStyle, PATTERNS};
use crate::canvas::{Canvas, SavedState};
use crate::color::Rgba;
use crate::config::{BadgeConfig, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::AppError;
use crate::fonts::NameFaces;
use crate::linebreak::ExceptionLog;
use crate::metrics::TextMeasure;
use crate::palette::{Palette, PaletteSet};
use crate::roster::Attendee;
use crate::tiling::{SheetLayout, Tiler};

const CROP_MARK_WIDTH: f32 = 1.0;

/// Output format of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RunMode {
    /// One enlarged badge per page.
    Single,
    /// Letter sheets of duplicated badges with crop marks, for fold printing.
    Sheets,
    /// One 1920x1080 page per attendee.
    Screen,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Single => "single",
            RunMode::Sheets => "sheets",
            RunMode::Screen => "screen",
        }
    }
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub badges: usize,
    pub pages: usize,
    pub exceptions: ExceptionLog,
}

/// Draws badges for a list of attendees onto a canvas.
pub struct Generator<'a, M: TextMeasure> {
    config: &'a BadgeConfig,
    palettes: PaletteSet,
    fixed_palette: Option<Palette>,
    faces: NameFaces,
    measure: M,
    rng: StdRng,
}

impl<'a, M: TextMeasure> Generator<'a, M> {
    /// `seed` makes palette and pattern choices reproducible.
    pub fn new(config: &'a BadgeConfig, measure: M, seed: Option<u64>) -> Result<Generator<'a, M>, AppError> {
        config.validate()?;
        let palettes = config.palette_set();
        let fixed_palette = match &config.palette {
            Some(name) => Some(*palettes.get(name)?),
            None => None,
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Generator {
            config,
            palettes,
            fixed_palette,
            faces: NameFaces::BUILTIN,
            measure,
            rng,
        })
    }

    /// Sets the name layers in `faces`; `measure` must know them.
    pub fn with_faces(mut self, faces: NameFaces) -> Generator<'a, M> {
        self.faces = faces;
        self
    }

    pub fn run<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        attendees: &[Attendee],
        mode: RunMode,
    ) -> Result<RunSummary, AppError> {
        if attendees.is_empty() {
            return Err(AppError::RosterError("no attendees found".to_string()));
        }

        let summary = match mode {
            RunMode::Single => {
                let (w, h) = (self.config.badge_width, self.config.badge_height);
                self.one_per_page(canvas, attendees, w, h, self.config.single_scale)?
            }
            RunMode::Screen => {
                self.one_per_page(canvas, attendees, SCREEN_WIDTH, SCREEN_HEIGHT, 1.0)?
            }
            RunMode::Sheets => self.sheets(canvas, attendees)?,
        };

        info!(
            "{} mode: {} badge(s) on {} page(s), {} linebreak exception(s)",
            mode.as_str(),
            summary.badges,
            summary.pages,
            summary.exceptions.len()
        );
        Ok(summary)
    }

    fn palette(&mut self) -> Palette {
        if let Some(palette) = self.fixed_palette {
            return palette;
        }
        let (name, palette) = self.palettes.choose(&mut self.rng);
        debug!("palette {}", name);
        *palette
    }

    fn pattern(&mut self) -> &'static str {
        PATTERNS.choose(&mut self.rng).copied().unwrap_or(PATTERNS[0])
    }

    fn style<'p>(&self, palette: &'p Palette, pattern: &'p str) -> BadgeStyle<'p> {
        BadgeStyle {
            palette,
            pattern,
            faces: self.faces,
            show_company: self.config.show_company,
            company_size: self.config.company_size,
        }
    }

    /// One page per attendee, the badge scaled up by `scale`; a fresh palette per badge.
    fn one_per_page<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        attendees: &[Attendee],
        width: f32,
        height: f32,
        scale: f32,
    ) -> Result<RunSummary, AppError> {
        let mut summary = RunSummary::default();
        let badge = BadgeBox::new(width, height);

        for attendee in attendees {
            let palette = self.palette();
            let pattern = self.pattern();

            canvas.begin_page(width * scale, height * scale)?;
            summary.pages += 1;

            let mut page = SavedState::new(&mut *canvas);
            page.scale(scale);
            let layout = draw_badge(
                &mut *page,
                &self.measure,
                &badge,
                &attendee.name,
                attendee.company.as_deref(),
                &self.style(&palette, pattern),
            );
            summary.exceptions.record(&layout.breaks);
            summary.badges += 1;
        }

        Ok(summary)
    }

    /// Tiles every attendee `multiple` times across as many sheets as needed,
    /// with a single palette for the run.
    fn sheets<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        attendees: &[Attendee],
    ) -> Result<RunSummary, AppError> {
        let layout = self.config.sheet_layout()?;
        info!(
            "sheet layout: {} column(s) x {} row(s) of {}x{}pt badges",
            layout.cols, layout.rows, layout.badge_width, layout.badge_height
        );

        let palette = self.palette();
        let mut tiler = Tiler::new(layout, self.config.multiple, self.config.bleed);
        let mut summary = RunSummary::default();
        let badge = BadgeBox::new(layout.badge_width, layout.badge_height);

        for (index, attendee) in attendees.iter().enumerate() {
            let pattern = self.pattern();
            let is_last = index + 1 == attendees.len();

            for placement in tiler.place_record(index, is_last) {
                if placement.new_page {
                    if placement.page > 1 {
                        draw_crop_marks(canvas, &layout);
                    }
                    start_sheet(canvas, &layout, palette.background)?;
                    debug!("sheet {}", placement.page);
                }

                let mut slot = SavedState::new(&mut *canvas);
                slot.translate(placement.origin.0, placement.origin.1);
                let name_layout = draw_badge(
                    &mut *slot,
                    &self.measure,
                    &badge.with_bleed(placement.bleed),
                    &attendee.name,
                    attendee.company.as_deref(),
                    &self.style(&palette, pattern),
                );
                if placement.copy == 0 {
                    summary.exceptions.record(&name_layout.breaks);
                }
                summary.badges += 1;
            }
        }

        // marks go on top of the bleed of the last sheet's badges
        draw_crop_marks(canvas, &layout);

        summary.pages = tiler.pages();
        Ok(summary)
    }
}

/// New sheet with the background band as a rudimentary bleed.
pub fn start_sheet<C: Canvas + ?Sized>(
    canvas: &mut C,
    layout: &SheetLayout,
    background: Rgba,
) -> Result<(), AppError> {
    canvas.begin_page(layout.sheet_width, layout.sheet_height)?;

    let mut sheet = SavedState::new(canvas);
    sheet.set_fill(background);
    sheet.fill_rect(layout.backdrop());
    Ok(())
}

/// Strokes the registration ticks; called once every badge on the sheet is down.
pub fn draw_crop_marks<C: Canvas + ?Sized>(canvas: &mut C, layout: &SheetLayout) {
    let mut sheet = SavedState::new(canvas);
    sheet.set_stroke(Rgba::WHITE, CROP_MARK_WIDTH);
    for mark in layout.crop_marks() {
        sheet.stroke_line(mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Command, RecordingCanvas};
    use crate::metrics::{AfmMetrics, Face};
    use crate::names::AttendeeName;
    use crate::tiling::{Rect, Segment};

    fn attendees(n: usize) -> Vec<Attendee> {
        (0..n)
            .map(|i| Attendee {
                name: AttendeeName::new(format!("Attendee{}", i), "Johnson"),
                company: if i % 2 == 0 { Some("Typographics".to_string()) } else { None },
            })
            .collect()
    }

    fn run(config: &BadgeConfig, people: &[Attendee], mode: RunMode) -> (RecordingCanvas, RunSummary) {
        let mut canvas = RecordingCanvas::new();
        let mut generator = Generator::new(config, AfmMetrics, Some(1)).unwrap();
        let summary = generator.run(&mut canvas, people, mode).unwrap();
        (canvas, summary)
    }

    #[test]
    fn single_mode_scales_each_page() {
        let config = BadgeConfig::default();
        let (canvas, summary) = run(&config, &attendees(3), RunMode::Single);
        assert_eq!(summary.pages, 3);
        assert_eq!(canvas.pages(), 3);
        assert_eq!(canvas.commands[0], Command::Page { width: 1440.0, height: 1080.0 });
        assert_eq!(canvas.state_depth(), 0);
    }

    #[test]
    fn screen_mode_uses_presentation_pages() {
        let config = BadgeConfig::default();
        let (canvas, summary) = run(&config, &attendees(2), RunMode::Screen);
        assert_eq!(summary.badges, 2);
        assert_eq!(canvas.commands[0], Command::Page { width: 1920.0, height: 1080.0 });
    }

    #[test]
    fn sheets_hold_three_attendees_each() {
        let config = BadgeConfig::default();
        let (canvas, summary) = run(&config, &attendees(7), RunMode::Sheets);
        assert_eq!(summary.badges, 14);
        assert_eq!(summary.pages, 3);
        assert_eq!(canvas.pages(), 3);
        assert_eq!(canvas.state_depth(), 0);
    }

    #[test]
    fn full_last_sheet_adds_no_blank_page() {
        let config = BadgeConfig::default();
        let (canvas, _) = run(&config, &attendees(6), RunMode::Sheets);
        assert_eq!(canvas.pages(), 2);
    }

    #[test]
    fn every_sheet_gets_crop_marks() {
        let config = BadgeConfig::default();
        let (canvas, _) = run(&config, &attendees(4), RunMode::Sheets);
        let layout = config.sheet_layout().unwrap();
        let marks = layout.crop_marks();
        let lines = canvas.lines();
        for mark in &marks {
            assert_eq!(lines.iter().filter(|l| *l == mark).count(), 2);
        }
    }

    fn covers(rect: &Rect, mark: &Segment) -> bool {
        let inside = |(x, y): (f32, f32)| {
            x >= rect.x && x <= rect.x + rect.width && y >= rect.y && y <= rect.y + rect.height
        };
        inside(mark.from) && inside(mark.to)
    }

    #[test]
    fn crop_marks_are_not_painted_over() {
        let config = BadgeConfig::default();
        let (canvas, _) = run(&config, &attendees(8), RunMode::Sheets);

        let mut marks_seen = 0;
        for (i, command) in canvas.commands.iter().enumerate() {
            let Command::Line(mark) = command else { continue };
            marks_seen += 1;
            for later in canvas.commands[i + 1..].iter() {
                match later {
                    Command::Page { .. } => break,
                    Command::Rect(rect) => assert!(!covers(rect, mark), "{:?} hidden by {:?}", mark, rect),
                    _ => {}
                }
            }
        }
        let per_sheet = config.sheet_layout().unwrap().crop_marks().len();
        assert_eq!(marks_seen, 3 * per_sheet);
    }

    #[test]
    fn crop_marks_close_each_sheet() {
        let config = BadgeConfig::default();
        let (canvas, _) = run(&config, &attendees(4), RunMode::Sheets);
        let last_line = canvas.commands.iter().rposition(|c| matches!(c, Command::Line(_))).unwrap();
        let last_rect = canvas.commands.iter().rposition(|c| matches!(c, Command::Rect(_))).unwrap();
        assert!(last_line > last_rect);
        let pen = canvas.commands[..last_line].iter().rposition(|c| matches!(c, Command::Stroke(..))).unwrap();
        assert_eq!(canvas.commands[pen], Command::Stroke(Rgba::WHITE, 1.0));
        assert!(pen > last_rect);

        let second_page = canvas
            .commands
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, c)| matches!(c, Command::Page { .. }))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(canvas.commands[second_page - 1], Command::Restore);
        assert!(matches!(canvas.commands[second_page - 2], Command::Line(_)));
    }

    #[test]
    fn exceptions_are_collected_once() {
        let config = BadgeConfig::default();
        let people = vec![
            Attendee { name: AttendeeName::new("Jo", "Li"), company: None },
            Attendee { name: AttendeeName::new("Katherine", "Johnson"), company: None },
            Attendee { name: AttendeeName::new("jo", "li"), company: None },
        ];
        let (_, summary) = run(&config, &people, RunMode::Sheets);
        assert_eq!(summary.exceptions.entries(), ["JO LI".to_string()]);
    }

    #[test]
    fn fixed_palette_colors_every_sheet() {
        let config = BadgeConfig {
            palette: Some("primary".to_string()),
            ..BadgeConfig::default()
        };
        let (canvas, _) = run(&config, &attendees(1), RunMode::Sheets);
        let primary = *PaletteSet::default().get("primary").unwrap();
        assert_eq!(canvas.commands[2], Command::Fill(primary.background));
    }

    #[test]
    fn configured_faces_reach_every_badge() {
        use crate::fonts::{FontBook, LayerFontPaths};

        let font = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts/RobotoMedium.ttf");
        let book = FontBook::load(&LayerFontPaths {
            name: Some(font),
            ..LayerFontPaths::default()
        })
        .unwrap();
        let faces = book.faces();
        let config = BadgeConfig::default();
        let mut generator = Generator::new(&config, book, Some(3)).unwrap().with_faces(faces);
        let mut canvas = RecordingCanvas::new();
        generator.run(&mut canvas, &attendees(3), RunMode::Single).unwrap();

        let external = canvas
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Text { face: Face::External(0), .. }))
            .count();
        // name layer, two lines, three badges
        assert_eq!(external, 6);
    }

    #[test]
    fn unknown_palette_fails_early() {
        let config = BadgeConfig {
            palette: Some("plaid".to_string()),
            ..BadgeConfig::default()
        };
        assert!(Generator::new(&config, AfmMetrics, None).is_err());
    }

    #[test]
    fn empty_roster_is_an_error() {
        let config = BadgeConfig::default();
        let mut generator = Generator::new(&config, AfmMetrics, Some(1)).unwrap();
        let mut canvas = RecordingCanvas::new();
        assert!(generator.run(&mut canvas, &[], RunMode::Single).is_err());
    }

    #[test]
    fn oversized_badge_aborts_sheets() {
        let config = BadgeConfig {
            badge_width: 700.0,
            ..BadgeConfig::default()
        };
        let mut generator = Generator::new(&config, AfmMetrics, Some(1)).unwrap();
        let mut canvas = RecordingCanvas::new();
        let result = generator.run(&mut canvas, &attendees(1), RunMode::Sheets);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
