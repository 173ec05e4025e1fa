//! Sheet geometry: how many badges fit, where each one goes, when a new page
//! starts, and where the crop marks are.
//!
//! All coordinates are in points with the origin at the bottom-left corner of
//! the sheet.

use crate::error::AppError;

/// Upper bound on columns or rows; anything beyond is a unit mix-up.
pub const MAX_GRID_SIDE: usize = 1000;

/// The fixed grid of badge slots on one sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetLayout {
    pub sheet_width: f32,
    pub sheet_height: f32,
    pub badge_width: f32,
    pub badge_height: f32,
    pub margin: f32,
    pub cols: usize,
    pub rows: usize,
}

impl SheetLayout {
    /// Fits as many whole badges as possible inside the margins.
    ///
    /// A badge that does not fit even once is a configuration error.
    pub fn new(
        sheet_width: f32,
        sheet_height: f32,
        badge_width: f32,
        badge_height: f32,
        margin: f32,
    ) -> Result<SheetLayout, AppError> {
        let sizes = [sheet_width, sheet_height, badge_width, badge_height, margin];
        if sizes.iter().any(|v| !v.is_finite()) {
            return Err(AppError::ConfigError(format!(
                "sheet {}x{}, badge {}x{} and margin {} must all be finite",
                sheet_width, sheet_height, badge_width, badge_height, margin
            )));
        }
        if badge_width <= 0.0 || badge_height <= 0.0 {
            return Err(AppError::ConfigError(format!(
                "badge size {}x{} must be positive",
                badge_width, badge_height
            )));
        }

        let cols = ((sheet_width - 2.0 * margin) / badge_width).floor();
        let rows = ((sheet_height - 2.0 * margin) / badge_height).floor();
        if !(cols >= 1.0 && rows >= 1.0) {
            return Err(AppError::ConfigError(format!(
                "a {}x{} badge does not fit on a {}x{} sheet with a {} margin",
                badge_width, badge_height, sheet_width, sheet_height, margin
            )));
        }

        if cols > MAX_GRID_SIDE as f32 || rows > MAX_GRID_SIDE as f32 {
            return Err(AppError::ConfigError(format!(
                "a {}x{} grid of badges is more than {} per side",
                cols, rows, MAX_GRID_SIDE
            )));
        }

        Ok(SheetLayout {
            sheet_width,
            sheet_height,
            badge_width,
            badge_height,
            margin,
            cols: cols as usize,
            rows: rows as usize,
        })
    }

    pub fn slots_per_page(&self) -> usize {
        self.cols * self.rows
    }

    /// Width of the area actually covered by badges.
    pub fn live_width(&self) -> f32 {
        self.cols as f32 * self.badge_width
    }

    pub fn live_height(&self) -> f32 {
        self.rows as f32 * self.badge_height
    }

    /// Bottom-left corner of the badge in slot `(row, col)`, rows counted from the top.
    pub fn slot_origin(&self, cursor: TilingCursor) -> (f32, f32) {
        (
            self.margin + cursor.col as f32 * self.badge_width,
            self.sheet_height - self.margin - (cursor.row + 1) as f32 * self.badge_height,
        )
    }

    /// The band behind the live area and its margins, painted before any badge.
    pub fn backdrop(&self) -> Rect {
        let height = self.live_height() + 2.0 * self.margin;
        Rect {
            x: 0.0,
            y: self.sheet_height - height,
            width: self.sheet_width,
            height,
        }
    }

    /// Registration ticks for every grid line, sitting between `margin / 2`
    /// and `margin` outside the live area.
    pub fn crop_marks(&self) -> Vec<Segment> {
        let left = self.margin;
        let right = self.margin + self.live_width();
        let top = self.sheet_height - self.margin;
        let bottom = top - self.live_height();
        let near = self.margin / 2.0;
        let far = self.margin;

        let mut marks = Vec::with_capacity(2 * (self.rows + 1) + 2 * (self.cols + 1));
        for row in 0..=self.rows {
            let y = top - row as f32 * self.badge_height;
            marks.push(Segment::new((left - far, y), (left - near, y)));
            marks.push(Segment::new((right + far, y), (right + near, y)));
        }
        for col in 0..=self.cols {
            let x = left + col as f32 * self.badge_width;
            marks.push(Segment::new((x, top + far), (x, top + near)));
            marks.push(Segment::new((x, bottom - near), (x, bottom - far)));
        }
        marks
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: (f32, f32),
    pub to: (f32, f32),
}

impl Segment {
    pub fn new(from: (f32, f32), to: (f32, f32)) -> Segment {
        Segment { from, to }
    }
}

/// Current slot on the sheet being filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TilingCursor {
    pub row: usize,
    pub col: usize,
}

/// What happened after a badge was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Next badge goes in the next column of the same row.
    Placing,
    /// The row is full; next badge starts the row below.
    RowWrap,
    /// The sheet is full and more badges follow; start a new page.
    PageBreak,
}

/// Moves the cursor past the slot just filled.
///
/// `more_to_place` is false only after the very last badge of the run, so a
/// full final sheet does not produce a trailing empty page.
pub fn advance(
    cursor: TilingCursor,
    layout: &SheetLayout,
    more_to_place: bool,
) -> (TilingCursor, Transition) {
    let col = cursor.col + 1;
    if col < layout.cols {
        return (TilingCursor { row: cursor.row, col }, Transition::Placing);
    }

    let row = cursor.row + 1;
    if row == layout.rows && more_to_place {
        return (TilingCursor::default(), Transition::PageBreak);
    }
    (TilingCursor { row, col: 0 }, Transition::RowWrap)
}

/// Bleed granted to one copy of a duplicated badge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bleed {
    pub left: f32,
    pub right: f32,
}

/// Even copies bleed to the left, odd copies (the folded-over duplicate) to the right.
pub fn bleed_for_copy(copy: usize, amount: f32) -> Bleed {
    if copy % 2 == 0 {
        Bleed {
            left: amount,
            right: 0.0,
        }
    } else {
        Bleed {
            left: 0.0,
            right: amount,
        }
    }
}

/// One badge to draw: where, with what bleed, and whether a new page must be
/// started before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub record: usize,
    pub copy: usize,
    pub page: usize,
    pub slot: TilingCursor,
    pub origin: (f32, f32),
    pub bleed: Bleed,
    pub new_page: bool,
}

/// Streams placements for a run of records, each repeated `multiple` times.
#[derive(Debug, Clone)]
pub struct Tiler {
    layout: SheetLayout,
    multiple: usize,
    bleed: f32,
    cursor: TilingCursor,
    page: usize,
    pending_page: bool,
}

impl Tiler {
    pub fn new(layout: SheetLayout, multiple: usize, bleed: f32) -> Tiler {
        Tiler {
            layout,
            multiple: multiple.max(1),
            bleed,
            cursor: TilingCursor::default(),
            page: 0,
            pending_page: true,
        }
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn cursor(&self) -> TilingCursor {
        self.cursor
    }

    /// Number of pages started so far.
    pub fn pages(&self) -> usize {
        self.page
    }

    /// Places every copy of record `record`; `is_last_record` marks the end of the run.
    pub fn place_record(&mut self, record: usize, is_last_record: bool) -> Vec<Placement> {
        let mut placements = Vec::with_capacity(self.multiple);
        for copy in 0..self.multiple {
            let new_page = std::mem::take(&mut self.pending_page);
            if new_page {
                self.page += 1;
            }

            placements.push(Placement {
                record,
                copy,
                page: self.page,
                slot: self.cursor,
                origin: self.layout.slot_origin(self.cursor),
                bleed: bleed_for_copy(copy, self.bleed),
                new_page,
            });

            let more_to_place = !(is_last_record && copy + 1 == self.multiple);
            let (next, transition) = advance(self.cursor, &self.layout, more_to_place);
            self.cursor = next;
            if transition == Transition::PageBreak {
                self.pending_page = true;
            }
        }
        placements
    }
}
