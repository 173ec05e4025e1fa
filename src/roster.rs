//! Reading attendees from a registration export.

use std::io::Read;
use std::path::Path;

use crate::error::AppError;
use crate::names::AttendeeName;

pub const FIRST_NAME_COLUMN: &str = "First Name";
pub const LAST_NAME_COLUMN: &str = "Last Name";
pub const COMPANY_COLUMN: &str = "Company";

/// One row of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub name: AttendeeName,
    pub company: Option<String>,
}

/// Column positions, looked up by header name.
struct Columns {
    first: usize,
    last: usize,
    company: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Columns, AppError> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
                .ok_or_else(|| AppError::RosterError(format!("missing column \"{}\"", column)))
        };
        Ok(Columns {
            first: find(FIRST_NAME_COLUMN)?,
            last: find(LAST_NAME_COLUMN)?,
            company: find(COMPANY_COLUMN)?,
        })
    }
}

pub fn load_attendees(path: &Path) -> Result<Vec<Attendee>, AppError> {
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::RosterError(format!("{}: {}", path.display(), e)))?;
    read_attendees(file)
}

/// Reads every data row; the first row must be the header.
pub fn read_attendees<R: Read>(reader: R) -> Result<Vec<Attendee>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::RosterError(e.to_string()))?
        .clone();
    let columns = Columns::locate(&headers)?;

    let mut attendees = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| AppError::RosterError(e.to_string()))?;
        let field = |i: usize| {
            record.get(i).ok_or_else(|| {
                // header is line 1
                AppError::RosterError(format!("line {} has only {} fields", index + 2, record.len()))
            })
        };

        let company = field(columns.company)?.trim();
        attendees.push(Attendee {
            name: AttendeeName::new(field(columns.first)?, field(columns.last)?),
            company: if company.is_empty() {
                None
            } else {
                Some(company.to_string())
            },
        });
    }

    Ok(attendees)
}
