//! badgebot: print-ready name badges from an attendee CSV.

pub mod badge;
pub mod canvas;
pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod fit;
pub mod fonts;
pub mod linebreak;
pub mod metrics;
pub mod names;
pub mod palette;
pub mod roster;
pub mod tiling;

pub use error::AppError;
