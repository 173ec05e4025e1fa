// badgebot: Generate print-ready name badges from an attendee CSV

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use badgebot::canvas::PdfCanvas;
use badgebot::config::BadgeConfig;
use badgebot::document::{Generator, RunMode};
use badgebot::fonts::FontBook;
use badgebot::roster::load_attendees;
use badgebot::AppError;

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate print-ready name badges from an attendee CSV")]
struct Args {
    /// Attendee CSV with "First Name", "Last Name" and "Company" columns
    #[arg(short, long, required_unless_present = "list_palettes")]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "single")]
    format: RunMode,

    /// Output filename (defaults to output/badgebot-output-{format}.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Palette name (random when omitted)
    #[arg(short, long)]
    palette: Option<String>,

    /// Seed for palette and pattern choice
    #[arg(long)]
    seed: Option<u64>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hide the company bar
    #[arg(long)]
    no_company: bool,

    /// Font file for the name layer
    #[arg(long)]
    name_font: Option<PathBuf>,

    /// Font file for the shade and knockout layers
    #[arg(long)]
    shade_font: Option<PathBuf>,

    /// Font file for the shine layer
    #[arg(long)]
    shine_font: Option<PathBuf>,

    /// Also write the linebreak exceptions to this JSON file
    #[arg(long)]
    exceptions: Option<PathBuf>,

    /// Print the available palettes and exit
    #[arg(long)]
    list_palettes: bool,
}

/// Linebreak exceptions written with --exceptions
#[derive(Debug, Serialize)]
struct ExceptionReport<'a> {
    input: String,
    format: &'static str,
    exceptions: &'a [String],
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    // Load config, then let flags override it
    let mut config = match &args.config {
        Some(path) => BadgeConfig::load(path)?,
        None => BadgeConfig::default(),
    };
    if args.palette.is_some() {
        config.palette = args.palette.clone();
    }
    if args.no_company {
        config.show_company = false;
    }
    for (flag, layer) in [
        (&args.name_font, &mut config.fonts.name),
        (&args.shade_font, &mut config.fonts.shade),
        (&args.shine_font, &mut config.fonts.shine),
    ] {
        if flag.is_some() {
            *layer = flag.clone();
        }
    }

    if args.list_palettes {
        for name in config.palette_set().names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| AppError::RosterError("no input file given".to_string()))?;
    let attendees = load_attendees(input)?;
    info!("{} attendee(s) read from {}", attendees.len(), input.display());

    // Determine output filename
    let output_file = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(args.format));

    // Load fonts, then generate PDF
    let fonts = FontBook::load(&config.fonts)?;
    let faces = fonts.faces();
    let mut canvas = PdfCanvas::new(&format!("badgebot {}", args.format.as_str()))?;
    canvas.register_fonts(&fonts)?;
    let mut generator = Generator::new(&config, fonts, args.seed)?.with_faces(faces);
    let summary = generator.run(&mut canvas, &attendees, args.format)?;

    create_parent_dir(&output_file)?;
    canvas.save(&output_file)?;

    println!("✓ Generated: {}", output_file.display());
    println!("  Badges: {}", summary.badges);
    println!("  Pages: {}", summary.pages);
    if summary.exceptions.is_empty() {
        println!("  Linebreak exceptions: none");
    } else {
        println!("  Linebreak exceptions:");
        for name in summary.exceptions.entries() {
            println!("    {}", name.replace('\n', " / "));
        }
    }

    if let Some(path) = &args.exceptions {
        let report = ExceptionReport {
            input: input.display().to_string(),
            format: args.format.as_str(),
            exceptions: summary.exceptions.entries(),
        };
        write_report(path, &report)?;
        println!("  Exceptions written to: {}", path.display());
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "badgebot=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn default_output(format: RunMode) -> PathBuf {
    Path::new("output").join(format!("badgebot-output-{}.pdf", format.as_str()))
}

fn create_parent_dir(path: &Path) -> Result<(), AppError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn write_report(path: &Path, report: &ExceptionReport) -> Result<(), AppError> {
    create_parent_dir(path)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}
