use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use label_press::batch::{self, NamedDocument};
use label_press::labels::LabelGeometry;
use label_press::records::{self, TipsRecord};
use label_press::{AssetPaths, Resources};

/// Builds print-ready label PDFs from item rows.
///
/// Fonts and backgrounds are looked up under `assets/fonts` and `assets/backgrounds` next to the
/// executable or the crate, unless `LABEL_PRESS_FONTS_DIR` / `LABEL_PRESS_ASSETS_DIR` or the
/// options below point elsewhere.
#[derive(Parser)]
#[command(author, version, about = "Label PDF builder")]
struct Cli {
    /// Directory with the Unbounded font files.
    #[arg(long, global = true)]
    fonts: Option<PathBuf>,

    /// Directory with the background PNGs.
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// JSON file overriding label geometry.
    #[arg(long, global = true)]
    geometry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build bank and box labels from `[type, name, price]` rows.
    Tea {
        /// JSON array of rows.
        #[arg(long)]
        rows: PathBuf,
        /// Output directory.
        #[arg(long, default_value = "labels")]
        out: PathBuf,
    },

    /// Build two-sided product labels from `[name, price, hours]` rows.
    #[command(aliases = ["product"])]
    Products {
        /// JSON array of rows.
        #[arg(long)]
        rows: PathBuf,
        /// Output directory.
        #[arg(long, default_value = "labels")]
        out: PathBuf,
    },

    /// Build a two-sided tips card with a QR code.
    Tips {
        /// Owner's name.
        #[arg(long)]
        name: String,
        /// What the tips are for.
        #[arg(long)]
        goal: String,
        /// Payment link encoded into the QR code.
        #[arg(long)]
        link: String,
        /// Output directory.
        #[arg(long, default_value = "labels")]
        out: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let resources = load_resources(&cli)?;

    let (documents, out) = match cli.command {
        Commands::Tea { rows, out } => {
            let records = records::parse_tea_rows(&read_rows(&rows)?)?;
            (batch::build_tea_batch(&records, &resources)?, out)
        }
        Commands::Products { rows, out } => {
            let records = records::parse_product_rows(&read_rows(&rows)?)?;
            (batch::build_product_batch(&records, &resources)?, out)
        }
        Commands::Tips {
            name,
            goal,
            link,
            out,
        } => {
            let record = TipsRecord::new(&name, &goal, &link)?;
            (vec![batch::tips_document(&record, &resources)?], out)
        }
    };

    write_documents(&documents, &out)
}

fn load_resources(cli: &Cli) -> Result<Resources, Box<dyn Error>> {
    let paths = AssetPaths::resolve(cli.fonts.as_deref(), cli.assets.as_deref())?;

    let mut resources = Resources::load(&paths)?;
    if let Some(path) = &cli.geometry {
        resources = resources.with_geometry(LabelGeometry::from_json_file(path)?);
    }
    Ok(resources)
}

fn read_rows(path: &Path) -> Result<Vec<records::Row>, Box<dyn Error>> {
    let json = fs::read_to_string(path)
        .map_err(|err| format!("failed to read rows from {}: {}", path.display(), err))?;
    Ok(records::rows_from_json(&json)?)
}

fn write_documents(documents: &[NamedDocument], out: &Path) -> Result<(), Box<dyn Error>> {
    for document in documents {
        let path = document.write_to(out)?;
        println!("Wrote {}", path.display());
    }
    println!("{} document(s) in {}", documents.len(), out.display());
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
