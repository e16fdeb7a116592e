//! Towerdoc CLI - Convert tower occupancy CSV files to nested JSON
//!
//! ```bash
//! towerdoc convert towers.csv              # Write tower_data.json
//! towerdoc convert towers.csv -o out       # Write out.json
//! towerdoc check towers.csv                # Check required columns only
//! towerdoc normalize "Tower A" B           # Show normalized tower keys
//! towerdoc validate tower_data.json        # Validate a document
//! towerdoc serve                           # Start HTTP server (port 3000)
//! ```

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use towerdoc::{
    convert_file, normalize, output_path, parse_csv_file_auto, validate_columns,
    validate_document, write_document, ConvertOptions, RowSource, SchemaError, REQUIRED_COLUMNS,
};

#[derive(Parser)]
#[command(name = "towerdoc")]
#[command(about = "Convert tower occupancy CSV files to nested tower/floor JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV file to the tower JSON document
    Convert {
        /// Input CSV file
        input: PathBuf,

        /// Output file name (".json" is added if missing; "-" for stdout)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Check that a CSV file has the required columns
    Check {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Print the normalized key for each tower label
    Normalize {
        /// Raw tower labels
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Validate a JSON document against the tower document schema
    Validate {
        /// Input JSON file
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "TOWERDOC_PORT", default_value = "3000")]
        port: u16,

        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(Args)]
struct OptionArgs {
    /// Minimum similarity (0.0-1.0) for column name suggestions
    #[arg(long, env = "TOWERDOC_SIMILARITY_THRESHOLD", default_value = "0.7")]
    similarity_threshold: f64,

    /// Compare column names case-sensitively when suggesting
    #[arg(long)]
    case_sensitive: bool,

    /// Drop empty company names left by stray commas
    #[arg(long)]
    skip_empty_companies: bool,
}

impl From<OptionArgs> for ConvertOptions {
    fn from(args: OptionArgs) -> Self {
        ConvertOptions {
            similarity_threshold: args.similarity_threshold,
            ignore_case: !args.case_sensitive,
            skip_empty_companies: args.skip_empty_companies,
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { input, output, options } => {
            cmd_convert(&input, output.as_deref(), options.into())
        }
        Commands::Check { input, options } => cmd_check(&input, options.into()),
        Commands::Normalize { labels } => cmd_normalize(&labels),
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Serve { port, options } => cmd_serve(port, options.into()).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&str>,
    options: ConvertOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = convert_file(input, &options)?;

    if output == Some("-") {
        println!("{}", result.document.to_json()?);
        return Ok(());
    }

    let path = output_path(output);
    write_document(&result.document, &path)?;
    Ok(())
}

fn cmd_check(input: &Path, options: ConvertOptions) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔎 Checking columns: {}", input.display());

    let parsed = parse_csv_file_auto(input)?;
    eprintln!("   Columns: {}", parsed.columns().join(", "));

    match validate_columns(&parsed.headers, &REQUIRED_COLUMNS, &options.similarity()) {
        Ok(()) => {
            eprintln!("✅ All required columns present ({} rows)", parsed.records.len());
            Ok(())
        }
        Err(err) => {
            print_schema_error(&err);
            Err(err.into())
        }
    }
}

fn print_schema_error(err: &SchemaError) {
    for missing in err.missing() {
        match &missing.suggestion {
            Some(s) => eprintln!("   ❌ Missing '{}' - did you mean '{}'?", missing.field, s),
            None => eprintln!("   ❌ Missing '{}'", missing.field),
        }
    }
}

fn cmd_normalize(labels: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for label in labels {
        println!("{}", normalize(label));
    }
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let document: Value = serde_json::from_str(&content)?;

    match validate_document(&document) {
        Ok(()) => {
            let towers = document.as_array().map_or(0, |a| a.len());
            eprintln!("✅ Valid document ({} towers)", towers);
            Ok(())
        }
        Err(errors) => {
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            Err(format!("{} schema violation(s)", errors.len()).into())
        }
    }
}

async fn cmd_serve(port: u16, options: ConvertOptions) -> Result<(), Box<dyn std::error::Error>> {
    towerdoc::server::start_server(port, options).await?;
    Ok(())
}
