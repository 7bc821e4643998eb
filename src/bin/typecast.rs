use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use typecast::{
    InferenceOptions, InferenceResponse, OverrideRequest, RenderOptions, Table, TypecastError,
    apply_overrides, infer_table,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Typecast infers column types of tabular uploads and re-casts them on demand.", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Infer a type for every column of a CSV or Excel file.
    Infer {
        #[arg(short = 'p', long = "path", required = true)]
        path: PathBuf,
        #[arg(short = 'n', long = "preview-rows", default_value_t = 5)]
        preview_rows: usize,
        #[arg(long = "categorical-threshold", default_value_t = 0.5)]
        categorical_threshold: f64,
        #[arg(long = "categorical-min-count", default_value_t = 10)]
        categorical_min_count: usize,
        /// Include per-column type options in the output.
        #[arg(long)]
        report: bool,
    },
    /// Apply type overrides from a JSON request to its rows.
    Update {
        #[arg(short = 'r', long = "request", required = true)]
        request: PathBuf,
    },
}

fn main() -> Result<(), TypecastError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let response = match args.command {
        Command::Infer {
            path,
            preview_rows,
            categorical_threshold,
            categorical_min_count,
            report,
        } => {
            let options = InferenceOptions {
                categorical_threshold,
                categorical_min_count,
                ..InferenceOptions::default()
            };
            info!("reading {}", path.display());
            let table = Table::from_path(&path)?;
            let inferred = infer_table(&table, &options)?;
            InferenceResponse::from_table(
                &inferred,
                &RenderOptions {
                    preview_rows: Some(preview_rows),
                    report,
                },
            )
        }
        Command::Update { request } => {
            let file = std::fs::File::open(&request)?;
            let request: OverrideRequest = serde_json::from_reader(std::io::BufReader::new(file))?;
            let table = apply_overrides(&request)?;
            InferenceResponse::from_table(
                &table,
                &RenderOptions {
                    preview_rows: None,
                    report: false,
                },
            )
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
