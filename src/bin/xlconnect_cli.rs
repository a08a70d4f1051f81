//! CLI tool for xlconnect - writes connected workbooks to disk
//!
//! Usage:
//!   xlconnect_cli query --mashup-file query.pq --name Sales -o sales.xlsx
//!   xlconnect_cli query --mashup 'let Source = 1 in Source' --grid seed.json -o out.xlsx
//!   xlconnect_cli grid data.json --promote-headers -o table.xlsx
//!
//! Grid files hold either a `{"data": [[...]], "config": {...}}` object or a
//! bare array of rows. Set `RUST_LOG=xlconnect=debug` to trace each step.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use xlconnect::{
    generate_single_query_workbook, generate_table_workbook_from_grid, FileConfigs, Grid,
    GridConfig, GridValue, QueryInfo, Result,
};

#[derive(Parser)]
#[command(name = "xlconnect_cli")]
#[command(about = "Generate Excel workbooks connected to a Power Query")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Workbook whose table is loaded by a single query
    Query {
        /// Query body text
        #[arg(long, conflicts_with = "mashup_file", required_unless_present = "mashup_file")]
        mashup: Option<String>,
        /// File holding the query body
        #[arg(long, value_name = "PATH")]
        mashup_file: Option<PathBuf>,
        /// Query name (defaults to Query1)
        #[arg(short, long)]
        name: Option<String>,
        /// Refresh the query when the workbook opens
        #[arg(long)]
        refresh_on_open: bool,
        /// Initial data shown before the first refresh
        #[arg(long, value_name = "JSON")]
        grid: Option<PathBuf>,
        /// Custom template workbook
        #[arg(long, value_name = "XLSX")]
        template: Option<PathBuf>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Workbook holding a grid as a plain table
    Grid {
        /// Grid JSON file
        input: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Use the first grid row as column names
    #[arg(long)]
    promote_headers: bool,
    /// Fail on empty or duplicate headers instead of renaming them
    #[arg(long)]
    keep_column_names: bool,
    /// JSON file with document properties and template settings
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,
    /// Output workbook path
    #[arg(short, long, default_value = "out.xlsx")]
    output: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GridInput {
    Grid(Grid),
    Rows(Vec<Vec<GridValue>>),
}

fn read_grid(path: &Path, common: &CommonArgs) -> Result<Grid> {
    let input: GridInput = serde_json::from_slice(&fs::read(path)?)?;
    let grid = match input {
        GridInput::Grid(grid) => grid,
        GridInput::Rows(rows) => Grid::new(rows),
    };
    // flags only ever turn behavior on
    let config = GridConfig {
        promote_headers: grid.config.promote_headers || common.promote_headers,
        adjust_column_names: grid.config.adjust_column_names && !common.keep_column_names,
    };
    Ok(grid.with_config(config))
}

fn read_configs(common: &CommonArgs) -> Result<FileConfigs> {
    match &common.config {
        Some(path) => Ok(serde_json::from_slice(&fs::read(path)?)?),
        None => Ok(FileConfigs::default()),
    }
}

fn run(cli: Cli) -> Result<PathBuf> {
    match cli.command {
        Command::Query {
            mashup,
            mashup_file,
            name,
            refresh_on_open,
            grid,
            template,
            common,
        } => {
            let body = match (mashup, mashup_file) {
                (Some(text), _) => text,
                (None, Some(path)) => fs::read_to_string(path)?,
                (None, None) => String::new(),
            };
            let mut query = QueryInfo::new(body).with_refresh_on_open(refresh_on_open);
            query.query_name = name;

            let grid = grid.map(|path| read_grid(&path, &common)).transpose()?;
            let mut configs = read_configs(&common)?;
            configs.template_file = template.map(fs::read).transpose()?;

            let bytes = generate_single_query_workbook(&query, grid.as_ref(), &configs)?;
            fs::write(&common.output, bytes)?;
            Ok(common.output)
        }
        Command::Grid { input, common } => {
            let grid = read_grid(&input, &common)?;
            let configs = read_configs(&common)?;
            let bytes = generate_table_workbook_from_grid(&grid, &configs)?;
            fs::write(&common.output, bytes)?;
            Ok(common.output)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(path) => {
            eprintln!("Written: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
