use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::dates::parse_iso_date;

#[derive(Debug, Parser)]
#[command(author, version, about = "Query retail sales dashboards from CSV extracts", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub output: OutputArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load and merge the sources, then report match counts and control values
    Summary,
    /// Monthly revenue per store type and revenue per country over a date range
    GlobalSales(GlobalSalesArgs),
    /// Revenue per subcategory split by customer gender for one category
    Products(ProductsArgs),
    /// Revenue per weekday for one store type
    Channels(ChannelsArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// YAML file describing where the source tables live
    #[arg(long, global = true)]
    pub layout: Option<PathBuf>,
    /// Directory holding the source tables (relative layout entries resolve against it)
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
    /// Directory of transaction partitions
    #[arg(long = "transactions-dir", global = true)]
    pub transactions_dir: Option<PathBuf>,
    /// Customer table
    #[arg(long, global = true)]
    pub customers: Option<PathBuf>,
    /// Country code lookup table
    #[arg(long, global = true)]
    pub countries: Option<PathBuf>,
    /// Product category lookup table
    #[arg(long, global = true)]
    pub categories: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, global = true, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the source files (defaults to utf-8)
    #[arg(long = "input-encoding", global = true)]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Report format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long = "output", global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Debug, Args)]
pub struct GlobalSalesArgs {
    /// First day of the range, YYYY-MM-DD (defaults to the earliest transaction)
    #[arg(long, value_parser = parse_iso_date)]
    pub start: Option<NaiveDate>,
    /// Last day of the range, inclusive (defaults to the latest transaction)
    #[arg(long, value_parser = parse_iso_date)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Product category name (defaults to the first category seen)
    #[arg(short = 'c', long)]
    pub category: Option<String>,
}

#[derive(Debug, Args)]
pub struct ChannelsArgs {
    /// Store type (defaults to the first store type seen)
    #[arg(short = 's', long = "store-type")]
    pub store_type: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
