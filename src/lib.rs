pub mod aggregate;
pub mod cli;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod io_utils;
pub mod layout;
pub mod loader;
pub mod merge;
pub mod records;
pub mod report;
pub mod source;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, SourceArgs},
    dashboard::{Dashboard, TabQuery},
    layout::SourceLayout,
    loader::ReadOptions,
    report::Summary,
    source::DirectorySource,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sales_dashboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let layout = resolve_layout(&cli.source)?;
    let options = read_options(&cli.source, &layout)?;
    info!(
        "Loading sources from {:?} with delimiter '{}'",
        layout.data_dir,
        options
            .delimiter
            .map(printable_delimiter)
            .unwrap_or_else(|| "auto".to_string())
    );
    let dashboard = Dashboard::load(&DirectorySource::new(layout), options)?;

    let output = cli.output.output.as_deref();
    let format = cli.output.format;
    let query = match cli.command {
        Commands::Summary => {
            let summary = Summary {
                merge: dashboard.merge_stats(),
                options: dashboard.control_options(),
            };
            return report::write_summary(&summary, format, output);
        }
        Commands::GlobalSales(args) => TabQuery::GlobalSales {
            start: args.start,
            end: args.end,
        },
        Commands::Products(args) => TabQuery::Products {
            category: args.category,
        },
        Commands::Channels(args) => TabQuery::SalesChannels {
            store_type: args.store_type,
        },
    };
    let view = dashboard.render(&query);
    report::write_view(&view, format, output)
}

/// Layout file first, then individual flags on top.
pub fn resolve_layout(args: &SourceArgs) -> Result<SourceLayout> {
    let mut layout = match &args.layout {
        Some(path) => SourceLayout::load(path)
            .with_context(|| format!("Loading layout from {path:?}"))?,
        None => SourceLayout::default(),
    };
    if let Some(dir) = &args.data_dir {
        layout.data_dir = dir.clone();
    }
    if let Some(dir) = &args.transactions_dir {
        layout.transactions_dir = dir.clone();
    }
    if let Some(path) = &args.customers {
        layout.customers = path.clone();
    }
    if let Some(path) = &args.countries {
        layout.countries = path.clone();
    }
    if let Some(path) = &args.categories {
        layout.product_categories = path.clone();
    }
    if let Some(label) = &args.input_encoding {
        layout.encoding = Some(label.clone());
    }
    if let Some(delimiter) = args.delimiter {
        layout.delimiter = Some(delimiter as char);
    }
    debug!("Resolved source layout: {:?}", layout);
    Ok(layout)
}

fn read_options(args: &SourceArgs, layout: &SourceLayout) -> Result<ReadOptions> {
    let encoding = io_utils::resolve_encoding(layout.encoding.as_deref())?;
    Ok(ReadOptions {
        delimiter: args.delimiter.or_else(|| layout.delimiter_byte()),
        encoding,
    })
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
