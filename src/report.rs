//! Turns dashboard views into text tables, long-form CSV or JSON.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    cli::OutputFormat,
    dashboard::{ControlOptions, TabView},
    dates::weekday_name,
    io_utils,
    merge::MergeStats,
    table,
};

const LONG_HEADERS: [&str; 4] = ["section", "key", "series", "value"];

/// A titled block of a text report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Section {
    fn new(title: &str, headers: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub merge: MergeStats,
    pub options: ControlOptions,
}

/// Hover label used on the revenue chart: thousands with two decimals.
pub fn format_thousands(amount: Decimal) -> String {
    format!("{:.2}k", (amount / Decimal::ONE_THOUSAND).round_dp(2))
}

pub fn view_sections(view: &TabView) -> Vec<Section> {
    match view {
        TabView::GlobalSales {
            range,
            revenue_by_channel,
            revenue_by_country,
        } => {
            let mut channels = Section::new("Revenue", &["month", "store_type", "amount", "label"]);
            if let Some(range) = range {
                channels.title = format!("Revenue {} to {}", range.start, range.end);
            }
            for (channel, points) in revenue_by_channel {
                for (month, amount) in points {
                    channels.rows.push(vec![
                        month.to_string(),
                        channel.clone(),
                        amount.to_string(),
                        format_thousands(*amount),
                    ]);
                }
            }
            channels.rows.sort();
            let mut countries = Section::new("Sales Map", &["country", "amount"]);
            countries.rows = revenue_by_country
                .iter()
                .map(|(country, amount)| vec![country.clone(), amount.to_string()])
                .collect();
            vec![channels, countries]
        }
        TabView::Products {
            category,
            subcategories,
        } => {
            let title = match category {
                Some(name) => format!("Revenue by subcategory: {name}"),
                None => "Revenue by subcategory".to_string(),
            };
            let mut section = Section::new(&title, &["subcategory", "F", "M", "total"]);
            section.rows = subcategories
                .iter()
                .map(|s| {
                    vec![
                        s.subcategory.clone(),
                        s.female.to_string(),
                        s.male.to_string(),
                        s.total.to_string(),
                    ]
                })
                .collect();
            vec![section]
        }
        TabView::SalesChannels { store_type, days } => {
            let title = format!(
                "Sales by Day of Week for {}",
                store_type.as_deref().unwrap_or("-")
            );
            let mut section = Section::new(&title, &["day", "amount"]);
            section.rows = days
                .iter()
                .map(|d| vec![weekday_name(d.day).to_string(), d.amount.to_string()])
                .collect();
            vec![section]
        }
    }
}

/// Rows of `[section, key, series, value]`, one per plotted point.
pub fn long_rows(view: &TabView) -> Vec<[String; 4]> {
    let mut rows = Vec::new();
    match view {
        TabView::GlobalSales {
            revenue_by_channel,
            revenue_by_country,
            ..
        } => {
            for (channel, points) in revenue_by_channel {
                for (month, amount) in points {
                    rows.push([
                        "revenue_by_channel".to_string(),
                        month.to_string(),
                        channel.clone(),
                        amount.to_string(),
                    ]);
                }
            }
            for (country, amount) in revenue_by_country {
                rows.push([
                    "revenue_by_country".to_string(),
                    country.clone(),
                    String::new(),
                    amount.to_string(),
                ]);
            }
        }
        TabView::Products { subcategories, .. } => {
            for s in subcategories {
                for (series, amount) in [("F", s.female), ("M", s.male)] {
                    rows.push([
                        "subcategories".to_string(),
                        s.subcategory.clone(),
                        series.to_string(),
                        amount.to_string(),
                    ]);
                }
            }
        }
        TabView::SalesChannels { store_type, days } => {
            for d in days {
                rows.push([
                    "days".to_string(),
                    weekday_name(d.day).to_string(),
                    store_type.clone().unwrap_or_default(),
                    d.amount.to_string(),
                ]);
            }
        }
    }
    rows
}

pub fn summary_sections(summary: &Summary) -> Vec<Section> {
    let stats = &summary.merge;
    let mut counts = Section::new("Merged table", &["measure", "rows"]);
    for (label, value) in [
        ("transactions", stats.rows),
        ("category matches", stats.category_matches),
        ("subcategory matches", stats.subcategory_matches),
        ("customer matches", stats.customer_matches),
        ("country matches", stats.country_matches),
    ] {
        counts.rows.push(vec![label.to_string(), value.to_string()]);
    }

    let mut options = Section::new("Controls", &["control", "value"]);
    if let Some(bounds) = summary.options.date_bounds {
        options
            .rows
            .push(vec!["first date".to_string(), bounds.start.to_string()]);
        options
            .rows
            .push(vec!["last date".to_string(), bounds.end.to_string()]);
    }
    for category in &summary.options.categories {
        options
            .rows
            .push(vec!["category".to_string(), category.clone()]);
    }
    for store_type in &summary.options.store_types {
        options
            .rows
            .push(vec!["store type".to_string(), store_type.clone()]);
    }
    vec![counts, options]
}

pub fn render_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| format!("{}\n\n{}", s.title, table::render_table(&s.headers, &s.rows)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn write_view(view: &TabView, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Table => write_text(&render_sections(&view_sections(view)), output),
        OutputFormat::Json => write_json(view, output),
        OutputFormat::Csv => {
            let mut writer = io_utils::open_csv_writer(output, b',')?;
            writer
                .write_record(LONG_HEADERS)
                .context("Writing report headers")?;
            for row in long_rows(view) {
                writer.write_record(&row).context("Writing report row")?;
            }
            writer.flush().context("Flushing report output")?;
            Ok(())
        }
    }
}

pub fn write_summary(summary: &Summary, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(summary, output),
        OutputFormat::Table | OutputFormat::Csv => {
            write_text(&render_sections(&summary_sections(summary)), output)
        }
    }
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let mut writer = open_output(output)?;
    serde_json::to_writer_pretty(&mut writer, value).context("Writing JSON report")?;
    writeln!(writer).context("Writing JSON report")?;
    writer.flush().context("Flushing report output")
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    let mut writer = open_output(output)?;
    writer
        .write_all(text.as_bytes())
        .context("Writing report")?;
    writer.flush().context("Flushing report output")
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) if !io_utils::is_dash(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    })
}
