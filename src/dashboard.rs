//! The application context: owns the merged table and answers tab queries.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

use crate::{
    aggregate::{
        self, ChannelSeries, CountrySeries, DateRange, SubcategoryRevenue, WeekdayRevenue,
    },
    loader::{self, ReadOptions},
    merge::{self, MergeStats, MergedSalesTable},
    source::TableSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    GlobalSales,
    Products,
    SalesChannels,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::GlobalSales => "Global Sales",
            Tab::Products => "Products",
            Tab::SalesChannels => "Sales Channels",
        }
    }
}

/// A tab plus the values of its controls. `None` means the control's default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabQuery {
    GlobalSales {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    Products {
        category: Option<String>,
    },
    SalesChannels {
        store_type: Option<String>,
    },
}

impl TabQuery {
    pub fn tab(&self) -> Tab {
        match self {
            TabQuery::GlobalSales { .. } => Tab::GlobalSales,
            TabQuery::Products { .. } => Tab::Products,
            TabQuery::SalesChannels { .. } => Tab::SalesChannels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", rename_all = "kebab-case")]
pub enum TabView {
    GlobalSales {
        range: Option<DateRange>,
        revenue_by_channel: ChannelSeries,
        revenue_by_country: CountrySeries,
    },
    Products {
        category: Option<String>,
        subcategories: Vec<SubcategoryRevenue>,
    },
    SalesChannels {
        store_type: Option<String>,
        days: [WeekdayRevenue; 7],
    },
}

/// Values a front end needs to populate its controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlOptions {
    pub date_bounds: Option<DateRange>,
    pub categories: Vec<String>,
    pub store_types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    table: MergedSalesTable,
    stats: MergeStats,
}

impl Dashboard {
    /// Loads and merges every source table. Any ingestion error is fatal.
    pub fn load(source: &dyn TableSource, options: ReadOptions) -> Result<Self> {
        let base = loader::load_base_tables(source, options).context("Loading source tables")?;
        let (table, stats) = merge::merge(&base);
        info!("Dashboard ready with {} sales row(s)", table.len());
        Ok(Self { table, stats })
    }

    pub fn from_table(table: MergedSalesTable) -> Self {
        let stats = MergeStats {
            rows: table.len(),
            ..MergeStats::default()
        };
        Self { table, stats }
    }

    pub fn table(&self) -> &MergedSalesTable {
        &self.table
    }

    pub fn merge_stats(&self) -> MergeStats {
        self.stats
    }

    pub fn control_options(&self) -> ControlOptions {
        ControlOptions {
            date_bounds: aggregate::date_bounds(&self.table),
            categories: aggregate::categories(&self.table),
            store_types: aggregate::store_types(&self.table),
        }
    }

    pub fn render(&self, query: &TabQuery) -> TabView {
        debug!("Rendering {} with {:?}", query.tab().title(), query);
        match query {
            TabQuery::GlobalSales { start, end } => {
                let range = self.resolve_range(*start, *end);
                let (revenue_by_channel, revenue_by_country) = match range {
                    Some(range) => (
                        aggregate::revenue_by_period_and_channel(&self.table, range),
                        aggregate::revenue_by_country(&self.table, range),
                    ),
                    None => (ChannelSeries::new(), CountrySeries::new()),
                };
                TabView::GlobalSales {
                    range,
                    revenue_by_channel,
                    revenue_by_country,
                }
            }
            TabQuery::Products { category } => {
                let category = category
                    .clone()
                    .or_else(|| aggregate::categories(&self.table).into_iter().next());
                let subcategories = category
                    .as_deref()
                    .map(|name| aggregate::revenue_by_subcategory_and_gender(&self.table, name))
                    .unwrap_or_default();
                TabView::Products {
                    category,
                    subcategories,
                }
            }
            TabQuery::SalesChannels { store_type } => {
                let store_type = store_type
                    .clone()
                    .or_else(|| aggregate::store_types(&self.table).into_iter().next());
                let days = aggregate::revenue_by_day_of_week(
                    &self.table,
                    store_type.as_deref().unwrap_or_default(),
                );
                TabView::SalesChannels { store_type, days }
            }
        }
    }

    // Missing ends fall back to the table's own date bounds.
    fn resolve_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<DateRange> {
        let bounds = aggregate::date_bounds(&self.table);
        let start = start.or(bounds.map(|b| b.start))?;
        let end = end.or(bounds.map(|b| b.end))?;
        Some(DateRange::new(start, end))
    }
}
