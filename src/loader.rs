//! Reads the four base tables from a [`TableSource`].

use std::collections::HashMap;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, info, warn};

use crate::{
    io_utils,
    records::{
        CountryRecord, CustomerRecord, HeaderMap, ProductCategoryRecord, RawRow, SourceRecord,
        TransactionRecord,
    },
    source::{SourceFile, TableSource},
};

#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: encoding_rs::UTF_8,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BaseTables {
    pub transactions: Vec<TransactionRecord>,
    pub customers: Vec<CustomerRecord>,
    pub countries: Vec<CountryRecord>,
    pub product_categories: Vec<ProductCategoryRecord>,
}

pub fn load_base_tables(source: &dyn TableSource, options: ReadOptions) -> Result<BaseTables> {
    let transactions = load_transactions(source, options)?;
    let customers = load_table::<CustomerRecord>(source, options)?;
    let countries = load_table::<CountryRecord>(source, options)?;
    let product_categories = load_table::<ProductCategoryRecord>(source, options)?;
    info!(
        "Loaded {} transaction(s), {} customer(s), {} country code(s), {} catalog row(s)",
        transactions.len(),
        customers.len(),
        countries.len(),
        product_categories.len()
    );
    Ok(BaseTables {
        transactions,
        customers,
        countries,
        product_categories,
    })
}

/// Concatenates every transaction partition in source order.
///
/// Ids repeated across partitions are kept; the count is logged as a warning.
pub fn load_transactions(
    source: &dyn TableSource,
    options: ReadOptions,
) -> Result<Vec<TransactionRecord>> {
    let transactions = load_table::<TransactionRecord>(source, options)?;

    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(transactions.len());
    for record in &transactions {
        *seen.entry(record.transaction_id.as_str()).or_insert(0) += 1;
    }
    let repeated = seen.values().filter(|count| **count > 1).count();
    if repeated > 0 {
        warn!(
            "{} transaction id(s) appear more than once across partitions; every copy is counted",
            repeated
        );
    }
    Ok(transactions)
}

pub fn load_table<T: SourceRecord>(source: &dyn TableSource, options: ReadOptions) -> Result<Vec<T>> {
    let table = T::TABLE;
    let files = source
        .open(table)
        .with_context(|| format!("Opening {table} source"))?;
    let mut rows = Vec::new();
    for file in files {
        let before = rows.len();
        let name = file.name.clone();
        read_partition(file, options, &mut rows)
            .with_context(|| format!("Loading {table} from '{name}'"))?;
        debug!("Read {} row(s) from '{}'", rows.len() - before, name);
    }
    Ok(rows)
}

fn read_partition<T: SourceRecord>(
    file: SourceFile,
    options: ReadOptions,
    out: &mut Vec<T>,
) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&file.name, options.delimiter);
    let mut reader = io_utils::open_csv_reader(file.reader, delimiter);
    let headers = io_utils::reader_headers(&mut reader, options.encoding)?;
    let header_map = HeaderMap::new(&file.name, &headers);
    let columns = T::bind(&header_map)?;

    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, options.encoding)?;
        let row = RawRow {
            source_name: header_map.source_name(),
            row: row_idx + 2,
            fields: &decoded,
        };
        out.push(T::from_row(&columns, &row)?);
    }
    Ok(())
}
