//! Builds the denormalized sales table from the base tables.
//!
//! All three joins are left joins from the transaction table, so the merged
//! table always has exactly one row per transaction. Lookup tables are
//! deduplicated by their join key first (first occurrence wins) so that a
//! catalog with one row per subcategory cannot multiply transactions.

use std::collections::HashMap;

use chrono::{NaiveDate, Weekday};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    loader::BaseTables,
    records::{CountryRecord, CustomerRecord, ProductCategoryRecord, TransactionRecord},
};

/// One transaction with its lookup attributes attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub transaction_id: String,
    pub customer_id: String,
    pub product_category_code: String,
    pub product_subcategory_code: String,
    pub store_type: String,
    pub transaction_date: NaiveDate,
    pub day_of_week: Weekday,
    pub quantity: Option<i64>,
    pub total_amount: Decimal,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
}

impl SalesRow {
    /// Whether the row counts toward revenue (returns and zero rows do not).
    pub fn is_sale(&self) -> bool {
        self.total_amount > Decimal::ZERO
    }
}

/// Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct MergedSalesTable {
    rows: Vec<SalesRow>,
}

impl MergedSalesTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SalesRow> {
        self.rows.iter()
    }
}

impl FromIterator<SalesRow> for MergedSalesTable {
    fn from_iter<I: IntoIterator<Item = SalesRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// How many rows each join matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub rows: usize,
    pub category_matches: usize,
    pub subcategory_matches: usize,
    pub customer_matches: usize,
    pub country_matches: usize,
}

#[derive(Debug, Clone)]
struct CustomerAttributes {
    gender: Option<String>,
    country: Option<String>,
}

pub fn merge(base: &BaseTables) -> (MergedSalesTable, MergeStats) {
    let categories = first_by_key(&base.product_categories, |row| {
        (&row.product_category_code, &row.category_name)
    });
    let subcategories = first_by_key(&base.product_categories, |row| {
        (&row.product_subcategory_code, &row.subcategory_name)
    });
    let customers = customer_lookup(&base.customers, &base.countries);

    let mut stats = MergeStats {
        rows: base.transactions.len(),
        ..MergeStats::default()
    };
    let rows = base
        .transactions
        .iter()
        .map(|tx| {
            let category = categories.get(tx.product_category_code.as_str()).cloned();
            let subcategory = subcategories
                .get(tx.product_subcategory_code.as_str())
                .cloned();
            let customer = customers.get(tx.customer_id.as_str());
            stats.category_matches += usize::from(category.is_some());
            stats.subcategory_matches += usize::from(subcategory.is_some());
            stats.customer_matches += usize::from(customer.is_some());
            stats.country_matches +=
                usize::from(customer.is_some_and(|c| c.country.is_some()));
            if customer.is_none() {
                debug!(
                    "Transaction {} references unknown customer {}",
                    tx.transaction_id, tx.customer_id
                );
            }
            sales_row(tx, category, subcategory, customer)
        })
        .collect::<MergedSalesTable>();

    info!(
        "Merged {} row(s): {} category, {} subcategory, {} customer, {} country match(es)",
        stats.rows,
        stats.category_matches,
        stats.subcategory_matches,
        stats.customer_matches,
        stats.country_matches
    );
    (rows, stats)
}

fn sales_row(
    tx: &TransactionRecord,
    category: Option<String>,
    subcategory: Option<String>,
    customer: Option<&CustomerAttributes>,
) -> SalesRow {
    SalesRow {
        transaction_id: tx.transaction_id.clone(),
        customer_id: tx.customer_id.clone(),
        product_category_code: tx.product_category_code.clone(),
        product_subcategory_code: tx.product_subcategory_code.clone(),
        store_type: tx.store_type.clone(),
        transaction_date: tx.transaction_date,
        day_of_week: tx.day_of_week,
        quantity: tx.quantity,
        total_amount: tx.total_amount,
        category,
        subcategory,
        gender: customer.and_then(|c| c.gender.clone()),
        country: customer.and_then(|c| c.country.clone()),
    }
}

/// Key → value map keeping the first row seen for each key.
fn first_by_key<'a, F>(rows: &'a [ProductCategoryRecord], pick: F) -> HashMap<&'a str, String>
where
    F: Fn(&'a ProductCategoryRecord) -> (&'a String, &'a String),
{
    let mut map = HashMap::new();
    for row in rows {
        let (key, value) = pick(row);
        map.entry(key.as_str()).or_insert_with(|| value.clone());
    }
    map
}

fn customer_lookup<'a>(
    customers: &'a [CustomerRecord],
    countries: &[CountryRecord],
) -> HashMap<&'a str, CustomerAttributes> {
    let mut country_names: HashMap<&str, &str> = HashMap::with_capacity(countries.len());
    for country in countries {
        country_names
            .entry(country.country_code.as_str())
            .or_insert(country.country_name.as_str());
    }

    let mut lookup = HashMap::with_capacity(customers.len());
    for customer in customers {
        lookup
            .entry(customer.customer_id.as_str())
            .or_insert_with(|| CustomerAttributes {
                gender: customer.gender.clone(),
                country: country_names
                    .get(customer.country_code.as_str())
                    .map(|name| name.to_string()),
            });
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(cat: &str, cat_name: &str, sub: &str, sub_name: &str) -> ProductCategoryRecord {
        ProductCategoryRecord {
            product_category_code: cat.to_string(),
            category_name: cat_name.to_string(),
            product_subcategory_code: sub.to_string(),
            subcategory_name: sub_name.to_string(),
        }
    }

    #[test]
    fn first_occurrence_wins_for_duplicate_codes() {
        let rows = vec![
            catalog("1", "Clothing", "4", "Mens"),
            catalog("1", "Clothing-dup", "1", "Women"),
            catalog("2", "Footwear", "4", "Kids"),
        ];
        let categories = first_by_key(&rows, |r| (&r.product_category_code, &r.category_name));
        let subcategories =
            first_by_key(&rows, |r| (&r.product_subcategory_code, &r.subcategory_name));
        assert_eq!(categories.len(), 2);
        assert_eq!(categories["1"], "Clothing");
        assert_eq!(subcategories["4"], "Mens");
    }

    #[test]
    fn customer_without_country_match_keeps_gender() {
        let customers = vec![CustomerRecord {
            customer_id: "7".to_string(),
            country_code: "99".to_string(),
            gender: Some("F".to_string()),
            date_of_birth: None,
            city_code: None,
        }];
        let lookup = customer_lookup(&customers, &[]);
        assert_eq!(lookup["7"].gender.as_deref(), Some("F"));
        assert_eq!(lookup["7"].country, None);
    }
}
