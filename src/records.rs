//! Typed rows for the four source tables and the header lookup that binds
//! source columns to record fields.
//!
//! Header names are resolved once per partition; rows are then parsed by
//! index. A required field with no matching header is a [`LoadError`].

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::{dates::parse_transaction_date, error::LoadError, source::SourceTable};

/// A record type that can be read from a source table.
pub trait SourceRecord: Sized {
    const TABLE: SourceTable;
    type Columns;

    /// Binds header positions once per partition.
    fn bind(headers: &HeaderMap) -> Result<Self::Columns, LoadError>;

    fn from_row(columns: &Self::Columns, row: &RawRow<'_>) -> Result<Self, LoadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub customer_id: String,
    pub product_category_code: String,
    pub product_subcategory_code: String,
    pub store_type: String,
    pub transaction_date: NaiveDate,
    pub day_of_week: Weekday,
    // Quantity, rate and tax are checked on load; revenue uses only the total.
    pub quantity: Option<i64>,
    pub rate: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub country_code: String,
    pub gender: Option<String>,
    // Validated on load; the merged table does not carry them.
    pub date_of_birth: Option<NaiveDate>,
    pub city_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRecord {
    pub country_code: String,
    pub country_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCategoryRecord {
    pub product_category_code: String,
    pub category_name: String,
    pub product_subcategory_code: String,
    pub subcategory_name: String,
}

/// Largest accepted `|total_amount|`. Summing every row of any table that
/// fits in memory stays well inside the `Decimal` range.
pub const MAX_TRANSACTION_AMOUNT: i64 = 1_000_000_000_000_000;

/// Field name plus the source headers that may carry it.
pub type FieldSpec = (&'static str, &'static [&'static str]);

const TRANSACTION_ID: FieldSpec = ("transaction_id", &["transaction_id"]);
const TRANSACTION_CUSTOMER: FieldSpec = ("customer_id", &["cust_id", "customer_id"]);
const TRANSACTION_DATE: FieldSpec = ("transaction_date", &["tran_date", "transaction_date"]);
const SUBCATEGORY_CODE: FieldSpec = (
    "product_subcategory_code",
    &["prod_subcat_code", "prod_sub_cat_code"],
);
const CATEGORY_CODE: FieldSpec = ("product_category_code", &["prod_cat_code"]);
const QUANTITY: FieldSpec = ("quantity", &["qty", "quantity"]);
const RATE: FieldSpec = ("rate", &["rate"]);
const TAX: FieldSpec = ("tax", &["tax"]);
const TOTAL_AMOUNT: FieldSpec = ("total_amount", &["total_amt", "total_amount"]);
const STORE_TYPE: FieldSpec = ("store_type", &["store_type"]);

const CUSTOMER_ID: FieldSpec = ("customer_id", &["customer_id"]);
const DATE_OF_BIRTH: FieldSpec = ("date_of_birth", &["dob", "date_of_birth"]);
const GENDER: FieldSpec = ("gender", &["gender"]);
const CITY_CODE: FieldSpec = ("city_code", &["city_code"]);
const COUNTRY_CODE: FieldSpec = ("country_code", &["country_code"]);
const COUNTRY_NAME: FieldSpec = ("country_name", &["country", "country_name"]);

const CATEGORY_NAME: FieldSpec = ("category_name", &["prod_cat"]);
const SUBCATEGORY_NAME: FieldSpec = ("subcategory_name", &["prod_subcat"]);

/// Header positions of one source partition.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    source_name: String,
    headers: Vec<String>,
}

impl HeaderMap {
    pub fn new(source_name: &str, headers: &[String]) -> Self {
        Self {
            source_name: source_name.to_string(),
            headers: headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect(),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn find(&self, (_, accepted): FieldSpec) -> Option<usize> {
        accepted
            .iter()
            .find_map(|name| self.headers.iter().position(|h| h == name))
    }

    pub fn require(&self, spec: FieldSpec) -> Result<usize, LoadError> {
        self.find(spec).ok_or_else(|| LoadError::MissingColumn {
            source_name: self.source_name.clone(),
            field: spec.0,
            accepted: spec.1.join(", "),
        })
    }

    /// Position of the first named column, skipping an unnamed export index.
    pub fn first_named(&self) -> Option<usize> {
        self.headers.iter().position(|h| !h.is_empty())
    }
}

/// A raw row being converted into a record; carries position for diagnostics.
pub struct RawRow<'a> {
    pub source_name: &'a str,
    pub row: usize,
    pub fields: &'a [String],
}

impl RawRow<'_> {
    fn text(&self, idx: usize) -> &str {
        self.fields.get(idx).map(|s| s.trim()).unwrap_or("")
    }

    fn owned(&self, idx: usize) -> String {
        self.text(idx).to_string()
    }

    fn optional(&self, idx: Option<usize>) -> Option<String> {
        idx.map(|i| self.text(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn parse<T: FromStr>(&self, idx: usize, field: &'static str) -> Result<T, LoadError> {
        let raw = self.text(idx);
        raw.parse::<T>().map_err(|_| self.invalid(field, raw))
    }

    fn parse_optional<T: FromStr>(
        &self,
        idx: Option<usize>,
        field: &'static str,
    ) -> Result<Option<T>, LoadError> {
        match self.optional(idx) {
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| self.invalid(field, &raw)),
            None => Ok(None),
        }
    }

    fn date(&self, idx: usize, field: &'static str) -> Result<NaiveDate, LoadError> {
        parse_transaction_date(self.text(idx)).map_err(|error| LoadError::MalformedDate {
            source_name: self.source_name.to_string(),
            row: self.row,
            field,
            error,
        })
    }

    fn invalid(&self, field: &'static str, value: &str) -> LoadError {
        LoadError::InvalidValue {
            source_name: self.source_name.to_string(),
            row: self.row,
            field,
            value: value.to_string(),
        }
    }
}

/// Column positions for transaction partitions.
#[derive(Debug, Clone, Copy)]
pub struct TransactionColumns {
    transaction_id: usize,
    customer_id: usize,
    date: usize,
    subcategory_code: usize,
    category_code: usize,
    quantity: Option<usize>,
    rate: Option<usize>,
    tax: Option<usize>,
    total_amount: usize,
    store_type: usize,
}

impl TransactionColumns {
    pub fn resolve(headers: &HeaderMap) -> Result<Self, LoadError> {
        Ok(Self {
            transaction_id: headers.require(TRANSACTION_ID)?,
            customer_id: headers.require(TRANSACTION_CUSTOMER)?,
            date: headers.require(TRANSACTION_DATE)?,
            subcategory_code: headers.require(SUBCATEGORY_CODE)?,
            category_code: headers.require(CATEGORY_CODE)?,
            quantity: headers.find(QUANTITY),
            rate: headers.find(RATE),
            tax: headers.find(TAX),
            total_amount: headers.require(TOTAL_AMOUNT)?,
            store_type: headers.require(STORE_TYPE)?,
        })
    }

    pub fn parse(&self, row: &RawRow<'_>) -> Result<TransactionRecord, LoadError> {
        let transaction_date = row.date(self.date, TRANSACTION_DATE.0)?;
        let total_amount: Decimal = row.parse(self.total_amount, TOTAL_AMOUNT.0)?;
        if total_amount.abs() > Decimal::from(MAX_TRANSACTION_AMOUNT) {
            return Err(row.invalid(TOTAL_AMOUNT.0, row.text(self.total_amount)));
        }
        Ok(TransactionRecord {
            transaction_id: row.owned(self.transaction_id),
            customer_id: row.owned(self.customer_id),
            product_category_code: row.owned(self.category_code),
            product_subcategory_code: row.owned(self.subcategory_code),
            store_type: row.owned(self.store_type),
            transaction_date,
            day_of_week: transaction_date.weekday(),
            quantity: row.parse_optional(self.quantity, QUANTITY.0)?,
            rate: row.parse_optional(self.rate, RATE.0)?,
            tax: row.parse_optional(self.tax, TAX.0)?,
            total_amount,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CustomerColumns {
    customer_id: usize,
    country_code: usize,
    gender: Option<usize>,
    date_of_birth: Option<usize>,
    city_code: Option<usize>,
}

impl CustomerColumns {
    pub fn resolve(headers: &HeaderMap) -> Result<Self, LoadError> {
        Ok(Self {
            customer_id: headers.require(CUSTOMER_ID)?,
            country_code: headers.require(COUNTRY_CODE)?,
            gender: headers.find(GENDER),
            date_of_birth: headers.find(DATE_OF_BIRTH),
            city_code: headers.find(CITY_CODE),
        })
    }

    pub fn parse(&self, row: &RawRow<'_>) -> Result<CustomerRecord, LoadError> {
        let date_of_birth = match self.date_of_birth {
            Some(idx) if !row.text(idx).is_empty() => Some(row.date(idx, DATE_OF_BIRTH.0)?),
            _ => None,
        };
        Ok(CustomerRecord {
            customer_id: row.owned(self.customer_id),
            country_code: row.owned(self.country_code),
            gender: row.optional(self.gender),
            date_of_birth,
            city_code: row.optional(self.city_code),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CountryColumns {
    country_code: usize,
    country_name: usize,
}

impl CountryColumns {
    /// Falls back to the first column for the code: the lookup is indexed by it.
    pub fn resolve(headers: &HeaderMap) -> Result<Self, LoadError> {
        let country_code = match headers.find(COUNTRY_CODE) {
            Some(idx) => idx,
            None => headers.first_named().unwrap_or(0),
        };
        Ok(Self {
            country_code,
            country_name: headers.require(COUNTRY_NAME)?,
        })
    }

    pub fn parse(&self, row: &RawRow<'_>) -> CountryRecord {
        CountryRecord {
            country_code: row.owned(self.country_code),
            country_name: row.owned(self.country_name),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProductCategoryColumns {
    category_code: usize,
    category_name: usize,
    subcategory_code: usize,
    subcategory_name: usize,
}

impl ProductCategoryColumns {
    pub fn resolve(headers: &HeaderMap) -> Result<Self, LoadError> {
        Ok(Self {
            category_code: headers.require(CATEGORY_CODE)?,
            category_name: headers.require(CATEGORY_NAME)?,
            subcategory_code: headers.require(SUBCATEGORY_CODE)?,
            subcategory_name: headers.require(SUBCATEGORY_NAME)?,
        })
    }

    pub fn parse(&self, row: &RawRow<'_>) -> ProductCategoryRecord {
        ProductCategoryRecord {
            product_category_code: row.owned(self.category_code),
            category_name: row.owned(self.category_name),
            product_subcategory_code: row.owned(self.subcategory_code),
            subcategory_name: row.owned(self.subcategory_name),
        }
    }
}

impl SourceRecord for TransactionRecord {
    const TABLE: SourceTable = SourceTable::Transactions;
    type Columns = TransactionColumns;

    fn bind(headers: &HeaderMap) -> Result<Self::Columns, LoadError> {
        TransactionColumns::resolve(headers)
    }

    fn from_row(columns: &Self::Columns, row: &RawRow<'_>) -> Result<Self, LoadError> {
        columns.parse(row)
    }
}

impl SourceRecord for CustomerRecord {
    const TABLE: SourceTable = SourceTable::Customers;
    type Columns = CustomerColumns;

    fn bind(headers: &HeaderMap) -> Result<Self::Columns, LoadError> {
        CustomerColumns::resolve(headers)
    }

    fn from_row(columns: &Self::Columns, row: &RawRow<'_>) -> Result<Self, LoadError> {
        columns.parse(row)
    }
}

impl SourceRecord for CountryRecord {
    const TABLE: SourceTable = SourceTable::Countries;
    type Columns = CountryColumns;

    fn bind(headers: &HeaderMap) -> Result<Self::Columns, LoadError> {
        CountryColumns::resolve(headers)
    }

    fn from_row(columns: &Self::Columns, row: &RawRow<'_>) -> Result<Self, LoadError> {
        Ok(columns.parse(row))
    }
}

impl SourceRecord for ProductCategoryRecord {
    const TABLE: SourceTable = SourceTable::ProductCategories;
    type Columns = ProductCategoryColumns;

    fn bind(headers: &HeaderMap) -> Result<Self::Columns, LoadError> {
        ProductCategoryColumns::resolve(headers)
    }

    fn from_row(columns: &Self::Columns, row: &RawRow<'_>) -> Result<Self, LoadError> {
        Ok(columns.parse(row))
    }
}
