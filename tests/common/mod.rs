#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sales_dashboard::{
    dashboard::Dashboard,
    loader::ReadOptions,
    source::{MemorySource, SourceTable},
};
use tempfile::{TempDir, tempdir};

pub const TRANSACTION_HEADER: &str = ",transaction_id,cust_id,tran_date,prod_subcat_code,prod_cat_code,Qty,Rate,Tax,total_amt,Store_type\n";

pub const CATALOG: &str = "prod_cat_code,prod_cat,prod_sub_cat_code,prod_subcat\n\
1,Clothing,4,Mens\n\
1,Clothing,1,Women\n\
1,Clothing,3,Kids\n\
2,Footwear,1,Mens\n\
2,Footwear,3,Women\n";

pub const CUSTOMERS: &str = "customer_Id,DOB,Gender,city_code,country_code\n\
100,26-09-1981,M,4,1\n\
101,05-05-1975,F,3,2\n";

pub const COUNTRIES: &str = "country_code,country\n1,Australia\n2,India\n";

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Loads the checked-in retail dataset.
pub fn retail_dashboard() -> Dashboard {
    let layout = sales_dashboard::layout::SourceLayout {
        data_dir: fixture_path("retail"),
        ..Default::default()
    };
    Dashboard::load(
        &sales_dashboard::source::DirectorySource::new(layout),
        ReadOptions::default(),
    )
    .expect("load retail fixture")
}

/// In-memory source with the small lookup tables above and the given
/// transaction partitions (bodies without header).
pub fn memory_source(partitions: &[&str]) -> MemorySource {
    let source = MemorySource::new()
        .with(SourceTable::Customers, "customers.csv", CUSTOMERS)
        .with(SourceTable::Countries, "country_codes.csv", COUNTRIES)
        .with(SourceTable::ProductCategories, "prod_cat_info.csv", CATALOG);
    partitions
        .iter()
        .enumerate()
        .fold(source, |source, (idx, body)| {
            source.with(
                SourceTable::Transactions,
                &format!("part_{idx}.csv"),
                &format!("{TRANSACTION_HEADER}{body}"),
            )
        })
}

pub fn memory_dashboard(partitions: &[&str]) -> Dashboard {
    Dashboard::load(&memory_source(partitions), ReadOptions::default()).expect("load memory source")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a complete data directory with one transaction partition.
    pub fn write_dataset(&self, transactions_body: &str) -> PathBuf {
        self.write("prod_cat_info.csv", CATALOG);
        self.write("customers.csv", CUSTOMERS);
        self.write("country_codes.csv", COUNTRIES);
        self.write(
            "transactions/part_1.csv",
            &format!("{TRANSACTION_HEADER}{transactions_body}"),
        );
        self.path().to_path_buf()
    }
}
