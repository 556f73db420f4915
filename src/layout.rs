//! Where the source tables live.
//!
//! A `SourceLayout` names the transactions partition directory and the three
//! lookup files relative to a data directory. It can be read from a YAML file
//! and then overridden field by field from the command line.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceLayout {
    pub data_dir: PathBuf,
    pub transactions_dir: PathBuf,
    pub customers: PathBuf,
    pub countries: PathBuf,
    pub product_categories: PathBuf,
    pub delimiter: Option<char>,
    pub encoding: Option<String>,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("db"),
            transactions_dir: PathBuf::from("transactions"),
            customers: PathBuf::from("customers.csv"),
            countries: PathBuf::from("country_codes.csv"),
            product_categories: PathBuf::from("prod_cat_info.csv"),
            delimiter: None,
            encoding: None,
        }
    }
}

impl SourceLayout {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening layout file {path:?}"))?;
        let layout: SourceLayout = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing layout file {path:?}"))?;
        Ok(layout)
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.resolve(&self.transactions_dir)
    }

    pub fn customers_path(&self) -> PathBuf {
        self.resolve(&self.customers)
    }

    pub fn countries_path(&self) -> PathBuf {
        self.resolve(&self.countries)
    }

    pub fn product_categories_path(&self) -> PathBuf {
        self.resolve(&self.product_categories)
    }

    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.filter(char::is_ascii).map(|c| c as u8)
    }

    // Absolute entries ignore data_dir.
    fn resolve(&self, entry: &Path) -> PathBuf {
        if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            self.data_dir.join(entry)
        }
    }
}
