//! Abstract table sources.
//!
//! The loader asks a [`TableSource`] for the readers behind each logical
//! table and never touches paths itself. [`DirectorySource`] serves files laid
//! out per a [`SourceLayout`]; [`MemorySource`] serves in-memory text.

use std::{
    collections::HashMap,
    fmt,
    fs::{self, File},
    io::{BufReader, Cursor, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;

use crate::{error::LoadError, layout::SourceLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    Transactions,
    Customers,
    Countries,
    ProductCategories,
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceTable::Transactions => "transactions",
            SourceTable::Customers => "customers",
            SourceTable::Countries => "country codes",
            SourceTable::ProductCategories => "product categories",
        };
        f.write_str(name)
    }
}

/// One readable partition of a table.
pub struct SourceFile {
    pub name: String,
    pub reader: Box<dyn Read>,
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile").field("name", &self.name).finish()
    }
}

pub trait TableSource {
    /// Opens every partition of `table`, in load order.
    ///
    /// Lookup tables have exactly one partition; transactions may have many.
    fn open(&self, table: SourceTable) -> Result<Vec<SourceFile>>;
}

#[derive(Debug, Clone)]
pub struct DirectorySource {
    layout: SourceLayout,
}

impl DirectorySource {
    pub fn new(layout: SourceLayout) -> Self {
        Self { layout }
    }

    fn open_file(path: &Path) -> Result<SourceFile> {
        if !path.is_file() {
            return Err(LoadError::MissingSource(path.to_path_buf()).into());
        }
        let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
        Ok(SourceFile {
            name: path.display().to_string(),
            reader: Box::new(BufReader::new(file)),
        })
    }

    fn partition_paths(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(LoadError::MissingSource(dir.to_path_buf()).into());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Listing {dir:?}"))? {
            let entry = entry.with_context(|| format!("Listing {dir:?}"))?;
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden || !path.is_file() {
                debug!("Skipping {:?} in transactions directory", path);
                continue;
            }
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }
}

impl TableSource for DirectorySource {
    fn open(&self, table: SourceTable) -> Result<Vec<SourceFile>> {
        match table {
            SourceTable::Transactions => {
                let dir = self.layout.transactions_path();
                Self::partition_paths(&dir)?
                    .iter()
                    .map(|path| Self::open_file(path))
                    .collect()
            }
            SourceTable::Customers => Ok(vec![Self::open_file(&self.layout.customers_path())?]),
            SourceTable::Countries => Ok(vec![Self::open_file(&self.layout.countries_path())?]),
            SourceTable::ProductCategories => Ok(vec![Self::open_file(
                &self.layout.product_categories_path(),
            )?]),
        }
    }
}

/// Text tables held in memory, keyed by table then partition name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<SourceTable, Vec<(String, String)>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, table: SourceTable, name: &str, contents: &str) -> Self {
        self.tables
            .entry(table)
            .or_default()
            .push((name.to_string(), contents.to_string()));
        self
    }
}

impl TableSource for MemorySource {
    fn open(&self, table: SourceTable) -> Result<Vec<SourceFile>> {
        let partitions = self
            .tables
            .get(&table)
            .ok_or_else(|| LoadError::MissingSource(PathBuf::from(table.to_string())))?;
        Ok(partitions
            .iter()
            .map(|(name, contents)| SourceFile {
                name: name.clone(),
                reader: Box::new(Cursor::new(contents.clone().into_bytes())),
            })
            .collect())
    }
}
