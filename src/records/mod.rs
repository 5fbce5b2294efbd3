//! Flat sequential record files.
//!
//! Every file ends with a line holding the numeric end-of-stream marker. The
//! marker never escapes this module: readers return `Ok(None)` once they see
//! it and `Error::Incomplete` when input runs out without it.

mod asset_file;
mod output_file;
mod table_file;
mod tokens;

pub use asset_file::{write_assets, AssetReader, AssetWriter};
pub use output_file::{read_outputs, OutputWriter};
pub use table_file::{TableReader, TableWriter};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::errors::Result;
use crate::types::{AssetRecord, TabledAsset};

/// Load a whole asset source file.
pub fn read_asset_file(path: &Path) -> Result<Vec<AssetRecord>> {
    let file = File::open(path)?;
    AssetReader::new(BufReader::new(file)).read_all()
}

/// Load a whole improvement-table file.
pub fn read_table_file(path: &Path) -> Result<Vec<TabledAsset>> {
    let file = File::open(path)?;
    TableReader::new(BufReader::new(file)).read_all()
}

/// Create (truncate) an output file behind a buffered writer.
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}
