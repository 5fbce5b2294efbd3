//! Improvement-table file.
//!
//! Each asset is a whitespace-separated summary line followed by four table
//! blocks in factor order P(dis), P(def), P(den), P(dim). A block is its point
//! count on one line, then one `benefit cost` line per point.
//!
//! ```text
//! 1 5 17 0.004213 0.3512 0.05231 0.1187 0.0061 5.6185E-9
//!  2
//! 0.0031 42.5
//! 0.0007 11.25
//!  0
//!  1
//! 0.2104 6712
//!  0
//! -1
//! ```

use std::collections::HashSet;
use std::io::{BufRead, Write};

use super::asset_file::{check_unique, parse_asset};
use super::tokens::LineSource;
use crate::consts::END_OF_STREAM;
use crate::errors::{Error, ParseError, Result};
use crate::types::{AssetRecord, ImprovementTable, Improvements, Point, RiskFactor, TabledAsset};

/// Streaming reader over an improvement-table file.
pub struct TableReader<R> {
    source: LineSource<R>,
    seen: HashSet<u32>,
    finished: bool,
}

impl<R: BufRead> TableReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            source: LineSource::new(inner),
            seen: HashSet::new(),
            finished: false,
        }
    }

    fn incomplete(&self) -> Error {
        Error::Incomplete {
            last_line: self.source.line_no(),
        }
    }

    /// Next asset with its four tables, `None` after the end-of-stream marker.
    pub fn next_asset(&mut self) -> Result<Option<TabledAsset>> {
        if self.finished {
            return Ok(None);
        }
        let Some(mut fields) = self.source.next_line()? else {
            return Err(self.incomplete());
        };
        if fields.is_end_marker() {
            self.finished = true;
            return Ok(None);
        }
        let asset = parse_asset(&mut fields)?;
        check_unique(&mut self.seen, asset.id, fields.line())?;
        fields.finish()?;

        let tables = Improvements {
            dis: self.read_table(RiskFactor::Dis)?,
            def: self.read_table(RiskFactor::Def)?,
            den: self.read_table(RiskFactor::Den)?,
            dim: self.read_table(RiskFactor::Dim)?,
        };
        Ok(Some(TabledAsset { asset, tables }))
    }

    fn read_table(&mut self, factor: RiskFactor) -> Result<ImprovementTable> {
        let Some(mut header) = self.source.next_line()? else {
            return Err(self.incomplete());
        };
        let line = header.line();
        let count = header.next_int("point_count")?;
        header.finish()?;
        if count < 0 {
            return Err(ParseError::InvalidNumber {
                line,
                field: "point_count",
                value: count.to_string(),
            }
            .into());
        }
        if count as usize > ImprovementTable::CAPACITY {
            return Err(ParseError::TooManyPoints { line, factor, count }.into());
        }

        let mut table = ImprovementTable::empty();
        for _ in 0..count {
            let Some(mut fields) = self.source.next_line()? else {
                return Err(self.incomplete());
            };
            let benefit = fields.next_f64("benefit")?;
            let cost = fields.next_f64("cost")?;
            fields.finish()?;
            table.push(Point::new(benefit, cost))?;
        }
        Ok(table)
    }

    /// Read every remaining asset.
    pub fn read_all(mut self) -> Result<Vec<TabledAsset>> {
        let mut out = Vec::new();
        while let Some(asset) = self.next_asset()? {
            out.push(asset);
        }
        Ok(out)
    }
}

/// Writes assets with their tables and the closing marker.
pub struct TableWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> TableWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, asset: &AssetRecord, tables: &Improvements<ImprovementTable>) -> Result<()> {
        let f = &asset.factors;
        writeln!(
            self.out,
            "{} {} {} {} {} {} {} {} {:E}",
            asset.id,
            asset.asset_type,
            asset.location,
            f.dis,
            f.def,
            f.den,
            f.dim,
            f.dam,
            asset.theta
        )?;
        for (_, table) in tables.iter() {
            self.write_table(table)?;
        }
        self.written += 1;
        Ok(())
    }

    fn write_table(&mut self, table: &ImprovementTable) -> Result<()> {
        writeln!(self.out, "{:2}", table.len())?;
        for point in table.iter() {
            writeln!(self.out, "{} {}", point.benefit, point.cost)?;
        }
        Ok(())
    }

    /// Append the end-of-stream marker and flush. Returns the number of assets written.
    pub fn finish(mut self) -> Result<usize> {
        writeln!(self.out, "{END_OF_STREAM}")?;
        self.out.flush()?;
        Ok(self.written)
    }
}
