//! Optimized output file: one comma-delimited `OutputRecord` per line.
//!
//! ```text
//! id,type,loc,P(dis),P(def),P(den),P(dim),%(dam),theta,dtheta,tcost,c_dis,c_def,c_den,c_dim[,run]
//! ```

use std::io::{BufRead, Write};

use super::tokens::LineSource;
use crate::consts::END_OF_STREAM;
use crate::errors::{Error, ParseError, Result};
use crate::types::{AssetType, FactorSet, Improvements, Location, OutputRecord};

/// Writes output records and the closing marker.
pub struct OutputWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, rec: &OutputRecord) -> Result<()> {
        let f = &rec.factors;
        let c = &rec.costs;
        write!(
            self.out,
            "{},{},{},{},{},{},{},{},{:E},{:E},{},{},{},{},{}",
            rec.id,
            rec.asset_type,
            rec.location,
            f.dis,
            f.def,
            f.den,
            f.dim,
            f.dam,
            rec.theta,
            rec.delta_theta,
            rec.total_cost,
            c.dis,
            c.def,
            c.den,
            c.dim
        )?;
        if let Some(run) = rec.run {
            write!(self.out, ",{run}")?;
        }
        writeln!(self.out)?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Append the end-of-stream marker and flush. Returns the number of records written.
    pub fn finish(mut self) -> Result<usize> {
        writeln!(self.out, "{END_OF_STREAM}")?;
        self.out.flush()?;
        Ok(self.written)
    }
}

/// Read a complete output file. A file without the closing marker is
/// reported as `Error::Incomplete`.
pub fn read_outputs<R: BufRead>(inner: R) -> Result<Vec<OutputRecord>> {
    let mut source = LineSource::new(inner);
    let mut records = Vec::new();
    loop {
        let Some(mut fields) = source.next_line()? else {
            return Err(Error::Incomplete {
                last_line: source.line_no(),
            });
        };
        if fields.is_end_marker() {
            return Ok(records);
        }
        let line = fields.line();
        let id = fields.next_int("id")?;
        let raw_type = fields.next_int("type")?;
        let raw_loc = fields.next_int("location")?;
        let rec = OutputRecord {
            id: u32::try_from(id).map_err(|_| ParseError::InvalidNumber {
                line,
                field: "id",
                value: id.to_string(),
            })?,
            asset_type: AssetType::new(raw_type)
                .ok_or(ParseError::TypeOutOfRange { line, value: raw_type })?,
            location: Location::new(raw_loc)
                .ok_or(ParseError::LocationOutOfRange { line, value: raw_loc })?,
            factors: FactorSet {
                dis: fields.next_f64("p_dis")?,
                def: fields.next_f64("p_def")?,
                den: fields.next_f64("p_den")?,
                dim: fields.next_f64("p_dim")?,
                dam: fields.next_f64("pct_dam")?,
            },
            theta: fields.next_f64("theta")?,
            delta_theta: fields.next_f64("delta_theta")?,
            total_cost: fields.next_f64("total_cost")?,
            costs: Improvements {
                dis: fields.next_f64("cost_dis")?,
                def: fields.next_f64("cost_def")?,
                den: fields.next_f64("cost_den")?,
                dim: fields.next_f64("cost_dim")?,
            },
            run: match fields.next_int("run") {
                Ok(run) => Some(u32::try_from(run).map_err(|_| ParseError::InvalidNumber {
                    line,
                    field: "run",
                    value: run.to_string(),
                })?),
                Err(ParseError::MissingField { .. }) => None,
                Err(e) => return Err(e.into()),
            },
        };
        fields.finish()?;
        records.push(rec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(run: Option<u32>) -> OutputRecord {
        OutputRecord {
            id: 7,
            asset_type: AssetType::new(2).unwrap(),
            location: Location::new(11).unwrap(),
            factors: FactorSet {
                dis: 0.006,
                def: 0.5,
                den: 0.07,
                dim: 0.3,
                dam: 0.002,
            },
            theta: 1.26e-7,
            delta_theta: 3.1e-8,
            total_cost: 412.5,
            costs: Improvements {
                dis: 12.5,
                def: 400.0,
                den: 0.0,
                dim: 0.0,
            },
            run,
        }
    }

    #[test]
    fn test_write_read_with_and_without_run() {
        let mut buf = Vec::new();
        let mut writer = OutputWriter::new(&mut buf);
        writer.write(&record(None)).unwrap();
        writer.write(&record(Some(4))).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let text = String::from_utf8(buf.clone()).unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(first.split(',').count(), 15);

        let back = read_outputs(Cursor::new(buf)).unwrap();
        assert_eq!(back, vec![record(None), record(Some(4))]);
    }

    #[test]
    fn test_unterminated_output_detected() {
        let mut buf = Vec::new();
        let mut writer = OutputWriter::new(&mut buf);
        writer.write(&record(None)).unwrap();
        drop(writer);
        assert!(read_outputs(Cursor::new(buf)).unwrap_err().is_incomplete());
    }
}
