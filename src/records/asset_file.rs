//! Asset source file: one comma-delimited asset per line, `-1` terminator.
//!
//! ```text
//! id,type,location,P(dis),P(def),P(den),P(dim),%(dam),theta
//! 1,5,17,0.004213,0.351200,0.052310,0.118700,0.006100,5.6185E-9
//! -1
//! ```

use std::collections::HashSet;
use std::io::{BufRead, Write};

use super::tokens::{Fields, LineSource};
use crate::consts::END_OF_STREAM;
use crate::errors::{Error, ParseError, Result};
use crate::types::{AssetRecord, AssetType, FactorSet, Location};

/// Decode the nine asset fields from one line.
pub(crate) fn parse_asset(fields: &mut Fields) -> std::result::Result<AssetRecord, ParseError> {
    let line = fields.line();
    let id = fields.next_int("id")?;
    let id = u32::try_from(id)
        .ok()
        .filter(|&id| id > 0)
        .ok_or_else(|| ParseError::InvalidNumber {
            line,
            field: "id",
            value: id.to_string(),
        })?;
    let raw_type = fields.next_int("type")?;
    let asset_type =
        AssetType::new(raw_type).ok_or(ParseError::TypeOutOfRange { line, value: raw_type })?;
    let raw_loc = fields.next_int("location")?;
    let location =
        Location::new(raw_loc).ok_or(ParseError::LocationOutOfRange { line, value: raw_loc })?;
    let factors = FactorSet {
        dis: fields.next_f64("p_dis")?,
        def: fields.next_f64("p_def")?,
        den: fields.next_f64("p_den")?,
        dim: fields.next_f64("p_dim")?,
        dam: fields.next_f64("pct_dam")?,
    };
    let theta = fields.next_f64("theta")?;
    Ok(AssetRecord {
        id,
        asset_type,
        location,
        factors,
        theta,
    })
}

/// Rejects an asset id already seen earlier in the same stream.
pub(crate) fn check_unique(
    seen: &mut HashSet<u32>,
    id: u32,
    line: usize,
) -> std::result::Result<(), ParseError> {
    if seen.insert(id) {
        Ok(())
    } else {
        Err(ParseError::DuplicateId { line, id })
    }
}

/// Streaming reader over an asset source file.
pub struct AssetReader<R> {
    source: LineSource<R>,
    seen: HashSet<u32>,
    finished: bool,
}

impl<R: BufRead> AssetReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            source: LineSource::new(inner),
            seen: HashSet::new(),
            finished: false,
        }
    }

    /// Next asset, or `None` once the end-of-stream marker is reached.
    ///
    /// Running out of input before the marker is `Error::Incomplete`; an id
    /// repeated within the stream is `ParseError::DuplicateId`.
    pub fn next_asset(&mut self) -> Result<Option<AssetRecord>> {
        if self.finished {
            return Ok(None);
        }
        let Some(mut fields) = self.source.next_line()? else {
            return Err(Error::Incomplete {
                last_line: self.source.line_no(),
            });
        };
        if fields.is_end_marker() {
            self.finished = true;
            return Ok(None);
        }
        let asset = parse_asset(&mut fields)?;
        check_unique(&mut self.seen, asset.id, fields.line())?;
        fields.finish()?;
        Ok(Some(asset))
    }

    /// Read every remaining asset.
    pub fn read_all(mut self) -> Result<Vec<AssetRecord>> {
        let mut assets = Vec::new();
        while let Some(asset) = self.next_asset()? {
            assets.push(asset);
        }
        Ok(assets)
    }
}

/// Writes asset lines and the closing marker.
pub struct AssetWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> AssetWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, asset: &AssetRecord) -> Result<()> {
        let f = &asset.factors;
        writeln!(
            self.out,
            "{},{},{},{},{},{},{},{},{:E}",
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
        self.written += 1;
        Ok(())
    }

    /// Append the end-of-stream marker and flush. Returns the number of assets written.
    pub fn finish(mut self) -> Result<usize> {
        writeln!(self.out, "{END_OF_STREAM}")?;
        self.out.flush()?;
        Ok(self.written)
    }
}

/// Write a whole population.
pub fn write_assets<W: Write>(out: W, assets: &[AssetRecord]) -> Result<usize> {
    let mut writer = AssetWriter::new(out);
    for asset in assets {
        writer.write(asset)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> AssetRecord {
        AssetRecord::new(
            12,
            AssetType::new(5).unwrap(),
            Location::new(17).unwrap(),
            FactorSet {
                dis: 0.004213,
                def: 0.3512,
                den: 0.05231,
                dim: 0.1187,
                dam: 0.0061,
            },
        )
    }

    #[test]
    fn test_write_then_read() {
        let mut buf = Vec::new();
        assert_eq!(write_assets(&mut buf, &[sample()]).unwrap(), 1);
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.ends_with("-1\n"));

        let assets = AssetReader::new(Cursor::new(buf)).read_all().unwrap();
        assert_eq!(assets, vec![sample()]);
    }

    #[test]
    fn test_reads_legacy_padding() {
        let input = "1,3, 7,0.005000,0.400000,0.050000,0.200000,0.004000,8.000000E-09\n-1\n";
        let assets = AssetReader::new(Cursor::new(input)).read_all().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].location.get(), 7);
        assert!((assets[0].theta - 8.0e-9).abs() < 1e-20);
    }

    #[test]
    fn test_missing_marker_is_incomplete() {
        let input = "1,3,7,0.005,0.4,0.05,0.2,0.004,8E-9\n";
        let err = AssetReader::new(Cursor::new(input)).read_all().unwrap_err();
        assert!(err.is_incomplete());
    }

    #[test]
    fn test_out_of_range_type() {
        let input = "1,14,7,0.005,0.4,0.05,0.2,0.004,8E-9\n-1\n";
        let err = AssetReader::new(Cursor::new(input)).read_all().unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::TypeOutOfRange { line: 1, value: 14 })
        ));
    }

    #[test]
    fn test_repeated_id_is_rejected() {
        let input = "4,3,7,0.005,0.4,0.05,0.2,0.004,8E-9\n\
                     5,3,8,0.005,0.4,0.05,0.2,0.004,8E-9\n\
                     \n\
                     4,9,2,0.006,0.3,0.04,0.1,0.002,1E-9\n\
                     -1\n";
        let err = AssetReader::new(Cursor::new(input)).read_all().unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::DuplicateId { line: 4, id: 4 })
        ));
        assert_eq!(err.to_string(), "Parse error: line 4: duplicate asset id 4");
    }

    #[test]
    fn test_truncated_line() {
        let input = "1,3,7,0.005,0.4\n-1\n";
        let err = AssetReader::new(Cursor::new(input)).read_all().unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::MissingField { field: "p_den", .. })
        ));
    }
}
