//! Line-oriented field splitting shared by the record readers.

use std::io::BufRead;

use crate::consts::END_OF_STREAM;
use crate::errors::{ParseError, Result};

/// Reads non-blank lines and splits them on commas and whitespace.
pub(crate) struct LineSource<R> {
    inner: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> LineSource<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Next non-blank line, `None` at physical end of input.
    pub(crate) fn next_line(&mut self) -> Result<Option<Fields>> {
        loop {
            self.buf.clear();
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let items: Vec<String> = self
                .buf
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect();
            if !items.is_empty() {
                return Ok(Some(Fields {
                    line: self.line_no,
                    items,
                    pos: 0,
                }));
            }
        }
    }

    /// Number of the last line read.
    pub(crate) fn line_no(&self) -> usize {
        self.line_no
    }
}

/// The fields of one line, consumed left to right.
#[derive(Debug)]
pub(crate) struct Fields {
    line: usize,
    items: Vec<String>,
    pos: usize,
}

impl Fields {
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// A line holding only the numeric end-of-stream marker.
    pub(crate) fn is_end_marker(&self) -> bool {
        self.items.len() == 1 && self.items[0].parse::<i64>() == Ok(END_OF_STREAM)
    }

    fn next_raw(&mut self, field: &'static str) -> std::result::Result<&str, ParseError> {
        let item = self.items.get(self.pos).ok_or(ParseError::MissingField {
            line: self.line,
            field,
        })?;
        self.pos += 1;
        Ok(item)
    }

    pub(crate) fn next_f64(&mut self, field: &'static str) -> std::result::Result<f64, ParseError> {
        let line = self.line;
        let raw = self.next_raw(field)?;
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ParseError::InvalidNumber {
                line,
                field,
                value: raw.to_owned(),
            }),
        }
    }

    /// Integer field; accepts integral decimals such as `12.` or `12.0`.
    pub(crate) fn next_int(&mut self, field: &'static str) -> std::result::Result<i64, ParseError> {
        let line = self.line;
        let raw = self.next_raw(field)?;
        if let Ok(v) = raw.parse::<i64>() {
            return Ok(v);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
            _ => Err(ParseError::InvalidNumber {
                line,
                field,
                value: raw.to_owned(),
            }),
        }
    }

    /// Reject leftover fields.
    pub(crate) fn finish(self) -> std::result::Result<(), ParseError> {
        match self.items.get(self.pos) {
            Some(extra) => Err(ParseError::TrailingField {
                line: self.line,
                value: extra.clone(),
            }),
            None => Ok(()),
        }
    }
}
