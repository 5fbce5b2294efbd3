use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Whole percentage in 0..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const FULL: Percent = Percent(100);

    /// Validate a raw integer percentage.
    pub fn new(value: i64) -> Result<Self> {
        if (0..=100).contains(&value) {
            Ok(Percent(value as u8))
        } else {
            Err(Error::PercentOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for Percent {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Percent::new(value)
    }
}

impl From<Percent> for u8 {
    fn from(p: Percent) -> u8 {
        p.0
    }
}

impl std::str::FromStr for Percent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s
            .trim()
            .trim_end_matches('%')
            .parse()
            .map_err(|_| Error::config(format!("not a whole percentage: {s:?}")))?;
        Percent::new(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Percent::new(0).is_ok());
        assert!(Percent::new(100).is_ok());
        assert!(matches!(Percent::new(101), Err(Error::PercentOutOfRange(101))));
        assert!(Percent::new(-1).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("25".parse::<Percent>().unwrap().get(), 25);
        assert_eq!(" 40% ".parse::<Percent>().unwrap().get(), 40);
        assert!("abc".parse::<Percent>().is_err());
    }
}
