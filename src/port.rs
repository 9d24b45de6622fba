use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use crate::error::ScanError;

/// Inclusive range of TCP ports, always within `1..=65535` and never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

#[allow(clippy::len_without_is_empty)]
impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self, ScanError> {
        if start == 0 || end < start {
            return Err(ScanError::InvalidPortRange(format!("{}-{}", start, end)));
        }

        Ok(Self { start, end })
    }

    #[inline]
    pub fn single(port: u16) -> Result<Self, ScanError> {
        Self::new(port, port)
    }

    #[inline]
    pub fn start(&self) -> u16 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports covered, at least one.
    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    #[inline]
    pub fn iter(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl Display for PortRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PortRange {
    type Err = ScanError;

    /// Accepts `start-end` or a single port number.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ScanError::InvalidPortRange(raw.into());
        let parse = |s: &str| s.trim().parse::<u16>().map_err(|_| invalid());

        let (start, end) = match raw.split_once('-') {
            Some((start, end)) => (parse(start)?, parse(end)?),
            None => {
                let port = parse(raw)?;
                (port, port)
            }
        };

        Self::new(start, end).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_forms() {
        let range: PortRange = "8078-8082".parse().unwrap();
        assert_eq!((range.start(), range.end()), (8078, 8082));
        assert_eq!(range.len(), 5);

        let single: PortRange = " 443 ".parse().unwrap();
        assert_eq!(single, PortRange::single(443).unwrap());
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn full_range_length() {
        let range = PortRange::new(1, 65535).unwrap();
        assert_eq!(range.len(), 65535);
        assert_eq!(range.iter().count(), 65535);
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in ["", "abc", "10-", "-10", "1-2-3", "0", "0-10", "20-10", "1-65536", "80 443"] {
            assert!(
                matches!(raw.parse::<PortRange>(), Err(ScanError::InvalidPortRange(ref r)) if r == raw),
                "`{}` should be rejected",
                raw
            );
        }
    }

    #[test]
    fn display_matches_input_form() {
        assert_eq!(PortRange::new(1, 1024).unwrap().to_string(), "1-1024");
        assert_eq!(PortRange::single(22).unwrap().to_string(), "22");
    }
}
