// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Plain-text defect list loader.
//!
//! Inspection stations export a roll as a short header followed by one record
//! per flaw. `DefectLoader` reads that format from any `BufRead`, file path,
//! reader or string slice and hands back a validated `FabricRoll`.
//!
//! Tokens are separated by whitespace or commas, so both hand-written lists
//! and CSV-ish exports load unchanged. Everything after a `#` on a line is a
//! comment.

use crate::{
    defect::{Defect, DefectClass, InvalidDefectError, Points},
    roll::{FabricRoll, FabricRollBuilder, FabricRollError},
};
use std::{
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

/// The error type for the defect loading process.
#[derive(Debug)]
pub enum DefectLoaderError {
    /// An I/O error occurred while reading the input stream.
    Io(std::io::Error),
    /// The input stream ended before all announced records were read.
    UnexpectedEof,
    /// A token could not be parsed into the expected type.
    Parse(ParseTokenError),
    /// A defect record is malformed.
    Defect {
        record: usize,
        source: InvalidDefectError,
    },
    /// The assembled roll failed validation.
    Roll(FabricRollError),
    /// Tokens remain after the last announced record.
    TrailingInput(String),
}

/// Details about a failed token parsing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTokenError {
    /// The string token that failed to parse.
    pub token: String,
    /// The name of the type we tried to parse into (e.g., "f64").
    pub type_name: &'static str,
}

impl Display for ParseTokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not parse token '{}' as type {}",
            self.token, self.type_name
        )
    }
}

impl std::error::Error for ParseTokenError {}

impl Display for DefectLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof => write!(f, "Unexpected end of file while reading defects"),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::Defect { record, source } => write!(f, "Defect record {}: {}", record, source),
            Self::Roll(e) => write!(f, "Invalid roll: {}", e),
            Self::TrailingInput(t) => write!(f, "Unexpected trailing token '{}'", t),
        }
    }
}

impl std::error::Error for DefectLoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Defect { source, .. } => Some(source),
            Self::Roll(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DefectLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseTokenError> for DefectLoaderError {
    fn from(e: ParseTokenError) -> Self {
        Self::Parse(e)
    }
}

impl From<FabricRollError> for DefectLoaderError {
    fn from(e: FabricRollError) -> Self {
        Self::Roll(e)
    }
}

/// A configurable loader for roll inspection records.
///
/// The format this parser expects is as follows (tokens separated by
/// whitespace or commas):
///
/// ```raw
/// L W N          // roll length, roll width, number of defect records
/// from_1 to_1 p_1
/// ...
/// from_N to_N p_N
/// ```
///
/// `p_i` is a non-negative integer score or one of the continuous markers
/// (`continuous`, `cont`, `c`, case-insensitive). A record may end with an
/// optional grade, `major` or `minor`.
///
/// # Configuration
/// * `clamp_to_roll`: Defects that stick out past either end of the roll are
///   clipped to `[0, L]` instead of rejected. Inspection tables sometimes log
///   a flaw found on the leader or tail beyond the measured length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DefectLoader {
    clamp_to_roll: bool,
}

impl DefectLoader {
    /// Creates a new `DefectLoader` with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures whether out-of-range defects are clipped to the roll.
    #[inline]
    pub fn clamp_to_roll(mut self, yes: bool) -> Self {
        self.clamp_to_roll = yes;
        self
    }

    /// Loads a roll from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<FabricRoll, DefectLoaderError> {
        let mut sc = Scanner::new(rdr);

        let length: f64 = sc.next()?;
        let width: f64 = sc.next()?;
        let count: usize = sc.next()?;

        let mut builder = FabricRollBuilder::new(length, width);
        for record in 0..count {
            let mut from: f64 = sc.next()?;
            let mut to: f64 = sc.next()?;
            let token: String = sc.next()?;
            let points = Points::from_str(&token)
                .map_err(|source| DefectLoaderError::Defect { record, source })?;
            let grade = sc.peek_token()?.map(DefectClass::from_str);
            let class = match grade {
                Some(Ok(class)) => {
                    sc.try_next_token()?;
                    Some(class)
                }
                _ => None,
            };

            if self.clamp_to_roll && length.is_finite() {
                from = from.clamp(0.0, length.max(0.0));
                to = to.clamp(0.0, length.max(0.0));
            }

            let defect = Defect::new(from, to, points)
                .map_err(|source| DefectLoaderError::Defect { record, source })?;
            builder.add_defect(match class {
                Some(class) => defect.with_class(class),
                None => defect,
            });
        }

        if let Some(token) = sc.try_next_token()? {
            return Err(DefectLoaderError::TrailingInput(token));
        }

        Ok(builder.build()?)
    }

    /// Loads a roll from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<FabricRoll, DefectLoaderError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a roll from a generic reader.
    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<FabricRoll, DefectLoaderError> {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads a roll from a string slice.
    #[inline]
    pub fn from_str(&self, s: &str) -> Result<FabricRoll, DefectLoaderError> {
        self.from_reader(s.as_bytes())
    }
}

#[inline]
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Reads separator-delimited tokens from a generic reader.
struct Scanner<R> {
    rdr: R,
    buf: String,
    pos: usize,
    peeked: Option<String>,
}

impl<R: BufRead> Scanner<R> {
    #[inline]
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            pos: 0,
            peeked: None,
        }
    }

    /// Refills the line buffer. Returns `Ok(false)` on EOF.
    #[inline]
    fn fill_line(&mut self) -> Result<bool, DefectLoaderError> {
        self.buf.clear();
        self.pos = 0;
        let n = self.rdr.read_line(&mut self.buf)?;
        Ok(n > 0)
    }

    /// Returns the next raw token, or `None` at end of input.
    fn try_next_token(&mut self) -> Result<Option<String>, DefectLoaderError> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.read_token(),
        }
    }

    /// Returns the next raw token without consuming it.
    fn peek_token(&mut self) -> Result<Option<&str>, DefectLoaderError> {
        if self.peeked.is_none() {
            self.peeked = self.read_token()?;
        }
        Ok(self.peeked.as_deref())
    }

    /// Reads a token from the input. Separators and `#` comments are skipped.
    fn read_token(&mut self) -> Result<Option<String>, DefectLoaderError> {
        loop {
            if self.pos >= self.buf.len() && !self.fill_line()? {
                return Ok(None);
            }

            let rest = &self.buf[self.pos..];
            let skipped = rest.len() - rest.trim_start_matches(is_separator).len();
            self.pos += skipped;

            let rest = &self.buf[self.pos..];
            if rest.is_empty() || rest.starts_with('#') {
                self.pos = self.buf.len();
                continue;
            }

            let len = rest
                .find(|c: char| is_separator(c) || c == '#')
                .unwrap_or(rest.len());
            let token = rest[..len].to_owned();
            self.pos += len;
            return Ok(Some(token));
        }
    }

    /// Reads the next token and parses it into `T`.
    fn next<T: FromStr>(&mut self) -> Result<T, DefectLoaderError> {
        let token = self
            .try_next_token()?
            .ok_or(DefectLoaderError::UnexpectedEof)?;
        token.parse::<T>().map_err(|_| {
            DefectLoaderError::Parse(ParseTokenError {
                token,
                type_name: std::any::type_name::<T>(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defect::PointTally;

    const ROLL_A: &str = r#"
        88.7 1.5 5      # length, width, records
        7    7    4
        15   15   1
        23   23   5
        25,  25,  1     # comma separated works too
        28   28   4
    "#;

    #[test]
    fn test_loads_roll() {
        let roll = DefectLoader::new().from_str(ROLL_A).expect("Failed to load");
        assert_eq!(roll.length(), 88.7);
        assert_eq!(roll.width(), 1.5);
        assert_eq!(roll.num_defects(), 5);
        assert_eq!(roll.total_points(), PointTally::new(15, 0));
    }

    #[test]
    fn test_loads_continuous_marker() {
        let data = "103 1.5 2\n15.3 18.5 Continuous\n40 41 2\n";
        let roll = DefectLoader::new().from_str(data).unwrap();
        assert!(roll.defects()[0].is_continuous());
        assert_eq!(roll.defects()[1].points(), Points::Scored(2));
    }

    #[test]
    fn test_unexpected_eof() {
        let res = DefectLoader::new().from_str("100 1.5 2\n1 2 3\n");
        assert!(matches!(res, Err(DefectLoaderError::UnexpectedEof)));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let res = DefectLoader::new().from_str("100 1.5 1\n1 2 3\n4 5 6\n");
        match res {
            Err(DefectLoaderError::TrailingInput(t)) => assert_eq!(t, "4"),
            other => panic!("Expected TrailingInput, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_structure() {
        let res = DefectLoader::new().from_str("100 wide 1");
        match res {
            Err(DefectLoaderError::Parse(e)) => {
                assert_eq!(e.token, "wide");
                assert!(e.type_name.contains("f64"));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_points_reported_with_record() {
        let res = DefectLoader::new().from_str("100 1.5 2\n1 2 3\n5 6 -2\n");
        match res {
            Err(DefectLoaderError::Defect { record, source }) => {
                assert_eq!(record, 1);
                assert_eq!(source, InvalidDefectError::PointsOutOfRange(-2));
            }
            other => panic!("Expected Defect error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_defect_rejected_or_clamped() {
        let data = "50 1.5 1\n48 52 2\n";
        assert!(matches!(
            DefectLoader::new().from_str(data),
            Err(DefectLoaderError::Roll(FabricRollError::DefectOutOfBounds { .. }))
        ));

        let roll = DefectLoader::new().clamp_to_roll(true).from_str(data).unwrap();
        assert_eq!(roll.defects()[0].end(), 50.0);
    }

    #[test]
    fn test_comment_only_lines_skipped() {
        let data = "# header\n\n10 1 0 # empty roll\n# trailer\n";
        let roll = DefectLoader::new().from_str(data).unwrap();
        assert_eq!(roll.num_defects(), 0);
    }

    #[test]
    fn test_optional_grade_column() {
        let data = "100 1.5 3
1 2 3 MAJOR
5 6 1
8 9 c minor
";
        let roll = DefectLoader::new().from_str(data).unwrap();
        let classes: Vec<_> = roll.defects().iter().map(Defect::class).collect();
        assert_eq!(
            classes,
            vec![Some(DefectClass::Major), None, Some(DefectClass::Minor)]
        );
        assert!(roll.defects()[2].is_continuous());
    }
}
