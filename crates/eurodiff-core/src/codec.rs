//! Text codec for case batches.
//!
//! # Input
//!
//! ```text
//! 3
//! France 1 4 4 6
//! Spain 3 1 6 3
//! Portugal 1 1 2 2
//! 1
//! Luxembourg 1 1 1 1
//! 0
//! ```
//!
//! Each case starts with its country count, followed by one
//! `name minX minY maxX maxY` line per country. A lone `0` ends the input;
//! anything after it is ignored. Blank lines are skipped and fields may be
//! separated by any whitespace. Every structural problem is reported as a
//! [`CodecError`] carrying the 1-based line number where it was found, and
//! one bad case rejects the whole batch.
//!
//! Decoding checks names, bounds, and overlaps itself, so a decoded case
//! always builds: the equivalent [`WorldError`] checks in
//! [`WorldMap::build`] are unreachable from [`simulate`] and only guard
//! cases constructed directly.
//!
//! [`WorldError`]: eurodiff_world::WorldError
//! [`WorldMap::build`]: eurodiff_world::WorldMap::build
//! [`simulate`]: crate::batch::simulate
//!
//! # Output
//!
//! [`TextReport`] renders `Case number <k>` followed by `<name> <day>` for
//! each country in declaration order; [`encode_json`] renders the same
//! outcomes as pretty-printed JSON.

use std::collections::BTreeSet;

use eurodiff_types::{CaseOutcome, CaseSpec, Coordinates, CountryName, CountrySpec, Rectangle};
use serde::Serialize;
use tracing::debug;

use crate::config::GridConfig;

/// The text printed in place of results when the input cannot be used.
pub const INVALID_INPUT_MESSAGE: &str =
    "There was an error with your input.\nPlease, recheck it and try again.";

/// Errors that can occur while decoding a batch.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// The input ended without the `0` terminator.
    #[error("line {line}: input ends without the terminating 0")]
    MissingTerminator {
        /// Line just past the end of the input.
        line: usize,
    },

    /// The input ended in the middle of a case.
    #[error("line {line}: case declares {expected} countries but only {found} follow")]
    TruncatedCase {
        /// Line just past the end of the input.
        line: usize,
        /// Declared country count.
        expected: usize,
        /// Country lines actually present.
        found: usize,
    },

    /// A line has the wrong number of fields.
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// Offending line.
        line: usize,
        /// Fields required on this line.
        expected: usize,
        /// Fields present.
        found: usize,
    },

    /// A numeric field does not parse as an integer.
    #[error("line {line}: {field:?} is not an integer")]
    NonNumeric {
        /// Offending line.
        line: usize,
        /// The raw field.
        field: String,
    },

    /// A country count outside `1..=max_countries`.
    #[error("line {line}: country count {count} is outside 1..={max}")]
    CountOutOfRange {
        /// Offending line.
        line: usize,
        /// The declared count.
        count: i64,
        /// Configured maximum.
        max: usize,
    },

    /// A coordinate outside `1..=grid_size`.
    #[error("line {line}: coordinate {value} is outside 1..={grid_size}")]
    CoordinateOutOfRange {
        /// Offending line.
        line: usize,
        /// The coordinate.
        value: i64,
        /// Configured grid side.
        grid_size: u32,
    },

    /// `min > max` on some axis.
    #[error("line {line}: country {country} has min greater than max")]
    InvertedBounds {
        /// Offending line.
        line: usize,
        /// The country.
        country: CountryName,
    },

    /// A country name repeats within one case.
    #[error("line {line}: country {country} is declared twice")]
    DuplicateCountry {
        /// Offending line.
        line: usize,
        /// The repeated name.
        country: CountryName,
    },

    /// Two rectangles in one case share a cell.
    #[error("line {line}: country {country} overlaps {other} at {cell}")]
    Overlap {
        /// Offending line.
        line: usize,
        /// The country declared on this line.
        country: CountryName,
        /// The earlier country it collides with.
        other: CountryName,
        /// One shared cell.
        cell: Coordinates,
    },
}

impl CodecError {
    /// The 1-based line the error refers to.
    pub const fn line(&self) -> usize {
        match self {
            Self::MissingTerminator { line }
            | Self::TruncatedCase { line, .. }
            | Self::FieldCount { line, .. }
            | Self::NonNumeric { line, .. }
            | Self::CountOutOfRange { line, .. }
            | Self::CoordinateOutOfRange { line, .. }
            | Self::InvertedBounds { line, .. }
            | Self::DuplicateCountry { line, .. }
            | Self::Overlap { line, .. } => *line,
        }
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Non-blank input lines, split into fields and numbered from 1.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last_line: usize,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.lines().enumerate(),
            last_line: 0,
        }
    }

    /// The line number just past everything consumed so far.
    const fn end(&self) -> usize {
        self.last_line.saturating_add(1)
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, Vec<&'a str>);

    fn next(&mut self) -> Option<Self::Item> {
        for (position, text) in self.inner.by_ref() {
            let line = position.saturating_add(1);
            self.last_line = line;
            let fields: Vec<&str> = text.split_whitespace().collect();
            if !fields.is_empty() {
                return Some((line, fields));
            }
        }
        None
    }
}

/// Decode a batch of cases.
///
/// # Errors
///
/// Returns the first [`CodecError`] found; no partial batch is returned.
pub fn decode(input: &str, grid: &GridConfig) -> Result<Vec<CaseSpec>, CodecError> {
    let mut lines = Lines::new(input);
    let mut cases = Vec::new();

    loop {
        let Some((line, fields)) = lines.next() else {
            return Err(CodecError::MissingTerminator { line: lines.end() });
        };

        let [count] = fields.as_slice() else {
            return Err(CodecError::FieldCount {
                line,
                expected: 1,
                found: fields.len(),
            });
        };

        let count = parse_integer(line, count)?;
        if count == 0 {
            break;
        }
        let expected = usize::try_from(count)
            .ok()
            .filter(|n| (1..=grid.max_countries).contains(n))
            .ok_or(CodecError::CountOutOfRange {
                line,
                count,
                max: grid.max_countries,
            })?;

        cases.push(decode_case(&mut lines, expected, grid.size)?);
    }

    debug!(cases = cases.len(), "input decoded");
    Ok(cases)
}

/// Read the `expected` country lines of one case.
fn decode_case(lines: &mut Lines<'_>, expected: usize, grid_size: u32) -> Result<CaseSpec, CodecError> {
    let mut countries: Vec<CountrySpec> = Vec::with_capacity(expected);
    let mut names: BTreeSet<String> = BTreeSet::new();

    while countries.len() < expected {
        let Some((line, fields)) = lines.next() else {
            return Err(CodecError::TruncatedCase {
                line: lines.end(),
                expected,
                found: countries.len(),
            });
        };

        let country = decode_country(line, &fields, grid_size)?;

        if !names.insert(country.name.as_str().to_owned()) {
            return Err(CodecError::DuplicateCountry {
                line,
                country: country.name,
            });
        }

        let collision = countries.iter().find_map(|earlier| {
            shared_cell(earlier.bounds, country.bounds).map(|cell| (earlier, cell))
        });
        if let Some((other, cell)) = collision {
            return Err(CodecError::Overlap {
                line,
                country: country.name,
                other: other.name.clone(),
                cell,
            });
        }

        countries.push(country);
    }

    Ok(CaseSpec::new(countries))
}

/// Parse `name minX minY maxX maxY`.
fn decode_country(line: usize, fields: &[&str], grid_size: u32) -> Result<CountrySpec, CodecError> {
    let [name, min_x, min_y, max_x, max_y] = fields else {
        return Err(CodecError::FieldCount {
            line,
            expected: 5,
            found: fields.len(),
        });
    };

    let bounds = Rectangle::new(
        parse_coordinate(line, min_x, grid_size)?,
        parse_coordinate(line, min_y, grid_size)?,
        parse_coordinate(line, max_x, grid_size)?,
        parse_coordinate(line, max_y, grid_size)?,
    );

    let country = CountrySpec::new(*name, bounds);
    if !bounds.is_well_formed() {
        return Err(CodecError::InvertedBounds {
            line,
            country: country.name,
        });
    }
    Ok(country)
}

fn parse_integer(line: usize, field: &str) -> Result<i64, CodecError> {
    field.parse::<i64>().map_err(|_err| CodecError::NonNumeric {
        line,
        field: field.to_owned(),
    })
}

fn parse_coordinate(line: usize, field: &str, grid_size: u32) -> Result<u32, CodecError> {
    let value = parse_integer(line, field)?;
    u32::try_from(value)
        .ok()
        .filter(|v| (1..=grid_size).contains(v))
        .ok_or(CodecError::CoordinateOutOfRange {
            line,
            value,
            grid_size,
        })
}

/// The lowest shared cell of two rectangles, if they intersect.
fn shared_cell(a: Rectangle, b: Rectangle) -> Option<Coordinates> {
    let x = a.min_x.max(b.min_x);
    let y = a.min_y.max(b.min_y);
    (x <= a.max_x.min(b.max_x) && y <= a.max_y.min(b.max_y)).then_some(Coordinates::new(x, y))
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Plain-text rendering of a batch of outcomes.
///
/// ```
/// use eurodiff_core::codec::TextReport;
///
/// assert_eq!(TextReport(&[]).to_string(), "");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a>(pub &'a [CaseOutcome]);

impl core::fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (number, outcome) in (1_usize..).zip(self.0) {
            writeln!(f, "Case number {number}")?;
            for record in &outcome.records {
                writeln!(f, "{} {}", record.country, record.day)?;
            }
        }
        Ok(())
    }
}

/// Render outcomes as text.
pub fn encode(outcomes: &[CaseOutcome]) -> String {
    TextReport(outcomes).to_string()
}

/// One case in the JSON rendering.
#[derive(Debug, Serialize)]
struct NumberedCase<'a> {
    case_number: usize,
    #[serde(flatten)]
    outcome: &'a CaseOutcome,
}

/// Render outcomes as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns the serializer error, which only occurs if serialization itself
/// is broken.
pub fn encode_json(outcomes: &[CaseOutcome]) -> Result<String, serde_json::Error> {
    let numbered: Vec<NumberedCase<'_>> = (1_usize..)
        .zip(outcomes)
        .map(|(case_number, outcome)| NumberedCase {
            case_number,
            outcome,
        })
        .collect();
    serde_json::to_string_pretty(&numbered)
}
