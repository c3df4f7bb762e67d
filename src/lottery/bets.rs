use std::{num::ParseIntError, str::FromStr};

use chrono::NaiveDate;

use super::AgencyId;

const BET_FIELD_COUNT: usize = 6;
const BIRTHDATE_FORMAT: &str = "%Y-%m-%d";

/// A single validated bet, as submitted by an agency in one batch line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bet {
    pub agency: AgencyId,
    pub first_name: String,
    pub last_name: String,
    pub document: String,
    pub birthdate: NaiveDate,
    pub number: u32,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BatchFormatError {
    #[error("expected 6 comma separated fields, found {0}")]
    WrongFieldCount(usize),

    #[error("the \"{0}\" field is empty")]
    EmptyField(&'static str),

    #[error("{0}")]
    ParseInt(#[from] ParseIntError),

    #[error("{0}")]
    ParseDate(#[from] chrono::ParseError),

    #[error("the agency id must be a positive integer")]
    NonPositiveAgency,

    #[error("a batch must contain at least one bet")]
    EmptyBatch,
}

impl FromStr for Bet {
    type Err = BatchFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() != BET_FIELD_COUNT {
            return Err(BatchFormatError::WrongFieldCount(fields.len()));
        }

        let names = [
            "agency",
            "first name",
            "last name",
            "document",
            "birthdate",
            "number",
        ];
        for (field, name) in fields.iter().zip(names) {
            if field.is_empty() {
                return Err(BatchFormatError::EmptyField(name));
            }
        }

        let agency: AgencyId = fields[0].parse()?;
        if agency == 0 {
            return Err(BatchFormatError::NonPositiveAgency);
        }

        Ok(Self {
            agency,
            first_name: fields[1].into(),
            last_name: fields[2].into(),
            document: fields[3].into(),
            birthdate: NaiveDate::parse_from_str(fields[4], BIRTHDATE_FORMAT)?,
            number: fields[5].parse()?,
        })
    }
}

/// Parses a complete batch payload into its bet records
///
/// the batch is atomic: the first malformed line rejects every line, and a
/// payload without a single bet line is not a batch at all. blank lines are
/// skipped.
pub fn parse_batch(payload: &str) -> Result<Vec<Bet>, BatchFormatError> {
    let mut bets = Vec::new();
    for line in payload.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        bets.push(line.parse()?);
    }

    if bets.is_empty() {
        return Err(BatchFormatError::EmptyBatch);
    }

    Ok(bets)
}
