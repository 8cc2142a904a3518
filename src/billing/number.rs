//! Financial-year scoped bill numbering
//!
//! Bill numbers look like `GST/2025-26/0007`: a prefix derived from the bill
//! type, the Indian financial year (April to March) and a zero-padded
//! sequence. The generator is stateless; it derives the next sequence from
//! the numbers already issued. Keeping two concurrent allocations for the same
//! type and year apart is the caller's job: either hold an exclusive
//! transaction around scan, allocate and persist, or use an atomic per-key
//! counter such as [`crate::traits::BillRepository::next_sequence`].

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::config::NumberingConfig;
use crate::types::BillingMode;

/// Kind of bill being issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillType {
    Gst,
    NonGst,
    Quotation,
    Demo,
}

impl BillType {
    pub const ALL: [BillType; 4] = [
        BillType::Gst,
        BillType::NonGst,
        BillType::Quotation,
        BillType::Demo,
    ];

    /// Number prefix for this bill type
    pub fn prefix(self, config: &NumberingConfig) -> &str {
        match self {
            BillType::Gst => "GST",
            BillType::NonGst => "NGST",
            BillType::Quotation => "QUO",
            BillType::Demo => config.demo_prefix(),
        }
    }

    /// Bill type owning a prefix
    pub fn from_prefix(prefix: &str, config: &NumberingConfig) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|bill_type| bill_type.prefix(config) == prefix)
    }

    /// Whether bills of this type carry GST
    pub fn billing_mode(self) -> BillingMode {
        match self {
            BillType::NonGst => BillingMode::NonGst,
            BillType::Gst | BillType::Quotation | BillType::Demo => BillingMode::Gst,
        }
    }
}

/// Indian financial year, April 1 to March 31, labelled `YYYY-YY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FinancialYear {
    start_year: i32,
}

impl FinancialYear {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Financial year containing a date
    pub fn from_date(date: NaiveDate) -> Self {
        if date.month() >= 4 {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.start_year + 1
    }

    /// April 1 of the start year
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year, 4, 1)
    }

    /// March 31 of the end year
    pub fn last_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.end_year(), 3, 31)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}",
            self.start_year,
            self.end_year().rem_euclid(100)
        )
    }
}

impl FromStr for FinancialYear {
    type Err = NumberingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NumberingError::MalformedFinancialYear(s.to_string());

        let (start, short_end) = s.split_once('-').ok_or_else(malformed)?;
        if start.len() != 4
            || short_end.len() != 2
            || !start.chars().all(|c| c.is_ascii_digit())
            || !short_end.chars().all(|c| c.is_ascii_digit())
        {
            return Err(malformed());
        }

        let start_year: i32 = start.parse().map_err(|_| malformed())?;
        let short_end: i32 = short_end.parse().map_err(|_| malformed())?;
        if (start_year + 1).rem_euclid(100) != short_end {
            return Err(malformed());
        }

        Ok(Self::new(start_year))
    }
}

impl TryFrom<String> for FinancialYear {
    type Error = NumberingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FinancialYear> for String {
    fn from(year: FinancialYear) -> Self {
        year.to_string()
    }
}

/// An issued bill number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillNumber {
    pub bill_type: BillType,
    pub financial_year: FinancialYear,
    pub sequence: u32,
    /// Canonical text, e.g. `GST/2025-26/0001`
    pub formatted: String,
}

impl BillNumber {
    /// Build a bill number and its canonical text
    pub fn new(
        bill_type: BillType,
        financial_year: FinancialYear,
        sequence: u32,
        config: &NumberingConfig,
    ) -> Result<Self, NumberingError> {
        if sequence == 0 {
            return Err(NumberingError::InvalidSequence(
                "Sequence numbers start at 1".to_string(),
            ));
        }

        let formatted = format!(
            "{}/{}/{:0width$}",
            bill_type.prefix(config),
            financial_year,
            sequence,
            width = config.width()
        );

        Ok(Self {
            bill_type,
            financial_year,
            sequence,
            formatted,
        })
    }

    /// Parse a formatted bill number such as `NGST/2024-25/0012`
    pub fn parse(text: &str, config: &NumberingConfig) -> Result<Self, NumberingError> {
        let text = text.trim();
        let malformed = || NumberingError::MalformedNumber(text.to_string());

        let mut parts = text.split('/');
        let (Some(prefix), Some(year), Some(sequence), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let bill_type = BillType::from_prefix(prefix, config)
            .ok_or_else(|| NumberingError::UnknownPrefix(prefix.to_string()))?;
        let financial_year: FinancialYear = year.parse()?;

        if sequence.is_empty() || !sequence.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let sequence: u32 = sequence.parse().map_err(|_| malformed())?;
        if sequence == 0 {
            return Err(malformed());
        }

        Ok(Self {
            bill_type,
            financial_year,
            sequence,
            formatted: text.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.formatted
    }
}

impl fmt::Display for BillNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted)
    }
}

/// Derives financial years and next sequence numbers
#[derive(Debug, Clone, Default)]
pub struct BillNumberGenerator {
    config: NumberingConfig,
}

impl BillNumberGenerator {
    pub fn new(config: NumberingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NumberingConfig {
        &self.config
    }

    pub fn financial_year(&self, date: NaiveDate) -> FinancialYear {
        FinancialYear::from_date(date)
    }

    /// Pattern matching issued numbers of one type and year, capturing the
    /// ASCII sequence digits. Built once per scan.
    fn pattern(
        &self,
        bill_type: BillType,
        financial_year: FinancialYear,
    ) -> Result<Regex, NumberingError> {
        let pattern = format!(
            r"^{}/{}/([0-9]+)$",
            regex::escape(bill_type.prefix(&self.config)),
            regex::escape(&financial_year.to_string())
        );
        Regex::new(&pattern).map_err(|e| NumberingError::Pattern(e.to_string()))
    }

    /// Next sequence for a type and year: one past the highest issued, or 1.
    ///
    /// Gaps are never backfilled. Numbers of other types or years are ignored.
    pub fn next_sequence<I, S>(
        &self,
        bill_type: BillType,
        financial_year: FinancialYear,
        existing: I,
    ) -> Result<u32, NumberingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pattern = self.pattern(bill_type, financial_year)?;
        let mut highest = 0u32;

        for number in existing {
            let number = number.as_ref().trim();
            let Some(captures) = pattern.captures(number) else {
                continue;
            };
            match captures[1].parse::<u32>() {
                Ok(sequence) => highest = highest.max(sequence),
                Err(_) => warn!(number, "Ignoring bill number with out-of-range sequence"),
            }
        }

        highest
            .checked_add(1)
            .ok_or(NumberingError::SequenceExhausted(bill_type, financial_year))
    }

    /// Format a bill number for an allocated sequence
    pub fn format(
        &self,
        bill_type: BillType,
        financial_year: FinancialYear,
        sequence: u32,
    ) -> Result<BillNumber, NumberingError> {
        BillNumber::new(bill_type, financial_year, sequence, &self.config)
    }

    /// Next bill number for a bill dated `date`, given the numbers already issued
    pub fn next_number<I, S>(
        &self,
        bill_type: BillType,
        date: NaiveDate,
        existing: I,
    ) -> Result<BillNumber, NumberingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let financial_year = self.financial_year(date);
        let sequence = self.next_sequence(bill_type, financial_year, existing)?;
        self.format(bill_type, financial_year, sequence)
    }

    /// Parse a formatted number with this generator's settings
    pub fn parse(&self, text: &str) -> Result<BillNumber, NumberingError> {
        BillNumber::parse(text, &self.config)
    }
}

/// Bill numbering errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumberingError {
    #[error("Malformed financial year: {0}")]
    MalformedFinancialYear(String),
    #[error("Malformed bill number: {0}")]
    MalformedNumber(String),
    #[error("Unknown bill number prefix: {0}")]
    UnknownPrefix(String),
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),
    #[error("No sequence numbers left for {0:?} in {1}")]
    SequenceExhausted(BillType, FinancialYear),
    #[error("Invalid number pattern: {0}")]
    Pattern(String),
}
