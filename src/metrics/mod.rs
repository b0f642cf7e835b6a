// src/metrics/mod.rs
use serde::Deserialize;

/// How the divisor of a yearly average is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragingPolicy {
    /// Mean of the parsed readings; a year with no parsed readings has no value.
    #[default]
    ParsedCount,
    /// Divisor starts at one and grows with each parsed reading, so every average is
    /// biased towards zero and a year with no readings yields `0.0`. Kept to reproduce
    /// workbooks produced by earlier runs.
    Legacy,
}

/// Raw cell text keyed by report date, in the order the reports were read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateSeries {
    entries: Vec<(String, String)>,
}

impl DateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the reading for `date`, replacing an earlier reading of the same date.
    pub fn insert(&mut self, date: impl Into<String>, raw: impl Into<String>) {
        let date = date.into();
        let raw = raw.into();
        match self.entries.iter_mut().find(|(d, _)| *d == date) {
            Some(entry) => entry.1 = raw,
            None => self.entries.push((date, raw)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(d, v)| (d.as_str(), v.as_str()))
    }
}

impl<D: Into<String>, V: Into<String>> FromIterator<(D, V)> for DateSeries {
    fn from_iter<I: IntoIterator<Item = (D, V)>>(iter: I) -> Self {
        let mut series = DateSeries::new();
        for (date, raw) in iter {
            series.insert(date, raw);
        }
        series
    }
}

/// Parses a reported figure such as `"1,234.5"`, ignoring thousands separators.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").trim().parse::<f64>().ok()
}

/// Averages every reading whose date contains `year`.
///
/// Readings that are not numbers are logged and left out of the average.
pub fn average_for_year(year: &str, series: &DateSeries, policy: AveragingPolicy) -> Option<f64> {
    let mut total = 0.0;
    let mut parsed = 0usize;

    for (date, raw) in series.iter().filter(|(date, _)| date.contains(year)) {
        match parse_amount(raw) {
            Some(value) => {
                total += value;
                parsed += 1;
            }
            None => {
                tracing::warn!("{} ({}) can't be converted to a number, leaving it out of the {} average",
                    raw.replace(',', ""), date, year);
            }
        }
    }

    match policy {
        AveragingPolicy::ParsedCount if parsed == 0 => None,
        AveragingPolicy::ParsedCount => Some(total / parsed as f64),
        AveragingPolicy::Legacy => Some(total / (parsed + 1) as f64),
    }
}

/// One workbook row: a company and its per-metric averages for a single year.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub company_name: String,
    pub values: Vec<Option<f64>>,
}

/// All metric series collected for one company, aligned with the configured metrics.
#[derive(Debug, Clone)]
pub struct CompanyMetrics {
    pub company_name: String,
    pub series: Vec<DateSeries>,
}

impl CompanyMetrics {
    pub fn row_for_year(&self, year: &str, policy: AveragingPolicy) -> OutputRow {
        OutputRow {
            company_name: self.company_name.clone(),
            values: self
                .series
                .iter()
                .map(|series| average_for_year(year, series, policy))
                .collect(),
        }
    }
}
