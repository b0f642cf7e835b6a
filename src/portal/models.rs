// src/portal/models.rs
use serde::Deserialize;
use std::fmt;

/// An industry sector as classified by the portal's directory endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sector {
    pub name: String,
    pub code: String,
}

/// A listed company enumerated from a sector directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub code: String,
    pub name: String,
}

/// The three financial statement types scraped per company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    BalanceSheet,
    CashFlow,
    FinancialRatio,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 3] = [
        ReportCategory::BalanceSheet,
        ReportCategory::CashFlow,
        ReportCategory::FinancialRatio,
    ];

    /// Short code the portal uses in its page names.
    pub fn code(&self) -> &'static str {
        match self {
            ReportCategory::BalanceSheet => "zcfz",
            ReportCategory::CashFlow => "xjll",
            ReportCategory::FinancialRatio => "cwbl",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportCategory::BalanceSheet => "balance sheet",
            ReportCategory::CashFlow => "cash flow",
            ReportCategory::FinancialRatio => "financial ratio",
        };
        f.write_str(name)
    }
}

/// One financial line item: which report it lives in and which table row holds it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricSpec {
    /// Column header in the output workbook
    pub column: String,
    pub category: ReportCategory,
    /// Table row index; negative values count back from the last row.
    pub row: isize,
}

/// Query URL template plus the report dates a company has published for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportIndex {
    pub url_template: String,
    /// Dates as listed by the portal, newest first
    pub dates: Vec<String>,
}

impl ReportIndex {
    /// Builds the report page URL for `date` by appending it to the template's trailing parameter.
    pub fn query_url(&self, date: &str) -> String {
        if self.url_template.ends_with('=') {
            format!("{}{}", self.url_template, date)
        } else {
            format!("{}={}", self.url_template, date)
        }
    }
}

/// Encoding forced onto a response body regardless of what the server declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Gbk,
}

impl TextEncoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        let encoding = match self {
            TextEncoding::Utf8 => encoding_rs::UTF_8,
            TextEncoding::Gbk => encoding_rs::GBK,
        };
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            tracing::debug!("Replaced malformed {:?} sequences while decoding", self);
        }
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url_appends_date() {
        let index = ReportIndex {
            url_template: "http://stockdata.stock.hexun.com/2008/zcfz.aspx?stockid=600000&accountdate=".to_string(),
            dates: vec![],
        };
        assert_eq!(
            index.query_url("2019.12.31"),
            "http://stockdata.stock.hexun.com/2008/zcfz.aspx?stockid=600000&accountdate=2019.12.31"
        );

        let bare = ReportIndex { url_template: "http://x/?date".to_string(), dates: vec![] };
        assert_eq!(bare.query_url("2010.06.30"), "http://x/?date=2010.06.30");
    }

    #[test]
    fn test_gbk_decoding() {
        let (bytes, _, _) = encoding_rs::GBK.encode("资产");
        assert_eq!(bytes.len(), 4);
        assert_eq!(TextEncoding::Gbk.decode(&bytes), "资产");
        assert_ne!(TextEncoding::Utf8.decode(&bytes), "资产");
        assert_eq!(TextEncoding::Utf8.decode("资产".as_bytes()), "资产");
    }
}
