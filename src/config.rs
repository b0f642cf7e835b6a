// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use serde::Deserialize;
use crate::metrics::AveragingPolicy;
use crate::portal::models::{MetricSpec, ReportCategory, Sector};
use crate::utils::AppError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/63.0.3239.132 Safari/537.36 QIHU 360SE";

const DIRECTORY_URL_PREFIX: &str = "http://webstock.quote.hermes.hexun.com/a/sortlist?block=";
const DIRECTORY_URL_SUFFIX: &str = "&callback=stocklistrequest.sortlistback&commodityid=0&title=15\
    &direction=0&start=0&number=10000&input=undefined&time=224500\
    &column=code,name,price,updownrate,LastClose,open,high,low,volume,\
    priceweight,amount,exchangeratio,VibrationRatio,VolumeRatio";

const SECTORS: [(&str, &str); 15] = [
    ("煤炭开采业", "332"),
    ("橡胶塑料制造业", "355"),
    ("黑色金属冶炼和压延加工业", "357"),
    ("汽车制造业", "362"),
    ("土木工程建筑业", "374"),
    ("石油和天然气开采业", "333"),
    ("黑色金属矿采选业", "334"),
    ("有色金属矿采选业", "335"),
    ("纺织业", "343"),
    ("皮革、毛皮、羽毛及其制品和制鞋业", "345"),
    ("造纸和纸制品业", "348"),
    ("石油加工、炼焦和核燃料加工业", "351"),
    ("化学原料和化学制品制造业", "352"),
    ("医药制造业", "353"),
    ("有色金属冶炼和压延加工业", "358"),
];

const YEARS: [&str; 10] = ["2019", "2018", "2017", "2016", "2015", "2014", "2013", "2012", "2011", "2010"];

/// Report-index URL prefixes, one per report category.
/// The company code and `.shtml` are appended to build the page URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryUrls {
    pub balance_sheet: String,
    pub cash_flow: String,
    pub financial_ratio: String,
}

impl Default for CategoryUrls {
    fn default() -> Self {
        Self {
            balance_sheet: "http://stockdata.stock.hexun.com/2009_zcfz_".to_string(),
            cash_flow: "http://stockdata.stock.hexun.com/2009_xjll_".to_string(),
            financial_ratio: "http://stockdata.stock.hexun.com/2009_cwbl_".to_string(),
        }
    }
}

impl CategoryUrls {
    pub fn prefix(&self, category: ReportCategory) -> &str {
        match category {
            ReportCategory::BalanceSheet => &self.balance_sheet,
            ReportCategory::CashFlow => &self.cash_flow,
            ReportCategory::FinancialRatio => &self.financial_ratio,
        }
    }
}

/// Run configuration. Every field has a compiled-in default; a JSON file may override any subset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    pub directory_url_prefix: String,
    pub directory_url_suffix: String,
    pub category_urls: CategoryUrls,
    pub sectors: Vec<Sector>,
    /// Target years, also the names of the workbook sheets.
    pub years: Vec<String>,
    pub name_column: String,
    pub metrics: Vec<MetricSpec>,
    pub data_dir: PathBuf,
    pub template_file: String,
    pub output_file: String,
    /// Rows at the top of each year sheet that are left untouched.
    pub header_rows: u32,
    pub averaging: AveragingPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            directory_url_prefix: DIRECTORY_URL_PREFIX.to_string(),
            directory_url_suffix: DIRECTORY_URL_SUFFIX.to_string(),
            category_urls: CategoryUrls::default(),
            sectors: SECTORS
                .iter()
                .map(|(name, code)| Sector { name: name.to_string(), code: code.to_string() })
                .collect(),
            years: YEARS.iter().map(|y| y.to_string()).collect(),
            name_column: "公司名称".to_string(),
            metrics: default_metrics(),
            data_dir: PathBuf::from("./data"),
            template_file: "template.xlsx".to_string(),
            output_file: "data.xlsx".to_string(),
            header_rows: 1,
            averaging: AveragingPolicy::ParsedCount,
        }
    }
}

fn default_metrics() -> Vec<MetricSpec> {
    [
        ("负债和所有者（或股东权益）合计", ReportCategory::BalanceSheet, -2),
        ("经营活动产生的现金流量净额", ReportCategory::CashFlow, 13),
        ("投资活动产生的现金流量净额", ReportCategory::CashFlow, 28),
        ("筹资活动产生的现金流量净额", ReportCategory::CashFlow, 40),
        ("权益负债比率", ReportCategory::FinancialRatio, 13),
        ("总资产收益率", ReportCategory::FinancialRatio, 26),
    ]
    .into_iter()
    .map(|(column, category, row)| MetricSpec { column: column.to_string(), category, row })
    .collect()
}

impl Config {
    /// Loads a JSON config file; fields it omits keep their defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Invalid config file {}: {}", path.display(), e)))?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.sectors.is_empty() {
            return Err(AppError::Config("No sectors configured".to_string()));
        }
        if self.years.is_empty() {
            return Err(AppError::Config("No target years configured".to_string()));
        }
        if self.metrics.is_empty() {
            return Err(AppError::Config("No metrics configured".to_string()));
        }
        Ok(())
    }

    /// Keeps only the sectors whose code or name appears in `filters`. An empty filter keeps all.
    pub fn retain_sectors(&mut self, filters: &[String]) {
        if filters.is_empty() {
            return;
        }
        self.sectors.retain(|s| filters.iter().any(|f| *f == s.code || *f == s.name));
    }

    pub fn directory_url(&self, sector_code: &str) -> String {
        format!("{}{}{}", self.directory_url_prefix, sector_code, self.directory_url_suffix)
    }

    pub fn report_index_url(&self, company_code: &str, category: ReportCategory) -> String {
        format!("{}{}.shtml", self.category_urls.prefix(category), company_code)
    }

    /// Header row written to year sheets the template lacks.
    pub fn header(&self) -> Vec<String> {
        std::iter::once(self.name_column.clone())
            .chain(self.metrics.iter().map(|m| m.column.clone()))
            .collect()
    }

    pub fn template_path(&self) -> PathBuf {
        self.data_dir.join(&self.template_file)
    }

    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(&self.output_file)
    }
}
