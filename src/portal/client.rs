// src/portal/client.rs
use std::path::PathBuf;
use reqwest::header;
use crate::config::Config;
use crate::extractors::{parse_companies, parse_report_index};
use crate::portal::models::{Company, ReportCategory, ReportIndex, Sector, TextEncoding};
use crate::portal::ReportSource;
use crate::utils::error::PortalError;
use crate::utils::{html_debug, AppError};

/// HTTP access to the stock-data portal.
pub struct PortalClient {
    http: reqwest::Client,
    config: Config,
    debug_dir: Option<PathBuf>,
}

impl PortalClient {
    pub fn new(config: &Config) -> Result<Self, PortalError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str()) // Browser-like UA
            .build()?;
        Ok(Self { http, config: config.clone(), debug_dir: None })
    }

    /// Saves annotated copies of report-index pages that fail to parse into `dir`.
    pub fn with_debug_dir(mut self, dir: PathBuf) -> Self {
        self.debug_dir = Some(dir);
        self
    }

    /// GETs `url` and decodes the body with `encoding`, whatever the server declares.
    pub async fn fetch_text(&self, url: &str, encoding: TextEncoding) -> Result<String, PortalError> {
        tracing::debug!("GET {}", url);

        let response = self.http.get(url)
            .header(header::ACCEPT, "text/html,application/javascript,*/*")
            .send()
            .await?; // Propagates reqwest::Error as PortalError::Network

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(PortalError::Http { status, url: url.to_string() });
        }

        let bytes = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(encoding.decode(&bytes))
    }
}

impl ReportSource for PortalClient {
    async fn companies(&self, sector: &Sector) -> Result<Vec<Company>, AppError> {
        let url = self.config.directory_url(&sector.code);
        let text = self.fetch_text(&url, TextEncoding::Utf8).await?;
        let companies = parse_companies(&text)?;
        tracing::info!("Sector {} ({}) lists {} companies", sector.name, sector.code, companies.len());
        Ok(companies)
    }

    async fn report_index(&self, company: &Company, category: ReportCategory) -> Result<ReportIndex, AppError> {
        let url = self.config.report_index_url(&company.code, category);
        let html = self.fetch_text(&url, TextEncoding::Gbk).await?;

        match parse_report_index(&html) {
            Ok(index) => Ok(index),
            Err(e) => {
                if let Some(dir) = &self.debug_dir {
                    match html_debug::dump_report_index(dir, &company.code, category.code(), &html) {
                        Ok(path) => tracing::info!("Saved unparseable {} index page to {}", category, path.display()),
                        Err(dump_err) => tracing::warn!("Failed to create debug HTML: {}", dump_err),
                    }
                }
                Err(e.into())
            }
        }
    }

    async fn report_page(&self, url: &str) -> Result<String, AppError> {
        Ok(self.fetch_text(url, TextEncoding::Gbk).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_fetch_text_forces_gbk_and_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let (body, _, _) = encoding_rs::GBK.encode("负债和所有者权益合计");
        let page = server
            .mock("GET", "/report")
            .match_header("user-agent", Matcher::Regex("QIHU 360SE".to_string()))
            // Declared charset is ignored in favour of the forced one
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(body.into_owned())
            .create_async()
            .await;

        let client = PortalClient::new(&Config::default()).unwrap();
        let text = client
            .fetch_text(&format!("{}/report", server.url()), TextEncoding::Gbk)
            .await
            .unwrap();

        assert_eq!(text, "负债和所有者权益合计");
        page.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server.mock("GET", "/gone").with_status(404).create_async().await;

        let client = PortalClient::new(&Config::default()).unwrap();
        let url = format!("{}/gone", server.url());
        let result = client.fetch_text(&url, TextEncoding::Utf8).await;

        match result {
            Err(PortalError::Http { status, url: failed }) => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(failed, url);
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_companies_from_directory_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let _directory = server
            .mock("GET", Matcher::Regex("^/sortlist".to_string()))
            .with_body(r#"stocklistrequest.sortlistback({"Data":[[["601088","中国神华"]],1]})"#)
            .create_async()
            .await;

        let config = Config {
            directory_url_prefix: format!("{}/sortlist?block=", server.url()),
            directory_url_suffix: "&callback=stocklistrequest.sortlistback".to_string(),
            ..Config::default()
        };
        let client = PortalClient::new(&config).unwrap();
        let sector = Sector { name: "煤炭开采业".to_string(), code: "332".to_string() };

        let companies = client.companies(&sector).await.unwrap();
        assert_eq!(companies, vec![Company { code: "601088".to_string(), name: "中国神华".to_string() }]);
    }

    #[tokio::test]
    async fn test_unparseable_index_page_is_dumped_in_debug_mode() {
        let mut server = mockito::Server::new_async().await;
        let (body, _, _) = encoding_rs::GBK.encode(r#"<div id="zaiyaocontent"><p>维护中</p></div>"#);
        let _index = server
            .mock("GET", "/2009_zcfz_600000.shtml")
            .with_body(body.into_owned())
            .create_async()
            .await;

        let mut config = Config::default();
        config.category_urls.balance_sheet = format!("{}/2009_zcfz_", server.url());
        let debug_dir = tempfile::tempdir().unwrap();
        let client = PortalClient::new(&config).unwrap().with_debug_dir(debug_dir.path().to_path_buf());
        let company = Company { code: "600000".to_string(), name: "浦发银行".to_string() };

        let result = client.report_index(&company, ReportCategory::BalanceSheet).await;
        assert!(matches!(result, Err(AppError::Extraction(_))));

        let dumps: Vec<_> = std::fs::read_dir(debug_dir.path()).unwrap().filter_map(|e| e.ok()).collect();
        assert_eq!(dumps.len(), 1);
        assert!(dumps[0].file_name().to_string_lossy().starts_with("600000_zcfz_"));
    }
}
