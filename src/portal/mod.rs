// src/portal/mod.rs
pub mod client;
pub mod models;

use crate::utils::AppError;
use models::{Company, ReportCategory, ReportIndex, Sector};

pub use client::PortalClient;

/// Where the pipeline gets its pages from. Implemented over HTTP by [`PortalClient`].
#[allow(async_fn_in_trait)]
pub trait ReportSource {
    /// Lists the companies of a sector.
    async fn companies(&self, sector: &Sector) -> Result<Vec<Company>, AppError>;

    /// Resolves the query URL template and report dates of one report category.
    async fn report_index(&self, company: &Company, category: ReportCategory) -> Result<ReportIndex, AppError>;

    /// Fetches a rendered report page.
    async fn report_page(&self, url: &str) -> Result<String, AppError>;
}
