// src/pipeline.rs
use std::time::Instant;
use crate::config::Config;
use crate::extractors::extract_values;
use crate::metrics::{CompanyMetrics, DateSeries};
use crate::portal::models::{Company, ReportCategory};
use crate::portal::ReportSource;
use crate::storage::WorkbookWriter;
use crate::utils::error::StorageError;
use crate::utils::AppError;

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Walks every configured sector and company, writing one row per company on each year sheet.
pub struct Pipeline<'a, S: ReportSource> {
    source: S,
    config: &'a Config,
    writer: WorkbookWriter,
    // Row shared by all year sheets for the next company written
    next_row: u32,
}

impl<'a, S: ReportSource> Pipeline<'a, S> {
    pub fn new(source: S, config: &'a Config, writer: WorkbookWriter) -> Self {
        Self { source, config, writer, next_row: 0 }
    }

    pub fn next_row(&self) -> u32 {
        self.next_row
    }

    /// Runs the whole scrape.
    ///
    /// A company whose pages fail to fetch or parse is logged and skipped without writing
    /// anything. Directory and workbook failures abort the run.
    pub async fn run(&mut self) -> Result<RunSummary, AppError> {
        let config = self.config;
        let mut summary = RunSummary::default();

        for sector in &config.sectors {
            let companies = self.source.companies(sector).await?;

            for (index, company) in companies.iter().enumerate() {
                let started = Instant::now();
                tracing::info!("Start to fetch data of company {} ({})", company.name, company.code);

                let metrics = match self.collect_company(company).await {
                    Ok(metrics) => metrics,
                    Err(e) => {
                        tracing::error!("Failed to fetch data of {}, skipping the company: {}", company.name, e);
                        summary.skipped += 1;
                        continue;
                    }
                };

                self.write_company(&metrics)?;
                summary.processed += 1;
                tracing::info!(
                    "Finish saving data of {}, cost: {:.2}s, line: {}, index: {}, category: {}",
                    company.name,
                    started.elapsed().as_secs_f64(),
                    self.next_row,
                    index,
                    sector.name
                );
            }
        }

        tracing::info!("Processing finished. Processed: {}, Skipped: {}", summary.processed, summary.skipped);
        Ok(summary)
    }

    /// Reads every configured metric of `company`, one series per metric.
    ///
    /// Each report category's index is resolved once, and each dated page is fetched once
    /// with all of that category's rows read from it.
    pub async fn collect_company(&self, company: &Company) -> Result<CompanyMetrics, AppError> {
        let metrics = &self.config.metrics;
        let mut series = vec![DateSeries::new(); metrics.len()];

        for category in ReportCategory::ALL {
            let slots: Vec<usize> = (0..metrics.len())
                .filter(|&i| metrics[i].category == category)
                .collect();
            if slots.is_empty() {
                continue;
            }
            let rows: Vec<isize> = slots.iter().map(|&i| metrics[i].row).collect();

            let index = self.source.report_index(company, category).await?;
            tracing::debug!("{} {} report index lists {} dates", company.name, category, index.dates.len());

            // Oldest report first
            for date in index.dates.iter().rev() {
                let html = self.source.report_page(&index.query_url(date)).await?;
                let values = extract_values(&html, &rows)?;
                for (&slot, value) in slots.iter().zip(values) {
                    series[slot].insert(date.as_str(), value);
                }
            }

            for &slot in &slots {
                tracing::info!("Finish fetching {} of {} ({} reports)", metrics[slot].column, company.name, series[slot].len());
            }
        }

        if series.iter().all(DateSeries::is_empty) {
            tracing::warn!("{} has no published reports, its rows will be blank", company.name);
        }

        Ok(CompanyMetrics { company_name: company.name.clone(), series })
    }

    fn write_company(&mut self, metrics: &CompanyMetrics) -> Result<(), StorageError> {
        for year in &self.config.years {
            let row = metrics.row_for_year(year, self.config.averaging);
            self.writer.write_row(year, self.next_row, &row)?;
        }
        self.writer.flush()?;
        self.next_row += 1;
        Ok(())
    }
}
