// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use umya_spreadsheet::Spreadsheet;
use crate::metrics::OutputRow;
use crate::utils::error::StorageError;

/// Output workbook held in memory for the whole run; each year is a sheet.
pub struct WorkbookWriter {
    book: Spreadsheet,
    path: PathBuf,
    header: Vec<String>,
    header_rows: u32,
}

impl WorkbookWriter {
    /// Copies the template to `output` and opens the copy.
    pub fn from_template(template: &Path, output: &Path, header: Vec<String>, header_rows: u32) -> Result<Self, StorageError> {
        if !template.exists() {
            return Err(StorageError::TemplateMissing(template.to_path_buf()));
        }
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(template, output)?;
        tracing::info!("Copied template {} to {}", template.display(), output.display());

        Self::open(output, header, header_rows)
    }

    /// Opens an existing workbook.
    pub fn open(path: &Path, header: Vec<String>, header_rows: u32) -> Result<Self, StorageError> {
        let book = umya_spreadsheet::reader::xlsx::read(path)
            .map_err(|e| StorageError::Workbook(format!("failed to read {}: {}", path.display(), e)))?;
        Ok(Self { book, path: path.to_path_buf(), header, header_rows })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.book
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect()
    }

    /// Writes `row` to the sheet named `sheet_name`, `row_index` rows below the header.
    ///
    /// Column A holds the company name, the metrics follow in B onwards. Missing averages leave
    /// their cell untouched. A sheet the template lacks is created with a header row.
    pub fn write_row(&mut self, sheet_name: &str, row_index: u32, row: &OutputRow) -> Result<(), StorageError> {
        if self.book.get_sheet_by_name(sheet_name).is_none() {
            self.add_sheet(sheet_name)?;
        }
        let sheet = self
            .book
            .get_sheet_by_name_mut(sheet_name)
            .ok_or_else(|| StorageError::Workbook(format!("sheet {} not found", sheet_name)))?;

        // Spreadsheet coordinates are 1-based (column, row)
        let excel_row = self.header_rows + row_index + 1;
        sheet.get_cell_mut((1, excel_row)).set_value_string(row.company_name.clone());
        for (offset, value) in row.values.iter().enumerate() {
            if let Some(value) = value {
                sheet.get_cell_mut((offset as u32 + 2, excel_row)).set_value_number(*value);
            }
        }
        Ok(())
    }

    fn add_sheet(&mut self, sheet_name: &str) -> Result<(), StorageError> {
        tracing::warn!("Workbook has no sheet named {}, creating it", sheet_name);
        let header_rows = self.header_rows;
        let header = self.header.clone();
        let sheet = self
            .book
            .new_sheet(sheet_name)
            .map_err(|e| StorageError::Workbook(format!("failed to add sheet {}: {}", sheet_name, e)))?;
        if header_rows > 0 {
            for (col, title) in header.into_iter().enumerate() {
                sheet.get_cell_mut((col as u32 + 1, 1)).set_value_string(title);
            }
        }
        Ok(())
    }

    /// Saves the workbook by writing a sibling temp file and renaming it over the output.
    pub fn flush(&self) -> Result<(), StorageError> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workbook.xlsx".to_string());
        let tmp_path = self.path.with_file_name(format!(".{}.tmp", file_name));

        umya_spreadsheet::writer::xlsx::write(&self.book, &tmp_path)
            .map_err(|e| StorageError::Workbook(format!("failed to write {}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!("Saved workbook to {}", self.path.display());
        Ok(())
    }
}
