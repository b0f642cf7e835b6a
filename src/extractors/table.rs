// src/extractors/table.rs
use crate::extractors::report_index::CONTENT_SELECTOR;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table").expect("Failed to compile TABLE_SELECTOR")
});

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td").expect("Failed to compile CELL_SELECTOR")
});

/// Column holding the reported figure; column 0 is the line-item label.
const VALUE_COLUMN: usize = 1;

/// Maps a signed row index onto a table of `len` rows. Negative indices count from the end.
pub fn resolve_row(index: isize, len: usize) -> Option<usize> {
    if index >= 0 {
        let i = index as usize;
        (i < len).then_some(i)
    } else {
        len.checked_sub(index.unsigned_abs())
    }
}

/// Reads the value cell of each requested row from a rendered report page.
///
/// Values come back as raw trimmed text, in the order of `rows`.
pub fn extract_values(html: &str, rows: &[isize]) -> Result<Vec<String>, ExtractError> {
    let document = Html::parse_document(html);

    let content = document
        .select(&CONTENT_SELECTOR)
        .next()
        .ok_or_else(|| ExtractError::MissingElement("#zaiyaocontent".to_string()))?;
    let table = content
        .select(&TABLE_SELECTOR)
        .next()
        .ok_or_else(|| ExtractError::MissingElement("#zaiyaocontent table".to_string()))?;
    let table_rows: Vec<ElementRef> = table.select(&ROW_SELECTOR).collect();

    rows.iter()
        .map(|&index| {
            let row = resolve_row(index, table_rows.len())
                .ok_or(ExtractError::RowOutOfRange { index, rows: table_rows.len() })?;
            let cell = table_rows[row]
                .select(&CELL_SELECTOR)
                .nth(VALUE_COLUMN)
                .ok_or(ExtractError::MissingCell(row))?;
            Ok(cell.text().collect::<String>().trim().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_page(values: &[&str]) -> String {
        let rows: String = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("<tr><td>item {}</td><td>\n  {} </td></tr>", i, v))
            .collect();
        format!(
            r#"<html><body><div id="zaiyaocontent"><table>{}</table></div></body></html>"#,
            rows
        )
    }

    #[test]
    fn test_resolve_row() {
        assert_eq!(resolve_row(0, 3), Some(0));
        assert_eq!(resolve_row(2, 3), Some(2));
        assert_eq!(resolve_row(3, 3), None);
        assert_eq!(resolve_row(-1, 3), Some(2));
        assert_eq!(resolve_row(-3, 3), Some(0));
        assert_eq!(resolve_row(-4, 3), None);
    }

    #[test]
    fn test_extract_values_by_row() {
        let html = report_page(&["header", "1,234.5", "--", "9,999,999.00", "footer"]);
        let values = extract_values(&html, &[1, -2, 2]).unwrap();
        assert_eq!(values, vec!["1,234.5", "9,999,999.00", "--"]);
    }

    #[test]
    fn test_out_of_range_row() {
        let html = report_page(&["a", "b"]);
        assert!(matches!(
            extract_values(&html, &[13]),
            Err(ExtractError::RowOutOfRange { index: 13, rows: 2 })
        ));
    }

    #[test]
    fn test_row_without_value_cell() {
        let html = r#"<div id="zaiyaocontent"><table><tr><th>head</th></tr><tr><td>only label</td></tr></table></div>"#;
        assert!(matches!(extract_values(html, &[1]), Err(ExtractError::MissingCell(1))));
    }

    #[test]
    fn test_missing_table() {
        let html = r#"<div id="zaiyaocontent"><p>no data</p></div>"#;
        assert!(matches!(extract_values(html, &[0]), Err(ExtractError::MissingElement(_))));
    }
}
