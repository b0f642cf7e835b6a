// src/extractors/report_index.rs

// --- Imports ---
use crate::portal::models::ReportIndex;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

// --- CSS Selectors (Lazy Static) ---
pub(crate) static CONTENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#zaiyaocontent").expect("Failed to compile CONTENT_SELECTOR")
});

static SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script").expect("Failed to compile SCRIPT_SELECTOR")
});

// --- Regex Patterns (Lazy Static) ---
// First assignment of a quoted string literal: `var dateurl = "http://...&date=";`
static TEMPLATE_ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:var\s+)?[A-Za-z_$][\w$]*\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("Failed to compile TEMPLATE_ASSIGNMENT_RE")
});

// Start of an array assignment: `dates = [`
static ARRAY_ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z_$][\w$]*\s*=\s*\[").expect("Failed to compile ARRAY_ASSIGNMENT_RE")
});

// Leading string literal of one tuple: `["2019.12.31", ...]` or `('2019.12.31', ...)`
static TUPLE_HEAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[\[(]\s*(?:"([^"]*)"|'([^']*)')"#).expect("Failed to compile TUPLE_HEAD_RE")
});

static STRING_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:"([^"]*)"|'([^']*)')$"#).expect("Failed to compile STRING_LITERAL_RE")
});

/// Parses a report-index page into its query URL template and available report dates.
///
/// The page embeds both in the first `<script>` of `#zaiyaocontent`, e.g.
/// `var dateurl="http://...&accountdate=";var dates = [["2019.12.31","..."],...]`.
/// The script is read as data; nothing in it is evaluated.
pub fn parse_report_index(html: &str) -> Result<ReportIndex, ExtractError> {
    let document = Html::parse_document(html);

    let content = document
        .select(&CONTENT_SELECTOR)
        .next()
        .ok_or_else(|| ExtractError::MissingElement("#zaiyaocontent".to_string()))?;
    let script = content
        .select(&SCRIPT_SELECTOR)
        .next()
        .ok_or_else(|| ExtractError::MissingElement("#zaiyaocontent script".to_string()))?;
    let script_text = script.text().collect::<String>();

    parse_script(&script_text)
}

/// Extracts the template literal and date list from the script source.
pub fn parse_script(script: &str) -> Result<ReportIndex, ExtractError> {
    // The template is the first statement; later statements never stand in for it
    let first_statement = script.split(';').next().unwrap_or_default();
    let template = TEMPLATE_ASSIGNMENT_RE
        .captures(first_statement)
        .ok_or_else(|| ExtractError::MalformedScript("first statement is not a URL template literal".to_string()))?;
    let url_template = template
        .get(1)
        .or_else(|| template.get(2))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    if url_template.is_empty() {
        return Err(ExtractError::MalformedScript("URL template is empty".to_string()));
    }

    let rest = &script[first_statement.len()..];
    let array_start = ARRAY_ASSIGNMENT_RE
        .find(rest)
        .map(|m| m.end() - 1)
        .ok_or_else(|| ExtractError::MalformedScript("no dates array assignment".to_string()))?;
    let array = bracketed(&rest[array_start..])
        .ok_or_else(|| ExtractError::MalformedScript("dates array is not closed".to_string()))?;

    let dates = parse_dates(array)?;
    tracing::debug!("Parsed report index: template '{}', {} dates", url_template, dates.len());

    Ok(ReportIndex { url_template, dates })
}

/// Reads the date of every tuple in an array literal. A flat array of strings is accepted too.
///
/// Every tuple must start with a string literal, and tuples and bare strings cannot be mixed.
fn parse_dates(array: &str) -> Result<Vec<String>, ExtractError> {
    let inner = &array[1..array.len() - 1];
    let items = top_level_items(inner);
    let tuples = items.iter().filter(|item| item.starts_with(['[', '('])).count();

    if tuples > 0 && tuples < items.len() {
        return Err(ExtractError::MalformedScript("dates array mixes tuples and bare values".to_string()));
    }

    let head = if tuples > 0 { &*TUPLE_HEAD_RE } else { &*STRING_LITERAL_RE };
    items
        .iter()
        .map(|item| {
            head.captures(item)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| m.as_str().trim().to_string())
                .ok_or_else(|| ExtractError::MalformedScript(format!("report date is not a string: {}", item)))
        })
        .collect()
}

/// Splits the contents of an array literal on its top-level commas. Empty items are dropped.
fn top_level_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(inner[start..].trim());
    items.retain(|item| !item.is_empty());
    items
}

/// Returns the slice from the opening `[` at the start of `text` up to its matching `]`.
fn bracketed(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '(' => depth += 1,
            ']' | ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
