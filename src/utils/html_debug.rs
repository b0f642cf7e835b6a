// src/utils/html_debug.rs
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use crate::utils::error::AppError;

/// Patterns highlighted in dumped report-index pages.
pub const REPORT_INDEX_PATTERNS: [(&str, &str); 4] = [
    (r#"(?i)<div[^>]*id=['"]?zaiyaocontent['"]?[^>]*>"#, "container"),
    (r"(?is)<script[^>]*>.*?</script>", "script"),
    (r#"(?i)\w+\s*=\s*["'][^"']*["']"#, "template"),
    (r"(?s)\w+\s*=\s*\[\s*[\[(].*?[\])]\s*\]", "dates"),
];

/// Wraps the given byte ranges of `html` in highlight spans and returns the annotated document.
pub fn annotate_html(html: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    debug_html.push_str(".highlight-container { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-script { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-template { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-dates { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, highlight_type) in sorted_highlights {
        // Overlapping matches (a template inside a script) keep the outer span only
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "container" => "highlight-container",
            "script" => "highlight-script",
            "template" => "highlight-template",
            "dates" => "highlight-dates",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!("<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }

    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }
    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Saves `html` with every match of the given regex patterns highlighted.
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }

    fs::write(path, annotate_html(html, &highlights))?;
    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Dumps a report-index page that failed to parse into `debug_dir`.
pub fn dump_report_index(debug_dir: &Path, company_code: &str, category: &str, html: &str) -> Result<PathBuf, AppError> {
    fs::create_dir_all(debug_dir)?;
    let filename = format!("{}_{}_{}.html",
        company_code,
        category,
        chrono::Local::now().format("%Y%m%d%H%M%S"));
    let path = debug_dir.join(filename);
    create_debug_html(html, &path, &REPORT_INDEX_PATTERNS)?;
    Ok(path)
}
