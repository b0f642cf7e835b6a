// src/extractors/directory.rs
use serde::Deserialize;
use serde_json::Value;
use crate::portal::models::Company;
use crate::utils::error::ExtractError;

/// Shape of the sector directory payload: `Data[0]` is the list of company records.
#[derive(Debug, Deserialize)]
struct DirectoryPayload {
    #[serde(rename = "Data")]
    data: Vec<Value>,
}

/// Strips a JSONP callback wrapper such as `cb({...})`, returning the JSON body.
pub fn unwrap_jsonp(text: &str) -> Result<&str, ExtractError> {
    let start = text.find('(').ok_or(ExtractError::MissingJsonpWrapper)?;
    let end = text.rfind(')').ok_or(ExtractError::MissingJsonpWrapper)?;
    if end <= start {
        return Err(ExtractError::MissingJsonpWrapper);
    }
    Ok(&text[start + 1..end])
}

/// Parses a directory response into `(code, name)` company records.
pub fn parse_companies(text: &str) -> Result<Vec<Company>, ExtractError> {
    let body = unwrap_jsonp(text)?;
    let payload: DirectoryPayload = serde_json::from_str(body)
        .map_err(|e| ExtractError::Json(e.to_string()))?;

    let records = payload
        .data
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractError::Json("Data[0] is not a list of records".to_string()))?;

    records
        .iter()
        .map(|record| {
            let fields = record
                .as_array()
                .ok_or_else(|| ExtractError::Json(format!("company record is not a list: {}", record)))?;
            match (fields.first().and_then(field_text), fields.get(1).and_then(field_text)) {
                (Some(code), Some(name)) => Ok(Company { code, name }),
                _ => Err(ExtractError::Json(format!("company record lacks code or name: {}", record))),
            }
        })
        .collect()
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_jsonp() {
        let json = r#"{"Data":[[["600000","浦发银行"]],1]}"#;
        let wrapped = format!("stocklistrequest.sortlistback({});", json);
        assert_eq!(unwrap_jsonp(&wrapped).unwrap(), json);
    }

    #[test]
    fn test_parse_companies() {
        let text = r#"stocklistrequest.sortlistback({"Data":[[["601088","中国神华",2245,-0.35],["600188","兖州煤业(A股)",1102,1.2]],2]})"#;
        let companies = parse_companies(text).unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0], Company { code: "601088".to_string(), name: "中国神华".to_string() });
        // Parentheses inside names do not cut the payload short
        assert_eq!(companies[1].name, "兖州煤业(A股)");
    }

    #[test]
    fn test_numeric_codes_are_stringified() {
        let companies = parse_companies(r#"cb({"Data":[[[600000,"浦发银行"]]]})"#).unwrap();
        assert_eq!(companies[0].code, "600000");
    }

    #[test]
    fn test_missing_wrapper_fails() {
        assert!(matches!(parse_companies(r#"{"Data":[]}"#), Err(ExtractError::MissingJsonpWrapper)));
        assert!(matches!(unwrap_jsonp(")cb("), Err(ExtractError::MissingJsonpWrapper)));
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(matches!(parse_companies("cb({Data:)"), Err(ExtractError::Json(_))));
        assert!(matches!(parse_companies(r#"cb({"Data":[[["600000"]]]})"#), Err(ExtractError::Json(_))));
    }
}
