//! Cell-level normalization for loosely typed source values.
//!
//! Upstream exports encode list-valued columns inconsistently: Python-style
//! bracketed lists, pipe-separated text, comma-separated text. Everything here
//! is total: odd input normalizes to an empty or absent value, never an error.

use crate::constants::YEAR_RANGE;

const LIST_DELIMITERS: [char; 2] = ['|', ','];

/// A raw cell value as it arrives at the loader boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Sequence(Vec<Option<String>>),
    Text(String),
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => CellValue::Text(text),
            None => CellValue::Missing,
        }
    }
}

impl From<Option<&str>> for CellValue {
    fn from(value: Option<&str>) -> Self {
        value.map(str::to_string).into()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for CellValue {
    fn from(items: Vec<String>) -> Self {
        CellValue::Sequence(items.into_iter().map(Some).collect())
    }
}

/// Convert a list-like cell into an ordered sequence of trimmed, non-empty tokens.
///
/// Text is handled in one pass: trim, strip one `[`..`]` layer, then split on
/// `|` if present, else on `,`. Fragments lose surrounding whitespace and quote
/// characters; empty fragments are dropped.
pub fn normalize_list_field(value: &CellValue) -> Vec<String> {
    match value {
        CellValue::Missing => Vec::new(),
        CellValue::Sequence(items) => items
            .iter()
            .flatten()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        CellValue::Text(text) => split_list_text(text),
    }
}

fn split_list_text(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);

    // TODO: a lone token such as "Drama" has no delimiter and yields nothing;
    // returning it as a one-element list would recover those rows.
    let Some(delimiter) = LIST_DELIMITERS.into_iter().find(|d| inner.contains(*d)) else {
        return Vec::new();
    };

    inner
        .split(delimiter)
        .map(|fragment| fragment.trim().trim_matches(|c: char| c == '\'' || c == '"'))
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim free text; missing or blank input is absent.
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Parse a year cell.
///
/// Accepts integer text and float text (`"2021.0"`, written when the upstream
/// column held nulls), truncating any fraction. Values outside `YEAR_RANGE`
/// and anything else are absent.
pub fn parse_year(raw: Option<&str>) -> Option<i32> {
    let text = raw?.trim();
    let year = match text.parse::<i32>() {
        Ok(year) => year,
        Err(_) => {
            let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?.trunc();
            if value < *YEAR_RANGE.start() as f64 || value > *YEAR_RANGE.end() as f64 {
                return None;
            }
            value as i32
        }
    };
    YEAR_RANGE.contains(&year).then_some(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[Option<&str>]) -> CellValue {
        CellValue::Sequence(items.iter().map(|i| i.map(str::to_string)).collect())
    }

    #[test]
    fn missing_yields_empty() {
        assert!(normalize_list_field(&CellValue::Missing).is_empty());
        assert!(normalize_list_field(&CellValue::Text(String::new())).is_empty());
        assert!(normalize_list_field(&CellValue::Text("   ".into())).is_empty());
    }

    #[test]
    fn sequence_is_trimmed_and_compacted() {
        let value = seq(&[Some("Action"), Some(" "), None, Some(" Drama ")]);
        assert_eq!(normalize_list_field(&value), vec!["Action", "Drama"]);
    }

    #[test]
    fn bracketed_python_list() {
        let value = CellValue::from("['Action', 'Adventure']");
        assert_eq!(normalize_list_field(&value), vec!["Action", "Adventure"]);
    }

    #[test]
    fn pipe_separated() {
        let value = CellValue::from("Action|Adventure");
        assert_eq!(normalize_list_field(&value), vec!["Action", "Adventure"]);
    }

    #[test]
    fn comma_separated() {
        let value = CellValue::from("Action, Drama");
        assert_eq!(normalize_list_field(&value), vec!["Action", "Drama"]);
    }

    #[test]
    fn pipe_takes_precedence_over_comma() {
        let value = CellValue::from("Action, Comedy|Drama");
        assert_eq!(normalize_list_field(&value), vec!["Action, Comedy", "Drama"]);
    }

    #[test]
    fn lone_token_is_discarded() {
        assert!(normalize_list_field(&CellValue::from("Action")).is_empty());
        assert!(normalize_list_field(&CellValue::from("['Action']")).is_empty());
    }

    #[test]
    fn only_one_bracket_layer_is_stripped() {
        let value = CellValue::from("[['a', 'b']]");
        assert_eq!(normalize_list_field(&value), vec!["['a", "b']"]);
    }

    #[test]
    fn double_quotes_and_empty_fragments() {
        let value = CellValue::from(r#"["Sci-Fi", "", "Thriller",]"#);
        assert_eq!(normalize_list_field(&value), vec!["Sci-Fi", "Thriller"]);
    }

    #[test]
    fn empty_brackets() {
        assert!(normalize_list_field(&CellValue::from("[]")).is_empty());
    }

    #[test]
    fn output_is_a_fixed_point() {
        let first = normalize_list_field(&CellValue::from("['Action', ' Drama ', 'Crime']"));
        let second = normalize_list_field(&CellValue::from(first.clone()));
        assert_eq!(first, second);
    }

    #[test]
    fn clean_text_trims_and_drops_blank() {
        assert_eq!(clean_text(Some("  Dune ")), Some("Dune".to_string()));
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
    }

    #[test]
    fn year_parsing() {
        assert_eq!(parse_year(Some("2021")), Some(2021));
        assert_eq!(parse_year(Some(" 1999 ")), Some(1999));
        assert_eq!(parse_year(Some("2021.0")), Some(2021));
        assert_eq!(parse_year(Some("unknown")), None);
        assert_eq!(parse_year(Some("NaN")), None);
        assert_eq!(parse_year(Some("")), None);
        assert_eq!(parse_year(Some("1e20")), None);
        assert_eq!(parse_year(Some("-1")), None);
        assert_eq!(parse_year(Some("0")), None);
        assert_eq!(parse_year(Some("-1.0")), None);
        assert_eq!(parse_year(Some("10000")), None);
        assert_eq!(parse_year(Some("9999")), Some(9999));
        assert_eq!(parse_year(None), None);
    }
}
