//! Row schema validation
//!
//! A schema is a static table of [`FieldSpec`]s. One generic routine,
//! [`validate_row`], checks a raw CSV row against any table and returns
//! either a [`TypedRow`] or every field violation found. Malformed input is
//! the expected case and never panics.

use std::collections::HashMap;

/// Raw row: normalized column name to cell text
pub type RawRow = HashMap<String, String>;

/// Normalize a header cell for lookup
///
/// Lower-cases, trims, and collapses internal whitespace runs to a single
/// underscore, so "Display Order", " display  order " and "display_order"
/// all resolve to `display_order`.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Type and coercion rule for one field
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Free text, optionally length-limited (in characters)
    Text { max_len: Option<usize> },
    /// Integer parsed from text, optionally bounded below
    Integer { min: Option<i64> },
    /// One of a fixed set of lower-case values; input is matched case-insensitively
    Enumeration { allowed: &'static [&'static str] },
}

/// Declarative contract for one logical field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Alternate column names consulted when `name` is absent or blank
    pub aliases: &'static [&'static str],
    /// Message reported when a required field is blank; `None` means optional
    pub required: Option<&'static str>,
    pub kind: FieldKind,
    /// Value used when the cell is blank
    pub default: Option<&'static str>,
}

impl FieldSpec {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            required: None,
            kind: FieldKind::Text { max_len: None },
            default: None,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            kind: FieldKind::Integer { min: None },
            ..Self::text(name)
        }
    }

    pub const fn enumeration(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            kind: FieldKind::Enumeration { allowed },
            ..Self::text(name)
        }
    }

    pub const fn required(self, message: &'static str) -> Self {
        Self {
            required: Some(message),
            ..self
        }
    }

    pub const fn aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    pub const fn default_value(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    /// Only meaningful on text fields
    pub const fn max_len(self, max_len: usize) -> Self {
        Self {
            kind: FieldKind::Text {
                max_len: Some(max_len),
            },
            ..self
        }
    }

    /// Only meaningful on integer fields
    pub const fn min(self, min: i64) -> Self {
        Self {
            kind: FieldKind::Integer { min: Some(min) },
            ..self
        }
    }

    /// First non-blank cell among the field name and its aliases
    fn lookup<'a>(&self, raw: &'a RawRow) -> Option<&'a str> {
        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .filter_map(|column| raw.get(column))
            .map(|cell| cell.trim())
            .find(|cell| !cell.is_empty())
    }

    fn coerce(&self, cell: &str) -> Result<FieldValue, String> {
        match self.kind {
            FieldKind::Text { max_len } => {
                if let Some(max) = max_len {
                    let len = cell.chars().count();
                    if len > max {
                        return Err(format!(
                            "{}: must be at most {} characters (got {})",
                            self.name, max, len
                        ));
                    }
                }
                Ok(FieldValue::Text(cell.to_string()))
            }
            FieldKind::Integer { min } => {
                let value: i64 = cell.parse().map_err(|_| {
                    format!("{}: expected an integer, got '{}'", self.name, cell)
                })?;
                if let Some(min) = min {
                    if value < min {
                        return Err(format!(
                            "{}: must be at least {} (got {})",
                            self.name, min, value
                        ));
                    }
                }
                Ok(FieldValue::Integer(value))
            }
            FieldKind::Enumeration { allowed } => {
                let lowered = cell.to_lowercase();
                if allowed.contains(&lowered.as_str()) {
                    Ok(FieldValue::Text(lowered))
                } else {
                    Err(format!(
                        "{}: must be one of {} (got '{}')",
                        self.name,
                        allowed.join(", "),
                        cell
                    ))
                }
            }
        }
    }
}

/// Normalized field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Null,
}

/// Row that passed its schema; every declared field has a value (possibly `Null`)
#[derive(Debug, Clone, Default)]
pub struct TypedRow {
    values: HashMap<&'static str, FieldValue>,
}

impl TypedRow {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Text value, `None` for null or non-text
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.values.get(field) {
            Some(FieldValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn owned_text(&self, field: &str) -> Option<String> {
        self.text(field).map(str::to_string)
    }

    /// Integer value, `None` for null or non-integer
    pub fn integer(&self, field: &str) -> Option<i64> {
        match self.values.get(field) {
            Some(FieldValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }
}

/// Validate one raw row against a schema table
///
/// All fields are checked; the error list carries one message per failing
/// field, each prefixed with the field name.
pub fn validate_row(raw: &RawRow, specs: &[FieldSpec]) -> Result<TypedRow, Vec<String>> {
    let mut row = TypedRow::default();
    let mut violations = Vec::new();

    for spec in specs {
        let cell = spec.lookup(raw).or(spec.default);

        let value = match cell {
            Some(cell) => match spec.coerce(cell) {
                Ok(value) => value,
                Err(violation) => {
                    violations.push(violation);
                    continue;
                }
            },
            None => {
                if let Some(message) = spec.required {
                    violations.push(format!("{}: {}", spec.name, message));
                    continue;
                }
                FieldValue::Null
            }
        };

        row.values.insert(spec.name, value);
    }

    if violations.is_empty() {
        Ok(row)
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[FieldSpec] = &[
        FieldSpec::text("name").required("Name is required").max_len(5),
        FieldSpec::integer("order").aliases(&["ord"]),
        FieldSpec::integer("rank").min(1),
        FieldSpec::enumeration("color", &["red", "blue"]).default_value("red"),
        FieldSpec::text("note"),
    ];

    fn raw(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn normalize_header_collapses_whitespace() {
        assert_eq!(normalize_header("Display Order"), "display_order");
        assert_eq!(normalize_header("  display   order "), "display_order");
        assert_eq!(normalize_header("display_order"), "display_order");
        assert_eq!(normalize_header("Team\tName"), "team_name");
    }

    #[test]
    fn valid_row_is_normalized() {
        let row = validate_row(&raw(&[("name", " Ann "), ("order", "5"), ("color", "BLUE")]), SPECS)
            .unwrap();

        assert_eq!(row.text("name"), Some("Ann"));
        assert_eq!(row.integer("order"), Some(5));
        assert_eq!(row.text("color"), Some("blue"));
        assert_eq!(row.get("rank"), Some(&FieldValue::Null));
        assert_eq!(row.get("note"), Some(&FieldValue::Null));
    }

    #[test]
    fn blank_cells_become_null_or_default() {
        let row = validate_row(&raw(&[("name", "Ann"), ("order", ""), ("color", "  ")]), SPECS)
            .unwrap();

        assert_eq!(row.get("order"), Some(&FieldValue::Null));
        assert_eq!(row.text("color"), Some("red"));
    }

    #[test]
    fn alias_is_consulted_when_primary_is_blank() {
        let row = validate_row(&raw(&[("name", "Ann"), ("order", ""), ("ord", "7")]), SPECS).unwrap();
        assert_eq!(row.integer("order"), Some(7));
    }

    #[test]
    fn every_violation_is_reported() {
        let violations = validate_row(
            &raw(&[("name", "Toolong"), ("order", "x1"), ("rank", "0"), ("color", "green")]),
            SPECS,
        )
        .unwrap_err();

        assert_eq!(violations.len(), 4);
        assert!(violations[0].starts_with("name: must be at most 5"));
        assert_eq!(violations[1], "order: expected an integer, got 'x1'");
        assert_eq!(violations[2], "rank: must be at least 1 (got 0)");
        assert!(violations[3].starts_with("color: must be one of red, blue"));
    }

    #[test]
    fn missing_required_column_is_a_violation() {
        let violations = validate_row(&raw(&[("note", "hi")]), SPECS).unwrap_err();
        assert_eq!(violations, vec!["name: Name is required".to_string()]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let row = validate_row(&raw(&[("name", "Zoë5é")]), SPECS);
        assert!(row.is_ok());
    }
}
