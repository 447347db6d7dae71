//! Domain records and the validation that turns spreadsheet-like rows into them.
//!
//! Rows arrive as three cells each, mirroring the column layout of the upload templates.  The
//! first sheet row is the header, so the first data row is reported as row 2.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest accepted price.
pub const MAX_PRICE: u32 = 1_000_000;

/// Highest accepted shelf life: one year in hours.
pub const MAX_HOURS: u32 = 24 * 365;

/// Accepted length of a tip-jar owner's name, in characters.
pub const TIPS_NAME_CHARS: (usize, usize) = (1, 40);

/// Accepted length of a tip-jar goal, in characters.
pub const TIPS_GOAL_CHARS: (usize, usize) = (1, 80);

/// Accepted length of a tip-jar link, in characters.
pub const TIPS_LINK_CHARS: (usize, usize) = (1, 300);

/// Sheet row of the first data row.
const FIRST_DATA_ROW: usize = 2;

/// A single spreadsheet value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Free text.
    Text(String),
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.trim().to_owned(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(value) if value.trim().is_empty())
    }
}

/// One sheet row; `None` is an empty cell.
pub type Row = Vec<Option<Cell>>;

/// Interprets a cell as a whole number.
///
/// Integers pass through and floats only when integral.  Text is trimmed, `,` is read as a
/// decimal point, and only digits optionally followed by `.0...` are accepted.
pub fn parse_int_number(cell: Option<&Cell>) -> Option<i64> {
    match cell? {
        Cell::Integer(value) => Some(*value),
        Cell::Float(value) => {
            if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                Some(*value as i64)
            } else {
                None
            }
        }
        Cell::Text(value) => {
            let normalized = value.trim().replace(',', ".");
            let (digits, fraction) = match normalized.split_once('.') {
                Some((digits, fraction)) => (digits, Some(fraction)),
                None => (normalized.as_str(), None),
            };
            let digits_ok = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
            let fraction_ok = fraction.map_or(true, |f| !f.is_empty() && f.chars().all(|c| c == '0'));
            if digits_ok && fraction_ok {
                digits.parse().ok()
            } else {
                None
            }
        }
    }
}

/// Errors raised while validating input rows or fields.
#[derive(Debug)]
pub enum ValidationError {
    /// A required text cell is empty.
    EmptyField {
        /// Sheet row, header being row 1.
        row: usize,
        /// Column name.
        field: &'static str,
    },
    /// A numeric cell is not a whole number within its range.
    InvalidNumber {
        /// Sheet row, header being row 1.
        row: usize,
        /// Column name.
        field: &'static str,
        /// Highest accepted value; the lowest is zero.
        max: u32,
    },
    /// The sheet has no data rows.
    NoRows,
    /// A free-text field is too short or too long.
    FieldLength {
        /// Field name.
        field: &'static str,
        /// Shortest accepted length.
        min: usize,
        /// Longest accepted length.
        max: usize,
        /// Length received.
        actual: usize,
    },
    /// A link does not start with `http://` or `https://`.
    InvalidLink,
    /// Rows could not be read as JSON.
    Json(serde_json::Error),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { row, field } => write!(f, "row {row}: {field} is empty"),
            Self::InvalidNumber { row, field, max } => {
                write!(f, "row {row}: {field} must be a whole number (0..{max})")
            }
            Self::NoRows => write!(f, "no rows to build: fill in at least one row"),
            Self::FieldLength {
                field,
                min,
                max,
                actual,
            } => write!(f, "{field} must be {min}-{max} characters, got {actual}"),
            Self::InvalidLink => write!(f, "link must start with http:// or https://"),
            Self::Json(err) => write!(f, "malformed rows: {err}"),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// A tea item: one bank label and one box label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeaRecord {
    /// Tea type, e.g. "Пуэр".
    pub tea_type: String,
    /// Item name.
    pub name: String,
    /// Price in roubles.
    pub price: u32,
}

/// A retail product: one two-sided label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductRecord {
    /// Product name.
    pub name: String,
    /// Price in roubles.
    pub price: u32,
    /// Shelf life in hours.
    pub hours: u32,
}

/// A tip-jar card: one two-sided card with a QR code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TipsRecord {
    /// Owner's name.
    pub name: String,
    /// What the tips are collected for.
    pub goal: String,
    /// Payment link encoded into the QR code.
    pub link: String,
}

fn check_length(
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(ValidationError::FieldLength {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

impl TipsRecord {
    /// Validates and trims the card's fields.  The link is otherwise kept as given.
    pub fn new(name: &str, goal: &str, link: &str) -> Result<Self, ValidationError> {
        let (name, goal, link) = (name.trim(), goal.trim(), link.trim());
        check_length("name", name, TIPS_NAME_CHARS)?;
        check_length("goal", goal, TIPS_GOAL_CHARS)?;
        check_length("link", link, TIPS_LINK_CHARS)?;

        let scheme = link.get(..8).unwrap_or(link).to_ascii_lowercase();
        if !(scheme.starts_with("http://") || scheme.starts_with("https://")) {
            return Err(ValidationError::InvalidLink);
        }

        Ok(Self {
            name: name.to_owned(),
            goal: goal.to_owned(),
            link: link.to_owned(),
        })
    }
}

/// Any record a label document can be built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainRecord {
    /// Tea bank and box labels.
    Tea(TeaRecord),
    /// Two-sided product label.
    Product(ProductRecord),
    /// Two-sided tip-jar card.
    Tips(TipsRecord),
}

impl From<TeaRecord> for DomainRecord {
    fn from(record: TeaRecord) -> Self {
        Self::Tea(record)
    }
}

impl From<ProductRecord> for DomainRecord {
    fn from(record: ProductRecord) -> Self {
        Self::Product(record)
    }
}

impl From<TipsRecord> for DomainRecord {
    fn from(record: TipsRecord) -> Self {
        Self::Tips(record)
    }
}

fn cells(row: &Row) -> [Option<&Cell>; 3] {
    [0, 1, 2].map(|index| row.get(index).and_then(Option::as_ref))
}

fn is_blank_row(row: &Row) -> bool {
    cells(row)
        .into_iter()
        .all(|cell| cell.map_or(true, Cell::is_blank))
}

fn required_text(row: usize, field: &'static str, cell: Option<&Cell>) -> Result<String, ValidationError> {
    let value = cell.map(Cell::text).unwrap_or_default();
    if value.is_empty() {
        return Err(ValidationError::EmptyField { row, field });
    }
    Ok(value)
}

fn bounded_number(
    row: usize,
    field: &'static str,
    cell: Option<&Cell>,
    max: u32,
) -> Result<u32, ValidationError> {
    parse_int_number(cell)
        .filter(|value| (0..=i64::from(max)).contains(value))
        .and_then(|value| u32::try_from(value).ok())
        .ok_or(ValidationError::InvalidNumber { row, field, max })
}

fn parse_rows<T>(
    rows: &[Row],
    mut parse: impl FnMut(usize, [Option<&Cell>; 3]) -> Result<T, ValidationError>,
) -> Result<Vec<T>, ValidationError> {
    let mut records = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if is_blank_row(row) {
            continue;
        }
        records.push(parse(index + FIRST_DATA_ROW, cells(row))?);
    }
    if records.is_empty() {
        return Err(ValidationError::NoRows);
    }
    Ok(records)
}

/// Validates tea rows laid out as `[type, name, price]`.  Blank rows are skipped.
pub fn parse_tea_rows(rows: &[Row]) -> Result<Vec<TeaRecord>, ValidationError> {
    parse_rows(rows, |row, [tea_type, name, price]| {
        Ok(TeaRecord {
            tea_type: required_text(row, "tea type", tea_type)?,
            name: required_text(row, "name", name)?,
            price: bounded_number(row, "price", price, MAX_PRICE)?,
        })
    })
}

/// Validates product rows laid out as `[name, price, hours]`.  Blank rows are skipped.
pub fn parse_product_rows(rows: &[Row]) -> Result<Vec<ProductRecord>, ValidationError> {
    parse_rows(rows, |row, [name, price, hours]| {
        Ok(ProductRecord {
            name: required_text(row, "name", name)?,
            price: bounded_number(row, "price", price, MAX_PRICE)?,
            hours: bounded_number(row, "hours", hours, MAX_HOURS)?,
        })
    })
}

/// Reads data rows from a JSON array of arrays; `null` is an empty cell.
pub fn rows_from_json(json: &str) -> Result<Vec<Row>, ValidationError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Option<Cell> {
        Some(Cell::Text(value.to_owned()))
    }

    #[test]
    fn integers_are_read_from_every_cell_kind() {
        assert_eq!(parse_int_number(Some(&Cell::Integer(350))), Some(350));
        assert_eq!(parse_int_number(Some(&Cell::Float(350.0))), Some(350));
        assert_eq!(parse_int_number(Some(&Cell::Float(350.5))), None);
        assert_eq!(parse_int_number(text(" 350 ").as_ref()), Some(350));
        assert_eq!(parse_int_number(text("350,00").as_ref()), Some(350));
        assert_eq!(parse_int_number(text("350.5").as_ref()), None);
        assert_eq!(parse_int_number(text("-3").as_ref()), None);
        assert_eq!(parse_int_number(text("abc").as_ref()), None);
        assert_eq!(parse_int_number(None), None);
    }

    #[test]
    fn tea_rows_skip_blanks_and_report_sheet_rows() {
        let rows: Vec<Row> = vec![
            vec![text("Пуэр"), text("Шу 2019"), Some(Cell::Integer(40))],
            vec![None, text("  "), None],
            vec![text("Улун"), None, Some(Cell::Integer(10))],
        ];
        let err = parse_tea_rows(&rows).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::EmptyField { row: 4, field: "name" }
        ));

        let records = parse_tea_rows(&rows[..2]).expect("valid rows");
        assert_eq!(
            records,
            vec![TeaRecord {
                tea_type: "Пуэр".into(),
                name: "Шу 2019".into(),
                price: 40,
            }]
        );
    }

    #[test]
    fn product_numbers_are_range_checked() {
        let rows: Vec<Row> = vec![vec![text("Сэндвич"), Some(Cell::Integer(250)), Some(Cell::Integer(8761))]];
        assert!(matches!(
            parse_product_rows(&rows),
            Err(ValidationError::InvalidNumber { row: 2, field: "hours", .. })
        ));

        let rows: Vec<Row> = vec![vec![text("Сэндвич"), text("дорого"), Some(Cell::Integer(24))]];
        assert!(matches!(
            parse_product_rows(&rows),
            Err(ValidationError::InvalidNumber { field: "price", .. })
        ));
    }

    #[test]
    fn empty_sheet_is_rejected() {
        let rows: Vec<Row> = vec![vec![None, None, None], vec![]];
        assert!(matches!(parse_product_rows(&rows), Err(ValidationError::NoRows)));
    }

    #[test]
    fn json_rows_accept_mixed_cells() {
        let rows = rows_from_json(r#"[["Пуэр", "Шу", 40], ["Улун", "Те Гуань Инь", "55.0"], [null, null, null]]"#)
            .expect("valid json");
        let records = parse_tea_rows(&rows).expect("valid rows");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].price, 55);
    }

    #[test]
    fn tips_fields_are_validated() {
        let record = TipsRecord::new(" Аня ", "На новую кофемашину", " HTTPS://pay.example/a?b=1 ").expect("valid");
        assert_eq!(record.name, "Аня");
        assert_eq!(record.link, "HTTPS://pay.example/a?b=1");

        assert!(matches!(
            TipsRecord::new("", "goal", "https://x"),
            Err(ValidationError::FieldLength { field: "name", .. })
        ));
        assert!(matches!(
            TipsRecord::new(&"я".repeat(41), "goal", "https://x"),
            Err(ValidationError::FieldLength { field: "name", actual: 41, .. })
        ));
        assert!(matches!(
            TipsRecord::new("Аня", "goal", "ftp://x"),
            Err(ValidationError::InvalidLink)
        ));
    }
}
