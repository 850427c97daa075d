use std::fmt;

/// tokens that a parser should hand over as [`Cell::Na`]
pub const NA_TOKENS: [&str; 6] = ["", "NA", "na", "NaN", "nan", "N/A"];

/// A single table value.
///
/// `NaN` is never stored as a number: converting a `NaN` float into a cell
/// yields [`Cell::Na`], so "missing" has exactly one representation.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    Num(f64),
    Str(String),
    #[default]
    Na,
}

impl Cell {
    /// Coerces an already tokenized field: numbers parse to [`Cell::Num`],
    /// [`NA_TOKENS`] become [`Cell::Na`], anything else is kept as text.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if NA_TOKENS.contains(&token) {
            return Cell::Na;
        }
        match token.parse::<f64>() {
            Ok(v) => Cell::from(v),
            Err(_) => Cell::Str(token.to_string()),
        }
    }

    #[inline]
    pub fn is_na(&self) -> bool {
        matches!(self, Cell::Na)
    }

    #[inline]
    pub fn is_num(&self) -> bool {
        matches!(self, Cell::Num(_))
    }

    /// Numeric view of the cell, `None` for missing or text cells.
    #[inline]
    pub fn num(&self) -> Option<f64> {
        match self {
            Cell::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view where missing and text cells are `NaN`.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.num().unwrap_or(f64::NAN)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Cell::Na
        } else {
            Cell::Num(v)
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Num(v as f64)
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Cell::Num(v as f64)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Str(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Str(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Na, Into::into)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Num(v) => write!(f, "{v}"),
            Cell::Str(s) => f.write_str(s),
            Cell::Na => f.write_str("NA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token() {
        assert_eq!(Cell::from_token(" 1.5 "), Cell::Num(1.5));
        assert_eq!(Cell::from_token("-3"), Cell::Num(-3.0));
        assert_eq!(Cell::from_token("NA"), Cell::Na);
        assert_eq!(Cell::from_token(""), Cell::Na);
        assert_eq!(Cell::from_token("nan"), Cell::Na);
        assert_eq!(Cell::from_token("TP53"), Cell::Str("TP53".into()));
    }

    #[test]
    fn test_nan_is_missing() {
        assert!(Cell::from(f64::NAN).is_na());
        assert!(Cell::from(None::<f64>).is_na());
        assert!(Cell::from("x").as_f64().is_nan());
        assert_eq!(Cell::from(2usize).num(), Some(2.0));
        assert_eq!(Cell::Na.to_string(), "NA");
    }
}
