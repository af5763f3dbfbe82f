//! Typed path parameter converters.
//!
//! A converter is a pure function from a raw path component to a typed
//! [`ParamValue`]. Conversion failure is not an error: it signals that the
//! candidate route does not match and the router keeps scanning.
//!
//! The set of converters is a closed tagged variant. Adding a type means
//! adding a variant here; the router's matching loop never changes.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A typed value extracted from a matched path component.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A raw string component (also produced by the catch-all converter).
    Str(String),
    /// A signed integer component.
    Int(i64),
    /// A floating-point component.
    Float(f64),
    /// A date/time component parsed with a caller-supplied format.
    DateTime(NaiveDateTime),
}

impl ParamValue {
    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float value, if this is a float.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the date/time value, if this is a date/time.
    #[must_use]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(value) => Some(*value),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::DateTime(value) => write!(f, "{value}"),
        }
    }
}

/// A path component converter.
///
/// `convert` returns `None` when the component does not parse, which the
/// router treats as "this route does not match".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Converter {
    /// Accepts any component verbatim. The default when no type is named.
    Str,
    /// Accepts components parsing as `i64`.
    Int,
    /// Accepts components parsing as `f64`.
    Float,
    /// Accepts components parsing as a date/time under `format`
    /// (strftime-style, e.g. `%Y-%m-%d`).
    DateTime {
        /// The strftime-style parse format.
        format: String,
    },
    /// The catch-all: consumes the remainder of the path verbatim,
    /// including slashes and the empty string. Only legal as the final
    /// segment of a template.
    Path,
}

/// Why a converter specification was rejected. The template compiler turns
/// these into [`RouteError`](crate::RouteError)s with pattern context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConverterSpecError {
    Unknown,
    MissingFormat,
    UnexpectedFormat,
}

impl Converter {
    /// Looks up a converter by its template type name.
    pub(crate) fn for_name(
        name: &str,
        format: Option<&str>,
    ) -> Result<Self, ConverterSpecError> {
        let converter = match name {
            "str" => Self::Str,
            "int" => Self::Int,
            "float" => Self::Float,
            "datetime" => {
                let format = format.ok_or(ConverterSpecError::MissingFormat)?;
                return Ok(Self::DateTime {
                    format: format.to_owned(),
                });
            }
            "path" => Self::Path,
            _ => return Err(ConverterSpecError::Unknown),
        };
        if format.is_some() {
            return Err(ConverterSpecError::UnexpectedFormat);
        }
        Ok(converter)
    }

    /// Converts a raw path component into a typed value.
    #[must_use]
    pub fn convert(&self, raw: &str) -> Option<ParamValue> {
        match self {
            Self::Str | Self::Path => Some(ParamValue::Str(raw.to_owned())),
            Self::Int => raw.parse::<i64>().ok().map(ParamValue::Int),
            Self::Float => raw.parse::<f64>().ok().map(ParamValue::Float),
            Self::DateTime { format } => {
                parse_datetime(raw, format).map(ParamValue::DateTime)
            }
        }
    }

    /// Returns true for the catch-all converter.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::Path)
    }
}

/// Date-only formats parse to midnight, matching strptime semantics.
fn parse_datetime(raw: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, format).ok().or_else(|| {
        NaiveDate::parse_from_str(raw, format)
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN))
    })
}
