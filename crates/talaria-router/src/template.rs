//! Route template compilation and path matching.
//!
//! A template is compiled once at registration into an ordered sequence of
//! literal and typed-parameter segments, then matched against request paths
//! component by component. Splitting keeps a trailing empty component, so
//! `/foo` and `/foo/` are distinct literals unless both are registered.

use crate::converter::{Converter, ConverterSpecError, ParamValue};
use crate::params::RouteMatches;
use crate::RouteError;

/// One compiled segment of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Must equal the request component exactly.
    Literal(String),
    /// Converts the request component (or, for the catch-all, the path
    /// remainder) into a typed value bound to `name`.
    Param { name: String, converter: Converter },
}

/// A compiled route template.
///
/// Produced by [`PathTemplate::parse`]; matched with
/// [`PathTemplate::matches`]. Invariant: at most one catch-all parameter,
/// and only as the final segment.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compiles a template string.
    ///
    /// Components wrapped in `{}` are parameters of the form `name`,
    /// `name:type` or `name:type:format`; the format may itself contain
    /// `:` (as datetime formats do). Everything else is a literal.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] for unknown converter types, a misplaced
    /// catch-all, or a missing/unexpected format argument.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let components = split_components(pattern);
        let mut segments = Vec::with_capacity(components.len());

        for (index, component) in components.iter().enumerate() {
            let spec = component
                .strip_prefix('{')
                .and_then(|inner| inner.strip_suffix('}'));
            let Some(spec) = spec else {
                segments.push(Segment::Literal((*component).to_owned()));
                continue;
            };

            let mut parts = spec.splitn(3, ':');
            let name = parts.next().unwrap_or("");
            let type_name = parts.next().unwrap_or("str");
            let format = parts.next();

            let converter =
                Converter::for_name(type_name, format).map_err(|error| match error {
                    ConverterSpecError::Unknown => RouteError::UnknownConverter {
                        name: type_name.to_owned(),
                        pattern: pattern.to_owned(),
                    },
                    ConverterSpecError::MissingFormat => RouteError::MissingFormat {
                        converter: type_name.to_owned(),
                        pattern: pattern.to_owned(),
                    },
                    ConverterSpecError::UnexpectedFormat => RouteError::UnexpectedFormat {
                        converter: type_name.to_owned(),
                        pattern: pattern.to_owned(),
                    },
                })?;

            if converter.is_catch_all() && index + 1 != components.len() {
                return Err(RouteError::CatchAllNotFinal {
                    pattern: pattern.to_owned(),
                });
            }

            segments.push(Segment::Param {
                name: name.to_owned(),
                converter,
            });
        }

        Ok(Self {
            pattern: pattern.to_owned(),
            segments,
        })
    }

    /// Returns the original template string.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Walks a request path against this template.
    ///
    /// Returns the extracted parameters on a full match, or `None` when any
    /// literal differs, any conversion fails, or the segment counts differ
    /// without a catch-all to absorb the remainder.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<RouteMatches> {
        let components = split_components(path);
        let mut matches = RouteMatches::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(expected) => {
                    if components.get(index).copied() != Some(expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param { name, converter } if converter.is_catch_all() => {
                    let remainder = components
                        .get(index..)
                        .map_or_else(String::new, |rest| rest.join("/"));
                    matches.push(name.clone(), ParamValue::Str(remainder));
                    return Some(matches);
                }
                Segment::Param { name, converter } => {
                    let component = components.get(index)?;
                    let value = converter.convert(component)?;
                    matches.push(name.clone(), value);
                }
            }
        }

        if components.len() == self.segments.len() {
            Some(matches)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

/// Splits a path into components, dropping only the leading empty component
/// produced by the initial `/`. A trailing `/` yields a trailing empty
/// component so it stays significant.
fn split_components(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(pattern: &str, path: &str) -> Option<RouteMatches> {
        PathTemplate::parse(pattern).unwrap().matches(path)
    }

    #[test]
    fn test_split_components() {
        assert_eq!(split_components("/foo/bar"), vec!["foo", "bar"]);
        assert_eq!(split_components("/foo/"), vec!["foo", ""]);
        assert_eq!(split_components("/"), vec![""]);
    }

    #[test]
    fn test_literal_match() {
        assert!(matched("/foo/bar", "/foo/bar").is_some());
        assert!(matched("/foo/bar", "/foo/baz").is_none());
        assert!(matched("/foo/bar", "/foo").is_none());
        assert!(matched("/foo/bar", "/foo/bar/extra").is_none());
    }

    #[test]
    fn test_trailing_slash_is_distinct() {
        assert!(matched("/foo/", "/foo/").is_some());
        assert!(matched("/foo/", "/foo").is_none());
        assert!(matched("/foo", "/foo/").is_none());
    }

    #[test]
    fn test_untyped_param_defaults_to_str() {
        let matches = matched("/users/{name}", "/users/alice").unwrap();
        assert_eq!(
            matches.get("name"),
            Some(&ParamValue::Str("alice".to_string()))
        );
    }

    #[test]
    fn test_typed_param_conversion_failure() {
        assert!(matched("/users/{id:int}", "/users/42").is_some());
        assert!(matched("/users/{id:int}", "/users/forty-two").is_none());
    }

    #[test]
    fn test_catch_all_binds_remainder() {
        let matches = matched("/ui/{rest:path}", "/ui/a/b/c.html").unwrap();
        assert_eq!(
            matches.get("rest"),
            Some(&ParamValue::Str("a/b/c.html".to_string()))
        );
    }

    #[test]
    fn test_catch_all_binds_empty_remainder() {
        let matches = matched("/ui/{rest:path}", "/ui/").unwrap();
        assert_eq!(matches.get("rest"), Some(&ParamValue::Str(String::new())));

        // A request ending exactly where the catch-all begins also binds "".
        let matches = matched("/ui/{rest:path}", "/ui").unwrap();
        assert_eq!(matches.get("rest"), Some(&ParamValue::Str(String::new())));
    }

    #[test]
    fn test_datetime_format_may_contain_colons() {
        let template = PathTemplate::parse("/at/{t:datetime:%H:%M:%S}").unwrap();
        let matches = template.matches("/at/13:45:00").unwrap();
        assert!(matches.get("t").and_then(ParamValue::as_datetime).is_some());
    }

    #[test]
    fn test_multiple_params() {
        let matches = matched(
            "/orgs/{org}/users/{id:int}",
            "/orgs/acme/users/7",
        )
        .unwrap();
        assert_eq!(matches.get("org"), Some(&ParamValue::Str("acme".to_string())));
        assert_eq!(matches.get("id"), Some(&ParamValue::Int(7)));
    }

    #[test]
    fn test_root_template() {
        assert!(matched("/", "/").is_some());
        assert!(matched("/", "/foo").is_none());
    }

    #[test]
    fn test_misplaced_catch_all() {
        let error = PathTemplate::parse("/{rest:path}/tail").unwrap_err();
        assert!(matches!(error, RouteError::CatchAllNotFinal { .. }));
    }

    #[test]
    fn test_display_shows_pattern() {
        let template = PathTemplate::parse("/foo/{id:int}").unwrap();
        assert_eq!(template.to_string(), "/foo/{id:int}");
    }
}
