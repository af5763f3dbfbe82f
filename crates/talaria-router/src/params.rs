//! Storage for extracted, typed route parameters.
//!
//! Uses a small-vector so the common case (a handful of parameters) stays
//! off the heap. Insertion order follows segment order in the template.

use smallvec::SmallVec;

use crate::converter::ParamValue;

/// Parameters stored inline before spilling to the heap.
const INLINE_MATCHES: usize = 4;

/// The typed parameters extracted by a route match.
///
/// # Example
///
/// ```rust
/// use talaria_router::{ParamValue, RouteMatches};
///
/// let mut matches = RouteMatches::new();
/// matches.push("id", ParamValue::Int(42));
///
/// assert_eq!(matches.get("id"), Some(&ParamValue::Int(42)));
/// assert_eq!(matches.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteMatches {
    inner: SmallVec<[(String, ParamValue); INLINE_MATCHES]>,
}

impl RouteMatches {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.inner.push((name.into(), value));
    }

    /// Returns the value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.inner
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    /// Returns true when no parameters were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of extracted parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over `(name, value)` pairs in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.inner.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<'a> IntoIterator for &'a RouteMatches {
    type Item = (&'a str, &'a ParamValue);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, ParamValue)>,
        fn(&'a (String, ParamValue)) -> (&'a str, &'a ParamValue),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, ParamValue)> for RouteMatches {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
