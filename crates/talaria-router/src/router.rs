//! The route table and resolution scan.

use std::collections::HashMap;

use http::Method;

use crate::params::RouteMatches;
use crate::template::PathTemplate;
use crate::RouteError;

/// An ordered route table mapping HTTP methods to `(template, target)`
/// entries, with a not-found fallback target.
///
/// The table is generic over the target so it can carry handlers, operation
/// ids, or anything else. Entries are scanned in registration order and the
/// first structurally-and-type matching entry wins; a deliberate linear scan
/// keeps precedence auditable (registration order is the tie-break).
///
/// Registration mutates the table and belongs to a setup phase; resolution
/// is read-only and safe to run concurrently once registration is done.
#[derive(Debug, Clone)]
pub struct PathRouter<T> {
    routes: HashMap<Method, Vec<(PathTemplate, T)>>,
    not_found: T,
}

impl<T> PathRouter<T> {
    /// Creates an empty router with the given not-found target.
    #[must_use]
    pub fn new(not_found: T) -> Self {
        Self {
            routes: HashMap::new(),
            not_found,
        }
    }

    /// Compiles `pattern` once and appends an entry to each named method's
    /// list. No de-duplication is performed.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the template is malformed; no method
    /// list is modified in that case.
    pub fn add<M>(&mut self, methods: M, pattern: &str, target: T) -> Result<(), RouteError>
    where
        M: IntoIterator<Item = Method>,
        T: Clone,
    {
        let template = PathTemplate::parse(pattern)?;
        tracing::debug!(pattern, "adding route");
        for method in methods {
            self.routes
                .entry(method)
                .or_default()
                .push((template.clone(), target.clone()));
        }
        Ok(())
    }

    /// Resolves a request to a target and its extracted parameters.
    ///
    /// Always returns a usable target: when no entry matches (or the method
    /// has no entries at all) the not-found target is returned with empty
    /// matches. Absence of a route is an ordinary outcome, not an error.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> RouteResolution<'_, T> {
        if let Some(entries) = self.routes.get(method) {
            for (template, target) in entries {
                if let Some(matches) = template.matches(path) {
                    tracing::debug!(
                        %method,
                        path,
                        pattern = template.pattern(),
                        "matched route"
                    );
                    return RouteResolution {
                        target,
                        matches,
                        fallback: false,
                    };
                }
            }
        }

        tracing::warn!(%method, path, "no route matched");
        RouteResolution {
            target: &self.not_found,
            matches: RouteMatches::new(),
            fallback: true,
        }
    }

    /// Returns the not-found target.
    #[must_use]
    pub fn not_found(&self) -> &T {
        &self.not_found
    }

    /// Replaces the not-found target. Setup-phase only, like [`add`].
    ///
    /// [`add`]: PathRouter::add
    pub fn set_not_found(&mut self, target: T) {
        self.not_found = target;
    }

    /// Returns the total number of registered entries across all methods.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }
}

/// The outcome of [`PathRouter::resolve`]: a target plus typed matches.
#[derive(Debug)]
pub struct RouteResolution<'router, T> {
    target: &'router T,
    matches: RouteMatches,
    fallback: bool,
}

impl<'router, T> RouteResolution<'router, T> {
    /// The resolved target.
    #[must_use]
    pub fn target(&self) -> &'router T {
        self.target
    }

    /// The extracted parameters. Empty for the not-found fallback.
    #[must_use]
    pub fn matches(&self) -> &RouteMatches {
        &self.matches
    }

    /// True when the not-found fallback was used.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Splits the resolution into its target and owned matches.
    #[must_use]
    pub fn into_parts(self) -> (&'router T, RouteMatches) {
        (self.target, self.matches)
    }
}
