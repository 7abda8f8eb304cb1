//! # Downstream Path Resolution
//!
//! The data layer addresses lookup codes by up to two path segments below
//! its base URL:
//!
//! | Segments        | URL                          | Meaning              |
//! |-----------------|------------------------------|----------------------|
//! | none            | `{base}`                     | whole collection     |
//! | scope           | `{base}/{scope}`             | codes in one scope   |
//! | scope + item    | `{base}/{scope}/{item}`      | one code             |
//!
//! The scope is either a caller-supplied project id or the authenticated
//! caller's subject, depending on the routing mode.

use std::fmt;

use url::Url;

/// Errors raised while turning a [`DownstreamPath`] into a URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("base URL cannot be a base: {0}")]
    CannotBeABase(String),
    /// A segment was empty, which would collapse the path.
    #[error("empty path segment")]
    EmptySegment,
}

/// Location of a resource on the data layer, relative to its base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownstreamPath {
    scope: Option<String>,
    item: Option<String>,
}

impl DownstreamPath {
    /// The collection root.
    pub fn collection() -> Self {
        Self::default()
    }

    /// Every code within `scope`.
    pub fn scoped(scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            item: None,
        }
    }

    /// A single code within `scope`.
    pub fn item(scope: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            item: Some(item.into()),
        }
    }

    /// Build a path from optional segments, skipping whichever are absent.
    pub fn from_segments(scope: Option<String>, item: Option<String>) -> Self {
        Self { scope, item }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item.as_deref()
    }

    /// Segments in URL order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.scope.iter().chain(self.item.iter()).map(String::as_str)
    }

    /// Append this path's segments to `base`.
    ///
    /// Segments are percent-encoded, so an id containing `/` or `?` stays a
    /// single segment. A trailing slash on `base` is not doubled.
    pub fn resolve(&self, base: &Url) -> Result<Url, PathError> {
        if self.segments().any(str::is_empty) {
            return Err(PathError::EmptySegment);
        }

        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| PathError::CannotBeABase(base.to_string()))?;
            if self.scope.is_some() || self.item.is_some() {
                segments.pop_if_empty();
            }
            segments.extend(self.segments());
        }
        Ok(url)
    }
}

impl fmt::Display for DownstreamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut empty = true;
        for segment in self.segments() {
            write!(f, "/{segment}")?;
            empty = false;
        }
        if empty {
            f.write_str("/")?;
        }
        Ok(())
    }
}
