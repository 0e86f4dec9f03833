#![forbid(unsafe_code)]

//! Viewport value type shared by the live and store engines.

use crate::error::CoreError;

/// A requested window into a table: visible rows, optionally visible
/// columns, and an optional search term for stores that filter by name.
///
/// `top` and `bottom` are inclusive absolute row indices into the
/// unbuffered logical table. Column bounds are `None` for row-only
/// viewports, which subscribe to every column.
///
/// `(0, 0)` doubles as the "no viewport" sentinel grids emit before
/// their first layout pass; engines ignore it rather than opening a
/// zero-height subscription. See [`Viewport::is_empty_sentinel`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Viewport {
    pub top: usize,
    pub bottom: usize,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub search: Option<String>,
}

impl Viewport {
    /// Row-only viewport covering `top..=bottom`.
    #[must_use]
    pub fn rows(top: usize, bottom: usize) -> Self {
        Self {
            top,
            bottom,
            ..Self::default()
        }
    }

    /// Viewport with explicit visible column bounds.
    #[must_use]
    pub fn with_columns(top: usize, bottom: usize, left: usize, right: usize) -> Self {
        Self {
            top,
            bottom,
            left: Some(left),
            right: Some(right),
            ..Self::default()
        }
    }

    /// Attaches a search term.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Number of rows requested, inclusive of both bounds.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.bottom.saturating_sub(self.top) + 1
    }

    /// The `(0, 0)` sentinel emitted before a grid has measured itself.
    #[must_use]
    pub fn is_empty_sentinel(&self) -> bool {
        self.top == 0 && self.bottom == 0
    }

    /// Rejects an inverted row window.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.bottom < self.top {
            return Err(CoreError::InvalidViewport {
                top: self.top,
                bottom: self.bottom,
            });
        }
        Ok(())
    }

    /// True when this viewport's search term differs from the previous
    /// viewport's. No previous viewport counts as no search. `None` and
    /// `Some("")` are distinct: switching between them invalidates
    /// cached data.
    #[must_use]
    pub fn search_differs(&self, previous: Option<&Viewport>) -> bool {
        previous.and_then(|v| v.search.as_deref()) != self.search.as_deref()
    }
}
