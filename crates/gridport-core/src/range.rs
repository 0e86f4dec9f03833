#![forbid(unsafe_code)]

//! Buffered range math.
//!
//! Scroll events re-request data far faster than a backend can usefully
//! absorb. The engine therefore subscribes to a window padded by whole
//! pages of extra rows and columns around the visible range, so nearby
//! scrolls land inside data that is already flowing.

use crate::columns::{ColumnMove, model_index};

/// Pages of extra rows fetched above and below the visible range.
pub const ROW_BUFFER_PAGES: usize = 3;

/// Pages of extra columns fetched either side of the visible range.
pub const COLUMN_BUFFER_PAGES: usize = 1;

/// Expands `top..=bottom` by `pages` view-heights on each side.
///
/// The buffered top clamps at zero. The buffered bottom is deliberately
/// left unclamped: total row count is not known here, and backends clamp
/// a too-large request to the rows that exist.
#[must_use]
pub fn row_range(top: usize, bottom: usize, pages: usize) -> (usize, usize) {
    let view_height = bottom.saturating_sub(top);
    let pad = view_height.saturating_mul(pages);
    (top.saturating_sub(pad), bottom.saturating_add(pad))
}

/// Expands `left..=right` by `pages` view-widths, clamps to
/// `[0, column_count - 1]`, and resolves each visual index in the padded
/// range to its model index through `moves`, preserving visual order.
///
/// Returns `None` when either bound is absent: row-only viewports
/// subscribe to every column.
#[must_use]
pub fn column_range(
    left: Option<usize>,
    right: Option<usize>,
    column_count: usize,
    moves: &[ColumnMove],
    pages: usize,
) -> Option<Vec<usize>> {
    let (left, right) = (left?, right?);
    if column_count == 0 {
        return Some(Vec::new());
    }
    let view_width = right.saturating_sub(left);
    let pad = view_width.saturating_mul(pages);
    let buffered_left = left.saturating_sub(pad);
    let buffered_right = right.saturating_add(pad).min(column_count - 1);
    if buffered_left > buffered_right {
        return Some(Vec::new());
    }
    Some(
        (buffered_left..=buffered_right)
            .map(|visual| model_index(visual, moves))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_range_pads_by_view_height_pages() {
        // 50 visible rows, 3 pages of buffer each side.
        assert_eq!(row_range(0, 50, ROW_BUFFER_PAGES), (0, 200));
        assert_eq!(row_range(300, 350, ROW_BUFFER_PAGES), (150, 500));
    }

    #[test]
    fn row_range_clamps_top_at_zero() {
        assert_eq!(row_range(10, 60, 3), (0, 210));
        assert_eq!(row_range(100, 150, 3), (0, 300));
    }

    #[test]
    fn row_range_zero_pages_is_passthrough() {
        assert_eq!(row_range(25, 75, 0), (25, 75));
    }

    #[test]
    fn row_range_single_row_view_has_no_padding() {
        // view_height is bottom - top, so a one-row viewport pads by zero.
        assert_eq!(row_range(7, 7, 3), (7, 7));
    }

    #[test]
    fn column_range_requires_both_bounds() {
        assert_eq!(column_range(None, None, 10, &[], 1), None);
        assert_eq!(column_range(Some(2), None, 10, &[], 1), None);
        assert_eq!(column_range(None, Some(5), 10, &[], 1), None);
    }

    #[test]
    fn column_range_pads_and_clamps() {
        // Visible 4..=6 in a 10-column table, one page of buffer:
        // view width 2, padded to 2..=8.
        assert_eq!(
            column_range(Some(4), Some(6), 10, &[], 1),
            Some((2..=8).collect())
        );
    }

    #[test]
    fn column_range_clamps_at_both_edges() {
        assert_eq!(
            column_range(Some(0), Some(2), 10, &[], 1),
            Some((0..=4).collect())
        );
        assert_eq!(
            column_range(Some(7), Some(9), 10, &[], 1),
            Some((5..=9).collect())
        );
    }

    #[test]
    fn column_range_resolves_moves_in_visual_order() {
        // Column 0 dragged to position 2: visual order 1, 2, 0, 3, 4.
        let moves = [ColumnMove::new(0, 2)];
        assert_eq!(
            column_range(Some(0), Some(2), 5, &moves, 0),
            Some(vec![1, 2, 0])
        );
    }

    #[test]
    fn column_range_empty_table() {
        assert_eq!(column_range(Some(0), Some(3), 0, &[], 1), Some(Vec::new()));
    }

    #[test]
    fn column_range_wider_than_table_covers_all_columns() {
        assert_eq!(
            column_range(Some(0), Some(9), 4, &[], 1),
            Some((0..=3).collect())
        );
    }
}
