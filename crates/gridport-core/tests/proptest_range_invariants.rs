//! Property-based invariant tests for buffered range math and column
//! move-map resolution.
//!
//! These tests verify structural invariants that must hold for any valid
//! inputs:
//!
//! 1. Buffered rows always contain the visible rows.
//! 2. Buffered top never goes negative (stays clamped at zero).
//! 3. Padding is exactly view-height multiples when nothing clamps.
//! 4. Buffered columns contain the visible columns and stay in bounds.
//! 5. Column resolution with no moves is the identity.
//! 6. Column resolution is a permutation for any move list.
//! 7. Applying a move list forward then resolving backward round-trips.
//! 8. Zero buffer pages is a passthrough.

use gridport_core::{ColumnMove, column_range, model_index, row_range};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn visible_rows() -> impl Strategy<Value = (usize, usize)> {
    (0usize..10_000, 0usize..500).prop_map(|(top, height)| (top, top + height))
}

fn move_list(column_count: usize) -> impl Strategy<Value = Vec<ColumnMove>> {
    proptest::collection::vec(
        (0..column_count, 0..column_count).prop_map(|(from, to)| ColumnMove::new(from, to)),
        0..12,
    )
}

/// Applies a move list forward to the identity layout, producing
/// visual index -> model index.
fn apply_moves(column_count: usize, moves: &[ColumnMove]) -> Vec<usize> {
    let mut layout: Vec<usize> = (0..column_count).collect();
    for mv in moves {
        let column = layout.remove(mv.from);
        layout.insert(mv.to, column);
    }
    layout
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Buffered rows always contain the visible rows
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn buffered_rows_contain_visible_rows(
        (top, bottom) in visible_rows(),
        pages in 0usize..6,
    ) {
        let (buffered_top, buffered_bottom) = row_range(top, bottom, pages);
        prop_assert!(
            buffered_top <= top,
            "buffered top {} above visible top {}", buffered_top, top
        );
        prop_assert!(
            buffered_bottom >= bottom,
            "buffered bottom {} below visible bottom {}", buffered_bottom, bottom
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. + 3. Clamping at zero, exact padding when unclamped
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn row_padding_is_exact_when_unclamped(
        (top, bottom) in visible_rows(),
        pages in 0usize..6,
    ) {
        let height = bottom - top;
        let (buffered_top, buffered_bottom) = row_range(top, bottom, pages);

        prop_assert_eq!(buffered_bottom, bottom + height * pages);
        if top >= height * pages {
            prop_assert_eq!(buffered_top, top - height * pages);
        } else {
            prop_assert_eq!(buffered_top, 0);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Buffered columns contain the visible columns and stay in bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn buffered_columns_contain_visible_and_stay_in_bounds(
        column_count in 1usize..64,
        offsets in (0usize..64, 0usize..64),
        pages in 0usize..4,
    ) {
        let left = offsets.0.min(column_count - 1);
        let right = left + offsets.1.min(column_count - 1 - left);

        let columns = column_range(Some(left), Some(right), column_count, &[], pages)
            .expect("both bounds present");

        // With no moves, the resolved indices are the padded visual range.
        let first = *columns.first().expect("non-empty range");
        let last = *columns.last().expect("non-empty range");
        prop_assert!(first <= left, "padded left {} above visible left {}", first, left);
        prop_assert!(last >= right, "padded right {} below visible right {}", last, right);
        prop_assert!(last < column_count, "padded right {} out of bounds", last);
        prop_assert_eq!(columns.len(), last - first + 1, "range not contiguous");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. + 6. Column resolution: identity without moves, permutation always
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resolution_without_moves_is_identity(visual in 0usize..1024) {
        prop_assert_eq!(model_index(visual, &[]), visual);
    }

    #[test]
    fn resolution_is_a_permutation(
        column_count in 1usize..24,
        moves_seed in move_list(24),
    ) {
        let moves: Vec<ColumnMove> = moves_seed
            .into_iter()
            .map(|mv| ColumnMove::new(mv.from % column_count, mv.to % column_count))
            .collect();

        let mut seen = vec![false; column_count];
        for visual in 0..column_count {
            let model = model_index(visual, &moves);
            prop_assert!(model < column_count, "model index {} out of bounds", model);
            prop_assert!(!seen[model], "model index {} resolved twice", model);
            seen[model] = true;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Forward application and backward resolution agree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn forward_apply_matches_backward_resolution(
        column_count in 1usize..24,
        moves_seed in move_list(24),
    ) {
        let moves: Vec<ColumnMove> = moves_seed
            .into_iter()
            .map(|mv| ColumnMove::new(mv.from % column_count, mv.to % column_count))
            .collect();

        let layout = apply_moves(column_count, &moves);
        for visual in 0..column_count {
            prop_assert_eq!(
                model_index(visual, &moves),
                layout[visual],
                "disagreement at visual index {} for {:?}", visual, &moves
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Zero buffer pages is a passthrough
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zero_pages_is_passthrough((top, bottom) in visible_rows()) {
        prop_assert_eq!(row_range(top, bottom, 0), (top, bottom));
    }
}
