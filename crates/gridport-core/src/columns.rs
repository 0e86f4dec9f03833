#![forbid(unsafe_code)]

//! Visual-to-model column index resolution.
//!
//! Grids let users drag columns around without touching the underlying
//! table schema. Reorders are tracked as a list of single-column moves
//! in the order they happened; resolving a visual index back to its
//! model index replays that list newest-first, undoing one move at a
//! time.

/// One column drag: the column at visual index `from` moved to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMove {
    pub from: usize,
    pub to: usize,
}

impl ColumnMove {
    #[must_use]
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// Resolves the model index of the column currently shown at `visual`.
///
/// Walks `moves` in reverse. For each move, a column sitting exactly at
/// the move's destination came from its origin; columns between the two
/// endpoints were shifted by one to make room and shift back here.
#[must_use]
pub fn model_index(visual: usize, moves: &[ColumnMove]) -> usize {
    let mut model = visual;
    for mv in moves.iter().rev() {
        if model == mv.to {
            model = mv.from;
        } else if mv.from <= model && model < mv.to {
            model += 1;
        } else if mv.to < model && model <= mv.from {
            model -= 1;
        }
    }
    model
}
