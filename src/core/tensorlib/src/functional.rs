use crate::matrix::{Matrix, OwnedMatrix};

/// Index of the largest element. NaN compares as smaller than everything.
pub fn argmax(row: &[f32]) -> usize {
    assert!(!row.is_empty(), "argmax of an empty row");

    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_idx, best), (idx, &v)| {
            if v > best {
                (idx, v)
            } else {
                (best_idx, best)
            }
        })
        .0
}

/// Outer product `column · rowᵀ`, shaped `(column.len(), row.len())`.
pub fn outer(column: &[f32], row: &[f32]) -> OwnedMatrix {
    OwnedMatrix::from_fn((column.len(), row.len()), |(y, x)| column[y] * row[x])
}

pub fn linear(input: &Matrix, weight: &Matrix, bias: &[f32]) -> OwnedMatrix {
    input.matmul(weight).add_row(bias)
}
