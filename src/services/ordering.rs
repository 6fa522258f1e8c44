use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

/// Reorder support for the sortable lists (team members, hero images).
/// Clients send the full id list in the desired order; rows are rewritten
/// with sequential 1..n sort values so gaps never accumulate.

#[derive(Debug, Error, PartialEq)]
pub enum OrderingError {
    #[error("reorder request must include every row exactly once")]
    NotAPermutation,

    #[error("unknown id in reorder request: {0}")]
    UnknownId(Uuid),
}

/// Validate that `requested` is a permutation of `existing` and produce the
/// (id, sort_order) assignments to persist.
pub fn sequential_assignments(
    existing: &[Uuid],
    requested: &[Uuid],
) -> Result<Vec<(Uuid, i32)>, OrderingError> {
    let known: HashSet<Uuid> = existing.iter().copied().collect();

    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !known.contains(id) {
            return Err(OrderingError::UnknownId(*id));
        }
        if !seen.insert(*id) {
            return Err(OrderingError::NotAPermutation);
        }
    }
    if seen.len() != known.len() {
        return Err(OrderingError::NotAPermutation);
    }

    Ok(requested
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx as i32 + 1))
        .collect())
}

/// Sort value for a newly appended row.
pub fn next_sort_order(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_sequential_orders() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        let assignments = sequential_assignments(&[a, b, c], &[c, a, b]).unwrap();
        assert_eq!(assignments, vec![(c, 1), (a, 2), (b, 3)]);
    }

    #[test]
    fn rejects_unknown_missing_and_duplicate_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert_eq!(
            sequential_assignments(&[a, b], &[a, stranger]),
            Err(OrderingError::UnknownId(stranger))
        );
        assert_eq!(
            sequential_assignments(&[a, b], &[a]),
            Err(OrderingError::NotAPermutation)
        );
        assert_eq!(
            sequential_assignments(&[a, b], &[a, a]),
            Err(OrderingError::NotAPermutation)
        );
    }

    #[test]
    fn append_goes_after_current_max() {
        assert_eq!(next_sort_order(None), 1);
        assert_eq!(next_sort_order(Some(7)), 8);
    }
}
