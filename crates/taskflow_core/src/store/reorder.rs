//! Move/reorder protocol over order-arrays.
//!
//! # Responsibility
//! - Compute new order-arrays for in-list reorders and cross-list moves.
//! - Keep the computation pure so callers can validate, then publish all
//!   resulting lists in one state transition.
//!
//! # Invariants
//! - Removal happens first; the target position is interpreted against the
//!   already-shortened list.
//! - Target positions are clamped to `[0, len]`, never rejected.
//! - The multiset of ids across the touched lists is preserved.

/// Outcome of relocating one id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation<T> {
    /// Source and destination were the same list.
    Within { list: Vec<T>, index: usize },
    /// The id left `source` and entered `destination`.
    Across {
        source: Vec<T>,
        destination: Vec<T>,
        index: usize,
    },
}

impl<T> Relocation<T> {
    /// Final position of the relocated id.
    pub fn index(&self) -> usize {
        match self {
            Self::Within { index, .. } | Self::Across { index, .. } => *index,
        }
    }
}

/// Inserts `id` at `position`, clamped to the list length.
///
/// Returns the index actually used.
pub fn insert_clamped<T>(list: &mut Vec<T>, id: T, position: usize) -> usize {
    let index = position.min(list.len());
    list.insert(index, id);
    index
}

/// Moves the element at `from` to `to` with splice semantics.
///
/// Returns `None` when `from` is out of range.
pub fn splice_move<T: Clone>(list: &[T], from: usize, to: usize) -> Option<(Vec<T>, usize)> {
    if from >= list.len() {
        return None;
    }
    let mut next = list.to_vec();
    let moved = next.remove(from);
    let index = insert_clamped(&mut next, moved, to);
    Some((next, index))
}

/// Relocates `id` from `source` into `destination` at `position`.
///
/// `destination = None` means the move stays inside `source`. Returns `None`
/// when `source` does not contain `id`, so a retried move fails cleanly
/// instead of duplicating the id.
pub fn relocate<T: Clone + PartialEq>(
    source: &[T],
    destination: Option<&[T]>,
    id: &T,
    position: usize,
) -> Option<Relocation<T>> {
    if !source.contains(id) {
        return None;
    }
    let mut shortened: Vec<T> = source.iter().filter(|item| *item != id).cloned().collect();

    match destination {
        None => {
            let index = insert_clamped(&mut shortened, id.clone(), position);
            Some(Relocation::Within {
                list: shortened,
                index,
            })
        }
        Some(destination) => {
            // A stray copy in the destination would become a duplicate.
            let mut target: Vec<T> = destination
                .iter()
                .filter(|item| *item != id)
                .cloned()
                .collect();
            let index = insert_clamped(&mut target, id.clone(), position);
            Some(Relocation::Across {
                source: shortened,
                destination: target,
                index,
            })
        }
    }
}

/// Returns `list` without any occurrence of `id`.
pub fn without<T: Clone + PartialEq>(list: &[T], id: &T) -> Vec<T> {
    list.iter().filter(|item| *item != id).cloned().collect()
}
