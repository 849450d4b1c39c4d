//! Single-slot memoization for derived views.

use std::cell::RefCell;
use std::rc::Rc;

/// Caches the last computed value together with the key it was built from.
///
/// Keys are store version tuples, so a hit means no input changed.
pub(crate) struct Memo<K, V> {
    slot: RefCell<Option<(K, Rc<V>)>>,
}

impl<K: PartialEq, V> Memo<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }

    pub(crate) fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> Rc<V> {
        if let Some((cached_key, value)) = self.slot.borrow().as_ref() {
            if *cached_key == key {
                return Rc::clone(value);
            }
        }
        let value = Rc::new(compute());
        *self.slot.borrow_mut() = Some((key, Rc::clone(&value)));
        value
    }
}

#[cfg(test)]
mod tests {
    use super::Memo;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn recomputes_only_when_key_changes() {
        let memo = Memo::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            vec![1, 2, 3]
        };

        let first = memo.get_or_compute(1_u64, compute);
        let second = memo.get_or_compute(1_u64, compute);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);

        let third = memo.get_or_compute(2_u64, compute);
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(calls.get(), 2);
    }
}
