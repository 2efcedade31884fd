use std::{
    marker::PhantomData,
    ops::{Index, IndexMut},
};

/// A typed index into an [`Arena`].
///
/// An `ArenaId<A>` cannot be used to access elements of an `Arena<B>`.
/// Ids compare and hash by index only, whatever `T` implements.
pub struct ArenaId<T> {
    id: u32,
    _phantom_data: PhantomData<T>,
}

impl<T> Copy for ArenaId<T> {}

impl<T> Clone for ArenaId<T> {
    #[inline(always)]
    fn clone(&self) -> ArenaId<T> {
        *self
    }
}

impl<T> PartialEq for ArenaId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ArenaId<T> {}

impl<T> PartialOrd for ArenaId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ArenaId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> std::hash::Hash for ArenaId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> std::fmt::Debug for ArenaId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArenaId({})", self.id)
    }
}

impl<T> ArenaId<T> {
    pub const fn new(id: u32) -> ArenaId<T> {
        Self {
            id,
            _phantom_data: PhantomData,
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.id as usize
    }
}

/// Append-only storage handing out [`ArenaId`]s.
///
/// Filters and patterns of a program live in arenas so that the filter forest
/// can refer to patterns owned by other filters without shared ownership.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena { items: Vec::new() }
    }
}

impl<T> Arena<T> {
    pub fn new(size: usize) -> Self {
        Arena {
            items: Vec::with_capacity(size),
        }
    }

    pub fn alloc(&mut self, value: T) -> ArenaId<T> {
        let arena_id = self.items.len() as u32;
        self.items.push(value);
        ArenaId::new(arena_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ArenaId<T>) -> Option<&T> {
        self.items.get(id.index())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    /// Drops every element while keeping the allocated storage.
    ///
    /// Ids handed out before the call must not be used afterwards.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }
}

impl<T> Index<ArenaId<T>> for Arena<T> {
    type Output = T;

    fn index(&self, index: ArenaId<T>) -> &Self::Output {
        &self.items[index.index()]
    }
}

impl<T> IndexMut<ArenaId<T>> for Arena<T> {
    fn index_mut(&mut self, index: ArenaId<T>) -> &mut Self::Output {
        &mut self.items[index.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec!["ts", "level", "msg"], 1, "level")]
    #[case(vec!["ts", "level", "msg"], 0, "ts")]
    #[case(vec!["ts"], 3, "")]
    fn test_get(#[case] values: Vec<&str>, #[case] index: u32, #[case] expected: &str) {
        let mut arena = Arena::new(values.len());
        for v in values {
            arena.alloc(v);
        }
        assert_eq!(arena.get(ArenaId::new(index)).copied().unwrap_or(""), expected);
    }

    #[test]
    fn test_alloc_returns_sequential_ids() {
        let mut arena = Arena::default();
        assert!(arena.is_empty());
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        assert_eq!((a.index(), b.index()), (0, 1));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_index_mut() {
        let mut arena = Arena::new(2);
        let id = arena.alloc(vec![1]);
        arena[id].push(2);
        for items in arena.iter_mut() {
            items.push(3);
        }
        assert_eq!(arena[id], vec![1, 2, 3]);
    }

    #[test]
    fn test_ids_compare_without_comparable_items() {
        struct Opaque;

        let mut arena = Arena::new(2);
        let a = arena.alloc(Opaque);
        let b = arena.alloc(Opaque);
        assert_eq!(a, ArenaId::<Opaque>::new(0));
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(Some(b), Some(ArenaId::new(1)));
        assert_eq!(format!("{:?}", b), "ArenaId(1)");

        let ids = [a, b, a].into_iter().collect::<rustc_hash::FxHashSet<_>>();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut arena = Arena::new(8);
        arena.alloc(1);
        arena.clear();
        assert!(arena.is_empty());
        assert!(arena.capacity() >= 8);
        assert_eq!(arena.alloc(2).index(), 0);
    }
}
