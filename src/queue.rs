use std::cmp::Ordering;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

/// An ordered container with the primitives the pipeline stages need:
/// map/filter/dedup/group/sort/flatten, plus a sequential async resolver
/// Backed by a `Vec`; every operation here preserves order unless
/// explicitly documented otherwise.
#[derive(Debug, Clone, Default)]
pub struct Queue<T>(Vec<T>);

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self(items)
    }

    pub fn add(&mut self, item: T) {
        self.0.push(item);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    pub fn size(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    pub fn for_each(&self, f: impl FnMut(&T)) {
        self.0.iter().for_each(f);
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Queue<U> {
        Queue(self.0.into_iter().map(f).collect())
    }

    pub fn filter(self, mut pred: impl FnMut(&T) -> bool) -> Queue<T> {
        Queue(self.0.into_iter().filter(|item| pred(item)).collect())
    }

    pub fn concat(mut self, mut other: Queue<T>) -> Queue<T> {
        self.0.append(&mut other.0);
        self
    }

    /// Stable sort: ties keep their pre-sort relative order.
    pub fn sort_by(&mut self, cmp: impl FnMut(&T, &T) -> Ordering) {
        self.0.sort_by(cmp);
    }

    /// Stable partition by key, groups emitted in first-appearance order;
    /// order within a group is preserved.
    pub fn group_by<K: Eq + Hash + Clone>(self, mut key_fn: impl FnMut(&T) -> K) -> Queue<T> {
        let mut first_seen: Vec<K> = Vec::new();
        let mut buckets: HashMap<K, Vec<T>> = HashMap::new();
        for item in self.0 {
            let key = key_fn(&item);
            if !buckets.contains_key(&key) {
                first_seen.push(key.clone());
            }
            buckets.entry(key).or_default().push(item);
        }
        let mut out = Vec::new();
        for key in first_seen {
            if let Some(mut items) = buckets.remove(&key) {
                out.append(&mut items);
            }
        }
        Queue(out)
    }

    /// Sequential async map: awaits `f` for one item at a time, skipping
    /// failures entirely. A single failed entry must not abort
    /// the rest of the playlist).
    pub async fn resolve_all<F, Fut, U>(self, f: F) -> Queue<U>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = anyhow::Result<U>>,
    {
        let mut out = Vec::with_capacity(self.0.len());
        for item in self.0 {
            match f(item).await {
                Ok(resolved) => out.push(resolved),
                Err(err) => tracing::warn!("dropping entry after failed resolution: {err:#}"),
            }
        }
        Queue(out)
    }
}

impl<T: PartialEq> Queue<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.0.iter().any(|x| x == item)
    }

    /// Stable dedup: keeps the first occurrence of each equivalence class
    /// Idempotent: running it twice is the same as running it once.
    pub fn dedup(self) -> Queue<T> {
        let mut out: Vec<T> = Vec::with_capacity(self.0.len());
        for item in self.0 {
            if !out.iter().any(|x| x == &item) {
                out.push(item);
            }
        }
        Queue(out)
    }
}

/// An item that is either a resolved leaf or a nested queue of more of the
/// same. `Album`/`Artist` expansion produces nested queues; `flatten`
/// collapses them away.
pub enum Nested<T> {
    Leaf(T),
    Queue(Queue<Nested<T>>),
}

impl<T> Queue<Nested<T>> {
    /// Post-order traversal that inlines nested queues (flattening
    /// an already-flat queue is a no-op).
    pub fn flatten(self) -> Queue<T> {
        fn visit<T>(item: Nested<T>, out: &mut Vec<T>) {
            match item {
                Nested::Leaf(value) => out.push(value),
                Nested::Queue(nested) => {
                    for inner in nested.0 {
                        visit(inner, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        for item in self.0 {
            visit(item, &mut out);
        }
        Queue(out)
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Queue(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Queue<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        let q = Queue::from_vec(vec![1, 2, 1, 3, 2]);
        assert_eq!(q.dedup().into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let q = Queue::from_vec(vec![1, 2, 1, 3, 2]);
        let once = q.clone().dedup();
        let twice = once.clone().dedup();
        assert_eq!(once.into_vec(), twice.into_vec());
    }

    #[test]
    fn group_by_preserves_first_appearance_and_intra_group_order() {
        let q = Queue::from_vec(vec![("a", 1), ("b", 2), ("a", 3)]);
        let grouped = q.group_by(|(k, _)| *k);
        assert_eq!(
            grouped.into_vec(),
            vec![("a", 1), ("a", 3), ("b", 2)]
        );
    }

    #[test]
    fn flatten_is_a_noop_on_already_flat_queue() {
        let q: Queue<Nested<i32>> = Queue::from_vec(vec![Nested::Leaf(1), Nested::Leaf(2)]);
        assert_eq!(q.flatten().into_vec(), vec![1, 2]);
    }

    #[test]
    fn flatten_collapses_nested_queues() {
        let inner = Queue::from_vec(vec![Nested::Leaf(2), Nested::Leaf(3)]);
        let q: Queue<Nested<i32>> =
            Queue::from_vec(vec![Nested::Leaf(1), Nested::Queue(inner), Nested::Leaf(4)]);
        assert_eq!(q.flatten().into_vec(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn resolve_all_is_sequential_and_skips_failures() {
        let q = Queue::from_vec(vec![1, 2, 3]);
        let order = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let order2 = order.clone();
        let resolved = q
            .resolve_all(move |item| {
                let order = order2.clone();
                async move {
                    order.lock().push(item);
                    if item == 2 {
                        anyhow::bail!("boom");
                    }
                    Ok(item * 10)
                }
            })
            .await;
        assert_eq!(*order.lock(), vec![1, 2, 3]);
        assert_eq!(resolved.into_vec(), vec![10, 30]);
    }
}
