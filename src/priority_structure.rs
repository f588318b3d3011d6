use std::fmt::{Debug, Formatter};

use debug_tree::TreeBuilder;
use rayon::prelude::*;
use thiserror::Error;

/// A slot in the priority domain `1..=max_priority`. Each stored element
/// occupies exactly one slot.
pub type Priority = usize;
/// 1-based position in decreasing-priority order. Rank 1 is the largest
/// priority currently stored.
pub type Rank = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("rank {rank} out of range 1..={size}")]
    RankOutOfRange { rank: Rank, size: usize },
    #[error("priority {priority} out of range 1..={max}")]
    PriorityOutOfRange { priority: Priority, max: Priority },
    #[error("no element stored at priority {0}")]
    NotPresent(Priority),
    #[error("priority {0} is already occupied")]
    DuplicatePriority(Priority),
}

/// Below this many items a bulk build stops forking and recurses serially.
const SERIAL_BUILD_THRESHOLD: usize = 32;
/// Windows shorter than this are scanned on the calling thread.
const SERIAL_SCAN_THRESHOLD: usize = 64;

struct Node<T> {
    /// Number of occupied leaves under this node.
    count: usize,
    /// The stored element. Only ever `Some` at a leaf.
    slot: Option<T>,
    left: Option<Box<Node<T>>>,
    right: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn empty() -> Self {
        Self {
            count: 0,
            slot: None,
            left: None,
            right: None,
        }
    }
}

fn count<T>(node: &Option<Box<Node<T>>>) -> usize {
    node.as_ref().map_or(0, |n| n.count)
}

/// A segment tree over the priority domain `1..=max_priority`, storing at
/// most one element per priority. Elements are addressed either by priority
/// or by rank, and `next_with` scans forward in rank order for the first
/// element satisfying a predicate.
///
/// Larger priorities live in right subtrees, so the k-th largest is found by
/// descending into the right child first using subtree counts.
pub struct PriorityStructure<T> {
    max_priority: Priority,
    root: Option<Box<Node<T>>>,
}

impl<T> PriorityStructure<T> {
    /// New empty structure over priorities `1..=max_priority`.
    pub fn new(max_priority: Priority) -> Self {
        Self {
            max_priority,
            root: None,
        }
    }

    /// Number of elements currently stored.
    pub fn len(&self) -> usize {
        count(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Upper end of the priority domain.
    pub fn max_priority(&self) -> Priority {
        self.max_priority
    }

    fn check_rank(&self, k: Rank) -> Result<(), Error> {
        let size = self.len();
        if k < 1 || k > size {
            Err(Error::RankOutOfRange { rank: k, size })
        } else {
            Ok(())
        }
    }

    fn check_priority(&self, p: Priority) -> Result<(), Error> {
        if p < 1 || p > self.max_priority {
            Err(Error::PriorityOutOfRange {
                priority: p,
                max: self.max_priority,
            })
        } else {
            Ok(())
        }
    }

    /// Replaces the contents with the given batch of `(value, priority)`
    /// pairs. Priorities must be pairwise distinct and inside the domain;
    /// on error the previous contents are untouched.
    ///
    /// The tree is built by splitting the priority-sorted batch at each
    /// interval midpoint, forking the two disjoint subtree builds until the
    /// fan-out covers the worker pool.
    pub fn initialize(&mut self, elems: Vec<(T, Priority)>) -> Result<(), Error>
    where
        T: Send,
    {
        let mut items = elems;
        for &(_, p) in &items {
            self.check_priority(p)?;
        }
        items.sort_unstable_by_key(|e| e.1);
        for w in items.windows(2) {
            if w[0].1 == w[1].1 {
                return Err(Error::DuplicatePriority(w[1].1));
            }
        }
        let mut fork_depth = 0;
        while (1 << (fork_depth + 1)) <= rayon::current_num_threads() {
            fork_depth += 1;
        }
        log::trace!(
            "initialize: {} elements over 1..={}, fork depth {fork_depth}",
            items.len(),
            self.max_priority
        );
        self.root = Self::build(items, 1, self.max_priority, 0, fork_depth);
        Ok(())
    }

    /// Builds the subtree spanning priorities `lo..=hi`, consuming its
    /// sorted share of the batch. Each fork takes ownership of a disjoint
    /// split and returns its subtree; the parent links both only after the
    /// join.
    fn build(
        mut items: Vec<(T, Priority)>,
        lo: Priority,
        hi: Priority,
        depth: usize,
        fork_depth: usize,
    ) -> Option<Box<Node<T>>>
    where
        T: Send,
    {
        if items.is_empty() {
            return None;
        }
        let mut node = Box::new(Node::empty());
        node.count = items.len();
        if lo == hi {
            // Uniqueness leaves exactly one item on a unit interval.
            debug_assert_eq!(items.len(), 1);
            node.slot = items.pop().map(|(value, _)| value);
            return Some(node);
        }
        let mid = lo + (hi - lo) / 2;
        let split = items.partition_point(|e| e.1 <= mid);
        let right_items = items.split_off(split);
        let left_items = items;
        if depth < fork_depth
            && node.count >= SERIAL_BUILD_THRESHOLD
            && !left_items.is_empty()
            && !right_items.is_empty()
        {
            let (left, right) = rayon::join(
                move || Self::build(left_items, lo, mid, depth + 1, fork_depth),
                move || Self::build(right_items, mid + 1, hi, depth + 1, fork_depth),
            );
            node.left = left;
            node.right = right;
        } else {
            node.left = Self::build(left_items, lo, mid, depth + 1, fork_depth);
            node.right = Self::build(right_items, mid + 1, hi, depth + 1, fork_depth);
        }
        Some(node)
    }

    /// The element with the k-th largest priority.
    pub fn query(&self, k: Rank) -> Result<&T, Error> {
        self.check_rank(k)?;
        Ok(self.value_at(k))
    }

    // Rank must already be validated.
    fn value_at(&self, mut k: Rank) -> &T {
        let mut node = self
            .root
            .as_deref()
            .expect("inconsistent tree: rank addressed into an empty structure");
        loop {
            if node.count < k {
                panic!("inconsistent tree: count below the requested rank");
            }
            if let Some(v) = &node.slot {
                return v;
            }
            let rc = count(&node.right);
            node = if rc >= k {
                node.right.as_deref()
            } else {
                k -= rc;
                node.left.as_deref()
            }
            .expect("inconsistent tree: missing child on a counted path");
        }
    }

    /// Overwrites the value of the element with the k-th largest priority.
    pub fn update_value(&mut self, k: Rank, value: T) -> Result<(), Error> {
        self.check_rank(k)?;
        let mut k = k;
        let mut node = self
            .root
            .as_deref_mut()
            .expect("inconsistent tree: rank addressed into an empty structure");
        loop {
            if node.slot.is_some() {
                node.slot = Some(value);
                return Ok(());
            }
            let rc = count(&node.right);
            node = if rc >= k {
                node.right.as_deref_mut()
            } else {
                k -= rc;
                node.left.as_deref_mut()
            }
            .expect("inconsistent tree: missing child on a counted path");
        }
    }

    /// The value stored at priority `p` together with its current rank.
    pub fn find(&self, p: Priority) -> Result<(&T, Rank), Error> {
        self.check_priority(p)?;
        let mut node = match self.root.as_deref() {
            Some(n) => n,
            None => return Err(Error::NotPresent(p)),
        };
        let (mut lo, mut hi) = (1, self.max_priority);
        // Larger priorities sit to the right; every right subtree skipped on
        // the way down outranks p.
        let mut outranked = 0;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let next = if p <= mid {
                outranked += count(&node.right);
                hi = mid;
                node.left.as_deref()
            } else {
                lo = mid + 1;
                node.right.as_deref()
            };
            node = match next {
                Some(n) => n,
                None => return Err(Error::NotPresent(p)),
            };
        }
        match &node.slot {
            Some(v) => Ok((v, outranked + 1)),
            None => Err(Error::NotPresent(p)),
        }
    }

    /// Whether priority `p` is occupied. `p` must be inside the domain.
    fn occupied(&self, p: Priority) -> bool {
        let mut node = match self.root.as_deref() {
            Some(n) => n,
            None => return false,
        };
        let (mut lo, mut hi) = (1, self.max_priority);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let next = if p <= mid {
                hi = mid;
                node.left.as_deref()
            } else {
                lo = mid + 1;
                node.right.as_deref()
            };
            node = match next {
                Some(n) => n,
                None => return false,
            };
        }
        node.slot.is_some()
    }

    /// Inserts `value` at priority `p`.
    pub fn insert(&mut self, p: Priority, value: T) -> Result<(), Error> {
        self.check_priority(p)?;
        if self.occupied(p) {
            return Err(Error::DuplicatePriority(p));
        }
        let max = self.max_priority;
        Self::insert_at(&mut self.root, 1, max, p, value);
        Ok(())
    }

    fn insert_at(
        link: &mut Option<Box<Node<T>>>,
        lo: Priority,
        hi: Priority,
        p: Priority,
        value: T,
    ) {
        let node = link.get_or_insert_with(|| Box::new(Node::empty()));
        node.count += 1;
        if lo == hi {
            node.slot = Some(value);
            return;
        }
        let mid = lo + (hi - lo) / 2;
        if p <= mid {
            Self::insert_at(&mut node.left, lo, mid, p, value);
        } else {
            Self::insert_at(&mut node.right, mid + 1, hi, p, value);
        }
    }

    /// Removes the element with the k-th largest priority and returns it.
    pub fn erase(&mut self, k: Rank) -> Result<T, Error> {
        self.check_rank(k)?;
        let max = self.max_priority;
        let value = Self::erase_at(
            self.root
                .as_deref_mut()
                .expect("inconsistent tree: rank addressed into an empty structure"),
            1,
            max,
            k,
        );
        if count(&self.root) == 0 {
            self.root = None;
        }
        Ok(value)
    }

    // Drained subtrees are pruned on the way back up, so a node exists
    // exactly when its interval holds an element.
    fn erase_at(node: &mut Node<T>, lo: Priority, hi: Priority, k: Rank) -> T {
        node.count -= 1;
        if lo == hi {
            return node
                .slot
                .take()
                .expect("inconsistent tree: counted leaf with no value");
        }
        let mid = lo + (hi - lo) / 2;
        let rc = count(&node.right);
        if rc >= k {
            let child = node
                .right
                .as_deref_mut()
                .expect("inconsistent tree: missing child on a counted path");
            let value = Self::erase_at(child, mid + 1, hi, k);
            if count(&node.right) == 0 {
                node.right = None;
            }
            value
        } else {
            let child = node
                .left
                .as_deref_mut()
                .expect("inconsistent tree: missing child on a counted path");
            let value = Self::erase_at(child, lo, mid, k - rc);
            if count(&node.left) == 0 {
                node.left = None;
            }
            value
        }
    }

    /// Moves the element with the k-th largest priority to priority `p`.
    /// Its rank changes accordingly; the value is untouched.
    pub fn update_priority(&mut self, k: Rank, p: Priority) -> Result<(), Error> {
        self.check_rank(k)?;
        self.check_priority(p)?;
        if self.occupied(p) {
            return Err(Error::DuplicatePriority(p));
        }
        // All preconditions hold, neither step below can fail.
        let max = self.max_priority;
        let value = Self::erase_at(
            self.root
                .as_deref_mut()
                .expect("inconsistent tree: rank addressed into an empty structure"),
            1,
            max,
            k,
        );
        if count(&self.root) == 0 {
            self.root = None;
        }
        Self::insert_at(&mut self.root, 1, max, p, value);
        Ok(())
    }

    /// The smallest rank `j >= k` whose value satisfies `pred`, or
    /// `len() + 1` if none does. `k` below 1 is treated as 1.
    ///
    /// The scan walks windows of doubling length, so a hit at rank `j`
    /// costs `O(j log n)` lookups in the worst case. Each window is checked
    /// with a min-reduction, in parallel once it is long enough.
    pub fn next_with<F>(&self, k: Rank, pred: F) -> Rank
    where
        T: Sync,
        F: Fn(&T) -> bool + Sync,
    {
        let n = self.len();
        if n == 0 {
            return 1;
        }
        let mut start = k.max(1);
        if start > n {
            return n + 1;
        }
        let mut window = 0;
        while start <= n {
            let len = 1usize << window;
            let end = (start + len - 1).min(n);
            if let Some(found) = self.scan_window(start, end, &pred) {
                return found;
            }
            start += len;
            window += 1;
        }
        n + 1
    }

    /// Smallest qualifying rank in `lo..=hi`, both ends validated.
    fn scan_window<F>(&self, lo: Rank, hi: Rank, pred: &F) -> Option<Rank>
    where
        T: Sync,
        F: Fn(&T) -> bool + Sync,
    {
        if hi - lo + 1 >= SERIAL_SCAN_THRESHOLD {
            (lo..=hi)
                .into_par_iter()
                .filter(|&j| pred(self.value_at(j)))
                .min()
        } else {
            (lo..=hi).find(|&j| pred(self.value_at(j)))
        }
    }

    fn render(&self, node: &Node<T>, lo: Priority, hi: Priority, tree: &mut TreeBuilder)
    where
        T: Debug,
    {
        if lo == hi {
            match &node.slot {
                Some(v) => tree.add_leaf(&format!("p{lo}: {v:?}")),
                None => tree.add_leaf(&format!("p{lo}: ∅")),
            };
            return;
        }
        let _b = tree.add_branch(&format!("[{lo}..={hi}] count {}", node.count));
        let mid = lo + (hi - lo) / 2;
        match &node.left {
            Some(l) => self.render(l, lo, mid, tree),
            None => {
                tree.add_leaf("∅");
            }
        }
        match &node.right {
            Some(r) => self.render(r, mid + 1, hi, tree),
            None => {
                tree.add_leaf("∅");
            }
        }
    }
}

impl<T: Debug> Debug for PriorityStructure<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mut builder = TreeBuilder::new();
        let _b = builder.add_branch(&format!(
            "PriorityStructure 1..={} ({} stored)",
            self.max_priority,
            self.len()
        ));
        if let Some(root) = self.root.as_deref() {
            self.render(root, 1, self.max_priority, &mut builder);
        }
        writeln!(f, "{}", builder.string())
    }
}
