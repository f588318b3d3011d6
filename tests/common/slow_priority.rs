#![allow(dead_code)]

use decremental_sssp::priority_structure::{Error, Priority, Rank};

/// Dummy model of the priority structure, all operations linear.
#[derive(Debug, Clone)]
pub struct SlowPriority<T> {
    max_priority: Priority,
    /// (priority, value), kept sorted by decreasing priority.
    elems: Vec<(Priority, T)>,
}

impl<T> SlowPriority<T> {
    pub fn new(max_priority: Priority) -> Self {
        Self {
            max_priority,
            elems: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    fn check_rank(&self, k: Rank) -> Result<(), Error> {
        if k < 1 || k > self.elems.len() {
            Err(Error::RankOutOfRange {
                rank: k,
                size: self.elems.len(),
            })
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

    pub fn initialize(&mut self, elems: Vec<(T, Priority)>) -> Result<(), Error> {
        for &(_, p) in &elems {
            self.check_priority(p)?;
        }
        let mut sorted: Vec<(Priority, T)> = elems.into_iter().map(|(v, p)| (p, v)).collect();
        sorted.sort_by_key(|e| e.0);
        for w in sorted.windows(2) {
            if w[0].0 == w[1].0 {
                return Err(Error::DuplicatePriority(w[1].0));
            }
        }
        sorted.reverse();
        self.elems = sorted;
        Ok(())
    }

    pub fn insert(&mut self, p: Priority, value: T) -> Result<(), Error> {
        self.check_priority(p)?;
        if self.elems.iter().any(|e| e.0 == p) {
            return Err(Error::DuplicatePriority(p));
        }
        let at = self.elems.partition_point(|e| e.0 > p);
        self.elems.insert(at, (p, value));
        Ok(())
    }

    pub fn erase(&mut self, k: Rank) -> Result<T, Error> {
        self.check_rank(k)?;
        Ok(self.elems.remove(k - 1).1)
    }

    pub fn query(&self, k: Rank) -> Result<&T, Error> {
        self.check_rank(k)?;
        Ok(&self.elems[k - 1].1)
    }

    pub fn update_value(&mut self, k: Rank, value: T) -> Result<(), Error> {
        self.check_rank(k)?;
        self.elems[k - 1].1 = value;
        Ok(())
    }

    pub fn find(&self, p: Priority) -> Result<(&T, Rank), Error> {
        self.check_priority(p)?;
        self.elems
            .iter()
            .position(|e| e.0 == p)
            .map(|i| (&self.elems[i].1, i + 1))
            .ok_or(Error::NotPresent(p))
    }

    pub fn update_priority(&mut self, k: Rank, p: Priority) -> Result<(), Error> {
        self.check_rank(k)?;
        self.check_priority(p)?;
        if self.elems.iter().any(|e| e.0 == p) {
            return Err(Error::DuplicatePriority(p));
        }
        let value = self.elems.remove(k - 1).1;
        let at = self.elems.partition_point(|e| e.0 > p);
        self.elems.insert(at, (p, value));
        Ok(())
    }

    pub fn next_with(&self, k: Rank, pred: impl Fn(&T) -> bool) -> Rank {
        let n = self.elems.len();
        if n == 0 {
            return 1;
        }
        let start = k.max(1);
        if start > n {
            return n + 1;
        }
        (start..=n)
            .find(|&j| pred(&self.elems[j - 1].1))
            .unwrap_or(n + 1)
    }
}
