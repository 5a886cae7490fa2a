//! Partial interval assignments explored by the sandwich search.
//!
//! A cut places vertices left to right. Each placed vertex whose mandatory neighbors are not all
//! placed yet is *active* and keeps its interval open: when the next vertex is placed, every active
//! interval is stretched to cover the new one. Closed intervals are never touched again, so two
//! vertices overlap exactly when the earlier one was still active as the later one was placed.

use crate::sandwich::instance::SandwichInstance;
use crate::sandwich::interval::{Interval, VertexInterval};
use std::cell::{OnceCell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// Why a vertex cannot be appended to a cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtensionRejected {
    #[error("vertex is already placed")]
    AlreadyPlaced,

    #[error("vertex has a forbidden neighbor in the active region")]
    ForbiddenEdge,

    #[error("active region holds {active} vertices and the vertex closes none of them")]
    ActiveRegionBounded { active: usize },

    #[error("active region would grow to {active} vertices, width is {width}")]
    WidthExceeded { active: usize, width: usize },

    #[error("overlap count of a placed vertex changed unexpectedly")]
    DegreeMismatch,

    #[error("pending mandatory edges of the active region changed")]
    StaleDanglingEdges,

    #[error("pending mandatory edges of the new vertex are incomplete")]
    MissingDanglingEdges,

    #[error("active region still holds closed vertices")]
    StaleActiveRegion,
}

pub struct Cut<'a, V> {
    instance: &'a SandwichInstance<V>,
    width: usize,
    domain: Vec<V>,
    positions: HashMap<V, usize>,
    intervals: Vec<Interval>,
    dangling: OnceCell<BTreeMap<V, BTreeSet<V>>>,
    active: OnceCell<BTreeSet<V>>,
    maximal: OnceCell<BTreeSet<V>>,
    degrees: RefCell<HashMap<V, usize>>,
}

impl<'a, V: Copy + Eq + Hash + Ord + Debug> Cut<'a, V> {
    /// A cut holding one vertex on `[0, 1]`
    pub fn singleton(instance: &'a SandwichInstance<V>, vertex: V, width: usize) -> Self {
        Self::from_parts(instance, width, vec![vertex], vec![Interval::new(0.0, 1.0)])
    }

    fn from_parts(instance: &'a SandwichInstance<V>, width: usize, domain: Vec<V>, intervals: Vec<Interval>) -> Self {
        let positions = domain
            .iter()
            .enumerate()
            .map(|(position, &vertex)| (vertex, position))
            .collect();

        Self {
            instance,
            width,
            domain,
            positions,
            intervals,
            dangling: OnceCell::new(),
            active: OnceCell::new(),
            maximal: OnceCell::new(),
            degrees: RefCell::new(HashMap::new()),
        }
    }

    /// Placed vertices, in placement order
    pub fn domain(&self) -> &[V] {
        &self.domain
    }

    pub fn contains(&self, vertex: V) -> bool {
        self.positions.contains_key(&vertex)
    }

    pub fn is_complete(&self) -> bool {
        self.domain.len() == self.instance.len()
    }

    pub fn interval(&self, vertex: V) -> Option<Interval> {
        self.positions.get(&vertex).map(|&position| self.intervals[position])
    }

    pub fn intervals(&self) -> Vec<VertexInterval<V>> {
        self.domain
            .iter()
            .zip(&self.intervals)
            .map(|(&vertex, &interval)| VertexInterval { vertex, interval })
            .collect()
    }

    /// Canonical identity of the cut: its domain as a sorted list
    pub fn signature(&self) -> Vec<V> {
        let mut signature = self.domain.clone();
        signature.sort();
        signature
    }

    /// Unplaced mandatory neighbors of every active vertex
    pub fn dangling(&self) -> &BTreeMap<V, BTreeSet<V>> {
        self.dangling.get_or_init(|| {
            self.domain
                .iter()
                .filter_map(|&vertex| {
                    let pending: BTreeSet<V> = self
                        .instance
                        .mandatory_neighbors(vertex)
                        .iter()
                        .copied()
                        .filter(|neighbor| !self.contains(*neighbor))
                        .collect();
                    (!pending.is_empty()).then_some((vertex, pending))
                })
                .collect()
        })
    }

    /// Placed vertices with at least one unplaced mandatory neighbor
    pub fn active_vertices(&self) -> &BTreeSet<V> {
        self.active
            .get_or_init(|| self.dangling().keys().copied().collect())
    }

    /// Every unplaced vertex some active vertex is waiting for
    pub fn dangling_vertices(&self) -> BTreeSet<V> {
        self.dangling().values().flatten().copied().collect()
    }

    /// Placed vertices whose interval reaches the rightmost endpoint
    pub fn maximal_vertices(&self) -> &BTreeSet<V> {
        self.maximal.get_or_init(|| {
            let right = self.max_right();
            self.domain
                .iter()
                .zip(&self.intervals)
                .filter(|(_, interval)| interval.right >= right)
                .map(|(&vertex, _)| vertex)
                .collect()
        })
    }

    /// Number of other placed intervals overlapping the interval of `vertex`
    pub fn degree(&self, vertex: V) -> usize {
        if let Some(&degree) = self.degrees.borrow().get(&vertex) {
            return degree;
        }

        let degree = match self.interval(vertex) {
            Some(interval) => self
                .domain
                .iter()
                .zip(&self.intervals)
                .filter(|&(&other, other_interval)| other != vertex && interval.overlaps(other_interval))
                .count(),
            None => 0,
        };

        self.degrees.borrow_mut().insert(vertex, degree);
        degree
    }

    fn max_right(&self) -> f64 {
        self.intervals
            .iter()
            .map(|interval| interval.right)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Append `vertex` to the right of the cut, stretching every active interval over it
    fn place(&self, vertex: V) -> Cut<'a, V> {
        let start = self.max_right() + 0.5;
        let end = start + 1.0;
        let active = self.active_vertices();

        let mut intervals = self.intervals.clone();
        for (position, &placed) in self.domain.iter().enumerate() {
            if active.contains(&placed) {
                intervals[position].right = end;
            }
        }
        intervals.push(Interval::new(start, end));

        let mut domain = self.domain.clone();
        domain.push(vertex);

        Cut::from_parts(self.instance, self.width, domain, intervals)
    }

    /// The cut obtained by placing `vertex` next, if the placement keeps the cut valid
    pub fn try_extend(&self, vertex: V) -> Result<Cut<'a, V>, ExtensionRejected> {
        if self.contains(vertex) {
            return Err(ExtensionRejected::AlreadyPlaced);
        }

        let active = self.active_vertices();
        if active
            .iter()
            .any(|&placed| self.instance.is_forbidden(placed, vertex))
        {
            return Err(ExtensionRejected::ForbiddenEdge);
        }

        if active.len() + 1 >= self.width && !self.dangling_vertices().contains(&vertex) {
            return Err(ExtensionRejected::ActiveRegionBounded {
                active: active.len(),
            });
        }

        let extended = self.place(vertex);
        let extended_active = extended.active_vertices();
        if extended_active.len() >= self.width {
            return Err(ExtensionRejected::WidthExceeded {
                active: extended_active.len(),
                width: self.width,
            });
        }

        for &placed in &self.domain {
            let expected = if active.contains(&placed) {
                self.degree(placed) + 1
            } else {
                self.degree(placed)
            };
            let still_active = extended_active.contains(&placed);
            if (still_active || !active.contains(&placed)) && extended.degree(placed) != expected {
                return Err(ExtensionRejected::DegreeMismatch);
            }
        }

        let extended_dangling = extended.dangling();
        for (placed, pending) in self.dangling() {
            let mut expected = pending.clone();
            expected.remove(&vertex);
            let actual = extended_dangling.get(placed).cloned().unwrap_or_default();
            if actual != expected {
                return Err(ExtensionRejected::StaleDanglingEdges);
            }
        }

        let expected: BTreeSet<V> = self
            .instance
            .mandatory_neighbors(vertex)
            .iter()
            .copied()
            .filter(|neighbor| !active.contains(neighbor))
            .collect();
        if extended_dangling.get(&vertex).cloned().unwrap_or_default() != expected {
            return Err(ExtensionRejected::MissingDanglingEdges);
        }

        let expected_active: BTreeSet<V> = active
            .iter()
            .copied()
            .chain(std::iter::once(vertex))
            .filter(|candidate| extended_dangling.contains_key(candidate))
            .collect();
        if *extended_active != expected_active {
            return Err(ExtensionRejected::StaleActiveRegion);
        }

        debug_assert!(extended_active.is_subset(extended.maximal_vertices()));
        Ok(extended)
    }

    /// Place `vertex` in this cut, leaving it untouched when the placement is rejected
    pub fn extend(&mut self, vertex: V) -> Result<(), ExtensionRejected> {
        *self = self.try_extend(vertex)?;
        Ok(())
    }
}
