//! Sequence alignment.
//!
//! [`ArrayComparator`] aligns two sequences under a [`ComparisonModel`] and
//! reports every element as missing, unexpected, moved or different. It runs
//! in four passes:
//!
//! 1. Identity: each expected element is paired with an equal actual
//!    element, preferring the same index, otherwise the first unpaired one.
//! 2. Correspondence: each still unpaired expected element is paired with the
//!    first unpaired corresponding actual element (changed), or is removed.
//! 3. Every actual element left over is added.
//! 4. Assembly: two cursors walk both sequences and emit diffs in an order
//!    that reads naturally from top to bottom.
//!
//! Matches live in an arena referenced from both sequences, so consuming a
//! match from one side is visible from the other.

use tracing::debug;

use super::diff::DiffDetail;
use super::ComparisonModel;
use crate::constants::LIST_ELEMENT;

/// Classification of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Match {
    Identical { i1: usize, i2: usize },
    Changed { i1: usize, i2: usize },
    Removed { i1: usize },
    Added { i2: usize },
}

/// The diffs produced by one alignment, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayComparisonResult<V> {
    diffs: Vec<DiffDetail<V>>,
}

impl<V> ArrayComparisonResult<V> {
    pub fn diffs(&self) -> &[DiffDetail<V>] {
        &self.diffs
    }

    pub fn into_diffs(self) -> Vec<DiffDetail<V>> {
        self.diffs
    }

    /// Returns true if the sequences were equal element by element.
    pub fn identical(&self) -> bool {
        self.diffs.is_empty()
    }
}

/// Aligns two sequences. See the module documentation for the algorithm.
pub struct ArrayComparator<'a, E, M: ?Sized> {
    items1: &'a [E],
    items2: &'a [E],
    model: &'a M,
    parent_locator: &'a str,
    arena: Vec<Match>,
    consumed: Vec<bool>,
    /// Arena index of the match of each expected element.
    matches1: Vec<Option<usize>>,
    /// Arena index of the match of each actual element.
    matches2: Vec<Option<usize>>,
}

impl<'a, E, M> ArrayComparator<'a, E, M>
where
    M: ComparisonModel<E> + ?Sized,
{
    /// Compares two sequences of values with empty parent locator.
    pub fn compare(items1: &'a [E], items2: &'a [E], model: &'a M) -> ArrayComparisonResult<E>
    where
        E: Clone,
    {
        Self::compare_with(items1, items2, model, "", E::clone)
    }

    /// Compares two sequences, converting reported elements with `to_value`
    /// and prefixing every locator with `parent_locator`.
    pub fn compare_with<V: Clone>(
        items1: &'a [E],
        items2: &'a [E],
        model: &'a M,
        parent_locator: &'a str,
        to_value: impl Fn(&E) -> V,
    ) -> ArrayComparisonResult<V> {
        let mut comparator = ArrayComparator {
            items1,
            items2,
            model,
            parent_locator,
            arena: Vec::new(),
            consumed: Vec::new(),
            matches1: vec![None; items1.len()],
            matches2: vec![None; items2.len()],
        };
        comparator.match_identical();
        comparator.match_corresponding();
        comparator.match_added();
        let diffs = comparator.assemble(&to_value);
        debug!(
            parent = parent_locator,
            expected_len = items1.len(),
            actual_len = items2.len(),
            diffs = diffs.len(),
            "aligned sequences"
        );
        ArrayComparisonResult { diffs }
    }

    fn push_match(&mut self, m: Match) {
        let index = self.arena.len();
        self.arena.push(m);
        self.consumed.push(false);
        match m {
            Match::Identical { i1, i2 } | Match::Changed { i1, i2 } => {
                self.matches1[i1] = Some(index);
                self.matches2[i2] = Some(index);
            }
            Match::Removed { i1 } => self.matches1[i1] = Some(index),
            Match::Added { i2 } => self.matches2[i2] = Some(index),
        }
    }

    fn match_identical(&mut self) {
        for i1 in 0..self.items1.len() {
            let item = &self.items1[i1];
            let same_index = i1 < self.items2.len()
                && self.matches2[i1].is_none()
                && self.model.equal(item, &self.items2[i1]);
            let partner = if same_index {
                Some(i1)
            } else {
                (0..self.items2.len()).find(|&i2| {
                    self.matches2[i2].is_none() && self.model.equal(item, &self.items2[i2])
                })
            };
            if let Some(i2) = partner {
                self.push_match(Match::Identical { i1, i2 });
            }
        }
    }

    fn match_corresponding(&mut self) {
        for i1 in 0..self.items1.len() {
            if self.matches1[i1].is_some() {
                continue;
            }
            let item = &self.items1[i1];
            let partner = (0..self.items2.len()).find(|&i2| {
                self.matches2[i2].is_none() && self.model.correspond(item, &self.items2[i2])
            });
            match partner {
                Some(i2) => self.push_match(Match::Changed { i1, i2 }),
                None => self.push_match(Match::Removed { i1 }),
            }
        }
    }

    fn match_added(&mut self) {
        for i2 in 0..self.items2.len() {
            if self.matches2[i2].is_none() {
                self.push_match(Match::Added { i2 });
            }
        }
    }

    fn locator1(&self, i1: usize) -> String {
        format!("{}{}", self.parent_locator, self.model.sub_path(self.items1, i1))
    }

    fn locator2(&self, i2: usize) -> String {
        format!("{}{}", self.parent_locator, self.model.sub_path(self.items2, i2))
    }

    /// First index at or after `index` whose match is not consumed.
    fn next_unconsumed(&self, slots: &[Option<usize>], mut index: usize) -> usize {
        while index < slots.len() && slots[index].is_some_and(|m| self.consumed[m]) {
            index += 1;
        }
        index
    }

    fn assemble<V: Clone>(&mut self, to_value: &impl Fn(&E) -> V) -> Vec<DiffDetail<V>> {
        let mut diffs = Vec::new();
        let (mut c1, mut c2) = (0, 0);

        while c1 < self.items1.len() || c2 < self.items2.len() {
            let slot1 = self.matches1.get(c1).copied().flatten();
            let slot2 = self.matches2.get(c2).copied().flatten();
            let m1 = slot1.map(|m| self.arena[m]);
            let m2 = slot2.map(|m| self.arena[m]);

            match (m1, m2) {
                (Some(Match::Removed { i1 }), _) => {
                    diffs.push(DiffDetail::missing(
                        to_value(&self.items1[i1]),
                        LIST_ELEMENT,
                        self.locator1(i1),
                    ));
                    self.consume(slot1);
                    c1 = self.next_unconsumed(&self.matches1, c1);
                }
                (_, Some(Match::Added { i2 })) => {
                    diffs.push(DiffDetail::unexpected(
                        to_value(&self.items2[i2]),
                        LIST_ELEMENT,
                        self.locator2(i2),
                    ));
                    self.consume(slot2);
                    c2 = self.next_unconsumed(&self.matches2, c2);
                }
                (Some(Match::Changed { i1, i2 }), Some(_)) => {
                    if i1 != c1 || i2 != c2 {
                        diffs.push(DiffDetail::moved(
                            to_value(&self.items1[i1]),
                            LIST_ELEMENT,
                            self.locator1(i1),
                            self.locator2(i2),
                        ));
                    }
                    diffs.push(DiffDetail::different(
                        to_value(&self.items1[i1]),
                        to_value(&self.items2[i2]),
                        LIST_ELEMENT,
                        self.locator1(i1),
                        self.locator2(i2),
                    ));
                    self.consume(slot1);
                    c1 = self.next_unconsumed(&self.matches1, c1);
                    c2 = self.next_unconsumed(&self.matches2, c2);
                }
                (Some(Match::Identical { i1, i2 }), Some(_)) => {
                    if i1 != i2 && (i1 != c1 || i2 != c2) {
                        diffs.push(DiffDetail::moved(
                            to_value(&self.items1[i1]),
                            LIST_ELEMENT,
                            self.locator1(i1),
                            self.locator2(i2),
                        ));
                    }
                    self.consume(slot1);
                    c1 = self.next_unconsumed(&self.matches1, c1);
                    c2 = self.next_unconsumed(&self.matches2, c2);
                }
                (m1, m2) => unreachable!(
                    "inconsistent alignment at cursors ({}, {}): {:?} / {:?}",
                    c1, c2, m1, m2
                ),
            }
        }
        diffs
    }

    fn consume(&mut self, slot: Option<usize>) {
        if let Some(m) = slot {
            self.consumed[m] = true;
        }
    }
}
