//! Regime schedule: binds regimes to half-open day ranges.
//!
//! Day `d` is governed by the LAST assignment (in declaration order) whose
//! `[start_day, end_day)` contains `d`, so later entries patch earlier ones.
//! Days covered by no assignment carry the previous quote forward.

use std::sync::Arc;

use crate::error::SimError;
use crate::regime::Regime;

/// A regime bound to the half-open day range `[start_day, end_day)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeAssignment {
    pub regime: Arc<Regime>,
    pub start_day: usize,
    pub end_day: usize,
}

impl RegimeAssignment {
    pub fn new(regime: Regime, start_day: usize, end_day: usize) -> Self {
        Self {
            regime: Arc::new(regime),
            start_day,
            end_day,
        }
    }

    /// Bind an already-shared regime, e.g. one reused across several ranges.
    pub fn shared(regime: Arc<Regime>, start_day: usize, end_day: usize) -> Self {
        Self {
            regime,
            start_day,
            end_day,
        }
    }

    pub fn contains(&self, day: usize) -> bool {
        (self.start_day..self.end_day).contains(&day)
    }
}

/// The regime governing a single day.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub regime: &'a Regime,
    pub day_in_regime: usize,
}

/// Per-day resolution of an ordered assignment list.
#[derive(Debug, Clone)]
pub struct Schedule {
    assignments: Vec<RegimeAssignment>,
    /// Index into `assignments` for each day in `0..total_days`.
    by_day: Vec<Option<usize>>,
}

impl Schedule {
    pub fn new(assignments: Vec<RegimeAssignment>) -> Result<Self, SimError> {
        for (index, a) in assignments.iter().enumerate() {
            if a.start_day > a.end_day {
                return Err(SimError::InvalidAssignment {
                    index,
                    start: a.start_day,
                    end: a.end_day,
                });
            }
        }

        let total_days = assignments.iter().map(|a| a.end_day).max().unwrap_or(0);
        let mut by_day = vec![None; total_days];
        for (index, a) in assignments.iter().enumerate() {
            for slot in &mut by_day[a.start_day..a.end_day] {
                *slot = Some(index);
            }
        }

        let uncovered = by_day.iter().filter(|s| s.is_none()).count();
        tracing::debug!(
            assignments = assignments.len(),
            total_days,
            uncovered,
            "schedule resolved"
        );

        Ok(Self {
            assignments,
            by_day,
        })
    }

    /// Maximum `end_day` across all assignments.
    pub fn total_days(&self) -> usize {
        self.by_day.len()
    }

    pub fn assignments(&self) -> &[RegimeAssignment] {
        &self.assignments
    }

    /// The regime governing `day`, or `None` if no assignment covers it.
    pub fn resolve(&self, day: usize) -> Option<Resolved<'_>> {
        let index = (*self.by_day.get(day)?)?;
        let a = &self.assignments[index];
        Some(Resolved {
            regime: &a.regime,
            day_in_regime: day - a.start_day,
        })
    }
}
