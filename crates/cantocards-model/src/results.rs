// Partition of per-term outcomes into the complete / incomplete / missing
// buckets, plus the summary percentages reported at the end of a run.

use crate::entry::{Entry, Outcome, Term};
use serde::{Deserialize, Serialize};

/// The result of one pipeline run.
///
/// Built fresh from that run's outcomes; nothing carries over between runs.
/// Every processed term lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedResults {
    pub complete: Vec<Entry>,
    pub incomplete: Vec<Entry>,
    pub missing: Vec<Term>,
}

/// Share of the processed terms in each bucket, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentages {
    pub complete: f64,
    pub incomplete: f64,
    pub missing: f64,
}

impl ClassifiedResults {
    /// Sort outcomes into buckets, keeping their relative order.
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Outcome>,
    {
        let mut results = Self::default();
        for outcome in outcomes {
            results.push(outcome);
        }
        results
    }

    pub fn push(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Found(entry) if entry.is_complete() => self.complete.push(entry),
            Outcome::Found(entry) => self.incomplete.push(entry),
            Outcome::Missing(term) => self.missing.push(term),
        }
    }

    /// Number of processed terms.
    pub fn total(&self) -> usize {
        self.complete.len() + self.incomplete.len() + self.missing.len()
    }

    /// Bucket shares of the total. An empty run reports 0% everywhere.
    pub fn percentages(&self) -> Percentages {
        let total = self.total();
        if total == 0 {
            return Percentages::default();
        }
        let pct = |n: usize| n as f64 / total as f64 * 100.0;
        Percentages {
            complete: pct(self.complete.len()),
            incomplete: pct(self.incomplete.len()),
            missing: pct(self.missing.len()),
        }
    }
}
