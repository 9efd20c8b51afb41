//! Heuristic scalars derived from commit totals.
//!
//! Both the productivity score and the repository size estimate are rough
//! indicators. Their constants are tuning values kept stable so reports stay
//! numerically comparable across versions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight applied to commits per day.
pub const COMMIT_WEIGHT: f64 = 10.0;
/// Divisor applied to changed lines per day.
pub const CHURN_DAMPING: f64 = 100.0;

const CHARS_PER_LINE: f64 = 50.0;
const BYTES_PER_CHAR: f64 = 2.0;
const FILE_METADATA_BYTES: f64 = 1024.0;
const GIT_OVERHEAD_RATIO: f64 = 0.3;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// `round(((commits/days)*10 + (additions+deletions)/days/100) * 10) / 10`, or 0 for an empty span.
pub fn productivity_score(commits: u64, additions: u64, deletions: u64, days: u64) -> f64 {
    if days == 0 {
        return 0.0;
    }
    let days = days as f64;
    let commit_score = commits as f64 / days * COMMIT_WEIGHT;
    let change_score = additions.saturating_add(deletions) as f64 / days / CHURN_DAMPING;
    ((commit_score + change_score) * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeUnit {
    B,
    KB,
    MB,
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
        };
        f.write_str(s)
    }
}

/// Order-of-magnitude storage estimate. Not a measured size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeEstimate {
    pub value: u64,
    pub unit: SizeUnit,
    pub estimated: bool,
}

impl fmt::Display for SizeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{} {} (estimated)", self.value, self.unit)
    }
}

pub fn estimate_repository_size(total_additions: u64, file_count: usize) -> SizeEstimate {
    let content = total_additions as f64 * CHARS_PER_LINE * BYTES_PER_CHAR;
    let metadata = file_count as f64 * FILE_METADATA_BYTES;
    let overhead = content * GIT_OVERHEAD_RATIO;
    let total = content + metadata + overhead;

    let (value, unit) = if total < KIB {
        (total.round(), SizeUnit::B)
    } else if total < MIB {
        ((total / KIB).round(), SizeUnit::KB)
    } else {
        ((total / MIB).round(), SizeUnit::MB)
    };

    SizeEstimate {
        value: value as u64,
        unit,
        estimated: true,
    }
}
