use crate::model::CommitRecord;
use crate::util::round_to;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: String,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    /// Distinct author emails active that day.
    pub authors: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub total_active_days: u64,
    pub average_commits_per_day: f64,
    pub most_active_day: Option<DayBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub daily: Vec<DayBucket>,
    pub summary: TimelineSummary,
}

struct DayAccum<'a> {
    date: String,
    commits: u64,
    additions: u64,
    deletions: u64,
    authors: HashSet<&'a str>,
}

impl DayAccum<'_> {
    fn into_bucket(self) -> DayBucket {
        DayBucket {
            date: self.date,
            commits: self.commits,
            additions: self.additions,
            deletions: self.deletions,
            authors: self.authors.len() as u64,
        }
    }
}

/// Per-UTC-day rollup. Commits without a timestamp are left out.
pub fn create_timeline(commits: &[CommitRecord]) -> Timeline {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut days: Vec<DayAccum> = Vec::new();

    for commit in commits {
        let Some(date) = commit.day() else {
            continue;
        };

        let slot = *index.entry(date.clone()).or_insert_with(|| {
            days.push(DayAccum {
                date,
                commits: 0,
                additions: 0,
                deletions: 0,
                authors: HashSet::new(),
            });
            days.len() - 1
        });

        let day = &mut days[slot];
        day.commits += 1;
        day.additions = day.additions.saturating_add(commit.additions());
        day.deletions = day.deletions.saturating_add(commit.deletions());
        day.authors.insert(commit.author.email.as_str());
    }

    // encounter order, so ties go to the first day seen
    let mut daily: Vec<DayBucket> = days.into_iter().map(DayAccum::into_bucket).collect();
    let summary = summarize(&daily);
    daily.sort_by(|a, b| a.date.cmp(&b.date));

    Timeline { daily, summary }
}

fn summarize(days: &[DayBucket]) -> TimelineSummary {
    let Some(first) = days.first() else {
        return TimelineSummary::default();
    };

    let total: u64 = days.iter().map(|d| d.commits).sum();
    let most_active = days
        .iter()
        .fold(first, |max, day| if day.commits > max.commits { day } else { max });

    TimelineSummary {
        total_active_days: days.len() as u64,
        average_commits_per_day: round_to(total as f64 / days.len() as f64, 2),
        most_active_day: Some(most_active.clone()),
    }
}
