use crate::model::CommitRecord;
use crate::util::inclusive_days;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub email: String,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub first_commit: Option<DateTime<Utc>>,
    pub last_commit: Option<DateTime<Utc>>,
    /// Distinct files touched.
    pub files: u64,
    pub average_commit_size: u64,
    pub active_days: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributorSummary {
    pub total: u64,
    pub top_contributor: Option<String>,
    pub top_contributor_commits: u64,
    pub top_contributor_percentage: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributorReport {
    pub list: Vec<Contributor>,
    pub summary: ContributorSummary,
}

struct ContributorAccum<'a> {
    name: &'a str,
    email: &'a str,
    commits: u64,
    additions: u64,
    deletions: u64,
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
    files: HashSet<&'a str>,
}

impl ContributorAccum<'_> {
    fn into_contributor(self) -> Contributor {
        let average_commit_size = if self.commits > 0 {
            (self.additions.saturating_add(self.deletions) as f64 / self.commits as f64).round() as u64
        } else {
            0
        };
        let active_days = match (&self.first, &self.last) {
            (Some(first), Some(last)) => inclusive_days(first, last),
            _ => 0,
        };

        Contributor {
            name: self.name.to_string(),
            email: self.email.to_string(),
            commits: self.commits,
            additions: self.additions,
            deletions: self.deletions,
            first_commit: self.first,
            last_commit: self.last,
            files: self.files.len() as u64,
            average_commit_size,
            active_days,
        }
    }
}

/// Group commits by exact author email and rank by commit count.
pub fn analyze_contributors(commits: &[CommitRecord]) -> ContributorReport {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accums: Vec<ContributorAccum> = Vec::new();

    for commit in commits {
        let email = commit.author.email.as_str();
        let slot = *index.entry(email).or_insert_with(|| {
            accums.push(ContributorAccum {
                name: commit.author.name.as_str(),
                email,
                commits: 0,
                additions: 0,
                deletions: 0,
                first: None,
                last: None,
                files: HashSet::new(),
            });
            accums.len() - 1
        });

        let acc = &mut accums[slot];
        acc.commits += 1;
        acc.additions = acc.additions.saturating_add(commit.additions());
        acc.deletions = acc.deletions.saturating_add(commit.deletions());

        if let Some(ts) = commit.timestamp {
            if acc.first.map_or(true, |first| ts < first) {
                acc.first = Some(ts);
            }
            if acc.last.map_or(true, |last| ts > last) {
                acc.last = Some(ts);
            }
        }

        acc.files.extend(commit.files().map(|f| f.filename()));
    }

    let mut list: Vec<Contributor> = accums
        .into_iter()
        .map(ContributorAccum::into_contributor)
        .collect();
    // stable: equal counts keep first-seen order
    list.sort_by(|a, b| b.commits.cmp(&a.commits));

    let summary = summarize(&list);
    ContributorReport { list, summary }
}

fn summarize(list: &[Contributor]) -> ContributorSummary {
    let Some(top) = list.first() else {
        return ContributorSummary::default();
    };

    let total_commits: u64 = list.iter().map(|c| c.commits).sum();
    let percentage = if total_commits > 0 {
        (top.commits as f64 / total_commits as f64 * 100.0).round() as u64
    } else {
        0
    };

    ContributorSummary {
        total: list.len() as u64,
        top_contributor: Some(top.name.clone()),
        top_contributor_commits: top.commits,
        top_contributor_percentage: percentage,
    }
}
