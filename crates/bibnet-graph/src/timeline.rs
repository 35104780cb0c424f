//! Year-by-year activity.
//!
//! Only documents with a publication year are bucketed, so a year with no
//! documents never shows up, not even with zero counts.

use crate::builder::unique_authors;
use bibnet_core::{CorpusSnapshot, DocumentId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CitationYear {
    /// Citation records of that year's documents, resolved or not.
    pub citations_made: usize,
    /// Resolved citations pointing at that year's documents.
    pub citations_received: usize,
    /// Received minus made.
    pub net_citations: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CitationTimeline {
    pub timeline: BTreeMap<i32, CitationYear>,
    pub total_years: usize,
    pub year_range: Option<(i32, i32)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollaborationYear {
    pub total_papers: usize,
    pub collaborative_papers: usize,
    pub solo_papers: usize,
    pub unique_authors: usize,
    /// Distinct author pairs, however many papers they shared that year.
    pub unique_collaborations: usize,
    pub collaboration_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollaborationTimeline {
    pub timeline: BTreeMap<i32, CollaborationYear>,
    pub total_years: usize,
    pub year_range: Option<(i32, i32)>,
}

/// Citations made and received, bucketed by the publication year of the
/// document on each end.
pub fn citation_timeline(snapshot: &CorpusSnapshot) -> CitationTimeline {
    let mut made: HashMap<DocumentId, usize> = HashMap::new();
    let mut received: HashMap<DocumentId, usize> = HashMap::new();
    for citation in &snapshot.citations {
        *made.entry(citation.citing_document_id).or_default() += 1;
        if let Some(cited) = citation.cited_document_id {
            *received.entry(cited).or_default() += 1;
        }
    }

    let mut timeline: BTreeMap<i32, CitationYear> = BTreeMap::new();
    for doc in &snapshot.documents {
        let Some(year) = doc.publication_year else {
            continue;
        };
        let entry = timeline.entry(year).or_default();
        entry.citations_made += made.get(&doc.id).copied().unwrap_or(0);
        entry.citations_received += received.get(&doc.id).copied().unwrap_or(0);
    }
    for entry in timeline.values_mut() {
        entry.net_citations = entry.citations_received as i64 - entry.citations_made as i64;
    }

    CitationTimeline {
        total_years: timeline.len(),
        year_range: year_range(&timeline),
        timeline,
    }
}

#[derive(Default)]
struct YearTally<'a> {
    total: usize,
    collaborative: usize,
    authors: BTreeSet<&'a str>,
    pairs: BTreeSet<(&'a str, &'a str)>,
}

/// Solo and collaborative output per publication year.
pub fn collaboration_timeline(snapshot: &CorpusSnapshot) -> CollaborationTimeline {
    let mut tallies: BTreeMap<i32, YearTally> = BTreeMap::new();

    for doc in &snapshot.documents {
        let Some(year) = doc.publication_year else {
            continue;
        };
        let authors = unique_authors(doc);
        let tally = tallies.entry(year).or_default();
        tally.total += 1;
        tally.authors.extend(authors.iter().copied());

        if authors.len() > 1 {
            tally.collaborative += 1;
            for (i, &first) in authors.iter().enumerate() {
                for &second in &authors[i + 1..] {
                    tally.pairs.insert((first.min(second), first.max(second)));
                }
            }
        }
    }

    let timeline: BTreeMap<i32, CollaborationYear> = tallies
        .into_iter()
        .map(|(year, tally)| {
            let year_stats = CollaborationYear {
                total_papers: tally.total,
                collaborative_papers: tally.collaborative,
                solo_papers: tally.total - tally.collaborative,
                unique_authors: tally.authors.len(),
                unique_collaborations: tally.pairs.len(),
                collaboration_rate: ratio(tally.collaborative, tally.total),
            };
            (year, year_stats)
        })
        .collect();

    CollaborationTimeline {
        total_years: timeline.len(),
        year_range: year_range(&timeline),
        timeline,
    }
}

fn year_range<V>(timeline: &BTreeMap<i32, V>) -> Option<(i32, i32)> {
    let first = *timeline.keys().next()?;
    let last = *timeline.keys().next_back()?;
    Some((first, last))
}

pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
