//! Consensus over redundant payload observations
//!
//! Candidates are grouped by declared length. Within a group every bit
//! position is decided by majority (ties go to 0), and the consensus must
//! decode to printable ASCII. The group backed by the most candidates wins.
//!
//! Ties between groups of equal size go to the higher mean agreement, then
//! to the longer message, then to the group found first.

use crate::constants::BITS_PER_CHAR;
use crate::decoder::decode_strict;
use crate::error::WatermarkError;
use crate::scanner::ScanStats;
use crate::types::{Candidate, ConsensusResult};
use core::cmp::Ordering;
use hashbrown::HashMap;
use serde::Serialize;

#[cfg(feature = "logging")]
use tracing::{debug, info};

/// Outcome of voting within one declared-length group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupVerdict {
    /// Declared length shared by the group
    pub declared_length: usize,
    /// Number of candidates in the group
    pub support: usize,
    /// Mean per-bit share of candidates agreeing with the consensus
    pub agreement: f64,
    /// Consensus text, `None` if it was not printable
    pub text: Option<String>,
    /// Alignment of the first candidate in the group
    pub first_offset: (usize, usize),
}

impl GroupVerdict {
    /// Ordering used to pick the winner; `Greater` means `self` wins
    fn rank(&self, other: &Self) -> Ordering {
        self.support
            .cmp(&other.support)
            .then(
                self.agreement
                    .partial_cmp(&other.agreement)
                    .unwrap_or(Ordering::Equal),
            )
            .then(self.declared_length.cmp(&other.declared_length))
    }
}

/// Group candidates by declared length, keeping first-found order
pub fn group_candidates(candidates: Vec<Candidate>) -> Vec<Vec<Candidate>> {
    let mut index: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<Candidate>> = Vec::new();

    for candidate in candidates {
        let slot = *index.entry(candidate.declared_length).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(candidate);
    }

    groups
}

/// Per-bit majority over `width` bits; returns the consensus and mean agreement
///
/// Positions missing from a short bitstring count for neither value.
pub fn majority_vote<'a, I>(bitstrings: I, width: usize) -> (Vec<u8>, f64)
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut ones = vec![0usize; width];
    let mut seen = vec![0usize; width];

    for bits in bitstrings {
        for (i, &bit) in bits.iter().take(width).enumerate() {
            seen[i] += 1;
            ones[i] += (bit & 1) as usize;
        }
    }

    let mut consensus = Vec::with_capacity(width);
    let mut agreement = 0.0;
    for i in 0..width {
        let zeros = seen[i] - ones[i];
        let bit = if ones[i] > zeros { 1 } else { 0 };
        consensus.push(bit);
        if seen[i] > 0 {
            agreement += ones[i].max(zeros) as f64 / seen[i] as f64;
        }
    }

    let agreement = if width == 0 {
        0.0
    } else {
        agreement / width as f64
    };
    (consensus, agreement)
}

/// Vote within one group
pub fn evaluate_group(group: &[Candidate]) -> Option<GroupVerdict> {
    let first = group.first()?;
    let width = first.declared_length * BITS_PER_CHAR;
    let (consensus, agreement) = majority_vote(group.iter().map(|c| c.bits.as_slice()), width);

    Some(GroupVerdict {
        declared_length: first.declared_length,
        support: group.len(),
        agreement,
        text: decode_strict(&consensus),
        first_offset: first.offset,
    })
}

/// Vote in every group, updating group counters in `stats`
pub fn evaluate_candidates(candidates: Vec<Candidate>, stats: &mut ScanStats) -> Vec<GroupVerdict> {
    let verdicts: Vec<GroupVerdict> = group_candidates(candidates)
        .iter()
        .filter_map(|group| evaluate_group(group))
        .collect();

    stats.groups = verdicts.len();
    for verdict in &verdicts {
        if verdict.text.is_none() {
            stats.groups_rejected += 1;

            #[cfg(feature = "logging")]
            debug!(
                "{}",
                WatermarkError::NonPrintablePayload {
                    length: verdict.declared_length
                }
            );
        }
    }

    verdicts
}

/// Pick the best-supported printable group
pub fn select_winner(verdicts: &[GroupVerdict]) -> Result<ConsensusResult, WatermarkError> {
    let mut best: Option<&GroupVerdict> = None;
    for verdict in verdicts.iter().filter(|v| v.text.is_some()) {
        // Strictly better only, so equal ranks keep the first found
        if best.map_or(true, |b| verdict.rank(b) == Ordering::Greater) {
            best = Some(verdict);
        }
    }

    let winner = best.ok_or(WatermarkError::NoWatermarkFound)?;
    let text = winner.text.clone().ok_or(WatermarkError::NoWatermarkFound)?;

    #[cfg(feature = "logging")]
    info!(
        "Recovered {}-char watermark backed by {} candidates ({:.1}% agreement)",
        winner.declared_length,
        winner.support,
        winner.agreement * 100.0
    );

    Ok(ConsensusResult {
        text,
        support: winner.support,
        declared_length: winner.declared_length,
        agreement: winner.agreement,
    })
}

/// Group, vote and select in one step
pub fn decode_candidates(
    candidates: Vec<Candidate>,
    stats: &mut ScanStats,
) -> Result<ConsensusResult, WatermarkError> {
    let verdicts = evaluate_candidates(candidates, stats);
    select_winner(&verdicts)
}
