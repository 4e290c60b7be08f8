//! Fuzzy name suggestions for typo'd tables and columns

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Score bonus for candidates sharing the first three normalized characters
const PREFIX_BONUS: f64 = 0.15;
const PREFIX_LEN: usize = 3;

/// Fuzzy matching knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Minimum score a candidate needs to be suggested
    pub cutoff: f64,
    /// Maximum number of suggestions returned
    pub top_k: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            cutoff: 0.45,
            top_k: 3,
        }
    }
}

impl FuzzyConfig {
    pub fn new(cutoff: f64, top_k: usize) -> Result<Self, Error> {
        let config = Self { cutoff, top_k };
        config.validate()?;
        Ok(config)
    }

    /// Reject cutoffs that would make every or no comparison meaningless
    pub fn validate(&self) -> Result<(), Error> {
        if !self.cutoff.is_finite() || self.cutoff < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "fuzzy cutoff must be a non-negative number, got {}",
                self.cutoff
            )));
        }
        Ok(())
    }
}

/// Normalize a name for similarity scoring: lowercase, drop underscores and
/// collapse runs of the same character (`Emp__lloyee` -> `employe`).
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c == '_' || out.ends_with(c) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Rank `candidates` by similarity to `bad` and return the best names
///
/// Returns at most `config.top_k` names, best first; ties keep candidate order.
pub fn suggest<S: AsRef<str>>(bad: &str, candidates: &[S], config: &FuzzyConfig) -> Vec<String> {
    let bad_norm: Vec<char> = normalize(bad).chars().collect();

    let mut scored: Vec<(&str, f64)> = candidates
        .iter()
        .map(|candidate| {
            let candidate = candidate.as_ref();
            let candidate_norm: Vec<char> = normalize(candidate).chars().collect();
            (candidate, score(&bad_norm, &candidate_norm))
        })
        .filter(|(_, score)| *score >= config.cutoff)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(config.top_k)
        .map(|(name, _)| name.to_string())
        .collect()
}

fn score(a: &[char], b: &[char]) -> f64 {
    let mut score = similarity_ratio(a, b);
    if a.len() >= PREFIX_LEN && b.len() >= PREFIX_LEN && a[..PREFIX_LEN] == b[..PREFIX_LEN] {
        score += PREFIX_BONUS;
    }
    score
}

/// Ratcliff/Obershelp similarity: `2 * M / T`, where `M` is the total size of
/// the matching blocks and `T` the combined length. Two empty inputs are
/// identical.
pub fn similarity_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * matched_len(a, b)) as f64 / total as f64
}

/// Total length of the matching blocks: take the longest common block, then
/// recurse on the pieces to its left and right.
fn matched_len(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Among equally long blocks the one starting earliest in `a` wins, then the
/// one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // current[j + 1] = length of the common run ending at a[i], b[j]
    let mut prev = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        let mut current = vec![0usize; b.len() + 1];
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let k = prev[j] + 1;
            current[j + 1] = k;
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        prev = current;
    }

    (best_i, best_j, best_size)
}
