use crate::reference::ReferenceIndex;

/// Tokens split on whitespace, sorted, re-joined with single spaces.
pub fn token_sort_key(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Length of the longest common subsequence of two char slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    // Keep the DP row on the shorter side.
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; short.len() + 1];
    let mut cur = vec![0usize; short.len() + 1];
    for &lc in long {
        for (j, &sc) in short.iter().enumerate() {
            cur[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[short.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * (2 * lcs_len(a, b)) as f64 / total as f64
}

/// Normalized indel similarity in 0..=100: `2 * LCS / (|a| + |b|)`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// [`ratio`] after sorting the whitespace tokens of both sides, so
/// "Fitter, Machine" and "Machine Fitter," compare equal.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&token_sort_key(a), &token_sort_key(b))
}

// ---------------------------------------------------------------------------
// Best match
// ---------------------------------------------------------------------------

/// Highest-scoring candidate. `label` is `None` with score 0 when the query
/// is blank or there are no candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch<'a> {
    pub label: Option<&'a str>,
    pub score: f64,
}

impl<'a> BestMatch<'a> {
    pub const NONE: Self = BestMatch { label: None, score: 0.0 };

    /// Fold one scored candidate in. Equal scores keep the lexicographically
    /// smaller label, so the result does not depend on candidate order.
    fn offer(self, label: &'a str, score: f64) -> Self {
        let better = match self.label {
            None => true,
            Some(current) => score > self.score || (score == self.score && label < current),
        };
        if better {
            BestMatch { label: Some(label), score }
        } else {
            self
        }
    }
}

/// Linear scan of `candidates` with [`token_sort_ratio`].
pub fn best_match<'a, I>(query: &str, candidates: I) -> BestMatch<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let key: Vec<char> = token_sort_key(query).chars().collect();
    if key.is_empty() {
        return BestMatch::NONE;
    }
    candidates.into_iter().fold(BestMatch::NONE, |best, label| {
        let cand: Vec<char> = token_sort_key(label).chars().collect();
        best.offer(label, ratio_chars(&key, &cand))
    })
}

/// Reference labels with their token-sorted form computed once, shared
/// read-only across every classification call.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    candidates: Vec<(String, Vec<char>)>,
}

impl FuzzyMatcher {
    pub fn new(index: &ReferenceIndex) -> Self {
        Self {
            candidates: index
                .iter()
                .map(|label| (label.to_string(), token_sort_key(label).chars().collect()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn best_match(&self, query: &str) -> BestMatch<'_> {
        let key: Vec<char> = token_sort_key(query).chars().collect();
        if key.is_empty() {
            return BestMatch::NONE;
        }
        self.candidates
            .iter()
            .fold(BestMatch::NONE, |best, (label, cand)| {
                best.offer(label.as_str(), ratio_chars(&key, cand))
            })
    }
}
