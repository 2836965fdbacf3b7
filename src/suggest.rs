//! Typo suggestions using Levenshtein distance, and fuzzy name matching
//! using a matching-blocks ratio

/// Calculate the Levenshtein distance between two strings.
/// This measures the minimum number of single-character edits (insertions,
/// deletions, or substitutions) required to change one string into the other.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Two rows instead of the full matrix
    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr_row[0] = i;
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr_row[j] = (prev_row[j] + 1) // deletion
                .min(curr_row[j - 1] + 1) // insertion
                .min(prev_row[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]`, as
/// `(start_in_a, start_in_b, len)`. Ties keep the run that starts first.
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best) = (alo, blo, 0);
    let mut prev = vec![0usize; bhi - blo + 1];
    let mut curr = vec![0usize; bhi - blo + 1];
    for i in alo..ahi {
        for j in blo..bhi {
            let run = if a[i] == b[j] { prev[j - blo] + 1 } else { 0 };
            curr[j - blo + 1] = run;
            if run > best {
                best_i = i + 1 - run;
                best_j = j + 1 - run;
                best = run;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    (best_i, best_j, best)
}

/// Number of characters covered by the matching blocks of `a` and `b`:
/// the longest common run, then recursively the runs left and right of it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![((0, a.len()), (0, b.len()))];
    while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
        let (i, j, len) = longest_match(a, b, (alo, ahi), (blo, bhi));
        if len == 0 {
            continue;
        }
        total += len;
        if alo < i && blo < j {
            pending.push(((alo, i), (blo, j)));
        }
        if i + len < ahi && j + len < bhi {
            pending.push(((i + len, ahi), (j + len, bhi)));
        }
    }
    total
}

/// Similarity ratio in `0.0..=1.0`, where 1.0 means identical.
///
/// Defined as `2 * M / T`, where `T` is the total character count of both
/// strings and `M` the characters covered by their matching blocks. A prefix
/// scores well even against a much longer name: `"yuru"` vs `"yurukastd"` is
/// `8 / 13`.
pub fn match_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Minimum [`match_ratio`] for [`closest_match`] to accept a candidate.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Pick the candidate with the highest [`match_ratio`] against `query`,
/// case-insensitively.
///
/// Returns `None` when no candidate reaches `cutoff`. Ties keep the earliest
/// candidate.
pub fn closest_match<'a>(query: &str, candidates: &[&'a str], cutoff: f64) -> Option<&'a str> {
    let query_lower = query.to_lowercase();

    let mut best: Option<(&'a str, f64)> = None;
    for &candidate in candidates {
        let score = match_ratio(&candidate.to_lowercase(), &query_lower);
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Find suggestions for a typo from a list of valid options.
/// Returns up to 3 matches within `max_distance`, closest first.
pub fn suggest<'a>(query: &str, candidates: &[&'a str], max_distance: usize) -> Vec<&'a str> {
    let query_lower = query.to_lowercase();

    let mut scored: Vec<(&str, usize)> = candidates
        .iter()
        .map(|&candidate| {
            let distance = levenshtein_distance(&query_lower, &candidate.to_lowercase());
            (candidate, distance)
        })
        .filter(|(_, distance)| *distance <= max_distance)
        .collect();

    scored.sort_by_key(|(_, distance)| *distance);

    let mut out: Vec<&'a str> = Vec::with_capacity(3);
    for (candidate, _) in scored {
        if out.len() == 3 {
            break;
        }
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// Format a "did you mean?" suggestion string.
/// Returns None if there are no suggestions.
pub fn format_suggestion(suggestions: &[&str]) -> Option<String> {
    match suggestions.len() {
        0 => None,
        1 => Some(format!("Did you mean '{}'?", suggestions[0])),
        2 => Some(format!("Did you mean '{}' or '{}'?", suggestions[0], suggestions[1])),
        _ => Some(format!(
            "Did you mean '{}', '{}', or '{}'?",
            suggestions[0], suggestions[1], suggestions[2]
        )),
    }
}
