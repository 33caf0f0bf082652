/// One ranked candidate along either axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub id: T,
    pub score: f64,
}

/// Order candidates by score descending with a deterministic name tie-break.
///
/// Scores are first sorted exactly; then every run of neighbours whose scores differ by at
/// most `epsilon` is reordered by name ascending (byte-wise, locale independent). Names are
/// assumed unique.
pub fn rank<'a, T, I>(candidates: I, epsilon: f64) -> Vec<Ranked<T>>
where
    I: IntoIterator<Item = (T, &'a str, f64)>,
{
    let mut items: Vec<(T, &'a str, f64)> = candidates.into_iter().collect();
    items.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.1.cmp(b.1)));

    let mut start = 0;
    for i in 1..=items.len() {
        let run_ends = i == items.len() || items[i - 1].2 - items[i].2 > epsilon;
        if run_ends {
            if i - start > 1 {
                items[start..i].sort_by(|a, b| a.1.cmp(b.1));
            }
            start = i;
        }
    }

    items
        .into_iter()
        .map(|(id, _, score)| Ranked { id, score })
        .collect()
}

/// Rank and keep the first `n` (or all, when fewer exist).
pub fn top_n<'a, T, I>(candidates: I, n: usize, epsilon: f64) -> Vec<Ranked<T>>
where
    I: IntoIterator<Item = (T, &'a str, f64)>,
{
    let mut ranked = rank(candidates, epsilon);
    ranked.truncate(n);
    ranked
}
