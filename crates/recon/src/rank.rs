/// Ranks for a source with no rank column: 1-based row position.
pub fn derive_from_order(len: usize) -> Vec<u32> {
    (1..=len as u32).collect()
}

/// Renumber sourced ranks to a contiguous 1..N.
///
/// Order follows the sourced rank; ties keep source row order. Gaps appear
/// whenever the region join drops countries, and some report years publish
/// tied ranks, so this runs for every year that sources its rank.
pub fn compact(sourced: &[u32]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..sourced.len()).collect();
    order.sort_by_key(|&i| (sourced[i], i));

    let mut ranks = vec![0; sourced.len()];
    for (position, &i) in order.iter().enumerate() {
        ranks[i] = position as u32 + 1;
    }
    ranks
}
