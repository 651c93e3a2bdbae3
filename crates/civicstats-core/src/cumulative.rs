//! Cumulative Transformer.

/// Replace each count by the sum of itself and every count before it.
pub fn running_totals<I>(counts: I) -> Vec<u64>
where
    I: IntoIterator<Item = u64>,
{
    counts
        .into_iter()
        .scan(0u64, |acc, n| {
            *acc = acc.saturating_add(n);
            Some(*acc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::running_totals;

    #[test]
    fn running_totals_accumulate_in_order() {
        assert_eq!(running_totals([2, 0, 3, 1]), vec![2, 2, 5, 6]);
    }

    #[test]
    fn empty_series_stays_empty() {
        assert!(running_totals(Vec::<u64>::new()).is_empty());
    }

    #[test]
    fn running_totals_never_decrease() {
        let totals = running_totals([0, 4, 0, 0, 7, 1]);
        assert!(totals.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(totals.last().copied(), Some(12));
    }
}
