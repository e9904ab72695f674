use foundation::math::precision::stable_total_cmp_f64;

/// Merge overlapping `[start, end]` intervals. Input must be sorted by start.
///
/// An interval starting strictly before the previous end is absorbed into it;
/// touching intervals stay separate.
pub fn compress_intervals(intervals: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let Some((&first, rest)) = intervals.split_first() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut prev = first;
    for &cur in rest {
        if cur[0] < prev[1] {
            prev[1] = prev[1].max(cur[1]);
        } else {
            out.push(prev);
            prev = cur;
        }
    }
    out.push(prev);
    out
}

/// Sort intervals by start and merge the overlapping ones.
pub fn process_intervals(intervals: impl IntoIterator<Item = [f64; 2]>) -> Vec<[f64; 2]> {
    let mut sorted: Vec<[f64; 2]> = intervals.into_iter().collect();
    sorted.sort_by(|a, b| stable_total_cmp_f64(a[0], b[0]));
    compress_intervals(&sorted)
}

#[cfg(test)]
mod tests {
    use super::{compress_intervals, process_intervals};
    use pretty_assertions::assert_eq;

    #[test]
    fn compresses_overlaps() {
        assert_eq!(compress_intervals(&[[1.0, 5.0], [4.0, 7.0]]), vec![[1.0, 7.0]]);
        assert_eq!(compress_intervals(&[[1.0, 5.0], [2.0, 3.0]]), vec![[1.0, 5.0]]);
        assert_eq!(
            compress_intervals(&[[1.0, 2.0], [2.0, 3.0]]),
            vec![[1.0, 2.0], [2.0, 3.0]]
        );
        assert!(compress_intervals(&[]).is_empty());
    }

    #[test]
    fn processing_sorts_first() {
        let got = process_intervals([[0.6, 0.8], [0.1, 0.2], [0.15, 0.3], [0.7, 0.75]]);
        assert_eq!(got, vec![[0.1, 0.3], [0.6, 0.8]]);
    }
}
