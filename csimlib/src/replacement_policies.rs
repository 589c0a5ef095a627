use crate::cache::Line;

/// A generic trait for replacement policies. Used to parameterise a Cache.
///
/// Policies only see the lines of the set being accessed, any bookkeeping they need must be kept
/// in the lines themselves
pub trait ReplacementPolicy {
    /// Updates the policy when a line in the set is used, either by a hit or by a new tag being
    /// installed
    ///
    /// # Arguments
    ///
    /// * `set`: The lines of the set being accessed
    /// * `index`: The index within the set of the line which was used
    ///
    /// returns: ()
    fn update_on_use(&mut self, set: &mut [Line], index: usize);

    /// Used by the cache to pick the line to (re)load on a miss
    ///
    /// Invalid lines are not treated specially, the policy has to ensure they are picked before
    /// any valid line is displaced
    ///
    /// # Arguments
    ///
    /// * `set`: The lines of the set being accessed, never empty
    ///
    /// returns: usize, the index of the victim within the set
    fn get_victim(&mut self, set: &[Line]) -> usize;
}

/// Least Recently Used replacement policy
///
/// Every line carries a logical recency counter which only has meaning within its own set. A used
/// line is stamped with one more than the newest counter in the set, and the victim is the line
/// with the oldest counter. Lines start at 0, so empty lines are always used up first
#[derive(Debug, Default, Copy, Clone)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn update_on_use(&mut self, set: &mut [Line], index: usize) {
        let newest = set.iter().map(|line| line.recency).max().unwrap_or(0);
        // u64 per set is never exhausted by a real trace, saturate rather than wrap
        set[index].recency = newest.saturating_add(1);
    }

    fn get_victim(&mut self, set: &[Line]) -> usize {
        // Strict comparison, the lowest index wins a tie
        let mut index = 0;
        let mut min_value = u64::MAX;
        let mut min_index = 0;
        while index < set.len() {
            if set[index].recency < min_value {
                min_value = set[index].recency;
                min_index = index;
            }
            index += 1;
        }
        min_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(recency: u64) -> Line {
        Line { valid: true, tag: 0, recency }
    }

    #[test]
    fn victim_is_oldest() {
        let set = [line(3), line(1), line(2)];
        assert_eq!(LeastRecentlyUsed.get_victim(&set), 1);
    }

    #[test]
    fn victim_ties_go_to_lowest_index() {
        let set = [line(2), line(1), line(1), line(5)];
        assert_eq!(LeastRecentlyUsed.get_victim(&set), 1);
        assert_eq!(LeastRecentlyUsed.get_victim(&[Line::default(); 4]), 0);
    }

    #[test]
    fn use_stamps_newest() {
        let mut set = [line(3), line(7), line(2)];
        LeastRecentlyUsed.update_on_use(&mut set, 2);
        assert_eq!(set[2].recency, 8);
        // Refreshing the newest line still moves it forward
        LeastRecentlyUsed.update_on_use(&mut set, 2);
        assert_eq!(set[2].recency, 9);
        assert_eq!(set[0].recency, 3);
        assert_eq!(set[1].recency, 7);
    }

    #[test]
    fn recency_saturates() {
        let mut set = [line(u64::MAX), line(0)];
        LeastRecentlyUsed.update_on_use(&mut set, 1);
        assert_eq!(set[1].recency, u64::MAX);
    }
}
