use crate::core::constants::IMPORTANCE_RANGE;
use crate::prelude::HashMap;
use crate::quest::{QuestId, QuestType};
use std::sync::Arc;

/// Draw order of quest types, derived from the ordered list of visible quest types.
///
/// The first type in the list has rank 0 and is drawn on top. Every rank owns a
/// band of `importance_range / T` importance values, so pins of a higher ranked
/// type always outrank all pins of a lower ranked one.
#[derive(Debug, Clone)]
pub struct QuestTypeOrder {
    ranks: HashMap<String, usize>,
    names: Vec<String>,
    importance_range: i64,
}

impl QuestTypeOrder {
    pub fn new(importance_range: i64) -> Self {
        Self {
            ranks: HashMap::default(),
            names: Vec::new(),
            importance_range,
        }
    }

    pub fn from_types(types: &[Arc<dyn QuestType>]) -> Self {
        Self::from_types_with_range(types, IMPORTANCE_RANGE)
    }

    pub fn from_types_with_range(types: &[Arc<dyn QuestType>], importance_range: i64) -> Self {
        Self::from_names(types.iter().map(|t| t.name()), importance_range)
    }

    /// Duplicate names keep the rank of their first occurrence
    pub fn from_names<'a, I>(names: I, importance_range: i64) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut order = Self::new(importance_range);
        for name in names {
            if !order.ranks.contains_key(name) {
                order.ranks.insert(name.to_string(), order.names.len());
                order.names.push(name.to_string());
            }
        }
        order
    }

    /// Number of distinct quest types
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Rank of a quest type; unknown types share the top rank
    pub fn rank_of(&self, type_name: &str) -> usize {
        self.ranks.get(type_name).copied().unwrap_or(0)
    }

    /// Quest type names in draw order, as passed to the quest store
    pub fn type_names(&self) -> &[String] {
        &self.names
    }

    /// Importance values available to each quest type
    pub fn band(&self) -> i64 {
        let types = self.names.len().max(1) as i64;
        (self.importance_range / types).max(1)
    }

    /// Returns values up to `importance_range`, the higher the number, the more important.
    ///
    /// The quest id spreads quests of the same type within the band of their
    /// type so that their order stays the same between refreshes.
    pub fn importance(&self, type_name: &str, id: QuestId) -> i64 {
        let band = self.band();
        let rank = self.rank_of(type_name) as i64;
        self.importance_range - rank * band + id.rem_euclid(band)
    }
}

impl Default for QuestTypeOrder {
    fn default() -> Self {
        Self::new(IMPORTANCE_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_of(count: usize) -> QuestTypeOrder {
        let names: Vec<String> = (0..count).map(|i| format!("Type{i}")).collect();
        QuestTypeOrder::from_names(names.iter().map(String::as_str), IMPORTANCE_RANGE)
    }

    #[test]
    fn test_importance_example() {
        let order = order_of(5);
        assert_eq!(order.band(), 20_000);
        assert_eq!(order.importance("Type2", 37), 60_037);
    }

    #[test]
    fn test_higher_rank_always_wins() {
        let order = order_of(7);
        let band = order.band();
        let ids = [0, 1, 37, band - 1, band, 123_456_789, -1, i64::MIN, i64::MAX];

        for rank in 1..order.len() {
            let higher = format!("Type{}", rank - 1);
            let lower = format!("Type{rank}");
            let weakest_higher = ids
                .iter()
                .map(|id| order.importance(&higher, *id))
                .min()
                .unwrap();
            let strongest_lower = ids
                .iter()
                .map(|id| order.importance(&lower, *id))
                .max()
                .unwrap();
            assert!(weakest_higher > strongest_lower);
        }
    }

    #[test]
    fn test_importance_is_stable() {
        let order = order_of(3);
        assert_eq!(order.importance("Type1", 4242), order.importance("Type1", 4242));
        assert_eq!(
            order_of(3).importance("Type1", 4242),
            order.importance("Type1", 4242)
        );
    }

    #[test]
    fn test_negative_ids_stay_in_band() {
        let order = order_of(4);
        let importance = order.importance("Type3", -5);
        assert_eq!(importance, 100_000 - 3 * 25_000 + 24_995);
    }

    #[test]
    fn test_duplicates_keep_first_rank() {
        let order = QuestTypeOrder::from_names(["A", "B", "A", "C"], IMPORTANCE_RANGE);
        assert_eq!(order.len(), 3);
        assert_eq!(order.rank_of("A"), 0);
        assert_eq!(order.rank_of("C"), 2);
        assert_eq!(order.type_names(), ["A", "B", "C"]);
    }

    #[test]
    fn test_largest_range_does_not_overflow() {
        use crate::core::constants::MAX_IMPORTANCE_RANGE;

        let order = QuestTypeOrder::from_names(["A"], MAX_IMPORTANCE_RANGE);
        let top = order.importance("A", MAX_IMPORTANCE_RANGE - 1);
        assert_eq!(top, 2 * MAX_IMPORTANCE_RANGE - 1);
        assert!(order.importance("A", i64::MIN) >= MAX_IMPORTANCE_RANGE);
    }

    #[test]
    fn test_unknown_type_and_empty_order() {
        let order = QuestTypeOrder::default();
        assert!(order.is_empty());
        assert_eq!(order.rank_of("Anything"), 0);
        assert_eq!(order.importance("Anything", 42), 100_042);
    }
}
