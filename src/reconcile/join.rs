use indexmap::IndexSet;

/// Enter/update/exit partition between the previously committed key set and
/// the incoming frame's key set.
///
/// `entering` and `updating` follow the incoming frame's order; `exiting`
/// follows the previous commit's order. The three sets partition the union of
/// both key sets exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedJoin {
    pub entering: Vec<String>,
    pub updating: Vec<String>,
    pub exiting: Vec<String>,
}

impl KeyedJoin {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.entering.is_empty() && self.updating.is_empty() && self.exiting.is_empty()
    }
}

#[must_use]
pub fn partition_keys(previous: &IndexSet<String>, current: &IndexSet<String>) -> KeyedJoin {
    KeyedJoin {
        entering: current.difference(previous).cloned().collect(),
        updating: current.intersection(previous).cloned().collect(),
        exiting: previous.difference(current).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> IndexSet<String> {
        items.iter().map(|item| (*item).to_owned()).collect()
    }

    #[test]
    fn partitions_shared_and_disjoint_keys() {
        let join = partition_keys(&keys(&["a", "b", "c"]), &keys(&["b", "c", "d"]));
        assert_eq!(join.entering, vec!["d"]);
        assert_eq!(join.updating, vec!["b", "c"]);
        assert_eq!(join.exiting, vec!["a"]);
    }

    #[test]
    fn empty_previous_set_enters_everything() {
        let join = partition_keys(&IndexSet::new(), &keys(&["x", "y"]));
        assert_eq!(join.entering, vec!["x", "y"]);
        assert!(join.updating.is_empty());
        assert!(join.exiting.is_empty());
    }

    #[test]
    fn empty_current_set_exits_everything() {
        let join = partition_keys(&keys(&["x", "y"]), &IndexSet::new());
        assert!(join.entering.is_empty());
        assert!(join.updating.is_empty());
        assert_eq!(join.exiting, vec!["x", "y"]);
    }

    #[test]
    fn identical_sets_are_all_updating() {
        let join = partition_keys(&keys(&["a", "b"]), &keys(&["a", "b"]));
        assert!(join.entering.is_empty());
        assert_eq!(join.updating, vec!["a", "b"]);
        assert!(join.exiting.is_empty());
    }

    #[test]
    fn partition_covers_union_without_overlap() {
        let previous = keys(&["a", "b", "c", "d"]);
        let current = keys(&["c", "d", "e"]);
        let join = partition_keys(&previous, &current);

        let mut union: IndexSet<String> = previous.clone();
        union.extend(current.iter().cloned());

        let mut covered = IndexSet::new();
        for key in join
            .entering
            .iter()
            .chain(&join.updating)
            .chain(&join.exiting)
        {
            assert!(covered.insert(key.clone()), "key {key} classified twice");
        }
        assert_eq!(covered.len(), union.len());
    }
}
