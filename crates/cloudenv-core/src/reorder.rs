//! Ordered merge of user-declared keys with server-returned records
//!
//! The control plane returns list fields (node groups, zones, tags, ...) in
//! its own order. Users care about the order they wrote. [`reorder`] puts the
//! server records back into the user's order and appends anything the user
//! did not mention, so nothing the server knows about is lost.

/// Reorder `server_items` to follow `user_keys`.
///
/// Every server item whose key appears in `user_keys` is emitted in user
/// order, first unused match wins. Items that no user key claims follow in
/// their original order. User keys without a matching item are dropped.
///
/// # Example
///
/// ```
/// use cloudenv_core::reorder::reorder;
///
/// let user = ["system", "user"];
/// let server = vec!["user", "system", "monitoring"];
/// let merged = reorder(&user, server, |s| *s);
/// assert_eq!(merged, vec!["system", "user", "monitoring"]);
/// ```
pub fn reorder<K, Q, T, F>(user_keys: &[Q], server_items: Vec<T>, key_of: F) -> Vec<T>
where
    K: PartialEq<Q>,
    F: Fn(&T) -> K,
{
    if user_keys.is_empty() || server_items.is_empty() {
        return server_items;
    }

    let keys: Vec<K> = server_items.iter().map(&key_of).collect();
    let mut slots: Vec<Option<T>> = server_items.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(slots.len());

    for wanted in user_keys {
        let hit = keys
            .iter()
            .zip(slots.iter())
            .position(|(key, slot)| slot.is_some() && key == wanted);

        if let Some(item) = hit.and_then(|idx| slots[idx].take()) {
            merged.push(item);
        }
    }

    merged.extend(slots.into_iter().flatten());
    merged
}

/// Reorder a plain list of names (zones, locations, reservations).
pub fn reorder_names(user: &[String], server: Vec<String>) -> Vec<String> {
    reorder(user, server, |name| name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct NodeGroup {
        node_type: &'static str,
        capacity: u32,
    }

    fn group(node_type: &'static str, capacity: u32) -> NodeGroup {
        NodeGroup {
            node_type,
            capacity,
        }
    }

    fn types(groups: &[NodeGroup]) -> Vec<&'static str> {
        groups.iter().map(|g| g.node_type).collect()
    }

    #[test]
    fn test_user_order_then_server_extras() {
        let server = vec![group("user", 2), group("system", 1), group("monitoring", 1)];
        let merged = reorder(&["system", "user"], server, |g| g.node_type);

        assert_eq!(types(&merged), vec!["system", "user", "monitoring"]);
        assert_eq!(merged[1].capacity, 2);
    }

    #[test]
    fn test_empty_user_keys_keep_server_order() {
        let server = vec![group("system", 1), group("user", 3)];
        let user: [&str; 0] = [];
        let merged = reorder(&user, server.clone(), |g| g.node_type);

        assert_eq!(merged, server);
    }

    #[test]
    fn test_empty_server_items_yield_nothing() {
        let merged = reorder(&["system", "user"], Vec::new(), |g: &NodeGroup| g.node_type);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_unknown_user_keys_are_dropped() {
        let server = vec![group("system", 1)];
        let merged = reorder(&["gpu", "system", "arm"], server, |g| g.node_type);

        assert_eq!(types(&merged), vec!["system"]);
    }

    #[test]
    fn test_identical_order_is_unchanged() {
        let server = vec![group("a", 1), group("b", 1), group("c", 1)];
        let merged = reorder(&["a", "b", "c"], server.clone(), |g| g.node_type);

        assert_eq!(merged, server);
    }

    #[test]
    fn test_duplicate_server_keys_first_unused_wins() {
        let server = vec![group("x", 1), group("y", 1), group("x", 2)];

        // One mention claims the first "x"; the second "x" trails as an extra.
        let merged = reorder(&["y", "x"], server.clone(), |g| g.node_type);
        assert_eq!(
            merged,
            vec![group("y", 1), group("x", 1), group("x", 2)]
        );

        // A repeated user key claims the second one in place.
        let merged = reorder(&["x", "y", "x"], server, |g| g.node_type);
        assert_eq!(
            merged,
            vec![group("x", 1), group("y", 1), group("x", 2)]
        );
    }

    #[test]
    fn test_every_item_appears_exactly_once() {
        let server: Vec<u32> = vec![5, 3, 9, 3, 1, 7];
        let user = [9u32, 3, 42, 3, 3, 5];
        let merged = reorder(&user, server.clone(), |n| *n);

        let mut sorted_in = server.clone();
        let mut sorted_out = merged.clone();
        sorted_in.sort_unstable();
        sorted_out.sort_unstable();
        assert_eq!(sorted_in, sorted_out);

        // matched prefix follows user order, extras keep server order
        assert_eq!(merged, vec![9, 3, 3, 5, 1, 7]);
    }

    #[test]
    fn test_reorder_names() {
        let user = vec!["us-east-1b".to_string(), "us-east-1a".to_string()];
        let server = vec![
            "us-east-1a".to_string(),
            "us-east-1c".to_string(),
            "us-east-1b".to_string(),
        ];

        assert_eq!(
            reorder_names(&user, server),
            vec!["us-east-1b", "us-east-1a", "us-east-1c"]
        );
    }
}
