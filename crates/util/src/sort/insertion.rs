/// Stable in-place insertion sort on an extracted key.
///
/// Diff lists are short and usually almost sorted already, where insertion
/// sort runs in close to linear time. Each element is moved back past every
/// element with a strictly greater key, so equal keys keep their input order.
///
/// # Examples
///
/// ```
/// use nbdiff_util::sort::insertion_sort_by_key;
///
/// let mut ops = vec![(5, "patch"), (0, "addrange"), (5, "removerange")];
/// insertion_sort_by_key(&mut ops, |op| op.0);
/// assert_eq!(ops, vec![(0, "addrange"), (5, "patch"), (5, "removerange")]);
/// ```
pub fn insertion_sort_by_key<T, K, F>(items: &mut [T], mut key: F)
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    for end in 1..items.len() {
        let moving = key(&items[end]);
        let mut slot = end;
        while slot > 0 && key(&items[slot - 1]) > moving {
            slot -= 1;
        }
        if slot < end {
            items[slot..=end].rotate_right(1);
        }
    }
}
