//! Order-preserving selection over slices.

/// Returns a new vector containing only the elements for which `predicate` returns `true`.
///
/// Elements keep their original relative order. The predicate is called exactly once per element,
/// in index order, whatever it returns. An empty input (or no match) yields an empty vector.
///
/// ```rust
/// use higher_order_functions::processing::filter;
///
/// let kept = filter(&[1, 5, -1, 0, -2], |i| *i >= 0);
/// assert_eq!(kept, vec![1, 5, 0]);
/// ```
pub fn filter<T, F>(items: &[T], mut predicate: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    let mut out = Vec::new();
    for item in items {
        if predicate(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Like [`filter`], but `predicate` may fail.
///
/// The first `Err` is returned as-is and no later element is visited.
pub fn try_filter<T, E, F>(items: &[T], mut predicate: F) -> Result<Vec<T>, E>
where
    T: Clone,
    F: FnMut(&T) -> Result<bool, E>,
{
    let mut out = Vec::new();
    for item in items {
        if predicate(item)? {
            out.push(item.clone());
        }
    }
    Ok(out)
}
