//! Left folds over slices.

/// Folds `items` left-to-right into a single value, starting from `seed`.
///
/// `combine` runs exactly once per element, first to last; it need not be commutative or
/// associative. An empty slice returns `seed` unchanged.
pub fn reduce<T, M, F>(items: &[T], seed: M, mut combine: F) -> M
where
    F: FnMut(M, &T) -> M,
{
    let mut acc = seed;
    for item in items {
        acc = combine(acc, item);
    }
    acc
}

/// Like [`reduce`], but `combine` may fail.
///
/// The first `Err` is returned as-is and the intermediate accumulator is dropped.
pub fn try_reduce<T, M, E, F>(items: &[T], seed: M, mut combine: F) -> Result<M, E>
where
    F: FnMut(M, &T) -> Result<M, E>,
{
    let mut acc = seed;
    for item in items {
        acc = combine(acc, item)?;
    }
    Ok(acc)
}
