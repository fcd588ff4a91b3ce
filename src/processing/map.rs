//! Element-wise transformation over slices.

/// Returns a new vector holding `transform(&items[i])` at every position `i`.
///
/// The output is allocated up front with the input's length and may use a different element type.
pub fn map<T, M, F>(items: &[T], mut transform: F) -> Vec<M>
where
    F: FnMut(&T) -> M,
{
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(transform(item));
    }
    out
}

/// Like [`map`], but `transform` may fail.
///
/// The first `Err` is returned as-is; the partially built output is dropped.
pub fn try_map<T, M, E, F>(items: &[T], mut transform: F) -> Result<Vec<M>, E>
where
    F: FnMut(&T) -> Result<M, E>,
{
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(transform(item)?);
    }
    Ok(out)
}
