use confluence_types::Interval;

/// Pick the interval to request from an exchange that natively serves `supported`.
///
/// - Exact support: pass-through.
/// - Otherwise the finest supported interval coarser than `requested` (e.g. `1s` → `1m`
///   on exchanges without second bars).
/// - If nothing coarser exists, the coarsest supported interval.
/// - An empty `supported` list means "unknown"; `requested` is passed through.
#[must_use]
pub fn choose_effective_interval(supported: &[Interval], requested: Interval) -> Interval {
    if supported.is_empty() || supported.contains(&requested) {
        return requested;
    }
    supported
        .iter()
        .copied()
        .filter(|iv| iv.seconds() > requested.seconds())
        .min_by_key(|iv| iv.seconds())
        .or_else(|| supported.iter().copied().max_by_key(|iv| iv.seconds()))
        .unwrap_or(requested)
}
