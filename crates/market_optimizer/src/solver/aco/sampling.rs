use rand::Rng;

/// Picks an index with probability proportional to its weight (roulette wheel).
///
/// Non-finite or negative weights count as zero, except `+inf`: when some
/// weights are infinite the choice is uniform among those. When every weight
/// is zero the choice is uniform over all indices. Returns `None` for an
/// empty slice.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let infinite = weights
        .iter()
        .filter(|&&weight| weight == f64::INFINITY)
        .count();
    if infinite > 0 {
        let nth = rng.random_range(0..infinite);
        return weights
            .iter()
            .enumerate()
            .filter(|&(_, &weight)| weight == f64::INFINITY)
            .nth(nth)
            .map(|(index, _)| index);
    }

    let sanitized = |weight: f64| if weight > 0.0 { weight } else { 0.0 };
    let total: f64 = weights.iter().map(|&weight| sanitized(weight)).sum();

    if !(total > 0.0) || !total.is_finite() {
        return Some(rng.random_range(0..weights.len()));
    }

    let mut roll = rng.random_range(0.0..total);
    let mut last_positive = 0;
    for (index, &weight) in weights.iter().enumerate() {
        let weight = sanitized(weight);
        if weight <= 0.0 {
            continue;
        }

        if roll < weight {
            return Some(index);
        }
        roll -= weight;
        last_positive = index;
    }

    // Rounding can leave a tiny remainder after the last slot.
    Some(last_positive)
}
