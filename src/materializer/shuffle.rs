use rand::Rng;

/// In-place Fisher–Yates shuffle.
///
/// Walks `i` from the last index down to 1, swapping position `i` with a
/// uniformly drawn `j` in `0..=i`, so every permutation is equally likely.
/// The random source is passed in so callers can seed it.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}
