use rand::{Rng, seq::SliceRandom};

/// Uniform Fisher-Yates permutation driven entirely by `rng`.
pub fn shuffle<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}

pub fn pick_one_of<'a, T, R: Rng + ?Sized>(duplicates: &'a [T], rng: &mut R) -> Option<&'a T> {
    duplicates.choose(rng)
}
