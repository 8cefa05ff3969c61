//! Random human-readable display names.
//!
//! Every connection gets a "First Last" name at registration. Names only need to be
//! unique among the connections that are alive at the same time, so the registry
//! passes a predicate for names already in use and this module falls back to a
//! numeric suffix when random draws keep colliding.

use rand::Rng;
use rand::seq::IndexedRandom;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Andrew", "Anna", "Bohdan", "Carol", "Daniel", "Daria", "David", "Elena",
    "Emily", "Frank", "Grace", "Henry", "Iryna", "Jack", "James", "Julia", "Kateryna",
    "Linda", "Maksym", "Maria", "Mark", "Nina", "Oleh", "Olga", "Paul", "Petro", "Rachel",
    "Robert", "Sarah", "Sofia", "Taras", "Thomas", "Victor", "Yulia",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Bondarenko", "Brown", "Clark", "Davis", "Evans", "Garcia", "Hall",
    "Harris", "Hughes", "Johnson", "Kovalenko", "Kravchenko", "Lewis", "Lysenko",
    "Martin", "Melnyk", "Miller", "Moore", "Parker", "Robinson", "Shevchenko", "Smith",
    "Taylor", "Thompson", "Tkachenko", "Walker", "White", "Wilson", "Young",
];

/// Random draws attempted before a numeric suffix is appended.
const MAX_ATTEMPTS: usize = 8;

/// Draw a random full name.
pub fn random_full_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Anonymous");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Guest");
    format!("{first} {last}")
}

/// Draw a name for which `taken` returns `false`.
///
/// After `MAX_ATTEMPTS` collisions the last draw gets the smallest free `#n` suffix.
pub fn unique_full_name<R, F>(rng: &mut R, taken: F) -> String
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    let mut name = random_full_name(rng);
    for _ in 1..MAX_ATTEMPTS {
        if !taken(&name) {
            return name;
        }
        name = random_full_name(rng);
    }
    if !taken(&name) {
        return name;
    }
    (2..)
        .map(|n| format!("{name} #{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn full_name_has_two_parts() {
        let name = random_full_name(&mut rand::rng());
        let parts: Vec<&str> = name.split(' ').collect();
        assert_eq!(parts.len(), 2);
        assert!(FIRST_NAMES.contains(&parts[0]));
        assert!(LAST_NAMES.contains(&parts[1]));
    }

    #[test]
    fn avoids_taken_names() {
        let mut rng = rand::rng();
        let mut taken = HashSet::new();
        for _ in 0..200 {
            let name = unique_full_name(&mut rng, |n| taken.contains(n));
            assert!(taken.insert(name));
        }
    }

    #[test]
    fn falls_back_to_suffix_when_every_draw_collides() {
        let mut rng = rand::rng();
        let name = unique_full_name(&mut rng, |n| !n.ends_with(" #3"));
        assert!(name.ends_with(" #3"), "got {name}");
    }
}
