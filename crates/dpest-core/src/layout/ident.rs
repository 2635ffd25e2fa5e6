//! Width-bounded unique identifier allocation for template markers.

use std::collections::BTreeSet;

/// Allocates a unique identifier of exactly `max_len` characters for `name`
/// and records it in `used`.
///
/// The seed is the first three characters of the trimmed name, truncated to
/// `max_len` and right-padded with `fill` (cultivar/ecotype callers pad with
/// a letter, species callers with a dash). Collisions are resolved by
/// substituting the tail with an increasing counter, shrinking the base as
/// far as empty so the total length stays `max_len`; only once the counter
/// string itself outgrows `max_len` does the result exceed it, which keeps
/// allocation total for any number of names.
pub fn allocate(name: &str, max_len: usize, fill: char, used: &mut BTreeSet<String>) -> String {
    let mut base: String = name.trim().chars().take(3).collect();
    if base.chars().count() > max_len {
        base = base.chars().take(max_len).collect();
    }
    while base.chars().count() < max_len {
        base.push(fill);
    }

    let mut candidate = base.clone();
    let mut counter: u64 = 0;
    while used.contains(&candidate) {
        let suffix = counter.to_string();
        let keep = max_len.saturating_sub(suffix.chars().count());
        candidate = base.chars().take(keep).collect::<String>() + &suffix;
        counter += 1;
    }

    used.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::allocate;
    use std::collections::BTreeSet;

    #[test]
    fn short_names_are_padded_to_the_full_width() {
        let mut used = BTreeSet::new();
        assert_eq!(allocate("h", 4, '-', &mut used), "h---");
        assert_eq!(allocate("Fac", 5, '-', &mut used), "Fac--");
    }

    #[test]
    fn long_names_are_cut_to_three_then_to_the_width() {
        let mut used = BTreeSet::new();
        assert_eq!(allocate("PARMAX", 3, '-', &mut used), "PAR");
        assert_eq!(allocate("XLMAXT_2", 2, '-', &mut used), "XL");
    }

    #[test]
    fn colliding_names_get_counter_substituted_tails() {
        let mut used = BTreeSet::new();
        assert_eq!(allocate("ALPHA1", 3, 'X', &mut used), "ALP");
        assert_eq!(allocate("ALPHA2", 3, 'X', &mut used), "AL0");
        assert_eq!(allocate("ALPHA3", 3, 'X', &mut used), "AL1");
    }

    #[test]
    fn counters_grow_past_the_base_when_the_tail_is_exhausted() {
        let mut used = BTreeSet::new();
        for _ in 0..11 {
            allocate("AB", 2, '-', &mut used);
        }
        // "AB", "A0".."A9" are taken; the next candidate is all counter.
        assert_eq!(allocate("AB", 2, '-', &mut used), "10");
    }

    #[test]
    fn every_allocation_is_unique_and_width_exact() {
        let mut used = BTreeSet::new();
        let mut seen = BTreeSet::new();
        for index in 0..50 {
            let id = allocate("PGERM", 4, '-', &mut used);
            assert!(seen.insert(id.clone()), "duplicate id {id}");
            assert_eq!(id.chars().count(), 4, "id {id} must fill the width");
            let _ = index;
        }
    }
}
