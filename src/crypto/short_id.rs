use rand::{distributions::Alphanumeric, Rng};

/// Produces candidate short ids. Uniqueness is not its concern: the mapping
/// store rejects duplicates and the caller retries.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws ids uniformly from `[A-Za-z0-9]`.
#[derive(Clone, Debug)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Whether `candidate` could have been produced by a generator: non-empty,
/// ASCII alphanumeric and at most `max_len` long.
pub fn is_well_formed(candidate: &str, max_len: usize) -> bool {
    !candidate.is_empty()
        && candidate.len() <= max_len
        && candidate.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_requested_length_from_alphanumerics() {
        let generator = RandomIdGenerator::new(7);
        for _ in 0..200 {
            let id = generator.generate();
            assert_eq!(id.len(), 7);
            assert!(is_well_formed(&id, 7));
        }
    }

    #[test]
    fn ids_are_spread_out() {
        let generator = RandomIdGenerator::new(8);
        let ids: HashSet<String> = (0..1_000).map(|_| generator.generate()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn rejects_ids_no_generator_could_emit() {
        assert!(!is_well_formed("", 32));
        assert!(!is_well_formed("abc-def", 32));
        assert!(!is_well_formed("favicon.ico", 32));
        assert!(!is_well_formed(&"a".repeat(33), 32));
        assert!(is_well_formed("Zz09", 32));
    }
}
