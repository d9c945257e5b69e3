//! Determinism checks.
//!
//! Runs an output-producing closure several times and compares BLAKE3
//! hashes of the bytes it returns.

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// BLAKE3 hash of the first run.
    pub hash: String,
    /// Index of the first run whose hash differed.
    pub first_mismatch: Option<usize>,
}

/// Runs `generate` `runs` times and compares the hashes of its output.
pub fn verify_determinism<F>(mut generate: F, runs: usize) -> DeterminismResult
where
    F: FnMut() -> Vec<u8>,
{
    let runs = runs.max(2);
    let first = blake3::hash(&generate()).to_hex().to_string();
    let first_mismatch = (1..runs).find(|_| blake3::hash(&generate()).to_hex().as_str() != first);

    DeterminismResult {
        is_deterministic: first_mismatch.is_none(),
        runs,
        hash: first,
        first_mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_nondeterminism() {
        let mut counter = 0u8;
        let result = verify_determinism(
            || {
                counter += 1;
                vec![counter]
            },
            3,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.first_mismatch, Some(1));
    }

    #[test]
    fn test_stable_output() {
        let result = verify_determinism(|| b"bdsket".to_vec(), 3);
        assert!(result.is_deterministic);
        assert_eq!(result.runs, 3);
        assert_eq!(result.hash.len(), 64);
    }
}
