use sha2::{Digest, Sha256};

/// Suffix alphabet, enumerated in this exact order: the answer for a
/// degenerate challenge with several matching suffixes is the first one
/// found, and that must be stable across runs.
const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Brute-force the two-character suffix whose SHA-256 digest, appended
/// to `base`, matches `target_hash` (lowercase hex).
///
/// Returns the suffix only, not the full preimage. A well-formed
/// challenge always has an answer in the keyspace; if none matches, the
/// search exhausts and returns an empty string rather than erroring, and
/// the submission fails downstream the same way a wrong answer would.
pub fn solve(base: &str, target_hash: &str) -> String {
    let mut candidate = String::with_capacity(base.len() + 2);
    for c1 in ALPHABET.chars() {
        for c2 in ALPHABET.chars() {
            candidate.clear();
            candidate.push_str(base);
            candidate.push(c1);
            candidate.push(c2);

            let digest = Sha256::digest(candidate.as_bytes());
            if format!("{:x}", digest) == target_hash {
                let mut answer = String::with_capacity(2);
                answer.push(c1);
                answer.push(c2);
                return answer;
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_sha256(input: &str) -> String {
        format!("{:x}", Sha256::digest(input.as_bytes()))
    }

    #[test]
    fn recovers_a_known_suffix() {
        let base = "ZsoVDXK):9z^";
        let target = hex_sha256(&format!("{}fW", base));
        assert_eq!(solve(base, &target), "fW");
    }

    #[test]
    fn recovers_suffixes_across_the_alphabet() {
        for suffix in ["aa", "zA", "Z9", "09"] {
            let target = hex_sha256(&format!("base-{}", suffix));
            assert_eq!(solve("base-", &target), suffix, "suffix {}", suffix);
        }
    }

    #[test]
    fn exhausted_keyspace_yields_empty_string() {
        // Digest of a three-character suffix: unreachable in two.
        let target = hex_sha256("base-!!!");
        assert_eq!(solve("base-", &target), "");
    }

    #[test]
    fn garbage_target_yields_empty_string() {
        assert_eq!(solve("base", "not-a-hex-digest"), "");
    }
}
