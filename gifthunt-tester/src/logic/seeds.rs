use anyhow::{Result, bail};

/// Seed used when the command line names none.
pub const DEFAULT_SEED: u64 = 1337;

/// Resolve CLI seed arguments into a deduplicated list of numeric seeds.
///
/// Negative integers use their magnitude. Order of first appearance is kept.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        let seed = if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_signed_and_large_seeds() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "18446744073709551615"])).unwrap();
        assert_eq!(seeds, vec![42, 7, u64::MAX]);
    }

    #[test]
    fn duplicates_collapse_in_order() {
        let seeds = resolve_seed_inputs(&tokens(&["9", "3", "-9", "3"])).unwrap();
        assert_eq!(seeds, vec![9, 3]);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
        assert_eq!(resolve_seed_inputs(&tokens(&[""])).unwrap(), vec![DEFAULT_SEED]);
    }

    #[test]
    fn words_are_rejected() {
        let err = resolve_seed_inputs(&tokens(&["birthday"])).unwrap_err();
        assert!(err.to_string().contains("birthday"));
    }
}
