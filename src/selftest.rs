//! Randomized self-test of the permutation group laws.
//!
//! Draws random permutations from a seeded generator and checks each one against the laws a
//! permutation group satisfies, most importantly that fast exponentiation agrees with repeated
//! composition. The first failing check ends the run with an error naming the permutation.
use std::env;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::error::PermError;
use crate::perm::Perm;
use crate::El;

/// Degree of the permutations drawn when not configured.
pub const DEFAULT_DEGREE: usize = 100;
/// Number of permutations checked when not configured.
pub const DEFAULT_ROUNDS: usize = 100;
/// Exclusive bound of the exponents checked when not configured.
pub const DEFAULT_MAX_EXPONENT: usize = 100;

// Checks made by `check_perm` for each permutation.
const CHECKS_PER_ROUND: usize = 7;

/// Settings of a self-test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestConfig {
    /// Degree of the permutations drawn.
    pub degree: usize,
    /// Number of permutations to check.
    pub rounds: usize,
    /// Exponents are taken from `0..max_exponent`, round `i` using `i % max_exponent`.
    pub max_exponent: usize,
    /// Seed of the generator. A fresh seed is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        SelfTestConfig {
            degree: DEFAULT_DEGREE,
            rounds: DEFAULT_ROUNDS,
            max_exponent: DEFAULT_MAX_EXPONENT,
            seed: None,
        }
    }
}

impl SelfTestConfig {
    /// The default configuration, overridden by `PERMCYCLE_DEGREE`, `PERMCYCLE_ROUNDS`,
    /// `PERMCYCLE_MAX_EXPONENT` and `PERMCYCLE_SEED` where set.
    pub fn from_env() -> Result<Self, SelfTestError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars<F>(lookup: F) -> Result<Self, SelfTestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SelfTestConfig::default();

        if let Some(degree) = parse_var(&lookup, "PERMCYCLE_DEGREE")? {
            config.degree = degree;
        }
        if let Some(rounds) = parse_var(&lookup, "PERMCYCLE_ROUNDS")? {
            config.rounds = rounds;
        }
        if let Some(max_exponent) = parse_var(&lookup, "PERMCYCLE_MAX_EXPONENT")? {
            if max_exponent == 0 {
                return Err(SelfTestError::Config {
                    key: "PERMCYCLE_MAX_EXPONENT",
                    value: "0".to_string(),
                });
            }
            config.max_exponent = max_exponent;
        }
        config.seed = parse_var(&lookup, "PERMCYCLE_SEED")?;

        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, SelfTestError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(SelfTestError::Config { key, value }),
        },
    }
}

/// Failures of a self-test run.
#[derive(Debug, Error)]
pub enum SelfTestError {
    /// An environment variable holds an unusable value.
    #[error("invalid value {value:?} for {key}")]
    Config { key: &'static str, value: String },
    /// Fast exponentiation disagrees with repeated composition.
    #[error("power {exponent} of {perm:?} differs from repeated composition")]
    PowerMismatch { perm: Perm, exponent: usize },
    /// A group law fails for a permutation.
    #[error("{law} does not hold for {perm:?}")]
    LawViolated { law: &'static str, perm: Perm },
    /// A permutation operation failed.
    #[error(transparent)]
    Perm(#[from] PermError),
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Seed the generator was started from, configured or drawn.
    pub seed: u64,
    /// Number of permutations checked.
    pub rounds: usize,
    /// Number of checks that passed.
    pub checks: usize,
}

fn law(holds: bool, law: &'static str, perm: &Perm) -> Result<(), SelfTestError> {
    if holds {
        Ok(())
    } else {
        Err(SelfTestError::LawViolated {
            law,
            perm: perm.clone(),
        })
    }
}

fn check_bijection(perm: &Perm) -> bool {
    let mut images = perm.images().to_vec();
    images.sort_unstable();
    images.into_iter().eq(1..=perm.degree() as El)
}

fn check_cycles(perm: &Perm) -> bool {
    let mut seen = vec![false; perm.degree()];
    for cycle in perm.cycle_set() {
        for (i, &point) in cycle.iter().enumerate() {
            let slot = &mut seen[point as usize - 1];
            if *slot || perm[point] != cycle[(i + 1) % cycle.len()] {
                return false;
            }
            *slot = true;
        }
    }
    seen.into_iter().all(|s| s)
}

fn check_perm<R>(perm: &Perm, exponent: usize, rng: &mut R) -> Result<usize, SelfTestError>
where
    R: Rng + ?Sized,
{
    let id = Perm::identity(perm.degree());

    law(check_bijection(perm), "bijection", perm)?;
    law(perm.clone() == *perm, "reflexivity", perm)?;
    law(
        perm.compose(&id)? == *perm && id.compose(perm)? == *perm,
        "identity",
        perm,
    )?;

    let b = Perm::random(perm.degree(), rng);
    let c = Perm::random(perm.degree(), rng);
    law(
        perm.compose(&b)?.compose(&c)? == perm.compose(&b.compose(&c)?)?,
        "associativity",
        perm,
    )?;
    law(
        perm.compose(&perm.inverse())?.is_identity(),
        "inverse",
        perm,
    )?;
    law(check_cycles(perm), "cycle decomposition", perm)?;

    if perm.pow(exponent) != perm.dumb_pow(exponent) {
        return Err(SelfTestError::PowerMismatch {
            perm: perm.clone(),
            exponent,
        });
    }

    Ok(CHECKS_PER_ROUND)
}

/// Run the self-test.
#[instrument(skip_all, fields(degree = config.degree, rounds = config.rounds))]
pub fn run(config: &SelfTestConfig) -> Result<Report, SelfTestError> {
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, "starting self-test");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut checks = 0;

    for round in 0..config.rounds {
        let perm = Perm::random(config.degree, &mut rng);
        let exponent = round.checked_rem(config.max_exponent).unwrap_or(0);
        debug!(round, exponent, %perm, "checking permutation");
        checks += check_perm(&perm, exponent, &mut rng)?;
    }

    info!(checks, "self-test passed");

    Ok(Report {
        seed,
        rounds: config.rounds,
        checks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn config_defaults() {
        let config = SelfTestConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, SelfTestConfig::default());
        assert_eq!(config.degree, 100);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn config_overrides() {
        let config = SelfTestConfig::from_vars(vars(&[
            ("PERMCYCLE_DEGREE", "12"),
            ("PERMCYCLE_ROUNDS", " 3 "),
            ("PERMCYCLE_MAX_EXPONENT", "7"),
            ("PERMCYCLE_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            SelfTestConfig {
                degree: 12,
                rounds: 3,
                max_exponent: 7,
                seed: Some(42),
            }
        );
    }

    #[test]
    fn config_rejects_garbage() {
        match SelfTestConfig::from_vars(vars(&[("PERMCYCLE_SEED", "abc")])) {
            Err(SelfTestError::Config { key, value }) => {
                assert_eq!(key, "PERMCYCLE_SEED");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(SelfTestConfig::from_vars(vars(&[("PERMCYCLE_MAX_EXPONENT", "0")])).is_err());
    }

    #[test]
    fn seeded_run_passes() {
        let config = SelfTestConfig {
            degree: 20,
            rounds: 30,
            max_exponent: 25,
            seed: Some(7),
        };
        let report = run(&config).unwrap();
        assert_eq!(report.seed, 7);
        assert_eq!(report.rounds, 30);
        assert_eq!(report.checks, 30 * CHECKS_PER_ROUND);
    }

    #[test]
    fn run_on_empty_domain() {
        let config = SelfTestConfig {
            degree: 0,
            rounds: 5,
            max_exponent: 3,
            seed: None,
        };
        assert!(run(&config).is_ok());
    }

    #[test]
    fn bijection_check_compares_image_set() {
        assert!(check_bijection(&Perm::identity(0)));
        assert!(check_bijection(&Perm::from_cycle(4, &[4, 1, 3]).unwrap()));
        assert!(check_bijection(&Perm::random(
            50,
            &mut StdRng::seed_from_u64(3)
        )));
    }

    #[test]
    fn mismatch_names_perm_and_exponent() {
        let perm = Perm::from_cycle(3, &[1, 2]).unwrap();
        let err = SelfTestError::PowerMismatch {
            perm,
            exponent: 5,
        };
        assert_eq!(
            err.to_string(),
            "power 5 of Perm {1: 2, 2: 1, 3: 3} differs from repeated composition"
        );
    }
}
