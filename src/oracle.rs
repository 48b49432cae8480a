//! Factoring-oracle adapter: the contract for the external collaborator
//! that supplies factor lists, plus the worklist that certifies its output.

use std::collections::VecDeque;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rayon::prelude::*;

use crate::error::RecoveryError;
use crate::primality::{is_probable_prime, DEFAULT_ROUNDS};

/// An external factoring collaborator.
///
/// Given an integer, return integers whose product is that integer. Entries
/// need not be prime; composites are resubmitted by [`prime_factors`].
/// Returning the input unchanged, or nothing, signals the oracle cannot
/// split it.
pub trait FactorOracle {
    fn factor(&self, n: &BigUint) -> Vec<BigUint>;
}

/// Fully decompose `n` into certified primes using `oracle` for the splits.
///
/// Iterative worklist: pop a pending integer, certify it with the primality
/// oracle, emit primes, resubmit composites. Every oracle answer is checked
/// to multiply back to the value it was asked about; a composite the oracle
/// cannot split surfaces as `FactorizationIncomplete`. The returned primes
/// are sorted and their product equals `n`.
pub fn prime_factors<O: FactorOracle>(
    oracle: &O,
    n: &BigUint,
) -> Result<Vec<BigUint>, RecoveryError> {
    let one = BigUint::one();
    if *n <= one {
        return Err(RecoveryError::InvalidArgument(format!(
            "nothing to factor: {}",
            n
        )));
    }

    let mut primes: Vec<BigUint> = Vec::new();
    let mut pending: VecDeque<BigUint> = VecDeque::from([n.clone()]);

    while let Some(value) = pending.pop_front() {
        if is_probable_prime(&value, DEFAULT_ROUNDS) {
            primes.push(value);
            continue;
        }

        let parts = oracle.factor(&value);
        if parts.is_empty() || parts.iter().any(|p| *p == value) {
            return Err(RecoveryError::FactorizationIncomplete { remaining: value });
        }
        if parts.iter().any(|p| p.is_zero()) {
            return Err(RecoveryError::InvalidArgument(format!(
                "oracle returned zero as a factor of {}",
                value
            )));
        }
        let product: BigUint = parts.iter().product();
        if product != value {
            return Err(RecoveryError::InvalidArgument(format!(
                "oracle output for {} multiplies to {}",
                value, product
            )));
        }
        log::debug!("oracle split {} into {} parts", value, parts.len());

        // Certify the batch in parallel; primes are emitted, composites
        // go back on the worklist
        let (certified, composite): (Vec<BigUint>, Vec<BigUint>) = parts
            .into_par_iter()
            .filter(|p| !p.is_one())
            .partition(|p| is_probable_prime(p, DEFAULT_ROUNDS));
        primes.extend(certified);
        pending.extend(composite);
    }

    primes.sort();
    Ok(primes)
}

/// Reference oracle: bounded trial division.
///
/// Splits off prime factors up to `bound` and leaves the remaining cofactor
/// as a single (possibly composite) entry. Suitable for tests and demos;
/// real recoveries plug in an external tool behind the same trait.
#[derive(Debug, Clone)]
pub struct TrialDivisionOracle {
    pub bound: u64,
}

impl Default for TrialDivisionOracle {
    fn default() -> Self {
        TrialDivisionOracle { bound: 1_000_000 }
    }
}

impl FactorOracle for TrialDivisionOracle {
    fn factor(&self, n: &BigUint) -> Vec<BigUint> {
        let mut factors = Vec::new();
        let mut remaining = n.clone();
        let two = BigUint::from(2u32);

        while remaining.is_even() && !remaining.is_zero() {
            factors.push(two.clone());
            remaining >>= 1u32;
        }

        let mut divisor = 3u64;
        while divisor <= self.bound
            && BigUint::from(divisor) * BigUint::from(divisor) <= remaining
        {
            let big_divisor = BigUint::from(divisor);
            while (&remaining % &big_divisor).is_zero() {
                factors.push(big_divisor.clone());
                remaining /= &big_divisor;
            }
            divisor += 2;
        }

        if remaining > BigUint::one() {
            factors.push(remaining);
        }

        factors
    }
}
