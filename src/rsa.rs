//! RSA key reconstruction: deriving a private key from a factor set, and
//! recovering the prime factors when the private exponent is known.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Pow, Zero};
use rayon::prelude::*;

use crate::arith::{gcd, mod_inverse, mod_pow};
use crate::error::RecoveryError;
use crate::primality::{is_probable_prime, next_prime, DEFAULT_ROUNDS};

/// Default cap on candidate bases tried by [`recover_primes_from_exponents`].
///
/// Each coprime base exposes a factor with probability >= 1/2, so hitting
/// this cap on a genuine RSA key is vanishingly unlikely.
pub const DEFAULT_MAX_BASES: usize = 100;

/// A private key reconstructed from prime factors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredKey {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub phi: BigUint,
}

/// Derive `(n, phi, d)` from a set of distinct primes and a public exponent.
///
/// Handles the multi-prime case: `n = Π f`, `phi = Π (f - 1)`. The product
/// form of phi is only valid for distinct primes, so repeated factors are
/// rejected, as is any factor that fails the primality oracle.
pub fn factors_to_key(factors: &[BigUint], e: &BigUint) -> Result<RecoveredKey, RecoveryError> {
    if factors.len() < 2 {
        return Err(RecoveryError::InvalidArgument(
            "need at least two prime factors".into(),
        ));
    }
    for i in 0..factors.len() {
        for j in i + 1..factors.len() {
            if factors[i] == factors[j] {
                return Err(RecoveryError::InvalidArgument(format!(
                    "repeated factor {}",
                    factors[i]
                )));
            }
        }
    }
    if let Some(bad) = factors
        .par_iter()
        .find_any(|f| !is_probable_prime(f, DEFAULT_ROUNDS))
    {
        return Err(RecoveryError::InvalidArgument(format!(
            "factor {} is not prime",
            bad
        )));
    }

    let one = BigUint::one();
    let n: BigUint = factors.iter().product();
    let phi: BigUint = factors.iter().map(|f| f - &one).product();
    let d = mod_inverse(e, &phi).ok_or(RecoveryError::NoInverse {
        a: e.clone(),
        m: phi.clone(),
    })?;
    Ok(RecoveredKey {
        n,
        e: e.clone(),
        d,
        phi,
    })
}

/// Recover `(p, q)` from `(n, e, d)` — the standard randomized reduction
/// from a known private exponent to the factorization of `n`.
///
/// `k = e*d - 1` is a multiple of phi(n), so for any base `a` coprime to
/// `n`, `a^k ≡ 1 (mod n)`. Writing `k = 2^s * t` with `t` odd and walking
/// the squaring chain of `a^t` finds, for a constant fraction of bases, a
/// nontrivial square root of unity `b` with `b^2 ≡ 1` but `b ≢ ±1`; then
/// `gcd(b - 1, n)` is a proper factor.
///
/// The base walk advances through successive primes 2, 3, 5, … and is
/// capped at `max_bases` candidates, returning `SearchExhausted` rather
/// than looping forever on malformed input. The returned pair is ordered
/// `p <= q` and satisfies `p * q == n`.
pub fn recover_primes_from_exponents(
    n: &BigUint,
    e: &BigUint,
    d: &BigUint,
    max_bases: usize,
) -> Result<(BigUint, BigUint), RecoveryError> {
    let one = BigUint::one();
    if *n <= one {
        return Err(RecoveryError::InvalidArgument(format!(
            "modulus {} must be greater than 1",
            n
        )));
    }
    if e.is_zero() || d.is_zero() {
        return Err(RecoveryError::InvalidArgument(
            "exponents must be positive".into(),
        ));
    }

    let k = e * d - &one;
    if k.is_zero() || k.is_odd() {
        return Err(RecoveryError::InvalidArgument(
            "e*d - 1 must be a positive even number for a valid exponent pair".into(),
        ));
    }

    // k = 2^s * t with t odd
    let mut t = k.clone();
    let mut s = 0u32;
    while t.is_even() {
        t >>= 1u32;
        s += 1;
    }

    let mut a = BigUint::from(2u32);
    for attempt in 0..max_bases {
        // A base sharing a factor with n exposes it outright
        let g = gcd(&a, n);
        if g > one && g < *n {
            log::debug!("base {} shares factor {} with n", a, g);
            return Ok(ordered_pair(g, n));
        }

        if let Some(p) = nontrivial_root_factor(n, &a, &t, s) {
            log::debug!("base {} exposed factor {} after {} attempts", a, p, attempt + 1);
            return Ok(ordered_pair(p, n));
        }
        a = next_prime(&a);
    }

    Err(RecoveryError::SearchExhausted { attempts: max_bases })
}

/// Run the squaring chain for one base. Returns a proper factor of `n` if
/// the chain passes through a nontrivial square root of unity, else `None`.
fn nontrivial_root_factor(n: &BigUint, a: &BigUint, t: &BigUint, s: u32) -> Option<BigUint> {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_1 = n - &one;

    let mut b = mod_pow(a, t, n);
    if b.is_one() || b == n_minus_1 {
        return None;
    }

    for _ in 0..s {
        let c = mod_pow(&b, &two, n);
        if c.is_one() {
            // b^2 ≡ 1 with b ≠ ±1: a nontrivial square root of unity
            let p = gcd(&(&b - &one), n);
            if p > one && p < *n {
                return Some(p);
            }
            return None;
        }
        if c == n_minus_1 {
            return None;
        }
        b = c;
    }
    None
}

fn ordered_pair(p: BigUint, n: &BigUint) -> (BigUint, BigUint) {
    let q = n / &p;
    if p <= q {
        (p, q)
    } else {
        (q, p)
    }
}

/// Euler's totient for a prime power: `phi(p^k) = p^(k-1) * (p - 1)`.
///
/// Fails with `InvalidArgument` when `p` is not prime or `k` is zero.
pub fn totient_prime_power(p: &BigUint, k: u32) -> Result<BigUint, RecoveryError> {
    if k == 0 {
        return Err(RecoveryError::InvalidArgument(
            "prime-power exponent must be at least 1".into(),
        ));
    }
    if !is_probable_prime(p, DEFAULT_ROUNDS) {
        return Err(RecoveryError::InvalidArgument(format!(
            "{} is not prime",
            p
        )));
    }
    Ok(p.pow(k - 1) * (p - BigUint::one()))
}
