//! Big-integer arithmetic primitives: extended GCD, modular inverse and
//! exponentiation, integer square root, coprimality.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Extended Euclidean algorithm: returns `(g, x, y)` with `a*x + b*y = g`
/// and `g = gcd(a, b) >= 0`.
///
/// Iterative, so arbitrarily large inputs cannot blow the stack.
/// `extended_gcd(0, b)` yields `(|b|, 0, ±1)`.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
        let next_t = &old_t - &q * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    if old_r.is_negative() {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// Modular multiplicative inverse: `a^(-1) mod m`.
///
/// Returns `None` when `gcd(a, m) != 1` or `m <= 1`. Absence is an expected
/// outcome here, not an error; callers that need to fail map it themselves.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m <= &BigUint::one() {
        return None;
    }
    let a_int = BigInt::from(a.clone());
    let m_int = BigInt::from(m.clone());
    let (g, x, _) = extended_gcd(&a_int, &m_int);
    if !g.is_one() {
        return None;
    }
    // mod_floor maps the (possibly negative) coefficient into [0, m)
    x.mod_floor(&m_int).to_biguint()
}

/// Modular exponentiation by repeated squaring. `modulus` must be nonzero.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Integer square root by Newton iteration: floor(sqrt(n)), exact on
/// perfect squares. Terminates when the iterate stops decreasing.
pub fn integer_sqrt(n: &BigUint) -> BigUint {
    if n.is_zero() {
        return BigUint::zero();
    }
    let mut x = n.clone();
    let mut y = (&x + BigUint::one()) >> 1u32;
    while y < x {
        x = y;
        y = (&x + n / &x) >> 1u32;
    }
    x
}

/// Greatest common divisor.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// True when `gcd(a, b) = 1`.
pub fn is_coprime(a: &BigUint, b: &BigUint) -> bool {
    a.gcd(b).is_one()
}
