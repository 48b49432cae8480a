//! Miller-Rabin probabilistic primality oracle.
//!
//! `false` means certainly composite; `true` means prime with a false
//! positive probability bounded by 4^(-rounds). Callers needing absolute
//! certainty must not rely solely on this oracle.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::Rng;

/// Default witness rounds: error bound 4^(-20), well past the 2^(-16)
/// cryptographic-confidence threshold.
pub const DEFAULT_ROUNDS: u32 = 20;

/// Miller-Rabin primality test with `rounds` independent random witnesses.
pub fn is_probable_prime(n: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = &one + &one;
    let three = &two + &one;

    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 as 2^s * d with d odd
    let n_minus_1 = n - &one;
    let mut d = n_minus_1.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1u32;
        s += 1;
    }

    let mut rng = rand::thread_rng();

    'witness: for _ in 0..rounds {
        let a = random_witness(n, &mut rng);
        let mut x = a.modpow(&d, n);

        if x == one || x == n_minus_1 {
            continue 'witness;
        }

        for _ in 0..s - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        // No squaring reached n-1: n is certainly composite
        return false;
    }

    true
}

/// Uniform random witness in [2, n-2]. Requires n >= 5.
fn random_witness(n: &BigUint, rng: &mut impl Rng) -> BigUint {
    let two = BigUint::from(2u32);
    let upper = n - &two;
    let num_bytes = n.to_bytes_be().len();
    loop {
        let mut bytes = vec![0u8; num_bytes];
        rng.fill(&mut bytes[..]);
        let a = BigUint::from_bytes_be(&bytes) % n;
        if a >= two && a <= upper {
            return a;
        }
    }
}

/// Smallest probable prime strictly greater than `n`.
pub fn next_prime(n: &BigUint) -> BigUint {
    let two = BigUint::from(2u32);
    if *n < two {
        return two;
    }
    let mut candidate = n + BigUint::one();
    if candidate.is_even() {
        candidate += BigUint::one();
    }
    while !is_probable_prime(&candidate, DEFAULT_ROUNDS) {
        candidate += &two;
    }
    candidate
}

/// Random probable prime with exactly `bits` bits (top bit set, odd).
pub fn random_prime(bits: u32, rng: &mut impl Rng) -> BigUint {
    assert!(bits >= 2, "cannot generate a prime with fewer than 2 bits");
    loop {
        let num_bytes = (bits as usize + 7) / 8;
        let mut bytes = vec![0u8; num_bytes];
        rng.fill(&mut bytes[..]);

        // Clear excess high bits so the candidate fits in `bits` bits,
        // then pin the top bit and force the candidate odd.
        let excess_bits = (num_bytes * 8) as u32 - bits;
        if excess_bits > 0 {
            bytes[0] &= (1u8 << (8 - excess_bits)) - 1;
        }
        bytes[0] |= 1u8 << ((bits - 1) % 8);
        if let Some(last) = bytes.last_mut() {
            *last |= 0x01;
        }

        let candidate = BigUint::from_bytes_be(&bytes);
        if is_probable_prime(&candidate, DEFAULT_ROUNDS) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sieve of Eratosthenes, the ground truth for the exhaustive check.
    fn sieve(limit: usize) -> Vec<bool> {
        let mut is_prime = vec![true; limit];
        is_prime[0] = false;
        is_prime[1] = false;
        let mut i = 2;
        while i * i < limit {
            if is_prime[i] {
                let mut j = i * i;
                while j < limit {
                    is_prime[j] = false;
                    j += i;
                }
            }
            i += 1;
        }
        is_prime
    }

    #[test]
    fn test_agrees_with_sieve_below_10000() {
        let table = sieve(10_000);
        for (n, &expected) in table.iter().enumerate() {
            assert_eq!(
                is_probable_prime(&BigUint::from(n), DEFAULT_ROUNDS),
                expected,
                "classification of {} disagrees with the sieve",
                n
            );
        }
    }

    #[test]
    fn test_known_vectors() {
        let n = BigUint::parse_bytes(b"1641117189524860342313448880785985676983479", 10).unwrap();
        let p = BigUint::parse_bytes(b"16912473451", 10).unwrap();
        assert!(!is_probable_prime(&n, DEFAULT_ROUNDS), "{} is composite", n);
        assert!(is_probable_prime(&p, DEFAULT_ROUNDS), "{} is prime", p);
    }

    #[test]
    fn test_small_fast_paths() {
        for composite in [0u32, 1, 4, 6, 8, 9] {
            assert!(!is_probable_prime(&BigUint::from(composite), 8));
        }
        for prime in [2u32, 3, 5, 7] {
            assert!(is_probable_prime(&BigUint::from(prime), 8));
        }
    }

    #[test]
    fn test_next_prime() {
        let cases = [(0u64, 2u64), (1, 2), (2, 3), (3, 5), (7, 11), (13, 17), (89, 97)];
        for (n, expected) in cases {
            assert_eq!(next_prime(&BigUint::from(n)), BigUint::from(expected));
        }
    }

    #[test]
    fn test_random_prime_bit_length() {
        let mut rng = rand::thread_rng();
        for bits in [16u32, 24, 32, 50, 64] {
            let p = random_prime(bits, &mut rng);
            assert_eq!(p.bits(), bits as u64, "random_prime({}) returned {}", bits, p);
            assert!(is_probable_prime(&p, DEFAULT_ROUNDS));
        }
    }
}
