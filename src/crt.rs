//! Chinese Remainder reconstruction.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::arith::{gcd, mod_inverse};
use crate::error::RecoveryError;

/// Reconstruct the unique `x` in `[0, Π moduli)` with
/// `x ≡ residues[i] (mod moduli[i])` for all `i`.
///
/// The moduli must be pairwise coprime and greater than 1; both conditions
/// are checked, since a silently wrong reconstruction would defeat the
/// recovery scenarios this feeds.
pub fn reconstruct(moduli: &[BigUint], residues: &[BigUint]) -> Result<BigUint, RecoveryError> {
    if moduli.len() != residues.len() {
        return Err(RecoveryError::LengthMismatch {
            moduli: moduli.len(),
            residues: residues.len(),
        });
    }
    if moduli.is_empty() {
        return Err(RecoveryError::InvalidArgument(
            "congruence system is empty".into(),
        ));
    }
    let one = BigUint::one();
    for m in moduli {
        if *m <= one {
            return Err(RecoveryError::InvalidArgument(format!(
                "modulus {} must be greater than 1",
                m
            )));
        }
    }
    for i in 0..moduli.len() {
        for j in i + 1..moduli.len() {
            let g = gcd(&moduli[i], &moduli[j]);
            if !g.is_one() {
                return Err(RecoveryError::NonCoprimeModuli {
                    a: moduli[i].clone(),
                    b: moduli[j].clone(),
                    g,
                });
            }
        }
    }

    let product: BigUint = moduli.iter().product();
    let mut acc = BigUint::zero();
    for (m_i, r_i) in moduli.iter().zip(residues) {
        let partial = &product / m_i;
        let reduced = &partial % m_i;
        // The inverse exists for every pairwise-coprime system
        let inv = mod_inverse(&reduced, m_i).ok_or(RecoveryError::NoInverse {
            a: reduced,
            m: m_i.clone(),
        })?;
        acc += r_i * &inv * &partial;
    }
    Ok(acc % product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::{mod_inverse, mod_pow};
    use crate::rsa::totient_prime_power;
    use num_traits::Pow;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_basic_reconstruction() {
        // x ≡ 2 (mod 3), x ≡ 3 (mod 5), x ≡ 2 (mod 7)  =>  x = 23
        let moduli = [big(3), big(5), big(7)];
        let residues = [big(2), big(3), big(2)];
        assert_eq!(reconstruct(&moduli, &residues).unwrap(), big(23));
    }

    #[test]
    fn test_round_trip() {
        let moduli = [big(97), big(101), big(103)];
        let product: BigUint = moduli.iter().product();
        for x in [0u64, 1, 12345, 987654] {
            let x = big(x);
            let residues: Vec<BigUint> = moduli.iter().map(|m| &x % m).collect();
            let reconstructed = reconstruct(&moduli, &residues).unwrap();
            assert_eq!(reconstructed, &x % &product);
        }
    }

    #[test]
    fn test_rejects_non_coprime_moduli() {
        let moduli = [big(6), big(10)];
        let residues = [big(1), big(3)];
        let err = reconstruct(&moduli, &residues).unwrap_err();
        assert!(
            matches!(err, RecoveryError::NonCoprimeModuli { ref g, .. } if *g == big(2)),
            "expected NonCoprimeModuli, got {:?}",
            err
        );
    }

    #[test]
    fn test_rejects_malformed_systems() {
        assert!(matches!(
            reconstruct(&[big(3), big(5)], &[big(1)]),
            Err(RecoveryError::LengthMismatch { moduli: 2, residues: 1 })
        ));
        assert!(matches!(
            reconstruct(&[], &[]),
            Err(RecoveryError::InvalidArgument(_))
        ));
        assert!(matches!(
            reconstruct(&[big(1), big(5)], &[big(0), big(2)]),
            Err(RecoveryError::InvalidArgument(_))
        ));
    }

    /// Three congruences modulo fourth powers of distinct primes, with the
    /// second and third residues wrapped under known exponents. Unwrapping
    /// uses the prime-power totient, then CRT yields the plaintext integer.
    #[test]
    fn test_three_modulus_prime_power_recovery() {
        let p1 = big(492876863);
        let p2 = big(472882049);
        let p3 = big(573259391);

        let t1 = BigUint::parse_bytes(b"53994433445527579909840621536093364", 10).unwrap();
        let t2 = BigUint::parse_bytes(b"36364162229311278067416695130494243", 10).unwrap();
        let t3 = BigUint::parse_bytes(b"31003636792624845072184744558108878", 10).unwrap();

        let n1 = (&p1).pow(4u32);
        let n2 = (&p2).pow(4u32);
        let n3 = (&p3).pow(4u32);

        // t2 = t^2019 mod n2: invert the exponent modulo phi(p2^4)
        let e2 = big(2019);
        let inv2 = mod_inverse(&e2, &totient_prime_power(&p2, 4).unwrap()).unwrap();
        let c2 = mod_pow(&t2, &inv2, &n2);

        // t3 = t^(2019^2019) mod n3
        let e3 = big(2019).pow(2019u32);
        let inv3 = mod_inverse(&e3, &totient_prime_power(&p3, 4).unwrap()).unwrap();
        let c3 = mod_pow(&t3, &inv3, &n3);

        let t = reconstruct(&[n1, n2, n3], &[t1, c2, c3]).unwrap();
        assert_eq!(
            String::from_utf8(t.to_bytes_be()).unwrap(),
            "timctf{c0ngru3nc3s_4r3_s000o_c00l}"
        );
    }
}
