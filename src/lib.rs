//! RSA key recovery and big-integer number theory for CTF-style
//! cryptanalysis.
//!
//! The crate recovers private key material from weak RSA setups:
//!
//! - [`rsa::factors_to_key`] turns a list of prime factors (from an external
//!   factoring oracle) into `(n, phi, d)`;
//! - [`rsa::recover_primes_from_exponents`] recovers `p` and `q` when the
//!   private exponent is known;
//! - [`crt::reconstruct`] combines residues modulo pairwise-coprime moduli;
//! - [`primality`] is the Miller-Rabin oracle backing everything above;
//! - [`oracle`] defines the external-factoring collaborator contract.
//!
//! All operations are pure, synchronous and retain no cross-call state.

pub mod arith;
pub mod crt;
pub mod error;
pub mod oracle;
pub mod primality;
pub mod rsa;

pub use crate::error::RecoveryError;
pub use crate::oracle::FactorOracle;
pub use crate::rsa::RecoveredKey;

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use crate::arith::mod_pow;
    use crate::oracle::{prime_factors, TrialDivisionOracle};
    use crate::rsa::factors_to_key;

    /// End-to-end: factor a multi-prime modulus through the oracle, derive
    /// the private key, and decrypt a ciphertext back to a known message.
    #[test]
    fn test_oracle_factor_then_decrypt() {
        let e = BigUint::from(65537u32);
        let primes = [
            BigUint::from(1_000_003u64),
            BigUint::from(1_000_033u64),
            BigUint::from(1_000_037u64),
        ];
        let n: BigUint = primes.iter().product();

        let message = BigUint::from_bytes_be(b"ctf{ok}");
        assert!(message < n);
        let ciphertext = mod_pow(&message, &e, &n);

        let oracle = TrialDivisionOracle { bound: 2_000_000 };
        let factors = prime_factors(&oracle, &n).unwrap();
        assert_eq!(factors.len(), 3);

        let key = factors_to_key(&factors, &e).unwrap();
        assert_eq!(key.n, n);

        let recovered = mod_pow(&ciphertext, &key.d, &key.n);
        assert_eq!(String::from_utf8(recovered.to_bytes_be()).unwrap(), "ctf{ok}");
    }
}
