use num_bigint::BigUint;

/// Errors surfaced by the recovery routines.
///
/// Expected absences (a modular inverse that does not exist) are `Option`s at
/// the arithmetic layer; these variants cover the points where an absence or
/// a bad input must stop a recovery instead of producing a wrong number.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("no modular inverse: gcd({a}, {m}) != 1")]
    NoInverse { a: BigUint, m: BigUint },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("factorization incomplete: {remaining} could not be decomposed further")]
    FactorizationIncomplete { remaining: BigUint },

    #[error("no nontrivial square root of unity found after {attempts} candidate bases")]
    SearchExhausted { attempts: usize },

    #[error("moduli {a} and {b} share the factor {g}")]
    NonCoprimeModuli { a: BigUint, b: BigUint, g: BigUint },

    #[error("congruence system has {moduli} moduli but {residues} residues")]
    LengthMismatch { moduli: usize, residues: usize },
}
