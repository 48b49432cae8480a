//! rsa-recovery demo: walks through the three recovery scenarios on
//! freshly generated keys and prints a JSON summary.
//!
//! Options:
//!   --bits=<N>        Prime size in bits for the generated keys (default: 20;
//!                     the demo's trial-division oracle handles up to ~32)
//!   --max-bases=<N>   Candidate-base cap for exponent recovery (default: 100)
//!   --seed=<N>        RNG seed for reproducible runs (default: 42)

use std::time::Instant;

use num_bigint::BigUint;
use num_traits::{One, Pow};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use rsa_recovery::arith::{is_coprime, mod_inverse, mod_pow};
use rsa_recovery::crt::reconstruct;
use rsa_recovery::oracle::{prime_factors, TrialDivisionOracle};
use rsa_recovery::primality::random_prime;
use rsa_recovery::rsa::{
    factors_to_key, recover_primes_from_exponents, totient_prime_power, DEFAULT_MAX_BASES,
};

struct CliConfig {
    bits: u32,
    max_bases: usize,
    seed: u64,
}

fn parse_args() -> CliConfig {
    let mut config = CliConfig {
        bits: 20,
        max_bases: DEFAULT_MAX_BASES,
        seed: 42,
    };
    for arg in std::env::args().skip(1) {
        if let Some(v) = arg.strip_prefix("--bits=") {
            config.bits = v.parse().expect("--bits must be an integer");
        } else if let Some(v) = arg.strip_prefix("--max-bases=") {
            config.max_bases = v.parse().expect("--max-bases must be an integer");
        } else if let Some(v) = arg.strip_prefix("--seed=") {
            config.seed = v.parse().expect("--seed must be an integer");
        } else {
            eprintln!("unknown option: {}", arg);
            eprintln!("usage: rsa-recovery [--bits=N] [--max-bases=N] [--seed=N]");
            std::process::exit(1);
        }
    }
    // Section 2 embeds a 4-byte message, so the 3-prime modulus must
    // clear 32 bits
    if config.bits < 12 {
        eprintln!("--bits must be at least 12");
        std::process::exit(1);
    }
    config
}

#[derive(Serialize)]
struct DemoReport {
    bits: u32,
    exponent_recovery: ExponentRecoveryReport,
    oracle_recovery: OracleRecoveryReport,
    crt_recovery: CrtRecoveryReport,
}

#[derive(Serialize)]
struct ExponentRecoveryReport {
    n: String,
    p: String,
    q: String,
    elapsed_ms: u128,
}

#[derive(Serialize)]
struct OracleRecoveryReport {
    n: String,
    factors: Vec<String>,
    decrypted: String,
}

#[derive(Serialize)]
struct CrtRecoveryReport {
    moduli: Vec<String>,
    recovered: String,
    round_trip_ok: bool,
}

fn main() {
    env_logger::init();
    let config = parse_args();
    let mut rng = StdRng::seed_from_u64(config.seed);

    println!("=== RSA Key Recovery Walkthrough ===\n");

    let exponent_recovery = section_1_exponents_to_factors(&config, &mut rng);
    let oracle_recovery = section_2_oracle_to_key(&config, &mut rng);
    let crt_recovery = section_3_crt(&config, &mut rng);

    let report = DemoReport {
        bits: config.bits,
        exponent_recovery,
        oracle_recovery,
        crt_recovery,
    };
    println!("--- Summary ---\n");
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}

/// Generate a key pair with `bits`-bit primes and e = 65537.
fn generate_key(bits: u32, rng: &mut StdRng) -> (BigUint, BigUint, BigUint, BigUint, BigUint) {
    let e = BigUint::from(65537u32);
    loop {
        let p = random_prime(bits, rng);
        let q = random_prime(bits, rng);
        if p == q {
            continue;
        }
        let phi = (&p - BigUint::one()) * (&q - BigUint::one());
        if !is_coprime(&e, &phi) {
            continue;
        }
        let d = mod_inverse(&e, &phi).expect("e coprime to phi");
        let n = &p * &q;
        return (p, q, n, e, d);
    }
}

// -------------------------------------------------------------------------
// Section 1 — Recover p, q from (n, e, d)
// -------------------------------------------------------------------------

fn section_1_exponents_to_factors(config: &CliConfig, rng: &mut StdRng) -> ExponentRecoveryReport {
    println!("--- Section 1: Prime Recovery From a Known Private Exponent ---\n");

    let (p, q, n, e, d) = generate_key(config.bits, rng);
    println!("  generated: p={}, q={}, n={}", p, q, n);

    let start = Instant::now();
    let (rp, rq) = recover_primes_from_exponents(&n, &e, &d, config.max_bases)
        .expect("recovery must succeed on a valid key");
    let elapsed = start.elapsed();

    println!("  recovered: p={}, q={} in {:?}\n", rp, rq, elapsed);
    assert_eq!(&rp * &rq, n);

    ExponentRecoveryReport {
        n: n.to_string(),
        p: rp.to_string(),
        q: rq.to_string(),
        elapsed_ms: elapsed.as_millis(),
    }
}

// -------------------------------------------------------------------------
// Section 2 — Factor with the oracle, derive the key, decrypt
// -------------------------------------------------------------------------

fn section_2_oracle_to_key(config: &CliConfig, rng: &mut StdRng) -> OracleRecoveryReport {
    println!("--- Section 2: Factor Oracle to Private Key ---\n");

    // Multi-prime modulus from three distinct primes
    let e = BigUint::from(65537u32);
    let (n, message) = loop {
        let a = random_prime(config.bits, rng);
        let b = random_prime(config.bits, rng);
        let c = random_prime(config.bits, rng);
        if a == b || b == c || a == c {
            continue;
        }
        let phi = (&a - BigUint::one()) * (&b - BigUint::one()) * (&c - BigUint::one());
        if !is_coprime(&e, &phi) {
            continue;
        }
        let n = &a * &b * &c;
        let message = BigUint::from(0x63_74_66_21u32); // "ctf!"
        if message < n {
            break (n, message);
        }
    };
    let ciphertext = mod_pow(&message, &e, &n);
    println!("  n={}, ciphertext={}", n, ciphertext);

    let oracle = TrialDivisionOracle {
        bound: 1u64 << (config.bits.min(40) + 1),
    };
    let factors = prime_factors(&oracle, &n).expect("oracle covers the generated primes");
    println!("  oracle factors: {:?}", factors);

    let key = factors_to_key(&factors, &e).expect("distinct primes with invertible e");
    let decrypted = mod_pow(&ciphertext, &key.d, &key.n);
    let text = String::from_utf8(decrypted.to_bytes_be()).unwrap_or_default();
    println!("  decrypted: {:?}\n", text);
    assert_eq!(decrypted, message);

    OracleRecoveryReport {
        n: n.to_string(),
        factors: factors.iter().map(|f| f.to_string()).collect(),
        decrypted: text,
    }
}

// -------------------------------------------------------------------------
// Section 3 — CRT reconstruction over prime-power moduli
// -------------------------------------------------------------------------

fn section_3_crt(config: &CliConfig, rng: &mut StdRng) -> CrtRecoveryReport {
    println!("--- Section 3: Chinese Remainder Reconstruction ---\n");

    // Secret residues modulo squares of distinct primes, each wrapped
    // under its own exponent and unwrapped via the prime-power totient
    let secret = BigUint::from(0x63_72_74_21u32); // "crt!"
    let (p1, p2, p3) = loop {
        let a = random_prime(config.bits, rng);
        let b = random_prime(config.bits, rng);
        let c = random_prime(config.bits, rng);
        let distinct = a != b && b != c && a != c;
        if distinct && [&a, &b, &c].iter().all(|p| is_coprime(&secret, p)) {
            break (a, b, c);
        }
    };
    let moduli = [(&p1).pow(2u32), (&p2).pow(2u32), (&p3).pow(2u32)];

    let mut residues = Vec::new();
    for (m, p) in moduli.iter().zip([&p1, &p2, &p3]) {
        let phi = totient_prime_power(p, 2).expect("generated primes pass the oracle");
        // Pick a small wrapping exponent invertible modulo phi(p^2)
        let exp = [3u32, 5, 7, 11, 13, 17, 19, 23, 29, 31, 65537]
            .iter()
            .map(|&e| BigUint::from(e))
            .find(|e| is_coprime(e, &phi))
            .expect("some small exponent is coprime to phi");
        let wrapped = mod_pow(&(&secret % m), &exp, m);
        let inv = mod_inverse(&exp, &phi).expect("exponent chosen coprime to phi");
        residues.push(mod_pow(&wrapped, &inv, m));
    }

    let recovered = reconstruct(&moduli, &residues).expect("coprime prime-power moduli");
    let product: BigUint = moduli.iter().product();
    let ok = recovered == &secret % &product;
    println!("  moduli: {:?}", moduli);
    println!("  recovered {} (round trip ok: {})\n", recovered, ok);

    CrtRecoveryReport {
        moduli: moduli.iter().map(|m| m.to_string()).collect(),
        recovered: recovered.to_string(),
        round_trip_ok: ok,
    }
}
