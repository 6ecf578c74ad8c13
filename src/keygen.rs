// Textbook RSA key generation

use crate::{Error, PrimeSource, RandomPrimes, Result};

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::rngs::OsRng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public: BigUint,
    pub private: BigUint,
    pub n: BigUint,
}

/// Generate a key pair from two `bits`-bit primes drawn from the operating
/// system's random number generator.
pub fn generate_keys(bits: u64) -> Result<KeyPair> {
    generate_keys_with(bits, RandomPrimes::new(OsRng))
}

/// Generate a key pair from two primes handed out by `primes`.
///
/// If the two primes collide, the second is redrawn with `bits - 1` bits
/// until they differ. For tiny `bits` this skews the key space: a 5-bit
/// collision always ends up with q = 13.
pub fn generate_keys_with(bits: u64, mut primes: impl PrimeSource) -> Result<KeyPair> {
    let p = primes.prime(bits)?;
    let mut q = primes.prime(bits)?;
    while p == q {
        q = primes.prime(bits.saturating_sub(1))?;
    }
    derive_keys(&p, &q)
}

/// Derive `(e, d, n)` from the primes `p` and `q`.
///
/// `e` is the smallest integer of at least 2 that is coprime with the
/// totient, and `d` is the smallest integer of at least 2 with
/// `d * e = 1 (mod totient)`.
pub fn derive_keys(p: &BigUint, q: &BigUint) -> Result<KeyPair> {
    let one = BigUint::one();
    let two = BigUint::from(2u64);
    let degenerate = || Error::DegeneratePrimes {
        p: p.clone(),
        q: q.clone(),
    };

    // A totient below 2 leaves no d >= 2 with d * e = 1.
    if p < &two || q < &two {
        return Err(degenerate());
    }
    let totient = (p - &one) * (q - &one);
    if totient < two {
        return Err(degenerate());
    }

    let public = public_exponent(&totient);
    let private = private_exponent(&public, &totient).ok_or_else(degenerate)?;
    Ok(KeyPair {
        public,
        private,
        n: p * q,
    })
}

fn public_exponent(totient: &BigUint) -> BigUint {
    // The answer is the smallest prime that does not divide the totient, so
    // this only ever takes a handful of steps.
    let mut e = BigUint::from(2u64);
    while !e.gcd(totient).is_one() {
        e += 1u32;
    }
    e
}

fn private_exponent(public: &BigUint, totient: &BigUint) -> Option<BigUint> {
    // Every solution of d * e = 1 (mod totient) is the inverse plus a
    // multiple of the totient. The inverse lies in [1, totient), so only an
    // inverse of 1 falls short of the lower bound of 2.
    let inverse = public.modinv(totient)?;
    if inverse < BigUint::from(2u64) {
        Some(inverse + totient)
    } else {
        Some(inverse)
    }
}
