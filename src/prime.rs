// Functions related to identification and generation of prime numbers.

use crate::prime_tables::SMALL_ODD_PRIMES;
use crate::{Error, Result};

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{Rng, RngCore};

const MILLER_RABIN_ROUNDS: u32 = 20;

/// Something that can hand out probable primes of a requested bit length.
///
/// Key generation only ever talks to this trait, so tests can swap the
/// operating system's randomness for a seeded rng or a fixed list of primes.
pub trait PrimeSource {
    fn prime(&mut self, bits: u64) -> Result<BigUint>;
}

impl<S: PrimeSource + ?Sized> PrimeSource for &mut S {
    fn prime(&mut self, bits: u64) -> Result<BigUint> {
        (**self).prime(bits)
    }
}

/// Draws primes from a random number generator using [`generate_prime`].
#[derive(Debug, Clone)]
pub struct RandomPrimes<R> {
    rng: R,
}

impl<R: RngCore> RandomPrimes<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> PrimeSource for RandomPrimes<R> {
    fn prime(&mut self, bits: u64) -> Result<BigUint> {
        generate_prime(bits, &mut self.rng)
    }
}

/// Generate a probable prime with exactly `bits` bits.
///
/// The two most significant bits of every candidate are set, so the product
/// of two primes generated with the same `bits` always has `2 * bits` bits.
/// For very small sizes this pins the output down completely: 2 bits always
/// gives 3, 3 bits gives 7 and 4 bits gives 13.
pub fn generate_prime<R: RngCore + ?Sized>(bits: u64, rng: &mut R) -> Result<BigUint> {
    if bits < 2 {
        return Err(Error::PrimeTooSmall(bits));
    }

    // Number of bits of the value that live in the leading byte.
    let lead_bits = match bits % 8 {
        0 => 8,
        b => b as u32,
    };
    let mut bytes = vec![0u8; bits.div_ceil(8) as usize];
    loop {
        rng.try_fill_bytes(&mut bytes)?;

        bytes[0] &= ((1u16 << lead_bits) - 1) as u8;
        if lead_bits >= 2 {
            bytes[0] |= 3 << (lead_bits - 2);
        } else {
            // The second highest bit is the top bit of the next byte.
            bytes[0] |= 1;
            bytes[1] |= 0x80;
        }
        if let Some(last) = bytes.last_mut() {
            *last |= 1;
        }

        let candidate = BigUint::from_bytes_be(&bytes);
        if is_likely_prime(&candidate, rng) {
            return Ok(candidate);
        }
    }
}

pub fn is_likely_prime<R: Rng + ?Sized>(
    candidate_prime: &BigUint,
    miller_rabin_rng: &mut R,
) -> bool {
    if candidate_prime.is_zero() || candidate_prime.is_one() {
        return false;
    }
    let two = BigUint::from(2u64);
    if candidate_prime == &two {
        return true;
    }
    if candidate_prime.is_even() {
        return false;
    }

    for small_prime in SMALL_ODD_PRIMES {
        if candidate_prime == &BigUint::from(small_prime) {
            return true;
        }
        if (candidate_prime % small_prime).is_zero() {
            return false;
        }
    }

    miller_rabin(candidate_prime, MILLER_RABIN_ROUNDS, miller_rabin_rng)
}

// Only called for odd candidates larger than every entry in the small prime
// table, so the witness range [2, n - 1) is never empty.
fn miller_rabin<R: Rng + ?Sized>(candidate_prime: &BigUint, n_rounds: u32, rng: &mut R) -> bool {
    let two = BigUint::from(2u64);
    let candidate_minus_one = candidate_prime - 1u32;

    // candidate - 1 = d * 2^r with d odd.
    let r = candidate_minus_one.trailing_zeros().unwrap_or(0);
    let d = &candidate_minus_one >> r;

    'witness: for _ in 0..n_rounds {
        let a = rng.gen_biguint_range(&two, &candidate_minus_one);
        let mut x = a.modpow(&d, candidate_prime);
        if x.is_one() || x == candidate_minus_one {
            continue;
        }
        for _ in 1..r {
            x = x.modpow(&two, candidate_prime);
            if x == candidate_minus_one {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use num_traits::Num;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            unimplemented!()
        }

        fn next_u64(&mut self) -> u64 {
            unimplemented!()
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            unimplemented!()
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    #[rstest]
    #[case(BigUint::from(2u64))]
    #[case(BigUint::from(37u64))]
    #[case(BigUint::from(257u64))]
    #[case(BigUint::from(65537u64))]
    #[case(BigUint::from_str_radix(
        "122918091607895345462109112013423411099284103879272281586\
        0819946412949055199827238447096054805339148543003066133719\
        9085275880150614723662649630584506204331", 10).unwrap())
    ]
    #[case(BigUint::from_str_radix(
            "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024\
            e088a67cc74020bbea63b139b22514a08798e3404ddef9519b3cd\
            3a431b302b0a6df25f14374fe1356d6d51c245e485b576625e7ec\
            6f44c42e9a637ed6b0bff5cb6f406b7edee386bfb5a899fa5ae9f\
            24117c4b1fe649286651ece45b3dc2007cb8a163bf0598da48361\
            c55d39a69163fa8fd24cf5f83655d23dca3ad961c62f356208552\
            bb9ed529077096966d670c354e4abc9804f1746c08ca237327fff\
            fffffffffffff", 16).unwrap())]
    fn is_likely_prime_identifies_primes(#[case] prime: BigUint) {
        let mut rng = StdRng::from_seed([101; 32]);

        assert!(is_likely_prime(&prime, &mut rng));
    }

    #[rstest]
    #[case(BigUint::from(0u64))]
    #[case(BigUint::from(1u64))]
    #[case(BigUint::from(4u64))]
    #[case(BigUint::from(25u64))]
    #[case(BigUint::from(1024u64))]
    #[case(BigUint::from(1025u64))]
    // 257 * 263, not divisible by anything in the small prime table.
    #[case(BigUint::from(67591u64))]
    // Carmichael number.
    #[case(BigUint::from(41041u64))]
    fn is_likely_prime_identifies_non_primes(#[case] non_prime: BigUint) {
        let mut rng = StdRng::from_seed([101; 32]);

        assert!(!is_likely_prime(&non_prime, &mut rng));
    }

    #[rstest]
    #[case(2, 3u64)]
    #[case(3, 7u64)]
    #[case(4, 13u64)]
    fn generate_prime_is_fixed_for_tiny_bit_lengths(#[case] bits: u64, #[case] expected: u64) {
        let mut rng = StdRng::from_seed([101; 32]);

        for _ in 0..10 {
            assert_eq!(generate_prime(bits, &mut rng).unwrap(), BigUint::from(expected));
        }
    }

    #[test]
    fn generate_prime_with_five_bits_returns_29_or_31() {
        let mut rng = StdRng::from_seed([12; 32]);
        let allowed = [BigUint::from(29u64), BigUint::from(31u64)];

        for _ in 0..20 {
            let prime = generate_prime(5, &mut rng).unwrap();
            assert!(allowed.contains(&prime), "unexpected prime {prime}");
        }
    }

    #[rstest]
    #[case(9)]
    #[case(16)]
    #[case(64)]
    #[case(257)]
    fn generate_prime_returns_prime_with_requested_bit_length(#[case] bits: u64) {
        let mut rng = StdRng::from_seed([101; 32]);

        let prime = generate_prime(bits, &mut rng).unwrap();

        assert_eq!(prime.bits(), bits);
        // The second highest bit is always set too.
        assert!(prime >= BigUint::from(3u64) << (bits - 2));
        assert!(is_likely_prime(&prime, &mut rng));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn generate_prime_rejects_bit_lengths_below_two(#[case] bits: u64) {
        let mut rng = StdRng::from_seed([101; 32]);

        let result = generate_prime(bits, &mut rng);

        assert!(matches!(result, Err(Error::PrimeTooSmall(b)) if b == bits));
    }

    #[test]
    fn generate_prime_propagates_rng_failure() {
        let result = generate_prime(16, &mut FailingRng);

        assert!(matches!(result, Err(Error::RandomSource(_))));
    }

    #[test]
    fn random_primes_draws_from_wrapped_rng() {
        let mut source = RandomPrimes::new(StdRng::from_seed([7; 32]));
        let mut rng = StdRng::from_seed([7; 32]);

        assert_eq!(source.prime(32).unwrap(), generate_prime(32, &mut rng).unwrap());
    }
}
