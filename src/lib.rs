mod cipher;
mod error;
mod keygen;
mod prime;
mod prime_tables;

pub use cipher::Cipher;
pub use error::{Error, Result};
pub use keygen::{derive_keys, generate_keys, generate_keys_with, KeyPair};
pub use prime::{generate_prime, is_likely_prime, PrimeSource, RandomPrimes};
