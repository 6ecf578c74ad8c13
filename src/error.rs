use num_bigint::BigUint;

/// Errors raised while generating keys or decoding decrypted messages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("prime size must be at least 2 bits, got {0}")]
    PrimeTooSmall(u64),

    #[error("random source failed: {0}")]
    RandomSource(#[from] rand::Error),

    #[error("primes {p} and {q} do not admit a key pair")]
    DegeneratePrimes { p: BigUint, q: BigUint },

    #[error("decrypted message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
