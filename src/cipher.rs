// Encrypt and decrypt messages one byte at a time with textbook RSA

use crate::{KeyPair, Result};

use num_bigint::BigUint;
use rayon::prelude::*;

/// An RSA key pair ready to encrypt and decrypt.
///
/// There is no padding: every byte of a message is encrypted on its own, so
/// equal bytes always give equal ciphertext. Bytes are only recovered
/// intact when they are smaller than the modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cipher {
    public: BigUint,
    private: BigUint,
    n: BigUint,
}

impl Cipher {
    pub fn new(public: BigUint, private: BigUint, n: BigUint) -> Self {
        Self { public, private, n }
    }

    pub fn public_exponent(&self) -> &BigUint {
        &self.public
    }

    pub fn private_exponent(&self) -> &BigUint {
        &self.private
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Compute `number ^ e mod n`.
    ///
    /// Any integer is accepted; values of at least `n` are effectively
    /// reduced modulo `n` first.
    ///
    /// # Panics
    ///
    /// Panics if the modulus is zero.
    pub fn encrypt(&self, number: &BigUint) -> BigUint {
        number.modpow(&self.public, &self.n)
    }

    /// Compute `number ^ d mod n`.
    ///
    /// # Panics
    ///
    /// Panics if the modulus is zero.
    pub fn decrypt(&self, number: &BigUint) -> BigUint {
        number.modpow(&self.private, &self.n)
    }

    pub fn encrypt_message(&self, message: impl AsRef<[u8]>) -> Vec<BigUint> {
        message
            .as_ref()
            .par_iter()
            .map(|&byte| self.encrypt(&BigUint::from(byte)))
            .collect()
    }

    /// Decrypt each integer and keep the low byte of the result.
    pub fn decrypt_message(&self, ciphertext: &[BigUint]) -> Vec<u8> {
        ciphertext
            .par_iter()
            .map(|number| low_byte(&self.decrypt(number)))
            .collect()
    }

    pub fn decrypt_message_to_string(&self, ciphertext: &[BigUint]) -> Result<String> {
        Ok(String::from_utf8(self.decrypt_message(ciphertext))?)
    }
}

impl From<KeyPair> for Cipher {
    fn from(keys: KeyPair) -> Self {
        Self::new(keys.public, keys.private, keys.n)
    }
}

fn low_byte(number: &BigUint) -> u8 {
    // Zero has no digits.
    number
        .iter_u32_digits()
        .next()
        .map_or(0, |digit| (digit & 0xff) as u8)
}
