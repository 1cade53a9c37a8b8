//! Random password generator over the four fixed alphabets.

use rand::{CryptoRng, Rng};
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;

use super::{PasswordGenerator, check_request};
use crate::core::errors::Result;
use crate::options::state::{CharClass, GenerationRequest};

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*";

/// Alphabet drawn from for one character class.
#[must_use]
pub const fn alphabet(class: CharClass) -> &'static [u8] {
    match class {
        CharClass::Uppercase => UPPERCASE,
        CharClass::Lowercase => LOWERCASE,
        CharClass::Numbers => NUMBERS,
        CharClass::Special => SPECIAL,
    }
}

/// Generator backed by a cryptographically strong `rand` RNG.
///
/// The default uses the thread-local CSPRNG (`rand::rng()`), which is seeded
/// from the operating system. Tests inject a seeded `StdRng`. Generators that
/// are not [`CryptoRng`] are rejected at compile time:
///
/// ```compile_fail
/// use password_options::generator::RandomPasswordGenerator;
///
/// struct Counter(u64);
///
/// impl rand::RngCore for Counter {
///     fn next_u32(&mut self) -> u32 {
///         self.next_u64() as u32
///     }
///     fn next_u64(&mut self) -> u64 {
///         self.0 += 1;
///         self.0
///     }
///     fn fill_bytes(&mut self, dest: &mut [u8]) {
///         dest.fill(0);
///     }
/// }
///
/// let _ = RandomPasswordGenerator::with_rng(Counter(0));
/// ```
pub struct RandomPasswordGenerator<R: Rng + CryptoRng = ThreadRng> {
    rng: R,
}

impl RandomPasswordGenerator<ThreadRng> {
    /// Generator over the thread-local CSPRNG.
    #[must_use]
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for RandomPasswordGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + CryptoRng> RandomPasswordGenerator<R> {
    /// Generator over a caller-supplied RNG.
    #[must_use]
    pub const fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    fn pick(&mut self, pool: &[u8]) -> u8 {
        pool[self.rng.random_range(0..pool.len())]
    }
}

impl<R: Rng + CryptoRng> PasswordGenerator for RandomPasswordGenerator<R> {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String> {
        check_request(request)?;

        let enabled: Vec<CharClass> = CharClass::ALL
            .into_iter()
            .filter(|class| match class {
                CharClass::Uppercase => request.uppercase,
                CharClass::Lowercase => request.lowercase,
                CharClass::Numbers => request.numbers,
                CharClass::Special => request.special,
            })
            .collect();
        let pool: Vec<u8> = enabled.iter().flat_map(|c| alphabet(*c)).copied().collect();

        let length = request.length as usize;
        let mut chars = Vec::with_capacity(length);
        if request.numbers {
            for _ in 0..request.min_numbers {
                chars.push(self.pick(NUMBERS));
            }
        }
        if request.special {
            for _ in 0..request.min_special {
                chars.push(self.pick(SPECIAL));
            }
        }
        while chars.len() < length {
            chars.push(self.pick(&pool));
        }
        chars.shuffle(&mut self.rng);

        Ok(chars.into_iter().map(char::from).collect())
    }
}
