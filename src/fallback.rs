//! Randomized suffixes served while no segment number is available.

use parking_lot::Mutex;
use rand_chacha::ChaCha12Rng;

/// Leading letter reserved for fallback suffixes. The digit table never produces it.
pub const FALLBACK_MARKER: char = 'Y';

/// Length of every fallback suffix: marker, three host letters, eight random letters.
pub const FALLBACK_SUFFIX_LEN: usize = 1 + HOST_LETTERS + RANDOM_LETTERS;

const HOST_LETTERS: usize = 3;
const RANDOM_LETTERS: usize = 8;
const RANDOM_SPACE: u64 = 10_000_000_000;

/// A trait that defines the minimum random number generator interface for [`RandomFallback`].
pub trait RandSource {
    /// Returns the next random `u64`.
    fn next_u64(&mut self) -> u64;
}

/// An adapter that implements [`RandSource`] for [`RngCore`](rand::RngCore) types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`](rand::RngCore) type. */ pub T);

impl<T: rand::RngCore> RandSource for Adapter<T> {
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
}

/// The random number generator used unless another one is supplied: ChaCha12 seeded from the
/// operating system.
pub type DefaultRng = Adapter<ChaCha12Rng>;

impl DefaultRng {
    pub(crate) fn from_entropy() -> Self {
        Adapter(rand::SeedableRng::from_entropy())
    }
}

/// Produces fallback suffixes salted with a host key.
///
/// # Examples
///
/// ```rust
/// use dayseq::{RandomFallback, FALLBACK_MARKER};
///
/// let fallback = RandomFallback::with_rand08(rand::thread_rng(), "17");
/// let suffix = fallback.suffix();
/// assert!(suffix.starts_with(FALLBACK_MARKER));
/// assert_eq!(&suffix[1..4], "BHA");
/// ```
#[derive(Debug)]
pub struct RandomFallback<R = DefaultRng> {
    host_letters: [u8; HOST_LETTERS],

    /// Random number generator, shared by all callers of the owning cache.
    rng: Mutex<R>,
}

impl<R: RandSource> RandomFallback<R> {
    /// Creates a generator from a random source and a host key such as the last octet of a
    /// private IPv4 address. An empty key is allowed.
    pub fn new(rng: R, host_key: &str) -> Self {
        Self {
            host_letters: host_letters(host_key),
            rng: Mutex::new(rng),
        }
    }

    /// Returns a fresh suffix of [`FALLBACK_SUFFIX_LEN`] upper-case letters beginning with
    /// [`FALLBACK_MARKER`].
    pub fn suffix(&self) -> String {
        let num = self.rng.lock().next_u64() % RANDOM_SPACE;
        let mut suffix = String::with_capacity(FALLBACK_SUFFIX_LEN);
        suffix.push(FALLBACK_MARKER);
        suffix.extend(self.host_letters.iter().map(|&b| b as char));
        suffix.push_str(&base26_letters(num));
        suffix
    }
}

impl<T: rand::RngCore> RandomFallback<Adapter<T>> {
    /// Creates a generator with a random number generator that implements
    /// [`RngCore`](rand::RngCore) from `rand` (v0.8) crate.
    pub fn with_rand08(rng: T, host_key: &str) -> Self {
        Self::new(Adapter(rng), host_key)
    }
}

impl RandomFallback {
    /// Creates a generator with the default random number generator.
    pub fn from_entropy(host_key: &str) -> Self {
        Self::new(DefaultRng::from_entropy(), host_key)
    }
}

/// Tells whether a suffix came from a fallback generator rather than from the digit table.
pub fn is_fallback_suffix(suffix: &str) -> bool {
    suffix.starts_with(FALLBACK_MARKER)
}

/// Maps each host-key digit `d` to `'A' + d` and pads the result to three letters with `A`.
fn host_letters(host_key: &str) -> [u8; HOST_LETTERS] {
    let mut letters = [b'A'; HOST_LETTERS];
    for (slot, c) in letters.iter_mut().zip(host_key.chars()) {
        if let Some(d) = c.to_digit(10) {
            *slot = b'A' + d as u8;
        }
    }
    letters
}

/// Writes `num` in base 26 with `A` as zero, least significant letter first, padded to eight.
fn base26_letters(mut num: u64) -> String {
    let mut letters = String::with_capacity(RANDOM_LETTERS);
    while num > 0 {
        letters.push((b'A' + (num % 26) as u8) as char);
        num /= 26;
    }
    while letters.len() < RANDOM_LETTERS {
        letters.push('A');
    }
    letters
}

#[cfg(test)]
mod tests {
    use super::{
        base26_letters, host_letters, is_fallback_suffix, RandSource, RandomFallback,
        FALLBACK_MARKER, FALLBACK_SUFFIX_LEN,
    };

    struct Fixed(u64);

    impl RandSource for Fixed {
        fn next_u64(&mut self) -> u64 {
            self.0
        }
    }

    /// Derives host letters from up to three key digits
    #[test]
    fn derives_host_letters_from_up_to_three_key_digits() {
        assert_eq!(&host_letters(""), b"AAA");
        assert_eq!(&host_letters("7"), b"HAA");
        assert_eq!(&host_letters("17"), b"BHA");
        assert_eq!(&host_letters("254"), b"CFE");
        assert_eq!(&host_letters("1234"), b"BCD");
    }

    /// Encodes numbers in little-endian base 26
    #[test]
    fn encodes_numbers_in_little_endian_base_26() {
        assert_eq!(base26_letters(0), "AAAAAAAA");
        assert_eq!(base26_letters(1), "BAAAAAAA");
        assert_eq!(base26_letters(27), "BBAAAAAA");
        assert_eq!(base26_letters(9_999_999_999).len(), 8);
    }

    /// Builds suffixes from marker, host letters, and random letters
    #[test]
    fn builds_suffixes_from_marker_host_letters_and_random_letters() {
        let fallback = RandomFallback::new(Fixed(10_000_000_027), "10");
        assert_eq!(fallback.suffix(), "YBAABBAAAAAA");
        assert_eq!(fallback.suffix().len(), FALLBACK_SUFFIX_LEN);
    }

    /// Always starts with the reserved marker for all random seeds
    #[test]
    fn always_starts_with_the_reserved_marker_for_all_random_seeds() {
        let pattern = regex::Regex::new(r"^Y[A-J]{3}[A-Z]{8}$").unwrap();
        for seed in 0..64u64 {
            let rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(seed);
            let fallback = RandomFallback::with_rand08(rng, "192");
            for _ in 0..256 {
                let suffix = fallback.suffix();
                assert!(pattern.is_match(&suffix), "{}", suffix);
                assert!(is_fallback_suffix(&suffix));
                assert!(suffix.starts_with(FALLBACK_MARKER));
            }
        }
        for edge in [0, u64::MAX] {
            assert!(is_fallback_suffix(&RandomFallback::new(Fixed(edge), "").suffix()));
        }
    }

    /// Differs between calls with the default generator
    #[test]
    fn differs_between_calls_with_the_default_generator() {
        use std::collections::HashSet;
        let fallback = RandomFallback::from_entropy("");
        let s: HashSet<String> = (0..1_000).map(|_| fallback.suffix()).collect();
        assert!(s.len() > 990);
    }
}
