use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SEED_HEX_LEN: usize = 32;

/// Seed for a session's random stream.
///
/// This is a 128-bit (16-byte) seed used to initialize the generator that picks pieces
/// and garbage hole patterns. Its text form is 32 lowercase hex digits, used both for
/// `Display`/`FromStr` and for serialization. Using the same seed replays the same
/// sequence of pieces and garbage.
///
/// # Example
///
/// ```
/// use ojama_engine::{GameSession, SessionConfig, SessionSeed};
/// use rand::Rng as _;
///
/// let seed: SessionSeed = rand::rng().random();
/// let parsed: SessionSeed = seed.to_string().parse().unwrap();
/// assert_eq!(parsed, seed);
///
/// let session1 = GameSession::spawn(SessionConfig::default(), seed);
/// let session2 = GameSession::spawn(SessionConfig::default(), parsed);
/// assert_eq!(session1.active_piece(), session2.active_piece());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionSeed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SeedParseError {
    #[display("invalid seed: expected 32 hex digits, got {actual}")]
    Length { actual: usize },
    #[display("invalid seed: {text:?} is not a hex number")]
    NotHex { text: String },
}

impl SessionSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn as_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Creates the generator this seed stands for.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl fmt::Display for SessionSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.as_u128())
    }
}

impl FromStr for SessionSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != SEED_HEX_LEN {
            return Err(SeedParseError::Length { actual: s.len() });
        }
        // `from_str_radix` accepts a leading sign, which is not part of the text form.
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SeedParseError::NotHex { text: s.to_owned() });
        }
        let num = u128::from_str_radix(s, 16)
            .map_err(|_| SeedParseError::NotHex { text: s.to_owned() })?;
        Ok(Self::from_u128(num))
    }
}

impl Serialize for SessionSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `SessionSeed` values with `rng.random()`.
impl Distribution<SessionSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SessionSeed::from_bytes(seed)
    }
}
