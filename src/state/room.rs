//! Identity and value types shared by the room coordinator.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of random bytes behind a room code (rendered as uppercase hex).
const ROOM_CODE_BYTES: usize = 3;

/// Opaque member identifier handed over by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Wrap an identifier resolved by the identity collaborator.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when a room code cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid room code `{0}`: expected {len} hexadecimal characters", len = ROOM_CODE_BYTES * 2)]
pub struct InvalidRoomCode(pub String);

/// Short, human-typeable room code. Always stored uppercase so lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Draw a fresh random code. Uniqueness is enforced by the store.
    pub fn generate() -> Self {
        let bytes: [u8; ROOM_CODE_BYTES] = rand::rng().random();
        Self(bytes.iter().map(|byte| format!("{byte:02X}")).collect())
    }

    /// Normalise user input into a code, accepting any letter case.
    pub fn parse(input: &str) -> Result<Self, InvalidRoomCode> {
        let trimmed = input.trim();
        if trimmed.len() != ROOM_CODE_BYTES * 2 || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidRoomCode(input.to_owned()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Borrow the normalised code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point values a member may pick, in deck order.
pub const POINT_VALUES: [u32; 10] = [1, 2, 3, 5, 8, 13, 21, 34, 55, 89];
/// Marker for "no idea".
pub const UNKNOWN_MARKER: &str = "?";

/// Error returned for a card that is not part of the deck.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid vote value `{0}`")]
pub struct InvalidVoteValue(pub String);

/// A single card from the fixed estimation deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum VoteValue {
    /// Numeric estimate drawn from [`POINT_VALUES`].
    Points(u32),
    /// The "unknown" card; excluded from statistics.
    Unknown,
}

impl VoteValue {
    /// Parse a card label such as `"8"` or `"?"`.
    pub fn parse(input: &str) -> Result<Self, InvalidVoteValue> {
        if input == UNKNOWN_MARKER {
            return Ok(VoteValue::Unknown);
        }

        POINT_VALUES
            .iter()
            .copied()
            .find(|points| points.to_string() == input)
            .map(VoteValue::Points)
            .ok_or_else(|| InvalidVoteValue(input.to_owned()))
    }

    /// Numeric value, or `None` for the unknown card.
    pub fn points(self) -> Option<u32> {
        match self {
            VoteValue::Points(points) => Some(points),
            VoteValue::Unknown => None,
        }
    }
}

impl From<VoteValue> for String {
    fn from(value: VoteValue) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VoteValue::parse(&value)
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteValue::Points(points) => write!(f, "{points}"),
            VoteValue::Unknown => f.write_str(UNKNOWN_MARKER),
        }
    }
}
