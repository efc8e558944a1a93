use core::{fmt, num::ParseIntError, str::FromStr, time::Duration};

use crate::DecodedUid;

/// A 64-bit Snowflake-style ID.
///
/// - 42 bits timestamp (ms since the generator's epoch)
/// - 10 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63             22 21             12 11             0
///              +----------------+-----------------+---------------+
///  Field:      | timestamp (42) | worker ID (10)  | sequence (12) |
///              +----------------+-----------------+---------------+
///              |<----- MSB ---------- 64 bits --------- LSB ----->|
/// ```
///
/// Ordering on the raw value is ordering by timestamp, then worker, then
/// sequence.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnowflakeUid {
    id: u64,
}

impl SnowflakeUid {
    /// Width of the sequence field.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Width of the worker ID field.
    pub const WORKER_ID_BITS: u32 = 10;

    /// Width of the timestamp field.
    pub const TIMESTAMP_BITS: u32 = 64 - Self::TIMESTAMP_SHIFT;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Bitmask for the 10-bit worker ID field. Occupies bits 12 through 21.
    pub const WORKER_ID_MASK: u64 = (1 << Self::WORKER_ID_BITS) - 1;

    /// Bitmask for the 42-bit timestamp field. Occupies bits 22 through 63.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Number of bits to shift the worker ID to its position (bit 12).
    pub const WORKER_ID_SHIFT: u32 = Self::SEQUENCE_BITS;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u32 = Self::SEQUENCE_BITS + Self::WORKER_ID_BITS;

    /// Packs the three fields. Out-of-range values are truncated to their
    /// field width.
    pub const fn from_components(timestamp: u64, worker_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = sequence & Self::SEQUENCE_MASK;
        Self {
            id: timestamp | worker_id | sequence,
        }
    }

    /// Packs a generator time-sequence (`elapsed_ms << 12 | seq`) with a
    /// worker ID.
    pub(crate) const fn from_time_sequence(time_sequence: u64, worker_id: u64) -> Self {
        Self::from_components(
            time_sequence >> Self::SEQUENCE_BITS,
            worker_id,
            time_sequence & Self::SEQUENCE_MASK,
        )
    }

    /// Wraps a raw value without validation. Every `u64` is a well-formed ID.
    pub const fn from_raw(id: u64) -> Self {
        Self { id }
    }

    /// The raw packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Milliseconds since the generator's epoch.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the worker ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> u64 {
        self.id & Self::SEQUENCE_MASK
    }

    /// Splits the ID into its fields, converting the timestamp to
    /// milliseconds since the Unix epoch using `epoch`.
    ///
    /// Pure and infallible; use the same epoch the ID was generated with.
    pub const fn decode(&self, epoch: Duration) -> DecodedUid {
        DecodedUid {
            timestamp_millis: self.timestamp() + epoch.as_millis() as u64,
            worker_id: self.worker_id(),
            sequence: self.sequence(),
        }
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<u64> for SnowflakeUid {
    fn from(id: u64) -> Self {
        Self::from_raw(id)
    }
}

impl From<SnowflakeUid> for u64 {
    fn from(id: SnowflakeUid) -> Self {
        id.to_raw()
    }
}

impl FromStr for SnowflakeUid {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self::from_raw)
    }
}

impl fmt::Display for SnowflakeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SnowflakeUid {{")?;
        writeln!(f, "    raw id     : 0x{:016x} ({})", self.id, self.id)?;
        writeln!(f, "    padded     : {}", self.to_padded_string())?;
        writeln!(f, "    layout     :")?;
        writeln!(
            f,
            "        timestamp ({:>2}) : {} (0x{:x})",
            Self::TIMESTAMP_BITS,
            self.timestamp(),
            self.timestamp()
        )?;
        writeln!(
            f,
            "        worker ID ({:>2}) : {} (0x{:x})",
            Self::WORKER_ID_BITS,
            self.worker_id(),
            self.worker_id()
        )?;
        writeln!(
            f,
            "        sequence  ({:>2}) : {} (0x{:x})",
            Self::SEQUENCE_BITS,
            self.sequence(),
            self.sequence()
        )?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EPOCH_2017_UTC;

    #[test]
    fn packs_fields_at_documented_offsets() {
        let id = SnowflakeUid::from_components(1, 1, 1);
        assert_eq!(id.to_raw(), (1 << 22) | (1 << 12) | 1);
    }

    #[test]
    fn field_masks_are_full_width() {
        let id = SnowflakeUid::from_raw(u64::MAX);
        assert_eq!(id.timestamp(), SnowflakeUid::TIMESTAMP_MASK);
        assert_eq!(id.worker_id(), 1023);
        assert_eq!(id.sequence(), 4095);
    }

    #[test]
    fn oversized_components_are_truncated() {
        let id = SnowflakeUid::from_components(7, 1024 + 5, 4096 + 9);
        assert_eq!(id.timestamp(), 7);
        assert_eq!(id.worker_id(), 5);
        assert_eq!(id.sequence(), 9);
    }

    #[test]
    fn time_sequence_packing_moves_millis_above_worker() {
        let time_sequence = (123 << 12) | 45;
        let id = SnowflakeUid::from_time_sequence(time_sequence, 678);
        assert_eq!(id.timestamp(), 123);
        assert_eq!(id.worker_id(), 678);
        assert_eq!(id.sequence(), 45);
    }

    #[test]
    fn sequence_carry_lands_in_timestamp() {
        let time_sequence = (123 << 12) | SnowflakeUid::SEQUENCE_MASK;
        let id = SnowflakeUid::from_time_sequence(time_sequence + 1, 3);
        assert_eq!(id.timestamp(), 124);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn decode_adds_epoch() {
        let id = SnowflakeUid::from_components(1_000, 9, 10);
        let decoded = id.decode(EPOCH_2017_UTC);
        assert_eq!(decoded.timestamp_millis, 1_483_228_801_000);
        assert_eq!(decoded.worker_id, 9);
        assert_eq!(decoded.sequence, 10);
    }

    #[test]
    fn ordering_follows_timestamp_first() {
        let earlier = SnowflakeUid::from_components(10, 1023, 4095);
        let later = SnowflakeUid::from_components(11, 0, 0);
        assert!(earlier < later);
    }

    #[test]
    fn parses_and_displays_decimal() {
        let id: SnowflakeUid = " 4198401 ".parse().unwrap();
        assert_eq!(id, SnowflakeUid::from_components(1, 1, 1));
        assert_eq!(id.to_string(), "4198401");
        assert_eq!(id.to_padded_string(), "00000000000004198401");
        assert!("-1".parse::<SnowflakeUid>().is_err());
    }

    #[test]
    fn debug_shows_layout() {
        let rendered = format!("{:?}", SnowflakeUid::from_components(2, 3, 4));
        assert!(rendered.contains("worker ID (10) : 3"));
        assert!(rendered.contains("sequence  (12) : 4"));
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn serializes_as_native_integer() {
        let id = SnowflakeUid::from_components(1, 1, 1);
        assert_eq!(serde_json::to_string(&id).unwrap(), "4198401");
        assert_eq!(serde_json::from_str::<SnowflakeUid>("4198401").unwrap(), id);
    }

    #[test]
    fn decoded_serializes_fields() {
        let decoded = SnowflakeUid::from_components(5, 6, 7).decode(Duration::ZERO);
        let json = serde_json::to_value(decoded).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "timestamp_millis": 5, "worker_id": 6, "sequence": 7 })
        );
    }
}
