//! # Hash Chain Math
//!
//! Step functions shared by aggregation and calendar chains, and the
//! binary-counter walk that recovers a calendar chain's registration time.

use ksi_crypto::{hash_many, DataHash, HashAlgorithm};

use crate::domain::errors::{Result, SignatureError};
use crate::domain::value_objects::LinkDirection;

/// Highest level an aggregation tree may reach.
pub const MAX_LEVEL: u64 = 0xFF;

/// Byte appended to every calendar step.
pub const CALENDAR_STEP_TRAILER: u8 = 0xFF;

/// Level after one aggregation link: `level + level_correction + 1`.
pub fn next_level(level: u64, level_correction: u64) -> Result<u64> {
    let next = level
        .checked_add(level_correction)
        .and_then(|l| l.checked_add(1))
        .ok_or(SignatureError::LevelOverflow(u64::MAX))?;
    if next > MAX_LEVEL {
        return Err(SignatureError::LevelOverflow(next));
    }
    Ok(next)
}

/// One aggregation step.
///
/// Left:  `H(current || sibling || level)`
/// Right: `H(sibling || current || level)`
pub fn aggregation_step(
    algorithm: HashAlgorithm,
    direction: LinkDirection,
    current: &DataHash,
    sibling: &[u8],
    level: u64,
) -> Result<DataHash> {
    let current = current.imprint();
    // next_level keeps level within a byte
    let level = [level as u8];
    let hash = match direction {
        LinkDirection::Left => hash_many(algorithm, &[current.as_slice(), sibling, level.as_slice()])?,
        LinkDirection::Right => hash_many(algorithm, &[sibling, current.as_slice(), level.as_slice()])?,
    };
    Ok(hash)
}

/// One calendar step.
///
/// Left hashes `(input, sibling)` with the sibling's algorithm, Right
/// hashes `(sibling, input)` with the input's algorithm.
pub fn calendar_step(
    direction: LinkDirection,
    input: &DataHash,
    sibling: &DataHash,
) -> Result<DataHash> {
    let input_bytes = input.imprint();
    let sibling_bytes = sibling.imprint();
    let trailer = [CALENDAR_STEP_TRAILER];
    let hash = match direction {
        LinkDirection::Left => hash_many(
            sibling.algorithm(),
            &[input_bytes.as_slice(), sibling_bytes.as_slice(), trailer.as_slice()],
        )?,
        LinkDirection::Right => hash_many(
            input.algorithm(),
            &[sibling_bytes.as_slice(), input_bytes.as_slice(), trailer.as_slice()],
        )?,
    };
    Ok(hash)
}

/// Largest power of two not above `n` (`n > 0`).
pub fn highest_power_of_two(n: u64) -> u64 {
    debug_assert!(n > 0);
    1u64 << (63 - n.leading_zeros())
}

/// Registration time implied by a calendar chain's link directions.
///
/// Walks the links from the root down, treating the publication time as
/// the size of the calendar tree.
pub fn registration_time<I>(publication_time: u64, directions: I) -> Result<u64>
where
    I: DoubleEndedIterator<Item = LinkDirection>,
{
    let mut r = publication_time;
    let mut t = 0u64;

    for direction in directions.rev() {
        if r == 0 {
            return Err(SignatureError::InvalidCalendarShape {
                publication_time,
                reason: "too many links",
            });
        }
        let high = highest_power_of_two(r);
        match direction {
            LinkDirection::Left => r = high - 1,
            LinkDirection::Right => {
                t += high;
                r -= high;
            }
        }
    }

    if r != 0 {
        return Err(SignatureError::InvalidCalendarShape {
            publication_time,
            reason: "too few links",
        });
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksi_crypto::hash;
    use LinkDirection::{Left, Right};

    fn make_hash(byte: u8) -> DataHash {
        DataHash::new(HashAlgorithm::Sha2_256, vec![byte; 32]).unwrap()
    }

    #[test]
    fn test_highest_power_of_two() {
        assert_eq!(highest_power_of_two(1), 1);
        assert_eq!(highest_power_of_two(5), 4);
        assert_eq!(highest_power_of_two(8), 8);
        assert_eq!(highest_power_of_two(u64::MAX), 1 << 63);
    }

    #[test]
    fn test_next_level_bounds() {
        assert_eq!(next_level(0, 0).unwrap(), 1);
        assert_eq!(next_level(3, 2).unwrap(), 6);
        assert_eq!(next_level(254, 0).unwrap(), 255);
        assert!(matches!(next_level(255, 0), Err(SignatureError::LevelOverflow(256))));
    }

    #[test]
    fn test_aggregation_step_left_and_right() {
        let current = make_hash(1);
        let sibling = make_hash(2).imprint();

        let left = aggregation_step(HashAlgorithm::Sha2_256, Left, &current, &sibling, 1).unwrap();
        let mut expected = current.imprint();
        expected.extend_from_slice(&sibling);
        expected.push(1);
        assert_eq!(left, hash(HashAlgorithm::Sha2_256, &expected).unwrap());

        let right = aggregation_step(HashAlgorithm::Sha2_256, Right, &current, &sibling, 1).unwrap();
        assert_ne!(left, right);
    }

    #[test]
    fn test_calendar_step_appends_trailer() {
        let input = make_hash(3);
        let sibling = make_hash(4);
        let mut expected = sibling.imprint();
        expected.extend_from_slice(&input.imprint());
        expected.push(0xFF);
        assert_eq!(
            calendar_step(Right, &input, &sibling).unwrap(),
            hash(HashAlgorithm::Sha2_256, &expected).unwrap()
        );
    }

    #[test]
    fn test_calendar_left_uses_sibling_algorithm() {
        let input = make_hash(3);
        let sibling = DataHash::new(HashAlgorithm::Sha2_512, vec![9; 64]).unwrap();
        let out = calendar_step(Left, &input, &sibling).unwrap();
        assert_eq!(out.algorithm(), HashAlgorithm::Sha2_512);
    }

    #[test]
    fn test_registration_time_all_right() {
        // links listed leaf first; the walk starts from the root
        assert_eq!(registration_time(5, [Right, Right].into_iter()).unwrap(), 5);
    }

    #[test]
    fn test_registration_time_mixed() {
        assert_eq!(
            registration_time(5, [Right, Right, Left].into_iter()).unwrap(),
            3
        );
    }

    #[test]
    fn test_registration_time_too_few_links() {
        assert!(matches!(
            registration_time(5, [Right].into_iter()),
            Err(SignatureError::InvalidCalendarShape { reason: "too few links", .. })
        ));
    }

    #[test]
    fn test_registration_time_too_many_links() {
        assert!(matches!(
            registration_time(4, [Left, Right].into_iter()),
            Err(SignatureError::InvalidCalendarShape { reason: "too many links", .. })
        ));
    }
}
