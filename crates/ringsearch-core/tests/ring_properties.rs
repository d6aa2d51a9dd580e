//! Property-based tests for ring construction, partitioning and the wire
//! record.
//!
//! These tests verify for arbitrary sizes:
//! - Partitions are contiguous, disjoint and cover the whole key space
//! - The wired links form exactly one cycle through every unit
//! - Decoding accepts exactly the records whose key number is valid
//! - A running ring reports the planted offset, or nothing

use std::num::NonZeroUsize;

use proptest::prelude::*;
use ringsearch_core::{
    COORDINATOR, EdgeId, Message, Partition, ProtocolError, RECORD_SIZE, Ring, RingConfig,
    Topology,
};
use ringsearch_crypto::{CryptoError, Decryptor, KEY_LENGTH, KeySpace, KeyTester, TrialKey};

/// Plaintext is the key's last byte.
struct LastByte;

impl Decryptor for LastByte {
    type Plaintext = [u8; 1];

    fn decrypt(&self, key: &TrialKey, _ciphertext: &[u8]) -> Result<[u8; 1], CryptoError> {
        Ok([key.as_bytes()[KEY_LENGTH - 1]])
    }
}

fn workers(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

proptest! {
    /// INVARIANT: Partitions tile `[0, key_space)` in worker order.
    #[test]
    fn prop_partitions_tile_key_space(key_space in 0u64..1 << 40, n in 1usize..512) {
        let parts = Partition::split(key_space, workers(n));

        prop_assert_eq!(parts.len(), n);
        prop_assert_eq!(parts[0].start(), 0);
        prop_assert_eq!(parts[n - 1].end(), key_space);
        for pair in parts.windows(2) {
            prop_assert_eq!(pair[0].end(), pair[1].start());
        }

        let total: u64 = parts.iter().map(Partition::len).sum();
        prop_assert_eq!(total, key_space);
    }

    /// INVARIANT: Every offset belongs to exactly one worker.
    #[test]
    fn prop_offset_has_single_owner(
        key_space in 1u64..100_000,
        n in 1usize..64,
        pick in any::<u64>(),
    ) {
        let offset = pick % key_space;
        let owners = Partition::split(key_space, workers(n))
            .iter()
            .filter(|p| p.contains(offset))
            .count();

        prop_assert_eq!(owners, 1);
    }

    /// INVARIANT: Edge `i` leaves unit `i` and enters unit `(i + 1) mod (N + 1)`.
    #[test]
    fn prop_links_form_one_cycle(n in 1usize..256) {
        let topology = Topology::build(&RingConfig::new(workers(n))).unwrap();
        let coordinator = topology.coordinator();

        prop_assert_eq!(coordinator.ordinal, COORDINATOR);
        prop_assert_eq!(coordinator.downstream.edge(), EdgeId(0));
        prop_assert_eq!(coordinator.upstream.edge(), EdgeId(n));

        for (i, unit) in topology.worker_links().iter().enumerate() {
            let ordinal = i + 1;
            prop_assert_eq!(unit.ordinal, ordinal);
            prop_assert_eq!(unit.upstream.edge(), EdgeId(ordinal - 1));
            prop_assert_eq!(unit.downstream.edge(), EdgeId(ordinal));
        }
    }

    /// INVARIANT: A record decodes iff its key number is -1 or non-negative.
    #[test]
    fn prop_decode_validates_key_number(
        key_number in any::<i64>(),
        key in prop::array::uniform32(any::<u8>()),
    ) {
        let mut record = [0u8; RECORD_SIZE];
        record[..8].copy_from_slice(&key_number.to_be_bytes());
        record[8..].copy_from_slice(&key);

        match Message::decode(&record) {
            Ok(Message::NotFound) => prop_assert_eq!(key_number, -1),
            Ok(Message::Found { offset, key: decoded }) => {
                prop_assert_eq!(i64::try_from(offset).ok(), Some(key_number));
                prop_assert_eq!(decoded.as_bytes(), &key);
            },
            Err(e) => {
                prop_assert!(key_number < -1);
                prop_assert_eq!(e, ProtocolError::InvalidKeyNumber(key_number));
            },
        }
    }

    /// INVARIANT: Any buffer that is not exactly one record is rejected.
    #[test]
    fn prop_decode_rejects_wrong_size(len in 0usize..128) {
        prop_assume!(len != RECORD_SIZE);
        let buf = vec![0u8; len];

        prop_assert_eq!(
            Message::decode(&buf),
            Err(ProtocolError::RecordSize { expected: RECORD_SIZE, actual: len })
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// INVARIANT: The coordinator reports the single planted offset, or
    /// "not found" when nothing is planted, for any ring size.
    #[test]
    fn prop_ring_reports_planted_offset(
        size in 0u64..=256,
        n in 1usize..12,
        plant in any::<Option<u8>>(),
    ) {
        let target = plant.map(u64::from).filter(|&offset| offset < size);
        // 0xFF 0xFF never prefixes a one-byte plaintext
        let known = target.map_or_else(|| vec![0xFF, 0xFF], |offset| vec![offset as u8]);

        let space = KeySpace::from_parts([0u8; KEY_LENGTH], size).unwrap();
        let tester = KeyTester::new(space, LastByte, vec![0; 16], known);

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let ring = Ring::new(RingConfig::new(workers(n)), tester);
        let report = runtime.block_on(ring.run()).unwrap();

        prop_assert_eq!(report.offset(), target);
    }
}
