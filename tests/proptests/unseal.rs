//! Property tests for the unseal flow

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use unsealer::{Disposition, SealState};

use crate::common::{coordinator_for, random_key, split_seeded};

/// A seal configuration plus a submission order over its shares
#[derive(Clone, Debug)]
struct Ceremony {
    threshold: u8,
    share_count: u8,
    key_len: usize,
    seed: u64,
    order: Vec<u8>,
}

impl Arbitrary for Ceremony {
    fn arbitrary(g: &mut Gen) -> Self {
        // Keep it small enough that splitting stays fast
        let share_count = (u8::arbitrary(g) % 10) + 1; // 1..=10
        let threshold = (u8::arbitrary(g) % share_count) + 1; // 1..=share_count
        let key_len = usize::from(u8::arbitrary(g) % 64) + 1;

        // Random permutation of 1..=share_count
        let mut order: Vec<u8> = (1..=share_count).collect();
        for i in (1..order.len()).rev() {
            let j = usize::arbitrary(g) % (i + 1);
            order.swap(i, j);
        }

        Ceremony {
            threshold,
            share_count,
            key_len,
            seed: u64::arbitrary(g),
            order,
        }
    }
}

/// Any `threshold` distinct shares, in any order, unseal with the original key
#[quickcheck]
fn prop_any_threshold_subset_unseals(ceremony: Ceremony) -> bool {
    let key = random_key(ceremony.seed, ceremony.key_len);
    let split = split_seeded(ceremony.seed, &key, ceremony.threshold, ceremony.share_count);
    let (coordinator, barrier) = coordinator_for(&split);

    for &x in &ceremony.order[..usize::from(ceremony.threshold)] {
        if coordinator.submit(&split.word_token(x)).is_err() {
            return false;
        }
    }

    coordinator.state() == SealState::Unsealed
        && barrier.installs() == 1
        && barrier.key() == Some(key)
}

/// Progress counts distinct indices only and never reaches the threshold
/// while sealed
#[quickcheck]
fn prop_progress_counts_distinct_shares(ceremony: Ceremony, repeats: Vec<usize>) -> bool {
    let key = random_key(ceremony.seed, ceremony.key_len);
    let split = split_seeded(ceremony.seed, &key, ceremony.threshold, ceremony.share_count);
    let (coordinator, _) = coordinator_for(&split);
    let below = &ceremony.order[..usize::from(ceremony.threshold) - 1];

    let mut expected = 0u8;
    for (i, &x) in below.iter().enumerate() {
        let first = coordinator.submit(&split.binary_token(x)).unwrap();
        expected += 1;
        if first.disposition != Disposition::Accepted || first.status.progress != expected {
            return false;
        }

        // Resubmit an already accepted share
        if let Some(&pick) = repeats.get(i) {
            let again = below[pick % (i + 1)];
            let repeat = coordinator.submit(&split.word_token(again)).unwrap();
            if repeat.disposition != Disposition::Duplicate || repeat.status.progress != expected {
                return false;
            }
        }
    }

    let status = coordinator.status();
    status.sealed && status.progress < status.threshold
}

/// Reset at any point leaves a sealed coordinator that any fresh subset unseals
#[quickcheck]
fn prop_reset_then_reverse_order_unseals(ceremony: Ceremony, cut: usize) -> bool {
    let key = random_key(ceremony.seed, ceremony.key_len);
    let split = split_seeded(ceremony.seed, &key, ceremony.threshold, ceremony.share_count);
    let (coordinator, barrier) = coordinator_for(&split);
    let threshold = usize::from(ceremony.threshold);

    for &x in &ceremony.order[..cut % threshold] {
        coordinator.submit(&split.word_token(x)).unwrap();
    }
    let cleared = coordinator.reset();
    if !cleared.sealed || cleared.progress != 0 {
        return false;
    }

    for &x in ceremony.order.iter().rev().take(threshold) {
        coordinator.submit(&split.word_token(x)).unwrap();
    }
    barrier.key() == Some(key)
}

/// Shares from two different splits never install a key
#[quickcheck]
fn prop_mixed_splits_never_install(ceremony: Ceremony) -> bool {
    if ceremony.threshold < 2 {
        return true;
    }
    let key = random_key(ceremony.seed, ceremony.key_len);
    let split = split_seeded(ceremony.seed, &key, ceremony.threshold, ceremony.share_count);
    let other_key = random_key(ceremony.seed.wrapping_add(1), ceremony.key_len);
    let other = split_seeded(
        ceremony.seed.wrapping_add(1),
        &other_key,
        ceremony.threshold,
        ceremony.share_count,
    );
    let (coordinator, barrier) = coordinator_for(&split);
    let threshold = usize::from(ceremony.threshold);

    for &x in &ceremony.order[..threshold - 1] {
        coordinator.submit(&split.word_token(x)).unwrap();
    }
    let x = ceremony.order[threshold - 1];
    if other.value(x) == split.value(x) {
        // Both splits agree at this point, so the key would come back
        return true;
    }
    let last = other.word_token(x);
    let outcome = coordinator.submit(&last);

    outcome.is_err() && barrier.installs() == 0 && coordinator.status().progress == 0
}
