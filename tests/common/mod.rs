//! Test dealer: splits keys the way the seal ceremony would, so unseal paths
//! can be exercised with real shares.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use unsealer::codec::{encode_binary_share, encode_share};
use unsealer::domain::{ShareCount, ShareIndex, Threshold};
use unsealer::field::Gf256;
use unsealer::key::MasterKey;
use unsealer::{Barrier, Coordinator, KeySlot, SealConfig};

/// A split master key: share `x` is `values[x - 1]`
pub struct Split {
    pub key: Vec<u8>,
    pub config: SealConfig,
    values: Vec<Vec<u8>>,
}

impl Split {
    pub fn value(&self, x: u8) -> &[u8] {
        &self.values[usize::from(x) - 1]
    }

    pub fn word_token(&self, x: u8) -> String {
        encode_share(
            self.value(x),
            self.config.threshold(),
            ShareIndex::new(x).unwrap(),
        )
        .unwrap()
        .as_str()
        .to_string()
    }

    pub fn binary_token(&self, x: u8) -> String {
        encode_binary_share(self.value(x), ShareIndex::new(x).unwrap())
            .as_str()
            .to_string()
    }
}

/// Splits `key` into `count` shares with threshold `threshold`
pub fn split_with(rng: &mut impl Rng, key: &[u8], threshold: u8, count: u8) -> Split {
    let polynomials: Vec<Vec<Gf256>> = key
        .iter()
        .map(|&byte| {
            let mut coefficients = vec![Gf256::new(byte)];
            coefficients.extend((1..threshold).map(|_| Gf256::new(rng.r#gen())));
            coefficients
        })
        .collect();

    let values = (1..=count)
        .map(|x| {
            polynomials
                .iter()
                .map(|poly| Gf256::evaluate(poly, Gf256::new(x)).value())
                .collect()
        })
        .collect();

    Split {
        key: key.to_vec(),
        config: SealConfig::for_key(
            Threshold::new(threshold).unwrap(),
            ShareCount::new(count).unwrap(),
            key,
        )
        .unwrap(),
        values,
    }
}

pub fn split_seeded(seed: u64, key: &[u8], threshold: u8, count: u8) -> Split {
    split_with(&mut StdRng::seed_from_u64(seed), key, threshold, count)
}

pub fn random_key(seed: u64, len: usize) -> Vec<u8> {
    let mut key = vec![0u8; len];
    StdRng::seed_from_u64(seed ^ 0x6b65_795f_7365_6564).fill_bytes(&mut key);
    key
}

/// Barrier that counts installations and keeps the last key
#[derive(Clone, Default)]
pub struct RecordingBarrier {
    installs: Arc<AtomicUsize>,
    slot: Arc<KeySlot>,
}

impl RecordingBarrier {
    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn key(&self) -> Option<Vec<u8>> {
        self.slot.with_key(|key| key.as_bytes().to_vec())
    }
}

impl Barrier for RecordingBarrier {
    fn install(&self, key: MasterKey) {
        self.installs.fetch_add(1, Ordering::SeqCst);
        self.slot.install(key);
    }
}

pub fn coordinator_for(split: &Split) -> (Coordinator, RecordingBarrier) {
    let barrier = RecordingBarrier::default();
    (
        Coordinator::new(split.config.clone(), barrier.clone()),
        barrier,
    )
}
