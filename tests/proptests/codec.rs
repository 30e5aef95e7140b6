//! Property tests for share token encodings

use quickcheck::{Arbitrary, Gen, TestResult};
use quickcheck_macros::quickcheck;
use unsealer::codec::{VERSION_WORD, decode_share, encode_binary_share, encode_share};
use unsealer::domain::{ShareIndex, Threshold};

/// Non-empty share value up to 96 bytes
#[derive(Clone, Debug)]
struct ShareValue(Vec<u8>);

impl Arbitrary for ShareValue {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::from(u8::arbitrary(g) % 96) + 1;
        ShareValue((0..len).map(|_| u8::arbitrary(g)).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(
            self.0
                .shrink()
                .filter(|value| !value.is_empty())
                .map(ShareValue),
        )
    }
}

#[quickcheck]
fn prop_word_token_round_trip(value: ShareValue, threshold: u8, index: u8) -> TestResult {
    let (Ok(threshold), Ok(index)) = (Threshold::new(threshold), ShareIndex::new(index)) else {
        return TestResult::discard();
    };

    let token = encode_share(&value.0, threshold, index).unwrap();
    let decoded = decode_share(token.as_str()).unwrap();

    TestResult::from_bool(
        decoded.threshold == Some(threshold)
            && decoded.index == index
            && *decoded.value == value.0,
    )
}

#[quickcheck]
fn prop_word_token_uses_only_wordlist(value: ShareValue) -> bool {
    let wordlist = bip39::Language::English.word_list();
    let token = encode_share(&value.0, Threshold::new(2).unwrap(), ShareIndex::new(7).unwrap())
        .unwrap();
    let mut words = token.as_str().split(' ');

    words.next() == Some(VERSION_WORD) && words.all(|word| wordlist.iter().any(|known| *known == word))
}

#[quickcheck]
fn prop_binary_token_round_trip(value: ShareValue, index: u8) -> TestResult {
    let Ok(index) = ShareIndex::new(index) else {
        return TestResult::discard();
    };

    let decoded = decode_share(encode_binary_share(&value.0, index).as_str()).unwrap();
    TestResult::from_bool(
        decoded.threshold.is_none() && decoded.index == index && *decoded.value == value.0,
    )
}

/// Swapping any one data word for another never yields a different share
#[quickcheck]
fn prop_single_word_substitution_detected(value: ShareValue, position: usize, shift: u16) -> bool {
    let wordlist = bip39::Language::English.word_list();
    let token = encode_share(&value.0, Threshold::new(3).unwrap(), ShareIndex::new(1).unwrap())
        .unwrap();
    let mut words: Vec<&str> = token.as_str().split(' ').collect();

    // Skip the version word and the single parameter word
    let target = 2 + position % (words.len() - 2);
    let current = wordlist
        .iter()
        .position(|word| *word == words[target])
        .unwrap();
    let replacement = (current + 1 + usize::from(shift % 2047)) % 2048;
    words[target] = wordlist[replacement];

    match decode_share(&words.join(" ")) {
        Ok(decoded) => *decoded.value == value.0,
        Err(_) => true,
    }
}
