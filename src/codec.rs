//! Share token wire formats
//!
//! An unseal share arrives as a single opaque token. Two encodings are
//! accepted:
//!
//! - **Word token**: `unseal <parameter words> <data words>`, where every word
//!   comes from the BIP39 English wordlist. The parameter words carry the
//!   threshold and the share index, and the data words carry
//!   `length (2 bytes) || value || CRC32 (4 bytes)`. Easy to read aloud and type
//!   back, and typos are caught by the checksum.
//! - **Binary token**: standard base64 of `index (1 byte) || value`.
//!
//! Decoding errors describe what is wrong with a token but never quote any
//! part of it.
//!
//! # Examples
//!
//! ```rust
//! use unsealer::codec::{decode_share, encode_share};
//! use unsealer::domain::{ShareIndex, Threshold};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = vec![0xDE, 0xAD, 0xBE, 0xEF];
//! let token = encode_share(&value, Threshold::new(3)?, ShareIndex::new(2)?)?;
//! assert!(token.as_str().starts_with("unseal "));
//!
//! let decoded = decode_share(token.as_str())?;
//! assert_eq!(decoded.threshold, Some(Threshold::new(3)?));
//! assert_eq!(*decoded.index, 2);
//! assert_eq!(*decoded.value, value);
//! # Ok(())
//! # }
//! ```

use anyhow::{Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bip39::Language;
use crc::{CRC_32_ISO_HDLC, Crc};
use std::collections::HashMap;
use std::sync::LazyLock;
use zeroize::Zeroizing;

use crate::domain::{ShareIndex, Threshold};

/// CRC32 algorithm for share integrity checking
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Version word that identifies the word token format
pub const VERSION_WORD: &str = "unseal";

/// Bits carried by one BIP39 word
const BITS_PER_WORD: usize = 11;

/// Length prefix plus CRC32 suffix around the share value
const FRAMING_BYTES: usize = 2 + 4;

/// An encoded share token
///
/// Wraps the token in `Zeroizing` so it is wiped when dropped.
#[derive(Clone, PartialEq)]
pub struct ShareToken(Zeroizing<String>);

impl ShareToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ShareToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ShareToken(<redacted>)")
    }
}

/// Components of a decoded share token
pub struct DecodedShare {
    /// Threshold embedded in word tokens; binary tokens carry none
    pub threshold: Option<Threshold>,
    pub index: ShareIndex,
    pub value: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for DecodedShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedShare")
            .field("threshold", &self.threshold)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Static `HashMap` for O(1) word-to-index lookups
static WORD_TO_INDEX_MAP: LazyLock<HashMap<&'static str, u16>> = LazyLock::new(|| {
    Language::English
        .word_list()
        .iter()
        .zip(0u16..)
        .map(|(&word, idx)| (word, idx))
        .collect()
});

/// Encodes a share as a word token
///
/// # Errors
/// Returns an error if the value is empty or longer than 65535 bytes
pub fn encode_share(value: &[u8], threshold: Threshold, index: ShareIndex) -> Result<ShareToken> {
    if value.is_empty() {
        bail!("Share value is empty");
    }
    let length = u16::try_from(value.len())
        .map_err(|_| anyhow!("Share value too large: {} bytes (max 65535)", value.len()))?;

    let mut framed = Zeroizing::new(Vec::with_capacity(value.len() + FRAMING_BYTES));
    framed.extend_from_slice(&length.to_be_bytes());
    framed.extend_from_slice(value);
    framed.extend_from_slice(&CRC32.checksum(value).to_be_bytes());

    let mut words = vec![VERSION_WORD];
    words.extend(encode_parameters(threshold, index).into_iter().map(word_at));
    words.extend(pack_words(&framed).into_iter().map(word_at));

    Ok(ShareToken(Zeroizing::new(words.join(" "))))
}

/// Encodes a share as a binary (base64) token
#[must_use]
pub fn encode_binary_share(value: &[u8], index: ShareIndex) -> ShareToken {
    let mut raw = Zeroizing::new(Vec::with_capacity(value.len() + 1));
    raw.push(*index);
    raw.extend_from_slice(value);
    ShareToken(Zeroizing::new(STANDARD.encode(raw.as_slice())))
}

/// Decodes either token format
///
/// Surrounding whitespace is ignored and words match case-insensitively.
///
/// # Errors
/// Returns an error if the token is in neither format, its parameters are
/// invalid, or its checksum does not match
pub fn decode_share(token: &str) -> Result<DecodedShare> {
    let token = token.trim();
    if token.is_empty() {
        bail!("Empty share token");
    }

    let is_word_token = token
        .split_whitespace()
        .next()
        .is_some_and(|first| first.eq_ignore_ascii_case(VERSION_WORD));

    if is_word_token {
        decode_word_share(token)
    } else {
        decode_binary_share(token)
    }
}

fn decode_binary_share(token: &str) -> Result<DecodedShare> {
    let raw = Zeroizing::new(
        STANDARD
            .decode(token)
            .map_err(|_| anyhow!("Share token is neither a word token nor valid base64"))?,
    );
    let Some((&index, value)) = raw.split_first() else {
        bail!("Binary share token is empty");
    };
    if value.is_empty() {
        bail!("Binary share token carries no share value");
    }
    Ok(DecodedShare {
        threshold: None,
        index: ShareIndex::new(index)?,
        value: Zeroizing::new(value.to_vec()),
    })
}

fn decode_word_share(token: &str) -> Result<DecodedShare> {
    let indices = Zeroizing::new(
        token
            .split_whitespace()
            .skip(1)
            .map(word_index)
            .collect::<Result<Vec<u16>>>()?,
    );

    let Some(&first) = indices.first() else {
        bail!("Share token too short: missing parameter words");
    };
    let parameter_words = if continues(first) { 2 } else { 1 };
    if indices.len() <= parameter_words {
        bail!("Share token too short: missing data words");
    }

    let (threshold, index) = decode_parameters(&indices[..parameter_words])?;
    let framed = unpack_words(&indices[parameter_words..])?;
    let value = unframe(&framed)?;

    Ok(DecodedShare {
        threshold: Some(threshold),
        index,
        value,
    })
}

fn continues(word: u16) -> bool {
    (word >> 10) & 1 == 1
}

/// Encodes threshold (M) and share index (O) into parameter word indices
///
/// Each word is `[continuation (1)][M bits (5)][O bits (5)]`; values of 32 or
/// more use a second word for the high bits.
fn encode_parameters(threshold: Threshold, index: ShareIndex) -> Vec<u16> {
    let m = u16::from(*threshold);
    let o = u16::from(*index);

    if m >= 32 || o >= 32 {
        vec![
            (1 << 10) | ((m >> 5) << 5) | (o >> 5),
            ((m & 0b11111) << 5) | (o & 0b11111),
        ]
    } else {
        vec![(m << 5) | o]
    }
}

fn decode_parameters(words: &[u16]) -> Result<(Threshold, ShareIndex)> {
    let (m, o) = match *words {
        [single] => ((single >> 5) & 0b11111, single & 0b11111),
        [high, low] => {
            if continues(low) {
                bail!("Second parameter word has continuation bit set");
            }
            (
                (((high >> 5) & 0b11111) << 5) | ((low >> 5) & 0b11111),
                ((high & 0b11111) << 5) | (low & 0b11111),
            )
        }
        _ => bail!("Invalid parameter word count"),
    };

    let m = u8::try_from(m).map_err(|_| anyhow!("Embedded threshold exceeds 255"))?;
    let o = u8::try_from(o).map_err(|_| anyhow!("Embedded share index exceeds 255"))?;
    Ok((Threshold::new(m)?, ShareIndex::new(o)?))
}

/// Packs bytes into 11-bit word indices, left-padding with zero bits
fn pack_words(data: &[u8]) -> Vec<u16> {
    let bit_count = data.len() * 8;
    let padding = (BITS_PER_WORD - bit_count % BITS_PER_WORD) % BITS_PER_WORD;

    let mut words = Vec::with_capacity((bit_count + padding) / BITS_PER_WORD);
    let mut buffer: u16 = 0;
    let mut filled = padding;

    for &byte in data {
        for bit_pos in (0..8).rev() {
            buffer = (buffer << 1) | u16::from((byte >> bit_pos) & 1);
            filled += 1;
            if filled == BITS_PER_WORD {
                words.push(buffer);
                buffer = 0;
                filled = 0;
            }
        }
    }

    words
}

/// Unpacks 11-bit word indices to bytes, dropping the left padding
///
/// The encoder pads with fewer than 11 bits, so the byte count is ambiguous
/// when the padding could also hold one whole zero byte; the length prefix
/// settles it in [`unframe`].
fn unpack_words(words: &[u16]) -> Result<Zeroizing<Vec<u8>>> {
    let total_bits = words.len() * BITS_PER_WORD;
    let byte_count = total_bits / 8;
    let padding = total_bits % 8;

    let mut bytes = Zeroizing::new(Vec::with_capacity(byte_count));
    let mut buffer: u8 = 0;
    let mut filled = 0;
    let mut skipped = 0;

    for &word in words {
        for bit_pos in (0..BITS_PER_WORD).rev() {
            let bit = u8::from((word >> bit_pos) & 1 == 1);
            if skipped < padding {
                if bit != 0 {
                    bail!("Share token has non-zero padding bits");
                }
                skipped += 1;
                continue;
            }
            buffer = (buffer << 1) | bit;
            filled += 1;
            if filled == 8 {
                bytes.push(buffer);
                buffer = 0;
                filled = 0;
            }
        }
    }

    Ok(bytes)
}

/// Strips `length || value || crc32` framing and verifies the checksum
fn unframe(framed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let body = match framed {
        [0, rest @ ..] if declared_len(rest) == Some(rest.len()) => rest,
        _ if declared_len(framed) == Some(framed.len()) => framed,
        _ => bail!("Share token length does not match its data"),
    };

    let value_end = body.len() - 4;
    let value = &body[2..value_end];
    let stored = u32::from_be_bytes([
        body[value_end],
        body[value_end + 1],
        body[value_end + 2],
        body[value_end + 3],
    ]);

    if CRC32.checksum(value) != stored {
        bail!("Share token checksum verification failed");
    }

    Ok(Zeroizing::new(value.to_vec()))
}

/// Total framed length declared by a length prefix, if one is present
fn declared_len(framed: &[u8]) -> Option<usize> {
    match framed {
        [hi, lo, ..] => Some(usize::from(u16::from_be_bytes([*hi, *lo])) + FRAMING_BYTES),
        _ => None,
    }
}

fn word_index(word: &str) -> Result<u16> {
    let lower = Zeroizing::new(word.to_lowercase());
    WORD_TO_INDEX_MAP
        .get(lower.as_str())
        .copied()
        .ok_or_else(|| anyhow!("Share token contains a word outside the BIP39 wordlist"))
}

fn word_at(index: u16) -> &'static str {
    // Callers only produce 11-bit indices
    Language::English.word_list()[usize::from(index & 0x7ff)]
}
