//! # DigitalProductId Decoder
//!
//! Turns the obfuscated registry blob into a dash-formatted product key.
//!
//! The blob stores the key as a 15-byte big-endian integer at bytes 52..=66,
//! read out as 25 base-24 digits through the character set below. Byte 66
//! doubles as a layout flag: on the Windows-8+ layout an `N` marker digit is
//! re-inserted after extraction. The function is pure and deterministic; the
//! only failure is an undersized blob.

use keyscout_common::error::SourceError;

/// Digits and easily-confused letters are excluded from product keys.
const KEY_ALPHABET: &[u8; 24] = b"BCDFGHJKMPQRTVWXY2346789";

/// Byte offset of the encoded key integer inside the blob.
const KEY_OFFSET: usize = 52;
/// Width of the encoded key integer.
const KEY_WINDOW: usize = 15;
/// Byte carrying the modern-layout flag (also the integer's top byte).
const LAYOUT_FLAG_INDEX: usize = 66;
/// Shortest blob that contains the full decode window and flag byte.
const BLOB_MIN_LEN: usize = 67;

/// Decodes a `DigitalProductId` blob into a product key string such as
/// `VK7JG-NPHTM-C97JM-9MPGT-3V66T`.
///
/// Fails only with [`SourceError::MalformedBlob`] when the blob is shorter
/// than 67 bytes. The input is never modified; extraction works on a local
/// copy of the key window.
pub fn decode_digital_product_id(blob: &[u8]) -> Result<String, SourceError> {
    if blob.len() < BLOB_MIN_LEN {
        return Err(SourceError::MalformedBlob(blob.len()));
    }

    let mut window = [0u8; KEY_WINDOW];
    window.copy_from_slice(&blob[KEY_OFFSET..KEY_OFFSET + KEY_WINDOW]);

    // Bit 1 of flag/6 distinguishes the Windows-8+ layout from the legacy one.
    let is_modern = (blob[LAYOUT_FLAG_INDEX] / 6) & 1;
    // The flag bits do not belong to the key integer; mask them out of the
    // local copy before division. Stored registry state is untouched.
    window[KEY_WINDOW - 1] = (window[KEY_WINDOW - 1] & 0xF7) | ((is_modern & 2) * 4);

    // Repeated division by 24 yields digits least-significant first; pushing
    // then reversing gives the most significant digit at the front.
    let mut chars: Vec<u8> = Vec::with_capacity(26);
    let mut last_rem: u32 = 0;
    for _ in 0..25 {
        let mut cur: u32 = 0;
        for x in (0..KEY_WINDOW).rev() {
            cur = cur * 256 + u32::from(window[x]);
            window[x] = (cur / 24) as u8;
            cur %= 24;
        }
        chars.push(KEY_ALPHABET[cur as usize]);
        last_rem = cur;
    }
    chars.reverse();

    // The modern layout drops the N digit during encoding; the remainder of
    // the final division says where it goes.
    if is_modern == 1 {
        chars.insert(last_rem as usize + 1, b'N');
    }

    // The leading character is a parity artifact of the computation.
    let key = &chars[1..];

    let mut out = String::with_capacity(key.len() + key.len() / 5);
    for (i, &c) in key.iter().enumerate() {
        if i > 0 && i % 5 == 0 {
            out.push('-');
        }
        out.push(c as char);
    }
    Ok(out)
}
