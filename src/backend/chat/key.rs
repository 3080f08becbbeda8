/**
 * Conversation Key Derivation
 *
 * Direct conversations have no stored identity of their own: their id is
 * derived from the two participant ids. Each id is read as 32 base-36 digits
 * laid out as 8-4-4-4-12 groups, the digits are added position by position
 * modulo 36, and the sums are written back in the same layout.
 *
 * Addition is commutative, so `derive(a, b) == derive(b, a)`, and
 * `derive(a, a)` is well defined for self-chat.
 *
 * Inputs that do not have that exact shape are rejected instead of being
 * mixed into a garbage id.
 */

use thiserror::Error;
use uuid::Uuid;

use crate::shared::messaging::ConversationId;

/// Digit alphabet, index = digit value
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Lengths of the hyphen-separated groups
const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// Total length including the four hyphens
const ID_LENGTH: usize = 36;

/// Why an id could not be used for derivation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("id must be 36 characters, got {0}")]
    Length(usize),
    #[error("id must use 8-4-4-4-12 groups separated by '-'")]
    Layout,
    #[error("id contains invalid character {0:?}")]
    Character(char),
}

/// Derive the conversation id shared by two users
///
/// # Arguments
///
/// * `id_a`, `id_b` - UUID-shaped ids over `0-9a-z` (ASCII case-insensitive)
///
/// # Errors
///
/// `KeyError` if either id is malformed.
pub fn derive(id_a: &str, id_b: &str) -> Result<ConversationId, KeyError> {
    Ok(combine(&digits(id_a)?, &digits(id_b)?))
}

/// Derive the conversation id for two user ids
///
/// Hyphenated UUIDs always have the expected layout, so this cannot fail.
pub fn derive_for_users(a: Uuid, b: Uuid) -> ConversationId {
    let mut buf_a = Uuid::encode_buffer();
    let mut buf_b = Uuid::encode_buffer();
    let a = hex_digits(a.hyphenated().encode_lower(&mut buf_a));
    let b = hex_digits(b.hyphenated().encode_lower(&mut buf_b));
    combine(&a, &b)
}

/// Add digit-wise modulo 36 and lay the result out as 8-4-4-4-12
fn combine(a: &[u8; 32], b: &[u8; 32]) -> ConversationId {
    let mut out = String::with_capacity(ID_LENGTH);
    let mut position = 0;
    for (index, len) in GROUPS.iter().enumerate() {
        if index > 0 {
            out.push('-');
        }
        for _ in 0..*len {
            let sum = (a[position] + b[position]) % 36;
            out.push(char::from(ALPHABET[usize::from(sum)]));
            position += 1;
        }
    }
    ConversationId::new(out)
}

/// Digits of an already-lowercased hyphenated UUID
fn hex_digits(id: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (slot, byte) in out.iter_mut().zip(id.bytes().filter(|b| *b != b'-')) {
        *slot = digit_value(byte).unwrap_or(0);
    }
    out
}

/// Validate the layout of `id` and return its 32 digit values
fn digits(id: &str) -> Result<[u8; 32], KeyError> {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() != ID_LENGTH {
        return Err(KeyError::Length(chars.len()));
    }

    let mut out = [0u8; 32];
    let mut position = 0;
    let mut cursor = 0;
    for (index, len) in GROUPS.iter().enumerate() {
        if index > 0 {
            if chars[cursor] != '-' {
                return Err(KeyError::Layout);
            }
            cursor += 1;
        }
        for _ in 0..*len {
            let c = chars[cursor];
            if c == '-' {
                return Err(KeyError::Layout);
            }
            let value = u8::try_from(c)
                .ok()
                .and_then(|byte| digit_value(byte.to_ascii_lowercase()))
                .ok_or(KeyError::Character(c))?;
            out[position] = value;
            position += 1;
            cursor += 1;
        }
    }
    Ok(out)
}

fn digit_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'z' => Some(byte - b'a' + 10),
        _ => None,
    }
}
