// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Keyboard input decoding from raw VT100 bytes.
//!
//! [`decode_key`] is stateless: it looks at a window of bytes and either carves one
//! logical [`Key`] off the front, or reports that the window is the beginning of an
//! escape sequence that hasn't fully arrived yet. Bytes that span reads are kept by the
//! caller in a [`crate::RemainderBuffer`] and decoded again once more input arrives.
//!
//! ## Recognition rules (in priority order)
//!
//! 1. Any byte other than `ESC` is itself the key (printable ASCII, `\r`, `0x7F`, ...).
//! 2. `ESC [ A|B|C|D` → [`Key::Up`] / [`Key::Down`] / [`Key::Right`] / [`Key::Left`].
//! 3. `ESC [ 1 ; 3 C|D` → [`Key::AltRight`] / [`Key::AltLeft`].
//! 4. Anything else starting with `ESC` runs up to (and including) the first ASCII letter
//!    and is reported as [`Key::Unknown`]. There is no general way to find the end of an
//!    unrecognized sequence, but `[a-zA-Z]` only shows up as a final byte. When there is
//!    no letter in the window yet, the sequence is incomplete.

use super::{ALT_ARROW_PARAMS, ARROW_DOWN_FINAL, ARROW_LEFT_FINAL, ARROW_RIGHT_FINAL,
            ARROW_UP_FINAL, CSI_BRACKET, KEY_ESCAPE, PRINTABLE_END, PRINTABLE_START};

/// One logical key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any single byte that isn't the escape lead byte. Control keys are matched against
    /// the constants in [`crate::ansi::constants`], eg: [`crate::KEY_ENTER`].
    Byte(u8),
    Up,
    Down,
    Right,
    Left,
    AltRight,
    AltLeft,
    /// A complete escape sequence that isn't in the fixed VT100 set.
    Unknown,
}

impl Key {
    /// `true` for printable ASCII (space through `~`).
    #[must_use]
    pub fn is_printable(&self) -> bool {
        matches!(self, Key::Byte(byte) if (PRINTABLE_START..PRINTABLE_END).contains(byte))
    }
}

/// Try to decode one key from the front of `input`.
///
/// - `(Some(key), rest)` when a key was recognized. `rest` is everything after it.
/// - `(None, input)` when `input` is an incomplete escape sequence; the caller has to
///   append more bytes and try again.
/// - `(None, &[])` when `input` is empty.
#[must_use]
pub fn decode_key(input: &[u8]) -> (Option<Key>, &[u8]) {
    let Some((&first, _)) = input.split_first() else {
        return (None, &[]);
    };

    if first != KEY_ESCAPE {
        return (Some(Key::Byte(first)), &input[1..]);
    }

    if let [KEY_ESCAPE, CSI_BRACKET, final_byte, rest @ ..] = input {
        let maybe_arrow = match *final_byte {
            ARROW_UP_FINAL => Some(Key::Up),
            ARROW_DOWN_FINAL => Some(Key::Down),
            ARROW_RIGHT_FINAL => Some(Key::Right),
            ARROW_LEFT_FINAL => Some(Key::Left),
            _ => None,
        };
        if let Some(key) = maybe_arrow {
            return (Some(key), rest);
        }
    }

    if let [KEY_ESCAPE, CSI_BRACKET, p0, p1, p2, final_byte, rest @ ..] = input
        && [*p0, *p1, *p2] == ALT_ARROW_PARAMS
    {
        match *final_byte {
            ARROW_RIGHT_FINAL => return (Some(Key::AltRight), rest),
            ARROW_LEFT_FINAL => return (Some(Key::AltLeft), rest),
            _ => {}
        }
    }

    match input.iter().position(u8::is_ascii_alphabetic) {
        Some(index) => (Some(Key::Unknown), &input[index + 1..]),
        None => (None, input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KEY_BACKSPACE, KEY_CTRL_C, KEY_ENTER};
    use test_case::test_case;

    /// Decode everything that can be decoded, returning the keys and what's left over.
    fn decode_all(mut input: &[u8]) -> (Vec<Key>, Vec<u8>) {
        let mut keys = vec![];
        loop {
            match decode_key(input) {
                (Some(key), rest) => {
                    keys.push(key);
                    input = rest;
                }
                (None, rest) => return (keys, rest.to_vec()),
            }
        }
    }

    #[test_case(b"a", Key::Byte(b'a') ; "printable")]
    #[test_case(b"\r", Key::Byte(KEY_ENTER) ; "enter")]
    #[test_case(b"\x7f", Key::Byte(KEY_BACKSPACE) ; "backspace")]
    #[test_case(b"\x03", Key::Byte(KEY_CTRL_C) ; "ctrl c")]
    #[test_case(b"\x1b[A", Key::Up ; "up")]
    #[test_case(b"\x1b[B", Key::Down ; "down")]
    #[test_case(b"\x1b[C", Key::Right ; "right")]
    #[test_case(b"\x1b[D", Key::Left ; "left")]
    #[test_case(b"\x1b[1;3C", Key::AltRight ; "alt right")]
    #[test_case(b"\x1b[1;3D", Key::AltLeft ; "alt left")]
    #[test_case(b"\x1b[1;5C", Key::Unknown ; "ctrl right is unknown")]
    #[test_case(b"\x1b[3~x", Key::Unknown ; "delete runs to first letter")]
    fn test_decode_single_key(input: &[u8], expected: Key) {
        let (key, _) = decode_key(input);
        assert_eq!(key, Some(expected));
    }

    #[test]
    fn test_decode_returns_rest() {
        let (key, rest) = decode_key(b"\x1b[Aabc");
        assert_eq!(key, Some(Key::Up));
        assert_eq!(rest, b"abc");

        let (key, rest) = decode_key(b"\x1b[1;3Dz");
        assert_eq!(key, Some(Key::AltLeft));
        assert_eq!(rest, b"z");
    }

    #[test]
    fn test_unknown_sequence_consumes_through_letter() {
        // Delete key: ESC [ 3 ~ has no letter, so the scan runs on to the 'x'.
        let (key, rest) = decode_key(b"\x1b[3~xyz");
        assert_eq!(key, Some(Key::Unknown));
        assert_eq!(rest, b"yz");
    }

    #[test_case(b"\x1b" ; "lone escape")]
    #[test_case(b"\x1b[" ; "csi introducer")]
    #[test_case(b"\x1b[1;3" ; "alt arrow prefix")]
    #[test_case(b"\x1b[12;" ; "params only")]
    fn test_incomplete_sequence_is_returned_unchanged(input: &[u8]) {
        let (key, rest) = decode_key(input);
        assert_eq!(key, None);
        assert_eq!(rest, input);
    }

    #[test]
    fn test_empty_input() {
        let (key, rest) = decode_key(b"");
        assert_eq!(key, None);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_split_input_decodes_the_same_as_whole_input() {
        let whole: &[u8] = b"ab\x1b[Ac\x1b[1;3Dd\x1b[1;3C\x1b[3~x\x7f\r";
        let (expected, leftover) = decode_all(whole);
        assert!(leftover.is_empty());

        for split in 0..=whole.len() {
            let (mut keys, remainder) = decode_all(&whole[..split]);
            let mut carried = remainder;
            carried.extend_from_slice(&whole[split..]);
            let (more, leftover) = decode_all(&carried);
            keys.extend(more);
            assert!(leftover.is_empty(), "split at {split}");
            pretty_assertions::assert_eq!(keys, expected, "split at {split}");
        }
    }

    #[test]
    fn test_is_printable() {
        assert!(Key::Byte(b' ').is_printable());
        assert!(Key::Byte(b'~').is_printable());
        assert!(!Key::Byte(KEY_BACKSPACE).is_printable());
        assert!(!Key::Byte(KEY_ENTER).is_printable());
        assert!(!Key::Up.is_printable());
    }
}
