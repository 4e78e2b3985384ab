//! TPI frame encoding and decoding
//!
//! Every payload byte travels the line as a 16-bit frame, shifted out
//! LSB first:
//!
//! ```text
//! bit  15 14   13   12..5   4   3..0
//!       1  1    P   data    0   1111
//!      (stop)       bits  (start)(idle)
//! ```
//!
//! The idle and stop bits are high, the start bit is low, and `P` is the
//! even parity of the eight data bits. The data bits are placed verbatim,
//! not bit-reversed.

/// Constant skeleton shared by every valid frame: idle and stop bits
/// high, start bit low.
pub const FRAME_SKELETON: u16 = 0xC00F;

/// Position of the parity bit within a frame.
pub const FRAME_PARITY: u16 = 0x2000;

/// A break: at least twelve low bit times on the line. Resynchronizes
/// the target receiver after a failed exchange.
pub const BREAK_FRAME: u16 = 0x0000;

/// Encode one payload byte into its 16-bit line frame.
pub fn encode(byte: u8) -> u16 {
    let mut frame = FRAME_SKELETON | (u16::from(byte) << 5);
    if byte.count_ones() & 1 == 1 {
        frame |= FRAME_PARITY;
    }
    frame
}

/// Decode a received frame into its payload byte.
///
/// The second element reports whether the received parity bit matches
/// the parity recomputed from the extracted byte. The byte is returned
/// either way; the caller decides whether a mismatch is fatal for the
/// exchange.
pub fn decode(frame: u16) -> (u8, bool) {
    let byte = (frame >> 5) as u8;
    let parity = byte.count_ones() & 1 == 1;
    let parity_received = frame & FRAME_PARITY != 0;
    (byte, parity == parity_received)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_bytes() {
        for byte in 0..=0xFFu8 {
            assert_eq!(decode(encode(byte)), (byte, true));
        }
    }

    #[test]
    fn skeleton_bits_are_invariant() {
        for byte in 0..=0xFFu8 {
            assert_eq!(encode(byte) & FRAME_SKELETON, FRAME_SKELETON);
        }
    }

    #[test]
    fn known_encodings() {
        // 0x00 has even parity, bare skeleton
        assert_eq!(encode(0x00), 0xC00F);
        // 0x01 has odd parity
        assert_eq!(encode(0x01), 0xE02F);
        assert_eq!(encode(0xFF), 0xDFEF);
    }

    #[test]
    fn single_data_bit_flip_breaks_parity() {
        for byte in [0x00u8, 0x5A, 0x80, 0xFF] {
            let frame = encode(byte);
            for bit in 5..13 {
                let (_, parity_ok) = decode(frame ^ (1u16 << bit));
                assert!(!parity_ok, "flipped bit {bit} of frame for 0x{byte:02X}");
            }
        }
    }

    #[test]
    fn flipped_parity_bit_is_detected() {
        let (byte, parity_ok) = decode(encode(0x42) ^ FRAME_PARITY);
        assert_eq!(byte, 0x42);
        assert!(!parity_ok);
    }
}
