/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The two V3 checksums: an 8-bit nibble sum and a nibble-fed CRC-8.
//!
//! These are free functions rather than methods so they can be used and tested
//! independently of the [`PayloadBuilder`](super::PayloadBuilder).
//!
//! Both operate on the raw frame buffer and a nibble `count`.  Nibble `i`
//! lives in byte `i / 2`, high half for even `i`.  The window starts at
//! nibble 7, right after the sync nibble; the sync nibble shares byte 3 with
//! the first sensor-type nibble.
//!
//! The exact windows (including the odd-count tail of the sum and the extra
//! flush pass of the CRC) are what deployed receivers check against.  They are
//! not textbook-symmetric and must stay as they are.

/// First nibble covered by both checksums.
pub const WINDOW_START_NIBBLE: usize = 7;

/// First whole byte summed by [`simple_checksum`].
const SUM_START_BYTE: usize = 4;

/// CRC-8 polynomial x^8 + x^2 + x + 1.
const CRC8_POLY: u8 = 0x07;

const CRC8_INIT: u8 = 0x00;

/// Exchange the high and low nibble.  The protocol sends the least
/// significant digit first, so both checksums go out swapped.
pub fn swap_nibbles(b: u8) -> u8 {
    b.rotate_left(4)
}

/// Nibble `index` of `data`: even indices are high halves.
pub fn nibble_at(data: &[u8], index: usize) -> u8 {
    let byte = data[index / 2];
    if index % 2 == 0 {
        byte >> 4
    } else {
        byte & 0x0F
    }
}

/// Wrapping nibble sum over the window, returned nibble-swapped.
///
/// Seeded with the data half of byte 3 (sync bits masked off), then both
/// nibbles of bytes `4 .. 4 + count / 2`.  An odd `count` also adds the high
/// nibble of the byte after that.
///
/// # Panics
/// If `data` is shorter than `4 + count / 2 + 1` bytes.
pub fn simple_checksum(data: &[u8], count: usize) -> u8 {
    let end = SUM_START_BYTE + count / 2;

    let mut sum = data[3] & 0x0F;
    for &b in &data[SUM_START_BYTE..end] {
        sum = sum.wrapping_add(b >> 4).wrapping_add(b & 0x0F);
    }
    if count % 2 == 1 {
        sum = sum.wrapping_add(data[end] >> 4);
    }

    swap_nibbles(sum)
}

/// Bitwise CRC-8 (poly 0x07, init 0) fed one nibble at a time, returned
/// nibble-swapped.
///
/// Walks nibble indices `7 ..= count + 7`.  Each step XORs the nibble into the
/// low half of the register and shifts it through four rounds; the last step
/// XORs nothing and only flushes the previous nibble out of the low half.
///
/// # Panics
/// If `data` does not hold nibble `count + 6`.
pub fn crc8(data: &[u8], count: usize) -> u8 {
    let last = WINDOW_START_NIBBLE + count;

    let mut crc = CRC8_INIT;
    for i in WINDOW_START_NIBBLE..=last {
        if i < last {
            crc ^= nibble_at(data, i);
        }
        for _ in 0..4 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLY
            } else {
                crc << 1
            };
        }
    }

    swap_nibbles(crc)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Sync `A`, then window nibbles 1 2 3 4 5 … F, trailing bytes clear.
    const HANDCRAFTED: [u8; 13] = [
        0xFF, 0xFF, 0xFF, 0xA1, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x00, 0x00,
    ];

    /// Golden frame body: THGR810, ch 1, rc 0, -1.5 °C, 20 %.
    const GOLDEN: [u8; 13] = [
        0xFF, 0xFF, 0xFF, 0xAF, 0x82, 0x41, 0x00, 0x05, 0x10, 0x80, 0x20, 0x00, 0x00,
    ];

    // ── helpers ───────────────────────────────────────────────────────────────

    #[test]
    fn swap_nibbles_exchanges_halves() {
        assert_eq!(swap_nibbles(0x2E), 0xE2);
        assert_eq!(swap_nibbles(0xF0), 0x0F);
        assert_eq!(swap_nibbles(0x77), 0x77);
    }

    #[test]
    fn nibble_at_reads_high_half_first() {
        assert_eq!(nibble_at(&HANDCRAFTED, 6), 0xA);
        assert_eq!(nibble_at(&HANDCRAFTED, 7), 0x1);
        assert_eq!(nibble_at(&HANDCRAFTED, 8), 0x2);
        assert_eq!(nibble_at(&HANDCRAFTED, 21), 0xF);
    }

    // ── simple_checksum ───────────────────────────────────────────────────────

    #[test]
    fn simple_checksum_handcrafted_window() {
        // 1 + (2+3+…+F) = 120 = 0x78 → swapped
        assert_eq!(simple_checksum(&HANDCRAFTED, 15), 0x87);
    }

    #[test]
    fn simple_checksum_golden_frame() {
        // F + 8+2 + 4+1 + 0 + 5 + 1 + 8 + 2 = 46 = 0x2E
        assert_eq!(simple_checksum(&GOLDEN, 15), 0xE2);
    }

    #[test]
    fn simple_checksum_ignores_sync_bits() {
        let mut frame = HANDCRAFTED;
        frame[3] = 0x51; // different sync, same data nibble
        assert_eq!(simple_checksum(&frame, 15), 0x87);
    }

    #[test]
    fn simple_checksum_odd_count_adds_next_high_nibble() {
        let mut frame = HANDCRAFTED;
        frame[11] = 0x5C;
        // 120 + 5 = 125 = 0x7D; the low nibble C is not counted
        assert_eq!(simple_checksum(&frame, 15), 0xD7);
        // even count stops at the byte boundary
        assert_eq!(simple_checksum(&frame, 14), 0x87);
    }

    #[test]
    fn simple_checksum_wraps_at_eight_bits() {
        let mut frame = [0xFF_u8; 13];
        frame[11] = 0x00;
        // F + 14 × F = 225; + byte 11 high nibble 0
        assert_eq!(simple_checksum(&frame, 15), swap_nibbles(225));
        frame[11] = 0xF0;
        assert_eq!(simple_checksum(&frame, 15), swap_nibbles(240));
        let mut wide = [0xFF_u8; 16];
        wide[3] = 0xAF;
        // F + 20 × F = 315 → 315 - 256 = 59
        assert_eq!(simple_checksum(&wide, 20), swap_nibbles(59));
    }

    // ── crc8 ──────────────────────────────────────────────────────────────────

    #[test]
    fn crc8_handcrafted_window() {
        assert_eq!(crc8(&HANDCRAFTED, 15), 0xE1);
        assert_eq!(crc8(&HANDCRAFTED, 14), 0x1D);
    }

    #[test]
    fn crc8_golden_frame() {
        assert_eq!(crc8(&GOLDEN, 15), 0x73);
    }

    #[test]
    fn crc8_all_zero_window_is_zero() {
        let mut frame = [0_u8; 13];
        frame[3] = 0xA0;
        assert_eq!(crc8(&frame, 15), 0x00);
        assert_eq!(simple_checksum(&frame, 15), 0x00);
    }

    #[test]
    fn crc8_ignores_sync_nibble_and_checksum_bytes() {
        let mut frame = GOLDEN;
        frame[3] = 0x0F;
        frame[11] = 0xE2;
        frame[12] = 0x99;
        assert_eq!(crc8(&frame, 15), 0x73);
    }

    #[test]
    fn crc8_flush_pass_matters() {
        // A single set bit in the last window nibble: its own four rounds
        // leave 0x10, the flush pass pushes it out of bit 7 into the
        // polynomial.
        let mut frame = [0_u8; 13];
        frame[3] = 0xA0;
        frame[10] = 0x01; // nibble 21, the last one in the window
        let crc = swap_nibbles(crc8(&frame, 15));
        assert_eq!(crc, 0x07);
    }

    #[test]
    fn checksums_are_deterministic() {
        for _ in 0..100 {
            assert_eq!(crc8(&HANDCRAFTED, 15), crc8(&HANDCRAFTED, 15));
            assert_eq!(
                simple_checksum(&HANDCRAFTED, 15),
                simple_checksum(&HANDCRAFTED, 15)
            );
        }
    }
}
