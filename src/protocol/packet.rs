//! Packet codec
//!
//! Every packet starts with a one-byte header naming its type, and its length
//! must exactly match that type. Push packets carry an inverted one-byte sum
//! over header, page number and payload. Inverting means an all-zero packet
//! never validates.

use super::{
    Face, ProtocolError, Result, HEADER_PULL, HEADER_PUSH, HEADER_SEED, PULL_LEN, PUSH_LEN,
    SEED_LEN,
};
use crate::config::{MAX_PAGES, PAGE_SIZE};

/// A neighbor offering a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedAnnouncement {
    pub total_pages: u8,
    /// Informational, never checked on receipt
    pub program_checksum: u16,
}

/// One page of game code, borrowed from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePush<'a> {
    pub page_index: u8,
    pub payload: &'a [u8; PAGE_SIZE],
    pub packet_checksum: u8,
}

impl PagePush<'_> {
    /// Plain (not inverted) sum over header, page number and payload.
    ///
    /// Only meaningful on a decoded push, where the checksum already matched.
    #[inline]
    pub fn sum(&self) -> u8 {
        !self.packet_checksum
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    Seed(SeedAnnouncement),
    Push(PagePush<'a>),
}

/// A decoded message together with the face it arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub face: Face,
    pub message: Message<'a>,
}

impl<'a> Packet<'a> {
    pub fn decode(face: Face, bytes: &'a [u8]) -> Result<Self> {
        let header = *bytes.first().ok_or(ProtocolError::InvalidLength)?;

        let message = match header {
            HEADER_PUSH => Message::Push(decode_push(bytes)?),
            HEADER_SEED => Message::Seed(decode_seed(bytes)?),
            _ => return Err(ProtocolError::UnknownHeader),
        };

        Ok(Self { face, message })
    }
}

fn decode_seed(bytes: &[u8]) -> Result<SeedAnnouncement> {
    if bytes.len() != SEED_LEN {
        return Err(ProtocolError::InvalidLength);
    }

    let total_pages = bytes[1];
    if total_pages == 0 || total_pages > MAX_PAGES {
        return Err(ProtocolError::PageCountOutOfRange);
    }

    Ok(SeedAnnouncement {
        total_pages,
        program_checksum: u16::from_le_bytes([bytes[2], bytes[3]]),
    })
}

fn decode_push(bytes: &[u8]) -> Result<PagePush<'_>> {
    if bytes.len() != PUSH_LEN {
        return Err(ProtocolError::InvalidLength);
    }

    let page_index = bytes[1];
    let payload: &[u8; PAGE_SIZE] = bytes[2..2 + PAGE_SIZE]
        .try_into()
        .map_err(|_| ProtocolError::InvalidLength)?;
    let packet_checksum = bytes[PUSH_LEN - 1];

    if !push_sum(page_index, payload) != packet_checksum {
        return Err(ProtocolError::InvalidChecksum);
    }

    Ok(PagePush {
        page_index,
        payload,
        packet_checksum,
    })
}

/// Modular sum over the push header, the page number and the payload.
pub fn push_sum(page_index: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(HEADER_PUSH.wrapping_add(page_index), |sum, &b| {
            sum.wrapping_add(b)
        })
}

pub fn encode_seed(total_pages: u8, program_checksum: u16) -> [u8; SEED_LEN] {
    let [lo, hi] = program_checksum.to_le_bytes();
    [HEADER_SEED, total_pages, lo, hi]
}

pub fn encode_push(page_index: u8, payload: &[u8; PAGE_SIZE]) -> [u8; PUSH_LEN] {
    let mut buffer = [0u8; PUSH_LEN];
    buffer[0] = HEADER_PUSH;
    buffer[1] = page_index;
    buffer[2..2 + PAGE_SIZE].copy_from_slice(payload);
    buffer[PUSH_LEN - 1] = !push_sum(page_index, payload);
    buffer
}

pub fn encode_pull(page_index: u8) -> [u8; PULL_LEN] {
    [HEADER_PULL, page_index]
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACE: Face = Face(3);

    fn pattern(seed: u8) -> [u8; PAGE_SIZE] {
        let mut page = [0u8; PAGE_SIZE];
        for (i, b) in page.iter_mut().enumerate() {
            *b = seed.wrapping_mul(31).wrapping_add(i as u8);
        }
        page
    }

    #[test]
    fn push_roundtrip() {
        let payload = pattern(7);
        let raw = encode_push(5, &payload);

        let packet = Packet::decode(FACE, &raw).unwrap();
        assert_eq!(packet.face, FACE);
        match packet.message {
            Message::Push(push) => {
                assert_eq!(push.page_index, 5);
                assert_eq!(push.payload, &payload);
                assert_eq!(push.sum(), push_sum(5, &payload));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn all_zero_push_is_rejected() {
        let mut raw = [0u8; PUSH_LEN];
        raw[0] = HEADER_PUSH;
        let err = Packet::decode(FACE, &raw).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidChecksum);
    }

    #[test]
    fn corrupted_payload_fails_checksum() {
        let mut raw = encode_push(0, &pattern(1));
        raw[40] ^= 0x10;
        assert_eq!(
            Packet::decode(FACE, &raw).unwrap_err(),
            ProtocolError::InvalidChecksum
        );
    }

    #[test]
    fn corrupted_page_number_fails_checksum() {
        let mut raw = encode_push(2, &pattern(1));
        raw[1] = 3;
        assert_eq!(
            Packet::decode(FACE, &raw).unwrap_err(),
            ProtocolError::InvalidChecksum
        );
    }

    #[test]
    fn push_with_wrong_length_is_rejected() {
        let raw = encode_push(0, &pattern(2));
        assert_eq!(
            Packet::decode(FACE, &raw[..PUSH_LEN - 1]).unwrap_err(),
            ProtocolError::InvalidLength
        );

        let mut long = [0u8; PUSH_LEN + 1];
        long[..PUSH_LEN].copy_from_slice(&raw);
        assert_eq!(
            Packet::decode(FACE, &long).unwrap_err(),
            ProtocolError::InvalidLength
        );
    }

    #[test]
    fn unknown_header_is_rejected() {
        assert_eq!(
            Packet::decode(FACE, &[0x42, 1, 2, 3]).unwrap_err(),
            ProtocolError::UnknownHeader
        );
        // A pull request is something we send, never something we accept
        assert_eq!(
            Packet::decode(FACE, &encode_pull(0)).unwrap_err(),
            ProtocolError::UnknownHeader
        );
    }

    #[test]
    fn empty_buffer_is_rejected() {
        assert_eq!(
            Packet::decode(FACE, &[]).unwrap_err(),
            ProtocolError::InvalidLength
        );
    }

    #[test]
    fn seed_decodes_little_endian_checksum() {
        let packet = Packet::decode(Face(0), &[HEADER_SEED, 12, 0x34, 0x12]).unwrap();
        assert_eq!(
            packet.message,
            Message::Seed(SeedAnnouncement {
                total_pages: 12,
                program_checksum: 0x1234,
            })
        );
        assert_eq!(encode_seed(12, 0x1234), [HEADER_SEED, 12, 0x34, 0x12]);
    }

    #[test]
    fn seed_with_wrong_length_is_rejected() {
        assert_eq!(
            Packet::decode(FACE, &[HEADER_SEED, 3, 0]).unwrap_err(),
            ProtocolError::InvalidLength
        );
    }

    #[test]
    fn seed_page_count_must_fit_runnable_region() {
        assert_eq!(
            Packet::decode(FACE, &encode_seed(0, 0)).unwrap_err(),
            ProtocolError::PageCountOutOfRange
        );
        assert_eq!(
            Packet::decode(FACE, &encode_seed(MAX_PAGES + 1, 0)).unwrap_err(),
            ProtocolError::PageCountOutOfRange
        );
        assert!(Packet::decode(FACE, &encode_seed(MAX_PAGES, 0)).is_ok());
    }

    #[test]
    fn pull_request_layout() {
        assert_eq!(encode_pull(9), [HEADER_PULL, 9]);
    }
}
