// src/drivers/sdi12/crc.rs

use crate::common::error::TransportError;
use crc::{Crc, CRC_16_ARC};

// SDI-12 uses CRC-16/ARC: poly 0x8005 reflected, init 0, no final xor.
const CRC_COMPUTER: Crc<u16> = Crc::<u16>::new(&CRC_16_ARC);

/// Calculates the SDI-12 CRC-16 over a response, starting with the address
/// and ending before the CRC characters.
#[inline]
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC_COMPUTER.checksum(data)
}

/// Encodes a CRC into the three printable characters SDI-12 appends to a
/// response.
pub fn encode_crc_ascii(crc_value: u16) -> [u8; 3] {
    let char1 = 0x40 | ((crc_value >> 12) & 0x3F) as u8;
    let char2 = 0x40 | ((crc_value >> 6) & 0x3F) as u8;
    let char3 = 0x40 | (crc_value & 0x3F) as u8;
    [char1, char2, char3]
}

/// Decodes the three CRC characters of a response.
pub fn decode_crc_ascii(crc_chars: [u8; 3]) -> u16 {
    let byte1 = u16::from(crc_chars[0] & 0x3F);
    let byte2 = u16::from(crc_chars[1] & 0x3F);
    let byte3 = u16::from(crc_chars[2] & 0x3F);
    (byte1 << 12) | (byte2 << 6) | byte3
}

/// Checks the CRC at the end of a response (without `<CR><LF>`) and returns
/// the response without it.
pub fn strip_verified_crc<E>(response_with_crc: &[u8]) -> Result<&[u8], TransportError<E>>
where
    E: core::fmt::Debug,
{
    let data_len = response_with_crc
        .len()
        .checked_sub(3)
        .ok_or(TransportError::InvalidFormat)?;
    let (data_part, crc_part) = response_with_crc.split_at(data_len);

    let calculated = calculate_crc16(data_part);
    let received = decode_crc_ascii([crc_part[0], crc_part[1], crc_part[2]]);

    if calculated == received {
        Ok(data_part)
    } else {
        Err(TransportError::CrcMismatch {
            expected: received,
            calculated,
        })
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(calculate_crc16(b"123456789"), 0xBB3D);
    }

    #[test]
    fn test_ascii_encoding() {
        let crc = 0xBB3D;
        let encoded = encode_crc_ascii(crc);
        assert!(encoded.iter().all(|b| (0x40..=0x7F).contains(b)));
        assert_eq!(decode_crc_ascii(encoded), crc);
    }

    #[test]
    fn test_strip_verified_crc() {
        let body = b"0+3.14+2.718";
        let mut framed = [0u8; 15];
        framed[..12].copy_from_slice(body);
        framed[12..].copy_from_slice(&encode_crc_ascii(calculate_crc16(body)));

        let data = strip_verified_crc::<()>(&framed).unwrap();
        assert_eq!(data, body);

        framed[3] = b'5';
        assert!(matches!(
            strip_verified_crc::<()>(&framed),
            Err(TransportError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_too_short_for_crc() {
        assert!(matches!(strip_verified_crc::<()>(b"0A"), Err(TransportError::InvalidFormat)));
    }
}
