//! The ICMPv6 pseudo header checksum.
//!
//! This code is derived from [`libpnet`] which is available under the Apache 2.0 license.
//!
//! [`libpnet`]: https://github.com/libpnet/libpnet

use crate::icmpv6::CHECKSUM_OFFSET;
use crate::IpProtocol;
use std::net::Ipv6Addr;

/// Calculate the checksum for an `IPv6` `ICMP` packet.
///
/// The pseudo header is formed from the source and destination addresses,
/// the length of `data` and the `ICMPv6` protocol number. The checksum field
/// within `data` is ignored, so `data` may carry either a zeroed or an
/// already stamped checksum.
#[must_use]
pub fn icmp_ipv6_checksum(data: &[u8], src_addr: Ipv6Addr, dest_addr: Ipv6Addr) -> u16 {
    ipv6_checksum(data, CHECKSUM_OFFSET / 2, src_addr, dest_addr, IpProtocol::IcmpV6)
}

/// Verify the checksum field of an `IPv6` `ICMP` packet.
///
/// There are no error states, a malformed or truncated packet simply fails
/// verification.
#[must_use]
pub fn verify_icmp_ipv6_checksum(data: &[u8], src_addr: Ipv6Addr, dest_addr: Ipv6Addr) -> bool {
    if data.len() < CHECKSUM_OFFSET + 2 {
        return false;
    }
    let stamped = u16::from_be_bytes([data[CHECKSUM_OFFSET], data[CHECKSUM_OFFSET + 1]]);
    icmp_ipv6_checksum(data, src_addr, dest_addr) == stamped
}

/// Calculate the checksum for a packet built on IPv6.
fn ipv6_checksum(
    data: &[u8],
    ignore_word: usize,
    source: Ipv6Addr,
    destination: Ipv6Addr,
    next_level_protocol: IpProtocol,
) -> u16 {
    let mut sum = 0u32;
    sum += ipv6_word_sum(source);
    sum += ipv6_word_sum(destination);
    sum += u32::from(next_level_protocol.id());
    sum += data.len() as u32;
    sum += sum_be_words(data, ignore_word);
    finalize_checksum(sum)
}

fn ipv6_word_sum(ip: Ipv6Addr) -> u32 {
    ip.segments().iter().map(|x| u32::from(*x)).sum()
}

fn sum_be_words(data: &[u8], ignore_word: usize) -> u32 {
    let mut sum = 0u32;
    for (i, chunk) in data.chunks(2).enumerate() {
        if i == ignore_word {
            continue;
        }
        sum += if let [hi, lo] = *chunk {
            u32::from(u16::from_be_bytes([hi, lo]))
        } else {
            // a trailing odd byte is padded with a zero low byte
            u32::from(chunk[0]) << 8
        };
    }
    sum
}

const fn finalize_checksum(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    !sum as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use std::str::FromStr;

    #[test]
    fn test_empty_ipv6_checksum() {
        let src_addr = Ipv6Addr::from_str("fe80::811:3f6:7601:6c3f").unwrap();
        let dest_addr = Ipv6Addr::from_str("fe80::1c8d:7d69:d0b6:8182").unwrap();
        assert_eq!(10316, icmp_ipv6_checksum(&[], src_addr, dest_addr));
    }

    #[test]
    fn test_icmp_ipv6_checksum() {
        let src_addr = Ipv6Addr::from_str("fe80::811:3f6:7601:6c3f").unwrap();
        let dest_addr = Ipv6Addr::from_str("fe80::1c8d:7d69:d0b6:8182").unwrap();
        let bytes = [
            0x88, 0x00, 0x73, 0x6a, 0x40, 0x00, 0x00, 0x00, 0xfe, 0x80, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x08, 0x11, 0x03, 0xf6, 0x76, 0x01, 0x6c, 0x3f,
        ];
        assert_eq!(29546, icmp_ipv6_checksum(&bytes, src_addr, dest_addr));
    }

    #[test]
    fn test_echo_request_checksum() {
        let src_addr = Ipv6Addr::from_str("2001:db8::1").unwrap();
        let dest_addr = Ipv6Addr::from_str("2001:db8::2").unwrap();
        let bytes = hex!("80 00 00 00 12 34 00 01");
        assert_eq!(0x1213, icmp_ipv6_checksum(&bytes, src_addr, dest_addr));
    }

    #[test]
    fn test_odd_length() {
        let src_addr = Ipv6Addr::from_str("::1").unwrap();
        let dest_addr = Ipv6Addr::from_str("::2").unwrap();
        assert_eq!(0xfec1, icmp_ipv6_checksum(&[0x01], src_addr, dest_addr));
    }

    #[test]
    fn test_verify_stamped() {
        let src_addr = Ipv6Addr::from_str("2001:db8::1").unwrap();
        let dest_addr = Ipv6Addr::from_str("2001:db8::2").unwrap();
        for len in [4, 5, 8, 9, 64, 1280] {
            let mut bytes = vec![0xa5u8; len];
            let checksum = icmp_ipv6_checksum(&bytes, src_addr, dest_addr);
            bytes[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_be_bytes());
            assert!(verify_icmp_ipv6_checksum(&bytes, src_addr, dest_addr));
        }
    }

    #[test]
    fn test_verify_too_short() {
        let src_addr = Ipv6Addr::from_str("::1").unwrap();
        let dest_addr = Ipv6Addr::from_str("::2").unwrap();
        assert!(!verify_icmp_ipv6_checksum(&[], src_addr, dest_addr));
        assert!(!verify_icmp_ipv6_checksum(&[0x80, 0x00, 0x12], src_addr, dest_addr));
    }

    // Approximate by nature of one's complement sums but holds for every
    // single-bit flip of this payload.
    #[test]
    fn test_flipped_payload_bit_fails_verification() {
        let src_addr = Ipv6Addr::from_str("2001:db8::1").unwrap();
        let dest_addr = Ipv6Addr::from_str("2001:db8::2").unwrap();
        let mut bytes = hex!("80 00 12 13 12 34 00 01");
        assert!(verify_icmp_ipv6_checksum(&bytes, src_addr, dest_addr));
        for byte in [0, 1, 4, 5, 6, 7] {
            for bit in 0..8 {
                bytes[byte] ^= 1 << bit;
                assert!(!verify_icmp_ipv6_checksum(&bytes, src_addr, dest_addr));
                bytes[byte] ^= 1 << bit;
            }
        }
    }

    #[test]
    fn test_flipped_address_bit_fails_verification() {
        let src_addr = Ipv6Addr::from_str("2001:db8::1").unwrap();
        let dest_addr = Ipv6Addr::from_str("2001:db8::2").unwrap();
        let other_addr = Ipv6Addr::from_str("2001:db8::3").unwrap();
        let bytes = hex!("80 00 12 13 12 34 00 01");
        assert!(verify_icmp_ipv6_checksum(&bytes, src_addr, dest_addr));
        assert!(!verify_icmp_ipv6_checksum(&bytes, other_addr, dest_addr));
        assert!(!verify_icmp_ipv6_checksum(&bytes, src_addr, other_addr));
    }
}
