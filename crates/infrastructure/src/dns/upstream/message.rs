//! DNS query construction and answer extraction over `hickory-proto`.

use dnscache_domain::ResolveError;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;

/// Builds a recursive single-question query. Returns the message id and the
/// wire bytes.
pub fn build_query(name: &str, record_type: RecordType) -> Result<(u16, Vec<u8>), ResolveError> {
    let domain = Name::from_str(name)
        .map_err(|e| ResolveError::resolution(name, format!("invalid name: {}", e)))?;

    let mut query = Query::new();
    query.set_name(domain);
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);

    let id = fastrand::u16(..);
    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message
        .emit(&mut encoder)
        .map_err(|e| ResolveError::resolution(name, format!("failed to encode query: {}", e)))?;

    Ok((id, buf))
}

/// Answer records of the requested type, rendered as strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub id: u16,
    pub rcode: ResponseCode,
    pub values: Vec<String>,
}

pub fn parse_answer(bytes: &[u8], record_type: RecordType) -> Result<ParsedAnswer, String> {
    let message =
        Message::from_vec(bytes).map_err(|e| format!("failed to parse response: {}", e))?;

    let values: Vec<String> = message
        .answers()
        .iter()
        .filter_map(|record| match (record_type, record.data()) {
            (RecordType::A, RData::A(a)) => Some(a.0.to_string()),
            (RecordType::AAAA, RData::AAAA(aaaa)) => Some(aaaa.0.to_string()),
            (RecordType::PTR, RData::PTR(ptr)) => Some(ptr.to_utf8()),
            _ => None,
        })
        .collect();

    debug!(
        rcode = ?message.response_code(),
        record_type = %record_type,
        answers = values.len(),
        "DNS response parsed"
    );

    Ok(ParsedAnswer {
        id: message.id(),
        rcode: message.response_code(),
        values,
    })
}

/// `in-addr.arpa` / `ip6.arpa` name for a PTR query.
pub fn reverse_name(ip: &IpAddr) -> String {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            format!(
                "{}.{}.{}.{}.in-addr.arpa.",
                octets[3], octets[2], octets[1], octets[0]
            )
        }
        IpAddr::V6(ipv6) => {
            let mut nibbles = Vec::with_capacity(32);
            for byte in ipv6.octets().iter().rev() {
                nibbles.push(format!("{:x}", byte & 0x0f));
                nibbles.push(format!("{:x}", (byte >> 4) & 0x0f));
            }
            format!("{}.ip6.arpa.", nibbles.join("."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_sets_recursion_desired() {
        let (id, bytes) = build_query("example.com.", RecordType::A).unwrap();
        assert!(bytes.len() > 12);
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), id);
        assert_eq!(bytes[2] & 0x01, 0x01);
    }

    #[test]
    fn test_reverse_name_v4() {
        let ip: IpAddr = "192.0.2.10".parse().unwrap();
        assert_eq!(reverse_name(&ip), "10.2.0.192.in-addr.arpa.");
    }

    #[test]
    fn test_reverse_name_v6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        let name = reverse_name(&ip);
        assert!(name.starts_with("1.0.0.0.0.0.0.0"));
        assert!(name.ends_with("8.b.d.0.1.0.0.2.ip6.arpa."));
    }

    #[test]
    fn test_garbage_response_is_rejected() {
        assert!(parse_answer(&[0x01, 0x02], RecordType::A).is_err());
    }
}
