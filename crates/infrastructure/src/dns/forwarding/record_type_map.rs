//! Mapping between the domain's record types and classes and their
//! `hickory_proto` counterparts.

use ferrous_resolver_domain::{DnsClass, RecordType};
use hickory_proto::rr::{DNSClass, RecordType as HickoryRecordType};

/// Bidirectional mapper between domain and hickory record types
pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_hickory(record_type: &RecordType) -> HickoryRecordType {
        match record_type {
            // Basic records
            RecordType::A => HickoryRecordType::A,
            RecordType::AAAA => HickoryRecordType::AAAA,
            RecordType::CNAME => HickoryRecordType::CNAME,
            RecordType::MX => HickoryRecordType::MX,
            RecordType::TXT => HickoryRecordType::TXT,
            RecordType::PTR => HickoryRecordType::PTR,

            // Delegation and service records
            RecordType::NS => HickoryRecordType::NS,
            RecordType::SOA => HickoryRecordType::SOA,
            RecordType::SRV => HickoryRecordType::SRV,
            RecordType::NAPTR => HickoryRecordType::NAPTR,
            RecordType::CAA => HickoryRecordType::CAA,
            RecordType::SVCB => HickoryRecordType::SVCB,
            RecordType::HTTPS => HickoryRecordType::HTTPS,

            RecordType::DS => HickoryRecordType::DS,
            RecordType::DNSKEY => HickoryRecordType::DNSKEY,

            RecordType::ANY => HickoryRecordType::ANY,
        }
    }

    /// Returns `None` for types the domain model does not know.
    pub fn from_hickory(hickory_type: HickoryRecordType) -> Option<RecordType> {
        match hickory_type {
            HickoryRecordType::A => Some(RecordType::A),
            HickoryRecordType::AAAA => Some(RecordType::AAAA),
            HickoryRecordType::CNAME => Some(RecordType::CNAME),
            HickoryRecordType::MX => Some(RecordType::MX),
            HickoryRecordType::TXT => Some(RecordType::TXT),
            HickoryRecordType::PTR => Some(RecordType::PTR),

            HickoryRecordType::NS => Some(RecordType::NS),
            HickoryRecordType::SOA => Some(RecordType::SOA),
            HickoryRecordType::SRV => Some(RecordType::SRV),
            HickoryRecordType::NAPTR => Some(RecordType::NAPTR),
            HickoryRecordType::CAA => Some(RecordType::CAA),
            HickoryRecordType::SVCB => Some(RecordType::SVCB),
            HickoryRecordType::HTTPS => Some(RecordType::HTTPS),

            HickoryRecordType::DS => Some(RecordType::DS),
            HickoryRecordType::DNSKEY => Some(RecordType::DNSKEY),

            HickoryRecordType::ANY => Some(RecordType::ANY),
            _ => None,
        }
    }

    pub fn class_to_hickory(class: &DnsClass) -> DNSClass {
        match class {
            DnsClass::IN => DNSClass::IN,
            DnsClass::CH => DNSClass::CH,
            DnsClass::HS => DNSClass::HS,
            DnsClass::ANY => DNSClass::ANY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_types() {
        let types = vec![
            RecordType::A,
            RecordType::AAAA,
            RecordType::CNAME,
            RecordType::MX,
            RecordType::TXT,
            RecordType::PTR,
            RecordType::NS,
            RecordType::SOA,
            RecordType::SRV,
            RecordType::NAPTR,
            RecordType::CAA,
            RecordType::SVCB,
            RecordType::HTTPS,
            RecordType::DS,
            RecordType::DNSKEY,
            RecordType::ANY,
        ];

        for rt in types {
            let hickory = RecordTypeMapper::to_hickory(&rt);
            assert_eq!(
                RecordTypeMapper::from_hickory(hickory),
                Some(rt),
                "Roundtrip failed for {:?}",
                rt
            );
        }
    }

    #[test]
    fn test_unsupported_type_returns_none() {
        assert!(RecordTypeMapper::from_hickory(HickoryRecordType::TLSA).is_none());
    }
}
