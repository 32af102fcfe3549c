#![allow(dead_code)]
use ferrous_resolver_domain::{DnsTransportProtocol, NameServerAddress};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, SOA};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::SocketAddr;
use std::str::FromStr;

pub fn name(domain: &str) -> Name {
    let domain = domain.trim_end_matches('.');
    if domain.is_empty() {
        return Name::root();
    }
    Name::from_str(&format!("{}.", domain)).unwrap()
}

pub fn a(owner: &str, ip: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::A(A(ip.parse().unwrap())))
}

pub fn aaaa(owner: &str, ip: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::AAAA(AAAA(ip.parse().unwrap())))
}

pub fn ns(zone: &str, host: &str) -> Record {
    Record::from_rdata(name(zone), 172800, RData::NS(NS(name(host))))
}

pub fn cname(owner: &str, target: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::CNAME(CNAME(name(target))))
}

pub fn mx(owner: &str, preference: u16, exchange: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::MX(MX::new(preference, name(exchange))))
}

pub fn soa(zone: &str) -> Record {
    soa_with_ttl(zone, 3600, 300)
}

pub fn soa_with_ttl(zone: &str, ttl: u32, minimum: u32) -> Record {
    let rdata = SOA::new(
        name(&format!("ns1.{}", zone)),
        name(&format!("hostmaster.{}", zone)),
        2024010101,
        7200,
        900,
        1209600,
        minimum,
    );
    Record::from_rdata(name(zone), ttl, RData::SOA(rdata))
}

pub fn udp_server(ip: &str) -> NameServerAddress {
    NameServerAddress::from_ip(ip.parse().unwrap())
}

pub fn named_server(host: &str, addr: &str) -> NameServerAddress {
    NameServerAddress::new(
        host,
        Some(addr.parse::<SocketAddr>().unwrap()),
        DnsTransportProtocol::Udp,
    )
}

/// Reply message scripted by a mock name server.
pub struct Reply {
    message: Message,
}

impl Reply {
    pub fn new() -> Self {
        Self {
            message: Message::new(0, MessageType::Response, OpCode::Query),
        }
    }

    pub fn nx_domain() -> Self {
        Self::new().rcode(ResponseCode::NXDomain)
    }

    pub fn rcode(mut self, rcode: ResponseCode) -> Self {
        self.message.metadata.response_code = rcode;
        self
    }

    pub fn question(mut self, domain: &str, record_type: RecordType) -> Self {
        self.message.add_query(Query::query(name(domain), record_type));
        self
    }

    pub fn truncated(mut self) -> Self {
        self.message.metadata.truncation = true;
        self
    }

    pub fn answer(mut self, record: Record) -> Self {
        self.message.add_answer(record);
        self
    }

    pub fn authority(mut self, record: Record) -> Self {
        self.message.add_authority(record);
        self
    }

    pub fn additional(mut self, record: Record) -> Self {
        self.message.add_additional(record);
        self
    }

    /// NS referral for `zone`, with a glue A record when `glue` is set.
    pub fn referral(zone: &str, host: &str, glue: Option<&str>) -> Self {
        let reply = Self::new().authority(ns(zone, host));
        match glue {
            Some(ip) => reply.additional(a(host, ip)),
            None => reply,
        }
    }

    pub fn build(self) -> Message {
        self.message
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::new()
    }
}
