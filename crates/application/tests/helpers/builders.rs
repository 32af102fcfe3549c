#![allow(dead_code)]
use ferrous_resolver_application::DnsResponse;
use ferrous_resolver_domain::{DnsTransportProtocol, NameServerAddress};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, PTR, SOA, TXT};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::time::Duration;

pub fn name(domain: &str) -> Name {
    Name::from_str(&format!("{}.", domain.trim_end_matches('.'))).unwrap()
}

pub fn a(owner: &str, ip: &str) -> Record {
    let ip: Ipv4Addr = ip.parse().unwrap();
    Record::from_rdata(name(owner), 300, RData::A(A(ip)))
}

pub fn aaaa(owner: &str, ip: &str) -> Record {
    let ip: Ipv6Addr = ip.parse().unwrap();
    Record::from_rdata(name(owner), 300, RData::AAAA(AAAA(ip)))
}

pub fn cname(owner: &str, target: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::CNAME(CNAME(name(target))))
}

pub fn mx(owner: &str, preference: u16, exchange: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::MX(MX::new(preference, name(exchange))))
}

pub fn txt(owner: &str, text: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::TXT(TXT::new(vec![text.to_string()])))
}

pub fn ptr(owner: &str, target: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::PTR(PTR(name(target))))
}

pub fn soa(zone: &str) -> Record {
    let soa = SOA::new(
        name(&format!("ns1.{}", zone)),
        name(&format!("hostmaster.{}", zone)),
        1,
        3600,
        600,
        86400,
        300,
    );
    Record::from_rdata(name(zone), 300, RData::SOA(soa))
}

/// Builds reply messages for tests.
pub struct ResponseBuilder {
    message: Message,
    server: Option<NameServerAddress>,
}

impl ResponseBuilder {
    pub fn new(domain: &str, record_type: RecordType) -> Self {
        let mut query = Query::new();
        query.set_name(name(domain));
        query.set_query_type(record_type);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(0, MessageType::Response, OpCode::Query);
        message.add_query(query);
        Self {
            message,
            server: None,
        }
    }

    pub fn rcode(mut self, rcode: ResponseCode) -> Self {
        self.message.metadata.response_code = rcode;
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

    pub fn from_server(mut self, server: &str) -> Self {
        self.server = Some(server.parse().unwrap());
        self
    }

    pub fn build(self) -> DnsResponse {
        let response = DnsResponse::new(self.message);
        match self.server {
            Some(server) => {
                response.with_metadata(server, DnsTransportProtocol::Udp, Duration::from_millis(5))
            }
            None => response,
        }
    }
}
