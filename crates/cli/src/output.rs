use ferrous_resolver_application::DnsResponse;
use hickory_proto::rr::Record;
use std::fmt::Write;

/// dig-like presentation of a response.
pub fn render(response: &DnsResponse) -> String {
    let mut out = String::new();
    let message = &response.message;

    let _ = writeln!(
        out,
        ";; status: {}, id: {}, answers: {}, authority: {}, additional: {}",
        response.response_code(),
        message.metadata.id,
        response.answers().len(),
        response.authorities().len(),
        response.additionals().len(),
    );
    if let Some(metadata) = &response.metadata {
        let _ = writeln!(
            out,
            ";; server: {} ({}), rtt: {} ms",
            metadata.server,
            metadata.protocol,
            metadata.rtt.as_millis()
        );
    }

    out.push_str("\n;; QUESTION SECTION:\n");
    for query in &message.queries {
        let _ = writeln!(
            out,
            ";{}\t\t{}\t{}",
            query.name(),
            query.query_class(),
            query.query_type()
        );
    }

    section(&mut out, "ANSWER", response.answers());
    section(&mut out, "AUTHORITY", response.authorities());
    section(&mut out, "ADDITIONAL", response.additionals());
    out
}

fn section(out: &mut String, title: &str, records: &[Record]) {
    if records.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n;; {} SECTION:", title);
    for record in records {
        let _ = writeln!(out, "{}", record);
    }
}
