pub mod response_extractors;
pub mod reverse_name;

pub use response_extractors::{
    extract_addresses, extract_ipv4, extract_ipv6, extract_mx, extract_mx_records, extract_ptr,
    extract_txt, MailExchanger,
};
pub use reverse_name::reverse_domain;
