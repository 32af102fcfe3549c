use hickory_proto::rr::RecordType;

/// Cache key: lower-cased owner name without the root dot, plus record type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub domain: String,
    pub record_type: RecordType,
}

impl CacheKey {
    #[inline]
    pub fn new(domain: &str, record_type: RecordType) -> Self {
        Self {
            domain: normalize(domain),
            record_type,
        }
    }
}

pub(crate) fn normalize(domain: &str) -> String {
    domain.trim_end_matches('.').to_ascii_lowercase()
}

/// `www.example.com` → `example.com` → `com` → `` (root) → `None`.
pub(crate) fn parent_zone(domain: &str) -> Option<&str> {
    if domain.is_empty() {
        return None;
    }
    Some(domain.split_once('.').map(|(_, parent)| parent).unwrap_or(""))
}
