use crate::dns_record::{DnsClass, RecordType};
use std::fmt;

/// A single DNS question with optional QNAME minimization state.
///
/// `zone_cut` is `None` when minimization is off, `Some("")` at the root and
/// grows one label at a time toward `name` as the walk descends. Once
/// minimization has been disabled on an instance it stays disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String,
    pub record_type: RecordType,
    pub class: DnsClass,
    zone_cut: Option<String>,
    minimization_disabled: bool,
}

impl DnsQuestion {
    pub fn new(name: impl AsRef<str>, record_type: RecordType) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            record_type,
            class: DnsClass::IN,
            zone_cut: None,
            minimization_disabled: false,
        }
    }

    pub fn with_class(mut self, class: DnsClass) -> Self {
        self.class = class;
        self
    }

    /// Starts minimization at the root unless it was disabled earlier.
    pub fn enable_minimization(&mut self) {
        if !self.minimization_disabled {
            self.zone_cut = Some(String::new());
        }
    }

    pub fn disable_minimization(&mut self) {
        self.zone_cut = None;
        self.minimization_disabled = true;
    }

    pub fn is_minimizing(&self) -> bool {
        self.zone_cut.is_some()
    }

    pub fn zone_cut(&self) -> Option<&str> {
        self.zone_cut.as_deref()
    }

    /// Moves the zone cut to `cut`. Has no effect while minimization is off.
    pub fn set_zone_cut(&mut self, cut: &str) {
        if self.zone_cut.is_some() {
            self.zone_cut = Some(normalize_name(cut));
        }
    }

    /// The name actually put on the wire: the zone cut plus one more label.
    pub fn minimized_name(&self) -> &str {
        let Some(zone_cut) = self.zone_cut.as_deref() else {
            return &self.name;
        };

        let cut_labels = label_count(zone_cut);
        let mut dots = self.name.rmatch_indices('.').map(|(i, _)| i);
        match dots.nth(cut_labels) {
            Some(i) => &self.name[i + 1..],
            None => &self.name,
        }
    }

    /// Minimized questions always ask for an address type.
    pub fn minimized_type(&self) -> RecordType {
        match (&self.zone_cut, self.record_type) {
            (None, record_type) => record_type,
            (Some(_), RecordType::AAAA) => RecordType::AAAA,
            (Some(_), _) => RecordType::A,
        }
    }

    pub fn is_minimized_name_full(&self) -> bool {
        names_equal(self.minimized_name(), &self.name)
    }
}

impl fmt::Display for DnsQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} {}", self.name, self.class, self.record_type)
    }
}

/// Strips the trailing root dot so that names compare and slice uniformly.
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}

/// Case-insensitive name comparison ignoring a trailing root dot.
pub fn names_equal(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

fn label_count(name: &str) -> usize {
    let name = name.trim_end_matches('.');
    if name.is_empty() {
        0
    } else {
        name.split('.').count()
    }
}
