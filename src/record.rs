//! Typed DNS answer records and their textual rendering.
//!
//! Answers cross the transport seam as a closed set of variants rather
//! than raw rdata, so the report layer can render and aggregate without
//! runtime type inspection.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use hickory_proto::rr::{RData, Record, RecordType};

/// A single answer record from a DNS query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    /// An IPv4 address record.
    A(Ipv4Addr),
    /// An IPv6 address record.
    Aaaa(Ipv6Addr),
    /// A nameserver record, carrying the target name.
    Ns(String),
    /// A start-of-authority record.
    Soa {
        /// Primary master name.
        mname: String,
        /// Responsible-party mailbox name.
        rname: String,
        /// Zone version counter.
        serial: u32,
        /// Secondary refresh interval.
        refresh: i32,
        /// Retry interval after a failed refresh.
        retry: i32,
        /// Expiry bound for unrefreshed secondaries.
        expire: i32,
        /// Negative-caching TTL.
        minimum: u32,
    },
    /// A text record, one entry per character-string.
    Txt(Vec<String>),
    /// Any record type not modeled above, kept in rendered form.
    Other {
        /// The record type as reported by the transport.
        rtype: RecordType,
        /// The transport's textual rendering of the rdata.
        text: String,
    },
}

impl RecordData {
    /// Converts a wire record into the typed form. Returns `None` for
    /// records without rdata (e.g. update-style placeholders).
    pub fn from_record(record: &Record) -> Option<Self> {
        let rdata = record.data()?;
        Some(match rdata {
            RData::A(a) => RecordData::A(a.0),
            RData::AAAA(a) => RecordData::Aaaa(a.0),
            RData::NS(ns) => RecordData::Ns(ns.to_utf8()),
            RData::SOA(soa) => RecordData::Soa {
                mname: soa.mname().to_utf8(),
                rname: soa.rname().to_utf8(),
                serial: soa.serial(),
                refresh: soa.refresh(),
                retry: soa.retry(),
                expire: soa.expire(),
                minimum: soa.minimum(),
            },
            RData::TXT(txt) => RecordData::Txt(
                txt.iter()
                    .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                    .collect(),
            ),
            other => RecordData::Other {
                rtype: record.record_type(),
                text: other.to_string(),
            },
        })
    }

    /// The record type of this answer.
    pub fn kind(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::AAAA,
            RecordData::Ns(_) => RecordType::NS,
            RecordData::Soa { .. } => RecordType::SOA,
            RecordData::Txt(_) => RecordType::TXT,
            RecordData::Other { rtype, .. } => *rtype,
        }
    }

    /// The address carried by an A or AAAA record, if any.
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self {
            RecordData::A(addr) => Some(IpAddr::V4(*addr)),
            RecordData::Aaaa(addr) => Some(IpAddr::V6(*addr)),
            _ => None,
        }
    }

    /// Renders the record as report text.
    ///
    /// TXT records with exactly one string render as that bare string;
    /// multi-string TXT answers render quoted and space-joined. NS targets
    /// drop the trailing root-label dot. Rendering is pure: repeated calls
    /// yield identical text.
    pub fn render(&self) -> String {
        match self {
            RecordData::A(addr) => addr.to_string(),
            RecordData::Aaaa(addr) => addr.to_string(),
            RecordData::Ns(target) => target.trim_end_matches('.').to_string(),
            RecordData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => format!("{mname} {rname} {serial} {refresh} {retry} {expire} {minimum}"),
            RecordData::Txt(strings) => match strings.as_slice() {
                [single] => single.clone(),
                many => many
                    .iter()
                    .map(|s| format!("\"{s}\""))
                    .collect::<Vec<_>>()
                    .join(" "),
            },
            RecordData::Other { text, .. } => text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_addresses_as_plain_text() {
        assert_eq!(RecordData::A("192.0.2.7".parse().unwrap()).render(), "192.0.2.7");
        assert_eq!(
            RecordData::Aaaa("2001:db8::1".parse().unwrap()).render(),
            "2001:db8::1"
        );
    }

    #[test]
    fn ns_render_strips_trailing_root_dot() {
        let record = RecordData::Ns("ns1.example.com.".to_string());
        assert_eq!(record.render(), "ns1.example.com");
    }

    #[test]
    fn single_string_txt_renders_bare() {
        let record = RecordData::Txt(vec!["v=spf1 -all".to_string()]);
        assert_eq!(record.render(), "v=spf1 -all");
    }

    #[test]
    fn multi_string_txt_renders_quoted() {
        let record = RecordData::Txt(vec!["one".to_string(), "two".to_string()]);
        assert_eq!(record.render(), "\"one\" \"two\"");
    }

    #[test]
    fn soa_renders_in_zone_file_order() {
        let record = RecordData::Soa {
            mname: "ns1.example.com.".to_string(),
            rname: "hostmaster.example.com.".to_string(),
            serial: 2021120301,
            refresh: 7200,
            retry: 3600,
            expire: 1209600,
            minimum: 3600,
        };
        assert_eq!(
            record.render(),
            "ns1.example.com. hostmaster.example.com. 2021120301 7200 3600 1209600 3600"
        );
    }

    #[test]
    fn render_is_idempotent() {
        let records = [
            RecordData::Ns("ns1.example.com.".to_string()),
            RecordData::Txt(vec!["only".to_string()]),
            RecordData::A("198.51.100.1".parse().unwrap()),
        ];
        for record in &records {
            assert_eq!(record.render(), record.render());
        }
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(RecordData::Ns("ns".into()).kind(), RecordType::NS);
        assert_eq!(RecordData::Txt(vec![]).kind(), RecordType::TXT);
    }
}
