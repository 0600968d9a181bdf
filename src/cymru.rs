//! Team Cymru IP-to-ASN lookup client.
//!
//! Maps an IP address literal to its origin ASN metadata via reverse-
//! label TXT queries under `origin.<zone>` / `origin6.<zone>`, and lazily
//! to the AS holder description via the `AS<number>.<zone>` form. The
//! zone answers with pipe-delimited TXT records of exactly five fields;
//! answers of any other shape are skipped in favor of the next one.

use std::net::{Ipv4Addr, Ipv6Addr};

use hickory_proto::rr::RecordType;
use tokio::sync::OnceCell;

use crate::config::DEFAULT_ASN_ZONE;
use crate::error::{CymruError, LookupError};
use crate::record::RecordData;
use crate::resolver::Resolver;
use crate::transport::Transport;

/// ASN ownership metadata for a single IP address.
///
/// The origin fields are fetched eagerly at lookup time; the holder
/// description is fetched on first access and cached for the lifetime of
/// the instance.
#[derive(Debug, Clone)]
pub struct AsnView {
    zone: String,
    /// The address this view describes, as given to the lookup.
    pub ip: String,
    /// Origin AS number (kept textual: the zone may list several).
    pub asn: String,
    /// Announced prefix covering the address.
    pub prefix: String,
    /// Country code of the announcement.
    pub cc: String,
    /// Registry the prefix is registered with.
    pub rir: String,
    /// Prefix registration date.
    pub regdate: String,
    details: OnceCell<AsnDescription>,
}

/// Parsed result of the `AS<number>` description query.
#[derive(Debug, Clone)]
pub struct AsnDescription {
    /// AS number as reported by the description record.
    pub asn: String,
    /// Country code column of the description record.
    pub registry_cc: String,
    /// Registry column of the description record.
    pub rir: String,
    /// Registration date column of the description record.
    pub regdate: String,
    /// The unparsed holder text.
    pub raw: String,
    /// Country code stripped from a trailing `,CC` suffix, or empty.
    pub cc: String,
    /// Registry object token preceding `" - "`, or empty.
    pub object: String,
    /// Free-text holder description.
    pub descr: String,
}

/// Looks up ASN ownership for an IP address under the default zone.
pub async fn ip_to_asn<T: Transport>(
    resolver: &Resolver<T>,
    ip: &str,
) -> Result<AsnView, CymruError> {
    ip_to_asn_in_zone(resolver, ip, DEFAULT_ASN_ZONE).await
}

/// Looks up ASN ownership for an IP address under an explicit zone.
///
/// The address must be a valid IPv4 or IPv6 literal; input mixing both
/// forms (e.g. `::ffff:1.2.3.4`) is rejected without issuing a query.
pub async fn ip_to_asn_in_zone<T: Transport>(
    resolver: &Resolver<T>,
    ip: &str,
    zone: &str,
) -> Result<AsnView, CymruError> {
    let labels = origin_labels(ip)?;
    let qname = format!("{labels}.{zone}");
    let [asn, prefix, cc, rir, regdate] = cymru_query(resolver, &qname).await?;
    Ok(AsnView {
        zone: zone.to_string(),
        ip: ip.to_string(),
        asn,
        prefix,
        cc,
        rir,
        regdate,
        details: OnceCell::new(),
    })
}

impl AsnView {
    /// The AS holder description, fetched via `AS<number>.<zone>` on
    /// first access and cached: the second query runs at most once per
    /// instance no matter how often this is called.
    pub async fn description<T: Transport>(
        &self,
        resolver: &Resolver<T>,
    ) -> Result<&AsnDescription, CymruError> {
        self.details
            .get_or_try_init(|| async {
                let qname = format!("AS{}.{}", self.asn, self.zone);
                let fields = cymru_query(resolver, &qname).await?;
                Ok(parse_description(fields))
            })
            .await
    }

    /// Annotation text for report lines: `AS<number> <holder>`.
    pub async fn asn_repr<T: Transport>(
        &self,
        resolver: &Resolver<T>,
    ) -> Result<String, CymruError> {
        let description = self.description(resolver).await?;
        Ok(format!("AS{} {}", self.asn, description.descr))
    }
}

/// Builds the reverse-label query prefix for an address literal:
/// reversed dotted octets under `origin` for IPv4, reversed hex nibbles
/// under `origin6` for IPv6.
fn origin_labels(ip: &str) -> Result<String, CymruError> {
    let invalid = || CymruError::InvalidAddress(ip.to_string());
    if ip.is_empty() || (ip.contains(':') && ip.contains('.')) {
        return Err(invalid());
    }
    if ip.contains(':') {
        let addr: Ipv6Addr = ip.parse().map_err(|_| invalid())?;
        Ok(format!("{}.origin6", reverse_nibbles(&addr)))
    } else if ip.contains('.') {
        let addr: Ipv4Addr = ip.parse().map_err(|_| invalid())?;
        let o = addr.octets();
        Ok(format!("{}.{}.{}.{}.origin", o[3], o[2], o[1], o[0]))
    } else {
        Err(invalid())
    }
}

/// Renders an IPv6 address as dot-separated hex nibble labels, least
/// significant nibble first.
pub fn reverse_nibbles(addr: &Ipv6Addr) -> String {
    let mut labels = Vec::with_capacity(32);
    for byte in addr.octets().iter().rev() {
        labels.push(format!("{:x}", byte & 0x0f));
        labels.push(format!("{:x}", byte >> 4));
    }
    labels.join(".")
}

/// Issues a TXT query and scans the answers for the first one shaped as
/// five pipe-delimited fields. Wrongly-shaped answers are skipped; no
/// cross-answer consistency is checked.
async fn cymru_query<T: Transport>(
    resolver: &Resolver<T>,
    qname: &str,
) -> Result<[String; 5], CymruError> {
    let answers = resolver
        .query(qname, RecordType::TXT)
        .await
        .map_err(|e| match e {
            LookupError::NameNotFound(_) => CymruError::NameNotFound(qname.to_string()),
            other => CymruError::Dns(other),
        })?;
    for answer in &answers {
        let RecordData::Txt(strings) = answer else { continue };
        let Some(first) = strings.first() else { continue };
        if let Some(fields) = split_fields(first) {
            return Ok(fields);
        }
    }
    Err(CymruError::NoSuitableAnswer(qname.to_string()))
}

fn split_fields(text: &str) -> Option<[String; 5]> {
    let fields: Vec<String> = text.split('|').map(|f| f.trim().to_string()).collect();
    fields.try_into().ok()
}

/// Decomposes the holder text of an `AS<number>` answer: a trailing
/// `,CC` suffix (matching the record's own country column) is stripped
/// and recorded, then the remainder splits on the first `" - "` into a
/// registry object token and the free-text description.
fn parse_description(fields: [String; 5]) -> AsnDescription {
    let [asn, registry_cc, rir, regdate, raw] = fields;
    let (cc, object, descr) = {
        let mut remainder = raw.as_str();
        let suffix = format!(",{registry_cc}");
        let cc = if !registry_cc.is_empty() && remainder.ends_with(&suffix) {
            remainder = &remainder[..remainder.len() - suffix.len()];
            registry_cc.clone()
        } else {
            String::new()
        };
        match remainder.split_once(" - ") {
            Some((object, descr)) => (cc, object.to_string(), descr.to_string()),
            None => (cc, String::new(), remainder.to_string()),
        }
    };
    AsnDescription {
        asn,
        registry_cc,
        rir,
        regdate,
        raw,
        cc,
        object,
        descr,
    }
}
