//! Nameserver report orchestration and rendering.
//!
//! For a domain, queries its NS set, then builds one sub-report per
//! nameserver: SOA serial as seen by that server, resolved addresses
//! (optionally ASN-annotated and grouped), CHAOS identity, and any extra
//! TXT records. Sub-reports run concurrently but render into private
//! buffers flushed in lexicographic nameserver order, so output is
//! deterministic. A sub-report failure renders inline and never stops
//! the rest of the report unless error propagation is enabled.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use futures::future::join_all;
use hickory_proto::rr::RecordType;
use tokio::sync::OnceCell;

use crate::config::{DEFAULT_ASN_ZONE, SOA_SENTINEL};
use crate::cymru::{self, AsnView};
use crate::error::LookupError;
use crate::record::RecordData;
use crate::resolver::Resolver;
use crate::transport::Transport;

/// What to include in a report and how to render it.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Single-line-per-nameserver output (the default) vs. per-family
    /// blocks.
    pub brief: bool,
    /// Annotate addresses with ASN ownership.
    pub asn: bool,
    /// Query each nameserver's `hostname.bind` CHAOS identity.
    pub chaos: bool,
    /// Report the domain's SOA serial as seen by each nameserver.
    pub soa: bool,
    /// Print the identity of the resolver used for the lookups.
    pub resolver_id: bool,
    /// Extra TXT record names to query from each nameserver.
    pub extra_txt: Vec<String>,
    /// Propagate sub-report errors instead of rendering them inline.
    pub propagate_errors: bool,
    /// DNS zone for ASN lookups.
    pub asn_zone: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            brief: true,
            asn: false,
            chaos: false,
            soa: true,
            resolver_id: false,
            extra_txt: Vec::new(),
            propagate_errors: false,
            asn_zone: DEFAULT_ASN_ZONE.to_string(),
        }
    }
}

/// Runs the nameserver report for `domain`, writing line-oriented text
/// to `out`.
///
/// Fatal conditions are NXDOMAIN or a transport failure on the domain's
/// own NS query; an empty NS set is valid and produces no per-server
/// output. Everything below the NS query is per-nameserver and rendered
/// inline on failure (unless `propagate_errors` is set).
pub async fn run_report<T, W>(
    resolver: &Resolver<T>,
    domain: &str,
    options: &ReportOptions,
    out: &mut W,
) -> Result<()>
where
    T: Transport,
    W: Write,
{
    if options.resolver_id {
        let identity = render_identity(resolver.hostname_bind().await);
        writeln!(out, "Resolver: {identity}")?;
    }

    let mut nameservers: Vec<String> = match resolver.query(domain, RecordType::NS).await {
        Ok(records) => records.iter().map(RecordData::render).collect(),
        Err(e) if e.is_no_answer() => Vec::new(),
        Err(e) => return Err(e).with_context(|| format!("NS lookup for {domain} failed")),
    };
    nameservers.sort();

    let sub_reports = join_all(
        nameservers
            .iter()
            .map(|ns| nameserver_report(resolver, domain, ns, options)),
    )
    .await;

    for (ns, outcome) in nameservers.iter().zip(sub_reports) {
        match outcome {
            Ok(text) => out.write_all(text.as_bytes())?,
            Err(e) if options.propagate_errors => {
                return Err(e).with_context(|| format!("report for nameserver {ns} failed"))
            }
            Err(e) => {
                log::warn!("report for nameserver {ns} failed: {e:#}");
                let prefix = if options.brief { "" } else { "=> " };
                writeln!(out, "{prefix}{ns} [error: {e:#}]")?;
            }
        }
    }
    Ok(())
}

/// Builds the buffered sub-report for one nameserver.
///
/// The retargeted child resolver and the SOA serial are compute-once
/// cells, created only when something in the requested output needs
/// them. The serial renders as the `#---` sentinel on any DNS failure,
/// including a failed retarget on that path.
async fn nameserver_report<T: Transport>(
    resolver: &Resolver<T>,
    domain: &str,
    ns: &str,
    options: &ReportOptions,
) -> Result<String> {
    let child: OnceCell<Resolver<T>> = OnceCell::new();
    let child = &child;
    let retargeted = || child.get_or_try_init(|| resolver.retarget(ns, true));

    let serial_cell: OnceCell<String> = OnceCell::new();
    let serial = || {
        serial_cell.get_or_init(|| async {
            let lookup: Result<String, LookupError> = async {
                let r2 = retargeted().await?;
                let records = r2.query(domain, RecordType::SOA).await?;
                match records.first() {
                    Some(RecordData::Soa { serial, .. }) => Ok(format!("#{serial}")),
                    _ => Err(LookupError::NoAnswer(domain.to_string())),
                }
            }
            .await;
            match lookup {
                Ok(serial) => serial,
                Err(e) => {
                    log::debug!("SOA serial for {domain} via {ns} unavailable: {e}");
                    SOA_SENTINEL.to_string()
                }
            }
        })
    };

    let mut text = String::new();
    if options.brief {
        let mut parts: Vec<String> = vec![ns.to_string()];
        if options.soa {
            parts.push(serial().await.clone());
        }
        let addresses = if options.asn {
            grouped_addresses(resolver, ns, &options.asn_zone).await?
        } else {
            resolver
                .query_any(ns)
                .await
                .with_context(|| format!("address lookup for {ns} failed"))?
                .iter()
                .map(RecordData::render)
                .collect::<Vec<_>>()
                .join(" ")
        };
        parts.push(format!("({addresses})"));
        if options.chaos {
            let r2 = retargeted().await?;
            parts.push(render_identity(r2.hostname_bind().await));
        }
        for name in &options.extra_txt {
            let r2 = retargeted().await?;
            parts.push(extra_txt_value(r2, name).await);
        }
        writeln!(text, "{}", parts.join(" "))?;
    } else {
        let mut header = format!("=> {ns}");
        if options.soa {
            write!(header, " {}", serial().await)?;
        }
        if options.chaos {
            let r2 = retargeted().await?;
            write!(header, " <{}>", render_identity(r2.hostname_bind().await))?;
        }
        writeln!(text, "{header}")?;

        for (family, rtype) in [("IPv4", RecordType::A), ("IPv6", RecordType::AAAA)] {
            match resolver.query(ns, rtype).await {
                Ok(records) => {
                    let rendered = if options.asn {
                        annotated_addresses(resolver, &records, &options.asn_zone).await?
                    } else {
                        records
                            .iter()
                            .map(RecordData::render)
                            .collect::<Vec<_>>()
                            .join(", ")
                    };
                    writeln!(text, "\t{family}: {rendered}")?;
                }
                // A family with no records is simply omitted.
                Err(e) if e.is_no_answer() => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("{rtype} lookup for {ns} failed"))
                }
            }
        }

        for name in &options.extra_txt {
            let r2 = retargeted().await?;
            writeln!(text, "\t{name}: {}", extra_txt_value(r2, name).await)?;
        }
    }
    Ok(text)
}

/// One extra-TXT line value; failures render inline so a single broken
/// record never takes down the rest of the sub-report.
async fn extra_txt_value<T: Transport>(resolver: &Resolver<T>, name: &str) -> String {
    match resolver.query_txt(name).await {
        Ok(record) => record.render(),
        Err(e) => format!("[error: {e}]"),
    }
}

fn render_identity(record: Option<RecordData>) -> String {
    record.map(|r| r.render()).unwrap_or_else(|| "?".to_string())
}

/// Renders the ASN-grouped address list for a nameserver: addresses
/// sorted by (ASN, address) and grouped by ASN, each group annotated
/// with the AS holder description.
async fn grouped_addresses<T: Transport>(
    resolver: &Resolver<T>,
    ns: &str,
    zone: &str,
) -> Result<String> {
    let records = resolver
        .query_any(ns)
        .await
        .with_context(|| format!("address lookup for {ns} failed"))?;
    let mut entries: Vec<(AsnView, String)> = Vec::with_capacity(records.len());
    for record in &records {
        let addr = record.render();
        let view = cymru::ip_to_asn_in_zone(resolver, &addr, zone)
            .await
            .with_context(|| format!("ASN lookup for {addr} failed"))?;
        entries.push((view, addr));
    }
    entries.sort_by(|a, b| {
        asn_sort_key(&a.0.asn)
            .cmp(&asn_sort_key(&b.0.asn))
            .then_with(|| a.1.cmp(&b.1))
    });

    let mut groups: Vec<String> = Vec::new();
    let mut start = 0;
    while start < entries.len() {
        let view = &entries[start].0;
        let mut end = start + 1;
        while end < entries.len() && entries[end].0.asn == view.asn {
            end += 1;
        }
        let addrs: Vec<&str> = entries[start..end].iter().map(|(_, a)| a.as_str()).collect();
        let repr = view
            .asn_repr(resolver)
            .await
            .with_context(|| format!("AS{} description lookup failed", view.asn))?;
        groups.push(format!("{} [{}]", addrs.join(" "), repr));
        start = end;
    }
    Ok(groups.join(", "))
}

/// Renders a per-address annotated list for verbose family blocks.
async fn annotated_addresses<T: Transport>(
    resolver: &Resolver<T>,
    records: &[RecordData],
    zone: &str,
) -> Result<String> {
    let mut rendered = Vec::with_capacity(records.len());
    for record in records {
        let addr = record.render();
        let view = cymru::ip_to_asn_in_zone(resolver, &addr, zone)
            .await
            .with_context(|| format!("ASN lookup for {addr} failed"))?;
        let repr = view
            .asn_repr(resolver)
            .await
            .with_context(|| format!("AS{} description lookup failed", view.asn))?;
        rendered.push(format!("{addr} [{repr}]"));
    }
    Ok(rendered.join(", "))
}

/// Sort key for ASN grouping: numeric when the field is a single AS
/// number, with the raw text as a stable tiebreak (multi-origin fields
/// sort after all numeric ones).
fn asn_sort_key(asn: &str) -> (u64, String) {
    (asn.parse().unwrap_or(u64::MAX), asn.to_string())
}
