//! Production transport over `hickory-resolver` and `hickory-client`.
//!
//! Internet-class queries go through a `TokioAsyncResolver`; class-
//! qualified queries (CHAOS identity lookups) cannot be expressed through
//! the resolver API, so they are sent directly over a UDP client to the
//! configured nameservers, first answer wins.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_client::client::{AsyncClient, ClientHandle};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::udp::UdpClientStream;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use tokio::net::UdpSocket;

use super::{ResolverOptions, Transport};
use crate::config::{DEFAULT_DNS_TIMEOUT, DNS_ATTEMPTS, DNS_PORT};
use crate::error::LookupError;
use crate::record::RecordData;

/// DNS transport backed by hickory.
#[derive(Clone)]
pub struct DnsTransport {
    resolver: TokioAsyncResolver,
    /// Socket addresses used for class-qualified (non-IN) queries.
    class_targets: Vec<SocketAddr>,
    timeout: Duration,
    lifetime: Option<Duration>,
}

impl DnsTransport {
    /// Builds a transport for the given options.
    ///
    /// With an empty nameserver set the system resolver configuration is
    /// read (falling back to the library default when unreadable);
    /// otherwise the transport is pinned to exactly the given addresses.
    pub fn new(options: &ResolverOptions) -> Result<Self, LookupError> {
        let timeout = options.timeout.unwrap_or(DEFAULT_DNS_TIMEOUT);
        let (config, mut opts) = if options.nameservers.is_empty() {
            system_config()
        } else {
            let group =
                NameServerConfigGroup::from_ips_clear(&options.nameservers, DNS_PORT, true);
            (
                ResolverConfig::from_parts(None, vec![], group),
                ResolverOpts::default(),
            )
        };
        opts.timeout = timeout;
        opts.attempts = DNS_ATTEMPTS;
        // Never append search domains to the names we are asked to query.
        opts.ndots = 0;

        // The system configuration lists each server once per protocol;
        // class queries only want one target per address.
        let mut class_targets: Vec<SocketAddr> = Vec::new();
        for server in config.name_servers() {
            if !class_targets.iter().any(|t| t.ip() == server.socket_addr.ip()) {
                class_targets.push(server.socket_addr);
            }
        }

        let resolver = TokioAsyncResolver::tokio(config, opts);
        Ok(Self {
            resolver,
            class_targets,
            timeout,
            lifetime: options.lifetime,
        })
    }

    async fn lookup_in(
        &self,
        name: &str,
        rtype: RecordType,
    ) -> Result<Vec<RecordData>, LookupError> {
        let lookup = self
            .bounded(name, self.resolver.lookup(name, rtype))
            .await?
            .map_err(|e| classify_resolve_error(name, &e))?;
        let records: Vec<RecordData> = lookup
            .record_iter()
            .filter(|record| record.record_type() == rtype)
            .filter_map(RecordData::from_record)
            .collect();
        if records.is_empty() {
            // A CNAME-only lookup result carries no records of the
            // requested type.
            return Err(LookupError::NoAnswer(name.to_string()));
        }
        Ok(records)
    }

    async fn lookup_class(
        &self,
        name: &str,
        rtype: RecordType,
        class: DNSClass,
    ) -> Result<Vec<RecordData>, LookupError> {
        let qname = Name::from_utf8(name).map_err(|e| LookupError::Transport {
            name: name.to_string(),
            message: format!("invalid query name: {e}"),
        })?;
        let mut last_error = LookupError::Transport {
            name: name.to_string(),
            message: "no nameservers available for class-qualified queries".to_string(),
        };
        for target in &self.class_targets {
            match self.query_one_server(*target, &qname, rtype, class).await {
                Ok(records) => return Ok(records),
                Err(e) => {
                    log::debug!("class {class:?} query for {name} via {target} failed: {e}");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn query_one_server(
        &self,
        target: SocketAddr,
        qname: &Name,
        rtype: RecordType,
        class: DNSClass,
    ) -> Result<Vec<RecordData>, LookupError> {
        let transport_err = |message: String| LookupError::Transport {
            name: qname.to_utf8(),
            message,
        };

        let stream = UdpClientStream::<UdpSocket>::with_timeout(target, self.timeout);
        let (mut client, background) = AsyncClient::connect(stream)
            .await
            .map_err(|e| transport_err(e.to_string()))?;
        let background = tokio::spawn(background);

        let outcome = self
            .bounded(&qname.to_utf8(), client.query(qname.clone(), class, rtype))
            .await
            .and_then(|r| r.map_err(|e| transport_err(e.to_string())));
        background.abort();
        let response = outcome?;

        match response.response_code() {
            ResponseCode::NXDomain => Err(LookupError::NameNotFound(qname.to_utf8())),
            ResponseCode::NoError => {
                let records: Vec<RecordData> = response
                    .answers()
                    .iter()
                    .filter(|record| {
                        record.record_type() == rtype && record.dns_class() == class
                    })
                    .filter_map(RecordData::from_record)
                    .collect();
                if records.is_empty() {
                    Err(LookupError::NoAnswer(qname.to_utf8()))
                } else {
                    Ok(records)
                }
            }
            code => Err(transport_err(format!("server responded {code:?}"))),
        }
    }

    /// Applies the configured lifetime bound to a lookup future.
    async fn bounded<F: std::future::Future>(
        &self,
        name: &str,
        fut: F,
    ) -> Result<F::Output, LookupError> {
        match self.lifetime {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                LookupError::Transport {
                    name: name.to_string(),
                    message: format!("lookup exceeded the {limit:?} lifetime bound"),
                }
            }),
            None => Ok(fut.await),
        }
    }
}

#[async_trait]
impl Transport for DnsTransport {
    async fn query(
        &self,
        name: &str,
        rtype: RecordType,
        class: DNSClass,
    ) -> Result<Vec<RecordData>, LookupError> {
        match class {
            DNSClass::IN => self.lookup_in(name, rtype).await,
            other => self.lookup_class(name, rtype, other).await,
        }
    }

    fn rebind(&self, options: &ResolverOptions) -> Result<Self, LookupError> {
        Self::new(options)
    }
}

/// Reads the system resolver configuration, falling back to the library
/// default (public resolvers) when it cannot be read.
fn system_config() -> (ResolverConfig, ResolverOpts) {
    match hickory_resolver::system_conf::read_system_conf() {
        Ok(parts) => parts,
        Err(e) => {
            log::warn!("failed to read system resolver configuration: {e}; using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    }
}

/// Maps a hickory resolve error onto the lookup taxonomy: NXDOMAIN and
/// type-level absence both surface as `NoRecordsFound`, distinguished by
/// the response code; everything else is a transport failure.
fn classify_resolve_error(name: &str, err: &ResolveError) -> LookupError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NXDomain {
                LookupError::NameNotFound(name.to_string())
            } else {
                LookupError::NoAnswer(name.to_string())
            }
        }
        _ => LookupError::Transport {
            name: name.to_string(),
            message: err.to_string(),
        },
    }
}
