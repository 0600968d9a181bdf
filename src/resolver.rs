//! The query façade over a DNS transport.
//!
//! [`Resolver`] wraps a [`Transport`] with the multi-type, single-answer,
//! and retargeting operations the report layer needs. It holds no mutable
//! state: configuration is fixed at construction and retargeting produces
//! a new, independent instance.

use std::net::IpAddr;

use hickory_proto::rr::{DNSClass, RecordType};

use crate::error::LookupError;
use crate::record::RecordData;
use crate::transport::{DnsTransport, ResolverOptions, Transport};

/// A configured DNS resolver.
#[derive(Clone)]
pub struct Resolver<T = DnsTransport> {
    transport: T,
    options: ResolverOptions,
}

impl Resolver<DnsTransport> {
    /// Builds a resolver over the production hickory transport.
    pub fn new(options: ResolverOptions) -> Result<Self, LookupError> {
        let transport = DnsTransport::new(&options)?;
        Ok(Self { transport, options })
    }
}

impl<T: Transport> Resolver<T> {
    /// Wraps an existing transport. The options are informational here;
    /// the transport is expected to already honor them.
    pub fn with_transport(transport: T, options: ResolverOptions) -> Self {
        Self { transport, options }
    }

    /// The configuration this resolver was built with.
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Queries `name` for records of `rtype` under the Internet class.
    pub async fn query(
        &self,
        name: &str,
        rtype: RecordType,
    ) -> Result<Vec<RecordData>, LookupError> {
        self.query_class(name, rtype, DNSClass::IN).await
    }

    /// Queries `name` for records of `rtype` under an explicit class.
    pub async fn query_class(
        &self,
        name: &str,
        rtype: RecordType,
        class: DNSClass,
    ) -> Result<Vec<RecordData>, LookupError> {
        self.transport.query(name, rtype, class).await
    }

    /// Queries for exactly one record; more than one answer is a
    /// [`LookupError::MultipleAnswers`] error.
    pub async fn query_single(
        &self,
        name: &str,
        rtype: RecordType,
    ) -> Result<RecordData, LookupError> {
        self.query_single_class(name, rtype, DNSClass::IN).await
    }

    async fn query_single_class(
        &self,
        name: &str,
        rtype: RecordType,
        class: DNSClass,
    ) -> Result<RecordData, LookupError> {
        let mut records = self.query_class(name, rtype, class).await?;
        match records.len() {
            0 => Err(LookupError::NoAnswer(name.to_string())),
            1 => Ok(records.remove(0)),
            count => Err(LookupError::MultipleAnswers {
                name: name.to_string(),
                count,
            }),
        }
    }

    /// Single-TXT convenience query.
    pub async fn query_txt(&self, name: &str) -> Result<RecordData, LookupError> {
        self.query_single(name, RecordType::TXT).await
    }

    /// Single-TXT query under the CHAOS class.
    pub async fn chaos_txt(&self, name: &str) -> Result<RecordData, LookupError> {
        self.query_single_class(name, RecordType::TXT, DNSClass::CH).await
    }

    /// Queries A then AAAA, accumulating answers across both types.
    ///
    /// Type-level absence is swallowed per type: a name with only an A
    /// record yields just that record, and a name with neither yields an
    /// empty vec. NXDOMAIN and transport failures propagate.
    pub async fn query_any(&self, name: &str) -> Result<Vec<RecordData>, LookupError> {
        let mut records = Vec::new();
        for rtype in [RecordType::A, RecordType::AAAA] {
            match self.query(name, rtype).await {
                Ok(mut found) => records.append(&mut found),
                Err(e) if e.is_no_answer() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    /// Resolves `name` to its addresses, trying A then AAAA.
    ///
    /// Each type's DNS failure is swallowed individually; the call fails
    /// with [`LookupError::NameNotFound`] only when the accumulated
    /// address set is empty.
    pub async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, LookupError> {
        let mut addresses = Vec::new();
        for rtype in [RecordType::A, RecordType::AAAA] {
            match self.query(name, rtype).await {
                Ok(records) => addresses.extend(records.iter().filter_map(RecordData::ip_addr)),
                Err(e) => log::debug!("{rtype} lookup for {name} failed during resolve: {e}"),
            }
        }
        if addresses.is_empty() {
            Err(LookupError::NameNotFound(name.to_string()))
        } else {
            Ok(addresses)
        }
    }

    /// Builds a new resolver pinned to the resolved addresses of
    /// `target`, copying this resolver's timeout/lifetime configuration
    /// when `keep_config` is set. The receiver is never mutated. Fails
    /// the way [`Resolver::resolve`] fails when the target has no
    /// addresses.
    pub async fn retarget(&self, target: &str, keep_config: bool) -> Result<Self, LookupError> {
        let addresses = self.resolve(target).await?;
        let options = self.options.retargeted(addresses, keep_config);
        let transport = self.transport.rebind(&options)?;
        Ok(Self { transport, options })
    }

    /// Queries the `hostname.bind` CHAOS identity of the configured
    /// nameservers. This is advisory diagnostic data: any DNS failure
    /// maps to `None`, never to an error.
    pub async fn hostname_bind(&self) -> Option<RecordData> {
        match self.chaos_txt("hostname.bind").await {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("hostname.bind identity query failed: {e}");
                None
            }
        }
    }
}
