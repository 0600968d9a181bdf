//! The DNS transport seam.
//!
//! Everything above this module speaks [`Transport`]: a query primitive
//! that takes a name, record type, and query class and returns typed
//! answer records or a classified [`LookupError`]. The production
//! implementation lives in [`hickory`]; tests substitute an in-memory
//! stub.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_proto::rr::{DNSClass, RecordType};

use crate::error::LookupError;
use crate::record::RecordData;

mod hickory;

pub use hickory::DnsTransport;

/// Immutable resolver configuration.
///
/// An empty nameserver set means the system resolver configuration is
/// used. Once a transport is built from these options they never change;
/// retargeting derives a fresh set via [`ResolverOptions::retargeted`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Addresses to query, in preference order. Empty = system default.
    pub nameservers: Vec<IpAddr>,
    /// Per-query timeout. `None` uses the transport default.
    pub timeout: Option<Duration>,
    /// Overall per-lookup lifetime bound, spanning retries.
    pub lifetime: Option<Duration>,
}

impl ResolverOptions {
    /// Pure derive-from constructor for retargeting: the new options carry
    /// the given nameserver set and, when `keep_config` is set, the parent
    /// timeout and lifetime; otherwise they start from defaults.
    pub fn retargeted(&self, nameservers: Vec<IpAddr>, keep_config: bool) -> Self {
        if keep_config {
            Self {
                nameservers,
                timeout: self.timeout,
                lifetime: self.lifetime,
            }
        } else {
            Self {
                nameservers,
                ..Self::default()
            }
        }
    }
}

/// A DNS query primitive.
///
/// Implementations are assumed reliable per call; retry policy belongs to
/// the implementation, not the callers. Errors must distinguish NXDOMAIN,
/// type-level absence, and transport failure (see [`LookupError`]).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Queries `name` for records of `rtype` under `class`.
    ///
    /// An empty answer section is reported as [`LookupError::NoAnswer`],
    /// never as an empty vec.
    async fn query(
        &self,
        name: &str,
        rtype: RecordType,
        class: DNSClass,
    ) -> Result<Vec<RecordData>, LookupError>;

    /// Builds a sibling transport for the given options. Used by
    /// retargeting; the receiver is left untouched.
    fn rebind(&self, options: &ResolverOptions) -> Result<Self, LookupError>
    where
        Self: Sized;
}
