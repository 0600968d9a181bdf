//! nsreport library: DNS nameserver reporting.
//!
//! For a domain, this library queries the NS set and reports each
//! nameserver with the SOA serial it serves, its resolved addresses
//! (optionally annotated and grouped by ASN ownership via Team Cymru's
//! DNS zones), its CHAOS-class `hostname.bind` identity, and any extra
//! TXT records of interest.
//!
//! # Example
//!
//! ```no_run
//! use nsreport::{run_report, ReportOptions, Resolver, ResolverOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let resolver = Resolver::new(ResolverOptions::default())?;
//! let options = ReportOptions::default();
//! let mut out = std::io::stdout();
//! run_report(&resolver, "example.com", &options, &mut out).await?;
//! # Ok(())
//! # }
//! ```
//!
//! All DNS I/O is async and requires a Tokio runtime.

#![warn(missing_docs)]

pub mod config;
pub mod cymru;
pub mod error;
pub mod initialization;
pub mod record;
pub mod report;
pub mod resolver;
pub mod transport;

pub use config::Config;
pub use error::{CymruError, LookupError};
pub use record::RecordData;
pub use report::{run_report, ReportOptions};
pub use resolver::Resolver;
pub use transport::{DnsTransport, ResolverOptions, Transport};

pub use hickory_proto::rr::{DNSClass, RecordType};
