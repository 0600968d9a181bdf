//! Command-line options and crate-wide defaults.

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::report::ReportOptions;
use crate::transport::ResolverOptions;

/// Port DNS queries are sent to.
pub const DNS_PORT: u16 = 53;

/// Per-query timeout applied when none is given on the command line.
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// Query attempts per nameserver before giving up.
pub const DNS_ATTEMPTS: usize = 2;

/// Default DNS zone for Team Cymru ASN lookups.
pub const DEFAULT_ASN_ZONE: &str = "asn.cymru.com";

/// Rendered in place of a SOA serial that could not be fetched.
pub const SOA_SENTINEL: &str = "#---";

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational messages and above.
    Info,
    /// Debug detail and above.
    Debug,
    /// Everything.
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Command-line options.
///
/// Brief output is the default; `-a` or any `-E` selects verbose mode
/// (an explicit `-b` keeps brief output even with `-E`).
#[derive(Debug, Parser)]
#[command(
    name = "nsreport",
    about = "Reports a domain's nameservers with per-server serials, addresses, and ASN ownership."
)]
pub struct Config {
    /// Domain name to be looked up
    pub domain: String,

    /// Force brief (one line per nameserver) output
    #[arg(short, long, conflicts_with = "all")]
    pub brief: bool,

    /// Verbose output: per-family address blocks, one line per detail
    #[arg(short, long)]
    pub all: bool,

    /// Annotate addresses with ASN ownership (Team Cymru lookup)
    #[arg(short = 'A', long)]
    pub asn: bool,

    /// DNS zone for ASN lookups
    #[arg(long, value_name = "ZONE", default_value = DEFAULT_ASN_ZONE)]
    pub asn_zone: String,

    /// Query each nameserver's hostname.bind (CHAOS) identity
    #[arg(short = 'C', long)]
    pub chaos: bool,

    /// Report the identity of the resolver used for the lookups
    #[arg(short = 'R', long)]
    pub resolver_id: bool,

    /// Disable the per-nameserver SOA serial report
    #[arg(long)]
    pub no_soa: bool,

    /// Extra TXT record names to query from each nameserver
    /// (changes the default to verbose mode)
    #[arg(short = 'E', long = "extra-txt", value_name = "NAME")]
    pub extra_txt: Vec<String>,

    /// Query these resolver addresses instead of the system ones
    #[arg(short = 'r', long = "resolver", value_name = "IP")]
    pub resolver: Vec<IpAddr>,

    /// Per-query timeout in seconds (fractional values allowed)
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Overall lifetime bound per lookup in seconds (fractional values allowed)
    #[arg(short = 'l', long, value_name = "SECS")]
    pub lifetime: Option<f64>,

    /// Propagate per-nameserver errors instead of rendering them inline
    #[arg(long)]
    pub exceptions: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

impl Config {
    /// Whether the report renders in brief mode after applying the
    /// `-a`/`-b`/`-E` interactions.
    pub fn brief_mode(&self) -> bool {
        if self.all {
            false
        } else if self.brief {
            true
        } else {
            self.extra_txt.is_empty()
        }
    }

    /// Resolver configuration derived from the command line.
    pub fn resolver_options(&self) -> Result<ResolverOptions> {
        Ok(ResolverOptions {
            nameservers: self.resolver.clone(),
            timeout: self
                .timeout
                .map(Duration::try_from_secs_f64)
                .transpose()
                .context("invalid --timeout value")?,
            lifetime: self
                .lifetime
                .map(Duration::try_from_secs_f64)
                .transpose()
                .context("invalid --lifetime value")?,
        })
    }

    /// Report configuration derived from the command line.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            brief: self.brief_mode(),
            asn: self.asn,
            chaos: self.chaos,
            soa: !self.no_soa,
            resolver_id: self.resolver_id,
            extra_txt: self.extra_txt.clone(),
            propagate_errors: self.exceptions,
            asn_zone: self.asn_zone.clone(),
        }
    }
}
