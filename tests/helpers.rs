//! Shared in-memory stub transport for integration tests.
//!
//! Zone data is keyed by (serving address, name, type, class), so
//! retargeted resolvers observe different answers than the root one:
//! the root context is the `None` server (no explicit nameservers), and
//! a retargeted resolver's context is the first address it was pinned
//! to. A name with no entries at a context answers NXDOMAIN; a name
//! with entries of other types answers NoAnswer, mirroring real DNS.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nsreport::resolver::Resolver;
use nsreport::{DNSClass, LookupError, RecordData, RecordType, ResolverOptions, Transport};

type Key = (Option<IpAddr>, String, RecordType, DNSClass);

/// A canned response for one (server, name, type, class) key.
#[derive(Debug, Clone)]
pub enum Canned {
    Records(Vec<RecordData>),
    NoAnswer,
    NxDomain,
    Fail(&'static str),
}

#[derive(Default)]
struct ZoneData {
    answers: Mutex<HashMap<Key, Canned>>,
    log: Mutex<Vec<Key>>,
}

/// Transport stub resolving against in-memory zone data.
#[derive(Clone, Default)]
pub struct StubTransport {
    zones: Arc<ZoneData>,
    server: Option<IpAddr>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver over this stub with default (system-context) options.
    pub fn resolver(&self) -> Resolver<StubTransport> {
        Resolver::with_transport(self.clone(), ResolverOptions::default())
    }

    /// A resolver over this stub with explicit options.
    pub fn resolver_with(&self, options: ResolverOptions) -> Resolver<StubTransport> {
        let transport = self.rebind(&options).unwrap();
        Resolver::with_transport(transport, options)
    }

    pub fn insert(
        &self,
        server: Option<&str>,
        name: &str,
        rtype: RecordType,
        class: DNSClass,
        canned: Canned,
    ) {
        let key = (
            server.map(|s| s.parse().expect("valid server address")),
            normalize(name),
            rtype,
            class,
        );
        self.zones.answers.lock().unwrap().insert(key, canned);
    }

    /// Registers Internet-class answer records.
    pub fn answer(
        &self,
        server: Option<&str>,
        name: &str,
        rtype: RecordType,
        records: Vec<RecordData>,
    ) {
        self.insert(server, name, rtype, DNSClass::IN, Canned::Records(records));
    }

    /// Registers a CHAOS-class TXT answer (identity queries).
    pub fn chaos(&self, server: Option<&str>, name: &str, strings: &[&str]) {
        self.insert(
            server,
            name,
            RecordType::TXT,
            DNSClass::CH,
            Canned::Records(vec![txt(strings)]),
        );
    }

    /// Total number of queries issued through this stub's zone data.
    pub fn total_queries(&self) -> usize {
        self.zones.log.lock().unwrap().len()
    }

    /// How many queries (any type/class, any server) hit `name`.
    pub fn queries_for(&self, name: &str) -> usize {
        let name = normalize(name);
        self.zones
            .log
            .lock()
            .unwrap()
            .iter()
            .filter(|key| key.1 == name)
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn query(
        &self,
        name: &str,
        rtype: RecordType,
        class: DNSClass,
    ) -> Result<Vec<RecordData>, LookupError> {
        let key = (self.server, normalize(name), rtype, class);
        self.zones.log.lock().unwrap().push(key.clone());
        let answers = self.zones.answers.lock().unwrap();
        if let Some(canned) = answers.get(&key) {
            return match canned {
                Canned::Records(records) => Ok(records.clone()),
                Canned::NoAnswer => Err(LookupError::NoAnswer(name.to_string())),
                Canned::NxDomain => Err(LookupError::NameNotFound(name.to_string())),
                Canned::Fail(message) => Err(LookupError::Transport {
                    name: name.to_string(),
                    message: (*message).to_string(),
                }),
            };
        }
        let name_known = answers.keys().any(|k| k.0 == self.server && k.1 == key.1);
        if name_known {
            Err(LookupError::NoAnswer(name.to_string()))
        } else {
            Err(LookupError::NameNotFound(name.to_string()))
        }
    }

    fn rebind(&self, options: &ResolverOptions) -> Result<Self, LookupError> {
        Ok(Self {
            zones: Arc::clone(&self.zones),
            server: options.nameservers.first().copied(),
        })
    }
}

pub fn normalize(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

pub fn a(addr: &str) -> RecordData {
    RecordData::A(addr.parse().unwrap())
}

pub fn aaaa(addr: &str) -> RecordData {
    RecordData::Aaaa(addr.parse().unwrap())
}

pub fn ns(target: &str) -> RecordData {
    RecordData::Ns(target.to_string())
}

pub fn txt(strings: &[&str]) -> RecordData {
    RecordData::Txt(strings.iter().map(|s| s.to_string()).collect())
}

pub fn soa(serial: u32) -> RecordData {
    RecordData::Soa {
        mname: "ns1.example.com.".to_string(),
        rname: "hostmaster.example.com.".to_string(),
        serial,
        refresh: 7200,
        retry: 3600,
        expire: 1209600,
        minimum: 3600,
    }
}
