use crate::{
    Error,
    codec::{Endpoint, MalformedLine, parse_endpoint},
    poller::Poller,
    sink::{AuditEvent, EventSink, Subsystem},
};
use config::Protocol;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{debug, warn};

/// Column of the local endpoint in `/proc/net/{tcp,udp}`.
const LOCAL_ADDRESS_COLUMN: usize = 1;

/// Read access to the kernel socket tables.
pub trait ConnectionSource: Send {
    /// Full text of the table for `protocol`, header line included.
    fn read_table(&self, protocol: Protocol) -> Result<String, Error>;
}

/// [`ConnectionSource`] reading `<root>/net/<protocol>`.
#[derive(Debug, Clone)]
pub struct ProcNetSource {
    root: PathBuf,
}

impl Default for ProcNetSource {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

impl ProcNetSource {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ConnectionSource for ProcNetSource {
    fn read_table(&self, protocol: Protocol) -> Result<String, Error> {
        let path = self.root.join("net").join(protocol.table_name());
        std::fs::read_to_string(&path).map_err(|err| Error::io(path, err))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub protocol: Protocol,
    pub local: Endpoint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    pub records: Vec<ConnectionRecord>,
    pub malformed: usize,
}

/// Parse a socket table, skipping the header and any malformed line.
pub fn parse_table(text: &str, protocol: Protocol) -> ParsedTable {
    let mut table = ParsedTable::default();

    for (index, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let local = line
            .split_whitespace()
            .nth(LOCAL_ADDRESS_COLUMN)
            .ok_or(MalformedLine::MissingColumn)
            .and_then(parse_endpoint);
        match local {
            Ok(local) => table.records.push(ConnectionRecord { protocol, local }),
            Err(err) => {
                debug!(%protocol, line = index + 1, %err, "skipping malformed socket line");
                table.malformed += 1;
            }
        }
    }

    table
}

/// Outcome of one [`NetworkMonitor::scan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkReport {
    pub connections: usize,
    pub malformed: usize,
}

/// Reports every active socket endpoint each cycle. No state is carried over.
pub struct NetworkMonitor<S> {
    source: S,
    sink: Arc<dyn EventSink>,
    interval: Duration,
    protocols: Vec<Protocol>,
}

impl<S: ConnectionSource> NetworkMonitor<S> {
    pub fn new(source: S, sink: Arc<dyn EventSink>, config: &config::NetworkMonitor) -> Self {
        Self {
            source,
            sink,
            interval: config.interval,
            protocols: config.protocols.clone(),
        }
    }

    pub fn scan(&mut self) -> Result<NetworkReport, Error> {
        let mut report = NetworkReport::default();

        for &protocol in &self.protocols {
            let text = self.source.read_table(protocol)?;
            let table = parse_table(&text, protocol);
            report.malformed += table.malformed;

            for record in table.records {
                self.emit(format!("{} connection: {}", record.protocol, record.local));
                report.connections += 1;
            }
        }

        Ok(report)
    }

    fn emit(&self, message: String) {
        if let Err(err) = self.sink.record(AuditEvent::new(Subsystem::Network, message)) {
            warn!(%err, "failed to record network event");
        }
    }
}

impl<S: ConnectionSource> Poller for NetworkMonitor<S> {
    fn name(&self) -> &'static str {
        "network"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn poll(&mut self) -> Result<(), Error> {
        let report = self.scan()?;
        debug!(?report, "network scan done");
        Ok(())
    }

    fn on_fatal(&mut self, err: &Error) {
        self.emit(format!("Network monitoring stopped: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    const TCP: &str = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 3500007F:0035 00000000:0000 0A 00000000:00000000 00:00000000 00000000   101        0 20539 1 0000000000000000 100 0 0 10 0
   1: 0100007F:0277 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 23011 1 0000000000000000 100 0 0 10 0
";

    #[test]
    fn parses_kernel_table() {
        let table = parse_table(TCP, Protocol::Tcp);

        assert_eq!(table.malformed, 0);
        assert_eq!(
            table.records,
            [
                ConnectionRecord {
                    protocol: Protocol::Tcp,
                    local: Endpoint {
                        addr: Some(Ipv4Addr::new(127, 0, 0, 53)),
                        port: 53
                    },
                },
                ConnectionRecord {
                    protocol: Protocol::Tcp,
                    local: Endpoint {
                        addr: Some(Ipv4Addr::LOCALHOST),
                        port: 631
                    },
                },
            ]
        );
    }

    #[test]
    fn header_only_table_is_empty() {
        let header = TCP.lines().next().unwrap();
        assert_eq!(parse_table(header, Protocol::Tcp), ParsedTable::default());
        assert_eq!(parse_table("", Protocol::Udp), ParsedTable::default());
    }

    #[test]
    fn reads_live_tables() {
        let source = ProcNetSource::default();
        for protocol in [Protocol::Tcp, Protocol::Udp] {
            let text = source.read_table(protocol).unwrap();
            assert!(text.lines().next().unwrap().contains("local_address"));
        }
    }
}
