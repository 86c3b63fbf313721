use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};

use littera_core::{LitteraError, Result};

/// Reserved range scanned for a bindable loopback port on first cluster init.
/// Chosen away from Postgres's default (5432) and common dev-server ports.
pub const PORT_RANGE: std::ops::RangeInclusive<u16> = 50000..=59999;

/// Find a currently-bindable loopback port in [`PORT_RANGE`].
///
/// This only proves the port is free *right now*; the caller must still
/// treat a later bind failure (because something else grabbed it between
/// this check and cluster startup) as `BackendUnavailable`, not retry
/// silently with a different port.
pub fn allocate_port() -> Result<u16> {
    for port in PORT_RANGE {
        if is_port_free(port) {
            return Ok(port);
        }
    }
    Err(LitteraError::BackendUnavailable(format!(
        "no free port available in reserved range {}-{}",
        PORT_RANGE.start(),
        PORT_RANGE.end()
    )))
}

/// Check whether `port` is currently free to bind on loopback.
pub fn is_port_free(port: u16) -> bool {
    let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, port);
    TcpListener::bind(addr).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_port_returns_a_port_within_range() {
        let port = allocate_port().expect("should find a free port");
        assert!(PORT_RANGE.contains(&port));
    }

    #[test]
    fn allocated_port_is_actually_bindable() {
        let port = allocate_port().unwrap();
        assert!(is_port_free(port));
    }

    #[test]
    fn occupied_port_is_not_reported_free() {
        let listener =
            TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)).expect("bind ephemeral");
        let port = listener.local_addr().unwrap().port();
        assert!(!is_port_free(port));
        drop(listener);
    }
}
