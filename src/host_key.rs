//! Host keys that tell cache instances on different machines apart.

use std::net::{IpAddr, Ipv4Addr};

/// Returns the last octet of the first private, global-unicast IPv4 address among the local
/// network interfaces, or an empty string if there is none or the interfaces cannot be read.
#[cfg(feature = "host_key")]
#[cfg_attr(docsrs, doc(cfg(feature = "host_key")))]
pub fn host_key() -> String {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => host_key_from(interfaces.iter().map(|iface| iface.ip())),
        Err(err) => {
            tracing::debug!(error = %err, "could not list network interfaces");
            String::new()
        }
    }
}

/// Returns an empty key; interface probing is disabled.
#[cfg(not(feature = "host_key"))]
pub fn host_key() -> String {
    String::new()
}

/// Picks the host key out of a list of interface addresses.
pub fn host_key_from<I: IntoIterator<Item = IpAddr>>(addrs: I) -> String {
    addrs
        .into_iter()
        .find_map(|addr| match addr {
            IpAddr::V4(v4) if is_global_unicast(v4) && v4.is_private() => {
                Some(v4.octets()[3].to_string())
            }
            _ => None,
        })
        .unwrap_or_default()
}

fn is_global_unicast(addr: Ipv4Addr) -> bool {
    !(addr.is_unspecified()
        || addr.is_loopback()
        || addr.is_multicast()
        || addr.is_link_local()
        || addr.is_broadcast())
}
