//! Deterministic channel-name to endpoint mapping.

use crate::config::ChannelConfig;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

// FNV-1a, 64-bit. Chosen because a controller in any language can
// reproduce it from the panel's channel name without sharing code.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub(crate) fn fnv1a(name: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in name.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Map a channel name onto a loopback endpoint inside the configured port
/// window. Deterministic, so a controller can locate the correct panel
/// among several by deriving the same port from the same name.
pub fn derive_endpoint(channel_name: &str, channel: &ChannelConfig) -> SocketAddr {
    let offset = (fnv1a(channel_name) % u64::from(channel.port_range)) as u16;
    let port = channel.port_base + offset;
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}
