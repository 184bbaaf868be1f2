//! Helpers for working with domain names.

use std::net::IpAddr;

/// Creates the reverse lookup (PTR) domain name for an IP address, for
/// example `4.4.8.8.in-addr.arpa.` for `8.8.4.4`, as defined by
/// [rfc1035] section 3.5 and [rfc3596] section 2.5.
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
/// [rfc3596]: https://datatracker.ietf.org/doc/html/rfc3596
///
/// # Examples
///
/// ```rust
/// use std::net::IpAddr;
///
/// let ip: IpAddr = "8.8.4.4".parse().unwrap();
/// assert_eq!(dnswire::util::reverse(ip), "4.4.8.8.in-addr.arpa.");
/// ```
pub fn reverse(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(ip) => {
            let o = ip.octets();
            format!("{}.{}.{}.{}.in-addr.arpa.", o[3], o[2], o[1], o[0])
        }

        IpAddr::V6(ip) => {
            // One label per nibble, least significant first.
            let mut name = String::with_capacity(73);
            for b in ip.octets().iter().rev() {
                name.push_str(&format!("{:x}.{:x}.", b & 0x0F, b >> 4));
            }
            name.push_str("ip6.arpa.");
            name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reverse_v4() {
        let ip: IpAddr = "192.0.2.53".parse().unwrap();
        assert_eq!(reverse(ip), "53.2.0.192.in-addr.arpa.");
    }

    #[test]
    fn test_reverse_v6() {
        let ip: IpAddr = "2001:db8::567:89ab".parse().unwrap();
        assert_eq!(
            reverse(ip),
            "b.a.9.8.7.6.5.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa."
        );
    }
}
