//! FTN network address handling (zone:net/node.point).

use std::fmt;
use std::str::FromStr;

/// A 4-component FTN network address.
///
/// # Examples
/// - `"2:5020/1042"` → zone 2, net 5020, node 1042, point 0
/// - `"2:5020/1042.7"` → same with point 7
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NetAddr {
    zone: u16,
    net: u16,
    node: u16,
    point: u16,
}

impl NetAddr {
    /// Build an address from its four numeric components, as stored in a
    /// frame header.
    pub fn from_parts(zone: u16, net: u16, node: u16, point: u16) -> Self {
        Self {
            zone,
            net,
            node,
            point,
        }
    }

    pub fn zone(&self) -> u16 {
        self.zone
    }

    pub fn net(&self) -> u16 {
        self.net
    }

    pub fn node(&self) -> u16 {
        self.node
    }

    pub fn point(&self) -> u16 {
        self.point
    }

    /// True for the all-zero address (used for "no address recorded").
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for NetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.point == 0 {
            write!(f, "{}:{}/{}", self.zone, self.net, self.node)
        } else {
            write!(f, "{}:{}/{}.{}", self.zone, self.net, self.node, self.point)
        }
    }
}

impl FromStr for NetAddr {
    type Err = String;

    /// Parse `zone:net/node[.point]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("Invalid address '{s}', expected zone:net/node[.point]");
        let (zone, rest) = s.split_once(':').ok_or_else(bad)?;
        let (net, rest) = rest.split_once('/').ok_or_else(bad)?;
        let (node, point) = match rest.split_once('.') {
            Some((node, point)) => (node, point),
            None => (rest, "0"),
        };
        Ok(Self {
            zone: zone.parse().map_err(|_| bad())?,
            net: net.parse().map_err(|_| bad())?,
            node: node.parse().map_err(|_| bad())?,
            point: point.parse().map_err(|_| bad())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_address() {
        let addr: NetAddr = "2:5020/1042".parse().unwrap();
        assert_eq!(addr.zone(), 2);
        assert_eq!(addr.net(), 5020);
        assert_eq!(addr.node(), 1042);
        assert_eq!(addr.point(), 0);
    }

    #[test]
    fn test_parse_point_address() {
        let addr: NetAddr = "1:234/56.7".parse().unwrap();
        assert_eq!(addr.point(), 7);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("2:5020".parse::<NetAddr>().is_err());
        assert!("garbage".parse::<NetAddr>().is_err());
        assert!("x:1/2".parse::<NetAddr>().is_err());
    }

    #[test]
    fn test_display_omits_zero_point() {
        assert_eq!(NetAddr::from_parts(2, 5020, 1042, 0).to_string(), "2:5020/1042");
        assert_eq!(NetAddr::from_parts(2, 5020, 1042, 3).to_string(), "2:5020/1042.3");
    }

    #[test]
    fn test_empty() {
        assert!(NetAddr::default().is_empty());
        assert!(!NetAddr::from_parts(2, 5020, 1042, 0).is_empty());
    }
}
