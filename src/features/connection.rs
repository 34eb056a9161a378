//! Connection endpoint capability.

use std::fmt::Display;
use std::net::IpAddr;
use std::str::FromStr;

use crate::features::{FeatureError, LegacyFeatureCollection};

/// Connection information of the new abstraction.
pub trait HttpConnectionFeature {
    fn remote_ip_address(&self) -> Result<IpAddr, FeatureError>;
    fn set_remote_ip_address(&self, address: IpAddr);

    fn local_ip_address(&self) -> Result<IpAddr, FeatureError>;
    fn set_local_ip_address(&self, address: IpAddr);

    fn remote_port(&self) -> Result<u16, FeatureError>;
    fn set_remote_port(&self, port: u16);

    fn local_port(&self) -> Result<u16, FeatureError>;
    fn set_local_port(&self, port: u16);

    fn is_local(&self) -> bool;
    fn set_is_local(&self, is_local: bool);
}

impl LegacyFeatureCollection {
    /// Parse a server variable, failing on absent or malformed values.
    fn parse_server_variable<T>(&self, name: &str) -> Result<T, FeatureError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.parse_server_variable_with(name, verbatim)
    }

    /// Addresses may carry an IPv6 zone index (`fe80::1%4`), which
    /// `IpAddr` has no room for.
    fn parse_address_variable(&self, name: &str) -> Result<IpAddr, FeatureError> {
        self.parse_server_variable_with(name, without_zone_index)
    }

    fn parse_server_variable_with<T>(
        &self,
        name: &str,
        prepare: fn(&str) -> &str,
    ) -> Result<T, FeatureError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(value) = self.context.server_variable(name) else {
            return Err(FeatureError::ServerVariable {
                name: name.to_string(),
                value: None,
                reason: "not set".to_string(),
            });
        };
        prepare(&value)
            .parse()
            .map_err(|e: T::Err| FeatureError::ServerVariable {
                name: name.to_string(),
                reason: e.to_string(),
                value: Some(value.clone()),
            })
    }
}

fn verbatim(value: &str) -> &str {
    value
}

fn without_zone_index(address: &str) -> &str {
    match address.split_once('%') {
        Some((ip, _zone)) if ip.contains(':') => ip,
        _ => address,
    }
}

impl HttpConnectionFeature for LegacyFeatureCollection {
    fn remote_ip_address(&self) -> Result<IpAddr, FeatureError> {
        self.parse_address_variable(&self.variables.remote_addr)
    }

    fn set_remote_ip_address(&self, _address: IpAddr) {}

    fn local_ip_address(&self) -> Result<IpAddr, FeatureError> {
        self.parse_address_variable(&self.variables.local_addr)
    }

    fn set_local_ip_address(&self, _address: IpAddr) {}

    fn remote_port(&self) -> Result<u16, FeatureError> {
        self.parse_server_variable(&self.variables.remote_port)
    }

    fn set_remote_port(&self, _port: u16) {}

    fn local_port(&self) -> Result<u16, FeatureError> {
        self.parse_server_variable(&self.variables.local_port)
    }

    fn set_local_port(&self, _port: u16) {}

    fn is_local(&self) -> bool {
        self.context.is_local()
    }

    fn set_is_local(&self, _is_local: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerVariableNames;
    use crate::legacy::MemoryContext;
    use std::net::Ipv6Addr;
    use std::sync::Arc;

    fn features(builder: crate::legacy::MemoryContextBuilder) -> LegacyFeatureCollection {
        LegacyFeatureCollection::new(Arc::new(builder.build()))
    }

    #[test]
    fn parses_addresses_and_ports() {
        let f = features(
            MemoryContext::builder()
                .server_variable("REMOTE_ADDR", "203.0.113.7")
                .server_variable("LOCAL_ADDR", "::1")
                .server_variable("REMOTE_PORT", "53122")
                .server_variable("SERVER_PORT", "8443")
                .local(true),
        );

        assert_eq!(f.remote_ip_address().unwrap(), "203.0.113.7".parse::<IpAddr>().unwrap());
        assert_eq!(f.local_ip_address().unwrap(), IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(f.remote_port().unwrap(), 53122);
        assert_eq!(f.local_port().unwrap(), 8443);
        assert!(f.is_local());
    }

    #[test]
    fn malformed_values_propagate() {
        let f = features(
            MemoryContext::builder()
                .server_variable("REMOTE_ADDR", "not-an-ip")
                .server_variable("REMOTE_PORT", "70000"),
        );

        match f.remote_ip_address() {
            Err(FeatureError::ServerVariable { name, value, .. }) => {
                assert_eq!(name, "REMOTE_ADDR");
                assert_eq!(value.as_deref(), Some("not-an-ip"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(f.remote_port().is_err());
    }

    #[test]
    fn absent_values_propagate() {
        let f = features(MemoryContext::builder());
        match f.local_ip_address() {
            Err(FeatureError::ServerVariable { value: None, name, .. }) => {
                assert_eq!(name, "LOCAL_ADDR");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ipv6_zone_index_is_dropped() {
        let f = features(
            MemoryContext::builder()
                .server_variable("REMOTE_ADDR", "fe80::1%4")
                .server_variable("LOCAL_ADDR", "fe80::2%eth0"),
        );

        assert_eq!(f.remote_ip_address().unwrap(), "fe80::1".parse::<IpAddr>().unwrap());
        assert_eq!(f.local_ip_address().unwrap(), "fe80::2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn zone_index_on_ipv4_is_still_malformed() {
        let f = features(MemoryContext::builder().server_variable("REMOTE_ADDR", "10.0.0.1%4"));
        assert!(matches!(
            f.remote_ip_address(),
            Err(FeatureError::ServerVariable { value: Some(v), .. }) if v == "10.0.0.1%4"
        ));
    }

    #[test]
    fn setters_are_ignored() {
        let f = features(MemoryContext::builder().server_variable("SERVER_PORT", "80"));
        f.set_local_port(9000);
        f.set_is_local(true);
        assert_eq!(f.local_port().unwrap(), 80);
        assert!(!f.is_local());
    }

    #[test]
    fn variable_names_are_configurable() {
        let names = ServerVariableNames {
            remote_addr: "HTTP_X_REAL_IP".to_string(),
            ..ServerVariableNames::default()
        };
        let f = LegacyFeatureCollection::new(Arc::new(
            MemoryContext::builder()
                .server_variable("HTTP_X_REAL_IP", "198.51.100.2")
                .build(),
        ))
        .with_server_variables(names);

        assert_eq!(f.remote_ip_address().unwrap().to_string(), "198.51.100.2");
    }
}
