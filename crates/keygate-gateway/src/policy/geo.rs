//! GeoGuard: client address against CIDR allow/deny lists.

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use keygate_core::model::GeoRules;

use super::{RuleError, Verdict};

fn parse_block(rule: &str) -> Result<IpNetwork, RuleError> {
    rule.trim().parse::<IpNetwork>().map_err(|e| RuleError::Cidr {
        rule: rule.to_string(),
        reason: e.to_string(),
    })
}

/// True when `ip` falls inside any well-formed block of `rules`.
fn matches_any(rules: &[String], ip: IpAddr) -> bool {
    rules.iter().any(|rule| match parse_block(rule) {
        Ok(block) => block.contains(ip),
        Err(e) => {
            tracing::error!(error = %e, "geographic security configuration failed");
            false
        }
    })
}

/// Deny list first; a non-empty allow list then requires a match.
/// A missing address or rule set imposes nothing.
pub fn check_geo(client_ip: Option<IpAddr>, rules: Option<&GeoRules>) -> Verdict {
    let (Some(ip), Some(rules)) = (client_ip, rules) else {
        return Verdict::Allowed;
    };
    let ip = ip.to_canonical();

    if let Some(deny) = rules.deny.as_deref().filter(|d| !d.is_empty()) {
        if matches_any(deny, ip) {
            return Verdict::Denied;
        }
    }
    if let Some(allow) = rules.allow.as_deref().filter(|a| !a.is_empty()) {
        if !matches_any(allow, ip) {
            return Verdict::Denied;
        }
    }
    Verdict::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(allow: &[&str], deny: &[&str]) -> GeoRules {
        let list = |v: &[&str]| {
            (!v.is_empty()).then(|| v.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        };
        GeoRules { allow: list(allow), deny: list(deny) }
    }

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn deny_wins_over_allow() {
        let r = rules(&["10.1.2.3/32"], &["10.0.0.0/8"]);
        assert_eq!(check_geo(ip("10.1.2.3"), Some(&r)), Verdict::Denied);
    }

    #[test]
    fn allow_list_requires_match() {
        let r = rules(&["192.168.0.0/16"], &[]);
        assert_eq!(check_geo(ip("192.168.4.20"), Some(&r)), Verdict::Allowed);
        assert_eq!(check_geo(ip("172.16.0.1"), Some(&r)), Verdict::Denied);
    }

    #[test]
    fn bare_address_is_a_host_rule() {
        let r = rules(&["127.0.0.1"], &[]);
        assert_eq!(check_geo(ip("127.0.0.1"), Some(&r)), Verdict::Allowed);
        assert_eq!(check_geo(ip("127.0.0.2"), Some(&r)), Verdict::Denied);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let r = rules(&["not-a-cidr", "10.0.0.0/8"], &["999.1.1.1/40"]);
        assert_eq!(check_geo(ip("10.9.9.9"), Some(&r)), Verdict::Allowed);
    }

    #[test]
    fn missing_inputs_pass() {
        let r = rules(&["10.0.0.0/8"], &[]);
        assert_eq!(check_geo(None, Some(&r)), Verdict::Allowed);
        assert_eq!(check_geo(ip("8.8.8.8"), None), Verdict::Allowed);
        assert_eq!(check_geo(ip("8.8.8.8"), Some(&GeoRules::default())), Verdict::Allowed);
    }

    #[test]
    fn mapped_v6_client_matches_v4_rules() {
        let r = rules(&[], &["10.0.0.0/8"]);
        assert_eq!(check_geo(ip("::ffff:10.0.0.1"), Some(&r)), Verdict::Denied);
    }
}
