//! DeviceGuard: parsed user agent against device allow/deny rules.
//!
//! Version bounds compare trimmed strings lexicographically, so `"10"` sorts
//! before `"9"`. Rules relying on multi-digit ranges must be written with that
//! in mind.

use keygate_core::model::{DeviceRule, DeviceRules, OsRule, VersionRule};

use super::useragent::{self, OsInfo, UserAgent};
use super::Verdict;

fn is_wildcard(v: &str) -> bool {
    v.trim() == "*"
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_uppercase() == b.trim().to_uppercase()
}

/// One version component. An absent UA value imposes nothing.
fn version_matches(rule: Option<&VersionRule>, actual: Option<&str>) -> bool {
    let (Some(rule), Some(actual)) = (rule, actual) else {
        return true;
    };
    let actual = actual.trim();
    match rule {
        VersionRule::Exact(v) if is_wildcard(v) => true,
        VersionRule::Exact(v) => eq_ignore_case(v, actual),
        VersionRule::Range(range) => {
            if let Some(min) = &range.min {
                if min.trim() > actual {
                    return false;
                }
            }
            if let Some(max) = &range.max {
                if max.trim() < actual {
                    return false;
                }
            }
            true
        }
    }
}

fn os_family_contains(os: &OsInfo, needle: &str) -> bool {
    os.family.trim().to_uppercase().contains(&needle.trim().to_uppercase())
}

fn os_matches(rule: &OsRule, os: &OsInfo) -> bool {
    if os.family.is_empty() {
        return false;
    }
    match rule {
        OsRule::Family(f) => os_family_contains(os, f),
        OsRule::Detailed { family, major, minor, patch } => {
            if let Some(f) = family.as_deref().filter(|f| !is_wildcard(f)) {
                if !os_family_contains(os, f) {
                    return false;
                }
            }
            version_matches(major.as_ref(), os.major.as_deref())
                && version_matches(minor.as_ref(), os.minor.as_deref())
                && version_matches(patch.as_ref(), os.patch.as_deref())
        }
    }
}

/// Whether a single rule matches the parsed agent.
pub fn rule_matches(rule: &DeviceRule, ua: &UserAgent) -> bool {
    if let Some(family) = rule.family.as_deref().filter(|f| !is_wildcard(f)) {
        if !eq_ignore_case(family, &ua.family) {
            return false;
        }
    }
    if let Some(os) = &rule.os {
        let wildcard = matches!(os, OsRule::Family(f) if is_wildcard(f));
        if !wildcard && !os_matches(os, &ua.os) {
            return false;
        }
    }
    version_matches(rule.major.as_ref(), ua.major.as_deref())
        && version_matches(rule.minor.as_ref(), ua.minor.as_deref())
        && version_matches(rule.patch.as_ref(), ua.patch.as_deref())
}

/// Deny list first; a non-empty allow list then requires a match.
/// A missing header, rule set, or unparseable agent imposes nothing.
pub fn check_device(user_agent: Option<&str>, rules: Option<&DeviceRules>) -> Verdict {
    let (Some(raw), Some(rules)) = (user_agent, rules) else {
        return Verdict::Allowed;
    };
    let Some(ua) = useragent::parse(raw) else {
        return Verdict::Allowed;
    };

    if let Some(deny) = rules.deny.as_deref().filter(|d| !d.is_empty()) {
        if deny.iter().any(|r| rule_matches(r, &ua)) {
            return Verdict::Denied;
        }
    }
    if let Some(allow) = rules.allow.as_deref().filter(|a| !a.is_empty()) {
        if !allow.iter().any(|r| rule_matches(r, &ua)) {
            return Verdict::Denied;
        }
    }
    Verdict::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_core::model::VersionRange;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/120.0.6099.109 Safari/537.36";
    const FIREFOX_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) \
        Gecko/20100101 Firefox/121.0";

    fn rule(json: &str) -> DeviceRule {
        serde_json::from_str(json).unwrap()
    }

    fn ua_with_major(major: &str) -> UserAgent {
        UserAgent { family: "Chrome".into(), major: Some(major.into()), ..Default::default() }
    }

    #[test]
    fn range_uses_lexicographic_order() {
        let r = DeviceRule {
            major: Some(VersionRule::Range(VersionRange {
                min: Some("5".into()),
                max: Some("9".into()),
            })),
            ..Default::default()
        };
        assert!(rule_matches(&r, &ua_with_major("7")));
        // "10" < "5" as strings: multi-digit versions fall outside the range.
        assert!(!rule_matches(&r, &ua_with_major("10")));
    }

    #[test]
    fn min_bound_alone() {
        let r = rule(r#"{"major":{"min":"3"}}"#);
        assert!(rule_matches(&r, &ua_with_major("4")));
        assert!(!rule_matches(&r, &ua_with_major("2")));
    }

    #[test]
    fn family_is_case_insensitive_exact() {
        let ua = useragent::parse(CHROME_WIN).unwrap();
        assert!(rule_matches(&rule(r#"{"family":"  chrome "}"#), &ua));
        assert!(!rule_matches(&rule(r#"{"family":"chrom"}"#), &ua));
        assert!(rule_matches(&rule(r#"{"family":"*"}"#), &ua));
    }

    #[test]
    fn os_family_is_substring() {
        let ua = useragent::parse(FIREFOX_MAC).unwrap();
        assert!(rule_matches(&rule(r#"{"os":{"family":"mac"}}"#), &ua));
        assert!(rule_matches(&rule(r#"{"os":"os x"}"#), &ua));
        assert!(rule_matches(&rule(r#"{"os":"*"}"#), &ua));
        assert!(!rule_matches(&rule(r#"{"os":{"family":"windows"}}"#), &ua));
        assert!(rule_matches(&rule(r#"{"os":{"family":"mac","major":"10","minor":"15"}}"#), &ua));
        assert!(!rule_matches(&rule(r#"{"os":{"family":"mac","minor":"14"}}"#), &ua));
    }

    #[test]
    fn exact_version_and_wildcard() {
        let ua = useragent::parse(CHROME_WIN).unwrap();
        assert!(rule_matches(&rule(r#"{"family":"chrome","major":"120"}"#), &ua));
        assert!(!rule_matches(&rule(r#"{"family":"chrome","major":"119"}"#), &ua));
        assert!(rule_matches(&rule(r#"{"family":"chrome","major":"*"}"#), &ua));
    }

    #[test]
    fn deny_precedes_allow() {
        let rules: DeviceRules = serde_json::from_str(
            r#"{"allow":[{"family":"chrome"}],"deny":[{"os":{"family":"windows"}}]}"#,
        )
        .unwrap();
        assert_eq!(check_device(Some(CHROME_WIN), Some(&rules)), Verdict::Denied);
    }

    #[test]
    fn allow_list_requires_match() {
        let rules: DeviceRules = serde_json::from_str(r#"{"allow":[{"family":"chrome"}]}"#).unwrap();
        assert_eq!(check_device(Some(CHROME_WIN), Some(&rules)), Verdict::Allowed);
        assert_eq!(check_device(Some(FIREFOX_MAC), Some(&rules)), Verdict::Denied);
        assert_eq!(check_device(Some("bespoke/1"), Some(&rules)), Verdict::Denied);
    }

    #[test]
    fn missing_inputs_pass() {
        let rules: DeviceRules = serde_json::from_str(r#"{"allow":[{"family":"chrome"}]}"#).unwrap();
        assert_eq!(check_device(None, Some(&rules)), Verdict::Allowed);
        assert_eq!(check_device(Some(""), Some(&rules)), Verdict::Allowed);
        assert_eq!(check_device(Some(FIREFOX_MAC), None), Verdict::Allowed);
    }
}
