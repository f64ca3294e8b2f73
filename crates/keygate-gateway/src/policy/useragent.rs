//! Minimal user-agent parser.
//!
//! Resolves a raw `User-Agent` header into browser family/version and OS
//! family/version using an ordered pattern table (first match wins). Names
//! follow the ua-parser conventions ("Chrome", "Mobile Safari", "Mac OS X").
//!
//! Coverage is limited to mainstream desktop and mobile browsers, Android
//! WebView, common HTTP tooling and the large crawlers. Everything else
//! parses as family `"Other"`, so device rules naming rarer families
//! (in-app browsers, smart TVs, consoles) never match here.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OsInfo {
    pub family: String,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub patch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserAgent {
    pub family: String,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub patch: Option<String>,
    pub os: OsInfo,
}

struct Pattern {
    re: Regex,
    /// `None` => family is capture group 1 and versions start at group 2.
    family: Option<&'static str>,
}

fn compile(table: &[(&str, Option<&'static str>)]) -> Vec<Pattern> {
    table
        .iter()
        .filter_map(|(src, family)| match Regex::new(src) {
            Ok(re) => Some(Pattern { re, family: *family }),
            Err(e) => {
                tracing::error!(pattern = %src, error = %e, "user-agent pattern rejected");
                None
            }
        })
        .collect()
}

static BROWSERS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile(&[
        (r"(?:Edge|Edg|EdgA|EdgiOS)/(\d+)(?:\.(\d+))?(?:\.(\d+))?", Some("Edge")),
        (r"Opera Mobi/.*Version/(\d+)\.(\d+)", Some("Opera Mobile")),
        (r"Mobile Safari/\S+ OPR/(\d+)(?:\.(\d+))?(?:\.(\d+))?", Some("Opera Mobile")),
        (r"(?:OPR|Opera)/(\d+)(?:\.(\d+))?(?:\.(\d+))?", Some("Opera")),
        (r"SamsungBrowser/(\d+)(?:\.(\d+))?(?:\.(\d+))?", Some("Samsung Internet")),
        (r"FxiOS/(\d+)(?:\.(\d+))?(?:\.(\d+))?", Some("Firefox iOS")),
        (r"CriOS/(\d+)(?:\.(\d+))?(?:\.(\d+))?", Some("Chrome Mobile iOS")),
        (r"Firefox/(\d+)(?:\.(\d+))?(?:\.(\d+))?", Some("Firefox")),
        (r"; wv\).+?Chrome/(\d+)\.(\d+)\.(\d+)", Some("Chrome Mobile WebView")),
        (r"Chrome/(\d+)\.(\d+)\.(\d+)(?:\.\d+)? Mobile", Some("Chrome Mobile")),
        (r"(?:Chrome|Chromium)/(\d+)(?:\.(\d+))?(?:\.(\d+))?", Some("Chrome")),
        (r"Version/(\d+)(?:\.(\d+))?(?:\.(\d+))?.*Mobile/\S+ Safari/", Some("Mobile Safari")),
        (r"Version/(\d+)(?:\.(\d+))?(?:\.(\d+))?.*Safari/", Some("Safari")),
        (r"MSIE (\d+)\.(\d+)", Some("IE")),
        (r"Trident/.*rv:(\d+)\.(\d+)", Some("IE")),
        (r"(curl|Wget|PostmanRuntime|okhttp|python-requests|Go-http-client)/(\d+)(?:\.(\d+))?(?:\.(\d+))?", None),
        (r"(Googlebot|bingbot|YandexBot|DuckDuckBot)/(\d+)(?:\.(\d+))?", None),
    ])
});

static SYSTEMS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile(&[
        (r"Windows NT (\d+)\.(\d+)", Some("Windows")),
        (r"(?:iPhone|iPad|iPod|CPU) OS (\d+)_(\d+)(?:_(\d+))?", Some("iOS")),
        (r"Mac OS X (\d+)[_.](\d+)(?:[_.](\d+))?", Some("Mac OS X")),
        (r"Android (\d+)(?:\.(\d+))?(?:\.(\d+))?", Some("Android")),
        (r"CrOS \S+ (\d+)\.(\d+)\.(\d+)", Some("Chrome OS")),
        (r"Ubuntu", Some("Ubuntu")),
        (r"Linux", Some("Linux")),
    ])
});

/// Family + up to three version components from the first matching pattern.
fn first_match(table: &[Pattern], ua: &str) -> Option<(String, [Option<String>; 3])> {
    table.iter().find_map(|p| {
        let caps = p.re.captures(ua)?;
        let (family, base) = match p.family {
            Some(f) => (f.to_string(), 1),
            None => (caps.get(1)?.as_str().to_string(), 2),
        };
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        Some((family, [group(base), group(base + 1), group(base + 2)]))
    })
}

/// Marketing name for an NT kernel version.
fn windows_release(nt_major: &str, nt_minor: &str) -> (String, Option<String>) {
    let (major, minor) = match (nt_major, nt_minor) {
        ("10", _) => ("10", None),
        ("6", "3") => ("8", Some("1")),
        ("6", "2") => ("8", None),
        ("6", "1") => ("7", None),
        ("6", "0") => ("Vista", None),
        ("5", _) => ("XP", None),
        (other, _) => (other, None),
    };
    (major.to_string(), minor.map(str::to_string))
}

fn parse_os(ua: &str) -> OsInfo {
    let Some((family, [major, minor, patch])) = first_match(&SYSTEMS, ua) else {
        return OsInfo { family: "Other".into(), ..Default::default() };
    };
    if family == "Windows" {
        if let (Some(nt_major), Some(nt_minor)) = (major.as_deref(), minor.as_deref()) {
            let (major, minor) = windows_release(nt_major, nt_minor);
            return OsInfo { family, major: Some(major), minor, patch: None };
        }
    }
    OsInfo { family, major, minor, patch }
}

/// Parse a raw header. `None` for an empty header; unrecognized agents come
/// back as family `"Other"`.
pub fn parse(ua: &str) -> Option<UserAgent> {
    let ua = ua.trim();
    if ua.is_empty() {
        return None;
    }
    let os = parse_os(ua);
    let parsed = match first_match(&BROWSERS, ua) {
        Some((family, [major, minor, patch])) => UserAgent { family, major, minor, patch, os },
        None => UserAgent { family: "Other".into(), os, ..Default::default() },
    };
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/120.0.6099.109 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_1_2 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";
    const EDGE_WIN7: &str = "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36 Edg/109.0.1518.78";

    #[test]
    fn chrome_on_windows() {
        let ua = parse(CHROME_WIN).unwrap();
        assert_eq!(ua.family, "Chrome");
        assert_eq!(ua.major.as_deref(), Some("120"));
        assert_eq!(ua.minor.as_deref(), Some("0"));
        assert_eq!(ua.patch.as_deref(), Some("6099"));
        assert_eq!(ua.os.family, "Windows");
        assert_eq!(ua.os.major.as_deref(), Some("10"));
    }

    #[test]
    fn mobile_safari_on_ios() {
        let ua = parse(SAFARI_IPHONE).unwrap();
        assert_eq!(ua.family, "Mobile Safari");
        assert_eq!(ua.major.as_deref(), Some("16"));
        assert_eq!(ua.os.family, "iOS");
        assert_eq!(ua.os.patch.as_deref(), Some("2"));
    }

    #[test]
    fn firefox_on_ubuntu() {
        let ua = parse(FIREFOX_LINUX).unwrap();
        assert_eq!(ua.family, "Firefox");
        assert_eq!(ua.major.as_deref(), Some("115"));
        assert_eq!(ua.os.family, "Ubuntu");
    }

    #[test]
    fn edge_wins_over_chrome_token() {
        let ua = parse(EDGE_WIN7).unwrap();
        assert_eq!(ua.family, "Edge");
        assert_eq!(ua.os.major.as_deref(), Some("7"));
    }

    #[test]
    fn android_webview_is_not_plain_chrome_mobile() {
        let ua = parse(
            "Mozilla/5.0 (Linux; Android 13; SM-S911B; wv) AppleWebKit/537.36 (KHTML, like Gecko) \
             Version/4.0 Chrome/120.0.6099.144 Mobile Safari/537.36",
        )
        .unwrap();
        assert_eq!(ua.family, "Chrome Mobile WebView");
        assert_eq!(ua.major.as_deref(), Some("120"));
        assert_eq!(ua.os.family, "Android");
        assert_eq!(ua.os.major.as_deref(), Some("13"));

        let ua = parse(
            "Mozilla/5.0 (Linux; Android 13; SM-S911B) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/120.0.6099.144 Mobile Safari/537.36",
        )
        .unwrap();
        assert_eq!(ua.family, "Chrome Mobile");
    }

    #[test]
    fn opera_mobile_presto_and_chromium() {
        let ua = parse(
            "Opera/9.80 (Android 2.3.3; Linux; Opera Mobi/ADR-1111101157; U; es-ES) \
             Presto/2.9.201 Version/11.50",
        )
        .unwrap();
        assert_eq!(ua.family, "Opera Mobile");
        assert_eq!(ua.major.as_deref(), Some("11"));
        assert_eq!(ua.minor.as_deref(), Some("50"));

        let ua = parse(
            "Mozilla/5.0 (Linux; Android 10; VOG-L29) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/96.0.4664.104 Mobile Safari/537.36 OPR/66.1.3281.61734",
        )
        .unwrap();
        assert_eq!(ua.family, "Opera Mobile");
        assert_eq!(ua.major.as_deref(), Some("66"));

        let desktop = parse(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/120.0.0.0 Safari/537.36 OPR/106.0.0.0",
        )
        .unwrap();
        assert_eq!(desktop.family, "Opera");
    }

    #[test]
    fn tooling_agents_capture_family() {
        let ua = parse("curl/8.4.0").unwrap();
        assert_eq!(ua.family, "curl");
        assert_eq!(ua.major.as_deref(), Some("8"));
        assert_eq!(ua.os.family, "Other");
    }

    #[test]
    fn unknown_and_empty() {
        assert_eq!(parse("   "), None);
        assert_eq!(parse("my-bespoke-client").unwrap().family, "Other");
    }
}
