//! Device details parsed from a `User-Agent` header.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static BROWSER_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("Edge", r"Edg(?:e|A|iOS)?/(\d+)"),
        ("Opera", r"(?:OPR|Opera)/(\d+)"),
        ("Firefox", r"(?:Firefox|FxiOS)/(\d+)"),
        ("Chrome", r"(?:Chrome|CriOS)/(\d+)"),
        ("Safari", r"Version/(\d+)[^ ]* (?:Mobile/\S+ )?Safari/"),
        ("curl", r"^curl/(\d+)"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("browser regex")))
    .collect()
});

/// Browser, operating system and CPU architecture of a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub browser: Option<String>,
    pub os: Option<String>,
    pub cpu: Option<String>,
}

impl DeviceInfo {
    /// Best-effort parse. Unknown parts stay `None`.
    pub fn from_user_agent(user_agent: &str) -> Self {
        Self {
            browser: parse_browser(user_agent),
            os: parse_os(user_agent),
            cpu: parse_cpu(user_agent),
        }
    }
}

fn parse_browser(ua: &str) -> Option<String> {
    BROWSER_PATTERNS.iter().find_map(|(name, regex)| {
        regex
            .captures(ua)
            .and_then(|caps| caps.get(1))
            .map(|version| format!("{} {}", name, version.as_str()))
    })
}

fn parse_os(ua: &str) -> Option<String> {
    let os = if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
        "iOS"
    } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        "Mac OS"
    } else if ua.contains("CrOS") {
        "Chromium OS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        return None;
    };
    Some(os.to_string())
}

fn parse_cpu(ua: &str) -> Option<String> {
    let lower = ua.to_lowercase();
    let cpu = if ["x86_64", "x64", "win64", "wow64", "amd64"]
        .iter()
        .any(|token| lower.contains(token))
    {
        "amd64"
    } else if lower.contains("aarch64") || lower.contains("arm64") {
        "arm64"
    } else if lower.contains("armv7") || lower.contains("armv8l") {
        "arm"
    } else if lower.contains("i686") || lower.contains("i386") {
        "ia32"
    } else {
        return None;
    };
    Some(cpu.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_on_windows() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        let device = DeviceInfo::from_user_agent(ua);
        assert_eq!(device.browser.as_deref(), Some("Chrome 120"));
        assert_eq!(device.os.as_deref(), Some("Windows"));
        assert_eq!(device.cpu.as_deref(), Some("amd64"));
    }

    #[test]
    fn test_safari_on_iphone() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
        let device = DeviceInfo::from_user_agent(ua);
        assert_eq!(device.browser.as_deref(), Some("Safari 17"));
        assert_eq!(device.os.as_deref(), Some("iOS"));
        assert_eq!(device.cpu, None);
    }

    #[test]
    fn test_firefox_on_linux() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
        let device = DeviceInfo::from_user_agent(ua);
        assert_eq!(device.browser.as_deref(), Some("Firefox 121"));
        assert_eq!(device.os.as_deref(), Some("Linux"));
        assert_eq!(device.cpu.as_deref(), Some("amd64"));
    }

    #[test]
    fn test_edge_is_not_reported_as_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";
        let device = DeviceInfo::from_user_agent(ua);
        assert_eq!(device.browser.as_deref(), Some("Edge 120"));
    }

    #[test]
    fn test_unknown_agent() {
        assert_eq!(DeviceInfo::from_user_agent(""), DeviceInfo::default());
    }
}
