//! Release version model
//!
//! Versions follow the PEP 440 shape used by Python package indexes:
//! - Release segments: `1`, `1.2`, `1.2.3`, ...
//! - Pre-release: `1.0a1`, `1.0b2`, `1.0rc1`
//! - Post-release: `1.0.post1`
//! - Dev-release: `1.0.dev3`, `1.0a1.dev1`
//! - Optional epoch (`1!2.0`) and local label (`1.0+cpu`)
//!
//! Ordering for equal release segments: dev < pre < final < post.
//! Trailing zero segments are insignificant (`1.0 == 1.0.0`).

use crate::error::ParseError;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|rc|c)[-_.]?(?P<pre_n>\d+)?)?
        (?:-(?P<post_n1>\d+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>\d+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>\d+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        $",
    )
    .unwrap()
});

/// Pre-release phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl PreRelease {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            _ => PreRelease::ReleaseCandidate,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PreRelease::Alpha => "a",
            PreRelease::Beta => "b",
            PreRelease::ReleaseCandidate => "rc",
        }
    }
}

/// A release version with optional qualifiers
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

/// Sort key for the pre-release position
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    /// Dev-release of a final version (`1.0.dev1`) sorts before every pre-release
    DevOfFinal,
    Pre(PreRelease, u64),
    Final,
}

/// Sort key for the dev-release position
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    None,
}

impl Version {
    /// Creates a final release from its segments
    pub fn from_release(release: Vec<u64>) -> Self {
        Self {
            epoch: 0,
            release,
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// Release segments as written
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Returns true for pre-releases and dev-releases
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release segments without insignificant trailing zeros
    fn significant_release(&self) -> &[u64] {
        let end = self
            .release
            .iter()
            .rposition(|&s| s != 0)
            .map_or(0, |i| i + 1);
        &self.release[..end]
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOfFinal,
            (Some((kind, n)), _, _) => PreKey::Pre(kind, n),
            _ => PreKey::Final,
        }
    }

    fn dev_key(&self) -> DevKey {
        match self.dev {
            Some(n) => DevKey::Dev(n),
            None => DevKey::None,
        }
    }
}

/// Parse a version string
pub fn parse_version(text: &str) -> Result<Version, ParseError> {
    let trimmed = text.trim();
    let caps = VERSION_RE
        .captures(trimmed)
        .ok_or_else(|| ParseError::new(trimmed, "not a valid version"))?;

    let number = |s: &str| -> Result<u64, ParseError> {
        s.parse::<u64>()
            .map_err(|_| ParseError::new(trimmed, format!("version segment '{}' is too large", s)))
    };

    let epoch = match caps.name("epoch") {
        Some(m) => number(m.as_str())?,
        None => 0,
    };

    let release = caps
        .name("release")
        .map(|m| m.as_str())
        .unwrap_or_default()
        .split('.')
        .map(number)
        .collect::<Result<Vec<_>, _>>()?;

    let pre = match caps.name("pre_l") {
        Some(label) => {
            let n = match caps.name("pre_n") {
                Some(m) => number(m.as_str())?,
                None => 0,
            };
            Some((PreRelease::from_label(label.as_str()), n))
        }
        None => None,
    };

    let post = if let Some(m) = caps.name("post_n1") {
        Some(number(m.as_str())?)
    } else if caps.name("post_l").is_some() {
        match caps.name("post_n2") {
            Some(m) => Some(number(m.as_str())?),
            None => Some(0),
        }
    } else {
        None
    };

    let dev = if caps.name("dev_l").is_some() {
        match caps.name("dev_n") {
            Some(m) => Some(number(m.as_str())?),
            None => Some(0),
        }
    } else {
        None
    };

    let local = caps
        .name("local")
        .map(|m| m.as_str().to_ascii_lowercase().replace(['-', '_'], "."));

    Ok(Version {
        epoch,
        release,
        pre,
        post,
        dev,
        local,
    })
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_version(s)
    }
}

/// Compare two versions
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp(b)
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| {
                let len = self.release.len().max(other.release.len());
                (0..len)
                    .map(|i| {
                        let a = self.release.get(i).copied().unwrap_or(0);
                        let b = other.release.get(i).copied().unwrap_or(0);
                        a.cmp(&b)
                    })
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        self.significant_release().hash(state);
        self.pre.hash(state);
        self.post.hash(state);
        self.dev.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some((kind, n)) = self.pre {
            write!(f, "{}{}", kind.label(), n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        if let Some(ref local) = self.local {
            write!(f, "+{}", local)?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    #[test]
    fn test_parse_release() {
        let version = v("1.2.3");
        assert_eq!(version.release(), &[1, 2, 3]);
        assert!(!version.is_prerelease());
        assert_eq!(version.to_string(), "1.2.3");
    }

    #[test]
    fn test_parse_with_v_prefix() {
        assert_eq!(v("v2.32.5"), v("2.32.5"));
    }

    #[test]
    fn test_parse_qualifiers() {
        assert_eq!(v("1.0a1").to_string(), "1.0a1");
        assert_eq!(v("1.0-alpha.1").to_string(), "1.0a1");
        assert_eq!(v("1.0beta2").to_string(), "1.0b2");
        assert_eq!(v("1.0c1").to_string(), "1.0rc1");
        assert_eq!(v("1.0.post1").to_string(), "1.0.post1");
        assert_eq!(v("1.0-3").to_string(), "1.0.post3");
        assert_eq!(v("1.0.dev").to_string(), "1.0.dev0");
        assert_eq!(v("1.0a1.dev2").to_string(), "1.0a1.dev2");
        assert_eq!(v("1!2.0").to_string(), "1!2.0");
        assert_eq!(v("2.1.0+CPU").to_string(), "2.1.0+cpu");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_version("").is_err());
        assert!(parse_version("abc").is_err());
        assert!(parse_version("1.2.*").is_err());
        assert!(parse_version("1..2").is_err());
        let err = parse_version("not-a-version").unwrap_err();
        assert_eq!(err.token, "not-a-version");
    }

    #[test]
    fn test_parse_overflowing_segment() {
        assert!(parse_version("99999999999999999999999.0").is_err());
    }

    #[test]
    fn test_zero_padding_equality() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("2"), v("2.0.0.0"));
        assert_ne!(v("1.0"), v("1.0.1"));
        assert_eq!(compare(&v("1.0"), &v("1.0.0")), Ordering::Equal);
    }

    #[test]
    fn test_zero_padding_hash_matches_equality() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(v("1.0"));
        assert!(set.contains(&v("1.0.0")));
        assert!(set.contains(&v("1")));
    }

    #[test]
    fn test_display_preserves_written_segments() {
        assert_eq!(v("1.0").to_string(), "1.0");
        assert_eq!(v("1.0.0").to_string(), "1.0.0");
    }

    #[test]
    fn test_release_ordering() {
        assert!(v("1.9") < v("1.10"));
        assert!(v("1.2.3") < v("1.3"));
        assert!(v("2") > v("1.99.99"));
        assert!(v("1!0.1") > v("9.9"));
    }

    #[test]
    fn test_qualifier_ordering() {
        let ordered = [
            "1.0.dev1", "1.0a1.dev1", "1.0a1", "1.0a2", "1.0b1", "1.0rc1", "1.0", "1.0+local",
            "1.0.post1.dev1", "1.0.post1", "1.1.dev1",
        ];
        for pair in ordered.windows(2) {
            assert!(
                v(pair[0]) < v(pair[1]),
                "{} should sort before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_is_prerelease() {
        assert!(v("1.0rc1").is_prerelease());
        assert!(v("1.0.dev0").is_prerelease());
        assert!(!v("1.0.post1").is_prerelease());
    }

    #[test]
    fn test_from_release() {
        let version = Version::from_release(vec![1, 3]);
        assert_eq!(version.to_string(), "1.3");
        assert_eq!(version, v("1.3.0"));
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&v("1.0rc1")).unwrap();
        assert_eq!(json, "\"1.0rc1\"");
    }
}
