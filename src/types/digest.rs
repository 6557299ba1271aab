use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Content address of a manifest, e.g. `sha256:4f2a...`.
#[derive(Clone, Debug, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Digest {
    pub algo: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid digest {0:?}")]
pub struct InvalidDigest(pub String);

impl FromStr for Digest {
    type Err = InvalidDigest;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((algo, hash)) = s.split_once(':') else {
            return Err(InvalidDigest(s.to_string()));
        };

        let valid_algo = !algo.is_empty()
            && algo
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+._-".contains(c));
        let valid_hash = !hash.is_empty() && hash.chars().all(|c| c.is_ascii_alphanumeric());

        if !valid_algo || !valid_hash {
            return Err(InvalidDigest(s.to_string()));
        }

        Ok(Digest {
            algo: algo.to_string(),
            hash: hash.to_string(),
        })
    }
}

// We implement this so that serde_json can parse a Digest from a straight string
impl TryFrom<String> for Digest {
    type Error = InvalidDigest;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algo, self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str() {
        let digest: Digest = "sha256:abcdef0123456789".parse().unwrap();

        assert_eq!(digest.algo, "sha256");
        assert_eq!(digest.hash, "abcdef0123456789");
        assert_eq!(digest.to_string(), "sha256:abcdef0123456789");
    }

    #[test]
    fn rejects_garbage() {
        assert!("latest".parse::<Digest>().is_err());
        assert!("sha256:".parse::<Digest>().is_err());
        assert!(":abcdef".parse::<Digest>().is_err());
        assert!("sha256:ab cd".parse::<Digest>().is_err());
    }

    #[test]
    fn from_json() {
        let parsed: Digest = serde_json::from_str(r#""sha256:abcdef0123456789""#).unwrap();
        let digest: Digest = "sha256:abcdef0123456789".parse().unwrap();

        assert_eq!(parsed, digest);
        assert!(serde_json::from_str::<Digest>(r#""not a digest""#).is_err());
    }

    #[test]
    fn ordering_follows_text() {
        let a: Digest = "sha256:0000".parse().unwrap();
        let b: Digest = "sha256:ffff".parse().unwrap();

        assert!(a < b);
        assert_ne!(a, b);
    }
}
