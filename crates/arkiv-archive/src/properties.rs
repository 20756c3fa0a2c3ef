//! Flat `key=value` property format used by the two information entries.

use std::collections::BTreeMap;

use crate::error::{ArchiveError, ArchiveResult};

/// Encode pairs as `key=value` lines, one per pair, in the given order.
pub fn encode(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode `key=value` lines. Blank lines are ignored; a line without `=`
/// is rejected.
pub fn decode(text: &str) -> ArchiveResult<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(ArchiveError::InvalidProperty {
                key: line.to_string(),
                reason: "missing `=` separator".into(),
            });
        };
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

/// `computing_information.txt`: payload hash and custody-chain reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputingInformation {
    /// Hex digest of `data.txt`.
    pub current_hash: String,
    /// Base64 digest of the previous period's token; absent for the first
    /// period of a strategy.
    pub previous_timestamp_token: Option<String>,
}

impl ComputingInformation {
    pub fn to_properties(&self) -> String {
        let mut pairs = vec![("currentHash", self.current_hash.clone())];
        if let Some(prev) = &self.previous_timestamp_token {
            pairs.push(("previousTimestampToken", prev.clone()));
        }
        encode(&pairs)
    }

    pub fn from_properties(text: &str) -> ArchiveResult<Self> {
        let map = decode(text)?;
        let current_hash = map
            .get("currentHash")
            .cloned()
            .ok_or_else(|| ArchiveError::MissingProperty("currentHash".into()))?;
        Ok(Self {
            current_hash,
            previous_timestamp_token: map.get("previousTimestampToken").cloned(),
        })
    }
}

/// `additional_information.txt`: element count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdditionalInformation {
    pub number_of_element: u64,
}

impl AdditionalInformation {
    pub fn to_properties(&self) -> String {
        encode(&[("numberOfElement", self.number_of_element.to_string())])
    }

    pub fn from_properties(text: &str) -> ArchiveResult<Self> {
        let map = decode(text)?;
        let raw = map
            .get("numberOfElement")
            .ok_or_else(|| ArchiveError::MissingProperty("numberOfElement".into()))?;
        let number_of_element = raw.parse().map_err(|_| ArchiveError::InvalidProperty {
            key: "numberOfElement".into(),
            reason: format!("not an unsigned integer: {raw}"),
        })?;
        Ok(Self { number_of_element })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let text = encode(&[("a", "1".into()), ("b", "x=y".into())]);
        let map = decode(&text).unwrap();
        assert_eq!(map["a"], "1");
        // Only the first `=` splits.
        assert_eq!(map["b"], "x=y");
    }

    #[test]
    fn decode_rejects_separator_free_line() {
        let err = decode("no separator here").unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidProperty { .. }));
    }

    #[test]
    fn computing_information_roundtrip_with_previous() {
        let info = ComputingInformation {
            current_hash: "abcd".into(),
            previous_timestamp_token: Some("cHJldg==".into()),
        };
        let text = info.to_properties();
        assert!(text.starts_with("currentHash=abcd\n"));
        assert_eq!(ComputingInformation::from_properties(&text).unwrap(), info);
    }

    #[test]
    fn computing_information_first_period_omits_previous() {
        let info = ComputingInformation {
            current_hash: "abcd".into(),
            previous_timestamp_token: None,
        };
        let text = info.to_properties();
        assert_eq!(text, "currentHash=abcd");
        assert_eq!(ComputingInformation::from_properties(&text).unwrap(), info);
    }

    #[test]
    fn computing_information_requires_current_hash() {
        let err = ComputingInformation::from_properties("previousTimestampToken=x").unwrap_err();
        assert_eq!(err, ArchiveError::MissingProperty("currentHash".into()));
    }

    #[test]
    fn additional_information_roundtrip() {
        let info = AdditionalInformation { number_of_element: 1234 };
        let text = info.to_properties();
        assert_eq!(text, "numberOfElement=1234");
        assert_eq!(AdditionalInformation::from_properties(&text).unwrap(), info);
    }

    #[test]
    fn additional_information_rejects_garbage_count() {
        let err = AdditionalInformation::from_properties("numberOfElement=lots").unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidProperty { .. }));
    }
}
