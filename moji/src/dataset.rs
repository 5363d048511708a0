//! Immutable keyword → rendered text table
//!
//! A `Dataset` is built once through one of the constructors below and never
//! changes afterwards. Keyword order is the insertion order of the source, and
//! search results follow it.

use crate::interface::{DatasetProvider, MojiError};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Insertion-ordered, read-only keyword table
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    keywords: Vec<String>,
    texts: HashMap<String, String>,
}

impl Dataset {
    /// Build from `(keyword, text)` pairs.
    ///
    /// Keywords must be non-empty, lower case and unique; matching lower-cases
    /// only the query, so a mixed-case keyword could never be found.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, MojiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs.into_iter();
        let (lower, _) = pairs.size_hint();
        let mut keywords = Vec::with_capacity(lower);
        let mut texts = HashMap::with_capacity(lower);

        for (keyword, text) in pairs {
            let keyword = keyword.into();
            if keyword.is_empty() {
                return Err(MojiError::DatasetError("empty keyword".to_string()));
            }
            if keyword.to_lowercase() != keyword {
                return Err(MojiError::DatasetError(format!(
                    "keyword is not lower case: {keyword}"
                )));
            }
            if texts.contains_key(&keyword) {
                return Err(MojiError::DatasetError(format!("duplicate keyword: {keyword}")));
            }
            texts.insert(keyword.clone(), text.into());
            keywords.push(keyword);
        }

        Ok(Self { keywords, texts })
    }

    /// The asciimoji table shipped with the app
    pub fn bundled() -> Result<Self, MojiError> {
        Self::from_pairs(
            asciimoji_data::dataset()
                .iter()
                .map(|(keyword, text)| (keyword.as_str(), text.as_str())),
        )
    }

    /// Parse a JSON object of `"keyword": "text"` members, keeping member order.
    ///
    /// A keyword repeated inside the object is rejected rather than letting the
    /// last member win.
    pub fn from_json_str(json: &str) -> Result<Self, MojiError> {
        let OrderedMembers(pairs) = serde_json::from_str(json)?;
        Self::from_pairs(pairs)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, MojiError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Synchronous lookup, shared by the provider impl
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.texts.get(keyword).map(String::as_str)
    }
}

/// Object members in document order, duplicates included
struct OrderedMembers(Vec<(String, String)>);

impl<'de> Deserialize<'de> for OrderedMembers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MembersVisitor;

        impl<'de> Visitor<'de> for MembersVisitor {
            type Value = OrderedMembers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of keyword to text strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((keyword, text)) = map.next_entry::<String, String>()? {
                    pairs.push((keyword, text));
                }
                Ok(OrderedMembers(pairs))
            }
        }

        deserializer.deserialize_map(MembersVisitor)
    }
}

#[async_trait::async_trait]
impl DatasetProvider for Dataset {
    fn all_keywords(&self) -> &[String] {
        &self.keywords
    }

    async fn render(&self, keyword: &str) -> Result<String, MojiError> {
        self.get(keyword)
            .map(str::to_owned)
            .ok_or_else(|| MojiError::LookupFailure(keyword.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> Dataset {
        Dataset::from_pairs([
            ("shrug", r"¯\_(ツ)_/¯"),
            ("tableflip", "(╯°□°)╯︵ ┻━┻"),
            ("happy", ":)"),
        ])
        .unwrap()
    }

    #[test]
    fn test_keywords_keep_insertion_order() {
        let dataset = sample();
        assert_eq!(dataset.all_keywords(), ["shrug", "tableflip", "happy"]);
        assert_eq!(dataset.len(), 3);
        assert!(!dataset.is_empty());
    }

    #[test]
    fn test_render_known_and_unknown() {
        let dataset = sample();
        let text = futures::executor::block_on(dataset.render("happy")).unwrap();
        assert_eq!(text, ":)");

        let missing = futures::executor::block_on(dataset.render("nope"));
        assert!(matches!(missing, Err(MojiError::LookupFailure(k)) if k == "nope"));
    }

    #[test]
    fn test_duplicate_keyword_rejected() {
        let result = Dataset::from_pairs([("happy", ":)"), ("happy", ":D")]);
        assert!(matches!(result, Err(MojiError::DatasetError(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_mixed_case_keyword_rejected() {
        let result = Dataset::from_pairs([("Happy", ":)")]);
        assert!(matches!(result, Err(MojiError::DatasetError(msg)) if msg.contains("lower case")));
    }

    #[test]
    fn test_empty_keyword_rejected() {
        assert!(Dataset::from_pairs([("", ":)")]).is_err());
    }

    #[test]
    fn test_rendered_text_may_repeat() {
        let dataset = Dataset::from_pairs([("smile", ":)"), ("happy", ":)")]).unwrap();
        assert_eq!(dataset.get("smile"), dataset.get("happy"));
    }

    #[test]
    fn test_json_preserves_member_order() {
        let dataset =
            Dataset::from_json_str(r#"{"zebra": "z", "apple": "a", "mango": "m"}"#).unwrap();
        assert_eq!(dataset.all_keywords(), ["zebra", "apple", "mango"]);
        assert_eq!(dataset.get("apple"), Some("a"));
    }

    #[test]
    fn test_json_rejects_non_string_values() {
        let result = Dataset::from_json_str(r#"{"happy": 1}"#);
        assert!(matches!(result, Err(MojiError::DatasetError(_))));
    }

    #[test]
    fn test_json_rejects_repeated_keyword() {
        let result = Dataset::from_json_str(r#"{"happy": ":)", "sad": ":(", "happy": ":D"}"#);
        assert!(
            matches!(result, Err(MojiError::DatasetError(msg)) if msg == "duplicate keyword: happy")
        );
    }

    #[test]
    fn test_json_rejects_non_object() {
        let result = Dataset::from_json_str(r#"["happy", ":)"]"#);
        assert!(matches!(result, Err(MojiError::DatasetError(_))));
    }

    #[test]
    fn test_json_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"shrug": "¯\\_(ツ)_/¯", "happy": ":)"}}"#).unwrap();

        let dataset = Dataset::from_json_file(file.path()).unwrap();
        assert_eq!(dataset.all_keywords(), ["shrug", "happy"]);
        assert_eq!(dataset.get("shrug"), Some(r"¯\_(ツ)_/¯"));
    }

    #[test]
    fn test_missing_file_is_dataset_error() {
        let result = Dataset::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(MojiError::DatasetError(_))));
    }

    #[test]
    fn test_bundled_dataset_loads() {
        let dataset = Dataset::bundled().unwrap();
        assert!(dataset.len() > 50);
        assert_eq!(dataset.get("tableflip"), Some("(╯°□°)╯︵ ┻━┻"));
    }
}
