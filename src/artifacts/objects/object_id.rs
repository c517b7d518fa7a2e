//! Commit ids found in a detached HEAD
//!
//! A detached HEAD holds a full hex id (40 digits for SHA-1, 64 for SHA-256);
//! the watcher reports it by its 7-character abbreviation.

use crate::artifacts::objects::{
    OBJECT_ID_LENGTH, SHA256_OBJECT_ID_LENGTH, SHORT_OBJECT_ID_LENGTH,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Validate a full hex id, normalizing it to lowercase
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH && id.len() != SHA256_OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// The abbreviated id used as the head name when detached
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(SHORT_OBJECT_ID_LENGTH).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn short_oid_is_a_prefix_of_the_full_id(id in "[0-9a-f]{40}|[0-9a-f]{64}") {
            let oid = ObjectId::try_parse(id.clone()).unwrap();

            assert_eq!(oid.to_short_oid().len(), SHORT_OBJECT_ID_LENGTH);
            assert!(id.starts_with(&oid.to_short_oid()));
        }

        #[test]
        fn ids_of_the_wrong_length_are_rejected(id in "[0-9a-f]{1,39}|[0-9a-f]{41,63}|[0-9a-f]{65,80}") {
            assert!(ObjectId::try_parse(id).is_err());
        }
    }

    #[test]
    fn non_hex_characters_are_rejected() {
        let id = "z".repeat(OBJECT_ID_LENGTH);

        assert!(ObjectId::try_parse(id).is_err());
    }

    #[test]
    fn uppercase_ids_are_normalized() {
        let oid = ObjectId::try_parse("ABC1234".to_string() + &"0".repeat(33)).unwrap();

        assert_eq!(oid.to_short_oid(), "abc1234");
    }
}
