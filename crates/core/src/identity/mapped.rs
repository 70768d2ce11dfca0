//! Generic identity records built from reflected rows.
//!
//! A [`MappedIdentity`] holds whatever columns the selected table had, keyed
//! by their real names. Each normalized attribute is resolved by probing an
//! ordered alias list against those columns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Columns that may hold a display name.
pub const NAME_ALIASES: &[&str] = &["name"];

/// Columns that may hold an email address, most specific first.
pub const EMAIL_ALIASES: &[&str] = &["email", "email_address"];

/// Columns that may hold an account name.
pub const USERNAME_ALIASES: &[&str] = &["username", "user_id", "nick"];

/// A normalized identity, as written to the export document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

/// One row of the identities table, column name -> value.
///
/// A column that exists but holds SQL NULL is present with a `None` value;
/// that is different from the column not existing at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedIdentity {
    columns: HashMap<String, Option<String>>,
}

impl MappedIdentity {
    pub fn new(columns: HashMap<String, Option<String>>) -> Self {
        Self { columns }
    }

    /// Whether the row has a column called `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Value of `column`; `None` if absent or NULL.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.columns.get(column).and_then(|v| v.as_deref())
    }

    /// Resolve through `aliases`: the first column that exists decides the
    /// value, even when it is NULL.
    pub fn resolve(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .find_map(|alias| self.columns.get(*alias))
            .and_then(|v| v.as_deref())
    }

    pub fn name(&self) -> Option<&str> {
        self.resolve(NAME_ALIASES)
    }

    pub fn email(&self) -> Option<&str> {
        self.resolve(EMAIL_ALIASES)
    }

    pub fn username(&self) -> Option<&str> {
        self.resolve(USERNAME_ALIASES)
    }

    /// Project onto the normalized attribute set.
    pub fn to_identity(&self) -> Identity {
        Identity {
            name: self.name().map(str::to_owned),
            email: self.email().map(str::to_owned),
            username: self.username().map(str::to_owned),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for MappedIdentity {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Option<&str>)]) -> MappedIdentity {
        pairs
            .iter()
            .map(|(k, v)| (*k, v.map(str::to_owned)))
            .collect()
    }

    #[test]
    fn test_people_row() {
        let identity = row(&[
            ("id", Some("1")),
            ("name", Some("Alice")),
            ("email", Some("a@x.com")),
        ])
        .to_identity();

        assert_eq!(
            identity,
            Identity {
                name: Some("Alice".into()),
                email: Some("a@x.com".into()),
                username: None,
            }
        );
    }

    #[test]
    fn test_email_from_alias_column() {
        let record = row(&[
            ("email_address", Some("jdoe@example.com")),
            ("name", Some("John Doe")),
            ("username", Some("jdoe")),
        ]);
        assert_eq!(record.email(), Some("jdoe@example.com"));
        assert_eq!(record.username(), Some("jdoe"));
    }

    #[test]
    fn test_missing_aliases_resolve_to_none() {
        let record = row(&[("id", Some("7")), ("message", Some("hi"))]);
        assert_eq!(record.to_identity(), Identity::default());
    }

    #[test]
    fn test_first_present_alias_wins_even_when_null() {
        let record = row(&[("email", None), ("email_address", Some("other@example.com"))]);
        assert!(record.has_column("email"));
        assert_eq!(record.email(), None);
    }

    #[test]
    fn test_username_priority() {
        let record = row(&[("nick", Some("bob")), ("user_id", Some("bob42"))]);
        assert_eq!(record.username(), Some("bob42"));

        let record = row(&[("nick", Some("bob"))]);
        assert_eq!(record.username(), Some("bob"));
    }

    #[test]
    fn test_identity_serializes_nulls() {
        let identity = Identity {
            name: Some("Bob".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Bob", "email": null, "username": null})
        );
    }
}
