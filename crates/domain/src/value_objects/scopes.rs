//! Access-token scopes, normalized once at the permission boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::OptionMap;

/// Claims of a player's access token, as handed over by the token issuer.
///
/// Issuers disagree on shape: some send `scp` as a list, others send a
/// space-delimited `scope` string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Value>,
}

/// Canonical scope list in token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet(Vec<String>);

impl ScopeSet {
    pub fn new(scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(scopes.into_iter().map(Into::into).collect())
    }

    /// `scp` wins when it is a list; otherwise `scope` is used, either as a
    /// space-delimited string or as a list.
    pub fn from_claims(claims: &TokenClaims) -> Self {
        if let Some(Value::Array(items)) = &claims.scp {
            return Self::from_array(items);
        }
        match &claims.scope {
            Some(Value::String(joined)) => Self::new(joined.split_whitespace()),
            Some(Value::Array(items)) => Self::from_array(items),
            _ => Self::default(),
        }
    }

    fn from_array(items: &[Value]) -> Self {
        Self::new(items.iter().filter_map(Value::as_str))
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.iter().any(|s| s == scope)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Next state of the first option, in configuration order, whose key is
    /// one of these scopes.
    pub fn first_granted<'a>(&self, options: &'a OptionMap) -> Option<&'a str> {
        options
            .iter()
            .find(|(identity, _)| self.contains(identity))
            .map(|(_, next_state)| next_state)
    }
}
