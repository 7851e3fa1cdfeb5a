use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// An entity decoded from a successful response body.
pub trait ResponseEntity: DeserializeOwned {
    /// Whether a parsed payload carries everything the endpoint always sends.
    /// Payloads that parse but fail this check are treated as undecodable.
    fn is_complete(&self) -> bool {
        true
    }

    /// Keeps the JSON the entity was decoded from, for diagnostics.
    fn keep_raw_json(&mut self, _raw_json: &str) {}
}

/// An access token represents access to a single user at Extole.
///
/// Tokens are never modified once issued; a fresh fetch replaces the whole value.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    #[serde(rename = "access_token")]
    value: String,
    /// Seconds until the token expires. Advisory only: the cache never consults it.
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capabilities: Option<Vec<String>>,
    #[serde(skip)]
    raw_json: Option<String>,
}

impl AccessToken {
    /// Wraps a previously stored token value, such as one persisted by the consumer.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_in: None,
            scopes: None,
            capabilities: None,
            raw_json: None,
        }
    }

    /// The opaque bearer value sent in `Authorization` headers.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    pub fn scopes(&self) -> Option<&[String]> {
        self.scopes.as_deref()
    }

    pub fn capabilities(&self) -> Option<&[String]> {
        self.capabilities.as_deref()
    }

    /// The token response exactly as received, when this token was fetched.
    pub fn raw_json(&self) -> Option<&str> {
        self.raw_json.as_deref()
    }
}

impl ResponseEntity for AccessToken {
    fn is_complete(&self) -> bool {
        !self.value.is_empty()
    }

    fn keep_raw_json(&mut self, raw_json: &str) {
        self.raw_json = Some(raw_json.to_string());
    }
}

/// The profile behind the current access token.
///
/// Everything but `id` may be changed before calling `update_me`.
/// The server assigns `id`, and it is never sent back on update.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    pub email: Option<String>,
    pub partner_user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub cookie_consent: Option<String>,
    pub cookie_consent_type: Option<String>,
    pub processing_consent: Option<String>,
    pub processing_consent_type: Option<String>,
    /// Free-form program parameters attached to the person.
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip)]
    raw_json: Option<String>,
}

impl Person {
    /// An empty person, ready to have fields set for an update.
    pub fn new() -> Self {
        Self::default()
    }

    /// The server-assigned identifier, present once the person has been fetched.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The response this person was decoded from, if it was fetched.
    pub fn raw_json(&self) -> Option<&str> {
        self.raw_json.as_deref()
    }

    /// The payload for an update request. This never includes `id`.
    pub fn to_update(&self) -> PersonUpdate<'_> {
        PersonUpdate {
            email: self.email.as_deref(),
            partner_user_id: self.partner_user_id.as_deref(),
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
            profile_picture_url: self.profile_picture_url.as_deref(),
            cookie_consent: self.cookie_consent.as_deref(),
            cookie_consent_type: self.cookie_consent_type.as_deref(),
            processing_consent: self.processing_consent.as_deref(),
            processing_consent_type: self.processing_consent_type.as_deref(),
            parameters: self.parameters.as_ref(),
        }
    }
}

impl ResponseEntity for Person {
    fn is_complete(&self) -> bool {
        self.id.is_some()
    }

    fn keep_raw_json(&mut self, raw_json: &str) {
        self.raw_json = Some(raw_json.to_string());
    }
}

/// The outgoing body of `POST /api/v4/me`: only the fields the caller has set.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PersonUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_consent: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_consent_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_consent: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_consent_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<&'a Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_token_response() {
        let token: AccessToken =
            serde_json::from_str(r#"{"access_token":"abc123","expires_in":3600}"#).unwrap();
        assert_eq!(token.value(), "abc123");
        assert_eq!(token.expires_in(), Some(3600));
        assert_eq!(token.scopes(), None);
        assert!(token.is_complete());
    }

    #[test]
    fn token_round_trips() {
        let token: AccessToken = serde_json::from_value(json!({
            "access_token": "abc123",
            "expires_in": 3600,
            "scopes": ["UPDATE_PROFILE", "USER_SUPPORT"],
            "capabilities": ["EMAIL_AUTHENTICATED"],
        }))
        .unwrap();

        let encoded = serde_json::to_string(&token).unwrap();
        let decoded: AccessToken = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, token);
        assert_eq!(decoded.scopes().map(<[String]>::len), Some(2));
    }

    #[test]
    fn empty_token_value_is_incomplete() {
        let token: AccessToken = serde_json::from_str(r#"{"access_token":""}"#).unwrap();
        assert!(!token.is_complete());
    }

    #[test]
    fn decodes_person_with_nulls() {
        let person: Person = serde_json::from_value(json!({
            "id": "6646217761789432116",
            "email": null,
            "first_name": "Ada",
            "last_name": null,
            "profile_picture_url": null,
            "partner_user_id": null,
            "cookie_consent": null,
            "cookie_consent_type": null,
            "processing_consent": null,
            "processing_consent_type": null,
            "parameters": {},
        }))
        .unwrap();

        assert_eq!(person.id(), Some("6646217761789432116"));
        assert_eq!(person.first_name.as_deref(), Some("Ada"));
        assert_eq!(person.email, None);
        assert!(person.is_complete());
    }

    #[test]
    fn person_without_id_is_incomplete() {
        let person: Person = serde_json::from_str(r#"{"email":"a@example.com"}"#).unwrap();
        assert!(!person.is_complete());
    }

    #[test]
    fn person_round_trips() {
        let person: Person = serde_json::from_value(json!({
            "id": "42",
            "email": "ada@example.com",
            "partner_user_id": "p-1",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "profile_picture_url": "https://example.com/ada.png",
            "parameters": {"tier": "gold"},
        }))
        .unwrap();

        let decoded: Person =
            serde_json::from_str(&serde_json::to_string(&person).unwrap()).unwrap();
        assert_eq!(decoded, person);
    }

    #[test]
    fn update_never_includes_id() {
        let mut person: Person =
            serde_json::from_str(r#"{"id":"42","email":"old@example.com"}"#).unwrap();
        person.email = Some("new@example.com".to_string());

        let body = serde_json::to_value(person.to_update()).unwrap();
        assert_eq!(body, json!({"email": "new@example.com"}));
        assert!(body.get("id").is_none());
    }
}
