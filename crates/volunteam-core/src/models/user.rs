use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PersonName {
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub last: String,
}

/// An account on the backend. `email` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: String,
    pub email: String,
    // The mock backend stores the bcrypt hash under "password"
    #[serde(rename = "password", alias = "passwordHash")]
    pub password_hash: String,
    #[serde(default)]
    pub name: PersonName,
    #[serde(default)]
    pub mobile: String,
}

impl User {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.name.first, self.name.last);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    /// `tel:` link for the user's mobile number, if one is on file.
    pub fn call_url(&self) -> Option<String> {
        self.dial_number().map(|n| format!("tel:{}", n))
    }

    /// `sms:` link for the user's mobile number, if one is on file.
    pub fn text_url(&self) -> Option<String> {
        self.dial_number().map(|n| format!("sms:{}", n))
    }

    fn dial_number(&self) -> Option<String> {
        let number: String = self.mobile.chars().filter(|c| !c.is_whitespace()).collect();
        (!number.is_empty()).then_some(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_parses_backend_record() {
        let json = r#"{"id":"1700000000000","email":"ana@example.com","password":"$2b$10$abc","name":{"first":"Ana","last":"Silva"},"mobile":"584-000-999"}"#;
        let user: User = serde_json::from_str(json).expect("parse user");
        assert_eq!(user.password_hash, "$2b$10$abc");
        assert_eq!(user.display_name(), "Ana Silva");

        let back = serde_json::to_value(&user).expect("serialize user");
        assert_eq!(back["password"], "$2b$10$abc");
        assert!(back.get("passwordHash").is_none());
    }

    #[test]
    fn test_contact_links() {
        let json = r#"{"id":"3","email":"c@example.com","password":"x","mobile":"584 000 999"}"#;
        let mut user: User = serde_json::from_str(json).expect("parse user");
        assert_eq!(user.call_url().as_deref(), Some("tel:584000999"));
        assert_eq!(user.text_url().as_deref(), Some("sms:584000999"));

        user.mobile = "  ".to_string();
        assert!(user.call_url().is_none());
        assert!(user.text_url().is_none());
    }

    #[test]
    fn test_user_accepts_password_hash_alias() {
        let json = r#"{"id":"2","email":"b@example.com","passwordHash":"$2b$10$xyz"}"#;
        let user: User = serde_json::from_str(json).expect("parse user");
        assert_eq!(user.password_hash, "$2b$10$xyz");
        assert_eq!(user.name, PersonName::default());
        assert_eq!(user.display_name(), "b@example.com");
    }
}
