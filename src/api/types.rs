//! Request and response types for the TrustFlow backend API.
//!
//! Field names are snake_case to match the backend's JSON. Optional request
//! fields are left off the wire when unset so partial updates stay partial.

use serde::{Deserialize, Serialize};

/// Login request body sent to POST /auth/login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Registration body sent to POST /auth/register.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

/// Partial user update sent to PUT /users/me.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Partial profile update sent to PUT /users/profile.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<i64>,
}

/// User record as returned by /users/me and embedded in login responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Login response from POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_request_has_only_email_and_password() {
        let body = serde_json::to_value(LoginRequest {
            email: "a@b.com",
            password: "secret",
        })
        .unwrap();
        assert_eq!(body, json!({"email": "a@b.com", "password": "secret"}));
    }

    #[test]
    fn unset_update_fields_are_omitted() {
        let update = UserUpdate {
            phone: Some("+100200300".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({"phone": "+100200300"})
        );
        assert_eq!(
            serde_json::to_value(ProfileUpdate::default()).unwrap(),
            json!({})
        );
    }

    #[test]
    fn auth_token_parses_backend_login_payload() {
        let token: AuthToken = serde_json::from_value(json!({
            "access_token": "eyJhbGciOi",
            "token_type": "bearer",
            "user": {
                "id": 7,
                "email": "a@b.com",
                "full_name": null,
                "phone": null,
                "is_active": true,
                "is_verified": false,
                "created_at": "2024-03-01T10:00:00"
            }
        }))
        .unwrap();

        assert_eq!(token.access_token, "eyJhbGciOi");
        assert_eq!(token.token_type.as_deref(), Some("bearer"));
        let user = token.user.unwrap();
        assert_eq!(user.id, 7);
        assert!(user.is_active);
        assert!(user.full_name.is_none());
    }

    #[test]
    fn auth_token_tolerates_missing_user() {
        let token: AuthToken =
            serde_json::from_value(json!({"access_token": "t"})).unwrap();
        assert!(token.user.is_none());
        assert!(token.token_type.is_none());
    }
}
