//! Account service layer
//!
//! Registration, login, profile lookup and admin user management. Password
//! hashing and verification run on the blocking pool since Argon2 is
//! deliberately slow.

use super::password::{hash_password, validate_password_strength, verify_dummy, verify_password};
use super::token::{TokenAuthority, TOKEN_VALIDITY_SECS};
use crate::audit::{audit_log, AuditEvent};
use crate::error::AppError;
use hotel_core::{HotelError, Identity, User, UserPublic, UserStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub first_name: String,
    #[validate(length(min = 2, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin edit of a user's profile; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 100))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 100))]
    pub last_name: Option<String>,
}

/// One page of users
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPage {
    pub users: Vec<UserPublic>,
    /// Current page (1-indexed)
    pub page: u32,
    pub page_size: u32,
}

/// Default and upper bound for `page_size`
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Login response carrying the bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserPublic,
}

/// Account operations over the user store
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenAuthority>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenAuthority>) -> Self {
        Self { users, tokens }
    }

    /// Register a regular user
    pub async fn register(&self, request: RegisterRequest) -> Result<UserPublic, AppError> {
        self.create(request, false, None).await
    }

    /// Register an admin on behalf of an authenticated admin
    pub async fn register_admin(
        &self,
        request: RegisterRequest,
        created_by: &Identity,
    ) -> Result<UserPublic, AppError> {
        if !created_by.is_admin {
            return Err(AppError::Forbidden(
                "Only admins can create admin accounts".to_string(),
            ));
        }
        self.create(request, true, Some(created_by.id.clone())).await
    }

    /// Make sure the configured startup administrator exists
    ///
    /// Creates the account when the email is unknown and promotes it when it
    /// belongs to a regular user. An existing account keeps its password.
    pub async fn ensure_bootstrap_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserPublic, AppError> {
        let email = email.trim().to_lowercase();

        if let Some(mut user) = self.users.find_by_email(&email).await? {
            if !user.is_admin {
                user.is_admin = true;
                self.users.update_user(&user).await?;
                audit_log(&AuditEvent::AdminPromoted {
                    user_id: user.id.clone(),
                    email: user.email.clone(),
                });
            }
            return Ok(user.to_public());
        }

        self.create(
            RegisterRequest {
                first_name: "System".to_string(),
                last_name: "Admin".to_string(),
                email,
                password: password.to_string(),
            },
            true,
            None,
        )
        .await
    }

    async fn create(
        &self,
        request: RegisterRequest,
        is_admin: bool,
        created_by: Option<String>,
    ) -> Result<UserPublic, AppError> {
        let mut fields: Vec<String> = match request.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors.field_errors().keys().map(|k| k.to_string()).collect(),
        };
        if validate_password_strength(&request.password).is_err() {
            fields.push("password".to_string());
        }
        if !fields.is_empty() {
            fields.sort();
            return Err(HotelError::ValidationError { fields }.into());
        }

        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let user = self
            .users
            .insert_user(User::new(
                request.first_name.trim().to_string(),
                request.last_name.trim().to_string(),
                request.email.trim().to_lowercase(),
                password_hash,
                is_admin,
            ))
            .await?;

        audit_log(&AuditEvent::Registration {
            user_id: user.id.clone(),
            email: user.email.clone(),
            is_admin,
            created_by,
        });

        Ok(user.to_public())
    }

    /// Exchange email and password for a bearer token
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(
        &self,
        request: LoginRequest,
        ip_address: Option<String>,
    ) -> Result<AuthResponse, AppError> {
        let email = request.email.trim().to_lowercase();

        let Some(user) = self.users.find_by_email(&email).await? else {
            let password = request.password;
            let _ = tokio::task::spawn_blocking(move || verify_dummy(&password)).await;
            audit_log(&AuditEvent::LoginFailure {
                email,
                reason: "unknown email".to_string(),
                ip_address,
            });
            return Err(AppError::Unauthorized);
        };

        let stored_hash = user.password_hash.clone();
        let password = request.password;
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
                .await
                .unwrap_or(false);

        if !verified {
            audit_log(&AuditEvent::LoginFailure {
                email,
                reason: "invalid password".to_string(),
                ip_address,
            });
            return Err(AppError::Unauthorized);
        }

        let access_token = self
            .tokens
            .issue(&user.identity())
            .map_err(|e| AppError::Internal(e.to_string()))?;

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id.clone(),
            email: user.email.clone(),
            ip_address,
        });

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: TOKEN_VALIDITY_SECS,
            user: user.to_public(),
        })
    }

    /// Profile of the authenticated caller
    pub async fn me(&self, identity: &Identity) -> Result<UserPublic, AppError> {
        self.users
            .get_user(&identity.id)
            .await?
            .map(|u| u.to_public())
            .ok_or_else(|| HotelError::not_found("user", identity.id.clone()).into())
    }

    /// Page through all accounts, oldest first
    ///
    /// `page` starts at 1; `page_size` defaults to 20 and is capped at 100.
    pub async fn list_users(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
        actor: &Identity,
    ) -> Result<UserPage, AppError> {
        admin_only(actor)?;

        let page = page.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = (page as usize - 1).saturating_mul(page_size as usize);

        let users = self
            .users
            .list_users(page_size as usize, offset)
            .await?
            .iter()
            .map(User::to_public)
            .collect();

        Ok(UserPage {
            users,
            page,
            page_size,
        })
    }

    pub async fn get_user(&self, id: &str, actor: &Identity) -> Result<UserPublic, AppError> {
        admin_only(actor)?;
        Ok(self.user(id).await?.to_public())
    }

    pub async fn update_user(
        &self,
        id: &str,
        request: UpdateUserRequest,
        actor: &Identity,
    ) -> Result<UserPublic, AppError> {
        admin_only(actor)?;

        if let Err(errors) = request.validate() {
            let mut fields: Vec<String> =
                errors.field_errors().keys().map(|k| k.to_string()).collect();
            fields.sort();
            return Err(HotelError::ValidationError { fields }.into());
        }
        if request.first_name.is_none() && request.last_name.is_none() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        let mut user = self.user(id).await?;
        if let Some(first_name) = request.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name.trim().to_string();
        }
        self.users.update_user(&user).await?;

        audit_log(&AuditEvent::UserUpdated {
            user_id: user.id.clone(),
            updated_by: actor.id.clone(),
        });

        Ok(user.to_public())
    }

    /// Remove an account that holds no bookings
    pub async fn delete_user(&self, id: &str, actor: &Identity) -> Result<(), AppError> {
        admin_only(actor)?;
        self.users.delete_user(id).await?;

        audit_log(&AuditEvent::UserDeleted {
            user_id: id.to_string(),
            deleted_by: actor.id.clone(),
        });
        Ok(())
    }

    async fn user(&self, id: &str) -> Result<User, AppError> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| HotelError::not_found("user", id).into())
    }
}

fn admin_only(actor: &Identity) -> Result<(), AppError> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_core::MemoryStore;

    fn service() -> (Arc<TokenAuthority>, AccountService) {
        let tokens = Arc::new(TokenAuthority::new(b"service-test-secret"));
        let service = AccountService::new(Arc::new(MemoryStore::new()), tokens.clone());
        (tokens, service)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "analytical-engine".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let (tokens, service) = service();
        let user = service.register(register_request("ada@example.com")).await.unwrap();
        assert!(!user.is_admin);

        let response = service
            .login(
                LoginRequest {
                    email: "ADA@example.com".to_string(),
                    password: "analytical-engine".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, TOKEN_VALIDITY_SECS);
        assert_eq!(tokens.verify(&response.access_token).unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (_tokens, service) = service();
        service.register(register_request("ada@example.com")).await.unwrap();

        let result = service
            .login(
                LoginRequest {
                    email: "ada@example.com".to_string(),
                    password: "difference-engine".to_string(),
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (_tokens, service) = service();
        let result = service
            .login(
                LoginRequest {
                    email: "nobody@example.com".to_string(),
                    password: "whatever-it-is".to_string(),
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_register_validation_lists_fields() {
        let (_tokens, service) = service();
        let result = service
            .register(RegisterRequest {
                first_name: "A".to_string(),
                last_name: "Lovelace".to_string(),
                email: "not-an-email".to_string(),
                password: "short".to_string(),
            })
            .await;

        match result {
            Err(AppError::Validation(fields)) => {
                assert_eq!(fields, vec!["email", "first_name", "password"]);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let (_tokens, service) = service();
        service.register(register_request("ada@example.com")).await.unwrap();

        let result = service.register(register_request("ada@example.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_admin_requires_admin() {
        let (_tokens, service) = service();

        let result = service
            .register_admin(register_request("eve@example.com"), &Identity::user("u1"))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let admin = service
            .register_admin(register_request("root@example.com"), &Identity::admin("root"))
            .await
            .unwrap();
        assert!(admin.is_admin);
    }

    #[tokio::test]
    async fn test_me() {
        let (_tokens, service) = service();
        let user = service.register(register_request("ada@example.com")).await.unwrap();

        let me = service.me(&Identity::user(user.id.clone())).await.unwrap();
        assert_eq!(me, user);

        let missing = service.me(&Identity::user("ghost")).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_idempotent() {
        let (tokens, service) = service();

        let first = service
            .ensure_bootstrap_admin("Root@Hotel.test", "front-desk-secret")
            .await
            .unwrap();
        assert!(first.is_admin);
        assert_eq!(first.email, "root@hotel.test");

        let second = service
            .ensure_bootstrap_admin("root@hotel.test", "front-desk-secret")
            .await
            .unwrap();
        assert_eq!(second.id, first.id);

        let response = service
            .login(
                LoginRequest {
                    email: "root@hotel.test".to_string(),
                    password: "front-desk-secret".to_string(),
                },
                None,
            )
            .await
            .unwrap();
        assert!(tokens.verify(&response.access_token).unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_promotes_existing_user() {
        let (_tokens, service) = service();
        let user = service.register(register_request("ada@example.com")).await.unwrap();
        assert!(!user.is_admin);

        let promoted = service
            .ensure_bootstrap_admin("ada@example.com", "some-other-password")
            .await
            .unwrap();
        assert_eq!(promoted.id, user.id);
        assert!(promoted.is_admin);

        // The existing password is kept
        let result = service
            .login(
                LoginRequest {
                    email: "ada@example.com".to_string(),
                    password: "analytical-engine".to_string(),
                },
                None,
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_rejects_weak_password() {
        let (_tokens, service) = service();
        let result = service.ensure_bootstrap_admin("root@hotel.test", "short").await;
        match result {
            Err(AppError::Validation(fields)) => assert_eq!(fields, vec!["password"]),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_users_pages() {
        let (_tokens, service) = service();
        for i in 0..5 {
            service
                .register(register_request(&format!("guest{i}@example.com")))
                .await
                .unwrap();
        }
        let admin = Identity::admin("root");

        let first = service.list_users(None, Some(2), &admin).await.unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.page_size, 2);
        assert_eq!(first.users.len(), 2);

        let last = service.list_users(Some(3), Some(2), &admin).await.unwrap();
        assert_eq!(last.users.len(), 1);

        let capped = service.list_users(Some(0), Some(1000), &admin).await.unwrap();
        assert_eq!(capped.page, 1);
        assert_eq!(capped.page_size, MAX_PAGE_SIZE);
        assert_eq!(capped.users.len(), 5);

        let denied = service.list_users(None, None, &Identity::user("u1")).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_user() {
        let (_tokens, service) = service();
        let user = service.register(register_request("ada@example.com")).await.unwrap();
        let admin = Identity::admin("root");

        let updated = service
            .update_user(
                &user.id,
                UpdateUserRequest {
                    first_name: Some(" Augusta ".to_string()),
                    last_name: None,
                },
                &admin,
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.last_name, "Lovelace");
        assert_eq!(service.get_user(&user.id, &admin).await.unwrap(), updated);

        let invalid = service
            .update_user(
                &user.id,
                UpdateUserRequest {
                    first_name: Some("A".to_string()),
                    last_name: None,
                },
                &admin,
            )
            .await;
        match invalid {
            Err(AppError::Validation(fields)) => assert_eq!(fields, vec!["first_name"]),
            other => panic!("Expected validation error, got {other:?}"),
        }

        let empty = service
            .update_user(&user.id, UpdateUserRequest::default(), &admin)
            .await;
        assert!(matches!(empty, Err(AppError::BadRequest(_))));

        let missing = service
            .update_user(
                "ghost",
                UpdateUserRequest {
                    first_name: Some("Nobody".to_string()),
                    last_name: None,
                },
                &admin,
            )
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (_tokens, service) = service();
        let user = service.register(register_request("ada@example.com")).await.unwrap();
        let admin = Identity::admin("root");

        let denied = service.delete_user(&user.id, &Identity::user(user.id.clone())).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        service.delete_user(&user.id, &admin).await.unwrap();
        assert!(matches!(
            service.get_user(&user.id, &admin).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(&user.id, &admin).await,
            Err(AppError::NotFound(_))
        ));
    }
}
