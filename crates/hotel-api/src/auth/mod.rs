//! Authentication and authorization module
//!
//! This module provides token-based authentication with the following components:
//! - Token issuing and verification (HS256, 24 hour validity)
//! - Password hashing and verification with Argon2
//! - Middleware that resolves the caller's identity per request
//! - Account service for registration, login and admin user management

pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

pub use middleware::{auth_middleware, authenticate, extract_token, AuthError, CurrentUser};
pub use password::{hash_password, validate_password_strength, verify_dummy, verify_password};
pub use service::{
    AccountService, AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, UserPage,
};
pub use token::{Claims, TokenAuthority, TokenError, TOKEN_VALIDITY_SECS};
