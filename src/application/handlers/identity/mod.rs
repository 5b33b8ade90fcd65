//! Identity handlers.
//!
//! Thin orchestration over the hosted identity provider. Registration is the
//! only handler that also touches the profile store.
//!
//! ## Commands
//! - Registering (sign-up plus profile row)
//! - Signing in and out
//! - Requesting a password reset, changing the password
//!
//! ## Queries
//! - Current session user

mod change_password;
mod get_current_session;
mod register;
mod request_password_reset;
mod sign_in;
mod sign_out;

// Commands
pub use change_password::{ChangePasswordCommand, ChangePasswordHandler};
pub use register::{RegisterCommand, RegisterHandler, RegisterResult};
pub use request_password_reset::{RequestPasswordResetCommand, RequestPasswordResetHandler};
pub use sign_in::{SignInCommand, SignInHandler, SignInResult};
pub use sign_out::{SignOutCommand, SignOutHandler};

// Queries
pub use get_current_session::{
    GetCurrentSessionHandler, GetCurrentSessionQuery, GetCurrentSessionResult,
};
