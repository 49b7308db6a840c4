//! `invoicedesk-auth`: credential checks, sessions and the route gate.
//!
//! This crate is decoupled from HTTP and storage: user lookup goes through
//! the [`UserDirectory`] port and the gate is a pure function of
//! `(session?, path)`.

pub mod authenticator;
pub mod credentials;
pub mod gate;
pub mod password;
pub mod session;
pub mod user;

pub use authenticator::{AuthError, Authenticator, DirectoryError, UserDirectory};
pub use credentials::{Credentials, parse_credentials};
pub use gate::{LOGIN_PATH, PROTECTED_PREFIX, RouteDecision, RouteGate, authorize_route, gate_applies};
pub use password::{hash_password, verify_password};
pub use session::{Hs256SessionCodec, SessionClaims, SessionError, SessionValidator, validate_claims};
pub use user::User;
