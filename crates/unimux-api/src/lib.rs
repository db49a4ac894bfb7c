// unimux-api: per-target HTTP sessions for UniFi controllers
//
// One `TargetClient` per configured controller owns the cookie jar, CSRF
// token, rate limiter, and login state for that controller. The router and
// normalizer modules are pure helpers the fetch layer builds on.

pub mod auth;
pub mod client;
pub mod error;
pub mod limiter;
pub mod models;
pub mod normalize;
pub mod router;
pub mod session;
pub mod target;
pub mod transport;

pub use auth::{AuthStrategy, ControllerFlavor, TargetAuth};
pub use client::{ApiRequest, ApiResponse, TargetClient};
pub use error::Error;
pub use limiter::RateLimiter;
pub use normalize::{ErrorCode, NormalizedError, normalize_error};
pub use router::{controller_path, integration_path, site_path};
pub use session::SessionState;
pub use target::Target;
pub use transport::{TlsMode, TransportConfig};
