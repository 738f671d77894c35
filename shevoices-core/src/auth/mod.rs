//! Auth collaborators: session lookup, sign-out and navigation

mod error;
mod http;
mod mock;
mod session;
mod traits;

pub use error::AuthError;
pub use http::HttpAuthClient;
pub use mock::{RecordingNavigator, RecordingSignOut, StaticSessionProvider};
pub use session::{SessionHandle, SessionUser};
pub use traits::{Navigator, SessionProvider, SignOut, SignOutOptions};
