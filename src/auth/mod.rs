mod credentials;
mod session;

pub use credentials::SqliteAuthenticator;
pub use session::SessionStore;

use futures_util::future::BoxFuture;

/// Checks a nickname/secret pair. The relay never handles raw credentials
/// beyond passing them through here.
pub trait Authenticator: Send + Sync + 'static {
    fn verify<'a>(&'a self, nickname: &'a str, secret: &'a str) -> BoxFuture<'a, bool>;
}
