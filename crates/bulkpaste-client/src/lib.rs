pub mod alternate;
pub mod api;
#[cfg(feature = "browser")]
pub mod browser;
pub mod chain;
pub mod form;
pub mod http;
pub mod session;

pub use alternate::{AlternateProvider, Submission};
pub use api::ApiProvider;
#[cfg(feature = "browser")]
pub use browser::BrowserProvider;
pub use chain::build_chain;
pub use form::{FormProvider, PasteUrlMatcher};
pub use http::HttpSettings;
pub use session::SessionProvider;
