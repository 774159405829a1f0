pub mod authenticator;
pub mod litellm;
pub mod model_catalog;
pub mod settings;

pub use authenticator::Authenticator;
pub use litellm::LiteLlmClient;
pub use model_catalog::ModelCatalog;
pub use settings::SettingsStore;
