pub mod algod_api;
pub mod network_client;
pub mod params_cache;

pub use algod_api::{AlgodApi, AlgodApiError, SuggestedParams};
pub use network_client::genesis_id_is_localnet;
pub use params_cache::{DEFAULT_PARAMS_FRESHNESS, ParamsCache};
