use super::common::CommonParams;
use super::composer::ComposerError;
use algokit_transact::{
    Address, AssetConfigTransactionBuilder, AssetParams, Transaction, TransactionHeader,
};

/// Parameters for creating a new asset.
#[derive(Debug, Default, Clone)]
pub struct AssetCreateParams {
    pub common_params: CommonParams,
    /// Total supply in base units, e.g. 10000 for 100 whole units with 2 decimals.
    pub total: u64,
    /// Number of digits after the decimal point, at most 19.
    pub decimals: Option<u32>,
    /// Holdings start frozen and must be unfrozen by the freeze account.
    pub default_frozen: Option<bool>,
    pub asset_name: Option<String>,
    pub unit_name: Option<String>,
    pub url: Option<String>,
    pub metadata_hash: Option<[u8; 32]>,
    /// Can reconfigure and destroy the asset. Unset makes the asset immutable.
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

/// Reconfigures the authority addresses of an existing asset.
///
/// Addresses left unset are cleared permanently, so pass the current value of every role
/// that should be kept.
#[derive(Debug, Default, Clone)]
pub struct AssetConfigParams {
    pub common_params: CommonParams,
    pub asset_id: u64,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

/// Destroys an asset. All units must be back in the creator's account.
#[derive(Debug, Default, Clone)]
pub struct AssetDestroyParams {
    pub common_params: CommonParams,
    pub asset_id: u64,
}

fn asset_config_error(e: impl std::fmt::Display) -> ComposerError {
    ComposerError::TransactionError {
        message: e.to_string(),
    }
}

pub fn build_asset_create(
    params: &AssetCreateParams,
    header: TransactionHeader,
) -> Result<Transaction, ComposerError> {
    let asset_params = AssetParams {
        total: Some(params.total),
        decimals: params.decimals,
        default_frozen: params.default_frozen,
        asset_name: params.asset_name.clone(),
        unit_name: params.unit_name.clone(),
        url: params.url.clone(),
        metadata_hash: params.metadata_hash,
        manager: params.manager.clone(),
        reserve: params.reserve.clone(),
        freeze: params.freeze.clone(),
        clawback: params.clawback.clone(),
    };

    AssetConfigTransactionBuilder::default()
        .header(header)
        .asset_id(0)
        .params(asset_params)
        .build()
        .map_err(asset_config_error)
}

pub fn build_asset_config(
    params: &AssetConfigParams,
    header: TransactionHeader,
) -> Result<Transaction, ComposerError> {
    let asset_params = AssetParams {
        manager: params.manager.clone(),
        reserve: params.reserve.clone(),
        freeze: params.freeze.clone(),
        clawback: params.clawback.clone(),
        ..Default::default()
    };

    AssetConfigTransactionBuilder::default()
        .header(header)
        .asset_id(params.asset_id)
        .params(asset_params)
        .build()
        .map_err(asset_config_error)
}

/// An asset config without params destroys the asset.
pub fn build_asset_destroy(
    params: &AssetDestroyParams,
    header: TransactionHeader,
) -> Result<Transaction, ComposerError> {
    if params.asset_id == 0 {
        return Err(ComposerError::TransactionError {
            message: "Asset destroy requires an asset id".to_string(),
        });
    }

    AssetConfigTransactionBuilder::default()
        .header(header)
        .asset_id(params.asset_id)
        .build()
        .map_err(asset_config_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use algokit_transact::test_utils::{AccountMother, TransactionHeaderMother};

    fn header() -> TransactionHeader {
        TransactionHeaderMother::simple_testnet().build().unwrap()
    }

    #[test]
    fn create_carries_creation_fields() {
        let params = AssetCreateParams {
            total: 10_000,
            decimals: Some(2),
            unit_name: Some("GOLD".to_string()),
            manager: Some(AccountMother::account()),
            ..Default::default()
        };

        let Transaction::AssetConfig(fields) = build_asset_create(&params, header()).unwrap()
        else {
            panic!("expected an asset config");
        };

        assert_eq!(fields.asset_id, 0);
        let asset_params = fields.params.unwrap();
        assert_eq!(asset_params.total, Some(10_000));
        assert_eq!(asset_params.decimals, Some(2));
        assert_eq!(asset_params.unit_name.as_deref(), Some("GOLD"));
    }

    #[test]
    fn create_validates_lengths() {
        let params = AssetCreateParams {
            total: 1,
            unit_name: Some("TOOLONGNAME".to_string()),
            ..Default::default()
        };

        let err = build_asset_create(&params, header()).unwrap_err();
        assert!(err.to_string().contains("Unit name cannot exceed 8 bytes"));
    }

    #[test]
    fn reconfigure_only_sets_addresses() {
        let params = AssetConfigParams {
            asset_id: 77,
            manager: Some(AccountMother::neil()),
            ..Default::default()
        };

        let Transaction::AssetConfig(fields) = build_asset_config(&params, header()).unwrap()
        else {
            panic!("expected an asset config");
        };

        let asset_params = fields.params.unwrap();
        assert_eq!(fields.asset_id, 77);
        assert_eq!(asset_params.manager, Some(AccountMother::neil()));
        assert_eq!(asset_params.total, None);
    }

    #[test]
    fn destroy_has_no_params() {
        let params = AssetDestroyParams {
            asset_id: 77,
            ..Default::default()
        };

        let Transaction::AssetConfig(fields) = build_asset_destroy(&params, header()).unwrap()
        else {
            panic!("expected an asset config");
        };

        assert_eq!(fields.params, None);
        assert!(build_asset_destroy(&AssetDestroyParams::default(), header()).is_err());
    }
}
