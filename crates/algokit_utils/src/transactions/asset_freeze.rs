use algokit_transact::{Address, AssetFreezeTransactionFields, Transaction, TransactionHeader};

use super::common::CommonParams;

/// Freezes or unfreezes the holding of `target_address`. Must be sent by the asset's freeze
/// account.
#[derive(Debug, Default, Clone)]
pub struct AssetFreezeParams {
    pub common_params: CommonParams,
    pub asset_id: u64,
    pub target_address: Address,
}

pub fn build_asset_freeze(params: &AssetFreezeParams, header: TransactionHeader) -> Transaction {
    freeze_transaction(params, header, true)
}

pub fn build_asset_unfreeze(params: &AssetFreezeParams, header: TransactionHeader) -> Transaction {
    freeze_transaction(params, header, false)
}

fn freeze_transaction(
    params: &AssetFreezeParams,
    header: TransactionHeader,
    frozen: bool,
) -> Transaction {
    Transaction::AssetFreeze(AssetFreezeTransactionFields {
        header,
        asset_id: params.asset_id,
        freeze_target: params.target_address.clone(),
        frozen,
    })
}
