//! Asset transfers and the specialised forms built on them: opt-in, opt-out and clawback.
//! All of them are `axfer` transactions on the wire.

use algokit_transact::{Address, AssetTransferTransactionFields, Transaction, TransactionHeader};

use super::common::CommonParams;

#[derive(Debug, Default, Clone)]
pub struct AssetTransferParams {
    pub common_params: CommonParams,
    pub asset_id: u64,
    /// In the asset's base units.
    pub amount: u64,
    pub receiver: Address,
}

/// Allows the sender to hold the asset.
#[derive(Debug, Default, Clone)]
pub struct AssetOptInParams {
    pub common_params: CommonParams,
    pub asset_id: u64,
}

/// Removes the holding from the sender, sending any remaining balance to `close_remainder_to`
/// (normally the asset creator).
#[derive(Debug, Default, Clone)]
pub struct AssetOptOutParams {
    pub common_params: CommonParams,
    pub asset_id: u64,
    pub close_remainder_to: Option<Address>,
}

/// Moves units out of `clawback_target` using the asset's clawback authority.
#[derive(Debug, Default, Clone)]
pub struct AssetClawbackParams {
    pub common_params: CommonParams,
    pub asset_id: u64,
    pub amount: u64,
    pub receiver: Address,
    pub clawback_target: Address,
}

pub fn build_asset_transfer(
    params: &AssetTransferParams,
    header: TransactionHeader,
) -> Transaction {
    Transaction::AssetTransfer(AssetTransferTransactionFields {
        header,
        asset_id: params.asset_id,
        amount: params.amount,
        receiver: params.receiver.clone(),
        asset_sender: None,
        close_remainder_to: None,
    })
}

/// An opt-in is a transfer of zero units to self.
pub fn build_asset_opt_in(params: &AssetOptInParams, header: TransactionHeader) -> Transaction {
    let transfer = AssetTransferParams {
        common_params: params.common_params.clone(),
        asset_id: params.asset_id,
        amount: 0,
        receiver: header.sender.clone(),
    };
    build_asset_transfer(&transfer, header)
}

pub fn build_asset_opt_out(params: &AssetOptOutParams, header: TransactionHeader) -> Transaction {
    let sender = header.sender.clone();
    Transaction::AssetTransfer(AssetTransferTransactionFields {
        header,
        asset_id: params.asset_id,
        amount: 0,
        receiver: sender,
        asset_sender: None,
        close_remainder_to: params.close_remainder_to.clone(),
    })
}

pub fn build_asset_clawback(
    params: &AssetClawbackParams,
    header: TransactionHeader,
) -> Transaction {
    Transaction::AssetTransfer(AssetTransferTransactionFields {
        header,
        asset_id: params.asset_id,
        amount: params.amount,
        receiver: params.receiver.clone(),
        asset_sender: Some(params.clawback_target.clone()),
        close_remainder_to: None,
    })
}
