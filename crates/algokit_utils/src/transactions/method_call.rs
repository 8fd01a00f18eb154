//! Expansion of ABI method calls into the transactions they occupy in a group.
//!
//! Transaction-typed arguments are built ahead of the call itself. A nested method call
//! contributes every transaction it expands to, which moves the position of all later
//! arguments by `count - 1`. The expansion is a fold over the declared arguments carrying a
//! [`ResolvedMethodArgs`] accumulator.

use super::app_call::{AppMethodCallArg, AppMethodCallParams, ResolvedMethodArg};
use super::common::TransactionSigner;
use super::composer::{BuildContext, BuiltTransaction, ComposerError, ComposerTransaction};
use algokit_abi::{
    ABIMethodArg, ABIMethodArgType, ABIReferenceType, ABIReferenceValue, ABITransactionType,
    ABIValue,
};
use std::sync::Arc;

#[derive(Debug, Default)]
pub(crate) struct ResolvedMethodArgs {
    pub args: Vec<ResolvedMethodArg>,
    /// Transactions that precede the method call, in group order.
    pub transactions: Vec<BuiltTransaction>,
    /// How far later arguments have moved due to nested calls expanding to several
    /// transactions.
    pub offset: usize,
}

fn unsupported(index: usize, message: impl Into<String>) -> ComposerError {
    ComposerError::UnsupportedMethodArgument {
        index,
        message: message.into(),
    }
}

/// Reference arguments also accept the plain value they stand for.
fn reference_from_value(
    reference_type: ABIReferenceType,
    value: &ABIValue,
) -> Option<ABIReferenceValue> {
    match (reference_type, value) {
        (ABIReferenceType::Account, ABIValue::Address(address)) => {
            Some(ABIReferenceValue::Account(address.clone()))
        }
        (ABIReferenceType::Application, value) => {
            value.as_u64().map(ABIReferenceValue::Application)
        }
        (ABIReferenceType::Asset, value) => value.as_u64().map(ABIReferenceValue::Asset),
        _ => None,
    }
}

fn check_transaction_type(
    index: usize,
    expected: ABITransactionType,
    built: &[BuiltTransaction],
) -> Result<(), ComposerError> {
    let Some(last) = built.last() else {
        return Err(unsupported(index, "Argument produced no transaction"));
    };
    let type_name = last.transaction.type_name();
    if !expected.accepts(type_name) {
        return Err(unsupported(
            index,
            format!("Expected a {} transaction, got {}", expected, type_name),
        ));
    }
    Ok(())
}

fn resolve_arg(
    ctx: &BuildContext<'_>,
    default_signer: Option<&Arc<dyn TransactionSigner>>,
    mut acc: ResolvedMethodArgs,
    index: usize,
    declared: &ABIMethodArg,
    arg: &AppMethodCallArg,
) -> Result<ResolvedMethodArgs, ComposerError> {
    match (&declared.arg_type, arg) {
        (ABIMethodArgType::Value(_), AppMethodCallArg::ABIValue(value)) => {
            acc.args.push(ResolvedMethodArg::Value(value.clone()));
        }
        (ABIMethodArgType::Reference(expected), AppMethodCallArg::ABIReference(reference)) => {
            if reference.reference_type() != *expected {
                return Err(unsupported(
                    index,
                    format!("Expected {} reference, got {:?}", expected, reference),
                ));
            }
            acc.args.push(ResolvedMethodArg::Reference(reference.clone()));
        }
        (ABIMethodArgType::Reference(expected), AppMethodCallArg::ABIValue(value)) => {
            let reference = reference_from_value(*expected, value).ok_or_else(|| {
                unsupported(
                    index,
                    format!("{:?} is not a valid {} reference", value, expected),
                )
            })?;
            acc.args.push(ResolvedMethodArg::Reference(reference));
        }
        (ABIMethodArgType::Transaction(expected), AppMethodCallArg::Transaction(intent)) => {
            let built = ctx.build_intent(intent, default_signer)?;
            check_transaction_type(index, *expected, &built)?;
            acc.offset += built.len() - 1;
            acc.transactions.extend(built);
            acc.args.push(ResolvedMethodArg::Transaction);
        }
        (
            ABIMethodArgType::Transaction(expected),
            AppMethodCallArg::TransactionWithSigner(txn_with_signer),
        ) => {
            let built = [BuiltTransaction::from_prebuilt(txn_with_signer)];
            check_transaction_type(index, *expected, &built)?;
            acc.transactions.extend(built);
            acc.args.push(ResolvedMethodArg::Transaction);
        }
        (declared, _) => {
            return Err(unsupported(
                index,
                format!("Argument cannot be passed as {}", declared),
            ));
        }
    }
    Ok(acc)
}

/// Resolves every argument of a method call, building nested transactions through `ctx`.
///
/// Nested intents without their own signer get the call's signer: its explicit signer, then
/// `inherited_signer` from an enclosing call, then the signer registered for the call's sender.
pub(crate) fn resolve_method_args(
    ctx: &BuildContext<'_>,
    params: &AppMethodCallParams,
    inherited_signer: Option<&Arc<dyn TransactionSigner>>,
) -> Result<ResolvedMethodArgs, ComposerError> {
    let declared = &params.method.args;
    if declared.len() != params.args.len() {
        return Err(unsupported(
            declared.len().min(params.args.len()),
            format!(
                "Method {} takes {} arguments, {} given",
                params.method.name,
                declared.len(),
                params.args.len()
            ),
        ));
    }

    let call_signer = ctx.resolve_signer(&params.common_params, inherited_signer)?;
    declared
        .iter()
        .zip(&params.args)
        .enumerate()
        .try_fold(ResolvedMethodArgs::default(), |acc, (index, (declared, arg))| {
            resolve_arg(ctx, Some(&call_signer), acc, index, declared, arg)
        })
}

/// Nested intents that must be validated before any network call.
pub(crate) fn nested_intents(
    params: &AppMethodCallParams,
) -> impl Iterator<Item = &ComposerTransaction> {
    params.args.iter().filter_map(|arg| match arg {
        AppMethodCallArg::Transaction(intent) => Some(intent),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::SuggestedParams;
    use crate::transactions::common::{CommonParams, EmptySigner};
    use crate::transactions::payment::PaymentParams;
    use crate::transactions::signers::SignerMap;
    use algokit_transact::test_utils::AccountMother;

    fn suggested_params() -> SuggestedParams {
        SuggestedParams {
            fee_per_byte: 0,
            min_fee: 1000,
            first_valid: 200,
            genesis_id: "testnet-v1.0".to_string(),
            genesis_hash: [1; 32],
            consensus_version: "v40".to_string(),
        }
    }

    fn payment(amount: u64) -> ComposerTransaction {
        ComposerTransaction::Payment(PaymentParams {
            common_params: CommonParams::new(AccountMother::account()),
            receiver: AccountMother::neil(),
            amount,
        })
    }

    fn call(app_id: u64, signature: &str, args: Vec<AppMethodCallArg>) -> AppMethodCallParams {
        AppMethodCallParams {
            common_params: CommonParams::new(AccountMother::account()),
            app_id,
            method: signature.parse().unwrap(),
            args,
            ..Default::default()
        }
    }

    fn resolve(params: &AppMethodCallParams) -> Result<ResolvedMethodArgs, ComposerError> {
        let suggested_params = suggested_params();
        let ctx = BuildContext {
            suggested_params: &suggested_params,
            default_validity_window: 10,
            signer_getter: &EmptySigner,
        };
        resolve_method_args(&ctx, params, None)
    }

    #[test]
    fn nested_call_shifts_offset_by_its_extra_transactions() {
        let inner = call(1, "inner(pay)void", vec![payment(1).into()]);
        let outer = call(
            2,
            "outer(appl,pay,uint64)void",
            vec![
                ComposerTransaction::AppMethodCall(inner).into(),
                payment(2).into(),
                AppMethodCallArg::ABIValue(5u64.into()),
            ],
        );

        let resolved = resolve(&outer).unwrap();

        assert_eq!(resolved.offset, 1);
        let types: Vec<&str> = resolved
            .transactions
            .iter()
            .map(|b| b.transaction.type_name())
            .collect();
        assert_eq!(types, ["pay", "appl", "pay"]);
        assert_eq!(
            resolved.args,
            [
                ResolvedMethodArg::Transaction,
                ResolvedMethodArg::Transaction,
                ResolvedMethodArg::Value(5u64.into()),
            ]
        );
        assert!(resolved.transactions[1].method.is_some());
    }

    #[test]
    fn nested_intents_take_the_call_senders_signer() {
        let call_sender_signer: Arc<dyn TransactionSigner> = Arc::new(EmptySigner);
        let nested_sender_signer: Arc<dyn TransactionSigner> = Arc::new(EmptySigner);
        let mut signers = SignerMap::new();
        signers
            .insert(AccountMother::account(), call_sender_signer.clone())
            .insert(AccountMother::neil(), nested_sender_signer.clone());
        let nested_payment = ComposerTransaction::Payment(PaymentParams {
            common_params: CommonParams::new(AccountMother::neil()),
            receiver: AccountMother::account(),
            amount: 1,
        });
        let params = call(1, "fund(pay)void", vec![nested_payment.into()]);
        let suggested_params = suggested_params();
        let ctx = BuildContext {
            suggested_params: &suggested_params,
            default_validity_window: 10,
            signer_getter: &signers,
        };

        let resolved = resolve_method_args(&ctx, &params, None).unwrap();

        let signer = &resolved.transactions[0].signer;
        assert!(Arc::ptr_eq(signer, &call_sender_signer));
        assert!(!Arc::ptr_eq(signer, &nested_sender_signer));
    }

    #[test]
    fn plain_values_give_no_offset() {
        let params = call(
            1,
            "sum(uint64,uint64[])void",
            vec![
                AppMethodCallArg::ABIValue(1u64.into()),
                AppMethodCallArg::ABIValue(ABIValue::Array(vec![])),
            ],
        );

        let resolved = resolve(&params).unwrap();

        assert_eq!(resolved.offset, 0);
        assert!(resolved.transactions.is_empty());
    }

    #[test]
    fn reference_arguments_accept_plain_values() {
        let params = call(
            1,
            "refs(asset,account)void",
            vec![
                AppMethodCallArg::ABIValue(12u64.into()),
                AppMethodCallArg::ABIValue(ABIValue::from_address(
                    AccountMother::neil().to_string(),
                )),
            ],
        );

        let resolved = resolve(&params).unwrap();

        assert_eq!(
            resolved.args,
            [
                ResolvedMethodArg::Reference(ABIReferenceValue::Asset(12)),
                ResolvedMethodArg::Reference(ABIReferenceValue::Account(
                    AccountMother::neil().to_string()
                )),
            ]
        );
    }

    #[test]
    fn wrong_transaction_type_is_unsupported() {
        let params = call(1, "opt(axfer)void", vec![payment(1).into()]);

        let err = resolve(&params).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Unsupported method argument at index 0: Expected a axfer transaction, got pay");
    }

    #[test]
    fn transaction_for_value_argument_is_unsupported() {
        let params = call(
            1,
            "add(uint64,uint64)void",
            vec![AppMethodCallArg::ABIValue(1u64.into()), payment(1).into()],
        );

        let err = resolve(&params).unwrap_err();
        assert!(matches!(
            err,
            ComposerError::UnsupportedMethodArgument { index: 1, .. }
        ));
    }

    #[test]
    fn argument_count_must_match() {
        let params = call(1, "add(uint64,uint64)void", vec![AppMethodCallArg::ABIValue(
            1u64.into(),
        )]);

        let err = resolve(&params).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Unsupported method argument at index 1: Method add takes 2 arguments, 1 given");
    }
}
