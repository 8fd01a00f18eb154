use super::common::{CommonParams, TransactionWithSigner};
use super::composer::{ComposerError, ComposerTransaction};
use algokit_abi::constants::MAX_METHOD_ARGS;
use algokit_abi::{ABIMethod, ABIMethodArgType, ABIReferenceValue, ABIType, ABIValue};
use algokit_transact::{
    Address, ApplicationCallTransactionBuilder, BoxReference, MAX_EXTRA_PROGRAM_PAGES,
    OnApplicationComplete, PROGRAM_PAGE_SIZE, StateSchema, Transaction, TransactionHeader,
};
use std::str::FromStr;

/// Parameters for a bare application call.
///
/// An `app_id` of 0 creates a new application, in which case both programs are required.
#[derive(Debug, Default, Clone)]
pub struct AppCallParams {
    pub common_params: CommonParams,
    pub app_id: u64,
    pub on_complete: OnApplicationComplete,
    pub approval_program: Option<Vec<u8>>,
    pub clear_state_program: Option<Vec<u8>>,
    /// Only used on creation.
    pub global_state_schema: Option<StateSchema>,
    /// Only used on creation.
    pub local_state_schema: Option<StateSchema>,
    /// Only used on creation. Derived from the program sizes when unset.
    pub extra_program_pages: Option<u32>,
    pub args: Option<Vec<Vec<u8>>>,
    pub account_references: Option<Vec<Address>>,
    pub app_references: Option<Vec<u64>>,
    pub asset_references: Option<Vec<u64>>,
    pub box_references: Option<Vec<BoxReference>>,
}

#[derive(Debug, Default, Clone)]
pub struct AppCreateParams {
    pub common_params: CommonParams,
    pub on_complete: OnApplicationComplete,
    pub approval_program: Vec<u8>,
    pub clear_state_program: Vec<u8>,
    pub global_state_schema: Option<StateSchema>,
    pub local_state_schema: Option<StateSchema>,
    pub extra_program_pages: Option<u32>,
    pub args: Option<Vec<Vec<u8>>>,
    pub account_references: Option<Vec<Address>>,
    pub app_references: Option<Vec<u64>>,
    pub asset_references: Option<Vec<u64>>,
    pub box_references: Option<Vec<BoxReference>>,
}

#[derive(Debug, Default, Clone)]
pub struct AppUpdateParams {
    pub common_params: CommonParams,
    pub app_id: u64,
    pub approval_program: Vec<u8>,
    pub clear_state_program: Vec<u8>,
    pub args: Option<Vec<Vec<u8>>>,
    pub account_references: Option<Vec<Address>>,
    pub app_references: Option<Vec<u64>>,
    pub asset_references: Option<Vec<u64>>,
    pub box_references: Option<Vec<BoxReference>>,
}

#[derive(Debug, Default, Clone)]
pub struct AppDeleteParams {
    pub common_params: CommonParams,
    pub app_id: u64,
    pub args: Option<Vec<Vec<u8>>>,
    pub account_references: Option<Vec<Address>>,
    pub app_references: Option<Vec<u64>>,
    pub asset_references: Option<Vec<u64>>,
    pub box_references: Option<Vec<BoxReference>>,
}

impl From<AppCreateParams> for AppCallParams {
    fn from(params: AppCreateParams) -> Self {
        AppCallParams {
            common_params: params.common_params,
            app_id: 0,
            on_complete: params.on_complete,
            approval_program: Some(params.approval_program),
            clear_state_program: Some(params.clear_state_program),
            global_state_schema: params.global_state_schema,
            local_state_schema: params.local_state_schema,
            extra_program_pages: params.extra_program_pages,
            args: params.args,
            account_references: params.account_references,
            app_references: params.app_references,
            asset_references: params.asset_references,
            box_references: params.box_references,
        }
    }
}

impl From<AppUpdateParams> for AppCallParams {
    fn from(params: AppUpdateParams) -> Self {
        AppCallParams {
            common_params: params.common_params,
            app_id: params.app_id,
            on_complete: OnApplicationComplete::UpdateApplication,
            approval_program: Some(params.approval_program),
            clear_state_program: Some(params.clear_state_program),
            args: params.args,
            account_references: params.account_references,
            app_references: params.app_references,
            asset_references: params.asset_references,
            box_references: params.box_references,
            ..Default::default()
        }
    }
}

impl From<AppDeleteParams> for AppCallParams {
    fn from(params: AppDeleteParams) -> Self {
        AppCallParams {
            common_params: params.common_params,
            app_id: params.app_id,
            on_complete: OnApplicationComplete::DeleteApplication,
            args: params.args,
            account_references: params.account_references,
            app_references: params.app_references,
            asset_references: params.asset_references,
            box_references: params.box_references,
            ..Default::default()
        }
    }
}

/// A single argument to an ABI method call.
#[derive(Debug, Clone)]
pub enum AppMethodCallArg {
    ABIValue(ABIValue),
    ABIReference(ABIReferenceValue),
    /// Built into the group ahead of the method call. Nested method calls are allowed.
    Transaction(ComposerTransaction),
    /// An already built transaction, signed by its own signer.
    TransactionWithSigner(TransactionWithSigner),
}

impl From<ABIValue> for AppMethodCallArg {
    fn from(value: ABIValue) -> Self {
        AppMethodCallArg::ABIValue(value)
    }
}

impl From<ABIReferenceValue> for AppMethodCallArg {
    fn from(value: ABIReferenceValue) -> Self {
        AppMethodCallArg::ABIReference(value)
    }
}

impl From<ComposerTransaction> for AppMethodCallArg {
    fn from(value: ComposerTransaction) -> Self {
        AppMethodCallArg::Transaction(value)
    }
}

impl From<TransactionWithSigner> for AppMethodCallArg {
    fn from(value: TransactionWithSigner) -> Self {
        AppMethodCallArg::TransactionWithSigner(value)
    }
}

/// Parameters for an ARC-4 method call. `app_id` 0 creates the application.
#[derive(Debug, Default, Clone)]
pub struct AppMethodCallParams {
    pub common_params: CommonParams,
    pub app_id: u64,
    pub method: ABIMethod,
    /// One entry per declared method argument, in order.
    pub args: Vec<AppMethodCallArg>,
    pub on_complete: OnApplicationComplete,
    pub approval_program: Option<Vec<u8>>,
    pub clear_state_program: Option<Vec<u8>>,
    pub global_state_schema: Option<StateSchema>,
    pub local_state_schema: Option<StateSchema>,
    pub extra_program_pages: Option<u32>,
    pub account_references: Option<Vec<Address>>,
    pub app_references: Option<Vec<u64>>,
    pub asset_references: Option<Vec<u64>>,
    pub box_references: Option<Vec<BoxReference>>,
}

/// A method argument once any transaction it carried has been moved into the group.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResolvedMethodArg {
    Value(ABIValue),
    Reference(ABIReferenceValue),
    Transaction,
}

/// Number of extra 2048 byte pages the programs need beyond the first, capped at the
/// protocol maximum.
pub fn calculate_extra_program_pages(approval_program: &[u8], clear_state_program: &[u8]) -> u32 {
    let total = approval_program.len().saturating_add(clear_state_program.len());
    if total == 0 {
        return 0;
    }
    let pages = ((total - 1) / PROGRAM_PAGE_SIZE) as u32;
    pages.min(MAX_EXTRA_PROGRAM_PAGES)
}

fn program_or_missing<'a>(
    program: Option<&'a Vec<u8>>,
    name: &str,
) -> Result<&'a Vec<u8>, ComposerError> {
    program
        .filter(|program| !program.is_empty())
        .ok_or_else(|| ComposerError::MissingProgram {
            program: name.to_string(),
        })
}

/// App creation needs both programs.
fn check_creation_programs(
    app_id: u64,
    approval_program: Option<&Vec<u8>>,
    clear_state_program: Option<&Vec<u8>>,
) -> Result<(), ComposerError> {
    if app_id == 0 {
        program_or_missing(approval_program, "approval program")?;
        program_or_missing(clear_state_program, "clear state program")?;
    }
    Ok(())
}

impl AppCallParams {
    pub(crate) fn check_programs(&self) -> Result<(), ComposerError> {
        check_creation_programs(
            self.app_id,
            self.approval_program.as_ref(),
            self.clear_state_program.as_ref(),
        )
    }
}

impl AppMethodCallParams {
    pub(crate) fn check_programs(&self) -> Result<(), ComposerError> {
        check_creation_programs(
            self.app_id,
            self.approval_program.as_ref(),
            self.clear_state_program.as_ref(),
        )
    }
}

/// Builds either an app creation (`app_id` 0) or a call to an existing app.
pub fn build_app_call(
    params: &AppCallParams,
    header: TransactionHeader,
) -> Result<Transaction, ComposerError> {
    let mut builder = ApplicationCallTransactionBuilder::default();
    builder
        .header(header)
        .app_id(params.app_id)
        .on_complete(params.on_complete);

    if params.app_id == 0 {
        let approval = program_or_missing(params.approval_program.as_ref(), "approval program")?;
        let clear =
            program_or_missing(params.clear_state_program.as_ref(), "clear state program")?;
        builder
            .approval_program(approval.clone())
            .clear_state_program(clear.clone());

        if let Some(ref schema) = params.global_state_schema {
            builder.global_state_schema(schema.clone());
        }
        if let Some(ref schema) = params.local_state_schema {
            builder.local_state_schema(schema.clone());
        }
        let extra_pages = params
            .extra_program_pages
            .unwrap_or_else(|| calculate_extra_program_pages(approval, clear));
        if extra_pages > 0 {
            builder.extra_program_pages(extra_pages);
        }
    } else {
        if let Some(ref program) = params.approval_program {
            builder.approval_program(program.clone());
        }
        if let Some(ref program) = params.clear_state_program {
            builder.clear_state_program(program.clone());
        }
    }

    if let Some(ref args) = params.args {
        builder.args(args.clone());
    }
    if let Some(ref account_references) = params.account_references {
        builder.account_references(account_references.clone());
    }
    if let Some(ref app_references) = params.app_references {
        builder.app_references(app_references.clone());
    }
    if let Some(ref asset_references) = params.asset_references {
        builder.asset_references(asset_references.clone());
    }
    if let Some(ref box_references) = params.box_references {
        builder.box_references(box_references.clone());
    }

    builder
        .build()
        .map_err(|e| ComposerError::TransactionError {
            message: e.to_string(),
        })
}

/// Foreign arrays of a method call, extended with the references its arguments name.
#[derive(Debug, Default, Clone, PartialEq)]
struct ForeignReferences {
    accounts: Vec<Address>,
    apps: Vec<u64>,
    assets: Vec<u64>,
}

fn parse_account(address: &str, index: usize) -> Result<Address, ComposerError> {
    Address::from_str(address).map_err(|e| ComposerError::UnsupportedMethodArgument {
        index,
        message: format!("Invalid account reference {}: {}", address, e),
    })
}

impl ForeignReferences {
    fn new(params: &AppMethodCallParams) -> Self {
        Self {
            accounts: params.account_references.clone().unwrap_or_default(),
            apps: params.app_references.clone().unwrap_or_default(),
            assets: params.asset_references.clone().unwrap_or_default(),
        }
    }

    /// The sender and the called app are implicitly available and never added.
    fn add(
        &mut self,
        reference: &ABIReferenceValue,
        index: usize,
        sender: &Address,
        app_id: u64,
    ) -> Result<(), ComposerError> {
        match reference {
            ABIReferenceValue::Account(address) => {
                let address = parse_account(address, index)?;
                if address != *sender && !self.accounts.contains(&address) {
                    self.accounts.push(address);
                }
            }
            ABIReferenceValue::Application(id) => {
                if *id != app_id && !self.apps.contains(id) {
                    self.apps.push(*id);
                }
            }
            ABIReferenceValue::Asset(id) => {
                if !self.assets.contains(id) {
                    self.assets.push(*id);
                }
            }
        }
        Ok(())
    }

    /// Accounts and apps are 1-based with 0 meaning the sender or the called app. Assets are
    /// 0-based.
    fn index_of(
        &self,
        reference: &ABIReferenceValue,
        index: usize,
        sender: &Address,
        app_id: u64,
    ) -> Result<u8, ComposerError> {
        let position = match reference {
            ABIReferenceValue::Account(address) => {
                let address = parse_account(address, index)?;
                if address == *sender {
                    Some(0)
                } else {
                    self.accounts.iter().position(|a| *a == address).map(|p| p + 1)
                }
            }
            ABIReferenceValue::Application(id) if *id == app_id => Some(0),
            ABIReferenceValue::Application(id) => {
                self.apps.iter().position(|a| a == id).map(|p| p + 1)
            }
            ABIReferenceValue::Asset(id) => self.assets.iter().position(|a| a == id),
        };

        position
            .and_then(|p| u8::try_from(p).ok())
            .ok_or_else(|| ComposerError::UnsupportedMethodArgument {
                index,
                message: format!("{:?} does not fit in the foreign arrays", reference),
            })
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

/// Encodes the selector followed by the value arguments. Reference arguments become `uint8`
/// indices and transaction arguments are skipped. Past [`MAX_METHOD_ARGS`] values, the
/// trailing ones are packed into a tuple in the last app arg.
fn encode_method_args(
    method: &ABIMethod,
    args: &[ResolvedMethodArg],
    references: &ForeignReferences,
    sender: &Address,
    app_id: u64,
) -> Result<Vec<Vec<u8>>, ComposerError> {
    let mut types = Vec::new();
    let mut values = Vec::new();
    for (index, (declared, arg)) in method.args.iter().zip(args).enumerate() {
        match (&declared.arg_type, arg) {
            (ABIMethodArgType::Value(abi_type), ResolvedMethodArg::Value(value)) => {
                types.push(abi_type.clone());
                values.push(value.clone());
            }
            (ABIMethodArgType::Reference(_), ResolvedMethodArg::Reference(reference)) => {
                let position = references.index_of(reference, index, sender, app_id)?;
                types.push(ABIType::Uint(8));
                values.push(ABIValue::from(position));
            }
            (ABIMethodArgType::Transaction(_), ResolvedMethodArg::Transaction) => {}
            (declared, arg) => {
                return Err(ComposerError::UnsupportedMethodArgument {
                    index,
                    message: format!("{:?} cannot be passed as {}", arg, declared),
                });
            }
        }
    }

    let mut encoded = vec![method.selector()?];
    if types.len() > MAX_METHOD_ARGS {
        let packed_types = types.split_off(MAX_METHOD_ARGS - 1);
        let packed_values = values.split_off(MAX_METHOD_ARGS - 1);
        types.push(ABIType::Tuple(packed_types));
        values.push(ABIValue::Array(packed_values));
    }
    for (abi_type, value) in types.iter().zip(&values) {
        encoded.push(abi_type.encode(value)?);
    }
    Ok(encoded)
}

/// Builds the application call of a method call whose transaction arguments have already
/// been placed in the group.
pub(crate) fn build_app_method_call(
    params: &AppMethodCallParams,
    args: &[ResolvedMethodArg],
    header: TransactionHeader,
) -> Result<Transaction, ComposerError> {
    let sender = header.sender.clone();
    let mut references = ForeignReferences::new(params);
    for (index, arg) in args.iter().enumerate() {
        if let ResolvedMethodArg::Reference(reference) = arg {
            references.add(reference, index, &sender, params.app_id)?;
        }
    }

    let encoded_args =
        encode_method_args(&params.method, args, &references, &sender, params.app_id)?;

    let call = AppCallParams {
        common_params: params.common_params.clone(),
        app_id: params.app_id,
        on_complete: params.on_complete,
        approval_program: params.approval_program.clone(),
        clear_state_program: params.clear_state_program.clone(),
        global_state_schema: params.global_state_schema.clone(),
        local_state_schema: params.local_state_schema.clone(),
        extra_program_pages: params.extra_program_pages,
        args: Some(encoded_args),
        account_references: non_empty(references.accounts),
        app_references: non_empty(references.apps),
        asset_references: non_empty(references.assets),
        box_references: params.box_references.clone(),
    };
    build_app_call(&call, header)
}
