use crate::clients::{AlgodApi, AlgodApiError};
use crate::config::{AppDeployedEventData, ComposerConfig, Config, EventData, EventType};
use crate::transactions::{
    AppCreateParams, AppDeleteParams, AppMethodCallParams, AppUpdateParams, CommonParams,
    Composer, ComposerError, ComposerResults, SendParams, TransactionSignerGetter,
    calculate_extra_program_pages,
};
use algod_client::models::{Application, ApplicationStateSchema};
use algokit_transact::{Address, StateSchema};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::collections::HashMap;
use std::sync::Arc;

const APP_DEPLOY_NOTE_PREFIX: &str = "ALGOKIT_DEPLOYER";

/// What action to perform if a schema break (storage schema or extra pages change) is detected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnSchemaBreak {
    /// Fail the deployment (default)
    #[default]
    Fail,
    /// Delete the old app and create a new one
    Replace,
    /// Deploy a new app and leave the old one as is
    Append,
}

/// What action to perform if a program change is detected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnUpdate {
    /// Fail the deployment (default)
    #[default]
    Fail,
    /// Update the app with the new programs
    Update,
    /// Delete the old app and create a new one
    Replace,
    /// Deploy a new app and leave the old one as is
    Append,
}

/// The deployment metadata for an application, stored in the note of its create and update
/// transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppDeployMetadata {
    pub name: String,
    pub version: String,
    pub updatable: Option<bool>,
    pub deletable: Option<bool>,
}

impl AppDeployMetadata {
    /// ARC-2 note: `ALGOKIT_DEPLOYER:j{json}`.
    pub fn to_note(&self) -> Result<Vec<u8>, AppDeployError> {
        let metadata_json =
            serde_json::to_string(self).map_err(|e| AppDeployError::DeploymentFailed {
                message: format!("Failed to serialize metadata: {}", e),
            })?;
        Ok(format!("{}:j{}", APP_DEPLOY_NOTE_PREFIX, metadata_json).into_bytes())
    }

    /// `None` for notes that were not written by the deployer.
    pub fn from_note(note: &[u8]) -> Option<Self> {
        let note = std::str::from_utf8(note).ok()?;
        let json = note.strip_prefix(APP_DEPLOY_NOTE_PREFIX)?.strip_prefix(":j")?;
        serde_json::from_str(json).ok()
    }
}

/// What is known about a previously deployed app
#[derive(Debug, Clone, PartialEq)]
pub struct AppMetadata {
    pub app_id: u64,
    pub app_address: Address,
    pub created_round: u64,
    pub updated_round: u64,
    /// The metadata when the app was created
    pub created_metadata: AppDeployMetadata,
    pub deleted: bool,
    /// The metadata as of the latest update
    pub name: String,
    pub version: String,
    pub updatable: Option<bool>,
    pub deletable: Option<bool>,
}

/// Apps previously deployed by a creator, keyed by name.
#[derive(Debug, Clone)]
pub struct AppLookup {
    pub creator: Address,
    pub apps: HashMap<String, AppMetadata>,
}

/// The program and storage shape of an app, deployed or desired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub approval_program: Vec<u8>,
    pub clear_state_program: Vec<u8>,
    pub global_state_schema: StateSchema,
    pub local_state_schema: StateSchema,
    pub extra_program_pages: u32,
}

fn to_state_schema(schema: Option<&ApplicationStateSchema>) -> StateSchema {
    schema
        .map(|schema| StateSchema {
            num_uints: schema.num_uint,
            num_byte_slices: schema.num_byte_slice,
        })
        .unwrap_or_default()
}

impl From<&Application> for AppState {
    fn from(app: &Application) -> Self {
        AppState {
            approval_program: app.params.approval_program.clone(),
            clear_state_program: app.params.clear_state_program.clone(),
            global_state_schema: to_state_schema(app.params.global_state_schema.as_ref()),
            local_state_schema: to_state_schema(app.params.local_state_schema.as_ref()),
            extra_program_pages: app.params.extra_program_pages.unwrap_or(0),
        }
    }
}

impl AppState {
    /// Storage can only grow by creating a new app.
    pub fn is_schema_break(&self, desired: &AppState) -> bool {
        desired.global_state_schema.num_uints > self.global_state_schema.num_uints
            || desired.global_state_schema.num_byte_slices
                > self.global_state_schema.num_byte_slices
            || desired.local_state_schema.num_uints > self.local_state_schema.num_uints
            || desired.local_state_schema.num_byte_slices > self.local_state_schema.num_byte_slices
            || desired.extra_program_pages > self.extra_program_pages
    }

    pub fn is_program_different(&self, desired: &AppState) -> bool {
        self.approval_program != desired.approval_program
            || self.clear_state_program != desired.clear_state_program
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployAction {
    Create,
    Update,
    /// Create a new app and delete the existing one in the same group
    Replace,
    /// Create a new app and leave the existing one
    Append,
    Nothing,
    Fail { reason: String },
}

impl DeployAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployAction::Create => "create",
            DeployAction::Update => "update",
            DeployAction::Replace => "replace",
            DeployAction::Append => "append",
            DeployAction::Nothing => "nothing",
            DeployAction::Fail { .. } => "fail",
        }
    }
}

/// Decides what a deployment must do. `existing` is `None` when there is no live app.
pub fn decide(
    existing: Option<&AppState>,
    desired: &AppState,
    on_schema_break: OnSchemaBreak,
    on_update: OnUpdate,
) -> DeployAction {
    let Some(existing) = existing else {
        return DeployAction::Create;
    };

    if existing.is_schema_break(desired) {
        return match on_schema_break {
            OnSchemaBreak::Fail => DeployAction::Fail {
                reason: "Executing the fail on schema break strategy, stopping deployment. \
                         If you want to try deleting and recreating the app then re-run using \
                         the replace on schema break strategy"
                    .to_string(),
            },
            OnSchemaBreak::Append => DeployAction::Append,
            OnSchemaBreak::Replace => DeployAction::Replace,
        };
    }

    if existing.is_program_different(desired) {
        return match on_update {
            OnUpdate::Fail => DeployAction::Fail {
                reason: "Executing the fail on update strategy, stopping deployment. \
                         Try a different on update strategy to not fail"
                    .to_string(),
            },
            OnUpdate::Update => DeployAction::Update,
            OnUpdate::Replace => DeployAction::Replace,
            OnUpdate::Append => DeployAction::Append,
        };
    }

    DeployAction::Nothing
}

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum CreateParams {
    AppCreateCall(AppCreateParams),
    /// `app_id` is ignored; the call always creates.
    AppCreateMethodCall(AppMethodCallParams),
}

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum UpdateParams {
    AppUpdateCall(AppUpdateParams),
    AppUpdateMethodCall(AppMethodCallParams),
}

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum DeleteParams {
    AppDeleteCall(AppDeleteParams),
    AppDeleteMethodCall(AppMethodCallParams),
}

impl CreateParams {
    fn common_params_mut(&mut self) -> &mut CommonParams {
        match self {
            CreateParams::AppCreateCall(params) => &mut params.common_params,
            CreateParams::AppCreateMethodCall(params) => &mut params.common_params,
        }
    }

    fn sender(&self) -> &Address {
        match self {
            CreateParams::AppCreateCall(params) => &params.common_params.sender,
            CreateParams::AppCreateMethodCall(params) => &params.common_params.sender,
        }
    }

    fn desired_state(&self) -> AppState {
        let (approval, clear, global, local, extra_pages) = match self {
            CreateParams::AppCreateCall(params) => (
                params.approval_program.clone(),
                params.clear_state_program.clone(),
                params.global_state_schema.clone(),
                params.local_state_schema.clone(),
                params.extra_program_pages,
            ),
            CreateParams::AppCreateMethodCall(params) => (
                params.approval_program.clone().unwrap_or_default(),
                params.clear_state_program.clone().unwrap_or_default(),
                params.global_state_schema.clone(),
                params.local_state_schema.clone(),
                params.extra_program_pages,
            ),
        };
        let extra_program_pages =
            extra_pages.unwrap_or_else(|| calculate_extra_program_pages(&approval, &clear));
        AppState {
            approval_program: approval,
            clear_state_program: clear,
            global_state_schema: global.unwrap_or_default(),
            local_state_schema: local.unwrap_or_default(),
            extra_program_pages,
        }
    }

    fn add_to(&self, composer: &mut Composer) -> Result<(), ComposerError> {
        match self {
            CreateParams::AppCreateCall(params) => composer.add_app_create(params.clone())?,
            CreateParams::AppCreateMethodCall(params) => {
                composer.add_app_create_method_call(params.clone())?
            }
        };
        Ok(())
    }
}

impl UpdateParams {
    fn add_to(&self, composer: &mut Composer, app_id: u64) -> Result<(), ComposerError> {
        match self {
            UpdateParams::AppUpdateCall(params) => composer.add_app_update(AppUpdateParams {
                app_id,
                ..params.clone()
            })?,
            UpdateParams::AppUpdateMethodCall(params) => {
                composer.add_app_update_method_call(AppMethodCallParams {
                    app_id,
                    ..params.clone()
                })?
            }
        };
        Ok(())
    }

    fn common_params_mut(&mut self) -> &mut CommonParams {
        match self {
            UpdateParams::AppUpdateCall(params) => &mut params.common_params,
            UpdateParams::AppUpdateMethodCall(params) => &mut params.common_params,
        }
    }
}

impl DeleteParams {
    fn add_to(&self, composer: &mut Composer, app_id: u64) -> Result<(), ComposerError> {
        match self {
            DeleteParams::AppDeleteCall(params) => composer.add_app_delete(AppDeleteParams {
                app_id,
                ..params.clone()
            })?,
            DeleteParams::AppDeleteMethodCall(params) => {
                composer.add_app_delete_method_call(AppMethodCallParams {
                    app_id,
                    ..params.clone()
                })?
            }
        };
        Ok(())
    }
}

/// The parameters to idempotently deploy an app
#[derive(Debug, Clone)]
pub struct AppDeployParams {
    pub metadata: AppDeployMetadata,
    pub on_schema_break: Option<OnSchemaBreak>,
    pub on_update: Option<OnUpdate>,
    /// Used for create, append and the create half of replace. Its programs and schemas are
    /// the desired state of the app.
    pub create_params: CreateParams,
    pub update_params: UpdateParams,
    pub delete_params: DeleteParams,
    /// Apps already deployed by the creator
    pub existing_deployments: AppLookup,
    pub send_params: Option<SendParams>,
}

/// The result of an app deployment operation
#[derive(Debug)]
pub enum AppDeployResult {
    /// A new app was created, either because none existed or by appending
    Create {
        app: AppMetadata,
        result: ComposerResults,
    },
    Update {
        app: AppMetadata,
        result: ComposerResults,
    },
    /// A new app was created and the old one deleted
    Replace {
        app: AppMetadata,
        deleted_app_id: u64,
        result: ComposerResults,
    },
    Nothing { app: AppMetadata },
}

impl AppDeployResult {
    pub fn app(&self) -> &AppMetadata {
        match self {
            AppDeployResult::Create { app, .. }
            | AppDeployResult::Update { app, .. }
            | AppDeployResult::Replace { app, .. }
            | AppDeployResult::Nothing { app } => app,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum AppDeployError {
    #[snafu(display("Composer error: {source}"))]
    ComposerError { source: ComposerError },
    #[snafu(display("Algod client error: {source}"))]
    AlgodClientError { source: AlgodApiError },
    #[snafu(display("Deployment failed: {message}"))]
    DeploymentFailed { message: String },
}

impl From<ComposerError> for AppDeployError {
    fn from(e: ComposerError) -> Self {
        Self::ComposerError { source: e }
    }
}

impl From<AlgodApiError> for AppDeployError {
    fn from(e: AlgodApiError) -> Self {
        Self::AlgodClientError { source: e }
    }
}

/// Idempotently deploys apps, comparing what is on chain with what is wanted.
#[derive(Clone)]
pub struct AppDeployer {
    algod: Arc<dyn AlgodApi>,
    signer_getter: Arc<dyn TransactionSignerGetter>,
    composer_config: ComposerConfig,
}

impl AppDeployer {
    pub fn new(algod: Arc<dyn AlgodApi>, signer_getter: Arc<dyn TransactionSignerGetter>) -> Self {
        Self {
            algod,
            signer_getter,
            composer_config: ComposerConfig::default(),
        }
    }

    pub fn with_composer_config(mut self, config: ComposerConfig) -> Self {
        self.composer_config = config;
        self
    }

    fn new_composer(&self) -> Composer {
        Composer::new(self.algod.clone(), self.signer_getter.clone())
            .with_config(self.composer_config)
    }

    pub async fn deploy(
        &self,
        deployment: AppDeployParams,
    ) -> Result<AppDeployResult, AppDeployError> {
        let AppDeployParams {
            metadata,
            on_schema_break,
            on_update,
            mut create_params,
            mut update_params,
            delete_params,
            existing_deployments,
            send_params,
        } = deployment;

        let note = metadata.to_note()?;
        create_params.common_params_mut().note = Some(note.clone());
        update_params.common_params_mut().note = Some(note);

        let sender = create_params.sender().clone();
        if existing_deployments.creator != sender {
            return Err(AppDeployError::DeploymentFailed {
                message: format!(
                    "Received existing deployments for creator {} when deploying for creator {}",
                    existing_deployments.creator, sender
                ),
            });
        }

        let desired = create_params.desired_state();
        info!(
            "Idempotently deploying app \"{}\" from creator {} using {} bytes of approval program and {} bytes of clear state program",
            metadata.name,
            sender,
            desired.approval_program.len(),
            desired.clear_state_program.len()
        );

        let existing_metadata = existing_deployments
            .apps
            .get(&metadata.name)
            .filter(|app| !app.deleted);
        let existing = match existing_metadata {
            Some(app_metadata) => {
                info!(
                    "Existing app {} found by creator {}, with app id {} and version {}.",
                    metadata.name, sender, app_metadata.app_id, app_metadata.version
                );
                self.algod
                    .application_info(app_metadata.app_id)
                    .await?
                    .map(|app| (app_metadata, AppState::from(&app)))
            }
            None => None,
        };

        let action = decide(
            existing.as_ref().map(|(_, state)| state),
            &desired,
            on_schema_break.unwrap_or_default(),
            on_update.unwrap_or_default(),
        );
        debug!("Deployment of {} resolved to {:?}", metadata.name, action);

        let result = match (action.clone(), existing) {
            (DeployAction::Fail { reason }, _) => {
                return Err(AppDeployError::DeploymentFailed { message: reason });
            }
            (DeployAction::Nothing, Some((app, _))) => {
                debug!("No detected changes in app, nothing to do.");
                AppDeployResult::Nothing { app: app.clone() }
            }
            (DeployAction::Update, Some((app, _))) => {
                if !app.updatable.unwrap_or(false) {
                    warn!(
                        "Executing the update on update strategy on non updatable app {}, update will most likely fail",
                        app.app_id
                    );
                }
                self.update_app(app, &metadata, &update_params, send_params)
                    .await?
            }
            (DeployAction::Replace, Some((app, _))) => {
                if !app.deletable.unwrap_or(false) {
                    warn!(
                        "Replacing non deletable app {}, delete will most likely fail",
                        app.app_id
                    );
                }
                self.replace_app(app, &metadata, &create_params, &delete_params, send_params)
                    .await?
            }
            (DeployAction::Append, _) | (DeployAction::Create, _) => {
                self.create_app(&metadata, &create_params, send_params)
                    .await?
            }
            (action, None) => {
                return Err(AppDeployError::DeploymentFailed {
                    message: format!("Cannot {} an app that does not exist", action.as_str()),
                });
            }
        };

        Config::events()
            .emit(
                EventType::AppDeployed,
                EventData::AppDeployed(AppDeployedEventData {
                    app_name: metadata.name.clone(),
                    app_id: result.app().app_id,
                    action: action.as_str().to_string(),
                }),
            )
            .await;

        Ok(result)
    }

    fn created_app(
        metadata: &AppDeployMetadata,
        result: &ComposerResults,
        index: usize,
    ) -> Result<AppMetadata, AppDeployError> {
        let confirmation =
            result
                .confirmations
                .get(index)
                .ok_or_else(|| AppDeployError::DeploymentFailed {
                    message: "Missing confirmation for the create transaction".to_string(),
                })?;
        let app_id =
            confirmation
                .application_index
                .ok_or_else(|| AppDeployError::DeploymentFailed {
                    message: "Create transaction did not return an app id".to_string(),
                })?;
        let round = confirmation.confirmed_round.unwrap_or_default();

        Ok(AppMetadata {
            app_id,
            app_address: Address::from_app_id(&app_id),
            created_round: round,
            updated_round: round,
            created_metadata: metadata.clone(),
            deleted: false,
            name: metadata.name.clone(),
            version: metadata.version.clone(),
            updatable: metadata.updatable,
            deletable: metadata.deletable,
        })
    }

    async fn create_app(
        &self,
        metadata: &AppDeployMetadata,
        create_params: &CreateParams,
        send_params: Option<SendParams>,
    ) -> Result<AppDeployResult, AppDeployError> {
        let mut composer = self.new_composer();
        create_params.add_to(&mut composer)?;
        let create_index = composer.count() - 1;
        let result = composer.send(send_params).await?;

        let app = Self::created_app(metadata, &result, create_index)?;
        info!(
            "App {} created with id {} (version {})",
            app.name, app.app_id, app.version
        );
        Ok(AppDeployResult::Create { app, result })
    }

    async fn update_app(
        &self,
        existing: &AppMetadata,
        metadata: &AppDeployMetadata,
        update_params: &UpdateParams,
        send_params: Option<SendParams>,
    ) -> Result<AppDeployResult, AppDeployError> {
        let mut composer = self.new_composer();
        update_params.add_to(&mut composer, existing.app_id)?;
        let result = composer.send(send_params).await?;

        let updated_round = result
            .confirmations
            .first()
            .and_then(|c| c.confirmed_round)
            .unwrap_or(existing.updated_round);
        let app = AppMetadata {
            updated_round,
            name: metadata.name.clone(),
            version: metadata.version.clone(),
            updatable: metadata.updatable,
            deletable: metadata.deletable,
            ..existing.clone()
        };
        info!("App {} updated to version {}", app.app_id, app.version);
        Ok(AppDeployResult::Update { app, result })
    }

    async fn replace_app(
        &self,
        existing: &AppMetadata,
        metadata: &AppDeployMetadata,
        create_params: &CreateParams,
        delete_params: &DeleteParams,
        send_params: Option<SendParams>,
    ) -> Result<AppDeployResult, AppDeployError> {
        let mut composer = self.new_composer();
        create_params.add_to(&mut composer)?;
        let create_index = composer.count() - 1;
        delete_params.add_to(&mut composer, existing.app_id)?;
        let result = composer.send(send_params).await?;

        let app = Self::created_app(metadata, &result, create_index)?;
        info!(
            "App {} replaced by app {} (version {})",
            existing.app_id, app.app_id, app.version
        );
        Ok(AppDeployResult::Replace {
            app,
            deleted_app_id: existing.app_id,
            result,
        })
    }
}
