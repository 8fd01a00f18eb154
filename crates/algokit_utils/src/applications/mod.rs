pub mod app_deployer;

pub use app_deployer::{
    AppDeployError, AppDeployMetadata, AppDeployParams, AppDeployResult, AppDeployer, AppLookup,
    AppMetadata, AppState, CreateParams, DeleteParams, DeployAction, OnSchemaBreak, OnUpdate,
    UpdateParams, decide,
};
