//! Provider callback surface
//!
//! The trait here is the contract the host test driver programs against:
//! one method per protocol callback, each taking a request struct and
//! returning a response struct that carries its diagnostics. Marshaling to
//! and from the actual wire protocol happens in the host, not here.

use crate::schema::{AttributeType, Schema};
use crate::types::{
    ClientCapabilities, Deferred, Diagnostic, DynamicValue, FunctionError, ServerCapabilities,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Provider is the callback surface required by the host provisioning
/// protocol. Implementations must never return transport-level errors;
/// failures travel in the response diagnostics.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn get_schema(&self) -> GetProviderSchemaResponse;

    async fn configure(&self, request: ConfigureProviderRequest) -> ConfigureProviderResponse;

    async fn plan_resource_change(
        &self,
        request: PlanResourceChangeRequest,
    ) -> PlanResourceChangeResponse;

    async fn apply_resource_change(
        &self,
        request: ApplyResourceChangeRequest,
    ) -> ApplyResourceChangeResponse;

    async fn read_resource(&self, request: ReadResourceRequest) -> ReadResourceResponse;

    async fn read_data_source(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse;

    async fn import_resource_state(
        &self,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse;

    async fn move_resource_state(
        &self,
        request: MoveResourceStateRequest,
    ) -> MoveResourceStateResponse;

    async fn call_function(&self, request: CallFunctionRequest) -> CallFunctionResponse;

    /// Must be called exactly once before the provider is dropped.
    async fn close(&self) -> CloseProviderResponse;
}

/// Declares a provider function: name-keyed in the schema response.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub parameters: Vec<FunctionParam>,
    pub return_type: AttributeType,
}

#[derive(Debug, Clone)]
pub struct FunctionParam {
    pub name: String,
    pub r#type: AttributeType,
}

pub struct GetProviderSchemaResponse {
    pub provider: Schema,
    pub resource_types: HashMap<String, Schema>,
    pub data_sources: HashMap<String, Schema>,
    pub functions: HashMap<String, FunctionDecl>,
    pub server_capabilities: ServerCapabilities,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct PlanResourceChangeRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub proposed_new_state: DynamicValue,
    pub config: DynamicValue,
    pub client_capabilities: ClientCapabilities,
}

pub struct PlanResourceChangeResponse {
    pub planned_state: DynamicValue,
    pub deferred: Option<Deferred>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanResourceChangeResponse {
    pub fn error(diagnostic: Diagnostic) -> Self {
        Self {
            planned_state: DynamicValue::null(),
            deferred: None,
            diagnostics: vec![diagnostic],
        }
    }
}

pub struct ApplyResourceChangeRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

pub struct ApplyResourceChangeResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

impl ApplyResourceChangeResponse {
    pub fn error(diagnostic: Diagnostic) -> Self {
        Self {
            new_state: DynamicValue::null(),
            diagnostics: vec![diagnostic],
        }
    }
}

pub struct ReadResourceRequest {
    pub type_name: String,
    pub current_state: DynamicValue,
    pub client_capabilities: ClientCapabilities,
}

pub struct ReadResourceResponse {
    /// None when the resource no longer exists
    pub new_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReadResourceResponse {
    pub fn error(diagnostic: Diagnostic) -> Self {
        Self {
            new_state: None,
            diagnostics: vec![diagnostic],
        }
    }
}

pub struct ReadDataSourceRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

pub struct ReadDataSourceResponse {
    pub state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ImportResourceStateRequest {
    pub type_name: String,
    pub id: String,
}

pub struct ImportResourceStateResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ImportedResource {
    pub type_name: String,
    pub state: DynamicValue,
}

pub struct MoveResourceStateRequest {
    pub source_type_name: String,
    /// Source state as stored by the previous resource type, JSON-encoded
    pub source_state_json: Vec<u8>,
    pub target_type_name: String,
}

pub struct MoveResourceStateResponse {
    pub target_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MoveResourceStateResponse {
    pub fn error(diagnostic: Diagnostic) -> Self {
        Self {
            target_state: None,
            diagnostics: vec![diagnostic],
        }
    }
}

pub struct CallFunctionRequest {
    pub name: String,
    pub arguments: Vec<DynamicValue>,
}

pub struct CallFunctionResponse {
    pub result: Option<DynamicValue>,
    pub error: Option<FunctionError>,
}

pub struct CloseProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
}
