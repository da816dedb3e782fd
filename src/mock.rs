//! The mock provider
//!
//! Implements every callback of the host provisioning protocol against the
//! in-memory [`ResourceStore`]. One provider instance belongs to one test.
//!
//! A provider must be closed before it is dropped. Dropping an unclosed
//! provider panics with the backtrace captured at construction, so a test
//! that leaks its provider fails and points at the place it was created.

use crate::provider::{
    ApplyResourceChangeRequest, ApplyResourceChangeResponse, CallFunctionRequest,
    CallFunctionResponse, CloseProviderResponse, ConfigureProviderRequest,
    ConfigureProviderResponse, FunctionDecl, FunctionParam, GetProviderSchemaResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource,
    MoveResourceStateRequest, MoveResourceStateResponse, PlanResourceChangeRequest,
    PlanResourceChangeResponse, Provider, ReadDataSourceRequest, ReadDataSourceResponse,
    ReadResourceRequest, ReadResourceResponse,
};
use crate::resources::{
    blocked_resource_schema, data_source_schema, deferred_resource_schema, failed_resource_schema,
    handler_for, testing_resource_schema, BLOCKED_RESOURCE, DATA_SOURCE, DEFERRED_RESOURCE,
    FAILED_RESOURCE, TESTING_RESOURCE,
};
use crate::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use crate::store::ResourceStore;
use crate::types::{
    AttributePath, Diagnostic, Dynamic, DynamicValue, FunctionError, ServerCapabilities,
};
use async_trait::async_trait;
use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// The sole provider function: returns its first argument unchanged.
pub const ECHO_FUNCTION: &str = "echo";

/// MockProvider simulates a provider backend over an in-memory store.
pub struct MockProvider {
    store: ResourceStore,
    closed: AtomicBool,
    created_at: Backtrace,
}

impl MockProvider {
    /// Creates a provider with an empty store.
    pub fn new() -> Self {
        Self::with_store(ResourceStore::new())
    }

    /// Creates a provider over an existing store, letting the test seed
    /// entries before the provider runs and inspect them after.
    pub fn with_store(store: ResourceStore) -> Self {
        Self {
            store,
            closed: AtomicBool::new(false),
            created_at: Backtrace::force_capture(),
        }
    }

    /// A handle to the provider's store.
    pub fn store(&self) -> ResourceStore {
        self.store.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        if self.is_closed() || std::thread::panicking() {
            return;
        }
        tracing::error!(
            created_at = %self.created_at,
            "mock provider dropped without close"
        );
        panic!(
            "MockProvider dropped without close; created at:\n{}",
            self.created_at
        );
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn get_schema(&self) -> GetProviderSchemaResponse {
        let provider = SchemaBuilder::new()
            .attribute(AttributeBuilder::new("configure_error", AttributeType::String).build())
            .attribute(AttributeBuilder::new("ignored", AttributeType::String).build())
            .build();

        let resource_types = HashMap::from([
            (TESTING_RESOURCE.to_string(), testing_resource_schema()),
            (DEFERRED_RESOURCE.to_string(), deferred_resource_schema()),
            (FAILED_RESOURCE.to_string(), failed_resource_schema()),
            (BLOCKED_RESOURCE.to_string(), blocked_resource_schema()),
        ]);

        let data_sources = HashMap::from([(DATA_SOURCE.to_string(), data_source_schema())]);

        let functions = HashMap::from([(
            ECHO_FUNCTION.to_string(),
            FunctionDecl {
                parameters: vec![FunctionParam {
                    name: "value".to_string(),
                    r#type: AttributeType::Dynamic,
                }],
                return_type: AttributeType::Dynamic,
            },
        )]);

        GetProviderSchemaResponse {
            provider,
            resource_types,
            data_sources,
            functions,
            server_capabilities: ServerCapabilities {
                plan_destroy: false,
                move_resource_state: true,
            },
            diagnostics: Vec::new(),
        }
    }

    async fn configure(&self, request: ConfigureProviderRequest) -> ConfigureProviderResponse {
        // Unknown or null configure_error means a clean configure.
        let diagnostics = match request.config.attr("configure_error") {
            Some(Dynamic::String(detail)) => vec![Diagnostic::error(
                "configure_error attribute was set",
                detail.clone(),
            )
            .with_attribute(AttributePath::new("configure_error"))],
            _ => Vec::new(),
        };
        ConfigureProviderResponse { diagnostics }
    }

    async fn plan_resource_change(
        &self,
        request: PlanResourceChangeRequest,
    ) -> PlanResourceChangeResponse {
        tracing::debug!(type_name = %request.type_name, "planning resource change");
        match handler_for(&request.type_name) {
            Some(handler) => handler.plan(&request, &self.store),
            None => PlanResourceChangeResponse::error(unsupported_type(&request.type_name)),
        }
    }

    async fn apply_resource_change(
        &self,
        request: ApplyResourceChangeRequest,
    ) -> ApplyResourceChangeResponse {
        tracing::debug!(type_name = %request.type_name, "applying resource change");
        match handler_for(&request.type_name) {
            Some(handler) => handler.apply(&request, &self.store),
            None => ApplyResourceChangeResponse::error(unsupported_type(&request.type_name)),
        }
    }

    async fn read_resource(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        match handler_for(&request.type_name) {
            Some(handler) => handler.read(&request, &self.store),
            None => ReadResourceResponse::error(unsupported_type(&request.type_name)),
        }
    }

    async fn read_data_source(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let id = match request.config.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error("invalid data source config", e.to_string())
                        .with_attribute(AttributePath::new("id"))],
                }
            }
        };

        match self.store.get(&id) {
            Some(value) => ReadDataSourceResponse {
                state: value,
                diagnostics: Vec::new(),
            },
            None => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error("not found", format!("{:?} not found", id))],
            },
        }
    }

    async fn import_resource_state(
        &self,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let Some(value) = self.store.get(&request.id) else {
            return ImportResourceStateResponse {
                imported_resources: Vec::new(),
                diagnostics: vec![Diagnostic::error(
                    "not found",
                    format!("{:?} not found", request.id),
                )],
            };
        };

        ImportResourceStateResponse {
            imported_resources: vec![ImportedResource {
                type_name: request.type_name,
                state: value,
            }],
            diagnostics: Vec::new(),
        }
    }

    async fn move_resource_state(
        &self,
        request: MoveResourceStateRequest,
    ) -> MoveResourceStateResponse {
        // The only supported migration path.
        if request.source_type_name != TESTING_RESOURCE
            || request.target_type_name != DEFERRED_RESOURCE
        {
            return MoveResourceStateResponse::error(Diagnostic::error(
                "unsupported",
                format!(
                    "unsupported move from {:?} to {:?}",
                    request.source_type_name, request.target_type_name
                ),
            ));
        }

        let source = match DynamicValue::decode_json(&request.source_state_json) {
            Ok(source) => source,
            Err(e) => {
                return MoveResourceStateResponse::error(Diagnostic::error(
                    "invalid source state",
                    e.to_string(),
                ))
            }
        };

        let (Some(id), Some(value)) = (
            source.attr("id").and_then(Dynamic::as_str),
            source.attr("value").and_then(Dynamic::as_str),
        ) else {
            return MoveResourceStateResponse::error(Diagnostic::error(
                "invalid source state",
                "source state must be an object with string id and value attributes",
            ));
        };

        let target = DynamicValue::object([
            ("id", Dynamic::String(id.to_string())),
            ("value", Dynamic::String(value.to_string())),
            ("deferred", Dynamic::Bool(false)),
        ]);
        self.store.set(id, target.clone());

        MoveResourceStateResponse {
            target_state: Some(target),
            diagnostics: Vec::new(),
        }
    }

    async fn call_function(&self, request: CallFunctionRequest) -> CallFunctionResponse {
        if request.name != ECHO_FUNCTION {
            return CallFunctionResponse {
                result: None,
                error: Some(FunctionError {
                    text: format!("unknown function {:?}", request.name),
                    function_argument: None,
                }),
            };
        }

        match request.arguments.into_iter().next() {
            Some(value) => CallFunctionResponse {
                result: Some(value),
                error: None,
            },
            None => CallFunctionResponse {
                result: None,
                error: Some(FunctionError {
                    text: "echo requires one argument".to_string(),
                    function_argument: Some(0),
                }),
            },
        }
    }

    async fn close(&self) -> CloseProviderResponse {
        self.closed.store(true, Ordering::SeqCst);
        CloseProviderResponse {
            diagnostics: Vec::new(),
        }
    }
}

fn unsupported_type(type_name: &str) -> Diagnostic {
    Diagnostic::error(
        "unsupported resource type",
        format!("no handler registered for {:?}", type_name),
    )
}
