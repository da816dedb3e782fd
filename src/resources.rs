//! Per-type resource behavior
//!
//! Each resource type the mock provider declares maps to one handler with a
//! plan/apply/read capability set. Dispatch is an exhaustive match on the
//! type name, so adding a type without a handler is caught in one place.
//!
//! The four simulated behaviors:
//! - `testing_resource`: plain success on every operation
//! - `testing_deferred_resource`: defers planning while `deferred` is true
//! - `testing_failed_resource`: fails when `fail_plan` / `fail_apply` is set
//! - `testing_blocked_resource`: requires its `required_resources` ids to
//!   already exist in the store

use crate::provider::{
    ApplyResourceChangeRequest, ApplyResourceChangeResponse, PlanResourceChangeRequest,
    PlanResourceChangeResponse, ReadResourceRequest, ReadResourceResponse,
};
use crate::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use crate::store::ResourceStore;
use crate::types::{Deferred, DeferredReason, Diagnostic, Dynamic, DynamicValue};
use uuid::Uuid;

pub const TESTING_RESOURCE: &str = "testing_resource";
pub const DEFERRED_RESOURCE: &str = "testing_deferred_resource";
pub const FAILED_RESOURCE: &str = "testing_failed_resource";
pub const BLOCKED_RESOURCE: &str = "testing_blocked_resource";
pub const DATA_SOURCE: &str = "testing_data_source";

pub fn testing_resource_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .optional_computed()
                .build(),
        )
        .attribute(AttributeBuilder::new("value", AttributeType::String).build())
        .build()
}

pub fn deferred_resource_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .optional_computed()
                .build(),
        )
        .attribute(AttributeBuilder::new("value", AttributeType::String).build())
        .attribute(
            AttributeBuilder::new("deferred", AttributeType::Bool)
                .required()
                .build(),
        )
        .build()
}

pub fn failed_resource_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .optional_computed()
                .build(),
        )
        .attribute(AttributeBuilder::new("value", AttributeType::String).build())
        .attribute(
            AttributeBuilder::new("fail_plan", AttributeType::Bool)
                .optional_computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("fail_apply", AttributeType::Bool)
                .optional_computed()
                .build(),
        )
        .build()
}

pub fn blocked_resource_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .optional_computed()
                .build(),
        )
        .attribute(AttributeBuilder::new("value", AttributeType::String).build())
        .attribute(
            AttributeBuilder::new(
                "required_resources",
                AttributeType::Set(Box::new(AttributeType::String)),
            )
            .build(),
        )
        .build()
}

pub fn data_source_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .required()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("value", AttributeType::String)
                .computed()
                .build(),
        )
        .build()
}

/// Type-specific plan/apply/read behavior behind the provider callbacks.
/// Handlers are stateless; all persistence goes through the store.
pub(crate) trait ResourceHandler: Send + Sync {
    fn plan(
        &self,
        request: &PlanResourceChangeRequest,
        store: &ResourceStore,
    ) -> PlanResourceChangeResponse;

    fn apply(
        &self,
        request: &ApplyResourceChangeRequest,
        store: &ResourceStore,
    ) -> ApplyResourceChangeResponse;

    fn read(
        &self,
        request: &ReadResourceRequest,
        store: &ResourceStore,
    ) -> ReadResourceResponse;
}

/// Looks up the handler for a declared resource type name.
pub(crate) fn handler_for(type_name: &str) -> Option<&'static dyn ResourceHandler> {
    match type_name {
        TESTING_RESOURCE => Some(&TestingHandler),
        DEFERRED_RESOURCE => Some(&DeferredHandler),
        FAILED_RESOURCE => Some(&FailedHandler),
        BLOCKED_RESOURCE => Some(&BlockedHandler),
        _ => None,
    }
}

/// Plans a change the way every simulated type does: destroy plans pass
/// through as null, and a missing or null computed `id` becomes unknown
/// until apply fills it in.
fn plan_value(proposed: &DynamicValue) -> DynamicValue {
    if proposed.is_null() {
        return DynamicValue::null();
    }
    let mut planned = proposed.clone();
    match planned.attr("id") {
        Some(Dynamic::String(_)) | Some(Dynamic::Unknown) => {}
        _ => planned.set_attr("id", Dynamic::Unknown),
    }
    planned
}

/// Applies a planned change against the store. A null planned state is a
/// destroy: the prior id is removed. Otherwise an unknown id is resolved to
/// a fresh UUID and the final value persisted under it.
fn apply_value(
    request: &ApplyResourceChangeRequest,
    store: &ResourceStore,
) -> ApplyResourceChangeResponse {
    if request.planned_state.is_null() {
        if let Some(id) = request.prior_state.attr("id").and_then(Dynamic::as_str) {
            store.delete(id);
        }
        return ApplyResourceChangeResponse {
            new_state: DynamicValue::null(),
            diagnostics: Vec::new(),
        };
    }

    let mut state = request.planned_state.clone();
    let id = match state.attr("id").and_then(Dynamic::as_str) {
        Some(id) => id.to_string(),
        None => {
            let id = Uuid::new_v4().to_string();
            state.set_attr("id", Dynamic::String(id.clone()));
            id
        }
    };

    store.set(&id, state.clone());
    ApplyResourceChangeResponse {
        new_state: state,
        diagnostics: Vec::new(),
    }
}

/// Reads current state back out of the store by the state's id.
fn read_value(request: &ReadResourceRequest, store: &ResourceStore) -> ReadResourceResponse {
    let Some(id) = request.current_state.attr("id").and_then(Dynamic::as_str) else {
        return ReadResourceResponse::error(Diagnostic::error(
            "invalid resource state",
            "resource state has no string id attribute",
        ));
    };
    ReadResourceResponse {
        new_state: store.get(id),
        diagnostics: Vec::new(),
    }
}

/// Plain resource: every operation succeeds.
struct TestingHandler;

impl ResourceHandler for TestingHandler {
    fn plan(
        &self,
        request: &PlanResourceChangeRequest,
        _store: &ResourceStore,
    ) -> PlanResourceChangeResponse {
        PlanResourceChangeResponse {
            planned_state: plan_value(&request.proposed_new_state),
            deferred: None,
            diagnostics: Vec::new(),
        }
    }

    fn apply(
        &self,
        request: &ApplyResourceChangeRequest,
        store: &ResourceStore,
    ) -> ApplyResourceChangeResponse {
        apply_value(request, store)
    }

    fn read(&self, request: &ReadResourceRequest, store: &ResourceStore) -> ReadResourceResponse {
        read_value(request, store)
    }
}

/// Deferred resource: while `deferred` is true and the client permits
/// deferral, plans come back marked deferred. Everything else is plain.
struct DeferredHandler;

impl ResourceHandler for DeferredHandler {
    fn plan(
        &self,
        request: &PlanResourceChangeRequest,
        _store: &ResourceStore,
    ) -> PlanResourceChangeResponse {
        let wants_deferral = request
            .proposed_new_state
            .attr("deferred")
            .and_then(Dynamic::as_bool)
            .unwrap_or(false);

        let deferred = if wants_deferral && request.client_capabilities.deferral_allowed {
            Some(Deferred {
                reason: DeferredReason::ResourceConfigUnknown,
            })
        } else {
            None
        };

        PlanResourceChangeResponse {
            planned_state: plan_value(&request.proposed_new_state),
            deferred,
            diagnostics: Vec::new(),
        }
    }

    fn apply(
        &self,
        request: &ApplyResourceChangeRequest,
        store: &ResourceStore,
    ) -> ApplyResourceChangeResponse {
        apply_value(request, store)
    }

    fn read(&self, request: &ReadResourceRequest, store: &ResourceStore) -> ReadResourceResponse {
        read_value(request, store)
    }
}

/// Failed resource: `fail_plan` and `fail_apply` trigger simulated failures
/// in the corresponding operation. Null flags plan to false since they are
/// computed.
struct FailedHandler;

impl ResourceHandler for FailedHandler {
    fn plan(
        &self,
        request: &PlanResourceChangeRequest,
        _store: &ResourceStore,
    ) -> PlanResourceChangeResponse {
        if flag_set(&request.proposed_new_state, "fail_plan") {
            return PlanResourceChangeResponse::error(Diagnostic::error(
                "planned failure",
                "the fail_plan attribute was set",
            ));
        }

        let mut planned = plan_value(&request.proposed_new_state);
        if !planned.is_null() {
            for flag in ["fail_plan", "fail_apply"] {
                if planned.attr(flag).map(Dynamic::is_null).unwrap_or(true) {
                    planned.set_attr(flag, Dynamic::Bool(false));
                }
            }
        }

        PlanResourceChangeResponse {
            planned_state: planned,
            deferred: None,
            diagnostics: Vec::new(),
        }
    }

    fn apply(
        &self,
        request: &ApplyResourceChangeRequest,
        store: &ResourceStore,
    ) -> ApplyResourceChangeResponse {
        if flag_set(&request.planned_state, "fail_apply") {
            return ApplyResourceChangeResponse::error(Diagnostic::error(
                "apply failure",
                "the fail_apply attribute was set",
            ));
        }
        apply_value(request, store)
    }

    fn read(&self, request: &ReadResourceRequest, store: &ResourceStore) -> ReadResourceResponse {
        read_value(request, store)
    }
}

fn flag_set(state: &DynamicValue, flag: &str) -> bool {
    state.attr(flag).and_then(Dynamic::as_bool).unwrap_or(false)
}

/// Blocked resource: planning requires every id listed in
/// `required_resources` to already exist in the store. A missing
/// prerequisite defers when the client allows it and fails otherwise.
struct BlockedHandler;

impl ResourceHandler for BlockedHandler {
    fn plan(
        &self,
        request: &PlanResourceChangeRequest,
        store: &ResourceStore,
    ) -> PlanResourceChangeResponse {
        let required = request
            .proposed_new_state
            .attr("required_resources")
            .and_then(Dynamic::as_list)
            .unwrap_or(&[]);

        for entry in required {
            let Some(id) = entry.as_str() else { continue };
            if store.contains(id) {
                continue;
            }
            if request.client_capabilities.deferral_allowed {
                return PlanResourceChangeResponse {
                    planned_state: plan_value(&request.proposed_new_state),
                    deferred: Some(Deferred {
                        reason: DeferredReason::AbsentPrereq,
                    }),
                    diagnostics: Vec::new(),
                };
            }
            return PlanResourceChangeResponse::error(Diagnostic::error(
                "required resource not found",
                format!("required resource {:?} does not exist", id),
            ));
        }

        PlanResourceChangeResponse {
            planned_state: plan_value(&request.proposed_new_state),
            deferred: None,
            diagnostics: Vec::new(),
        }
    }

    fn apply(
        &self,
        request: &ApplyResourceChangeRequest,
        store: &ResourceStore,
    ) -> ApplyResourceChangeResponse {
        apply_value(request, store)
    }

    fn read(&self, request: &ReadResourceRequest, store: &ResourceStore) -> ReadResourceResponse {
        read_value(request, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientCapabilities;

    fn plan_request(type_name: &str, proposed: DynamicValue) -> PlanResourceChangeRequest {
        PlanResourceChangeRequest {
            type_name: type_name.to_string(),
            prior_state: DynamicValue::null(),
            proposed_new_state: proposed.clone(),
            config: proposed,
            client_capabilities: ClientCapabilities::default(),
        }
    }

    #[test]
    fn every_declared_type_has_a_handler() {
        for name in [
            TESTING_RESOURCE,
            DEFERRED_RESOURCE,
            FAILED_RESOURCE,
            BLOCKED_RESOURCE,
        ] {
            assert!(handler_for(name).is_some(), "no handler for {name}");
        }
        assert!(handler_for("testing_unknown_resource").is_none());
    }

    #[test]
    fn plan_marks_missing_id_unknown() {
        let proposed = DynamicValue::object([("value", Dynamic::String("hello".into()))]);
        let response = TestingHandler.plan(
            &plan_request(TESTING_RESOURCE, proposed),
            &ResourceStore::new(),
        );

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.planned_state.attr("id"), Some(&Dynamic::Unknown));
    }

    #[test]
    fn plan_keeps_configured_id() {
        let proposed = DynamicValue::object([("id", Dynamic::String("fixed".into()))]);
        let response = TestingHandler.plan(
            &plan_request(TESTING_RESOURCE, proposed),
            &ResourceStore::new(),
        );

        assert_eq!(
            response.planned_state.attr("id").and_then(Dynamic::as_str),
            Some("fixed")
        );
    }

    #[test]
    fn apply_generates_id_and_persists() {
        let store = ResourceStore::new();
        let planned = DynamicValue::object([
            ("id", Dynamic::Unknown),
            ("value", Dynamic::String("hello".into())),
        ]);
        let response = TestingHandler.apply(
            &ApplyResourceChangeRequest {
                type_name: TESTING_RESOURCE.to_string(),
                prior_state: DynamicValue::null(),
                planned_state: planned.clone(),
                config: planned,
            },
            &store,
        );

        assert!(response.diagnostics.is_empty());
        let id = response
            .new_state
            .attr("id")
            .and_then(Dynamic::as_str)
            .expect("apply must resolve the id")
            .to_string();
        assert_eq!(store.get(&id), Some(response.new_state));
    }

    #[test]
    fn apply_of_null_plan_destroys() {
        let store = ResourceStore::new();
        let prior = DynamicValue::object([("id", Dynamic::String("doomed".into()))]);
        store.set("doomed", prior.clone());

        let response = TestingHandler.apply(
            &ApplyResourceChangeRequest {
                type_name: TESTING_RESOURCE.to_string(),
                prior_state: prior,
                planned_state: DynamicValue::null(),
                config: DynamicValue::null(),
            },
            &store,
        );

        assert!(response.new_state.is_null());
        assert!(!store.contains("doomed"));
    }

    #[test]
    fn read_returns_none_for_missing_resource() {
        let response = TestingHandler.read(
            &ReadResourceRequest {
                type_name: TESTING_RESOURCE.to_string(),
                current_state: DynamicValue::object([("id", Dynamic::String("gone".into()))]),
                client_capabilities: ClientCapabilities::default(),
            },
            &ResourceStore::new(),
        );

        assert!(response.new_state.is_none());
        assert!(response.diagnostics.is_empty());
    }

    #[test]
    fn deferred_plan_requires_client_capability() {
        let proposed = DynamicValue::object([("deferred", Dynamic::Bool(true))]);
        let store = ResourceStore::new();

        let response = DeferredHandler.plan(&plan_request(DEFERRED_RESOURCE, proposed.clone()), &store);
        assert!(response.deferred.is_none(), "deferral not allowed by client");

        let mut request = plan_request(DEFERRED_RESOURCE, proposed);
        request.client_capabilities.deferral_allowed = true;
        let response = DeferredHandler.plan(&request, &store);
        assert_eq!(
            response.deferred,
            Some(Deferred {
                reason: DeferredReason::ResourceConfigUnknown
            })
        );
    }

    #[test]
    fn fail_plan_flag_fails_planning() {
        let proposed = DynamicValue::object([("fail_plan", Dynamic::Bool(true))]);
        let response = FailedHandler.plan(
            &plan_request(FAILED_RESOURCE, proposed),
            &ResourceStore::new(),
        );

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "planned failure");
    }

    #[test]
    fn failed_plan_fills_computed_flags() {
        let proposed = DynamicValue::object([("value", Dynamic::String("v".into()))]);
        let response = FailedHandler.plan(
            &plan_request(FAILED_RESOURCE, proposed),
            &ResourceStore::new(),
        );

        assert_eq!(
            response.planned_state.attr("fail_plan"),
            Some(&Dynamic::Bool(false))
        );
        assert_eq!(
            response.planned_state.attr("fail_apply"),
            Some(&Dynamic::Bool(false))
        );
    }

    #[test]
    fn fail_apply_flag_fails_apply_without_storing() {
        let store = ResourceStore::new();
        let planned = DynamicValue::object([
            ("id", Dynamic::String("x".into())),
            ("fail_apply", Dynamic::Bool(true)),
        ]);
        let response = FailedHandler.apply(
            &ApplyResourceChangeRequest {
                type_name: FAILED_RESOURCE.to_string(),
                prior_state: DynamicValue::null(),
                planned_state: planned.clone(),
                config: planned,
            },
            &store,
        );

        assert_eq!(response.diagnostics[0].summary, "apply failure");
        assert!(store.is_empty());
    }

    #[test]
    fn blocked_plan_defers_on_missing_prerequisite() {
        let proposed = DynamicValue::object([(
            "required_resources",
            Dynamic::List(vec![Dynamic::String("missing".into())]),
        )]);
        let mut request = plan_request(BLOCKED_RESOURCE, proposed);
        request.client_capabilities.deferral_allowed = true;

        let response = BlockedHandler.plan(&request, &ResourceStore::new());
        assert_eq!(
            response.deferred,
            Some(Deferred {
                reason: DeferredReason::AbsentPrereq
            })
        );
    }

    #[test]
    fn blocked_plan_fails_when_deferral_disallowed() {
        let proposed = DynamicValue::object([(
            "required_resources",
            Dynamic::List(vec![Dynamic::String("missing".into())]),
        )]);
        let response = BlockedHandler.plan(
            &plan_request(BLOCKED_RESOURCE, proposed),
            &ResourceStore::new(),
        );

        assert_eq!(response.diagnostics[0].summary, "required resource not found");
    }

    #[test]
    fn blocked_plan_succeeds_when_prerequisites_exist() {
        let store = ResourceStore::new();
        store.set("dep", DynamicValue::null());

        let proposed = DynamicValue::object([(
            "required_resources",
            Dynamic::List(vec![Dynamic::String("dep".into())]),
        )]);
        let response = BlockedHandler.plan(&plan_request(BLOCKED_RESOURCE, proposed), &store);

        assert!(response.deferred.is_none());
        assert!(response.diagnostics.is_empty());
    }

    #[test]
    fn schemas_declare_expected_attributes() {
        assert!(testing_resource_schema()
            .attribute("id")
            .is_some_and(|a| a.mode.is_computed()));
        assert!(deferred_resource_schema()
            .attribute("deferred")
            .is_some_and(|a| a.mode.is_required()));
        assert!(failed_resource_schema().attribute("fail_apply").is_some());
        assert!(blocked_resource_schema()
            .attribute("required_resources")
            .is_some());
        assert!(data_source_schema()
            .attribute("value")
            .is_some_and(|a| a.mode.is_computed()));
    }
}
