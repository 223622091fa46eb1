//! Write primitives: the only way new nodes enter the four graphs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::AppError;
use crate::facades::{CausalFacade, EntityFacade, SemanticFacade, TemporalFacade};
use crate::mcp::protocol::Response;
use crate::mcp::server::McpServer;
use crate::mcp::validation::{schema_error, FieldError};
use crate::models::{Concept, EntityRelation, TemporalEvent, TemporalFact};

// ============================================================================
// Parameter types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RememberParams {
    pub content: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddEntityParams {
    pub name: String,
    pub entity_type: String,
    #[serde(default)]
    pub properties: Option<HashMap<String, JsonValue>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LinkEntitiesParams {
    pub source: String,
    pub target: String,
    pub relationship: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddEventParams {
    pub description: String,
    pub occurred_at: String,
    #[serde(default)]
    pub duration_secs: Option<i64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddFactParams {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub valid_from: String,
    #[serde(default)]
    pub valid_to: Option<String>,
    #[serde(default)]
    pub subject_entity: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddCausalLinkParams {
    pub cause: String,
    pub effect: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddConceptParams {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LinkEntitiesResult {
    pub source: Uuid,
    pub target: Uuid,
    pub relationship: String,
}

impl From<EntityRelation> for LinkEntitiesResult {
    fn from(r: EntityRelation) -> Self {
        Self {
            source: r.source_id,
            target: r.target_id,
            relationship: r.relationship_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddFactResult {
    #[serde(flatten)]
    pub fact: TemporalFact,
    /// Whether `subject_entity` resolved to a known entity. No cross-link
    /// is created: the fixed cross-link vocabulary has no type whose
    /// source is a `T_Fact`, so this is a resolution check only.
    pub subject_entity_linked: bool,
}

#[derive(Debug, Serialize)]
pub struct AddCausalLinkResult {
    pub cause_id: Uuid,
    pub effect_id: Uuid,
    pub confidence: f64,
    /// Entities from `entities` that could not be resolved and were skipped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_entities: Vec<String>,
    /// Events from `events` that could not be resolved and were skipped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_events: Vec<String>,
}

// ============================================================================
// Tool router
// ============================================================================

#[tool_router(router = write_tools, vis = "pub(crate)")]
impl McpServer {
    /// Stores a free-form piece of content as a concept, optionally
    /// annotated with surrounding context.
    #[tool(description = "Store free-form content as a semantic concept, generating its embedding.")]
    pub async fn remember(
        &self,
        Parameters(params): Parameters<RememberParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.content.trim().is_empty() {
            return Ok(schema_error(vec![FieldError::new(
                "content",
                "must not be empty",
            )]));
        }

        let semantic = self.resolve::<SemanticFacade>();
        let concept = semantic
            .add_concept(&params.content, params.context.as_deref())
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response(concept, None).into()
    }

    /// Creates a new entity.
    #[tool(description = "Create a new entity with a name, type tag, and optional properties.")]
    pub async fn add_entity(
        &self,
        Parameters(params): Parameters<AddEntityParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.name.trim().is_empty() {
            return Ok(schema_error(vec![FieldError::new("name", "must not be empty")]));
        }
        if params.entity_type.trim().is_empty() {
            return Ok(schema_error(vec![FieldError::new(
                "entity_type",
                "must not be empty",
            )]));
        }

        let entity = self
            .resolve::<EntityFacade>()
            .add_entity(&params.name, &params.entity_type, params.properties.unwrap_or_default())
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response(entity, None).into()
    }

    /// Creates a directed relationship between two existing entities,
    /// identified by name or uuid.
    #[tool(
        description = "Link two existing entities by name or uuid with a named relationship type."
    )]
    pub async fn link_entities(
        &self,
        Parameters(params): Parameters<LinkEntitiesParams>,
    ) -> Result<CallToolResult, McpError> {
        let entity_facade = self.resolve::<EntityFacade>();

        let source = resolve_entity_id(&entity_facade, &params.source, "source").await?;
        let source = match source {
            Ok(id) => id,
            Err(result) => return Ok(result),
        };
        let target = resolve_entity_id(&entity_facade, &params.target, "target").await?;
        let target = match target {
            Ok(id) => id,
            Err(result) => return Ok(result),
        };

        let relation = entity_facade
            .link_entities(source, target, &params.relationship)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response(LinkEntitiesResult::from(relation), None).into()
    }

    /// Records a point-in-time event.
    #[tool(description = "Record a timestamped event with a description and an ISO-8601 instant.")]
    pub async fn add_event(
        &self,
        Parameters(params): Parameters<AddEventParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.description.trim().is_empty() {
            return Ok(schema_error(vec![FieldError::new(
                "description",
                "must not be empty",
            )]));
        }
        let occurred_at = match parse_instant(&params.occurred_at, "occurred_at") {
            Ok(dt) => dt,
            Err(result) => return Ok(result),
        };

        let event: TemporalEvent = self
            .resolve::<TemporalFacade>()
            .add_event(&params.description, occurred_at, params.duration_secs)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response(event, None).into()
    }

    /// Records a time-bounded fact, optionally checked against a subject
    /// entity when it can be resolved. If it cannot, the fact is still
    /// created and the response reports the check as skipped. No cross-link
    /// is created: the fixed cross-link vocabulary has no `T_Fact`-sourced
    /// type to use.
    #[tool(
        description = "Record a subject-predicate-object fact valid over a time window, optionally linked to a subject entity."
    )]
    pub async fn add_fact(
        &self,
        Parameters(params): Parameters<AddFactParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut errors = Vec::new();
        if params.subject.trim().is_empty() {
            errors.push(FieldError::new("subject", "must not be empty"));
        }
        if params.predicate.trim().is_empty() {
            errors.push(FieldError::new("predicate", "must not be empty"));
        }
        if params.object.trim().is_empty() {
            errors.push(FieldError::new("object", "must not be empty"));
        }
        if !errors.is_empty() {
            return Ok(schema_error(errors));
        }

        let valid_from = match parse_instant(&params.valid_from, "valid_from") {
            Ok(dt) => dt,
            Err(result) => return Ok(result),
        };
        let valid_to = match &params.valid_to {
            Some(raw) => match parse_instant(raw, "valid_to") {
                Ok(dt) => Some(dt),
                Err(result) => return Ok(result),
            },
            None => None,
        };
        if let Some(valid_to) = valid_to {
            if valid_to < valid_from {
                return Ok(schema_error(vec![FieldError::new(
                    "valid_to",
                    "must not be before valid_from",
                )]));
            }
        }

        let temporal = self.resolve::<TemporalFacade>();
        let fact = temporal
            .add_fact(&params.subject, &params.predicate, &params.object, valid_from, valid_to)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        // No cross-link is created here: the fixed cross-link vocabulary
        // (X_REPRESENTS, X_INVOLVES, X_REFERS_TO, X_AFFECTS) has no type
        // whose source is a T_Fact, so resolving `subject_entity` is only
        // a validation check reported back to the caller.
        let mut subject_entity_linked = false;
        if let Some(subject_entity) = &params.subject_entity {
            let entity_facade = self.resolve::<EntityFacade>();
            if let Ok(Some(_entity)) = entity_facade.get_entity(subject_entity).await {
                subject_entity_linked = true;
            }
        }

        Response(
            AddFactResult {
                fact,
                subject_entity_linked,
            },
            None,
        )
        .into()
    }

    /// Creates (or reuses, by description) a cause and an effect node and
    /// links them, optionally cross-linking both nodes to the given
    /// entities and events. Unresolvable ones are silently skipped and
    /// reported back.
    #[tool(
        description = "Create a causal link between a cause and an effect description, optionally cross-linked to entities and events."
    )]
    pub async fn add_causal_link(
        &self,
        Parameters(params): Parameters<AddCausalLinkParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut errors = Vec::new();
        if params.cause.trim().is_empty() {
            errors.push(FieldError::new("cause", "must not be empty"));
        }
        if params.effect.trim().is_empty() {
            errors.push(FieldError::new("effect", "must not be empty"));
        }
        if let Some(confidence) = params.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                errors.push(FieldError::new("confidence", "must be in [0, 1]"));
            }
        }
        if !errors.is_empty() {
            return Ok(schema_error(errors));
        }

        let causal = self.resolve::<CausalFacade>();
        let link = causal
            .add_link(
                &params.cause,
                &params.effect,
                params.confidence.unwrap_or(1.0),
                params.evidence.as_deref(),
            )
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        let entity_facade = self.resolve::<EntityFacade>();
        let mut skipped_entities = Vec::new();
        for name_or_uuid in &params.entities {
            match entity_facade.get_entity(name_or_uuid).await {
                Ok(Some(entity)) => {
                    let _ = causal.link_to_entity(link.cause_id, entity.uuid).await;
                    let _ = causal.link_to_entity(link.effect_id, entity.uuid).await;
                }
                _ => skipped_entities.push(name_or_uuid.clone()),
            }
        }

        let mut skipped_events = Vec::new();
        for raw in &params.events {
            match Uuid::parse_str(raw) {
                Ok(event_id) => {
                    let _ = causal.link_to_event(link.cause_id, event_id).await;
                    let _ = causal.link_to_event(link.effect_id, event_id).await;
                }
                Err(_) => skipped_events.push(raw.clone()),
            }
        }

        Response(
            AddCausalLinkResult {
                cause_id: link.cause_id,
                effect_id: link.effect_id,
                confidence: link.confidence,
                skipped_entities,
                skipped_events,
            },
            None,
        )
        .into()
    }

    /// Creates a semantic concept directly (without the `remember`
    /// convenience wrapping of free-form content).
    #[tool(description = "Create a semantic concept with a name and optional description.")]
    pub async fn add_concept(
        &self,
        Parameters(params): Parameters<AddConceptParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.name.trim().is_empty() {
            return Ok(schema_error(vec![FieldError::new("name", "must not be empty")]));
        }

        let concept: Concept = self
            .resolve::<SemanticFacade>()
            .add_concept(&params.name, params.description.as_deref())
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response(concept, None).into()
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn resolve_entity_id(
    facade: &EntityFacade,
    name_or_uuid: &str,
    field: &'static str,
) -> Result<Result<Uuid, CallToolResult>, McpError> {
    match facade
        .get_entity(name_or_uuid)
        .await
        .map_err(|e: AppError| McpError::from(e))?
    {
        Some(entity) => Ok(Ok(entity.uuid)),
        None => Ok(Err(schema_error(vec![FieldError::new(
            field,
            format!("entity '{}' not found", name_or_uuid),
        )]))),
    }
}

fn parse_instant(raw: &str, field: &'static str) -> Result<DateTime<Utc>, CallToolResult> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            schema_error(vec![FieldError::new(
                field,
                "must be an RFC 3339 timestamp",
            )])
        })
}
