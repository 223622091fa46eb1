//! Temporal graph facade: `T_Event`/`T_Fact` nodes and timeline queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::context::AppGraph;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Node, Row};
use crate::models::{TemporalEvent, TemporalFact, Timeframe};

/// Typed wrapper over the `T_Event`/`T_Fact` labels.
#[derive(FromContext, Clone)]
pub struct TemporalFacade {
    graph: AppGraph,
}

impl TemporalFacade {
    pub async fn add_event(
        &self,
        description: &str,
        occurred_at: DateTime<Utc>,
        duration_secs: Option<i64>,
    ) -> Result<TemporalEvent, AppError> {
        if description.trim().is_empty() {
            return Err(AppError::Validation("event description must not be empty".into()));
        }

        let event = TemporalEvent::new(description.to_string(), occurred_at, duration_secs);

        self.graph
            .query(
                "CREATE (e:T_Event {
                    uuid: $uuid,
                    description: $description,
                    occurred_at: $occurred_at,
                    duration_secs: $duration_secs
                })",
            )
            .param("uuid", event.uuid.to_string())
            .param("description", &event.description)
            .param("occurred_at", event.occurred_at.to_rfc3339())
            .param("duration_secs", event.duration_secs)
            .run()
            .await?;

        Ok(event)
    }

    pub async fn add_fact(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        valid_from: DateTime<Utc>,
        valid_to: Option<DateTime<Utc>>,
    ) -> Result<TemporalFact, AppError> {
        if subject.trim().is_empty() || predicate.trim().is_empty() || object.trim().is_empty() {
            return Err(AppError::Validation(
                "subject, predicate, and object must not be empty".into(),
            ));
        }
        if let Some(to) = valid_to {
            if to < valid_from {
                return Err(AppError::Validation(
                    "valid_to must not precede valid_from".into(),
                ));
            }
        }

        let fact = TemporalFact {
            uuid: Uuid::new_v4(),
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
            valid_from,
            valid_to,
        };

        self.graph
            .query(
                "CREATE (f:T_Fact {
                    uuid: $uuid,
                    subject: $subject,
                    predicate: $predicate,
                    object: $object,
                    valid_from: $valid_from,
                    valid_to: $valid_to
                })",
            )
            .param("uuid", fact.uuid.to_string())
            .param("subject", &fact.subject)
            .param("predicate", &fact.predicate)
            .param("object", &fact.object)
            .param("valid_from", fact.valid_from.to_rfc3339())
            .param("valid_to", fact.valid_to.map(|t| t.to_rfc3339()))
            .run()
            .await?;

        Ok(fact)
    }

    /// Events within `[from, to]`, optionally restricted to one linked entity.
    pub async fn query_timeline(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        entity_id: Option<Uuid>,
    ) -> Result<Vec<TemporalEvent>, AppError> {
        let cypher = if entity_id.is_some() {
            "MATCH (e:T_Event)-[:X_INVOLVES]->(:E_Entity {uuid: $entity_id})
             WHERE e.occurred_at >= $from AND e.occurred_at <= $to
             RETURN e"
        } else {
            "MATCH (e:T_Event) WHERE e.occurred_at >= $from AND e.occurred_at <= $to RETURN e"
        };
        let mut q = self
            .graph
            .query(cypher)
            .param("from", from.to_rfc3339())
            .param("to", to.to_rfc3339());
        if let Some(id) = entity_id {
            q = q.param("entity_id", id.to_string());
        }
        let rows = q.fetch_all().await?;
        rows.iter().map(Self::row_to_event).collect()
    }

    pub async fn query_timeline_for_entities(
        &self,
        entity_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TemporalEvent>, AppError> {
        let mut seen = std::collections::HashSet::new();
        let mut events = Vec::new();
        for id in entity_ids {
            for event in self.query_timeline(from, to, Some(*id)).await? {
                if seen.insert(event.uuid) {
                    events.push(event);
                }
            }
        }
        Ok(events)
    }

    pub async fn get_facts_at(&self, instant: DateTime<Utc>) -> Result<Vec<TemporalFact>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (f:T_Fact)
                 WHERE f.valid_from <= $instant AND (f.valid_to IS NULL OR f.valid_to > $instant)
                 RETURN f",
            )
            .param("instant", instant.to_rfc3339())
            .fetch_all()
            .await?;
        rows.iter().map(Self::row_to_fact).collect()
    }

    pub async fn get_facts_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TemporalFact>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (f:T_Fact)
                 WHERE f.valid_from <= $to AND (f.valid_to IS NULL OR f.valid_to >= $from)
                 RETURN f",
            )
            .param("from", from.to_rfc3339())
            .param("to", to.to_rfc3339())
            .fetch_all()
            .await?;
        rows.iter().map(Self::row_to_fact).collect()
    }

    /// Creates the `X_INVOLVES` cross-link from an event to an entity.
    pub async fn link_event_to_entity(&self, event_id: Uuid, entity_id: Uuid) -> Result<(), AppError> {
        self.graph
            .query(
                "MATCH (e:T_Event {uuid: $event_id}), (n:E_Entity {uuid: $entity_id})
                 MERGE (e)-[:X_INVOLVES]->(n)",
            )
            .param("event_id", event_id.to_string())
            .param("entity_id", entity_id.to_string())
            .run()
            .await
            .map_err(|e| AppError::Relationship(format!("link_event_to_entity failed: {}", e)))
    }

    /// Sets `valid_to` on a fact, invalidating it as of `at` (defaults to now).
    pub async fn invalidate_fact(&self, uuid: Uuid, at: Option<DateTime<Utc>>) -> Result<(), AppError> {
        let at = at.unwrap_or_else(Utc::now);
        let row = self
            .graph
            .query(
                "MATCH (f:T_Fact {uuid: $uuid}) SET f.valid_to = $at RETURN f.uuid AS uuid",
            )
            .param("uuid", uuid.to_string())
            .param("at", at.to_rfc3339())
            .fetch_one()
            .await
            .map_err(|e| AppError::Temporal(format!("invalidate_fact failed: {}", e)))?;

        match row {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("fact {} not found", uuid))),
        }
    }

    /// Resolves a `Timeframe` and returns both matching events and facts.
    pub async fn query(
        &self,
        timeframe: &Timeframe,
        now: DateTime<Utc>,
    ) -> Result<(Vec<TemporalEvent>, Vec<TemporalFact>), AppError> {
        let window = timeframe.resolve(now);
        let events = self.query_timeline(window.from, window.to, None).await?;
        let facts = self.get_facts_in_range(window.from, window.to).await?;
        Ok((events, facts))
    }

    fn row_to_event(row: &Row) -> Result<TemporalEvent, AppError> {
        let node: Node = row.get("e")?;
        let uuid_str: String = node.get("uuid")?;
        let uuid = Uuid::parse_str(&uuid_str)
            .map_err(|e| AppError::Parse(format!("invalid event uuid: {}", e)))?;
        let occurred_at: String = node.get("occurred_at")?;
        let occurred_at = DateTime::parse_from_rfc3339(&occurred_at)
            .map_err(|e| AppError::Parse(format!("invalid occurred_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(TemporalEvent {
            uuid,
            description: node.get("description")?,
            occurred_at,
            duration_secs: node.get_opt("duration_secs")?,
        })
    }

    fn row_to_fact(row: &Row) -> Result<TemporalFact, AppError> {
        let node: Node = row.get("f")?;
        let uuid_str: String = node.get("uuid")?;
        let uuid = Uuid::parse_str(&uuid_str)
            .map_err(|e| AppError::Parse(format!("invalid fact uuid: {}", e)))?;
        let valid_from: String = node.get("valid_from")?;
        let valid_from = DateTime::parse_from_rfc3339(&valid_from)
            .map_err(|e| AppError::Parse(format!("invalid valid_from: {}", e)))?
            .with_timezone(&Utc);
        let valid_to: Option<String> = node.get_opt("valid_to")?;
        let valid_to = valid_to
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| AppError::Parse(format!("invalid valid_to: {}", e)))
            })
            .transpose()?;

        Ok(TemporalFact {
            uuid,
            subject: node.get("subject")?,
            predicate: node.get("predicate")?,
            object: node.get("object")?,
            valid_from,
            valid_to,
        })
    }
}
