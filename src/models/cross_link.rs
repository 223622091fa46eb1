//! Cross-graph links: typed edges bridging two of the four co-resident graphs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed vocabulary of cross-link types. Semantics are "lookup
/// relationship", never ownership of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossLinkType {
    /// Concept -> Entity: the concept names the entity.
    XRepresents,
    /// TemporalEvent -> Entity.
    XInvolves,
    /// CausalNode -> TemporalEvent.
    XRefersTo,
    /// CausalNode -> Entity.
    XAffects,
}

impl CrossLinkType {
    pub fn as_wire(&self) -> &'static str {
        match self {
            CrossLinkType::XRepresents => "X_REPRESENTS",
            CrossLinkType::XInvolves => "X_INVOLVES",
            CrossLinkType::XRefersTo => "X_REFERS_TO",
            CrossLinkType::XAffects => "X_AFFECTS",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "X_REPRESENTS" => Some(CrossLinkType::XRepresents),
            "X_INVOLVES" => Some(CrossLinkType::XInvolves),
            "X_REFERS_TO" => Some(CrossLinkType::XRefersTo),
            "X_AFFECTS" => Some(CrossLinkType::XAffects),
            _ => None,
        }
    }
}

/// A typed edge bridging two graphs. Self-links (`source_id == target_id`)
/// are prohibited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossLink {
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub link_type: CrossLinkType,
    pub created_at: DateTime<Utc>,
}

impl CrossLink {
    pub fn new(source_id: Uuid, target_id: Uuid, link_type: CrossLinkType) -> Self {
        Self {
            source_id,
            target_id,
            link_type,
            created_at: Utc::now(),
        }
    }
}

/// Aggregate counts returned by `getStatistics` on the cross-linker.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrossLinkStatistics {
    pub total: usize,
    pub by_type: std::collections::HashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip_covers_every_variant() {
        for variant in [
            CrossLinkType::XRepresents,
            CrossLinkType::XInvolves,
            CrossLinkType::XRefersTo,
            CrossLinkType::XAffects,
        ] {
            assert_eq!(CrossLinkType::from_wire(variant.as_wire()), Some(variant));
        }
    }

    #[test]
    fn from_wire_rejects_unknown_string() {
        assert_eq!(CrossLinkType::from_wire("X_BOGUS"), None);
    }
}
