//! Domain models for the multi-graph memory store.

mod causal;
mod concept;
mod cross_link;
mod entity;
mod retrieval;
mod temporal;

pub use causal::{CausalDirection, CausalLink, CausalNode};
pub use concept::{Concept, EnrichedSemanticMatch, SemanticMatch};
pub use cross_link::{CrossLink, CrossLinkStatistics, CrossLinkType};
pub use entity::{Entity, EntityRelation, Mention};
pub use retrieval::{
    DepthHints, EntitySeed, ExecutionTiming, GraphSource, GraphView, LinearizedContext,
    MAGMAExecutionResult, MAGMAIntent, MAGMAIntentType, MergedSubgraph, ScoredNode,
    SeedExtractionResult, SeedExtractionStats, ViewNode,
};
pub use temporal::{Timeframe, TemporalEvent, TemporalFact, TimeWindow};
