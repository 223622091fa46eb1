//! Label index migration - uuid lookup indexes for the four co-resident graphs.
//!
//! AGE creates vertex/edge labels implicitly on first `CREATE`, so this
//! migration's only job is indexing the `uuid` property every facade reads
//! and writes by.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::AppError;
use crate::migrations::{GraphMigration, GraphMigrationContext, Migration};

const VERTEX_LABELS: &[&str] = &["S_Concept", "E_Entity", "T_Event", "T_Fact", "C_Node"];

pub struct M001LabelIndexes {
    graph_name: String,
}

impl M001LabelIndexes {
    pub fn new(graph_name: &str) -> Self {
        Self {
            graph_name: graph_name.to_string(),
        }
    }

    async fn create_uuid_indexes(
        &self,
        ctx: &(dyn GraphMigrationContext + Sync),
    ) -> Result<(), AppError> {
        let graph = &self.graph_name;

        for label in VERTEX_LABELS {
            let sql = format!(
                r#"
                CREATE OR REPLACE FUNCTION create_uuid_index_{graph}_{label}()
                RETURNS void AS $$
                BEGIN
                    IF EXISTS (
                        SELECT 1 FROM information_schema.tables
                        WHERE table_schema = '{graph}' AND table_name = '{label}'
                    ) THEN
                        EXECUTE 'CREATE INDEX IF NOT EXISTS idx_{graph}_{label}_uuid
                            ON {graph}."{label}" ((ag_catalog.agtype_access_operator(properties, ''"uuid"'')::text))';
                    END IF;
                END;
                $$ LANGUAGE plpgsql;
                "#,
                graph = graph,
                label = label
            );
            ctx.execute_sql(&sql).await?;
            ctx.execute_sql(&format!("SELECT create_uuid_index_{}_{}()", graph, label))
                .await?;
        }

        tracing::info!("Created uuid indexes on {:?} for graph '{}'", VERTEX_LABELS, graph);
        Ok(())
    }
}

impl Migration for M001LabelIndexes {
    type Context = dyn GraphMigrationContext + Sync;

    fn id(&self) -> &'static str {
        "graph001_label_indexes"
    }
    fn version(&self) -> u32 {
        1
    }
    fn description(&self) -> &'static str {
        "uuid lookup indexes for S_Concept, E_Entity, T_Event, T_Fact, C_Node"
    }

    fn up<'a>(&'a self, ctx: &'a Self::Context) -> BoxFuture<'a, Result<(), AppError>> {
        async move { self.create_uuid_indexes(ctx).await }.boxed()
    }
}

impl GraphMigration for M001LabelIndexes {
    fn graph_name(&self) -> &str {
        &self.graph_name
    }
}
