use super::format::ResultFormatter;
use crate::client::RadioSearch;
use crate::{Error, Result};
use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Input parameters for the radio search tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchInput {
    /// Search text - station name, podcast title, genre or keyword
    pub query: String,
}

/// Radio search tool: validates the query, queries the directory once and
/// formats the groups it returns
#[derive(Clone)]
pub struct SearchTool {
    backend: Arc<dyn RadioSearch>,
    formatter: ResultFormatter,
}

impl std::fmt::Debug for SearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchTool")
            .field("backend", &"RadioSearch")
            .field("formatter", &self.formatter)
            .finish()
    }
}

impl SearchTool {
    pub fn new(backend: Arc<dyn RadioSearch>, formatter: ResultFormatter) -> Self {
        info!("Initializing radio search tool");
        Self { backend, formatter }
    }

    /// Parse raw `tools/call` arguments into a validated input
    pub fn parse_arguments(arguments: Option<&Map<String, Value>>) -> Result<SearchInput> {
        let query = arguments
            .and_then(|args| args.get("query"))
            .ok_or_else(Error::missing_query)?;

        let Value::String(query) = query else {
            return Err(Error::InvalidArgument {
                field: "query".to_string(),
                reason: "query must be a string".to_string(),
            });
        };

        if query.trim().is_empty() {
            return Err(Error::missing_query());
        }

        Ok(SearchInput {
            query: query.clone(),
        })
    }

    /// Execute a search
    #[instrument(skip(self), fields(query = %input.query))]
    pub async fn search(&self, input: SearchInput) -> Result<CallToolResult> {
        info!("Executing radio search: query='{}'", input.query);

        let response = self.backend.search(&input.query).await?;
        let groups = response.into_groups();
        debug!("Formatting {} result groups", groups.len());

        let text = self.formatter.format(&input.query, &groups);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}
