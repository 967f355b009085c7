use super::search::SearchInput;
use rmcp::model::{JsonObject, Tool};
use std::sync::{Arc, OnceLock};

/// Name of the only tool this server exposes
pub const SEARCH_TOOL_NAME: &str = "search_radio_stations";

const SEARCH_TOOL_DESCRIPTION: &str =
    "Search the radio directory for live radio stations and podcasts by name, genre or keyword";

/// All tools, built once per process and shared by both transports
pub fn list_tools() -> &'static [Tool] {
    static TOOLS: OnceLock<Vec<Tool>> = OnceLock::new();
    TOOLS.get_or_init(|| {
        vec![Tool::new(
            SEARCH_TOOL_NAME,
            SEARCH_TOOL_DESCRIPTION,
            Arc::new(search_input_schema()),
        )]
    })
}

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<&'static Tool> {
    list_tools().iter().find(|tool| tool.name == name)
}

fn search_input_schema() -> JsonObject {
    let mut schema = match schemars::schema_for!(SearchInput).to_value() {
        serde_json::Value::Object(object) => object,
        _ => JsonObject::new(),
    };
    schema.remove("$schema");
    schema.remove("title");
    schema
}
