pub mod format;
pub mod registry;
pub mod search;

pub use format::ResultFormatter;
pub use registry::{find_tool, list_tools, SEARCH_TOOL_NAME};
pub use search::{SearchInput, SearchTool};
