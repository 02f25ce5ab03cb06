//! Tool definitions and their validated argument records.

use std::sync::Arc;

use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Result, TerragruntMcpError};
use crate::validation::{ArgumentSchema, JsonObject, ValidationError};

// -- Tool argument types --
//
// Fields are private: a record only comes into existence through `ToolDefinition::validate`.

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoArgs {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CategoryArgs {
    #[schemars(description = "Documentation category name, as returned by list-doc-categories")]
    #[schemars(length(min = 1))]
    category: String,
}

impl CategoryArgs {
    pub fn category(&self) -> &str {
        &self.category
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DocumentArgs {
    #[schemars(description = "Documentation category name, as returned by list-doc-categories")]
    #[schemars(length(min = 1))]
    category: String,

    #[schemars(
        description = "Document name within the category, as returned by list-all-docs-by-category (the extension may be omitted)"
    )]
    #[schemars(length(min = 1))]
    document: String,
}

impl DocumentArgs {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn document(&self) -> &str {
        &self.document
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OpenIssuesArgs {
    #[schemars(description = "Fetch every page of open issues instead of only the first page")]
    #[serde(default)]
    all: Option<bool>,
}

impl OpenIssuesArgs {
    pub fn all(&self) -> bool {
        self.all.unwrap_or(false)
    }
}

/// A tool invocation whose arguments passed validation.
#[derive(Debug, Clone)]
pub enum ToolCall {
    ListDocCategories,
    ListAllDocsByCategory(CategoryArgs),
    ReadDocumentFromCategory(DocumentArgs),
    ReadAllDocsFromCategory(CategoryArgs),
    GetAllOpenIssues(OpenIssuesArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ListDocCategories,
    ListAllDocsByCategory,
    ReadDocumentFromCategory,
    ReadAllDocsFromCategory,
    GetAllOpenIssues,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::ListDocCategories,
        ToolKind::ListAllDocsByCategory,
        ToolKind::ReadDocumentFromCategory,
        ToolKind::ReadAllDocsFromCategory,
        ToolKind::GetAllOpenIssues,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::ListDocCategories => "list-doc-categories",
            ToolKind::ListAllDocsByCategory => "list-all-docs-by-category",
            ToolKind::ReadDocumentFromCategory => "read-document-from-category",
            ToolKind::ReadAllDocsFromCategory => "read-all-docs-from-category",
            ToolKind::GetAllOpenIssues => "get-all-open-issues",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::ListDocCategories => {
                "List the Terragrunt documentation categories. Start here, then use \
                 list-all-docs-by-category to see the documents of a category"
            }
            ToolKind::ListAllDocsByCategory => {
                "List every document in a Terragrunt documentation category"
            }
            ToolKind::ReadDocumentFromCategory => {
                "Read the full content of one Terragrunt document from a category"
            }
            ToolKind::ReadAllDocsFromCategory => {
                "Read every document in a Terragrunt documentation category, merged into one text \
                 with a header naming each document"
            }
            ToolKind::GetAllOpenIssues => {
                "List open issues of the Terragrunt GitHub repository. Returns the first page \
                 unless all is true"
            }
        }
    }

    fn input_schema(self) -> JsonObject {
        match self {
            ToolKind::ListDocCategories => schema_for::<NoArgs>(),
            ToolKind::ListAllDocsByCategory | ToolKind::ReadAllDocsFromCategory => {
                schema_for::<CategoryArgs>()
            }
            ToolKind::ReadDocumentFromCategory => schema_for::<DocumentArgs>(),
            ToolKind::GetAllOpenIssues => schema_for::<OpenIssuesArgs>(),
        }
    }
}

fn schema_for<T: JsonSchema>() -> JsonObject {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(mut map)) => {
            map.remove("$schema");
            map
        }
        _ => JsonObject::new(),
    }
}

fn parse<T: DeserializeOwned>(arguments: &JsonObject) -> std::result::Result<T, ValidationError> {
    serde_json::from_value(serde_json::Value::Object(arguments.clone()))
        .map_err(|e| ValidationError::new(vec![e.to_string()]))
}

/// A registered tool: its name, description and argument schema.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    kind: ToolKind,
    input_schema: Arc<JsonObject>,
    rules: ArgumentSchema,
}

impl ToolDefinition {
    fn new(kind: ToolKind) -> Result<Self> {
        let input_schema = kind.input_schema();
        let rules = ArgumentSchema::compile(&input_schema).map_err(|reason| {
            TerragruntMcpError::InvalidToolSchema {
                tool: kind.name(),
                reason,
            }
        })?;
        Ok(Self {
            kind,
            input_schema: Arc::new(input_schema),
            rules,
        })
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn input_schema(&self) -> &JsonObject {
        &self.input_schema
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.rules.required_fields()
    }

    pub fn validate(&self, arguments: &JsonObject) -> std::result::Result<ToolCall, ValidationError> {
        self.rules.validate(arguments)?;
        Ok(match self.kind {
            ToolKind::ListDocCategories => ToolCall::ListDocCategories,
            ToolKind::ListAllDocsByCategory => ToolCall::ListAllDocsByCategory(parse(arguments)?),
            ToolKind::ReadDocumentFromCategory => {
                ToolCall::ReadDocumentFromCategory(parse(arguments)?)
            }
            ToolKind::ReadAllDocsFromCategory => {
                ToolCall::ReadAllDocsFromCategory(parse(arguments)?)
            }
            ToolKind::GetAllOpenIssues => ToolCall::GetAllOpenIssues(parse(arguments)?),
        })
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(
            self.kind.name(),
            self.kind.description(),
            self.input_schema.clone(),
        )
    }
}

/// The fixed set of tools, built once at startup.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Build every tool and compile its input schema.
    pub fn new() -> Result<Self> {
        let definitions = ToolKind::ALL
            .into_iter()
            .map(ToolDefinition::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { definitions })
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Tools in registration order for a `tools/list` response.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.definitions.iter().map(ToolDefinition::to_tool).collect()
    }
}
