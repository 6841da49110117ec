/// Placeholder replaced with the software name in document prompts.
pub const NAME_PLACEHOLDER: &str = "[doc_name]";
/// Placeholder replaced with the reference example in every template prompt.
pub const EXAMPLE_PLACEHOLDER: &str = "{{example}}";

/// A code-generation job for the local model.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeTask {
    Struct {
        name: String,
        description: String,
        fields: Vec<String>,
    },
    Handler {
        name: String,
        method: String,
        path: String,
        description: String,
    },
    Service {
        name: String,
        description: String,
        methods: Vec<String>,
    },
    Repository {
        name: String,
        description: String,
        database: String,
    },
    Middleware {
        name: String,
        description: String,
    },
    Test {
        function: String,
        description: String,
    },
}

impl CodeTask {
    /// Tests are generated a little more conservatively than everything else.
    pub fn temperature(&self) -> f32 {
        match self {
            CodeTask::Test { .. } => 0.1,
            _ => 0.2,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CodeTask::Struct { .. } => "struct",
            CodeTask::Handler { .. } => "handler",
            CodeTask::Service { .. } => "service",
            CodeTask::Repository { .. } => "repository",
            CodeTask::Middleware { .. } => "middleware",
            CodeTask::Test { .. } => "test",
        }
    }

    fn describe(&self, language: &str) -> String {
        match self {
            CodeTask::Struct {
                name,
                description,
                fields,
            } => format!(
                "Create a {language} data type named {name}. Purpose: {description}. \
                 Fields: {}. Add serialization attributes and validation where the language supports them.",
                join_or(fields, "basic fields")
            ),
            CodeTask::Handler {
                name,
                method,
                path,
                description,
            } => format!(
                "Create a {language} HTTP handler function {name} that serves {method} {path}. \
                 Purpose: {description}. Use the standard library or the most common web framework."
            ),
            CodeTask::Service {
                name,
                description,
                methods,
            } => format!(
                "Create a {language} service-layer interface and implementation {name}. \
                 Purpose: {description}. Methods: {}. Include error handling and logging.",
                join_or(methods, "basic CRUD methods")
            ),
            CodeTask::Repository {
                name,
                description,
                database,
            } => format!(
                "Create a {language} data-access layer {name} backed by {database}. \
                 Purpose: {description}. Include the basic CRUD operations."
            ),
            CodeTask::Middleware { name, description } => format!(
                "Create a {language} HTTP middleware {name}. Purpose: {description}."
            ),
            CodeTask::Test {
                function,
                description,
            } => format!(
                "Write complete unit tests in {language} for the function {function}. \
                 Purpose: {description}. Cover normal and edge cases."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeRequest {
    pub task: CodeTask,
    pub language: String,
}

impl CodeRequest {
    pub fn new(task: CodeTask, language: impl Into<String>) -> Self {
        Self {
            task,
            language: language.into(),
        }
    }
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

pub struct PromptBuilder;

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_manual_prompt(&self, template: &str, example: &str, software_name: &str) -> String {
        template
            .replace(NAME_PLACEHOLDER, software_name)
            .replace(EXAMPLE_PLACEHOLDER, example)
    }

    pub fn build_code_prompt(&self, template: &str, example: &str) -> String {
        template.replace(EXAMPLE_PLACEHOLDER, example)
    }

    /// Wraps a code task in instructions that ask for a single fenced block.
    pub fn build_codegen_prompt(&self, request: &CodeRequest) -> String {
        let language = &request.language;
        format!(
            r#"Write {language} code for the following requirement:
{}

Return only runnable code, with no explanation outside the code. The code should:
1. Include the necessary comments
2. Follow {language} best practices and conventions
3. Handle error cases
4. Include a short usage example

Code:
```{language}"#,
            request.task.describe(language)
        )
    }
}
