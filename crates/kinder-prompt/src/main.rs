//! Compose an assistant system prompt from a JSON context and print it.
//!
//! # Examples
//!
//! ```sh
//! # Think-optimized prompt from a request context
//! kprompt --mode think --context ctx.json
//!
//! # Full agent prompt with organization status and tool tree
//! kprompt --mode agent --context ctx.json \
//!   --org-status org.md --tool-tree tree.md --pages pages.txt
//!
//! # Fit the prompt into 4000 characters and report stats on stderr
//! kprompt --context ctx.json --compress aggressive --max-length 4000 --stats
//!
//! # Inspect the template catalogue or the context schema
//! kprompt --list-templates
//! kprompt --print-schema
//! ```

use clap::Parser;
use kinder_prompt::compress::CompressionLevel;
use kinder_prompt::config::PromptConfig;
use kinder_prompt::json_schema_for;
use kinder_prompt::prompt::{ModeInputs, PromptComposer, PromptContext, PromptMode};
use kinder_prompt::template::TemplateRegistry;
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Compose an assistant system prompt from a JSON context and print it.
///
/// Logging goes to stderr and is controlled by RUST_LOG (default: warn).
#[derive(Parser)]
#[command(name = "kprompt")]
struct Cli {
    // ── Inputs ─────────────────────────────────────────────────
    /// JSON file with the request context (camelCase fields)
    #[arg(long)]
    context: Option<PathBuf>,

    /// Prompt mode: agent, think (alias: system) or direct
    #[arg(long, default_value = "agent")]
    mode: PromptMode,

    /// Text file with the organization status summary
    #[arg(long)]
    org_status: Option<PathBuf>,

    /// Text file with the tool-selection decision tree
    #[arg(long)]
    tool_tree: Option<PathBuf>,

    /// Text file listing the pages the user may open
    #[arg(long)]
    pages: Option<PathBuf>,

    /// JSON file with prompt configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    // ── Compression ────────────────────────────────────────────
    /// Compression level: light, medium or aggressive
    #[arg(long)]
    compress: Option<CompressionLevel>,

    /// Character budget (defaults to the configured target length)
    #[arg(long)]
    max_length: Option<usize>,

    // ── Output mode ────────────────────────────────────────────
    /// Print stats and validation findings to stderr
    #[arg(long)]
    stats: bool,

    /// List registered templates and exit
    #[arg(long)]
    list_templates: bool,

    /// Print the JSON Schema of the context file and exit
    #[arg(long)]
    print_schema: bool,
}

fn read_text(path: &Path, what: &str) -> Result<String, String> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {what} file '{}': {e}", path.display()))
}

fn read_optional(path: Option<&Path>, what: &str) -> Result<Option<String>, String> {
    path.map(|p| read_text(p, what)).transpose()
}

fn load_config(path: Option<&Path>) -> Result<PromptConfig, String> {
    let Some(path) = path else {
        return Ok(PromptConfig::default());
    };
    let content = read_text(path, "config")?;
    serde_json::from_str(&content)
        .map_err(|e| format!("failed to parse config file '{}': {e}", path.display()))
}

/// Parse a context file and check it against the `PromptContext` schema.
fn load_context(path: Option<&Path>) -> Result<PromptContext, String> {
    let Some(path) = path else {
        return Ok(PromptContext::default());
    };
    let content = read_text(path, "context")?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("failed to parse context file '{}': {e}", path.display()))?;

    let schema = json_schema_for::<PromptContext>();
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| format!("invalid context schema: {e}"))?;
    let errors: Vec<String> = validator
        .iter_errors(&value)
        .map(|e| format!("  - {}: {e}", e.instance_path()))
        .collect();
    if !errors.is_empty() {
        return Err(format!(
            "context file '{}' does not match the schema:\n{}",
            path.display(),
            errors.join("\n")
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| format!("failed to load context file '{}': {e}", path.display()))
}

fn list_templates(registry: &TemplateRegistry) -> String {
    let mut out = String::new();
    for template in registry.all() {
        let description = template.description.as_deref().unwrap_or("");
        out.push_str(&format!("{}\t{description}\n", template.name));
    }
    out
}

fn run(cli: &Cli) -> Result<String, String> {
    if cli.print_schema {
        let schema = json_schema_for::<PromptContext>();
        return serde_json::to_string_pretty(&schema)
            .map(|s| s + "\n")
            .map_err(|e| format!("failed to serialize schema: {e}"));
    }

    let registry = TemplateRegistry::with_builtins();
    if cli.list_templates {
        return Ok(list_templates(&registry));
    }

    let config = load_config(cli.config.as_deref())?;
    let context = load_context(cli.context.as_deref())?;
    let org_status = read_optional(cli.org_status.as_deref(), "organization status")?;
    let tool_tree = read_optional(cli.tool_tree.as_deref(), "tool tree")?;
    let pages = read_optional(cli.pages.as_deref(), "pages")?;

    let mut inputs = ModeInputs::new(&context)
        .with_organization_status(org_status.as_deref().unwrap_or(""))
        .with_tool_selection_tree(tool_tree.as_deref().unwrap_or(""));
    if let Some(pages) = pages.as_deref() {
        inputs = inputs.with_user_pages(pages);
    }

    let composer = PromptComposer::new(&registry).with_config(config.clone());
    let prompt = composer.compose(cli.mode, inputs);
    debug!(mode = %cli.mode, "{}", prompt.stats().to_log_string());

    for name in &prompt.diagnostics.missing_templates {
        eprintln!("  Warning: template '{name}' is not registered");
    }
    for name in &prompt.diagnostics.unresolved_placeholders {
        eprintln!("  Warning: placeholder '{{{{{name}}}}}' left unresolved");
    }

    let text = match (cli.compress, cli.max_length) {
        (None, None) => prompt.text.clone(),
        (level, max_length) => prompt.compress(
            Some(max_length.unwrap_or(config.target_length)),
            level.unwrap_or(config.default_level),
        ),
    };

    if cli.stats {
        let report = kinder_prompt::stats::validate_prompt_with(&text, &config);
        eprintln!(
            "  [stats] {}",
            kinder_prompt::stats::prompt_stats(&text).to_log_string()
        );
        for error in &report.errors {
            eprintln!("  [error] {error}");
        }
        for warning in &report.warnings {
            eprintln!("  [warning] {warning}");
        }
    }

    Ok(text + "\n")
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(&cli) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
