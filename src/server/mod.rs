//! Tool-call adapter: exposes each ledger operation as a named action
//! and serializes every outcome as a JSON mapping. Transport is one
//! JSON object per line on stdin/stdout; all real logic lives in the
//! application service.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::application::{AppError, LedgerService};
use crate::domain::{EntryId, EntryPatch, NewEntry};

/// Content type the category catalog is served under.
pub const CATEGORIES_CONTENT_TYPE: &str = "application/json";

/// The raw catalog bytes plus the content type they should be tagged
/// with. The catalog is advisory: the store never validates entry
/// categories against it.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Read the category catalog from disk. Read fresh on every request so
/// the file can be edited without restarting the process; the bytes
/// are returned verbatim, never parsed or re-encoded.
pub fn read_categories(path: &Path) -> Result<CategoryCatalog, AppError> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read category catalog {}", path.display()))?;
    Ok(CategoryCatalog {
        bytes,
        content_type: CATEGORIES_CONTENT_TYPE,
    })
}

#[derive(Debug, Deserialize)]
struct ToolRequest {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    resource: Option<String>,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct RecordArgs {
    date: String,
    amount: f64,
    category: String,
    #[serde(default)]
    subcategory: String,
    #[serde(default)]
    note: String,
}

impl RecordArgs {
    fn into_entry(self) -> NewEntry {
        NewEntry::new(self.date, self.amount, self.category)
            .with_subcategory(self.subcategory)
            .with_note(self.note)
    }
}

#[derive(Debug, Deserialize)]
struct RangeArgs {
    start_date: String,
    end_date: String,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    id: EntryId,
    #[serde(flatten)]
    patch: EntryPatch,
}

#[derive(Debug, Deserialize)]
struct IdArgs {
    id: EntryId,
}

/// Dispatch a named tool call against the service and encode the
/// outcome as a JSON value. Unknown names and malformed arguments are
/// validation errors, never panics.
pub async fn dispatch(
    service: &LedgerService,
    tool: &str,
    arguments: Value,
) -> Result<Value, AppError> {
    match tool {
        "record_entry" => {
            let args: RecordArgs = parse_args(arguments)?;
            let outcome = service.record_entry(args.into_entry()).await?;
            encode(&outcome)
        }
        "record_credit_entry" => {
            let args: RecordArgs = parse_args(arguments)?;
            let outcome = service.record_credit_entry(args.into_entry()).await?;
            encode(&outcome)
        }
        "list_entries" => {
            let args: RangeArgs = parse_args(arguments)?;
            let entries = service
                .list_entries(&args.start_date, &args.end_date)
                .await?;
            encode(&entries)
        }
        "summarize" => {
            let args: RangeArgs = parse_args(arguments)?;
            let totals = service
                .summarize(&args.start_date, &args.end_date, args.category.as_deref())
                .await?;
            encode(&totals)
        }
        "update_entry" => {
            let args: UpdateArgs = parse_args(arguments)?;
            let outcome = service.update_entry(args.id, args.patch).await?;
            encode(&outcome)
        }
        "delete_entry" => {
            let args: IdArgs = parse_args(arguments)?;
            let outcome = service.delete_entry(args.id).await?;
            encode(&outcome)
        }
        _ => Err(AppError::UnknownTool(tool.to_string())),
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T, AppError> {
    serde_json::from_value(arguments).map_err(|err| AppError::InvalidArguments(err.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(value).context("Failed to encode result")?)
}

fn failure(err: &AppError) -> Value {
    json!({
        "ok": false,
        "error": err.to_string(),
        "kind": err.kind(),
    })
}

async fn handle_line(service: &LedgerService, categories_path: &Path, line: &str) -> Value {
    let request: ToolRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => return failure(&AppError::InvalidArguments(err.to_string())),
    };

    if let Some(tool) = request.tool {
        tracing::debug!(tool = %tool, "dispatching tool call");
        return match dispatch(service, &tool, request.arguments).await {
            Ok(result) => json!({ "ok": true, "result": result }),
            Err(err) => {
                tracing::warn!(tool = %tool, error = %err, "tool call failed");
                failure(&err)
            }
        };
    }

    if let Some(resource) = request.resource {
        if resource != "categories" {
            return failure(&AppError::InvalidArguments(format!(
                "unknown resource '{}'",
                resource
            )));
        }
        return match read_categories(categories_path) {
            Ok(catalog) => json!({
                "ok": true,
                "content_type": catalog.content_type,
                "body": String::from_utf8_lossy(&catalog.bytes),
            }),
            Err(err) => {
                tracing::warn!(error = %err, "catalog read failed");
                failure(&err)
            }
        };
    }

    failure(&AppError::InvalidArguments(
        "expected a 'tool' or 'resource' field".to_string(),
    ))
}

/// Run the request loop: one JSON request per stdin line, one JSON
/// response per stdout line, until EOF.
pub async fn serve(service: &LedgerService, categories_path: &Path) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    tracing::info!("listening for tool calls on stdin");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(service, categories_path, &line).await;
        let mut payload = serde_json::to_string(&response)?;
        payload.push('\n');
        stdout.write_all(payload.as_bytes()).await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
