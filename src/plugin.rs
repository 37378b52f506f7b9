//! The host-facing side: one JSON-RPC request in, one response out.

use std::process::{Command, Stdio};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clipboard;
use crate::config::Settings;
use crate::executor;
use crate::lister::Lister;
use crate::matcher::KeywordMatcher;
use crate::model::ShortcutRecord;
use crate::results::{
    Action, COPY_TO_CLIPBOARD, DELETE_SHORTCUT, DO_NOTHING, EXECUTE_SHORTCUT, OPEN_EDITOR, ResultBuilder,
    ResultItem,
};
use crate::store::ShortcutStore;

#[derive(Deserialize, Debug, Clone)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct Response {
    pub result: Vec<ResultItem>,
}

/// Host parameters arrive either as a JSON string holding the record or as
/// the record object itself.
fn record_from(value: &Value) -> Result<ShortcutRecord> {
    let record = match value {
        Value::String(s) => serde_json::from_str(s)?,
        other => serde_json::from_value(other.clone())?,
    };
    Ok(record)
}

fn string_param(parameters: &[Value], index: usize) -> String {
    match parameters.get(index) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

pub struct Plugin {
    settings: Settings,
    store: ShortcutStore,
    builder: ResultBuilder,
}

impl Plugin {
    pub fn new(settings: Settings) -> Self {
        let store = ShortcutStore::open(&settings.store_path);
        Self::with_store(settings, store)
    }

    pub fn with_store(settings: Settings, store: ShortcutStore) -> Self {
        let builder = ResultBuilder::from_settings(&settings);
        Self {
            settings,
            store,
            builder,
        }
    }

    pub fn query(&self, query: &str) -> Vec<ResultItem> {
        let general = &self.settings.config.general;
        let normalized = query.trim().to_lowercase();
        let list_command = general.list_command.to_lowercase();

        if normalized.is_empty() || normalized.starts_with(&list_command) {
            let filter = normalized.replacen(&list_command, "", 1);
            return Lister::new(&self.builder, self.settings.config.display.list_score)
                .list(&filter, self.store.records());
        }

        KeywordMatcher::new(
            &self.builder,
            self.settings.config.display.show_category,
            &general.action_keyword,
        )
        .search(query, self.store.records())
    }

    pub fn context_menu(&self, data: &Value) -> Vec<ResultItem> {
        let record = match record_from(data) {
            Ok(record) => record,
            Err(e) => {
                error!("Context menu error: {}", e);
                return Vec::new();
            }
        };

        vec![
            ResultItem::new(
                "Open Shortcuts Editor",
                "Edit this shortcut or add new ones",
                self.builder.default_icon(),
                Action::open_editor_with(data.clone()),
            ),
            ResultItem::new(
                "Copy Path",
                record.path.clone(),
                self.builder.resolve_icon("Images/copy.png"),
                Action::copy(&record.path),
            ),
            ResultItem::new(
                "Delete Shortcut",
                format!("Remove '{}' from shortcuts", record.keyword),
                self.builder.resolve_icon("Images/delete.png"),
                Action::delete(&record.keyword),
            ),
        ]
    }

    pub fn execute_shortcut(&self, data: &Value) {
        match record_from(data) {
            Ok(record) => executor::execute(&record),
            Err(e) => error!("Error executing shortcut: {}", e),
        }
    }

    pub fn delete_shortcut(&mut self, keyword: &str) {
        if let Err(e) = self.store.delete(keyword) {
            error!("Error deleting shortcut: {}", e);
        }
    }

    /// Launches the configured editor on the store file, falling back to
    /// whatever the OS opens `.json` files with.
    pub fn open_editor(&self) {
        let path = &self.settings.store_path;
        if let Some(editor) = self.settings.config.general.editor.as_deref() {
            let editor = executor::expand_env(editor);
            let spawned = Command::new(&editor)
                .arg(path)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
            match spawned {
                Ok(_) => {
                    info!("Opened editor {}", editor);
                    return;
                }
                Err(e) => warn!("Could not start editor {}: {}", editor, e),
            }
        }

        if let Err(e) = open::that_detached(path) {
            error!("Error opening editor: {}", e);
        }
    }

    pub fn handle(&mut self, request: Request) -> Response {
        debug!("rpc {} {:?}", request.method, request.parameters);
        let params = &request.parameters;

        let result = match request.method.as_str() {
            "query" => self.query(&string_param(params, 0)),
            "context_menu" => self.context_menu(params.first().unwrap_or(&Value::Null)),
            EXECUTE_SHORTCUT => {
                self.execute_shortcut(params.first().unwrap_or(&Value::Null));
                Vec::new()
            }
            OPEN_EDITOR => {
                self.open_editor();
                Vec::new()
            }
            COPY_TO_CLIPBOARD => {
                clipboard::copy_to_clipboard(&string_param(params, 0));
                Vec::new()
            }
            DELETE_SHORTCUT => {
                self.delete_shortcut(&string_param(params, 0));
                Vec::new()
            }
            DO_NOTHING => Vec::new(),
            other => {
                warn!("Unknown method '{}'", other);
                Vec::new()
            }
        };
        Response { result }
    }

    /// Parses the raw request text, dispatches it and encodes the reply.
    pub fn handle_json(&mut self, raw: &str) -> Result<String> {
        let request: Request = serde_json::from_str(raw).context("malformed JSON-RPC request")?;
        let response = self.handle(request);
        serde_json::to_string(&response).context("encoding response")
    }
}
