// Store: template persistence, audit log and save
//
// A failed save leaves the in-memory template as it was so the user can retry.

use crate::editor::Editor;
use crate::error::{DesignerError, Result};
use crate::template::Template;
use chrono::Local;
use log::{info, warn};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use uuid::Uuid;

pub const AUDIT_ACTION_SAVE: &str = "SAVE";
pub const AUDIT_MODULE: &str = "ID_CARD";

// ============================================================================
// Template store
// ============================================================================

pub trait TemplateStore {
    fn get_templates(&self) -> Result<Vec<Template>>;

    /// Inserts or replaces by id. A template without an id gets one.
    fn upsert_template(&mut self, template: Template) -> Result<Template>;
}

/// Short uppercase id, e.g. `3FA2C91B`
pub fn generate_short_id() -> String {
    let uuid = Uuid::new_v4();
    let hex = format!("{:x}", uuid);
    hex[..8].to_uppercase()
}

fn with_id(mut template: Template) -> Template {
    if template.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
        template.id = Some(generate_short_id());
    }
    template
}

fn upsert_into(templates: &mut Vec<Template>, template: Template) -> Template {
    let template = with_id(template);
    match templates.iter_mut().find(|t| t.id == template.id) {
        Some(existing) => *existing = template.clone(),
        None => templates.push(template.clone()),
    }
    template
}

/// Looks a template up by id, falling back to its name.
pub fn find_template(templates: &[Template], id_or_name: &str) -> Result<Template> {
    templates
        .iter()
        .find(|t| t.id.as_deref() == Some(id_or_name))
        .or_else(|| templates.iter().find(|t| t.name == id_or_name))
        .cloned()
        .ok_or_else(|| DesignerError::TemplateNotFound(id_or_name.to_string()))
}

/// Templates kept as a JSON array in one file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    fn write_all(&self, templates: &[Template]) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, templates)
                .map_err(|e| DesignerError::SaveFailure(e.to_string()))?;
            writer.flush()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TemplateStore for JsonFileStore {
    fn get_templates(&self) -> Result<Vec<Template>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| DesignerError::Store(format!("{}: {}", self.path.display(), e)))?;
        let templates: Vec<Template> = serde_json::from_str(&content)
            .map_err(|e| DesignerError::Store(format!("Invalid JSON: {}", e)))?;
        Ok(templates.into_iter().map(Template::normalized).collect())
    }

    fn upsert_template(&mut self, template: Template) -> Result<Template> {
        let mut templates = self.get_templates()?;
        let saved = upsert_into(&mut templates, template);
        self.write_all(&templates)?;
        Ok(saved)
    }
}

/// In-process store, used for previews and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub templates: Vec<Template>,
    /// When set, every upsert is rejected
    pub reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateStore for MemoryStore {
    fn get_templates(&self) -> Result<Vec<Template>> {
        Ok(self.templates.clone())
    }

    fn upsert_template(&mut self, template: Template) -> Result<Template> {
        if self.reject_writes {
            return Err(DesignerError::Store("store is read-only".to_string()));
        }
        Ok(upsert_into(&mut self.templates, template))
    }
}

// ============================================================================
// Audit log
// ============================================================================

pub trait AuditSink {
    /// Fire-and-forget: a sink that cannot record logs the problem itself.
    fn record(&self, actor: &str, action: &str, module: &str, message: &str);
}

/// Writes audit entries through the `log` facade under the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, actor: &str, action: &str, module: &str, message: &str) {
        info!(target: "audit", "{} {} [{}] {}", actor, action, module, message);
    }
}

#[derive(Debug, Serialize)]
struct AuditEntry<'a> {
    timestamp: String,
    actor: &'a str,
    action: &'a str,
    module: &'a str,
    message: &'a str,
}

/// Appends one JSON object per line.
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileAuditSink { path: path.into() }
    }

    fn append(&self, entry: &AuditEntry<'_>) -> Result<()> {
        let line = serde_json::to_string(entry).map_err(|e| DesignerError::Store(e.to_string()))?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, actor: &str, action: &str, module: &str, message: &str) {
        let entry = AuditEntry {
            timestamp: Local::now().to_rfc3339(),
            actor,
            action,
            module,
            message,
        };
        if let Err(e) = self.append(&entry) {
            warn!("audit entry not written to {}: {}", self.path.display(), e);
        }
    }
}

// ============================================================================
// Save
// ============================================================================

/// Persists the editor's template. On success the editor takes the stored
/// id and one audit entry is recorded; on failure nothing changes.
pub fn save(
    editor: &mut Editor,
    store: &mut dyn TemplateStore,
    audit: &dyn AuditSink,
    actor: &str,
) -> Result<Template> {
    match store.upsert_template(editor.template().clone()) {
        Ok(saved) => {
            if let Some(id) = &saved.id {
                editor.adopt_id(id);
            }
            info!(
                "saved template '{}' ({})",
                saved.name,
                saved.id.as_deref().unwrap_or("-")
            );
            audit.record(
                actor,
                AUDIT_ACTION_SAVE,
                AUDIT_MODULE,
                &format!("Saved ID card template '{}'", saved.name),
            );
            Ok(saved)
        }
        Err(e) => {
            warn!("save of '{}' rejected: {}", editor.template().name, e);
            Err(DesignerError::SaveFailure(e.to_string()))
        }
    }
}
