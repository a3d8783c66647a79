//! Editing session service
//!
//! Loads the session file, applies one edit, and writes it back. The session
//! holds the live forest, the id of the hierarchy it belongs to, and every
//! saved hierarchy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, JsonResultExt};
use crate::config::Settings;
use crate::domain::{
    DropEvent, DropIntent, ExportDocument, Forest, GestureInterpreter, HierarchyCatalog, NodeId,
    NodeStore, Outcome, SaveKind, Session,
};
use crate::infrastructure::traits::{Clock, FileSystem};

/// Loaded session: live forest plus saved hierarchies.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    /// Hierarchy the live forest was opened from or saved to
    pub current: Option<Uuid>,
    pub store: NodeStore,
    pub catalog: HierarchyCatalog,
}

impl Workspace {
    pub fn from_session(session: Session) -> Self {
        Self {
            current: session.current,
            store: NodeStore::from_items(&session.items),
            catalog: HierarchyCatalog::new(session.hierarchies),
        }
    }

    pub fn to_session(&self) -> Session {
        Session {
            current: self.current,
            items: self.store.snapshot(),
            hierarchies: self.catalog.clone().into_inner(),
        }
    }

    pub fn forest(&self) -> &Forest {
        self.store.forest()
    }

    fn resolve(&self, reference: &str) -> ApplicationResult<NodeId> {
        Ok(self.forest().resolve(reference)?)
    }
}

/// Result of a drop gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropReport {
    pub intent: DropIntent,
    pub outcome: Outcome,
}

/// Service for editing the word forest and managing saved hierarchies.
pub struct WorkspaceService {
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    settings: Arc<Settings>,
}

impl WorkspaceService {
    /// Create a new workspace service.
    pub fn new(fs: Arc<dyn FileSystem>, clock: Arc<dyn Clock>, settings: Arc<Settings>) -> Self {
        Self { fs, clock, settings }
    }

    /// Read the session file; a missing file is an empty session.
    pub fn load(&self) -> ApplicationResult<Workspace> {
        let path = self.settings.session_path();
        if !self.fs.exists(&path) {
            debug!("no session at {}, starting empty", path.display());
            return Ok(Workspace::default());
        }
        let content = self
            .fs
            .read_to_string(&path)
            .with_path_context("read session", &path)?;
        let session: Session = parse_json(&content, format!("session file {}", path.display()))?;
        Ok(Workspace::from_session(session))
    }

    /// Write the session file atomically.
    pub fn store(&self, workspace: &Workspace) -> ApplicationResult<()> {
        let path = self.settings.session_path();
        let content = serde_json::to_string_pretty(&workspace.to_session())
            .with_json_context("serialize session")?;
        self.fs
            .ensure_parent(&path)
            .with_path_context("create data directory", &path)?;
        self.fs
            .write_atomic(&path, &content)
            .with_path_context("write session", &path)?;
        debug!("session stored at {}", path.display());
        Ok(())
    }

    /// Load, run one mutation, and store only if it was applied.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Workspace) -> ApplicationResult<Outcome<T>>,
    ) -> ApplicationResult<Outcome<T>> {
        let mut workspace = self.load()?;
        let outcome = op(&mut workspace)?;
        if outcome.is_applied() {
            self.store(&workspace)?;
        }
        Ok(outcome)
    }

    /// Create a word under `parent` (a node reference) or on the first level.
    ///
    /// Returns the key of the new word.
    pub fn add_word(&self, name: &str, parent: Option<&str>) -> ApplicationResult<Outcome<Uuid>> {
        self.mutate(|ws| {
            let parent = parent.map(|r| ws.resolve(r)).transpose()?;
            let outcome = ws.store.apply(|f| f.create_node(name, parent));
            Ok(match outcome {
                Outcome::Applied(idx) => match ws.forest().key_of(idx) {
                    Some(key) => Outcome::Applied(key),
                    None => {
                        return Err(ApplicationError::OperationFailed {
                            context: format!("created word {name} has no key"),
                            source: "missing node".into(),
                        })
                    }
                },
                Outcome::Rejected(reason) => Outcome::Rejected(reason),
            })
        })
    }

    /// Remove a word together with everything below it.
    pub fn remove_word(&self, reference: &str) -> ApplicationResult<Outcome> {
        self.mutate(|ws| {
            let node = ws.resolve(reference)?;
            Ok(ws.store.apply(|f| f.remove_node(node)))
        })
    }

    pub fn rename_word(&self, reference: &str, new_name: &str) -> ApplicationResult<Outcome> {
        self.mutate(|ws| {
            let node = ws.resolve(reference)?;
            Ok(ws.store.apply(|f| f.rename_node(node, new_name)))
        })
    }

    /// Make a word the last child of `into`, or the last first-level word.
    pub fn move_word(&self, reference: &str, into: Option<&str>) -> ApplicationResult<Outcome> {
        self.mutate(|ws| {
            let node = ws.resolve(reference)?;
            let target = into.map(|r| ws.resolve(r)).transpose()?;
            Ok(ws.store.apply(|f| f.move_node(node, target)))
        })
    }

    /// Detach a word from its parent, making it a first-level word.
    pub fn unlink_word(&self, reference: &str) -> ApplicationResult<Outcome> {
        self.move_word(reference, None)
    }

    /// Shift a word among its siblings; `Applied(false)` if it did not move.
    pub fn order_word(&self, reference: &str, offset: isize) -> ApplicationResult<Outcome<bool>> {
        self.mutate(|ws| {
            let node = ws.resolve(reference)?;
            Ok(ws.store.apply(|f| f.order_node(node, offset)))
        })
    }

    /// Replay a drop gesture.
    pub fn drop_word(
        &self,
        reference: &str,
        target: Option<&str>,
        displacement_x: f64,
        delta_y: f64,
    ) -> ApplicationResult<DropReport> {
        let interpreter = GestureInterpreter::new(self.settings.nest_threshold);
        let mut intent = DropIntent::Ignore;
        let outcome = self.mutate(|ws| {
            let event = DropEvent {
                dragged: ws.resolve(reference)?,
                target: target.map(|r| ws.resolve(r)).transpose()?,
                displacement_x,
                delta_y,
            };
            intent = interpreter.classify(&event);
            Ok(ws.store.apply(|f| interpreter.apply(f, &event)))
        })?;
        Ok(DropReport { intent, outcome })
    }

    /// Save the live forest under the current hierarchy, or a new one.
    pub fn save_hierarchy(&self) -> ApplicationResult<(Uuid, SaveKind)> {
        let mut workspace = self.load()?;
        let id = workspace.current.unwrap_or_else(Uuid::new_v4);
        let kind = workspace
            .catalog
            .save(id, &workspace.store.snapshot(), self.clock.now());
        workspace.current = Some(id);
        self.store(&workspace)?;
        info!("saved hierarchy {id} ({kind:?})");
        Ok((id, kind))
    }

    /// Start an empty hierarchy and make it current.
    pub fn new_hierarchy(&self) -> ApplicationResult<Uuid> {
        let mut workspace = self.load()?;
        let id = Uuid::new_v4();
        let _ = workspace.catalog.save(id, &[], self.clock.now());
        workspace.current = Some(id);
        workspace.store.replace_forest(Forest::new());
        self.store(&workspace)?;
        info!("new hierarchy {id}");
        Ok(id)
    }

    /// Replace the live forest with a copy of a saved hierarchy.
    ///
    /// Unsaved edits of the live forest are discarded.
    pub fn open_hierarchy(&self, id_prefix: &str) -> ApplicationResult<Uuid> {
        let mut workspace = self.load()?;
        let id = workspace.catalog.resolve(id_prefix)?;
        let forest = workspace
            .catalog
            .get(id)
            .map(|h| Forest::from_items(&h.items))
            .unwrap_or_default();
        workspace.store.replace_forest(forest);
        workspace.current = Some(id);
        self.store(&workspace)?;
        info!("opened hierarchy {id}");
        Ok(id)
    }

    /// Delete a saved hierarchy. The live forest is kept.
    pub fn remove_hierarchy(&self, id_prefix: &str) -> ApplicationResult<Uuid> {
        let mut workspace = self.load()?;
        let id = workspace.catalog.resolve(id_prefix)?;
        workspace.catalog.remove(id);
        if workspace.current == Some(id) {
            workspace.current = None;
        }
        self.store(&workspace)?;
        info!("removed hierarchy {id}");
        Ok(id)
    }

    /// Export the live forest as `{ "data": [...] }` without node ids.
    pub fn export_json(&self) -> ApplicationResult<String> {
        let workspace = self.load()?;
        let document = ExportDocument::from_snapshot(&workspace.store.snapshot());
        render_json(&document, self.settings.export_indent)
    }

    /// Export file used when no path is given.
    pub fn default_export_path(&self) -> PathBuf {
        PathBuf::from(&self.settings.export_file)
    }

    /// Write the export document to `path`, or to the configured export file.
    ///
    /// Returns the path written.
    pub fn export_to(&self, path: Option<&Path>) -> ApplicationResult<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_export_path());
        let json = self.export_json()?;
        self.fs
            .write(&path, &format!("{json}\n"))
            .map_err(|source| ApplicationError::Write {
                path: path.clone(),
                source,
            })?;
        info!("exported to {}", path.display());
        Ok(path)
    }

    /// Read an export document from `path` and import it.
    pub fn import_file(&self, path: &Path) -> ApplicationResult<usize> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|source| ApplicationError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        self.import_json(&content)
    }

    /// Replace the live forest with an exported document.
    ///
    /// Every word gets a new key; ids in the document are ignored. The
    /// imported forest is not attached to any saved hierarchy.
    pub fn import_json(&self, content: &str) -> ApplicationResult<usize> {
        let document: ExportDocument = parse_json(content, "import document")?;
        let forest = Forest::from_foreign_items(&document.data);
        let count = forest.len();

        let mut workspace = self.load()?;
        workspace.store.replace_forest(forest);
        workspace.current = None;
        self.store(&workspace)?;
        info!("imported {count} word(s)");
        Ok(count)
    }
}

/// Parse JSON of any nesting depth.
///
/// Every word level adds two levels of JSON nesting, so deep chains exceed
/// serde_json's default recursion limit; the stack grows on demand instead.
fn parse_json<T: DeserializeOwned>(content: &str, context: impl Into<String>) -> ApplicationResult<T> {
    let context = context.into();
    let mut deserializer = serde_json::Deserializer::from_str(content);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
        .with_json_context(context.clone())?;
    deserializer.end().with_json_context(context)?;
    Ok(value)
}

fn render_json<T: Serialize>(value: &T, indent: usize) -> ApplicationResult<String> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    value
        .serialize(&mut serializer)
        .with_json_context("serialize export")?;
    String::from_utf8(buf).map_err(|e| ApplicationError::OperationFailed {
        context: "export is not UTF-8".to_string(),
        source: Box::new(e),
    })
}
