//! Deployment descriptor watcher for hot reload.
//!
//! # Responsibilities
//! - Notice edits to the descriptor, including save-by-rename
//! - Load it and check every component type against the known factories
//! - Hand only descriptors that can be built to the reload loop
//!
//! # Design Decisions
//! - The parent directory is watched, not the file. Editors that write a
//!   temp file and rename it over the original replace the inode, and a
//!   file-level watch goes silent after the first such save
//! - Events are filtered on the descriptor's file name
//! - A descriptor that fails to load or names an unknown type is logged and
//!   dropped; the running registry is never disturbed by it

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::DispatchConfig;
use crate::config::validation::validate_component_types;
use crate::observability::logging::encode_for_log;
use crate::registry::ComponentFactories;

/// Watches one descriptor and emits buildable configurations.
pub struct ConfigWatcher {
    path: PathBuf,
    factories: ComponentFactories,
    update_tx: mpsc::UnboundedSender<DispatchConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path, factories: ComponentFactories) -> (Self, mpsc::UnboundedReceiver<DispatchConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                factories,
                update_tx,
            },
            update_rx,
        )
    }

    /// Directory holding the descriptor.
    fn watch_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Start watching. Drop the returned watcher to stop.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = self.watch_dir();
        let path = self.path.clone();
        let Self {
            factories, update_tx, ..
        } = self;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_descriptor(&event, &path) => {
                    tracing::info!(kind = ?event.kind, "Descriptor changed, reloading");
                    match prepare_update(&path, &factories) {
                        Ok(config) => {
                            if update_tx.send(config).is_err() {
                                tracing::debug!("Reload loop gone, dropping update");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Rejected new descriptor. Keeping current registry.");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(
            path = %encode_for_log(&self.path.display().to_string()),
            dir = %encode_for_log(&dir.display().to_string()),
            "Descriptor watcher started"
        );
        Ok(watcher)
    }
}

/// True if `event` writes, creates, or renames onto the descriptor.
pub fn touches_descriptor(event: &Event, descriptor: &Path) -> bool {
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        return false;
    }
    let Some(name) = descriptor.file_name() else {
        return false;
    };
    event.paths.iter().any(|p| p.file_name() == Some(name))
}

/// Load the descriptor at `path` and make sure every type it names exists.
pub fn prepare_update(path: &Path, factories: &ComponentFactories) -> Result<DispatchConfig, ConfigError> {
    let config = load_config(path)?;
    validate_component_types(&config, factories).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationError;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind, RenameMode};
    use std::io::Write;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_touches_descriptor() {
        let descriptor = Path::new("conf/dispatch.toml");

        assert!(touches_descriptor(
            &event(EventKind::Modify(ModifyKind::Any), "/srv/conf/dispatch.toml"),
            descriptor
        ));
        // Save-by-rename lands as a rename onto the descriptor.
        let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/srv/conf/.dispatch.toml.swp"))
            .add_path(PathBuf::from("/srv/conf/dispatch.toml"));
        assert!(touches_descriptor(&rename, descriptor));
        assert!(touches_descriptor(
            &event(EventKind::Create(CreateKind::File), "dispatch.toml"),
            descriptor
        ));

        assert!(!touches_descriptor(
            &event(EventKind::Modify(ModifyKind::Any), "/srv/conf/other.toml"),
            descriptor
        ));
        assert!(!touches_descriptor(
            &event(EventKind::Access(AccessKind::Any), "/srv/conf/dispatch.toml"),
            descriptor
        ));
        assert!(!touches_descriptor(
            &event(EventKind::Remove(RemoveKind::File), "/srv/conf/dispatch.toml"),
            descriptor
        ));
    }

    #[test]
    fn test_watch_dir_for_bare_file_name() {
        let (watcher, _rx) = ConfigWatcher::new(Path::new("dispatch.toml"), ComponentFactories::new());
        assert_eq!(watcher.watch_dir(), PathBuf::from("."));
        let (watcher, _rx) = ConfigWatcher::new(Path::new("/etc/app/dispatch.toml"), ComponentFactories::new());
        assert_eq!(watcher.watch_dir(), PathBuf::from("/etc/app"));
    }

    #[test]
    fn test_prepare_update_checks_component_types() {
        let factories = ComponentFactories::with_builtins();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[handler]]
name = "page"
type = "static_text"
mappings = ["/page"]

[[filter]]
name = "audit"
type = "no_such_filter"
url_patterns = ["/*"]
"#
        )
        .unwrap();

        match prepare_update(file.path(), &factories) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(
                    &errors[0],
                    ValidationError::UnknownType { kind: "filter", .. }
                ));
            }
            other => panic!("expected a validation error, got {other:?}"),
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[handler]]
name = "page"
type = "static_text"
mappings = ["/page"]
"#
        )
        .unwrap();
        let config = prepare_update(file.path(), &factories).unwrap();
        assert_eq!(config.handlers.len(), 1);
    }
}
