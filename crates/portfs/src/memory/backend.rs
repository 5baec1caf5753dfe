use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::backend::StorageBackend;
use crate::bool_or_error::BoolOrError;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::file::{InputFile, OutputFile};
use crate::memory::file::{MemoryInputFile, MemoryOutputFile};
use crate::message::MessageHandler;
use crate::path_utils;

/// One node in the in-memory tree, keyed by its full path.
pub(super) enum Entry {
    File {
        content: Vec<u8>,
        atime_sec: i64,
        mtime_sec: i64,
    },
    Dir,
}

pub(super) struct State {
    pub(super) entries: BTreeMap<String, Entry>,
    // lock name -> millis of the last claim or bump
    pub(super) locks: HashMap<String, i64>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            entries: BTreeMap::from([("/".to_string(), Entry::Dir)]),
            locks: HashMap::new(),
        }
    }
}

impl State {
    fn child_prefix(dir: &str) -> String {
        if dir == "/" {
            "/".to_string()
        } else {
            format!("{dir}/")
        }
    }

    // Immediate children of `dir`, as full paths.
    fn children(&self, dir: &str) -> Vec<String> {
        let prefix = Self::child_prefix(dir);
        self.entries
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| {
                path.len() > prefix.len() && !path[prefix.len()..].contains('/')
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn has_children(&self, dir: &str) -> bool {
        let prefix = Self::child_prefix(dir);
        self.entries
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .any(|(path, _)| path.len() > prefix.len())
    }
}

/// Reference in-memory backend.
///
/// Suitable for tests and for any caller that wants filesystem semantics
/// without a filesystem.  Paths are `/`-separated and absolute; the root
/// `/` exists from construction.  Input handles snapshot content at open;
/// output handles publish every write immediately, so partial writes are
/// reader-visible exactly as the non-atomic write contract allows.
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl MemoryBackend {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    fn now_sec(&self) -> i64 {
        self.clock.now_millis() / 1000
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn open_input(
        &self,
        path: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn InputFile>> {
        let path = path_utils::trim_trailing_slash(path);
        let mut state = self.state.lock().await;
        let now_sec = self.now_sec();
        match state.entries.get_mut(path) {
            Some(Entry::File {
                content, atime_sec, ..
            }) => {
                *atime_sec = now_sec;
                Ok(Box::new(MemoryInputFile::new(path, content.clone())))
            }
            Some(Entry::Dir) => {
                handler.error(&format!("{path}: not a regular file"));
                Err(Error::not_a_file(path))
            }
            None => {
                handler.error(&format!("{path}: file not found"));
                Err(Error::not_found(path))
            }
        }
    }

    async fn open_output(
        &self,
        path: &str,
        append: bool,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn OutputFile>> {
        let path = path_utils::trim_trailing_slash(path);
        let mut state = self.state.lock().await;
        if let Some(parent) = path_utils::parent(path) {
            if !matches!(state.entries.get(parent), Some(Entry::Dir)) {
                handler.error(&format!("{path}: parent directory missing"));
                return Err(Error::not_found(parent));
            }
        }
        if matches!(state.entries.get(path), Some(Entry::Dir)) {
            handler.error(&format!("{path}: not a regular file"));
            return Err(Error::not_a_file(path));
        }
        let now_sec = self.now_sec();
        let entry = state
            .entries
            .entry(path.to_string())
            .or_insert_with(|| Entry::File {
                content: Vec::new(),
                atime_sec: now_sec,
                mtime_sec: now_sec,
            });
        if let Entry::File {
            content,
            atime_sec,
            mtime_sec,
        } = entry
        {
            if !append {
                content.clear();
            }
            *atime_sec = now_sec;
            *mtime_sec = now_sec;
        }
        Ok(Box::new(MemoryOutputFile::new(
            path,
            self.state.clone(),
            self.clock.clone(),
        )))
    }

    async fn open_temp(
        &self,
        prefix: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn OutputFile>> {
        let name = format!("{prefix}{}", uuid7::uuid7());
        self.open_output(&name, false, handler).await
    }

    async fn remove_file(&self, path: &str, handler: &dyn MessageHandler) -> Result<()> {
        let path = path_utils::trim_trailing_slash(path);
        let mut state = self.state.lock().await;
        match state.entries.get(path) {
            Some(Entry::File { .. }) => {
                state.entries.remove(path);
                Ok(())
            }
            Some(Entry::Dir) => {
                handler.error(&format!("{path}: not a regular file"));
                Err(Error::not_a_file(path))
            }
            None => {
                handler.error(&format!("{path}: file not found"));
                Err(Error::not_found(path))
            }
        }
    }

    async fn rename(&self, from: &str, to: &str, handler: &dyn MessageHandler) -> Result<()> {
        let from = path_utils::trim_trailing_slash(from);
        let to = path_utils::trim_trailing_slash(to);
        let mut state = self.state.lock().await;
        if matches!(state.entries.get(to), Some(Entry::Dir)) {
            handler.error(&format!("{to}: rename target is a directory"));
            return Err(Error::already_exists(to));
        }
        let Some(moved) = state.entries.remove(from) else {
            handler.error(&format!("{from}: file not found"));
            return Err(Error::not_found(from));
        };
        if matches!(moved, Entry::Dir) {
            // Rekey the whole subtree under the new name.
            let old_prefix = format!("{from}/");
            let descendants: Vec<String> = state
                .entries
                .range(old_prefix.clone()..)
                .take_while(|(path, _)| path.starts_with(&old_prefix))
                .map(|(path, _)| path.clone())
                .collect();
            for old_path in descendants {
                if let Some(entry) = state.entries.remove(&old_path) {
                    let new_path = format!("{to}/{}", &old_path[old_prefix.len()..]);
                    state.entries.insert(new_path, entry);
                }
            }
        }
        state.entries.insert(to.to_string(), moved);
        Ok(())
    }

    async fn make_dir(&self, path: &str, handler: &dyn MessageHandler) -> Result<()> {
        let path = path_utils::trim_trailing_slash(path);
        let mut state = self.state.lock().await;
        if state.entries.contains_key(path) {
            handler.error(&format!("{path}: already exists"));
            return Err(Error::already_exists(path));
        }
        if let Some(parent) = path_utils::parent(path) {
            match state.entries.get(parent) {
                Some(Entry::Dir) => {}
                Some(Entry::File { .. }) => {
                    handler.error(&format!("{parent}: not a directory"));
                    return Err(Error::not_a_directory(parent));
                }
                None => {
                    handler.error(&format!("{parent}: parent directory missing"));
                    return Err(Error::not_found(parent));
                }
            }
        }
        state.entries.insert(path.to_string(), Entry::Dir);
        Ok(())
    }

    async fn remove_dir(&self, path: &str, handler: &dyn MessageHandler) -> Result<()> {
        let path = path_utils::trim_trailing_slash(path);
        if path == "/" {
            handler.error("/: cannot remove the root directory");
            return Err(Error::permission_denied(path));
        }
        let mut state = self.state.lock().await;
        match state.entries.get(path) {
            Some(Entry::Dir) => {
                if state.has_children(path) {
                    handler.error(&format!("{path}: directory not empty"));
                    return Err(Error::Io(std::io::Error::other(format!(
                        "directory not empty: {path}"
                    ))));
                }
                state.entries.remove(path);
                Ok(())
            }
            Some(Entry::File { .. }) => {
                handler.error(&format!("{path}: not a directory"));
                Err(Error::not_a_directory(path))
            }
            None => {
                handler.error(&format!("{path}: directory not found"));
                Err(Error::not_found(path))
            }
        }
    }

    async fn exists(&self, path: &str, _handler: &dyn MessageHandler) -> BoolOrError {
        let path = path_utils::trim_trailing_slash(path);
        let state = self.state.lock().await;
        BoolOrError::from(state.entries.contains_key(path))
    }

    async fn is_dir(&self, path: &str, _handler: &dyn MessageHandler) -> BoolOrError {
        let path = path_utils::trim_trailing_slash(path);
        let state = self.state.lock().await;
        BoolOrError::from(matches!(state.entries.get(path), Some(Entry::Dir)))
    }

    async fn list_contents(
        &self,
        dir: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Vec<String>> {
        let dir = path_utils::trim_trailing_slash(dir);
        let state = self.state.lock().await;
        match state.entries.get(dir) {
            Some(Entry::Dir) => Ok(state.children(dir)),
            Some(Entry::File { .. }) => {
                handler.error(&format!("{dir}: not a directory"));
                Err(Error::not_a_directory(dir))
            }
            None => {
                handler.error(&format!("{dir}: directory not found"));
                Err(Error::not_found(dir))
            }
        }
    }

    async fn atime(&self, path: &str, handler: &dyn MessageHandler) -> Result<i64> {
        let path = path_utils::trim_trailing_slash(path);
        let state = self.state.lock().await;
        match state.entries.get(path) {
            Some(Entry::File { atime_sec, .. }) => Ok(*atime_sec),
            Some(Entry::Dir) => Ok(0),
            None => {
                handler.error(&format!("{path}: file not found"));
                Err(Error::not_found(path))
            }
        }
    }

    async fn mtime(&self, path: &str, handler: &dyn MessageHandler) -> Result<i64> {
        let path = path_utils::trim_trailing_slash(path);
        let state = self.state.lock().await;
        match state.entries.get(path) {
            Some(Entry::File { mtime_sec, .. }) => Ok(*mtime_sec),
            Some(Entry::Dir) => Ok(0),
            None => {
                handler.error(&format!("{path}: file not found"));
                Err(Error::not_found(path))
            }
        }
    }

    async fn size(&self, path: &str, handler: &dyn MessageHandler) -> Result<i64> {
        let path = path_utils::trim_trailing_slash(path);
        let state = self.state.lock().await;
        match state.entries.get(path) {
            Some(Entry::File { content, .. }) => Ok(content.len() as i64),
            Some(Entry::Dir) => Ok(0),
            None => {
                handler.error(&format!("{path}: file not found"));
                Err(Error::not_found(path))
            }
        }
    }

    async fn try_lock(&self, lock_name: &str, _handler: &dyn MessageHandler) -> BoolOrError {
        let mut state = self.state.lock().await;
        if state.locks.contains_key(lock_name) {
            BoolOrError::False
        } else {
            let now = self.clock.now_millis();
            state.locks.insert(lock_name.to_string(), now);
            BoolOrError::True
        }
    }

    async fn try_lock_with_timeout(
        &self,
        lock_name: &str,
        timeout_millis: i64,
        clock: &dyn Clock,
        handler: &dyn MessageHandler,
    ) -> BoolOrError {
        let mut state = self.state.lock().await;
        match state.locks.get(lock_name).copied() {
            None => {
                let now = self.clock.now_millis();
                state.locks.insert(lock_name.to_string(), now);
                BoolOrError::True
            }
            Some(taken_ms) => {
                let elapsed = clock.now_millis() - taken_ms;
                if elapsed >= timeout_millis {
                    handler.warning(&format!(
                        "{lock_name}: breaking stale lock (unrefreshed for {elapsed} ms)"
                    ));
                    let now = self.clock.now_millis();
                    state.locks.insert(lock_name.to_string(), now);
                    BoolOrError::True
                } else {
                    BoolOrError::False
                }
            }
        }
    }

    async fn bump_lock_timeout(
        &self,
        lock_name: &str,
        handler: &dyn MessageHandler,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let now = self.clock.now_millis();
        match state.locks.get_mut(lock_name) {
            Some(taken_ms) => {
                *taken_ms = now;
                Ok(())
            }
            None => {
                handler.error(&format!("{lock_name}: lock not held, cannot bump"));
                Err(Error::not_found(lock_name))
            }
        }
    }

    async fn unlock(&self, lock_name: &str, handler: &dyn MessageHandler) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.locks.remove(lock_name).is_some() {
            Ok(())
        } else {
            handler.error(&format!("{lock_name}: lock not held"));
            Err(Error::not_found(lock_name))
        }
    }
}
