//! ドキュメントストア
//!
//! ユーザーごとに `profile`（1件）と `projects`（追記のみ）を持つ。
//! 保存順・返却順は保証しない（並べ替えは Gateway 側）。
//! 追記のたびに `StoreEvent` をブロードキャストする。

use crate::error::{InkedError, Result};
use inked_common::{Project, UserProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 64;

/// ストアからの通知
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    ProjectAdded(Project),
    ProfileChanged(UserProfile),
}

/// ユーザーのプロジェクト一覧を読み直す関数（購読の再同期用）
pub type ProjectLoader = Box<dyn Fn(&str) -> Result<Vec<Project>> + Send + Sync>;

pub trait DocumentStore {
    fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
    fn store_profile(&self, profile: &UserProfile) -> Result<()>;
    fn append_project(&self, project: &Project) -> Result<()>;
    fn projects_for(&self, user_id: &str) -> Result<Vec<Project>>;
    fn watch(&self) -> broadcast::Receiver<StoreEvent>;
    /// ストア本体を保持しない読み直し関数（ストアが破棄されたらエラー）
    fn loader(&self) -> ProjectLoader;
}

/// ストア全体のドキュメント
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    /// バージョン（互換性チェック用）
    version: u32,
    users: BTreeMap<String, UserRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserRecord {
    #[serde(default)]
    profile: Option<UserProfile>,
    #[serde(default)]
    projects: Vec<Project>,
}

impl StoreDocument {
    pub const CURRENT_VERSION: u32 = 1;

    fn profile(&self, user_id: &str) -> Option<UserProfile> {
        self.users.get(user_id).and_then(|u| u.profile.clone())
    }

    fn set_profile(&mut self, profile: &UserProfile) {
        self.users
            .entry(profile.user_id.clone())
            .or_default()
            .profile = Some(profile.clone());
    }

    fn push_project(&mut self, project: &Project) {
        self.users
            .entry(project.user_id.clone())
            .or_default()
            .projects
            .push(project.clone());
    }

    fn projects(&self, user_id: &str) -> Vec<Project> {
        self.users
            .get(user_id)
            .map(|u| u.projects.clone())
            .unwrap_or_default()
    }

    pub fn project_count(&self) -> usize {
        self.users.values().map(|u| u.projects.len()).sum()
    }
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            users: BTreeMap::new(),
        }
    }
}

fn lock(doc: &Mutex<StoreDocument>) -> Result<MutexGuard<'_, StoreDocument>> {
    doc.lock()
        .map_err(|_| InkedError::Store("ストアのロックが破損しています".into()))
}

fn loader_for(doc: &Arc<Mutex<StoreDocument>>) -> ProjectLoader {
    let doc = Arc::downgrade(doc);
    Box::new(move |user_id: &str| {
        let doc = doc
            .upgrade()
            .ok_or_else(|| InkedError::Store("ストアは閉じられています".into()))?;
        let projects = lock(&doc)?.projects(user_id);
        Ok(projects)
    })
}

fn notify(events: &broadcast::Sender<StoreEvent>, event: StoreEvent) {
    // 購読者がいなければ送信エラーになるが問題ない
    let _ = events.send(event);
}

/// ドキュメントを書き出してフラッシュ済みの書き込み先を返す
///
/// バッファに残ったままの書き込みエラーも必ず返す。
fn write_document<W: Write>(inner: W, doc: &StoreDocument) -> Result<W> {
    let mut writer = BufWriter::new(inner);
    serde_json::to_writer_pretty(&mut writer, doc)?;
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| InkedError::Io(e.into_error()))
}

/// メモリ上のストア
pub struct MemoryStore {
    doc: Arc<Mutex<StoreDocument>>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            doc: Arc::new(Mutex::new(StoreDocument::default())),
            events,
        }
    }

    pub fn project_count(&self) -> usize {
        lock(&self.doc).map(|d| d.project_count()).unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(lock(&self.doc)?.profile(user_id))
    }

    fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        lock(&self.doc)?.set_profile(profile);
        notify(&self.events, StoreEvent::ProfileChanged(profile.clone()));
        Ok(())
    }

    fn append_project(&self, project: &Project) -> Result<()> {
        lock(&self.doc)?.push_project(project);
        notify(&self.events, StoreEvent::ProjectAdded(project.clone()));
        Ok(())
    }

    fn projects_for(&self, user_id: &str) -> Result<Vec<Project>> {
        Ok(lock(&self.doc)?.projects(user_id))
    }

    fn watch(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn loader(&self) -> ProjectLoader {
        loader_for(&self.doc)
    }
}

/// JSONファイル1つに保存するストア
///
/// 変更のたびに一時ファイルへ書き出してから置き換える。
pub struct JsonFileStore {
    path: PathBuf,
    doc: Arc<Mutex<StoreDocument>>,
    events: broadcast::Sender<StoreEvent>,
}

impl JsonFileStore {
    /// 開く（ファイルがなければ空のストア）
    pub fn open(path: &Path) -> Result<Self> {
        let doc = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let doc: StoreDocument = serde_json::from_reader(reader)?;
            if doc.version != StoreDocument::CURRENT_VERSION {
                return Err(InkedError::Store(format!(
                    "ストアのバージョンが一致しません: {} (期待値 {})",
                    doc.version,
                    StoreDocument::CURRENT_VERSION
                )));
            }
            doc
        } else {
            StoreDocument::default()
        };

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            path: path.to_path_buf(),
            doc: Arc::new(Mutex::new(doc)),
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, doc: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let result = File::create(&tmp)
            .map_err(InkedError::from)
            .and_then(|file| write_document(file, doc))
            .and_then(|file| Ok(file.sync_all()?))
            .and_then(|_| Ok(std::fs::rename(&tmp, &self.path)?));

        if let Err(e) = &result {
            warn!(path = %tmp.display(), error = %e, "store write failed");
            let _ = std::fs::remove_file(&tmp);
            return result;
        }
        debug!(path = %self.path.display(), "store written");
        Ok(())
    }

    /// 書き込みに失敗した場合はメモリ上の変更も戻す
    fn mutate(&self, apply: impl FnOnce(&mut StoreDocument)) -> Result<()> {
        let mut doc = lock(&self.doc)?;
        let mut next = doc.clone();
        apply(&mut next);
        self.persist(&next)?;
        *doc = next;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(lock(&self.doc)?.profile(user_id))
    }

    fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        self.mutate(|doc| doc.set_profile(profile))?;
        notify(&self.events, StoreEvent::ProfileChanged(profile.clone()));
        Ok(())
    }

    fn append_project(&self, project: &Project) -> Result<()> {
        self.mutate(|doc| doc.push_project(project))?;
        notify(&self.events, StoreEvent::ProjectAdded(project.clone()));
        Ok(())
    }

    fn projects_for(&self, user_id: &str) -> Result<Vec<Project>> {
        Ok(lock(&self.doc)?.projects(user_id))
    }

    fn watch(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn loader(&self) -> ProjectLoader {
        loader_for(&self.doc)
    }
}
