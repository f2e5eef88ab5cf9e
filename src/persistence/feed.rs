//! プロジェクト一覧の購読
//!
//! ストアからの追加通知を受けるたびに一覧を作り直し、作成日時の新しい順に並べる。
//! 通知を取りこぼした場合はストアから一覧を読み直す。
//! 読み直しの失敗・チャネル切断はログに残すだけで、呼び出し側にはエラーを返さない。

use inked_common::Project;
use std::cmp::Ordering;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use super::store::{ProjectLoader, StoreEvent};

/// 新しい順（同時刻はIDの降順）
pub fn newest_first(a: &Project, b: &Project) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

pub struct ProjectFeed {
    user_id: String,
    projects: Vec<Project>,
    events: broadcast::Receiver<StoreEvent>,
    reload: ProjectLoader,
    delivered_initial: bool,
}

impl ProjectFeed {
    /// `events` は初期一覧を読む前に購読しておくこと（取りこぼし防止）
    pub fn new(
        user_id: &str,
        initial: Vec<Project>,
        events: broadcast::Receiver<StoreEvent>,
        reload: ProjectLoader,
    ) -> Self {
        let mut projects = initial;
        projects.sort_by(newest_first);
        Self {
            user_id: user_id.to_string(),
            projects,
            events,
            reload,
            delivered_initial: false,
        }
    }

    pub fn snapshot(&self) -> &[Project] {
        &self.projects
    }

    /// 次の一覧。初回は現在の一覧、以降は追加があるまで待つ。
    /// ストアが閉じられたら None
    pub async fn next(&mut self) -> Option<&[Project]> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some(&self.projects);
        }

        loop {
            match self.events.recv().await {
                Ok(StoreEvent::ProjectAdded(project)) => {
                    if self.push(project) {
                        return Some(&self.projects);
                    }
                }
                Ok(StoreEvent::ProfileChanged(_)) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(user = %self.user_id, skipped, "project feed lagged, reloading");
                    match (self.reload)(&self.user_id) {
                        Ok(projects) => {
                            self.projects = projects;
                            self.projects.sort_by(newest_first);
                            return Some(&self.projects);
                        }
                        Err(e) => {
                            warn!(user = %self.user_id, error = %e, "project feed reload failed");
                        }
                    }
                }
                Err(RecvError::Closed) => {
                    warn!(user = %self.user_id, "project feed closed");
                    return None;
                }
            }
        }
    }

    /// 自分宛ての新規プロジェクトなら追加して true
    fn push(&mut self, project: Project) -> bool {
        if project.user_id != self.user_id || self.projects.iter().any(|p| p.id == project.id) {
            return false;
        }
        self.projects.push(project);
        self.projects.sort_by(newest_first);
        true
    }
}
