use crate::domain::entities::Application;
use crate::domain::value_objects::{ApplicationStage, ModeOfApplication};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;

/// 応募一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationFilter {
    /// 会社名・職種名の部分一致（大文字小文字を区別しない）
    pub search: String,
    pub stages: BTreeSet<ApplicationStage>,
    pub mode: Option<ModeOfApplication>,
    pub company: String,
    pub interviewing: bool,
}

impl ApplicationFilter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.stages.is_empty()
            && self.mode.is_none()
            && self.company.trim().is_empty()
            && !self.interviewing
    }

    pub fn matches(&self, app: &Application) -> bool {
        let search = self.search.trim().to_lowercase();
        let search_match = search.is_empty()
            || app.company_name.to_lowercase().contains(&search)
            || app.role_title.to_lowercase().contains(&search);
        let stage_match = self.stages.is_empty() || self.stages.contains(&app.application_stage);
        let mode_match = self.mode.is_none() || app.mode_of_application == self.mode;
        let company = self.company.trim().to_lowercase();
        let company_match = company.is_empty() || app.company_name.to_lowercase().contains(&company);
        let interviewing_match = !self.interviewing || app.is_interviewing();

        search_match && stage_match && mode_match && company_match && interviewing_match
    }

    /// 絞り込み後、応募日の新しい順に並べる
    pub fn apply<'a>(&self, applications: &'a [Application]) -> Vec<&'a Application> {
        let mut rows: Vec<&Application> = applications
            .iter()
            .filter(|app| self.matches(app))
            .collect();
        rows.sort_by_key(|app| (Reverse(app.date_applied), Reverse(app.id)));
        rows
    }
}

/// フィルタ選択肢用の、一覧に現れる会社名（重複なし・昇順）
pub fn distinct_companies(applications: &[Application]) -> Vec<String> {
    applications
        .iter()
        .map(|app| app.company_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 検索入力のデバウンス。入力が `delay` 途切れたら値を 1 回だけ確定する。
#[derive(Debug, Clone)]
pub struct SearchDebounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
    committed: String,
}

impl SearchDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            committed: String::new(),
        }
    }

    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now + self.delay));
    }

    /// 期限が来ていて値が変わったときだけ `Some`
    pub fn poll(&mut self, now: Instant) -> Option<&str> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {}
            _ => return None,
        }
        let (text, _) = self.pending.take()?;
        if text == self.committed {
            return None;
        }
        self.committed = text;
        Some(&self.committed)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }
}
