use super::{Application, Interview, PreparationSession};
use crate::domain::value_objects::{InterviewStatus, JobStatus, PreparationTopic};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// ダッシュボードのサマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_applications: usize,
    pub active_interviews: usize,
    /// 今日から遡って連続で対策した日数
    pub prep_streak: u32,
    /// オファー数 / 応募数（%、四捨五入）
    pub success_rate: u32,
    pub status_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceTrend {
    pub topic: PreparationTopic,
    pub average_score: f64,
    pub sessions: usize,
}

impl DashboardStats {
    pub fn compute(
        applications: &[Application],
        interviews: &[Interview],
        sessions: &[PreparationSession],
        today: NaiveDate,
    ) -> Self {
        let total_applications = applications.len();
        let offers = applications
            .iter()
            .filter(|app| app.job_status == JobStatus::Offer)
            .count();
        let active_interviews = interviews
            .iter()
            .filter(|interview| interview.status == InterviewStatus::Scheduled)
            .count();

        let mut status_counts = BTreeMap::new();
        for app in applications {
            *status_counts
                .entry(app.job_status.as_str().to_string())
                .or_insert(0) += 1;
        }

        let success_rate = if total_applications > 0 {
            ((offers as f64 / total_applications as f64) * 100.0).round() as u32
        } else {
            0
        };

        Self {
            total_applications,
            active_interviews,
            prep_streak: prep_streak(sessions, today),
            success_rate,
            status_counts,
        }
    }
}

fn prep_streak(sessions: &[PreparationSession], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = sessions.iter().map(|session| session.date).collect();
    let mut streak = 0;
    let mut cursor = today;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

/// トピック別の平均自信度（スコア未入力のセッションは除外）
pub fn confidence_trends(sessions: &[PreparationSession]) -> Vec<ConfidenceTrend> {
    let mut totals: BTreeMap<&'static str, (PreparationTopic, u32, usize)> = BTreeMap::new();
    for session in sessions {
        if let Some(score) = session.confidence_score {
            let entry = totals
                .entry(session.topic.as_str())
                .or_insert((session.topic, 0, 0));
            entry.1 += u32::from(score.value());
            entry.2 += 1;
        }
    }

    totals
        .into_values()
        .map(|(topic, sum, count)| ConfidenceTrend {
            topic,
            average_score: f64::from(sum) / count as f64,
            sessions: count,
        })
        .collect()
}
