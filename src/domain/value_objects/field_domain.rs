use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// 列挙フィールドが取りうる値の閉集合。
///
/// バリデーションと UI の選択肢表示の両方がここを参照する。
#[derive(Debug, PartialEq, Eq)]
pub struct FieldDomain {
    /// ワイヤー上のフィールド名（camelCase）
    pub field: &'static str,
    pub values: &'static [&'static str],
}

impl FieldDomain {
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(&value)
    }

    pub fn options(&self) -> &'static [&'static str] {
        self.values
    }

    pub fn validate(&self, value: &str) -> Result<(), AppError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(self.reject(value))
        }
    }

    pub fn reject(&self, value: &str) -> AppError {
        AppError::validation(
            self.field,
            format!("'{}' is not one of: {}", value, self.values.join(", ")),
        )
    }
}

macro_rules! field_domain {
    (
        $(#[$meta:meta])*
        $name:ident, $domain:ident, $field:tt {
            $($variant:ident => $label:tt),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        pub static $domain: FieldDomain = FieldDomain {
            field: $field,
            values: &[$($label),+],
        };

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn domain() -> &'static FieldDomain {
                &$domain
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err($domain.reject(other)),
                }
            }
        }
    };
}

field_domain! {
    /// 応募全体のステータス
    JobStatus, JOB_STATUS, "jobStatus" {
        Applied => "Applied",
        InProgress => "In Progress",
        Interviewing => "Interviewing",
        Rejected => "Rejected",
        Offer => "Offer",
    }
}

field_domain! {
    /// 選考ステージ
    ApplicationStage, APPLICATION_STAGE, "applicationStage" {
        NoCallback => "No Callback",
        InReview => "In Review",
        HrRound => "HR Round",
        HiringManagerRound => "Hiring Manager Round",
        CaseStudy => "Case Study/Assignment",
        PanelInterview => "Panel Interview",
        FinalRound => "Final Round",
        Offer => "Offer",
        Rejected => "Rejected",
    }
}

field_domain! {
    /// 応募経路
    ModeOfApplication, MODE_OF_APPLICATION, "modeOfApplication" {
        LinkedIn => "LinkedIn",
        CompanySite => "Company Site",
        Referral => "Referral",
        Recruiter => "Recruiter",
        JobBoard => "Job Board",
    }
}

field_domain! {
    InterviewStage, INTERVIEW_STAGE, "interviewStage" {
        HrRound => "HR Round",
        HmRound => "HM Round",
        PanelInterview => "Panel Interview",
        CaseStudy => "Case Study",
        TechnicalRound => "Technical Round",
        FinalRound => "Final Round",
        CultureFit => "Culture Fit",
    }
}

field_domain! {
    InterviewStatus, INTERVIEW_STATUS, "status" {
        Scheduled => "Scheduled",
        Completed => "Completed",
        Cancelled => "Cancelled",
        Rescheduled => "Rescheduled",
    }
}

field_domain! {
    DifficultyLevel, DIFFICULTY_LEVEL, "difficultyLevel" {
        Easy => "Easy",
        Medium => "Medium",
        Hard => "Hard",
        VeryHard => "Very Hard",
    }
}

field_domain! {
    /// 対策トピック
    PreparationTopic, PREPARATION_TOPIC, "topic" {
        Behavioral => "Behavioral",
        ProductThinking => "Product Thinking",
        AnalyticalThinking => "Analytical Thinking",
        ProductPortfolio => "Product Portfolio",
        TechnicalSkills => "Technical Skills",
        SystemDesign => "System Design",
        CaseStudies => "Case Studies",
    }
}

/// 全ての列挙フィールドドメイン
pub fn all_domains() -> [&'static FieldDomain; 7] {
    [
        &JOB_STATUS,
        &APPLICATION_STAGE,
        &MODE_OF_APPLICATION,
        &INTERVIEW_STAGE,
        &INTERVIEW_STATUS,
        &DIFFICULTY_LEVEL,
        &PREPARATION_TOPIC,
    ]
}
