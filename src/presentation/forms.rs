use crate::application::services::{DraftForm, FieldErrors};
use crate::domain::entities::{
    ApplicationDraft, AssessmentDraft, InterviewDraft, PreparationSessionDraft,
};
use crate::domain::value_objects::{
    ApplicationStage, InterviewStatus, JobStatus, RecordId, Score,
};
use crate::shared::error::AppError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
/// `<input type="datetime-local">` の形式
const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

fn required_text(errors: &mut FieldErrors, field: &str, label: &str, input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        errors.insert(field, format!("{label} is required"));
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn date(errors: &mut FieldErrors, field: &str, input: &str, required: bool) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        if required {
            errors.insert(field, "Date is required");
        }
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| errors.insert(field, format!("'{trimmed}' is not a valid date")))
        .ok()
}

fn timestamp(errors: &mut FieldErrors, field: &str, input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, LOCAL_DATETIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| errors.insert(field, format!("'{trimmed}' is not a valid date and time")))
        .ok()
}

fn choice<E>(errors: &mut FieldErrors, field: &str, input: &str, required: bool) -> Option<E>
where
    E: FromStr<Err = AppError>,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        if required {
            errors.insert(field, format!("{field} is required"));
        }
        return None;
    }
    E::from_str(trimmed)
        .map_err(|err| errors.insert(field, err.user_message()))
        .ok()
}

fn score(errors: &mut FieldErrors, field: &str, input: &str) -> Option<Score> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<u8>()
        .map_err(|_| format!("'{trimmed}' is not a whole number"))
        .and_then(Score::new)
        .map_err(|msg| errors.insert(field, msg))
        .ok()
}

fn reference(errors: &mut FieldErrors, field: &str, label: &str, input: &str) -> Option<RecordId> {
    match input.trim().parse::<i64>().ok().map(RecordId::new) {
        Some(Ok(id)) => Some(id),
        _ => {
            errors.insert(field, format!("Select {label}"));
            None
        }
    }
}

fn finish<D>(errors: FieldErrors, draft: Option<D>) -> Result<D, FieldErrors> {
    match draft {
        Some(draft) if errors.is_empty() => Ok(draft),
        _ => Err(errors),
    }
}

/// 応募追加ダイアログ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationForm {
    pub date_applied: String,
    pub company_name: String,
    pub role_title: String,
    pub role_url: String,
    pub job_status: String,
    pub application_stage: String,
    pub resume_version: String,
    pub mode_of_application: String,
    pub follow_up_date: String,
}

impl ApplicationForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date_applied: today.format(DATE_FORMAT).to_string(),
            company_name: String::new(),
            role_title: String::new(),
            role_url: String::new(),
            job_status: JobStatus::Applied.to_string(),
            application_stage: ApplicationStage::InReview.to_string(),
            resume_version: String::new(),
            mode_of_application: String::new(),
            follow_up_date: String::new(),
        }
    }
}

impl DraftForm for ApplicationForm {
    type Draft = ApplicationDraft;

    fn validate(&self) -> Result<ApplicationDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let date_applied = date(&mut errors, "dateApplied", &self.date_applied, true);
        let company_name = required_text(&mut errors, "companyName", "Company name", &self.company_name);
        let role_title = required_text(&mut errors, "roleTitle", "Role title", &self.role_title);
        let job_status = choice(&mut errors, "jobStatus", &self.job_status, true);
        let application_stage = choice(&mut errors, "applicationStage", &self.application_stage, true);
        let mode_of_application = choice(&mut errors, "modeOfApplication", &self.mode_of_application, false);
        let follow_up_date = date(&mut errors, "followUpDate", &self.follow_up_date, false);

        let role_url = optional_text(&self.role_url);
        if let Some(url) = &role_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.insert("roleUrl", "Role URL must start with http:// or https://");
            }
        }

        let draft = (|| {
            Some(ApplicationDraft {
                date_applied: date_applied?,
                company_name: company_name?,
                role_title: role_title?,
                role_url,
                job_status: job_status?,
                application_stage: application_stage?,
                resume_version: optional_text(&self.resume_version),
                mode_of_application,
                follow_up_date,
            })
        })();
        finish(errors, draft)
    }
}

/// 面接追加ダイアログ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewForm {
    pub application_id: String,
    pub interview_stage: String,
    pub interview_date: String,
    pub status: String,
    pub prep_resources: String,
    pub assigned_tasks: String,
    pub feedback_notes: String,
    pub interview_score: String,
}

impl Default for InterviewForm {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            interview_stage: String::new(),
            interview_date: String::new(),
            status: InterviewStatus::Scheduled.to_string(),
            prep_resources: String::new(),
            assigned_tasks: String::new(),
            feedback_notes: String::new(),
            interview_score: String::new(),
        }
    }
}

impl DraftForm for InterviewForm {
    type Draft = InterviewDraft;

    fn validate(&self) -> Result<InterviewDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let application_id = reference(&mut errors, "applicationId", "an application", &self.application_id);
        let interview_stage = choice(&mut errors, "interviewStage", &self.interview_stage, true);
        let interview_date = timestamp(&mut errors, "interviewDate", &self.interview_date);
        let status = choice(&mut errors, "status", &self.status, true);
        let interview_score = score(&mut errors, "interviewScore", &self.interview_score);

        let draft = (|| {
            Some(InterviewDraft {
                application_id: application_id?,
                interview_stage: interview_stage?,
                interview_date,
                status: status?,
                prep_resources: optional_text(&self.prep_resources),
                assigned_tasks: optional_text(&self.assigned_tasks),
                feedback_notes: optional_text(&self.feedback_notes),
                interview_score,
            })
        })();
        finish(errors, draft)
    }
}

/// 対策記録ダイアログ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparationForm {
    pub date: String,
    pub topic: String,
    pub resource_link: String,
    pub confidence_score: String,
    pub notes: String,
}

impl PreparationForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today.format(DATE_FORMAT).to_string(),
            topic: String::new(),
            resource_link: String::new(),
            confidence_score: "1".to_string(),
            notes: String::new(),
        }
    }
}

impl DraftForm for PreparationForm {
    type Draft = PreparationSessionDraft;

    fn validate(&self) -> Result<PreparationSessionDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let date = date(&mut errors, "date", &self.date, true);
        let topic = choice(&mut errors, "topic", &self.topic, true);
        let confidence_score = score(&mut errors, "confidenceScore", &self.confidence_score);

        let draft = (|| {
            Some(PreparationSessionDraft {
                date: date?,
                topic: topic?,
                resource_link: optional_text(&self.resource_link),
                confidence_score,
                notes: optional_text(&self.notes),
            })
        })();
        finish(errors, draft)
    }
}

/// 振り返りダイアログ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentForm {
    pub interview_id: String,
    pub score: String,
    pub difficulty_level: String,
    pub what_went_well: String,
    pub what_fell_short: String,
    pub questions_asked: String,
    pub your_questions: String,
    pub follow_up_needed: bool,
    pub time_to_next_round: String,
}

impl Default for AssessmentForm {
    fn default() -> Self {
        Self {
            interview_id: String::new(),
            score: "1".to_string(),
            difficulty_level: String::new(),
            what_went_well: String::new(),
            what_fell_short: String::new(),
            questions_asked: String::new(),
            your_questions: String::new(),
            follow_up_needed: false,
            time_to_next_round: String::new(),
        }
    }
}

impl DraftForm for AssessmentForm {
    type Draft = AssessmentDraft;

    fn validate(&self) -> Result<AssessmentDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let interview_id = reference(&mut errors, "interviewId", "an interview", &self.interview_id);
        let score = score(&mut errors, "score", &self.score);
        let difficulty_level = choice(&mut errors, "difficultyLevel", &self.difficulty_level, false);

        let draft = interview_id.map(|interview_id| AssessmentDraft {
            interview_id,
            score,
            difficulty_level,
            what_went_well: optional_text(&self.what_went_well),
            what_fell_short: optional_text(&self.what_fell_short),
            questions_asked: optional_text(&self.questions_asked),
            your_questions: optional_text(&self.your_questions),
            follow_up_needed: self.follow_up_needed,
            time_to_next_round: optional_text(&self.time_to_next_round),
        });
        finish(errors, draft)
    }
}
