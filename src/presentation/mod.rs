pub mod filters;
pub mod forms;
pub mod inline_edit;
pub mod list_view;

pub use filters::{distinct_companies, ApplicationFilter, SearchDebounce};
pub use forms::{ApplicationForm, AssessmentForm, InterviewForm, PreparationForm};
pub use inline_edit::{dispatch_save, input_to_value, CellEffect, CellEvent, CellState, InlineEditCell};
pub use list_view::{page_count, paginate, visible_range, ListView, Page, PageView, VisibleRow};
