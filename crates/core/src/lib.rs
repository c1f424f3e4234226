pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod estimation;
pub mod format;
pub mod session;

pub use catalog::{CatalogError, QuestionCatalog};
pub use domain::analysis::AiAnalysis;
pub use domain::answers::{Answer, Answers};
pub use domain::profile::{ProfileCategory, ProfileId, ProfileLevel, TjmProfile};
pub use domain::project::{
    ConversationMessage, MessageRole, Project, ProjectDraft, ProjectId, ProjectStatus,
    UploadedDocument,
};
pub use domain::questionnaire::{DayRange, Question, QuestionOption};
pub use domain::stack::{InfraCost, StackDefinition, StackTier};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use estimation::{
    calculate_detailed_budget, calculate_discount, calculate_quick_estimate,
    calculate_recommendation, BudgetBreakdownItem, BudgetOverrides, DetailedBudget,
    DeterministicEstimationEngine, DiscountOutcome, DiscountType, EstimationEngine,
    QuickEstimate, Recommendation,
};
pub use format::{format_currency, format_currency_k};
pub use session::{AssistantModel, ChatRequest, EstimationSession, EstimationType};
