//! Caller-owned estimation workflow state.
//!
//! The session records answers, overrides, documents and the assistant conversation.
//! Every mutation bumps [`EstimationSession::revision`]; engine results are recomputed
//! from the current state on each call and never cached.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{QuestionCatalog, NONE_OPTION};
use crate::domain::analysis::AiAnalysis;
use crate::domain::answers::{Answer, Answers};
use crate::domain::profile::{ProfileId, TjmProfile};
use crate::domain::project::{
    ConversationMessage, MessageRole, Project, ProjectDraft, ProjectId, ProjectStatus,
    UploadedDocument,
};
use crate::domain::questionnaire::Question;
use crate::errors::DomainError;
use crate::estimation::rounding::to_days;
use crate::estimation::{
    BudgetOverrides, DetailedBudget, DeterministicEstimationEngine, DiscountOutcome, DiscountType,
    EstimationEngine, QuickEstimate, Recommendation,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationType {
    #[default]
    Quick,
    Detailed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssistantModel {
    #[serde(rename = "claude-opus-4-20250514")]
    Opus,
    #[default]
    #[serde(rename = "claude-sonnet-4-20250514")]
    Sonnet,
    #[serde(rename = "claude-haiku-4-20250514")]
    Haiku,
}

impl AssistantModel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opus => "claude-opus-4-20250514",
            Self::Sonnet => "claude-sonnet-4-20250514",
            Self::Haiku => "claude-haiku-4-20250514",
        }
    }
}

impl std::str::FromStr for AssistantModel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "opus" | "claude-opus-4-20250514" => Ok(Self::Opus),
            "sonnet" | "claude-sonnet-4-20250514" => Ok(Self::Sonnet),
            "haiku" | "claude-haiku-4-20250514" => Ok(Self::Haiku),
            other => Err(format!("unknown assistant model `{other}` (expected opus|sonnet|haiku)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Payload for the assistant collaborator: the whole conversation without timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: AssistantModel,
    pub system_prompt: String,
}

#[derive(Clone, Debug)]
pub struct EstimationSession<E = DeterministicEstimationEngine> {
    engine: E,
    catalog: QuestionCatalog,
    revision: u64,
    current_step: usize,
    answers: Answers,
    project_name: String,
    estimation_type: EstimationType,
    profiles: Vec<TjmProfile>,
    overrides: BudgetOverrides,
    discount_type: DiscountType,
    discount_value: Decimal,
    saved_project_id: Option<ProjectId>,
    project_status: ProjectStatus,
    documents: Vec<UploadedDocument>,
    ai_analysis: Option<AiAnalysis>,
    analysis_error: Option<String>,
    use_ai_suggestions: bool,
    conversation: Vec<ConversationMessage>,
    selected_model: AssistantModel,
    chat_error: Option<String>,
}

impl EstimationSession {
    pub fn new(catalog: QuestionCatalog) -> Self {
        Self::with_engine(catalog, DeterministicEstimationEngine)
    }
}

impl Default for EstimationSession {
    fn default() -> Self {
        Self::new(QuestionCatalog::standard())
    }
}

impl<E: EstimationEngine> EstimationSession<E> {
    pub fn with_engine(catalog: QuestionCatalog, engine: E) -> Self {
        Self {
            engine,
            catalog,
            revision: 0,
            current_step: 0,
            answers: Answers::new(),
            project_name: String::new(),
            estimation_type: EstimationType::default(),
            profiles: Vec::new(),
            overrides: BudgetOverrides::default(),
            discount_type: DiscountType::None,
            discount_value: Decimal::ZERO,
            saved_project_id: None,
            project_status: ProjectStatus::Draft,
            documents: Vec::new(),
            ai_analysis: None,
            analysis_error: None,
            use_ai_suggestions: false,
            conversation: Vec::new(),
            selected_model: AssistantModel::default(),
            chat_error: None,
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn profiles(&self) -> &[TjmProfile] {
        &self.profiles
    }

    pub fn overrides(&self) -> &BudgetOverrides {
        &self.overrides
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn estimation_type(&self) -> EstimationType {
        self.estimation_type
    }

    pub fn discount_type(&self) -> DiscountType {
        self.discount_type
    }

    pub fn discount_value(&self) -> Decimal {
        self.discount_value
    }

    pub fn saved_project_id(&self) -> Option<&ProjectId> {
        self.saved_project_id.as_ref()
    }

    pub fn project_status(&self) -> ProjectStatus {
        self.project_status
    }

    pub fn documents(&self) -> &[UploadedDocument] {
        &self.documents
    }

    pub fn ai_analysis(&self) -> Option<&AiAnalysis> {
        self.ai_analysis.as_ref()
    }

    pub fn analysis_error(&self) -> Option<&str> {
        self.analysis_error.as_deref()
    }

    pub fn uses_ai_suggestions(&self) -> bool {
        self.use_ai_suggestions
    }

    pub fn conversation(&self) -> &[ConversationMessage] {
        &self.conversation
    }

    pub fn selected_model(&self) -> AssistantModel {
        self.selected_model
    }

    pub fn chat_error(&self) -> Option<&str> {
        self.chat_error.as_deref()
    }

    // Profiles

    pub fn load_profiles(&mut self, profiles: Vec<TjmProfile>) -> Result<(), DomainError> {
        if profiles.is_empty() {
            return Err(DomainError::EmptyProfileSource);
        }
        self.profiles = profiles;
        self.reset_distribution();
        Ok(())
    }

    pub fn reset_distribution(&mut self) {
        for profile in &self.profiles {
            self.overrides.distribution.insert(profile.id.clone(), profile.default_percentage);
        }
        self.touch();
    }

    // Answers and navigation

    pub fn set_answer(&mut self, question_id: impl Into<String>, answer: Answer) {
        self.answers.insert(question_id, answer);
        self.touch();
    }

    /// `none` is exclusive: picking it clears the other choices, picking anything else drops it.
    pub fn toggle_multi_select_answer(&mut self, question_id: &str, value: &str) {
        if value == NONE_OPTION {
            self.answers.insert(question_id, Answer::multiple([NONE_OPTION]));
            self.touch();
            return;
        }

        let mut values = match self.answers.get(question_id) {
            Some(Answer::Multiple(values)) => values.clone(),
            _ => Default::default(),
        };
        values.remove(NONE_OPTION);
        if !values.remove(value) {
            values.insert(value.to_string());
        }

        self.answers.insert(question_id, Answer::Multiple(values));
        self.touch();
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.catalog.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.catalog.question_at(self.current_step)
    }

    pub fn next_step(&mut self) {
        if self.current_step + 1 < self.total_steps() {
            self.current_step += 1;
            self.touch();
        }
    }

    pub fn prev_step(&mut self) {
        if self.current_step > 0 {
            self.current_step -= 1;
            self.touch();
        }
    }

    pub fn go_to_step(&mut self, step: usize) {
        if step < self.total_steps() {
            self.current_step = step;
            self.touch();
        }
    }

    /// Percentage of the questionnaire reached, counting the current step.
    pub fn progress(&self) -> u32 {
        let total = self.total_steps();
        if total == 0 {
            return 0;
        }
        let ratio = Decimal::from(self.current_step + 1) / Decimal::from(total);
        u32::try_from(to_days(ratio * Decimal::ONE_HUNDRED)).unwrap_or(0)
    }

    pub fn is_current_step_answered(&self) -> bool {
        self.current_question().is_some_and(|question| self.is_answered(question))
    }

    pub fn is_complete(&self) -> bool {
        self.catalog.questions.iter().all(|question| self.is_answered(question))
    }

    /// The answer shape must match the question: a list on a single-choice question
    /// counts as unanswered, so the recommendation never scores a mismatched shape.
    fn is_answered(&self, question: &Question) -> bool {
        match self.answers.get(&question.id) {
            Some(Answer::Multiple(values)) if question.multi_select => !values.is_empty(),
            Some(Answer::Single(value)) if !question.multi_select => !value.is_empty(),
            _ => false,
        }
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project_name = name.into();
        self.touch();
    }

    pub fn set_estimation_type(&mut self, estimation_type: EstimationType) {
        self.estimation_type = estimation_type;
        self.touch();
    }

    // Derived values

    pub fn recommendation(&self) -> Option<Recommendation> {
        self.is_complete().then(|| self.engine.recommend(&self.answers, &self.catalog))
    }

    /// Midpoint of the recommended range in whole days.
    pub fn average_days(&self) -> Option<i64> {
        self.recommendation().map(|recommendation| {
            let sum = Decimal::from(recommendation.days.min) + Decimal::from(recommendation.days.max);
            to_days(sum / Decimal::TWO)
        })
    }

    pub fn quick_estimate(&self) -> Option<QuickEstimate> {
        self.recommendation()
            .map(|recommendation| self.engine.quick_estimate(recommendation.days, &self.profiles))
    }

    pub fn detailed_budget(&self) -> Option<DetailedBudget> {
        self.average_days().map(|days| {
            self.engine.detailed_budget(Decimal::from(days), &self.profiles, &self.overrides)
        })
    }

    pub fn discount(&self) -> Option<DiscountOutcome> {
        self.detailed_budget().map(|budget| {
            self.engine.discount(budget.total, self.discount_type, self.discount_value)
        })
    }

    pub fn total_distribution_percentage(&self) -> Decimal {
        self.overrides.distribution.values().copied().fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn has_custom_tjm(&self) -> bool {
        !self.overrides.tjm.is_empty()
    }

    pub fn has_custom_days(&self) -> bool {
        !self.overrides.days.is_empty()
    }

    // Overrides

    pub fn set_distribution(&mut self, profile_id: ProfileId, percentage: Decimal) {
        self.overrides.distribution.insert(profile_id, percentage);
        self.touch();
    }

    /// Setting a profile back to its standard rate removes the override.
    pub fn set_tjm_override(&mut self, profile_id: &ProfileId, tjm: Decimal) {
        let Some(standard) =
            self.profiles.iter().find(|profile| &profile.id == profile_id).map(|profile| profile.tjm)
        else {
            return;
        };

        if tjm == standard {
            self.overrides.tjm.remove(profile_id);
        } else {
            self.overrides.tjm.insert(profile_id.clone(), tjm);
        }
        self.touch();
    }

    pub fn clear_tjm_override(&mut self, profile_id: &ProfileId) {
        self.overrides.tjm.remove(profile_id);
        self.touch();
    }

    pub fn clear_all_tjm_overrides(&mut self) {
        self.overrides.tjm.clear();
        self.touch();
    }

    pub fn set_days_override(&mut self, profile_id: ProfileId, days: Decimal) {
        if days > Decimal::ZERO {
            self.overrides.days.insert(profile_id, days);
        } else {
            self.overrides.days.remove(&profile_id);
        }
        self.touch();
    }

    pub fn clear_days_override(&mut self, profile_id: &ProfileId) {
        self.overrides.days.remove(profile_id);
        self.touch();
    }

    pub fn clear_all_days_overrides(&mut self) {
        self.overrides.days.clear();
        self.touch();
    }

    // Discount

    pub fn set_discount_type(&mut self, discount_type: DiscountType) {
        self.discount_type = discount_type;
        if discount_type == DiscountType::None {
            self.discount_value = Decimal::ZERO;
        }
        self.touch();
    }

    pub fn set_discount_value(&mut self, value: Decimal) {
        self.discount_value = value;
        self.touch();
    }

    // Documents and analysis

    pub fn add_document(&mut self, document: UploadedDocument) {
        self.documents.push(document);
        self.touch();
    }

    /// Dropping a document also drops the analysis produced from it.
    pub fn remove_document(&mut self, file_id: &str) {
        self.documents.retain(|document| document.id != file_id);
        if self.ai_analysis.as_ref().is_some_and(|analysis| analysis.meta.file_id == file_id) {
            self.ai_analysis = None;
        }
        self.touch();
    }

    pub fn set_ai_analysis(&mut self, analysis: AiAnalysis) {
        if self.project_name.is_empty() && !analysis.summary.title.is_empty() {
            self.project_name = analysis.summary.title.clone();
        }
        self.ai_analysis = Some(analysis);
        self.analysis_error = None;
        self.touch();
    }

    pub fn set_analysis_error(&mut self, error: Option<String>) {
        self.analysis_error = error;
        self.touch();
    }

    pub fn ai_suggested_answers(&self) -> Option<Answers> {
        self.ai_analysis.as_ref().map(AiAnalysis::suggested_answers)
    }

    /// Overwrites the answers the analysis has an opinion on. Returns `false` when there
    /// is no analysis to apply.
    pub fn apply_ai_suggestions(&mut self) -> bool {
        let Some(suggested) = self.ai_suggested_answers() else {
            return false;
        };
        for (question_id, answer) in suggested.iter() {
            self.answers.insert(question_id.clone(), answer.clone());
        }
        self.use_ai_suggestions = true;
        self.touch();
        true
    }

    pub fn clear_ai_suggestions(&mut self) {
        self.answers.clear();
        self.use_ai_suggestions = false;
        self.touch();
    }

    // Assistant chat

    pub fn set_selected_model(&mut self, model: AssistantModel) {
        self.selected_model = model;
        self.touch();
    }

    /// Records the user message and returns the request to forward to the assistant.
    pub fn begin_chat_turn(&mut self, content: impl Into<String>) -> ChatRequest {
        self.begin_chat_turn_at(content, Utc::now())
    }

    pub fn begin_chat_turn_at(&mut self, content: impl Into<String>, at: DateTime<Utc>) -> ChatRequest {
        self.conversation.push(ConversationMessage {
            role: MessageRole::User,
            content: content.into(),
            timestamp: at,
        });
        self.chat_error = None;
        self.touch();

        ChatRequest {
            messages: self
                .conversation
                .iter()
                .map(|message| ChatMessage { role: message.role, content: message.content.clone() })
                .collect(),
            model: self.selected_model,
            system_prompt: self.system_prompt(),
        }
    }

    pub fn record_assistant_reply(&mut self, content: impl Into<String>) {
        self.record_assistant_reply_at(content, Utc::now());
    }

    pub fn record_assistant_reply_at(&mut self, content: impl Into<String>, at: DateTime<Utc>) {
        self.conversation.push(ConversationMessage {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: at,
        });
        self.touch();
    }

    pub fn record_chat_error(&mut self, message: impl Into<String>) {
        self.chat_error = Some(message.into());
        self.touch();
    }

    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
        self.touch();
    }

    fn system_prompt(&self) -> String {
        let context = match &self.ai_analysis {
            Some(analysis) => {
                let title = if analysis.summary.title.is_empty() {
                    "Non défini"
                } else {
                    analysis.summary.title.as_str()
                };
                format!(
                    "Contexte actuel :\n- Projet analysé : {title}\n- Complexité : {}/10\n- Stack suggérée : {}",
                    analysis.complexity.score, analysis.complexity.suggested_stack
                )
            }
            None => "Aucun document analysé pour le moment.".to_string(),
        };

        format!(
            "Tu es un assistant spécialisé dans l'analyse de projets web et l'estimation de charges.\n\n\
             {context}\n\n\
             Aide l'utilisateur à affiner son analyse, à compléter les informations manquantes \
             ou à répondre à ses questions sur le projet."
        )
    }

    // Persistence

    /// The draft carries the session's project status: `Draft` for a new estimate, the
    /// stored status once a project has been restored.
    pub fn to_project_draft(&self) -> Result<ProjectDraft, DomainError> {
        if self.project_name.trim().is_empty() {
            return Err(DomainError::MissingProjectName);
        }
        let recommendation = self.recommendation().ok_or(DomainError::IncompleteQuestionnaire)?;

        let sum = Decimal::from(recommendation.days.min) + Decimal::from(recommendation.days.max);
        let total_days = to_days(sum / Decimal::TWO);
        let budget =
            self.engine.detailed_budget(Decimal::from(total_days), &self.profiles, &self.overrides);
        let outcome = self.engine.discount(budget.total, self.discount_type, self.discount_value);

        Ok(ProjectDraft {
            name: self.project_name.clone(),
            stack: recommendation.stack,
            total_days,
            total_budget: budget.total,
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            final_budget: outcome.final_budget,
            status: self.project_status,
            answers: self.answers.clone(),
            budget_breakdown: budget.breakdown,
            documents: Some(self.documents.iter().map(|document| document.id.clone()).collect()),
            ai_analysis: self.ai_analysis.clone(),
            conversation_history: (!self.conversation.is_empty()).then(|| self.conversation.clone()),
        })
    }

    pub fn mark_saved(&mut self, project_id: ProjectId) {
        self.saved_project_id = Some(project_id);
        self.touch();
    }

    /// Loads a stored project back into the session. Overrides are rebuilt from the
    /// stored breakdown so the detailed budget comes out the same as when it was saved.
    pub fn restore_from_project(&mut self, project: &Project) {
        let record = &project.record;
        self.project_name = record.name.clone();
        self.answers = record.answers.clone();
        self.discount_type = record.discount_type;
        self.discount_value = record.discount_value;
        self.saved_project_id = Some(project.id.clone());
        self.project_status = record.status;
        self.ai_analysis = record.ai_analysis.clone();
        self.conversation = record.conversation_history.clone().unwrap_or_default();

        if !record.budget_breakdown.is_empty() {
            self.overrides = BudgetOverrides::default();
            for item in &record.budget_breakdown {
                self.overrides.distribution.insert(item.profile_id.clone(), item.percentage);
                if !item.days.is_zero() {
                    self.overrides.days.insert(item.profile_id.clone(), item.days);
                }
                if item.tjm_applied != item.tjm_standard {
                    self.overrides.tjm.insert(item.profile_id.clone(), item.tjm_applied);
                }
            }
        }

        if let Some(documents) = &record.documents {
            self.documents = documents
                .iter()
                .map(|id| UploadedDocument { id: id.clone(), filename: format!("Document {id}") })
                .collect();
        }

        self.touch();
    }

    /// Back to a blank questionnaire. Loaded profiles are kept.
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.answers.clear();
        self.project_name.clear();
        self.estimation_type = EstimationType::default();
        self.overrides = BudgetOverrides::default();
        self.discount_type = DiscountType::None;
        self.discount_value = Decimal::ZERO;
        self.saved_project_id = None;
        self.project_status = ProjectStatus::Draft;
        self.documents.clear();
        self.ai_analysis = None;
        self.analysis_error = None;
        self.use_ai_suggestions = false;
        self.conversation.clear();
        self.selected_model = AssistantModel::default();
        self.chat_error = None;
        self.reset_distribution();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{AssistantModel, EstimationSession};
    use crate::domain::analysis::fixtures::analysis;
    use crate::domain::answers::Answer;
    use crate::domain::profile::{ProfileId, TjmProfile};
    use crate::domain::project::{MessageRole, Project, ProjectId, ProjectStatus, UploadedDocument};
    use crate::domain::questionnaire::DayRange;
    use crate::domain::stack::StackTier;
    use crate::errors::DomainError;
    use crate::estimation::DiscountType;

    fn profiles() -> Vec<TjmProfile> {
        vec![
            TjmProfile::new("dev", "Développeur", Decimal::from(600), Decimal::from(60)),
            TjmProfile::new("pm", "Chef de projet", Decimal::from(750), Decimal::from(40)),
        ]
    }

    fn completed_session() -> EstimationSession {
        let mut session = EstimationSession::default();
        session.load_profiles(profiles()).expect("profiles load");
        session.set_answer("projectType", Answer::single("corporate"));
        session.set_answer("dataComplexity", Answer::single("simple"));
        session.set_answer("multilingual", Answer::single("mono"));
        session.set_answer("integrations", Answer::multiple(["none"]));
        session.set_answer("accessibility", Answer::single("none"));
        session.set_answer("security", Answer::single("standard"));
        session.set_answer("deadline", Answer::single("standard"));
        session
    }

    #[test]
    fn empty_profile_source_is_rejected() {
        let mut session = EstimationSession::default();
        assert_eq!(session.load_profiles(Vec::new()), Err(DomainError::EmptyProfileSource));
        assert!(session.profiles().is_empty());
    }

    #[test]
    fn loading_profiles_seeds_distribution() {
        let mut session = EstimationSession::default();
        session.load_profiles(profiles()).expect("profiles load");

        assert_eq!(session.total_distribution_percentage(), Decimal::from(100));
        assert_eq!(
            session.overrides().distribution.get(&ProfileId::new("pm")),
            Some(&Decimal::from(40))
        );
    }

    #[test]
    fn none_is_exclusive_in_multi_select() {
        let mut session = EstimationSession::default();

        session.toggle_multi_select_answer("integrations", "crm");
        session.toggle_multi_select_answer("integrations", "sso");
        assert_eq!(session.answers().get("integrations"), Some(&Answer::multiple(["crm", "sso"])));

        session.toggle_multi_select_answer("integrations", "none");
        assert_eq!(session.answers().get("integrations"), Some(&Answer::multiple(["none"])));

        session.toggle_multi_select_answer("integrations", "erp");
        assert_eq!(session.answers().get("integrations"), Some(&Answer::multiple(["erp"])));

        session.toggle_multi_select_answer("integrations", "erp");
        assert_eq!(session.answers().get("integrations"), Some(&Answer::Multiple(Default::default())));
    }

    #[test]
    fn navigation_is_clamped_to_the_catalog() {
        let mut session = EstimationSession::default();
        session.prev_step();
        assert_eq!(session.current_step(), 0);
        assert_eq!(session.progress(), 14);

        for _ in 0..20 {
            session.next_step();
        }
        assert_eq!(session.current_step(), 6);
        assert_eq!(session.progress(), 100);
        assert_eq!(session.current_question().map(|q| q.id.as_str()), Some("deadline"));

        session.go_to_step(42);
        assert_eq!(session.current_step(), 6);
        session.go_to_step(3);
        assert_eq!(session.progress(), 57);
    }

    #[test]
    fn multi_select_needs_a_non_empty_set_to_count_as_answered() {
        let mut session = EstimationSession::default();
        session.go_to_step(3);

        session.set_answer("integrations", Answer::single("crm"));
        assert!(!session.is_current_step_answered());

        session.set_answer("integrations", Answer::multiple(Vec::<String>::new()));
        assert!(!session.is_current_step_answered());

        session.toggle_multi_select_answer("integrations", "crm");
        assert!(session.is_current_step_answered());
    }

    #[test]
    fn list_answer_on_single_choice_question_leaves_session_incomplete() {
        let mut session = completed_session();
        session.set_answer("deadline", Answer::multiple(["standard"]));

        assert!(!session.is_complete());
        assert!(session.recommendation().is_none());

        session.go_to_step(6);
        assert!(!session.is_current_step_answered());
    }

    #[test]
    fn derived_values_appear_only_when_complete() {
        let mut session = completed_session();
        assert!(session.is_complete());

        let recommendation = session.recommendation().expect("complete session recommends");
        assert_eq!(recommendation.stack, StackTier::B);
        assert_eq!(recommendation.days, DayRange::new(20, 35));
        assert_eq!(session.average_days(), Some(28));

        let budget = session.detailed_budget().expect("detailed budget");
        assert_eq!(budget.total_days, Decimal::new(28, 0));
        assert_eq!(budget.total, Decimal::from(18_480));

        session.set_discount_type(DiscountType::Fixed);
        session.set_discount_value(Decimal::from(480));
        assert_eq!(session.discount().map(|d| d.final_budget), Some(Decimal::from(18_000)));

        session.set_answer("deadline", Answer::single(""));
        assert!(session.recommendation().is_none());
        assert!(session.detailed_budget().is_none());
    }

    #[test]
    fn every_mutation_bumps_the_revision() {
        let mut session = EstimationSession::default();
        let start = session.revision();

        session.set_project_name("Refonte");
        session.toggle_multi_select_answer("integrations", "crm");
        session.set_discount_type(DiscountType::Percentage);

        assert_eq!(session.revision(), start + 3);
    }

    #[test]
    fn tjm_override_is_dropped_when_reset_to_standard_rate() {
        let mut session = completed_session();
        let dev = ProfileId::new("dev");

        session.set_tjm_override(&ProfileId::new("ghost"), Decimal::from(100));
        assert!(!session.has_custom_tjm());

        session.set_tjm_override(&dev, Decimal::from(650));
        assert!(session.has_custom_tjm());

        session.set_tjm_override(&dev, Decimal::from(600));
        assert!(!session.has_custom_tjm());
    }

    #[test]
    fn non_positive_day_override_is_removed() {
        let mut session = completed_session();
        let dev = ProfileId::new("dev");

        session.set_days_override(dev.clone(), Decimal::from(12));
        assert!(session.has_custom_days());

        session.set_days_override(dev, Decimal::ZERO);
        assert!(!session.has_custom_days());
    }

    #[test]
    fn switching_discount_off_resets_the_value() {
        let mut session = EstimationSession::default();
        session.set_discount_type(DiscountType::Percentage);
        session.set_discount_value(Decimal::from(10));

        session.set_discount_type(DiscountType::None);
        assert_eq!(session.discount_value(), Decimal::ZERO);
    }

    #[test]
    fn analysis_prefills_name_and_suggestions() {
        let mut session = EstimationSession::default();
        session.set_analysis_error(Some("timeout".to_string()));
        session.set_ai_analysis(analysis("file-1"));

        assert_eq!(session.project_name(), "Intranet RH");
        assert!(session.analysis_error().is_none());

        session.set_answer("deadline", Answer::single("urgent"));
        assert!(session.apply_ai_suggestions());
        assert!(session.uses_ai_suggestions());
        assert_eq!(session.answers().get("projectType"), Some(&Answer::single("intranet")));
        assert_eq!(session.answers().get("deadline"), Some(&Answer::single("urgent")));

        session.clear_ai_suggestions();
        assert!(session.answers().is_empty());
        assert!(!session.uses_ai_suggestions());
    }

    #[test]
    fn existing_name_is_not_overwritten_by_analysis() {
        let mut session = EstimationSession::default();
        session.set_project_name("Portail salariés");
        session.set_ai_analysis(analysis("file-1"));
        assert_eq!(session.project_name(), "Portail salariés");
    }

    #[test]
    fn removing_the_analysed_document_drops_the_analysis() {
        let mut session = EstimationSession::default();
        session.add_document(UploadedDocument { id: "file-1".into(), filename: "brief.pdf".into() });
        session.add_document(UploadedDocument { id: "file-2".into(), filename: "annexe.pdf".into() });
        session.set_ai_analysis(analysis("file-1"));

        session.remove_document("file-2");
        assert!(session.ai_analysis().is_some());

        session.remove_document("file-1");
        assert!(session.ai_analysis().is_none());
        assert!(session.documents().is_empty());
    }

    #[test]
    fn chat_turn_carries_history_and_analysis_context() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).single().expect("valid timestamp");
        let mut session = EstimationSession::default();

        let first = session.begin_chat_turn_at("Bonjour", at);
        assert_eq!(first.model, AssistantModel::Sonnet);
        assert!(first.system_prompt.contains("Aucun document analysé"));

        session.record_assistant_reply_at("Bonjour !", at);
        session.set_selected_model(AssistantModel::Haiku);
        session.set_ai_analysis(analysis("file-1"));

        let second = session.begin_chat_turn_at("Quels risques ?", at);
        assert_eq!(second.messages.len(), 3);
        assert_eq!(second.messages[1].role, MessageRole::Assistant);
        assert_eq!(second.model, AssistantModel::Haiku);
        assert!(second.system_prompt.contains("Intranet RH"));
        assert!(second.system_prompt.contains("7/10"));
        assert!(second.system_prompt.contains("Stack suggérée : A"));

        session.record_chat_error("rate limited");
        assert_eq!(session.chat_error(), Some("rate limited"));
        session.clear_conversation();
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn draft_requires_name_and_complete_answers() {
        let mut session = completed_session();
        assert_eq!(session.to_project_draft(), Err(DomainError::MissingProjectName));

        session.set_project_name("   ");
        assert_eq!(session.to_project_draft(), Err(DomainError::MissingProjectName));

        session.set_project_name("Site corporate");
        session.set_answer("security", Answer::single(""));
        assert_eq!(session.to_project_draft(), Err(DomainError::IncompleteQuestionnaire));
    }

    #[test]
    fn draft_and_restore_round_trip_reproduces_the_budget() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).single().expect("valid timestamp");
        let mut session = completed_session();
        session.set_project_name("Site corporate");
        session.set_tjm_override(&ProfileId::new("pm"), Decimal::from(800));
        session.set_discount_type(DiscountType::Percentage);
        session.set_discount_value(Decimal::from(5));
        session.add_document(UploadedDocument { id: "file-1".into(), filename: "brief.pdf".into() });

        let draft = session.to_project_draft().expect("draft builds");
        assert_eq!(draft.total_days, 28);
        assert_eq!(draft.status, ProjectStatus::Draft);
        assert_eq!(draft.documents, Some(vec!["file-1".to_string()]));
        assert!(draft.conversation_history.is_none());
        assert_eq!(draft.total_budget, session.detailed_budget().map(|b| b.total).unwrap_or_default());

        let project = Project::from_draft(ProjectId("p-1".to_string()), draft.clone(), at);
        let mut restored = EstimationSession::default();
        restored.load_profiles(profiles()).expect("profiles load");
        restored.restore_from_project(&project);

        assert_eq!(restored.saved_project_id(), Some(&ProjectId("p-1".to_string())));
        assert_eq!(restored.project_name(), "Site corporate");
        assert_eq!(restored.documents()[0].filename, "Document file-1");
        assert_eq!(restored.overrides().tjm.get(&ProfileId::new("pm")), Some(&Decimal::from(800)));
        assert!(restored.overrides().tjm.get(&ProfileId::new("dev")).is_none());

        let again = restored.to_project_draft().expect("restored draft builds");
        assert_eq!(again.total_budget, draft.total_budget);
        assert_eq!(again.final_budget, draft.final_budget);
        assert_eq!(again.budget_breakdown, draft.budget_breakdown);
    }

    #[test]
    fn restored_project_keeps_its_status_in_the_next_draft() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).single().expect("valid timestamp");
        let mut session = completed_session();
        session.set_project_name("Site corporate");
        let mut draft = session.to_project_draft().expect("draft builds");
        draft.status = ProjectStatus::Pending;
        let project = Project::from_draft(ProjectId("p-2".to_string()), draft, at);

        let mut restored = EstimationSession::default();
        restored.load_profiles(profiles()).expect("profiles load");
        restored.restore_from_project(&project);
        restored.set_project_name("Site corporate v2");

        let again = restored.to_project_draft().expect("restored draft builds");
        assert_eq!(again.status, ProjectStatus::Pending);
        assert_eq!(again.name, "Site corporate v2");
    }

    #[test]
    fn reset_keeps_profiles_and_reseeds_distribution() {
        let mut session = completed_session();
        session.set_project_name("Site corporate");
        session.set_distribution(ProfileId::new("dev"), Decimal::from(90));
        session.set_days_override(ProfileId::new("pm"), Decimal::from(3));
        session.mark_saved(ProjectId("p-9".to_string()));

        session.reset();

        assert_eq!(session.profiles().len(), 2);
        assert!(session.answers().is_empty());
        assert!(session.saved_project_id().is_none());
        assert!(!session.has_custom_days());
        assert_eq!(session.total_distribution_percentage(), Decimal::from(100));
        assert_eq!(session.current_step(), 0);
    }
}
