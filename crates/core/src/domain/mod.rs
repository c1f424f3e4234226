pub mod analysis;
pub mod answers;
pub mod profile;
pub mod project;
pub mod questionnaire;
pub mod stack;
