use std::collections::HashMap;

use tokio::sync::RwLock;

use stackwise_core::domain::profile::{ProfileId, TjmProfile};
use stackwise_core::domain::project::{Project, ProjectDraft, ProjectId, ProjectStatus};

use super::{new_project_id, now, ProfileRepository, ProjectRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryProjectRepository {
    projects: RwLock<HashMap<String, Project>>,
}

#[async_trait::async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let projects = self.projects.read().await;
        let mut listed: Vec<Project> = projects.values().cloned().collect();
        listed.sort_by(|a, b| b.date_created.cmp(&a.date_created).then_with(|| b.id.0.cmp(&a.id.0)));
        Ok(listed)
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let projects = self.projects.read().await;
        Ok(projects.get(&id.0).cloned())
    }

    async fn create(&self, draft: ProjectDraft) -> Result<Project, RepositoryError> {
        let project = Project::from_draft(new_project_id(), draft, now());
        let mut projects = self.projects.write().await;
        projects.insert(project.id.0.clone(), project.clone());
        Ok(project)
    }

    async fn update(
        &self,
        id: &ProjectId,
        draft: ProjectDraft,
    ) -> Result<Option<Project>, RepositoryError> {
        let mut projects = self.projects.write().await;
        let Some(project) = projects.get_mut(&id.0) else {
            return Ok(None);
        };
        project.record = draft;
        project.date_updated = now();
        Ok(Some(project.clone()))
    }

    async fn update_status(
        &self,
        id: &ProjectId,
        status: ProjectStatus,
    ) -> Result<Option<Project>, RepositoryError> {
        let mut projects = self.projects.write().await;
        let Some(project) = projects.get_mut(&id.0) else {
            return Ok(None);
        };
        project.transition_to(status)?;
        project.date_updated = now();
        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool, RepositoryError> {
        let mut projects = self.projects.write().await;
        Ok(projects.remove(&id.0).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<String, TjmProfile>>,
}

impl InMemoryProfileRepository {
    pub fn with_profiles(profiles: impl IntoIterator<Item = TjmProfile>) -> Self {
        let profiles = profiles.into_iter().map(|profile| (profile.id.0.clone(), profile)).collect();
        Self { profiles: RwLock::new(profiles) }
    }
}

#[async_trait::async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn list(&self) -> Result<Vec<TjmProfile>, RepositoryError> {
        let profiles = self.profiles.read().await;
        let mut listed: Vec<TjmProfile> = profiles.values().cloned().collect();
        listed.sort_by(|a, b| a.sort.cmp(&b.sort).then_with(|| a.id.cmp(&b.id)));
        Ok(listed)
    }

    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<TjmProfile>, RepositoryError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(&id.0).cloned())
    }

    async fn save(&self, profile: TjmProfile) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.id.0.clone(), profile);
        Ok(())
    }

    async fn delete(&self, id: &ProfileId) -> Result<bool, RepositoryError> {
        let mut profiles = self.profiles.write().await;
        Ok(profiles.remove(&id.0).is_some())
    }
}
