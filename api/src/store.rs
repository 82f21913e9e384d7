//! Repositories
//!
//! Storage traits for accounts, forms and responses, with in-memory
//! implementations used by the server binary and the tests.

use async_trait::async_trait;
use openforms_core::{Form, FormResponse};
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::User;

/// Repository failure.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// No such record.
    #[error("{0}")]
    NotFound(String),
    /// Record already exists.
    #[error("{0}")]
    Conflict(String),
    /// Backend failure.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Repository result.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Result of an atomic insert-if-absent on the email key.
#[derive(Debug, Clone)]
pub enum SignupOutcome {
    /// The account was stored.
    Created(User),
    /// An account with that email already exists; nothing was stored.
    AlreadyExists,
}

/// Account storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Looks up an account by normalised email.
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Stores `user` unless its email is taken.
    async fn create_unique(&self, user: User) -> RepoResult<SignupOutcome>;
}

/// Form storage
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Stores a new form.
    async fn insert(&self, form: Form) -> RepoResult<Form>;
    /// Forms of one creator, in creation order.
    async fn list_by_creator(&self, creator_id: &str) -> RepoResult<Vec<Form>>;
    /// A form, only if owned by `creator_id`.
    async fn find_owned(&self, form_id: &str, creator_id: &str) -> RepoResult<Option<Form>>;
    /// A form by id.
    async fn find(&self, form_id: &str) -> RepoResult<Option<Form>>;
    /// Removes a form. Its responses are kept.
    async fn delete(&self, form_id: &str) -> RepoResult<Form>;
}

/// Response storage
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Stores a submission.
    async fn insert(&self, response: FormResponse) -> RepoResult<FormResponse>;
    /// Submissions of one form, in arrival order.
    async fn list_by_form(&self, form_id: &str) -> RepoResult<Vec<FormResponse>>;
}

// ============ In-memory ============

/// In-memory account store keyed by email.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.users.read().get(email).cloned())
    }

    async fn create_unique(&self, user: User) -> RepoResult<SignupOutcome> {
        let mut users = self.users.write();
        if users.contains_key(&user.email) {
            return Ok(SignupOutcome::AlreadyExists);
        }
        users.insert(user.email.clone(), user.clone());
        Ok(SignupOutcome::Created(user))
    }
}

/// In-memory form store.
#[derive(Default)]
pub struct InMemoryFormRepository {
    forms: RwLock<Vec<Form>>,
}

impl InMemoryFormRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn insert(&self, form: Form) -> RepoResult<Form> {
        let mut forms = self.forms.write();
        if forms.iter().any(|f| f.id == form.id) {
            return Err(RepositoryError::Conflict(format!("Form {} already exists", form.id)));
        }
        forms.push(form.clone());
        Ok(form)
    }

    async fn list_by_creator(&self, creator_id: &str) -> RepoResult<Vec<Form>> {
        Ok(self
            .forms
            .read()
            .iter()
            .filter(|f| f.is_owned_by(creator_id))
            .cloned()
            .collect())
    }

    async fn find_owned(&self, form_id: &str, creator_id: &str) -> RepoResult<Option<Form>> {
        Ok(self
            .forms
            .read()
            .iter()
            .find(|f| f.id == form_id && f.is_owned_by(creator_id))
            .cloned())
    }

    async fn find(&self, form_id: &str) -> RepoResult<Option<Form>> {
        Ok(self.forms.read().iter().find(|f| f.id == form_id).cloned())
    }

    async fn delete(&self, form_id: &str) -> RepoResult<Form> {
        let mut forms = self.forms.write();
        let idx = forms
            .iter()
            .position(|f| f.id == form_id)
            .ok_or_else(|| RepositoryError::NotFound("Form not found".into()))?;
        Ok(forms.remove(idx))
    }
}

/// In-memory response store.
#[derive(Default)]
pub struct InMemoryResponseRepository {
    responses: RwLock<Vec<FormResponse>>,
}

impl InMemoryResponseRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseRepository for InMemoryResponseRepository {
    async fn insert(&self, response: FormResponse) -> RepoResult<FormResponse> {
        self.responses.write().push(response.clone());
        Ok(response)
    }

    async fn list_by_form(&self, form_id: &str) -> RepoResult<Vec<FormResponse>> {
        Ok(self
            .responses
            .read()
            .iter()
            .filter(|r| r.form_id == form_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openforms_core::{Field, FieldType, NewForm};
    use std::sync::Arc;

    fn form(creator: &str, title: &str) -> Form {
        Form::create(NewForm {
            creator_id: creator.into(),
            title: title.into(),
            fields: vec![Field::new("field-1", "Name", FieldType::Text)],
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_unique_is_atomic() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create_unique(User::new(format!("user{i}"), "same@example.com", "h".into()))
                    .await
                    .unwrap()
            }));
        }
        let mut created = 0;
        for h in handles {
            if matches!(h.await.unwrap(), SignupOutcome::Created(_)) {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_form_queries() {
        let repo = InMemoryFormRepository::new();
        let a = repo.insert(form("u1", "First")).await.unwrap();
        repo.insert(form("u2", "Other")).await.unwrap();
        let b = repo.insert(form("u1", "Second")).await.unwrap();

        let mine = repo.list_by_creator("u1").await.unwrap();
        assert_eq!(mine.iter().map(|f| f.id.clone()).collect::<Vec<_>>(), vec![a.id.clone(), b.id]);
        assert!(repo.find_owned(&a.id, "u2").await.unwrap().is_none());
        assert!(repo.find_owned(&a.id, "u1").await.unwrap().is_some());

        repo.delete(&a.id).await.unwrap();
        assert!(repo.find(&a.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(&a.id).await, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_responses_filtered_by_form() {
        let repo = InMemoryResponseRepository::new();
        let f1 = form("u1", "One");
        let f2 = form("u1", "Two");
        repo.insert(FormResponse::create(&f1, vec![])).await.unwrap();
        repo.insert(FormResponse::create(&f2, vec![])).await.unwrap();
        repo.insert(FormResponse::create(&f1, vec![])).await.unwrap();
        assert_eq!(repo.list_by_form(&f1.id).await.unwrap().len(), 2);
    }
}
