//! API client

use async_trait::async_trait;
use openforms_core::{
    Form, FormResponse, FormStore, NewForm, ResponseEntry, ResponseSink, StoreError,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
}

/// A signed-in user and their bearer token, persisted in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: UserView,
    pub token: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Transport(String),

    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("not logged in; run `openforms login` first")]
    NoSession,
}

impl From<ClientError> for String {
    fn from(e: ClientError) -> Self {
        e.to_string()
    }
}

impl From<ClientError> for StoreError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Rejected { message, .. } => StoreError::Rejected(message),
            ClientError::NoSession => StoreError::Rejected(ClientError::NoSession.to_string()),
            other => StoreError::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    message: String,
    success: bool,
    data: Option<T>,
    #[serde(default)]
    token: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, ClientError> {
        self.data
            .ok_or_else(|| ClientError::Decode(format!("no data in response: {}", self.message)))
    }
}

/// API client
#[derive(Clone)]
pub struct ApiClient {
    pub base_url: String,
    session: Option<Session>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Option<Session>,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            client,
        })
    }

    pub fn session(&self) -> Result<&Session, ClientError> {
        self.session.as_ref().ok_or(ClientError::NoSession)
    }

    /// Where a form can be fetched without signing in.
    pub fn share_url(&self, form_id: &str) -> String {
        self.url(&format!("/user/get_form/{}", form_id))
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserView, ClientError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        let req = self.client.post(self.url("/user/signup")).json(&body);
        self.send::<UserView>(req).await?.into_data()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let body = serde_json::json!({ "userData": { "email": email, "password": password } });
        let req = self.client.post(self.url("/user/login")).json(&body);
        let envelope = self.send::<UserView>(req).await?;
        let token = envelope
            .token
            .clone()
            .ok_or_else(|| ClientError::Decode("login response carried no token".into()))?;
        Ok(Session {
            user: envelope.into_data()?,
            token,
        })
    }

    pub async fn add_form(&self, form: &NewForm) -> Result<Form, ClientError> {
        let req = self.authed(self.client.post(self.url("/user/add_form")))?.json(form);
        self.send(req).await?.into_data()
    }

    pub async fn list_forms(&self, creator_id: &str) -> Result<Vec<Form>, ClientError> {
        let req = self.client.get(self.url(&format!("/user/get_forms/{}", creator_id)));
        self.send(req).await?.into_data()
    }

    pub async fn get_form(&self, form_id: &str) -> Result<Form, ClientError> {
        let req = self.client.get(self.share_url(form_id));
        self.send(req).await?.into_data()
    }

    pub async fn get_owned_form(
        &self,
        form_id: &str,
        creator_id: &str,
    ) -> Result<Form, ClientError> {
        let path = format!("/user/getA_form/{}/{}", form_id, creator_id);
        self.send(self.client.get(self.url(&path))).await?.into_data()
    }

    pub async fn delete_form(&self, form_id: &str) -> Result<Form, ClientError> {
        let path = format!("/user/delete_form/{}", form_id);
        let req = self.authed(self.client.delete(self.url(&path)))?;
        self.send(req).await?.into_data()
    }

    pub async fn submit_response(
        &self,
        form_id: &str,
        entries: &[ResponseEntry],
    ) -> Result<FormResponse, ClientError> {
        let body = serde_json::json!({ "formId": form_id, "responses": entries });
        let req = self.client.post(self.url("/user/add_response")).json(&body);
        self.send(req).await?.into_data()
    }

    pub async fn list_responses(&self, form_id: &str) -> Result<Vec<FormResponse>, ClientError> {
        let path = format!("/user/get_responses/{}", form_id);
        let req = self.authed(self.client.get(self.url(&path)))?;
        self.send(req).await?.into_data()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ClientError> {
        Ok(req.bearer_auth(&self.session()?.token))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, ClientError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        tracing::debug!(status = status.as_u16(), "api response");

        let envelope: Envelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ClientError::Rejected {
                    status: status.as_u16(),
                    message: text,
                })
            }
            Err(e) => return Err(ClientError::Decode(e.to_string())),
        };

        if !status.is_success() || !envelope.success {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message: envelope.message,
            });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl FormStore for ApiClient {
    async fn create_form(&self, form: &NewForm) -> Result<Form, StoreError> {
        Ok(self.add_form(form).await?)
    }
}

#[async_trait]
impl ResponseSink for ApiClient {
    async fn add_response(
        &self,
        form_id: &str,
        entries: &[ResponseEntry],
    ) -> Result<(), StoreError> {
        self.submit_response(form_id, entries).await?;
        Ok(())
    }
}
