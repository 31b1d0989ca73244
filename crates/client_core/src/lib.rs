use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::{
        AnalysisDetail, Analysis, HmmAnnotation, HmmStatus, IndexSummary, Reference, Release,
        SettingsDocument, Subtraction, UploadedFile, User,
    },
    protocol::{FindQuery, Page},
};
use tracing::debug;
use url::Url;

pub mod error;
pub mod push;

pub use error::ClientError;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// One method per remote operation used by the administration workflows.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn list_users(&self) -> ClientResult<Vec<User>>;
    async fn create_user(
        &self,
        user_id: &str,
        password: &str,
        force_reset: bool,
    ) -> ClientResult<User>;
    async fn set_password(&self, user_id: &str, password: &str) -> ClientResult<User>;
    async fn set_force_reset(&self, user_id: &str, enabled: bool) -> ClientResult<User>;
    async fn set_primary_group(&self, user_id: &str, group_id: &str) -> ClientResult<User>;
    async fn add_user_to_group(&self, user_id: &str, group_id: &str) -> ClientResult<User>;
    async fn remove_user_from_group(&self, user_id: &str, group_id: &str) -> ClientResult<User>;

    async fn find_hmms(&self, query: &FindQuery) -> ClientResult<Page<HmmAnnotation>>;
    async fn get_hmm(&self, hmm_id: &str) -> ClientResult<HmmAnnotation>;
    async fn install_hmms(&self) -> ClientResult<HmmStatus>;

    async fn find_analyses(
        &self,
        sample_id: &str,
        query: &FindQuery,
    ) -> ClientResult<Page<Analysis>>;
    async fn get_analysis(&self, analysis_id: &str) -> ClientResult<AnalysisDetail>;
    async fn blast_nuvs(&self, analysis_id: &str, sequence_index: u32) -> ClientResult<Value>;
    async fn list_ready_indexes(&self) -> ClientResult<Vec<IndexSummary>>;

    async fn find_references(&self, query: &FindQuery) -> ClientResult<Page<Reference>>;
    async fn get_reference(&self, ref_id: &str) -> ClientResult<Reference>;
    async fn check_remote_updates(&self, ref_id: &str) -> ClientResult<Release>;
    async fn update_remote_reference(&self, ref_id: &str) -> ClientResult<Reference>;

    async fn find_subtractions(&self, query: &FindQuery) -> ClientResult<Page<Subtraction>>;
    async fn get_subtraction(&self, subtraction_id: &str) -> ClientResult<Subtraction>;

    async fn get_settings(&self) -> ClientResult<SettingsDocument>;
    async fn update_settings(&self, update: &SettingsDocument) -> ClientResult<SettingsDocument>;

    async fn find_files(
        &self,
        file_type: &str,
        query: &FindQuery,
    ) -> ClientResult<Page<UploadedFile>>;
    async fn remove_file(&self, file_id: &str) -> ClientResult<()>;
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: String,
    pub api_key: String,
}

#[derive(Serialize)]
struct CreateUserRequest<'a> {
    user_id: &'a str,
    password: &'a str,
    force_reset: bool,
}

#[derive(Serialize)]
struct PasswordUpdate<'a> {
    password: &'a str,
}

#[derive(Serialize)]
struct ForceResetUpdate {
    force_reset: bool,
}

#[derive(Serialize)]
struct PrimaryGroupUpdate<'a> {
    primary_group: &'a str,
}

#[derive(Serialize)]
struct GroupMembershipRequest<'a> {
    group_id: &'a str,
}

#[derive(Serialize)]
struct FileFindQuery<'a> {
    #[serde(rename = "type")]
    file_type: &'a str,
    #[serde(flatten)]
    query: &'a FindQuery,
}

/// `ApiClient` backed by the platform's JSON REST API under `{server_url}/api`.
pub struct HttpApiClient {
    http: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl HttpApiClient {
    pub fn new(server_url: &str) -> ClientResult<Self> {
        Self::with_credentials(server_url, None)
    }

    pub fn with_credentials(
        server_url: &str,
        credentials: Option<Credentials>,
    ) -> ClientResult<Self> {
        let base_url = Url::parse(server_url)
            .map_err(|err| ClientError::InvalidUrl(format!("{server_url}: {err}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "{server_url}: expected an http:// or https:// url"
            )));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            credentials,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "api request");
        let builder = self.http.request(method, url);
        Ok(match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(&credentials.user_id, Some(&credentials.api_key))
            }
            None => builder,
        })
    }

    async fn execute(&self, request: RequestBuilder) -> ClientResult<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::from_response(
                status,
                &String::from_utf8_lossy(&body),
            ));
        }
        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.fetch(self.request(Method::GET, &["users"])?).await
    }

    async fn create_user(
        &self,
        user_id: &str,
        password: &str,
        force_reset: bool,
    ) -> ClientResult<User> {
        let request = self
            .request(Method::POST, &["users"])?
            .json(&CreateUserRequest {
                user_id,
                password,
                force_reset,
            });
        self.fetch(request).await
    }

    async fn set_password(&self, user_id: &str, password: &str) -> ClientResult<User> {
        let request = self
            .request(Method::PATCH, &["users", user_id])?
            .json(&PasswordUpdate { password });
        self.fetch(request).await
    }

    async fn set_force_reset(&self, user_id: &str, enabled: bool) -> ClientResult<User> {
        let request = self
            .request(Method::PATCH, &["users", user_id])?
            .json(&ForceResetUpdate {
                force_reset: enabled,
            });
        self.fetch(request).await
    }

    async fn set_primary_group(&self, user_id: &str, group_id: &str) -> ClientResult<User> {
        let request = self
            .request(Method::PATCH, &["users", user_id])?
            .json(&PrimaryGroupUpdate {
                primary_group: group_id,
            });
        self.fetch(request).await
    }

    async fn add_user_to_group(&self, user_id: &str, group_id: &str) -> ClientResult<User> {
        let request = self
            .request(Method::POST, &["users", user_id, "groups"])?
            .json(&GroupMembershipRequest { group_id });
        self.fetch(request).await
    }

    async fn remove_user_from_group(&self, user_id: &str, group_id: &str) -> ClientResult<User> {
        self.fetch(self.request(Method::DELETE, &["users", user_id, "groups", group_id])?)
            .await
    }

    async fn find_hmms(&self, query: &FindQuery) -> ClientResult<Page<HmmAnnotation>> {
        self.fetch(self.request(Method::GET, &["hmms"])?.query(query))
            .await
    }

    async fn get_hmm(&self, hmm_id: &str) -> ClientResult<HmmAnnotation> {
        self.fetch(self.request(Method::GET, &["hmms", hmm_id])?)
            .await
    }

    async fn install_hmms(&self) -> ClientResult<HmmStatus> {
        self.fetch(self.request(Method::POST, &["hmms", "status", "updates"])?)
            .await
    }

    async fn find_analyses(
        &self,
        sample_id: &str,
        query: &FindQuery,
    ) -> ClientResult<Page<Analysis>> {
        let request = self
            .request(Method::GET, &["samples", sample_id, "analyses"])?
            .query(query);
        self.fetch(request).await
    }

    async fn get_analysis(&self, analysis_id: &str) -> ClientResult<AnalysisDetail> {
        self.fetch(self.request(Method::GET, &["analyses", analysis_id])?)
            .await
    }

    async fn blast_nuvs(&self, analysis_id: &str, sequence_index: u32) -> ClientResult<Value> {
        let index = sequence_index.to_string();
        self.fetch(self.request(Method::PUT, &["analyses", analysis_id, &index, "blast"])?)
            .await
    }

    async fn list_ready_indexes(&self) -> ClientResult<Vec<IndexSummary>> {
        let request = self
            .request(Method::GET, &["indexes"])?
            .query(&[("ready", "true")]);
        self.fetch(request).await
    }

    async fn find_references(&self, query: &FindQuery) -> ClientResult<Page<Reference>> {
        self.fetch(self.request(Method::GET, &["refs"])?.query(query))
            .await
    }

    async fn get_reference(&self, ref_id: &str) -> ClientResult<Reference> {
        self.fetch(self.request(Method::GET, &["refs", ref_id])?)
            .await
    }

    async fn check_remote_updates(&self, ref_id: &str) -> ClientResult<Release> {
        self.fetch(self.request(Method::GET, &["refs", ref_id, "release"])?)
            .await
    }

    async fn update_remote_reference(&self, ref_id: &str) -> ClientResult<Reference> {
        self.fetch(self.request(Method::POST, &["refs", ref_id, "updates"])?)
            .await
    }

    async fn find_subtractions(&self, query: &FindQuery) -> ClientResult<Page<Subtraction>> {
        self.fetch(self.request(Method::GET, &["subtractions"])?.query(query))
            .await
    }

    async fn get_subtraction(&self, subtraction_id: &str) -> ClientResult<Subtraction> {
        self.fetch(self.request(Method::GET, &["subtractions", subtraction_id])?)
            .await
    }

    async fn get_settings(&self) -> ClientResult<SettingsDocument> {
        self.fetch(self.request(Method::GET, &["settings"])?)
            .await
    }

    async fn update_settings(&self, update: &SettingsDocument) -> ClientResult<SettingsDocument> {
        self.fetch(self.request(Method::PATCH, &["settings"])?.json(update))
            .await
    }

    async fn find_files(
        &self,
        file_type: &str,
        query: &FindQuery,
    ) -> ClientResult<Page<UploadedFile>> {
        let request = self
            .request(Method::GET, &["files"])?
            .query(&FileFindQuery { file_type, query });
        self.fetch(request).await
    }

    async fn remove_file(&self, file_id: &str) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, &["files", file_id])?)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
