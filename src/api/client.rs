use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use crate::config::AdminConfig;
use crate::error::{AdminError, Result};
use crate::session::{LoginResponse, SessionStore, UserProfile};

/// Called after an authenticated request was rejected and the session cleared.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Client for the admin REST API.
///
/// Every backend call goes through [`ApiClient::execute`], which attaches the
/// session credential and turns a rejected credential into a global logout.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            session,
            on_unauthorized: None,
        }
    }

    /// Client over HTTP using the configured base URL and timeout.
    pub fn from_config(config: &AdminConfig, session: Arc<SessionStore>) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), session))
    }

    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Sends a request and returns the successful response.
    ///
    /// A 401 on a request that carried a credential logs the session out,
    /// fires the unauthorized hook and yields [`AdminError::SessionExpired`].
    /// Other non-2xx statuses become [`AdminError::Api`].
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.dispatch(request, true).await
    }

    /// Shared send path. Anonymous requests never carry the stored
    /// credential, so their 401 is an ordinary API error.
    async fn dispatch(&self, mut request: ApiRequest, authenticated: bool) -> Result<ApiResponse> {
        request.bearer = if authenticated {
            self.session.credential()
        } else {
            None
        };
        let carried_credential = request.bearer.is_some();
        let method = request.method.clone();
        let path = request.path.clone();

        tracing::debug!("{} {}", method, path);
        let response = self.transport.send(request).await?;
        tracing::debug!("{} {} -> {}", method, path, response.status);

        if response.is_success() {
            return Ok(response);
        }

        if response.status == 401 && carried_credential {
            tracing::warn!("Credential rejected by {} {}, logging out", method, path);
            self.session.logout();
            if let Some(hook) = self.on_unauthorized.as_ref() {
                hook();
            }
            return Err(AdminError::SessionExpired);
        }

        Err(AdminError::Api {
            status: response.status,
            message: response.error_message().unwrap_or_default(),
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.execute(request).await?.decode()
    }

    /// Executes a request whose response body is not needed.
    pub async fn send_discard(&self, request: ApiRequest) -> Result<()> {
        self.execute(request).await.map(|_| ())
    }

    /// Exchanges username and password for a credential and stores it.
    ///
    /// The session is in its loading state while the call is outstanding.
    /// On failure the user-facing message is kept on the session and
    /// returned as [`AdminError::InvalidCredentials`] for rejected logins.
    ///
    /// The login call is sent without the stored credential, so a rejected
    /// password is never treated as an expired session.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        self.session.begin_login();

        let result = async {
            let request = ApiRequest::post("/auth/login").json(&LoginRequest { username, password })?;
            self.dispatch(request, false).await?.decode::<LoginResponse>()
        }
        .await;

        match result {
            Ok(response) => self.session.complete_login(response),
            Err(e) => {
                let message = e.user_message("Failed to login");
                self.session.fail_login(message.clone());
                match e {
                    AdminError::Api { .. } => Err(AdminError::InvalidCredentials(message)),
                    other => Err(other),
                }
            }
        }
    }

    /// Clears the session; there is no server-side logout endpoint.
    pub fn logout(&self) {
        self.session.logout();
    }
}
