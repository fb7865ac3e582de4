//! Account helper: keeps the bearer credential and the user profile in
//! the same key-value store as the chat sessions.
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::core::{ApiError, AppConfig, Mode};
use crate::openai::ApiClient;
use crate::storage::KvStore;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user";

pub const MOCK_TOKEN: &str = "mock_token_for_development";
pub const MOCK_EMAIL: &str = "test@example.com";
pub const MOCK_PASSWORD: &str = "password";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    fn mock() -> Self {
        Self {
            id: String::from("1"),
            name: String::from("测试用户"),
            email: MOCK_EMAIL.to_string(),
            avatar: Some(String::from(
                "https://api.dicebear.com/7.x/avataaars/svg?seed=test",
            )),
        }
    }
}

/// Partial profile update, unset fields are left alone.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(avatar) = &self.avatar {
            user.avatar = Some(avatar.clone());
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
    user: User,
}

#[derive(Deserialize)]
struct ProfileResponse {
    user: User,
}

enum Backend {
    /// Development mode, a single hard coded account
    Mock,
    Remote(ApiClient),
}

pub struct AuthService {
    kv: Arc<dyn KvStore>,
    backend: Backend,
}

impl AuthService {
    pub fn mock(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            backend: Backend::Mock,
        }
    }

    pub fn remote(kv: Arc<dyn KvStore>, client: ApiClient) -> Self {
        Self {
            kv,
            backend: Backend::Remote(client),
        }
    }

    pub fn from_config(config: &AppConfig, kv: Arc<dyn KvStore>) -> Result<Self, ApiError> {
        match &config.mode {
            Mode::Live(api) if !config.dev => Ok(Self::remote(kv, ApiClient::new(api)?)),
            _ => Ok(Self::mock(kv)),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        self.authenticate("/auth/login", None, email, password)
            .await
            .inspect_err(|e| tracing::error!("Login failed: {:#}", e))
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        self.authenticate("/auth/register", Some(name), email, password)
            .await
            .inspect_err(|e| tracing::error!("Registration failed: {:#}", e))
    }

    async fn authenticate(
        &self,
        path: &str,
        name: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let (token, user) = match &self.backend {
            Backend::Mock => {
                let mut user = User::mock();
                match name {
                    // Registration accepts anyone
                    Some(name) => {
                        user.name = name.to_string();
                        user.email = email.to_string();
                    }
                    None if email == MOCK_EMAIL && password == MOCK_PASSWORD => {}
                    None => bail!("邮箱或密码错误"),
                }
                (MOCK_TOKEN.to_string(), user)
            }
            Backend::Remote(client) => {
                let creds = Credentials {
                    name,
                    email,
                    password,
                };
                let resp: AuthResponse = client.post(path, &creds).await?;
                (resp.token, resp.user)
            }
        };
        self.save(&token, &user)?;
        tracing::info!("Signed in as {}", user.email);
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.kv.delete(TOKEN_KEY)?;
        self.kv.delete(USER_KEY)?;
        Ok(())
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.kv.get(TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token()?.is_some_and(|t| !t.is_empty()))
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        match self.kv.get(USER_KEY)? {
            Some(data) => Ok(Some(
                serde_json::from_str(&data).context("Corrupted user record")?,
            )),
            None => Ok(None),
        }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let user = match &self.backend {
            Backend::Mock => {
                let mut user = self.current_user()?.ok_or_else(|| anyhow!("用户未登录"))?;
                update.apply(&mut user);
                user
            }
            Backend::Remote(client) => {
                let resp: ProfileResponse = client.put("/auth/profile", update).await?;
                resp.user
            }
        };
        self.kv
            .set(USER_KEY, &serde_json::to_string(&user)?)
            .inspect_err(|e| tracing::error!("Failed to update user profile: {:#}", e))?;
        Ok(user)
    }

    fn save(&self, token: &str, user: &User) -> Result<()> {
        self.kv.set(TOKEN_KEY, token)?;
        self.kv.set(USER_KEY, &serde_json::to_string(user)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::ApiSettings;
    use crate::storage::MemoryStore;

    fn mock_service() -> AuthService {
        AuthService::mock(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_mock_login() {
        let auth = mock_service();
        assert!(!auth.is_authenticated().unwrap());

        let user = auth.login(MOCK_EMAIL, MOCK_PASSWORD).await.unwrap();
        assert_eq!(user.name, "测试用户");
        assert!(auth.is_authenticated().unwrap());
        assert_eq!(auth.token().unwrap().as_deref(), Some(MOCK_TOKEN));
        assert_eq!(auth.current_user().unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_mock_login_rejects_wrong_password() {
        let auth = mock_service();
        let err = auth.login(MOCK_EMAIL, "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "邮箱或密码错误");
        assert!(!auth.is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_mock_register_and_logout() {
        let auth = mock_service();
        let user = auth.register("小明", "ming@example.com", "pw").await.unwrap();
        assert_eq!(user.name, "小明");
        assert_eq!(user.email, "ming@example.com");

        auth.logout().unwrap();
        assert!(!auth.is_authenticated().unwrap());
        assert_eq!(auth.current_user().unwrap(), None);
        // Logging out twice is fine
        auth.logout().unwrap();
    }

    #[tokio::test]
    async fn test_mock_update_profile() {
        let auth = mock_service();
        let update = ProfileUpdate {
            name: Some(String::from("新名字")),
            ..Default::default()
        };
        let err = auth.update_profile(&update).await.unwrap_err();
        assert_eq!(err.to_string(), "用户未登录");

        auth.login(MOCK_EMAIL, MOCK_PASSWORD).await.unwrap();
        let user = auth.update_profile(&update).await.unwrap();
        assert_eq!(user.name, "新名字");
        assert_eq!(user.email, MOCK_EMAIL);
        assert_eq!(auth.current_user().unwrap().unwrap().name, "新名字");
    }

    fn remote_service(server: &mockito::Server, kv: Arc<dyn KvStore>) -> AuthService {
        let client = ApiClient::new(&ApiSettings {
            base_url: server.url(),
            api_key: String::from("sk-test"),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        AuthService::remote(kv, client)
    }

    #[tokio::test]
    async fn test_remote_login() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/login")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "email": "a@b.c",
                "password": "secret"
            })))
            .with_status(200)
            .with_body(r#"{"token":"tok-1","user":{"id":"9","name":"A","email":"a@b.c"}}"#)
            .create_async()
            .await;

        let auth = remote_service(&server, Arc::new(MemoryStore::new()));

        let user = auth.login("a@b.c", "secret").await.unwrap();
        mock.assert_async().await;
        assert_eq!(user.id, "9");
        assert_eq!(user.avatar, None);
        assert_eq!(auth.token().unwrap().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_remote_register() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/register")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "name": "小明",
                "email": "ming@example.com",
                "password": "secret"
            })))
            .with_status(200)
            .with_body(
                r#"{"token":"tok-2","user":{"id":"7","name":"小明","email":"ming@example.com"}}"#,
            )
            .create_async()
            .await;

        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let auth = remote_service(&server, Arc::clone(&kv));

        let user = auth
            .register("小明", "ming@example.com", "secret")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(user.id, "7");
        assert_eq!(kv.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-2"));
        let stored: User = serde_json::from_str(&kv.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, user);
    }

    #[tokio::test]
    async fn test_remote_update_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/auth/profile")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "name": "新名字",
                "avatar": "https://example.com/a.png"
            })))
            .with_status(200)
            .with_body(
                serde_json::json!({"user": {
                    "id": "7",
                    "name": "新名字",
                    "email": "ming@example.com",
                    "avatar": "https://example.com/a.png"
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let auth = remote_service(&server, Arc::clone(&kv));
        let update = ProfileUpdate {
            name: Some(String::from("新名字")),
            avatar: Some(String::from("https://example.com/a.png")),
            ..Default::default()
        };

        let user = auth.update_profile(&update).await.unwrap();
        mock.assert_async().await;
        assert_eq!(user.name, "新名字");
        assert_eq!(user.avatar.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(auth.current_user().unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_remote_login_failure_keeps_state() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/login")
            .with_status(401)
            .create_async()
            .await;

        let auth = remote_service(&server, Arc::new(MemoryStore::new()));

        assert!(auth.login("a@b.c", "wrong").await.is_err());
        assert!(!auth.is_authenticated().unwrap());
    }
}
