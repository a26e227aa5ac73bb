//! Identity resolution: turn a request's credentials into exactly one active
//! Client, or one specific failure. This is the heart of the two-tier
//! authentication scheme.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Client, InferenceClient};

/// Lookup surface the resolver needs from the entity store. Implemented for
/// the Postgres pool in production and by an in-memory table in tests.
#[async_trait]
pub trait PrincipalStore {
    async fn client_by_key(&self, key: &str) -> Result<Option<Client>, ApiError>;
    async fn client_by_id(&self, id: Uuid) -> Result<Option<Client>, ApiError>;
    async fn service_by_key(&self, key: &str) -> Result<Option<InferenceClient>, ApiError>;
}

/// Resolve the acting Client for a request.
///
/// Strict precedence, first match wins:
///
/// 1. Direct access: `api_key` matches a Client's `client_key`. An inactive
///    match fails rather than falling through. A caller presenting its own
///    valid key while claiming a different `client_id` is rejected.
/// 2. Service access: `api_key` matches an InferenceClient. Services have no
///    identity of their own to act as, so `client_id` is mandatory and names
///    the Client being acted for; the resolved principal is that target,
///    never the service.
/// 3. Neither table matched: invalid credentials.
///
/// Resolution is a pure function of the arguments and current store state;
/// nothing is cached between calls.
pub async fn resolve_client<S: PrincipalStore + ?Sized>(
    store: &S,
    api_key: &str,
    client_id: Option<&str>,
) -> Result<Client, ApiError> {
    // 1. Direct client access
    if let Some(client) = store.client_by_key(api_key).await? {
        if !client.is_active {
            return Err(ApiError::InactiveClient);
        }

        // X-Client-ID is redundant for direct access but must not conflict
        if let Some(claimed) = client_id {
            if client.id.to_string() != claimed {
                return Err(ApiError::IdentityMismatch);
            }
        }

        return Ok(client);
    }

    // 2. Service access (e.g. an orchestrator acting on behalf of a client)
    if let Some(service) = store.service_by_key(api_key).await? {
        if !service.is_active {
            return Err(ApiError::InactiveService);
        }

        let claimed = client_id.ok_or(ApiError::MissingTargetClient)?;

        // An unparseable id cannot name any client
        let target_id =
            Uuid::parse_str(claimed).map_err(|_| ApiError::TargetClientNotFound)?;

        let target = store
            .client_by_id(target_id)
            .await?
            .ok_or(ApiError::TargetClientNotFound)?;

        if !target.is_active {
            return Err(ApiError::InactiveClient);
        }

        return Ok(target);
    }

    // 3. Auth failed
    Err(ApiError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct MemoryStore {
        clients: Vec<Client>,
        services: Vec<InferenceClient>,
    }

    #[async_trait]
    impl PrincipalStore for MemoryStore {
        async fn client_by_key(&self, key: &str) -> Result<Option<Client>, ApiError> {
            Ok(self.clients.iter().find(|c| c.client_key == key).cloned())
        }

        async fn client_by_id(&self, id: Uuid) -> Result<Option<Client>, ApiError> {
            Ok(self.clients.iter().find(|c| c.id == id).cloned())
        }

        async fn service_by_key(&self, key: &str) -> Result<Option<InferenceClient>, ApiError> {
            Ok(self.services.iter().find(|s| s.api_key == key).cloned())
        }
    }

    fn client(name: &str, key: &str, active: bool) -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            name: name.to_string(),
            client_key: key.to_string(),
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(id: &str, key: &str, active: bool) -> InferenceClient {
        let now = Utc::now();
        InferenceClient {
            id: id.to_string(),
            api_key: key.to_string(),
            is_active: active,
            role: Some("admin".to_string()),
            max_sessions: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn store() -> MemoryStore {
        MemoryStore {
            clients: vec![
                client("Desktop A", "key-a", true),
                client("Desktop B", "key-b", true),
                client("Retired", "key-retired", false),
            ],
            services: vec![
                service("Orchestrator", "svc-key", true),
                service("OldOrchestrator", "svc-old", false),
            ],
        }
    }

    #[tokio::test]
    async fn direct_access_resolves_the_key_owner() {
        let s = store();
        let resolved = resolve_client(&s, "key-a", None).await.unwrap();
        assert_eq!(resolved.name, "Desktop A");
    }

    #[tokio::test]
    async fn direct_access_with_matching_id_resolves() {
        let s = store();
        let id = s.clients[0].id.to_string();
        let resolved = resolve_client(&s, "key-a", Some(&id)).await.unwrap();
        assert_eq!(resolved.name, "Desktop A");
    }

    #[tokio::test]
    async fn direct_access_with_foreign_id_is_a_mismatch() {
        let s = store();
        let other = s.clients[1].id.to_string();
        let err = resolve_client(&s, "key-a", Some(&other)).await.unwrap_err();
        assert!(matches!(err, ApiError::IdentityMismatch));
    }

    #[tokio::test]
    async fn inactive_client_fails_regardless_of_id_header() {
        let s = store();
        let err = resolve_client(&s, "key-retired", None).await.unwrap_err();
        assert!(matches!(err, ApiError::InactiveClient));

        let own_id = s.clients[2].id.to_string();
        let err = resolve_client(&s, "key-retired", Some(&own_id)).await.unwrap_err();
        assert!(matches!(err, ApiError::InactiveClient));
    }

    #[tokio::test]
    async fn service_without_target_is_rejected() {
        let s = store();
        let err = resolve_client(&s, "svc-key", None).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingTargetClient));
    }

    #[tokio::test]
    async fn service_resolves_the_target_client_not_itself() {
        let s = store();
        let target = s.clients[1].clone();
        let resolved = resolve_client(&s, "svc-key", Some(&target.id.to_string()))
            .await
            .unwrap();
        assert_eq!(resolved.id, target.id);
        assert_eq!(resolved.name, "Desktop B");
    }

    #[tokio::test]
    async fn service_with_unknown_target_fails() {
        let s = store();
        let ghost = Uuid::new_v4().to_string();
        let err = resolve_client(&s, "svc-key", Some(&ghost)).await.unwrap_err();
        assert!(matches!(err, ApiError::TargetClientNotFound));
    }

    #[tokio::test]
    async fn service_with_unparseable_target_fails_as_not_found() {
        let s = store();
        let err = resolve_client(&s, "svc-key", Some("not-a-uuid")).await.unwrap_err();
        assert!(matches!(err, ApiError::TargetClientNotFound));
    }

    #[tokio::test]
    async fn service_with_inactive_target_fails_as_inactive_client() {
        let s = store();
        let retired = s.clients[2].id.to_string();
        let err = resolve_client(&s, "svc-key", Some(&retired)).await.unwrap_err();
        assert!(matches!(err, ApiError::InactiveClient));
    }

    #[tokio::test]
    async fn inactive_service_fails_before_target_checks() {
        let s = store();
        let target = s.clients[0].id.to_string();
        let err = resolve_client(&s, "svc-old", Some(&target)).await.unwrap_err();
        assert!(matches!(err, ApiError::InactiveService));
    }

    #[tokio::test]
    async fn unknown_key_is_invalid_credentials() {
        let s = store();
        let err = resolve_client(&s, "who-dis", None).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }
}
