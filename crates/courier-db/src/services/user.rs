use courier_store::Database;
use courier_types::{User, Validate, ValidationCase};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{DbError, DbResult};
use crate::models::UserRecord;
use crate::store::DocumentStore;

/// Account management. Every user returned has its password stripped.
#[derive(Clone)]
pub struct UserService {
    store: DocumentStore<UserRecord>,
}

impl UserService {
    pub fn new(db: &dyn Database, config: StoreConfig) -> Self {
        Self {
            store: DocumentStore::new(db, config),
        }
    }

    pub fn store(&self) -> &DocumentStore<UserRecord> {
        &self.store
    }

    /// Register a user. The plain-text password is replaced by its hash.
    pub async fn create(&self, user: &User) -> DbResult<User> {
        user.validate(ValidationCase::Create)?;
        let mut user = user.clone();
        user.hash_password()?;
        let created = self.store.insert_one(&user).await?;
        info!(user_id = ?created.id, "user created");
        Ok(created.cleaned())
    }

    pub async fn find(&self, user: &User) -> DbResult<User> {
        Ok(self.store.find_one(user).await?.cleaned())
    }

    pub async fn find_all(&self, user: &User) -> DbResult<Vec<User>> {
        let users = self.store.find_many(user).await?;
        Ok(users.into_iter().map(User::cleaned).collect())
    }

    /// Update the user selected by id, or by email when no id is given.
    pub async fn update(&self, user: &User) -> DbResult<User> {
        user.validate(ValidationCase::Update)?;
        let selector = match (user.id, &user.email) {
            (Some(id), _) => User::with_id(id),
            (None, Some(email)) => User::with_email(email.clone()),
            (None, None) => return Err(DbError::Validation("missing the following user fields: id".into())),
        };
        let mut patch = user.clone();
        if patch.password.as_deref().is_some_and(|p| !p.is_empty()) {
            patch.hash_password()?;
        }
        Ok(self.store.update_one(&selector, &patch).await?.cleaned())
    }

    pub async fn delete(&self, user: &User) -> DbResult<User> {
        Ok(self.store.delete_one(user).await?.cleaned())
    }

    /// Store a fixture exactly as given.
    pub async fn doc_insert(&self, user: &User) -> DbResult<User> {
        self.store.insert_raw(user).await
    }

    /// Check a password against the user selected by email or username.
    ///
    /// An unknown user and a wrong password fail the same way.
    pub async fn authenticate(&self, credentials: &User) -> DbResult<User> {
        let password = credentials
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DbError::Validation("missing the following user fields: password".into()))?;
        let query = User {
            email: credentials.email.clone(),
            username: credentials.username.clone(),
            ..Default::default()
        };
        let stored = match self.store.find_one(&query).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                debug!("authentication for unknown user");
                return Err(DbError::Auth("invalid credentials".into()));
            }
            Err(e) => return Err(e),
        };
        stored.authenticate(password)?;
        Ok(stored.cleaned())
    }

    /// Create `admin` as the root administrator if no user exists yet.
    pub async fn ensure_root_admin(&self, admin: &User) -> DbResult<Option<User>> {
        if self.store.count(&User::default()).await? > 0 {
            return Ok(None);
        }
        let admin = User {
            root_admin: true,
            ..admin.clone()
        };
        let created = self.create(&admin).await?;
        info!(user_id = ?created.id, "root admin bootstrapped");
        Ok(Some(created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_store::InMemoryDatabase;

    fn service() -> UserService {
        UserService::new(&InMemoryDatabase::new(), StoreConfig::default())
    }

    fn ann() -> User {
        User {
            username: Some("ann".into()),
            email: Some("ann@example.com".into()),
            password: Some("hunter2".into()),
            phone: Some("555-0100".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_hashes_and_hides_password() {
        let users = service();
        let created = users.create(&ann()).await.unwrap();
        assert!(created.password.is_none());

        let raw = users.store().find_one(&User::with_id(created.id.unwrap())).await.unwrap();
        let hash = raw.password.unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn create_validates_first() {
        let users = service();
        let err = users.create(&User::with_email("x@y.z")).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let users = service();
        users.create(&ann()).await.unwrap();
        let mut twin = ann();
        twin.username = Some("ann2".into());
        assert!(matches!(users.create(&twin).await, Err(DbError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let users = service();
        users.create(&ann()).await.unwrap();

        let mut creds = User::with_email("ann@example.com");
        creds.password = Some("hunter2".into());
        let user = users.authenticate(&creds).await.unwrap();
        assert_eq!(user.username.as_deref(), Some("ann"));
        assert!(user.password.is_none());

        creds.password = Some("wrong".into());
        assert!(matches!(users.authenticate(&creds).await, Err(DbError::Auth(_))));

        let mut stranger = User::with_email("nobody@example.com");
        stranger.password = Some("hunter2".into());
        assert!(matches!(users.authenticate(&stranger).await, Err(DbError::Auth(_))));
    }

    #[tokio::test]
    async fn update_by_email_rehashes_password() {
        let users = service();
        users.create(&ann()).await.unwrap();

        let mut patch = User::with_email("ann@example.com");
        patch.password = Some("new-pass".into());
        users.update(&patch).await.unwrap();

        let mut creds = User::with_email("ann@example.com");
        creds.password = Some("new-pass".into());
        assert!(users.authenticate(&creds).await.is_ok());
    }

    #[tokio::test]
    async fn root_admin_bootstraps_once() {
        let users = service();
        let first = users.ensure_root_admin(&ann()).await.unwrap().unwrap();
        assert!(first.root_admin);

        let mut other = ann();
        other.email = Some("other@example.com".into());
        assert!(users.ensure_root_admin(&other).await.unwrap().is_none());
        assert_eq!(users.store().count(&User::default()).await.unwrap(), 1);
    }
}
