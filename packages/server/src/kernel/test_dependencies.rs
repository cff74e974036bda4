// TestDependencies - mock implementations for testing
//
// Provides in-memory services that can be injected into ServerDeps and the
// session monitor for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use super::{
    BaseConfigStore, BaseIdentityAdmin, BaseProfileStore, IdentityRecord, NewIdentity, ServerDeps,
};
use crate::domains::provisioning::models::ProfileUpsert;
use crate::domains::provisioning::saga::FailurePolicy;
use crate::domains::provisioning::types::AdminBootstrapSettings;
use crate::domains::session::{InactivityNotice, SessionHost};

// =============================================================================
// Mock Identity Provider
// =============================================================================

pub struct MockIdentityAdmin {
    users: Arc<Mutex<Vec<IdentityRecord>>>,
    create_calls: Arc<Mutex<Vec<NewIdentity>>>,
    delete_calls: Arc<Mutex<Vec<Uuid>>>,
    sign_out_calls: Arc<Mutex<Vec<String>>>,
    failing_deletes: Arc<Mutex<HashSet<Uuid>>>,
    create_error: Arc<Mutex<Option<String>>>,
    fail_list: Arc<Mutex<bool>>,
    fail_sign_out: Arc<Mutex<bool>>,
}

impl MockIdentityAdmin {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
            create_calls: Arc::new(Mutex::new(Vec::new())),
            delete_calls: Arc::new(Mutex::new(Vec::new())),
            sign_out_calls: Arc::new(Mutex::new(Vec::new())),
            failing_deletes: Arc::new(Mutex::new(HashSet::new())),
            create_error: Arc::new(Mutex::new(None)),
            fail_list: Arc::new(Mutex::new(false)),
            fail_sign_out: Arc::new(Mutex::new(false)),
        }
    }

    /// Seed an existing identity
    pub fn with_user(self, email: &str) -> Self {
        self.users.lock().unwrap().push(IdentityRecord {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        });
        self
    }

    /// Make every create call fail with this provider message
    pub fn with_create_error(self, message: &str) -> Self {
        *self.create_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn with_failing_list(self) -> Self {
        *self.fail_list.lock().unwrap() = true;
        self
    }

    pub fn with_failing_sign_out(self) -> Self {
        *self.fail_sign_out.lock().unwrap() = true;
        self
    }

    /// Make deletes of this identity fail
    pub fn fail_delete_of(&self, user_id: Uuid) {
        self.failing_deletes.lock().unwrap().insert(user_id);
    }

    pub fn users(&self) -> Vec<IdentityRecord> {
        self.users.lock().unwrap().clone()
    }

    pub fn find_by_email(&self, email: &str) -> Option<IdentityRecord> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| email_matches(u, email))
            .cloned()
    }

    pub fn exists(&self, user_id: Uuid) -> bool {
        self.users.lock().unwrap().iter().any(|u| u.id == user_id)
    }

    pub fn create_calls(&self) -> Vec<NewIdentity> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<Uuid> {
        self.delete_calls.lock().unwrap().clone()
    }

    pub fn sign_out_calls(&self) -> Vec<String> {
        self.sign_out_calls.lock().unwrap().clone()
    }
}

impl Default for MockIdentityAdmin {
    fn default() -> Self {
        Self::new()
    }
}

fn email_matches(user: &IdentityRecord, email: &str) -> bool {
    user.email
        .as_deref()
        .is_some_and(|e| e.eq_ignore_ascii_case(email))
}

#[async_trait]
impl BaseIdentityAdmin for MockIdentityAdmin {
    async fn create_user(&self, new_identity: NewIdentity) -> Result<IdentityRecord> {
        self.create_calls.lock().unwrap().push(new_identity.clone());

        if let Some(message) = self.create_error.lock().unwrap().clone() {
            return Err(anyhow!(message));
        }

        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| email_matches(u, &new_identity.email)) {
            return Err(anyhow!(
                "A user with this email address has already been registered"
            ));
        }

        let record = IdentityRecord {
            id: Uuid::new_v4(),
            email: Some(new_identity.email),
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn list_users(&self) -> Result<Vec<IdentityRecord>> {
        if *self.fail_list.lock().unwrap() {
            return Err(anyhow!("Database error finding users"));
        }
        Ok(self.users())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        self.delete_calls.lock().unwrap().push(user_id);

        if self.failing_deletes.lock().unwrap().contains(&user_id) {
            return Err(anyhow!("Database error deleting user"));
        }

        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != user_id);
        if users.len() == before {
            return Err(anyhow!("User not found"));
        }
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.sign_out_calls
            .lock()
            .unwrap()
            .push(access_token.to_string());

        if *self.fail_sign_out.lock().unwrap() {
            return Err(anyhow!("Session not found"));
        }
        Ok(())
    }
}

// =============================================================================
// Mock Profile Store
// =============================================================================

/// In-memory profile store. Enforces the same uniqueness rule as the real
/// `profiles.cpf` column so constraint failures can be exercised.
pub struct MockProfileStore {
    profiles: Arc<Mutex<HashMap<Uuid, ProfileUpsert>>>,
    memberships: Arc<Mutex<HashSet<(Uuid, Uuid)>>>,
    roles: Arc<Mutex<HashSet<(Uuid, String)>>>,
    fail_profiles: Arc<Mutex<bool>>,
    fail_memberships: Arc<Mutex<bool>>,
    fail_roles: Arc<Mutex<bool>>,
    fail_ping: Arc<Mutex<bool>>,
    fail_profile_deletes: Arc<Mutex<bool>>,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(Mutex::new(HashMap::new())),
            memberships: Arc::new(Mutex::new(HashSet::new())),
            roles: Arc::new(Mutex::new(HashSet::new())),
            fail_profiles: Arc::new(Mutex::new(false)),
            fail_memberships: Arc::new(Mutex::new(false)),
            fail_roles: Arc::new(Mutex::new(false)),
            fail_ping: Arc::new(Mutex::new(false)),
            fail_profile_deletes: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failing_profiles(self) -> Self {
        *self.fail_profiles.lock().unwrap() = true;
        self
    }

    pub fn with_failing_memberships(self) -> Self {
        *self.fail_memberships.lock().unwrap() = true;
        self
    }

    pub fn with_failing_roles(self) -> Self {
        *self.fail_roles.lock().unwrap() = true;
        self
    }

    pub fn with_failing_ping(self) -> Self {
        *self.fail_ping.lock().unwrap() = true;
        self
    }

    pub fn with_failing_profile_deletes(self) -> Self {
        *self.fail_profile_deletes.lock().unwrap() = true;
        self
    }

    /// Seed a profile row directly, bypassing the failure switches
    pub fn seed_profile(&self, profile: ProfileUpsert) {
        self.profiles.lock().unwrap().insert(profile.id, profile);
    }

    pub fn profile(&self, user_id: Uuid) -> Option<ProfileUpsert> {
        self.profiles.lock().unwrap().get(&user_id).cloned()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    pub fn memberships_of(&self, user_id: Uuid) -> Vec<Uuid> {
        let mut churches: Vec<Uuid> = self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, c)| *c)
            .collect();
        churches.sort();
        churches
    }

    pub fn has_role(&self, user_id: Uuid, role: &str) -> bool {
        self.roles
            .lock()
            .unwrap()
            .contains(&(user_id, role.to_string()))
    }
}

impl Default for MockProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseProfileStore for MockProfileStore {
    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<()> {
        if *self.fail_profiles.lock().unwrap() {
            return Err(anyhow!("connection to profile store lost"));
        }

        let mut profiles = self.profiles.lock().unwrap();
        if let Some(cpf) = &profile.cpf {
            let taken = profiles
                .values()
                .any(|p| p.id != profile.id && p.cpf.as_ref() == Some(cpf));
            if taken {
                return Err(anyhow!(
                    "duplicate key value violates unique constraint \"profiles_cpf_key\""
                ));
            }
        }

        profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn profile_exists(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.profiles.lock().unwrap().contains_key(&user_id))
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<()> {
        if *self.fail_profile_deletes.lock().unwrap() {
            return Err(anyhow!("canceling statement due to statement timeout"));
        }
        self.profiles.lock().unwrap().remove(&user_id);
        // Same as the ON DELETE CASCADE on user_churches
        self.memberships
            .lock()
            .unwrap()
            .retain(|(member, _)| *member != user_id);
        Ok(())
    }

    async fn insert_memberships(&self, user_id: Uuid, church_ids: &[Uuid]) -> Result<u64> {
        if *self.fail_memberships.lock().unwrap() {
            return Err(anyhow!(
                "insert or update on table \"user_churches\" violates foreign key constraint"
            ));
        }

        let mut memberships = self.memberships.lock().unwrap();
        let inserted = church_ids
            .iter()
            .filter(|church_id| memberships.insert((user_id, **church_id)))
            .count();
        Ok(inserted as u64)
    }

    async fn delete_memberships(&self, user_id: Uuid, church_ids: &[Uuid]) -> Result<u64> {
        let mut memberships = self.memberships.lock().unwrap();
        let removed = church_ids
            .iter()
            .filter(|church_id| memberships.remove(&(user_id, **church_id)))
            .count();
        Ok(removed as u64)
    }

    async fn upsert_role(&self, user_id: Uuid, role: &str) -> Result<()> {
        if *self.fail_roles.lock().unwrap() {
            return Err(anyhow!("permission denied for table user_roles"));
        }
        self.roles
            .lock()
            .unwrap()
            .insert((user_id, role.to_string()));
        Ok(())
    }

    async fn delete_roles(&self, user_id: Uuid) -> Result<u64> {
        let mut roles = self.roles.lock().unwrap();
        let before = roles.len();
        roles.retain(|(member, _)| *member != user_id);
        Ok((before - roles.len()) as u64)
    }

    async fn ping(&self) -> Result<()> {
        if *self.fail_ping.lock().unwrap() {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }
}

// =============================================================================
// Mock Config Store
// =============================================================================

pub struct MockConfigStore {
    values: HashMap<String, String>,
    failing: bool,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            failing: false,
        }
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn failing() -> Self {
        Self {
            values: HashMap::new(),
            failing: true,
        }
    }
}

impl Default for MockConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseConfigStore for MockConfigStore {
    async fn get_values(&self, keys: &[&str]) -> Result<HashMap<String, String>> {
        if self.failing {
            return Err(anyhow!("relation \"system_config\" does not exist"));
        }
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.values
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect())
    }
}

// =============================================================================
// Mock Session Host
// =============================================================================

/// Records what the inactivity monitor asked the host to do
pub struct MockSessionHost {
    sign_outs: Arc<Mutex<usize>>,
    notices: Arc<Mutex<Vec<InactivityNotice>>>,
    redirects: Arc<Mutex<Vec<String>>>,
    fail_sign_out: bool,
}

impl MockSessionHost {
    pub fn new() -> Self {
        Self {
            sign_outs: Arc::new(Mutex::new(0)),
            notices: Arc::new(Mutex::new(Vec::new())),
            redirects: Arc::new(Mutex::new(Vec::new())),
            fail_sign_out: false,
        }
    }

    pub fn with_failing_sign_out(mut self) -> Self {
        self.fail_sign_out = true;
        self
    }

    pub fn sign_out_count(&self) -> usize {
        *self.sign_outs.lock().unwrap()
    }

    pub fn notices(&self) -> Vec<InactivityNotice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Default for MockSessionHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionHost for MockSessionHost {
    async fn sign_out(&self) -> Result<()> {
        *self.sign_outs.lock().unwrap() += 1;
        if self.fail_sign_out {
            return Err(anyhow!("network unreachable"));
        }
        Ok(())
    }

    fn show_notice(&self, notice: &InactivityNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }

    fn redirect(&self, route: &str) {
        self.redirects.lock().unwrap().push(route.to_string());
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of mocks that can be turned into `ServerDeps`
pub struct TestDependencies {
    pub identity: Arc<MockIdentityAdmin>,
    pub profiles: Arc<MockProfileStore>,
    pub failure_policy: FailurePolicy,
    pub admin_bootstrap: AdminBootstrapSettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            identity: Arc::new(MockIdentityAdmin::new()),
            profiles: Arc::new(MockProfileStore::new()),
            failure_policy: FailurePolicy::default(),
            admin_bootstrap: AdminBootstrapSettings::default(),
        }
    }

    pub fn with_identity(mut self, identity: MockIdentityAdmin) -> Self {
        self.identity = Arc::new(identity);
        self
    }

    pub fn with_profiles(mut self, profiles: MockProfileStore) -> Self {
        self.profiles = Arc::new(profiles);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_admin_bootstrap(mut self, settings: AdminBootstrapSettings) -> Self {
        self.admin_bootstrap = settings;
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.identity.clone(),
            self.profiles.clone(),
            self.failure_policy,
            self.admin_bootstrap.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
