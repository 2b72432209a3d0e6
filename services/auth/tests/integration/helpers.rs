use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use jobspace_auth::domain::repository::{DeliveryGateway, PrincipalRepository, ResetCodeRepository};
use jobspace_auth::domain::types::{
    DeliveryMethod, NewResetCode, Principal, RESET_CODE_TTL_SECS, ResetCode,
};
use jobspace_auth::error::AuthServiceError;
use jobspace_auth::infra::password;
use jobspace_auth_types::token::TokenCodec;
use jobspace_domain::principal::PrincipalKind;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";

pub fn test_codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(TEST_JWT_SECRET, 1800, 604800))
}

// ── MockPrincipalRepo ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockPrincipalRepo {
    pub principals: Arc<Mutex<Vec<Principal>>>,
}

impl MockPrincipalRepo {
    pub fn new(principals: Vec<Principal>) -> Self {
        Self {
            principals: Arc::new(Mutex::new(principals)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle for mutating accounts mid-test (deactivation etc.).
    pub fn handle(&self) -> Arc<Mutex<Vec<Principal>>> {
        Arc::clone(&self.principals)
    }
}

impl PrincipalRepository for MockPrincipalRepo {
    async fn find_active_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> Result<Option<Principal>, AuthServiceError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.kind == kind && p.email == email && p.is_active)
            .cloned())
    }

    async fn find_active_by_phone(
        &self,
        kind: PrincipalKind,
        phone: &str,
    ) -> Result<Option<Principal>, AuthServiceError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.kind == kind && p.phone == phone && p.is_active)
            .cloned())
    }

    async fn find_by_id(
        &self,
        kind: PrincipalKind,
        id: i32,
    ) -> Result<Option<Principal>, AuthServiceError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.kind == kind && p.id == id)
            .cloned())
    }
}

// ── MockResetCodeRepo ────────────────────────────────────────────────────────

/// In-memory reset-code store. Shares the principal list so the
/// consume-and-set-password transaction can touch both "tables", and
/// serializes the claim transition through the mutex the way the real store
/// serializes it through its locking discipline.
#[derive(Clone)]
pub struct MockResetCodeRepo {
    pub codes: Arc<Mutex<Vec<ResetCode>>>,
    principals: Arc<Mutex<Vec<Principal>>>,
    next_id: Arc<AtomicI32>,
}

impl MockResetCodeRepo {
    pub fn new(principals: &MockPrincipalRepo) -> Self {
        Self {
            codes: Arc::new(Mutex::new(vec![])),
            principals: principals.handle(),
            next_id: Arc::new(AtomicI32::new(1)),
        }
    }

    pub fn codes_handle(&self) -> Arc<Mutex<Vec<ResetCode>>> {
        Arc::clone(&self.codes)
    }

    /// Seed a code directly, bypassing request_reset.
    pub fn seed(&self, code: ResetCode) {
        self.codes.lock().unwrap().push(code);
    }
}

impl ResetCodeRepository for MockResetCodeRepo {
    async fn replace_active(&self, new: &NewResetCode) -> Result<ResetCode, AuthServiceError> {
        let mut codes = self.codes.lock().unwrap();
        for existing in codes.iter_mut().filter(|c| {
            c.method == new.method
                && c.principal_kind == new.principal_kind
                && !c.is_used
                && c.email == new.email
                && c.phone == new.phone
        }) {
            existing.is_used = true;
        }

        let stored = ResetCode {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            code: new.code.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            method: new.method,
            principal_kind: new.principal_kind,
            is_used: false,
            verification_token: None,
            expires_at: new.expires_at,
            created_at: Utc::now(),
        };
        codes.push(stored.clone());
        Ok(stored)
    }

    async fn find_valid(
        &self,
        code: &str,
        method: DeliveryMethod,
        kind: PrincipalKind,
        channel_value: &str,
    ) -> Result<Option<ResetCode>, AuthServiceError> {
        let now = Utc::now();
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| {
                c.code == code
                    && c.method == method
                    && c.principal_kind == kind
                    && c.channel_value() == Some(channel_value)
                    && c.is_verifiable(now)
            })
            .cloned())
    }

    async fn claim(&self, id: i32, verification_token: &str) -> Result<bool, AuthServiceError> {
        let now = Utc::now();
        let mut codes = self.codes.lock().unwrap();
        match codes.iter_mut().find(|c| c.id == id) {
            Some(c) if c.is_verifiable(now) => {
                c.is_used = true;
                c.verification_token = Some(verification_token.to_owned());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ResetCode>, AuthServiceError> {
        let now = Utc::now();
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| {
                c.verification_token.as_deref() == Some(token)
                    && c.is_used
                    && !c.is_expired(now)
            })
            .cloned())
    }

    async fn consume_and_set_password(
        &self,
        code_id: i32,
        kind: PrincipalKind,
        principal_id: i32,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        let mut principals = self.principals.lock().unwrap();
        let principal = principals
            .iter_mut()
            .find(|p| p.kind == kind && p.id == principal_id)
            .ok_or_else(|| AuthServiceError::Internal(anyhow::anyhow!("principal row vanished")))?;
        principal.password_hash = password_hash.to_owned();
        drop(principals);

        self.codes.lock().unwrap().retain(|c| c.id != code_id);
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, AuthServiceError> {
        let now = Utc::now();
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| !c.is_expired(now));
        Ok((before - codes.len()) as u64)
    }
}

// ── MockDelivery ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockDelivery {
    pub fail: bool,
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockDelivery {
    pub fn working() -> Self {
        Self {
            fail: false,
            sent: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn broken() -> Self {
        Self {
            fail: true,
            sent: Arc::new(Mutex::new(vec![])),
        }
    }
}

impl DeliveryGateway for MockDelivery {
    async fn deliver_code(
        &self,
        to: &str,
        _recipient_name: &str,
        code: &str,
        _method: DeliveryMethod,
    ) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("gateway unreachable");
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_owned(), code.to_owned()));
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_student(id: i32, email: &str, phone: &str, plain_password: &str) -> Principal {
    Principal {
        id,
        name: "Ada Lovelace".to_owned(),
        email: email.to_owned(),
        phone: phone.to_owned(),
        password_hash: password::hash_password(plain_password).unwrap(),
        kind: PrincipalKind::Student,
        is_active: true,
    }
}

pub fn test_company(id: i32, email: &str, phone: &str, plain_password: &str) -> Principal {
    Principal {
        id,
        name: "Acme Recruiting".to_owned(),
        email: email.to_owned(),
        phone: phone.to_owned(),
        password_hash: password::hash_password(plain_password).unwrap(),
        kind: PrincipalKind::Company,
        is_active: true,
    }
}

pub fn seeded_email_code(id: i32, code: &str, email: &str, kind: PrincipalKind) -> ResetCode {
    let now = Utc::now();
    ResetCode {
        id,
        code: code.to_owned(),
        email: Some(email.to_owned()),
        phone: None,
        method: DeliveryMethod::Email,
        principal_kind: kind,
        is_used: false,
        verification_token: None,
        expires_at: now + Duration::seconds(RESET_CODE_TTL_SECS),
        created_at: now,
    }
}
