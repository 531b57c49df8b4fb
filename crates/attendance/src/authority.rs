use std::sync::Arc;

use chrono::Duration;

use crate::attendance::{AttendanceRecord, AttendanceStore, InMemoryAttendanceStore};
use crate::canonical::{canonical_message, format_timestamp, parse_timestamp};
use crate::clock::{Clock, SystemClock};
use crate::error::AttendanceError;
use crate::replay::{InMemoryReplayGuard, ReplayGuard};
use crate::signing::{
    HmacSha256Signer, PayloadSigner, SecretKey, SignedPayload, SigningRequest,
    VerificationRequest, required,
};

pub const DEFAULT_VALIDITY_SECS: i64 = 300;
pub const DEFAULT_MAX_CLOCK_SKEW_SECS: i64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct ValidityPolicy {
    /// How long after signing a payload may still be redeemed.
    pub window: Duration,
    /// How far in the future a timestamp may lie before it is rejected.
    pub max_clock_skew: Duration,
}

impl Default for ValidityPolicy {
    fn default() -> Self {
        Self {
            window: Duration::seconds(DEFAULT_VALIDITY_SECS),
            max_clock_skew: Duration::seconds(DEFAULT_MAX_CLOCK_SKEW_SECS),
        }
    }
}

/// Issues and redeems QR attendance payloads.
///
/// The signer is optional: an authority built without a secret still serves
/// attendance lookups, but every sign or verify call fails with
/// [`AttendanceError::Configuration`].
pub struct QrAuthority {
    signer: Option<Arc<dyn PayloadSigner>>,
    policy: ValidityPolicy,
    clock: Arc<dyn Clock>,
    replay_guard: Arc<dyn ReplayGuard>,
    store: Arc<dyn AttendanceStore>,
}

pub struct QrAuthorityBuilder {
    signer: Option<Arc<dyn PayloadSigner>>,
    policy: ValidityPolicy,
    clock: Arc<dyn Clock>,
    replay_guard: Arc<dyn ReplayGuard>,
    store: Arc<dyn AttendanceStore>,
}

impl QrAuthorityBuilder {
    pub fn signer(mut self, signer: Arc<dyn PayloadSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn policy(mut self, policy: ValidityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn replay_guard(mut self, replay_guard: Arc<dyn ReplayGuard>) -> Self {
        self.replay_guard = replay_guard;
        self
    }

    pub fn store(mut self, store: Arc<dyn AttendanceStore>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> QrAuthority {
        QrAuthority {
            signer: self.signer,
            policy: self.policy,
            clock: self.clock,
            replay_guard: self.replay_guard,
            store: self.store,
        }
    }
}

impl QrAuthority {
    /// Starts a builder with in-memory collaborators and the system clock.
    /// A `None` secret yields an authority that refuses to sign.
    pub fn builder(secret: Option<SecretKey>) -> QrAuthorityBuilder {
        QrAuthorityBuilder {
            signer: secret.map(|s| Arc::new(HmacSha256Signer::new(s)) as Arc<dyn PayloadSigner>),
            policy: ValidityPolicy::default(),
            clock: Arc::new(SystemClock),
            replay_guard: Arc::new(InMemoryReplayGuard::new()),
            store: Arc::new(InMemoryAttendanceStore::new()),
        }
    }

    pub fn policy(&self) -> ValidityPolicy {
        self.policy
    }

    pub fn is_configured(&self) -> bool {
        self.signer.is_some()
    }

    pub fn store(&self) -> &dyn AttendanceStore {
        self.store.as_ref()
    }

    fn signer(&self) -> Result<&dyn PayloadSigner, AttendanceError> {
        self.signer.as_deref().ok_or_else(|| {
            AttendanceError::Configuration("no signing secret configured".to_string())
        })
    }

    pub fn sign(&self, request: &SigningRequest) -> Result<SignedPayload, AttendanceError> {
        let user_id = required(&request.user_id, "userId")?;
        let activity_id = required(&request.activity_id, "activityId")?;
        let signer = self.signer()?;

        let timestamp = format_timestamp(self.clock.now());
        let message = canonical_message(user_id, activity_id, &timestamp);
        let signature = signer.sign(message.as_bytes())?;

        Ok(SignedPayload {
            user_id: user_id.to_string(),
            activity_id: activity_id.to_string(),
            timestamp,
            signature: hex::encode(signature),
        })
    }

    /// Checks a scanned payload and records attendance.
    ///
    /// Order: field presence, signature, validity window, replay guard, store.
    pub fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let user_id = required(&request.user_id, "userId")?;
        let activity_id = required(&request.activity_id, "activityId")?;
        let timestamp = required(&request.timestamp, "timestamp")?;
        let signature = required(&request.signature, "signature")?;
        let signer = self.signer()?;

        let message = canonical_message(user_id, activity_id, timestamp);
        let provided =
            hex::decode(signature).map_err(|_| AttendanceError::SignatureMismatch)?;
        if !signer.verify(message.as_bytes(), &provided)? {
            return Err(AttendanceError::SignatureMismatch);
        }

        let issued_at = parse_timestamp(timestamp)
            .map_err(|e| AttendanceError::InvalidRequest(format!("{e:#}")))?;
        let now = self.clock.now();
        let age = now - issued_at;
        if age > self.policy.window || -age > self.policy.max_clock_skew {
            return Err(AttendanceError::Expired {
                age_secs: age.num_seconds(),
            });
        }

        let expires_at = issued_at + self.policy.window;
        if !self.replay_guard.check_and_set(&message, expires_at, now)? {
            return Err(AttendanceError::AlreadyUsed);
        }

        let record = AttendanceRecord::qr_check_in(activity_id, user_id, now);
        Ok(self.store.record(record)?)
    }
}
