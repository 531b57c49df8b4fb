pub mod attendance;
pub mod authority;
pub mod canonical;
pub mod clock;
pub mod error;
pub mod replay;
pub mod server;
pub mod signing;

pub use attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceStore, CheckInMethod, InMemoryAttendanceStore,
};
pub use authority::{QrAuthority, ValidityPolicy};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::AttendanceError;
pub use replay::{InMemoryReplayGuard, ReplayGuard};
pub use server::{AppState, router, run};
pub use signing::{
    HmacSha256Signer, PayloadSigner, SecretKey, SignedPayload, SigningRequest,
    VerificationRequest,
};
