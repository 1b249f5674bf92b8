//! Common types shared across services.

mod diagnosis;
mod health;
mod timing;

pub use diagnosis::{
    DiagnosisResult, EvidenceBase, ProposedReferral, ReferralCategory, Urgency,
};
pub use health::{ServiceHealth, ServiceStatus};
pub use timing::Timing;
