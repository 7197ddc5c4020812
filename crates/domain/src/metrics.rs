//! Invite lifecycle metrics.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! Prometheus recorder that exports them.

use metrics::counter;

use crate::models::invite::InviteRole;
use crate::models::member::MemberRole;
use crate::services::InviteError;

/// Record an invite issued for the given role.
pub fn record_invite_issued(role: InviteRole) {
    counter!("invites_issued_total", "role" => role.as_str()).increment(1);
}

/// Record an invite lookup that did not yield a usable invite.
pub fn record_invite_rejected(err: &InviteError) {
    let reason = match err {
        InviteError::NotFound => "not_found",
        InviteError::AlreadyUsed => "already_used",
        InviteError::Expired => "expired",
        InviteError::InvalidTtl { .. } => "invalid_ttl",
        InviteError::Store(_) => "store_error",
    };
    counter!("invite_lookups_rejected_total", "reason" => reason).increment(1);
}

/// Record a completed acceptance.
pub fn record_invite_accepted(role: MemberRole) {
    counter!("invites_accepted_total", "role" => role.as_str()).increment(1);
}

/// Record an acceptance that lost the claim race to another request.
pub fn record_invite_claim_lost() {
    counter!("invite_claims_lost_total").increment(1);
}
