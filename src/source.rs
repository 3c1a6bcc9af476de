//! Data providers feeding the dashboard. The real system would back these
//! traits with a service; the session here is served from fixed lists.

use chrono::NaiveDate;
use tracing::warn;

use crate::models::{InvitationRecord, InvitationStatus, StatsSnapshot};

/// Supplies the ordered invitation list. Must be stable for the session.
pub trait InvitationSource {
    fn invitations(&self) -> Vec<InvitationRecord>;
}

/// Supplies the aggregate counts shown in the overview cards.
pub trait StatsSource {
    fn snapshot(&self) -> StatsSnapshot;
}

const MOCK_ROWS: &[(&str, &str, InvitationStatus, &str)] = &[
    ("INV-1001", "alex@example.com", InvitationStatus::Accepted, "2025-11-01"),
    ("INV-1002", "maria@example.com", InvitationStatus::Pending, "2025-11-02"),
    ("INV-1003", "lee@example.com", InvitationStatus::Accepted, "2025-11-02"),
    ("INV-1004", "jordan@example.com", InvitationStatus::Pending, "2025-11-03"),
    ("INV-1005", "sam@example.com", InvitationStatus::Sent, "2025-11-03"),
];

/// The five demo invitations.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockInvitations;

impl InvitationSource for MockInvitations {
    fn invitations(&self) -> Vec<InvitationRecord> {
        MOCK_ROWS
            .iter()
            .filter_map(|(id, email, status, date)| match date.parse::<NaiveDate>() {
                Ok(date) => Some(InvitationRecord::new(id, email, *status, date)),
                Err(err) => {
                    warn!("skipping invitation {id}: bad date {date:?}: {err}");
                    None
                }
            })
            .collect()
    }
}

/// Campaign totals used by the overview cards.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStats;

impl StatsSource for FixedStats {
    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot::new(1240, 812, 318)
    }
}
