use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Client as handed over by the onboarding collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClientRecord {
    #[validate(length(min = 1))]
    pub client_id: String,
    #[validate(length(min = 1))]
    pub firm_id: String,
    /// CA responsible for the client; deadlines carry `None` when unassigned.
    #[serde(default)]
    pub assigned_ca_id: Option<String>,
    pub onboarded_on: NaiveDate,
}
