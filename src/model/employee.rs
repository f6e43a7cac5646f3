use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// Where a staff member stands in the roster. Only `Active` staff may clock
/// in; `Deleted` rows are tombstones kept so change history stays linked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Lifecycle {
    Active,
    Transferred,
    Deleted,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "NJ-0042",
        "name": "Ama Mensah",
        "department": "Finance",
        "email": "ama.mensah@njsma.gov.gh",
        "contact": "+233201234567",
        "lifecycle": "active",
        "date_added": "2026-01-05T08:00:00",
        "date_modified": "2026-01-05T08:00:00"
    })
)]
pub struct Employee {
    #[schema(example = "NJ-0042")]
    pub employee_id: String,

    #[schema(example = "Ama Mensah")]
    pub name: String,

    #[schema(example = "Finance", nullable = true)]
    pub department: Option<String>,

    #[schema(example = "ama.mensah@njsma.gov.gh", nullable = true)]
    pub email: Option<String>,

    #[schema(example = "+233201234567", nullable = true)]
    pub contact: Option<String>,

    pub lifecycle: Lifecycle,

    #[schema(value_type = String, format = "date-time")]
    pub date_added: NaiveDateTime,

    #[schema(value_type = String, format = "date-time")]
    pub date_modified: NaiveDateTime,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }
}

/// Validated roster entry ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub employee_id: String,
    pub name: String,
    pub department: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
}
