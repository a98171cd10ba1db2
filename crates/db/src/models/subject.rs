//! Subject and subject component models.

use serde::{Deserialize, Serialize};
use shule_core::composite::ComponentDef;
use shule_core::report::{ReportComponent, ReportSubject};
use shule_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `subjects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subject {
    pub id: DbId,
    pub name: String,
    pub education_level: String,
    pub is_composite: bool,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a subject.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubject {
    pub name: String,
    pub education_level: String,
    #[serde(default)]
    pub is_composite: bool,
    pub sort_order: Option<i32>,
}

/// DTO for updating a subject. `is_composite` cannot change after creation.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubject {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// A row from the `subject_components` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubjectComponent {
    pub id: DbId,
    pub subject_id: DbId,
    pub name: String,
    pub weight: f64,
    pub max_raw_mark: f64,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SubjectComponent {
    pub fn to_def(&self) -> ComponentDef {
        ComponentDef::new(self.name.clone(), self.weight, self.max_raw_mark)
    }
}

/// A subject together with its ordered components (empty when atomic).
#[derive(Debug, Clone, Serialize)]
pub struct SubjectWithComponents {
    #[serde(flatten)]
    pub subject: Subject,
    pub components: Vec<SubjectComponent>,
}

impl SubjectWithComponents {
    pub fn component_defs(&self) -> Vec<ComponentDef> {
        self.components.iter().map(SubjectComponent::to_def).collect()
    }

    /// Map into the report-assembly input row.
    pub fn to_report_subject(&self) -> ReportSubject {
        ReportSubject {
            id: self.subject.id,
            name: self.subject.name.clone(),
            is_composite: self.subject.is_composite,
            components: self
                .components
                .iter()
                .map(|c| ReportComponent {
                    id: c.id,
                    def: c.to_def(),
                })
                .collect(),
        }
    }
}
