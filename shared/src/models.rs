//! Appointment record and its JSON/column mapping.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A scheduled meeting between a patient and a doctor.
///
/// Field names are shared by the JSON body and the `appointments` table columns.
/// Every field defaults when absent from a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct Appointment {
    /// Assigned by the database on insert; never changed afterwards.
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub doctor: String,
    /// Free-form date/time text, stored verbatim.
    pub date_time: String,
}

impl Appointment {
    /// Overwrite every field except `id` with the values in `changes`.
    ///
    /// Empty strings in `changes` replace the stored values too.
    pub fn apply_update(&mut self, changes: &Appointment) {
        self.name.clone_from(&changes.name);
        self.email.clone_from(&changes.email);
        self.phone.clone_from(&changes.phone);
        self.doctor.clone_from(&changes.doctor);
        self.date_time.clone_from(&changes.date_time);
    }
}
