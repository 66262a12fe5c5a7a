//! Persistence gateway for appointments.

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::config::Config;
use crate::db::create_pool;
use crate::models::Appointment;
use crate::{Error, Result};

/// Body text for a lookup that found nothing.
pub const APPOINTMENT_NOT_FOUND: &str = "Appointment not found";

/// `AppointmentStore` mediates every read and write between the handlers and the database.
///
/// Implementations must be shareable between request-handling tasks.
#[async_trait]
pub trait AppointmentStore: Send + Sync + 'static {
    /// Persist a new appointment, ignoring its `id`, and return it with the assigned id.
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment>;

    /// Every stored appointment, ordered by id.
    async fn find_all(&self) -> Result<Vec<Appointment>>;

    /// # Errors
    ///
    /// - [`Error::NotFound`] if no appointment has this id.
    async fn find_by_id(&self, id: i64) -> Result<Appointment>;

    /// Write all mutable fields of an existing appointment.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no appointment has this id.
    async fn save(&self, appointment: &Appointment) -> Result<Appointment>;

    /// Hard-delete the appointment with this record's id.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no appointment has this id.
    async fn delete(&self, appointment: &Appointment) -> Result<()>;
}

/// [`AppointmentStore`] backed by sqlx, over PostgreSQL or SQLite.
#[derive(Debug, Clone)]
pub struct SqlAppointmentStore {
    pool: AnyPool,
}

impl SqlAppointmentStore {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Open the pool described by `config` and ensure the schema exists.
    pub async fn connect(config: &Config) -> Result<Self> {
        Ok(Self::new(create_pool(config).await?))
    }
}

#[async_trait]
impl AppointmentStore for SqlAppointmentStore {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment> {
        let created = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (name, email, phone, doctor, date_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, phone, doctor, date_time
            "#,
        )
        .bind(&appointment.name)
        .bind(&appointment.email)
        .bind(&appointment.phone)
        .bind(&appointment.doctor)
        .bind(&appointment.date_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_all(&self) -> Result<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(
            "SELECT id, name, email, phone, doctor, date_time FROM appointments ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn find_by_id(&self, id: i64) -> Result<Appointment> {
        sqlx::query_as::<_, Appointment>(
            "SELECT id, name, email, phone, doctor, date_time FROM appointments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found(APPOINTMENT_NOT_FOUND))
    }

    async fn save(&self, appointment: &Appointment) -> Result<Appointment> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET name = $1, email = $2, phone = $3, doctor = $4, date_time = $5
            WHERE id = $6
            "#,
        )
        .bind(&appointment.name)
        .bind(&appointment.email)
        .bind(&appointment.phone)
        .bind(&appointment.doctor)
        .bind(&appointment.date_time)
        .bind(appointment.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(APPOINTMENT_NOT_FOUND));
        }

        Ok(appointment.clone())
    }

    async fn delete(&self, appointment: &Appointment) -> Result<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(appointment.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(APPOINTMENT_NOT_FOUND));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqlAppointmentStore {
        SqlAppointmentStore::connect(&Config::in_memory())
            .await
            .expect("in-memory store")
    }

    fn appointment(name: &str, doctor: &str) -> Appointment {
        Appointment {
            id: 0,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555-0100".to_string(),
            doctor: doctor.to_string(),
            date_time: "2024-01-01T10:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = memory_store().await;

        let first = store.insert(&appointment("Alice", "Dr. Smith")).await.unwrap();
        let second = store.insert(&appointment("Bob", "Dr. Jones")).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(first.name, "Alice");
        assert_eq!(store.find_by_id(first.id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_insert_ignores_caller_id() {
        let store = memory_store().await;
        let mut input = appointment("Alice", "Dr. Smith");
        input.id = 42;

        let created = store.insert(&input).await.unwrap();

        assert_ne!(created.id, 42);
        assert!(matches!(store.find_by_id(42).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_all() {
        let store = memory_store().await;
        assert!(store.find_all().await.unwrap().is_empty());

        store.insert(&appointment("Alice", "Dr. Smith")).await.unwrap();
        store.insert(&appointment("Bob", "Dr. Jones")).await.unwrap();

        let names: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_save_overwrites_fields() {
        let store = memory_store().await;
        let mut stored = store.insert(&appointment("Alice", "Dr. Smith")).await.unwrap();

        stored.doctor = "Dr. Jones".to_string();
        stored.phone = String::new();
        store.save(&stored).await.unwrap();

        assert_eq!(store.find_by_id(stored.id).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_save_and_delete_unknown_id() {
        let store = memory_store().await;
        let mut ghost = appointment("Ghost", "Dr. Nobody");
        ghost.id = 99999;

        assert!(matches!(store.save(&ghost).await, Err(Error::NotFound(_))));
        assert!(matches!(store.delete(&ghost).await, Err(Error::NotFound(_))));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = memory_store().await;
        let stored = store.insert(&appointment("Alice", "Dr. Smith")).await.unwrap();

        store.delete(&stored).await.unwrap();

        assert!(matches!(
            store.find_by_id(stored.id).await,
            Err(Error::NotFound(_))
        ));
    }
}
