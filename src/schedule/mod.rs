//! Appointment scheduling over the KV store
//!
//! A thin keyed record store: appointments live in the `appt:` namespace
//! for seven days past their last write, with `appts:all` tracking the
//! live id set.

use crate::error::{Result, ScheduleError};
use crate::kv::{keys, KvStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
}

/// A stored appointment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appt_id: String,
    pub patient: String,
    pub normalized_slot_iso: String,
    pub location: String,
    pub status: AppointmentStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Proxy to the appointment store
pub struct ScheduleService {
    kv: Arc<dyn KvStore>,
}

impl ScheduleService {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    async fn store(&self, appointment: &Appointment) -> Result<()> {
        let raw = serde_json::to_string(appointment)
            .map_err(|e| ScheduleError::StorageError(e.to_string()))?;
        self.kv
            .set_ex(
                &keys::appointment_key(&appointment.appt_id),
                raw,
                keys::APPOINTMENT_TTL_SECS,
            )
            .await?;
        Ok(())
    }

    /// Create an appointment at the given slot
    pub async fn create(
        &self,
        patient: &str,
        slot_iso: &str,
        location: &str,
    ) -> Result<Appointment> {
        let appointment = Appointment {
            appt_id: Uuid::new_v4().to_string(),
            patient: patient.to_string(),
            normalized_slot_iso: slot_iso.to_string(),
            location: location.to_string(),
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now().to_rfc3339(),
            updated_at: None,
        };

        self.store(&appointment).await?;
        if let Err(e) = self
            .kv
            .sadd(keys::APPOINTMENTS_SET_KEY, &appointment.appt_id)
            .await
        {
            warn!("Failed to register appointment id in set: {}", e);
        }

        info!(
            "Scheduled {} at {} in {} ({})",
            appointment.patient, appointment.normalized_slot_iso, appointment.location,
            appointment.appt_id
        );
        Ok(appointment)
    }

    /// Move an existing appointment to a new slot
    pub async fn reschedule(&self, appt_id: &str, new_slot_iso: &str) -> Result<Appointment> {
        let mut appointment = self
            .get(appt_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound(appt_id.to_string()))?;

        appointment.normalized_slot_iso = new_slot_iso.to_string();
        appointment.status = AppointmentStatus::Scheduled;
        appointment.updated_at = Some(Utc::now().to_rfc3339());

        self.store(&appointment).await?;

        info!(
            "Rescheduled {} to {} ({})",
            appointment.patient, appointment.normalized_slot_iso, appointment.appt_id
        );
        Ok(appointment)
    }

    /// Fetch one appointment
    pub async fn get(&self, appt_id: &str) -> Result<Option<Appointment>> {
        match self.kv.get(&keys::appointment_key(appt_id)).await? {
            Some(raw) => {
                let appointment = serde_json::from_str(&raw)
                    .map_err(|e| ScheduleError::StorageError(e.to_string()))?;
                Ok(Some(appointment))
            }
            None => Ok(None),
        }
    }

    /// List all live appointments
    pub async fn list(&self) -> Result<Vec<Appointment>> {
        let ids = self.kv.smembers(keys::APPOINTMENTS_SET_KEY).await?;

        let mut appointments = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(&id).await? {
                Some(appointment) => appointments.push(appointment),
                // Expired record still referenced by the set.
                None => {
                    let _ = self.kv.srem(keys::APPOINTMENTS_SET_KEY, &id).await;
                }
            }
        }

        appointments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(appointments)
    }

    /// Cancel an appointment, keeping the record until its TTL
    pub async fn cancel(&self, appt_id: &str) -> Result<Appointment> {
        let mut appointment = self
            .get(appt_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound(appt_id.to_string()))?;

        appointment.status = AppointmentStatus::Cancelled;
        appointment.updated_at = Some(Utc::now().to_rfc3339());

        self.store(&appointment).await?;
        self.kv.srem(keys::APPOINTMENTS_SET_KEY, appt_id).await?;

        info!("Cancelled appointment {}", appt_id);
        Ok(appointment)
    }

    /// Cancel every live appointment, returning how many were touched
    pub async fn cancel_all(&self) -> Result<usize> {
        let ids = self.kv.smembers(keys::APPOINTMENTS_SET_KEY).await?;
        let mut cancelled = 0;
        for id in ids {
            if self.cancel(&id).await.is_ok() {
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }
}
