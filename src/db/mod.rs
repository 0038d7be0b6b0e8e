//! Database layer (Firestore, with an in-memory backend for tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDirectory;
pub use memory::MemoryDirectory;

use crate::error::AppError;
use crate::models::{AthleteProfile, ChatMessage, Exercise, PhysioProfile, SymptomLog};

/// Collection names as constants.
pub mod collections {
    pub const ATHLETES: &str = "athletes";
    pub const PHYSIOS: &str = "physios";
    pub const EXERCISES: &str = "exercises";
    pub const SYMPTOM_LOGS: &str = "symptom_logs";
    pub const CHAT_MESSAGES: &str = "chat_messages";
}

/// Directory store handle, dispatching to Firestore or the in-memory backend.
///
/// Call sites stay monomorphic; tests construct the memory variant and the
/// server connects the Firestore one at startup.
#[derive(Clone)]
pub enum Db {
    Firestore(FirestoreDirectory),
    Memory(MemoryDirectory),
}

macro_rules! dispatch {
    ($self:ident . $method:ident ( $($arg:expr),* )) => {
        match $self {
            Db::Firestore(db) => db.$method($($arg),*).await,
            Db::Memory(db) => db.$method($($arg),*).await,
        }
    };
}

impl Db {
    /// Connect to Firestore (or the emulator if FIRESTORE_EMULATOR_HOST is set).
    pub async fn connect(project_id: &str) -> Result<Self, AppError> {
        Ok(Db::Firestore(FirestoreDirectory::new(project_id).await?))
    }

    /// Create an in-memory store for tests and offline development.
    pub fn in_memory() -> Self {
        Db::Memory(MemoryDirectory::new())
    }

    pub async fn get_athlete(&self, uid: &str) -> Result<Option<AthleteProfile>, AppError> {
        dispatch!(self.get_athlete(uid))
    }

    pub async fn upsert_athlete(&self, profile: &AthleteProfile) -> Result<(), AppError> {
        dispatch!(self.upsert_athlete(profile))
    }

    pub async fn list_athletes(&self) -> Result<Vec<AthleteProfile>, AppError> {
        dispatch!(self.list_athletes())
    }

    pub async fn get_physio(&self, uid: &str) -> Result<Option<PhysioProfile>, AppError> {
        dispatch!(self.get_physio(uid))
    }

    pub async fn upsert_physio(&self, profile: &PhysioProfile) -> Result<(), AppError> {
        dispatch!(self.upsert_physio(profile))
    }

    pub async fn list_physios(&self) -> Result<Vec<PhysioProfile>, AppError> {
        dispatch!(self.list_physios())
    }

    pub async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>, AppError> {
        dispatch!(self.get_exercise(exercise_id))
    }

    pub async fn upsert_exercise(&self, exercise: &Exercise) -> Result<(), AppError> {
        dispatch!(self.upsert_exercise(exercise))
    }

    pub async fn exercises_for_athlete(&self, athlete_id: &str) -> Result<Vec<Exercise>, AppError> {
        dispatch!(self.exercises_for_athlete(athlete_id))
    }

    pub async fn get_symptom_log(&self, log_id: &str) -> Result<Option<SymptomLog>, AppError> {
        dispatch!(self.get_symptom_log(log_id))
    }

    pub async fn upsert_symptom_log(&self, log: &SymptomLog) -> Result<(), AppError> {
        dispatch!(self.upsert_symptom_log(log))
    }

    pub async fn delete_symptom_log(&self, log_id: &str) -> Result<(), AppError> {
        dispatch!(self.delete_symptom_log(log_id))
    }

    pub async fn symptom_logs_for_athlete(
        &self,
        athlete_id: &str,
    ) -> Result<Vec<SymptomLog>, AppError> {
        dispatch!(self.symptom_logs_for_athlete(athlete_id))
    }

    pub async fn upsert_message(&self, message: &ChatMessage) -> Result<(), AppError> {
        dispatch!(self.upsert_message(message))
    }

    pub async fn messages_for_room(&self, room_id: &str) -> Result<Vec<ChatMessage>, AppError> {
        dispatch!(self.messages_for_room(room_id))
    }
}
