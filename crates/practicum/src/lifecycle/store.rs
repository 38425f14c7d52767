use chrono::NaiveDate;

use super::domain::{
    Actor, Application, ApplicationId, EnterpriseId, Internship, InternshipFile, InternshipId,
    InternshipLog, Position, PositionId, StudentId, TeacherId,
};

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction the engine runs against. Every lifecycle operation
/// executes inside one transaction obtained from [`LifecycleStore::begin`].
pub trait LifecycleStore: Send + Sync {
    /// Opens a transaction. Implementations must guarantee that transactions
    /// on the same store are isolated from one another: two concurrent
    /// reviews of one application must serialize so exactly one succeeds.
    fn begin(&self) -> Result<Box<dyn LifecycleTx + '_>, StoreError>;
}

/// A single open transaction. Writes are staged and become visible to other
/// transactions only after [`LifecycleTx::commit`]; dropping the transaction
/// discards every staged write.
///
/// Insert methods accept a record with a placeholder id and return it with
/// the store-assigned identifier filled in.
pub trait LifecycleTx {
    fn student_exists(&self, id: StudentId) -> Result<bool, StoreError>;
    fn teacher_exists(&self, id: TeacherId) -> Result<bool, StoreError>;
    fn enterprise_exists(&self, id: EnterpriseId) -> Result<bool, StoreError>;
    /// Every registered teacher, for review fan-out notifications.
    fn teacher_ids(&self) -> Result<Vec<TeacherId>, StoreError>;

    fn position(&self, id: PositionId) -> Result<Option<Position>, StoreError>;
    fn positions(&self) -> Result<Vec<Position>, StoreError>;
    fn insert_position(&mut self, position: Position) -> Result<Position, StoreError>;
    fn update_position(&mut self, position: &Position) -> Result<(), StoreError>;
    fn remove_position(&mut self, id: PositionId) -> Result<(), StoreError>;

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError>;
    /// The student's application currently blocking a new submission, i.e.
    /// one in pending or approved state, if any.
    fn blocking_application_for_student(
        &self,
        id: StudentId,
    ) -> Result<Option<Application>, StoreError>;
    fn pending_application_count(&self, position: PositionId) -> Result<usize, StoreError>;
    fn insert_application(&mut self, application: Application) -> Result<Application, StoreError>;
    fn update_application(&mut self, application: &Application) -> Result<(), StoreError>;

    fn internship(&self, id: InternshipId) -> Result<Option<Internship>, StoreError>;
    /// Placements the actor is a party to, newest first.
    fn internships_for(&self, actor: Actor) -> Result<Vec<Internship>, StoreError>;
    /// Ongoing placements whose end date lies strictly before `as_of`.
    fn expired_ongoing(&self, as_of: NaiveDate) -> Result<Vec<Internship>, StoreError>;
    /// Ongoing placements ending within `[from, until]` inclusive.
    fn expiring_ongoing(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Internship>, StoreError>;
    fn insert_internship(&mut self, internship: Internship) -> Result<Internship, StoreError>;
    fn update_internship(&mut self, internship: &Internship) -> Result<(), StoreError>;

    fn logs_for(&self, id: InternshipId) -> Result<Vec<InternshipLog>, StoreError>;
    fn insert_log(&mut self, log: InternshipLog) -> Result<InternshipLog, StoreError>;
    fn files_for(&self, id: InternshipId) -> Result<Vec<InternshipFile>, StoreError>;
    fn insert_file(&mut self, file: InternshipFile) -> Result<InternshipFile, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
