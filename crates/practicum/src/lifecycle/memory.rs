use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::domain::{
    Actor, Application, ApplicationId, ApplicationStatus, EnterpriseId, Internship, InternshipFile,
    InternshipId, InternshipLog, InternshipStatus, Position, PositionId, StudentId, TeacherId,
};
use super::store::{LifecycleStore, LifecycleTx, StoreError};

#[derive(Debug, Default, Clone)]
struct State {
    students: BTreeSet<StudentId>,
    teachers: BTreeSet<TeacherId>,
    enterprises: BTreeSet<EnterpriseId>,
    positions: BTreeMap<u64, Position>,
    applications: BTreeMap<u64, Application>,
    internships: BTreeMap<u64, Internship>,
    logs: Vec<InternshipLog>,
    files: Vec<InternshipFile>,
    next_position_id: u64,
    next_application_id: u64,
    next_internship_id: u64,
    next_child_id: u64,
}

impl State {
    fn next_id(counter: &mut u64) -> u64 {
        *counter += 1;
        *counter
    }
}

/// In-memory reference store. A transaction clones the current state, stages
/// all writes on the clone, and swaps it back on commit. The state mutex is
/// held for the whole transaction, which serializes contended operations the
/// same way row locks do in a relational store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn register_student(&self, id: StudentId) {
        if let Ok(mut state) = self.state.lock() {
            state.students.insert(id);
        }
    }

    pub fn register_teacher(&self, id: TeacherId) {
        if let Ok(mut state) = self.state.lock() {
            state.teachers.insert(id);
        }
    }

    pub fn register_enterprise(&self, id: EnterpriseId) {
        if let Ok(mut state) = self.state.lock() {
            state.enterprises.insert(id);
        }
    }
}

impl LifecycleStore for MemoryStore {
    fn begin(&self) -> Result<Box<dyn LifecycleTx + '_>, StoreError> {
        let guard = self.lock()?;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx { guard, staged }))
    }
}

struct MemoryTx<'a> {
    guard: MutexGuard<'a, State>,
    staged: State,
}

impl LifecycleTx for MemoryTx<'_> {
    fn student_exists(&self, id: StudentId) -> Result<bool, StoreError> {
        Ok(self.staged.students.contains(&id))
    }

    fn teacher_exists(&self, id: TeacherId) -> Result<bool, StoreError> {
        Ok(self.staged.teachers.contains(&id))
    }

    fn enterprise_exists(&self, id: EnterpriseId) -> Result<bool, StoreError> {
        Ok(self.staged.enterprises.contains(&id))
    }

    fn teacher_ids(&self) -> Result<Vec<TeacherId>, StoreError> {
        Ok(self.staged.teachers.iter().copied().collect())
    }

    fn position(&self, id: PositionId) -> Result<Option<Position>, StoreError> {
        Ok(self.staged.positions.get(&id.0).cloned())
    }

    fn positions(&self) -> Result<Vec<Position>, StoreError> {
        let mut positions: Vec<Position> = self.staged.positions.values().cloned().collect();
        positions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(positions)
    }

    fn insert_position(&mut self, mut position: Position) -> Result<Position, StoreError> {
        position.id = PositionId(State::next_id(&mut self.staged.next_position_id));
        self.staged.positions.insert(position.id.0, position.clone());
        Ok(position)
    }

    fn update_position(&mut self, position: &Position) -> Result<(), StoreError> {
        if !self.staged.positions.contains_key(&position.id.0) {
            return Err(StoreError::NotFound);
        }
        self.staged.positions.insert(position.id.0, position.clone());
        Ok(())
    }

    fn remove_position(&mut self, id: PositionId) -> Result<(), StoreError> {
        self.staged
            .positions
            .remove(&id.0)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        Ok(self.staged.applications.get(&id.0).cloned())
    }

    fn blocking_application_for_student(
        &self,
        id: StudentId,
    ) -> Result<Option<Application>, StoreError> {
        Ok(self
            .staged
            .applications
            .values()
            .find(|application| {
                application.student_id == id && application.status.blocks_new_submission()
            })
            .cloned())
    }

    fn pending_application_count(&self, position: PositionId) -> Result<usize, StoreError> {
        Ok(self
            .staged
            .applications
            .values()
            .filter(|application| {
                application.position_id == position
                    && application.status == ApplicationStatus::Pending
            })
            .count())
    }

    fn insert_application(&mut self, mut application: Application) -> Result<Application, StoreError> {
        application.id = ApplicationId(State::next_id(&mut self.staged.next_application_id));
        self.staged
            .applications
            .insert(application.id.0, application.clone());
        Ok(application)
    }

    fn update_application(&mut self, application: &Application) -> Result<(), StoreError> {
        if !self.staged.applications.contains_key(&application.id.0) {
            return Err(StoreError::NotFound);
        }
        self.staged
            .applications
            .insert(application.id.0, application.clone());
        Ok(())
    }

    fn internship(&self, id: InternshipId) -> Result<Option<Internship>, StoreError> {
        Ok(self.staged.internships.get(&id.0).cloned())
    }

    fn internships_for(&self, actor: Actor) -> Result<Vec<Internship>, StoreError> {
        let mut internships: Vec<Internship> = self
            .staged
            .internships
            .values()
            .filter(|internship| actor.is_party_to(internship))
            .cloned()
            .collect();
        internships.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(internships)
    }

    fn expired_ongoing(&self, as_of: NaiveDate) -> Result<Vec<Internship>, StoreError> {
        Ok(self
            .staged
            .internships
            .values()
            .filter(|internship| {
                internship.status == InternshipStatus::Ongoing && internship.end_date < as_of
            })
            .cloned()
            .collect())
    }

    fn expiring_ongoing(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Internship>, StoreError> {
        Ok(self
            .staged
            .internships
            .values()
            .filter(|internship| {
                internship.status == InternshipStatus::Ongoing
                    && internship.end_date >= from
                    && internship.end_date <= until
            })
            .cloned()
            .collect())
    }

    fn insert_internship(&mut self, mut internship: Internship) -> Result<Internship, StoreError> {
        if self
            .staged
            .internships
            .values()
            .any(|existing| existing.application_id == internship.application_id)
        {
            return Err(StoreError::Conflict);
        }
        internship.id = InternshipId(State::next_id(&mut self.staged.next_internship_id));
        self.staged
            .internships
            .insert(internship.id.0, internship.clone());
        Ok(internship)
    }

    fn update_internship(&mut self, internship: &Internship) -> Result<(), StoreError> {
        if !self.staged.internships.contains_key(&internship.id.0) {
            return Err(StoreError::NotFound);
        }
        self.staged
            .internships
            .insert(internship.id.0, internship.clone());
        Ok(())
    }

    fn logs_for(&self, id: InternshipId) -> Result<Vec<InternshipLog>, StoreError> {
        let mut logs: Vec<InternshipLog> = self
            .staged
            .logs
            .iter()
            .filter(|log| log.internship_id == id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| {
            b.log_date
                .cmp(&a.log_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(logs)
    }

    fn insert_log(&mut self, mut log: InternshipLog) -> Result<InternshipLog, StoreError> {
        log.id = State::next_id(&mut self.staged.next_child_id);
        self.staged.logs.push(log.clone());
        Ok(log)
    }

    fn files_for(&self, id: InternshipId) -> Result<Vec<InternshipFile>, StoreError> {
        let mut files: Vec<InternshipFile> = self
            .staged
            .files
            .iter()
            .filter(|file| file.internship_id == id)
            .cloned()
            .collect();
        files.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(files)
    }

    fn insert_file(&mut self, mut file: InternshipFile) -> Result<InternshipFile, StoreError> {
        file.id = State::next_id(&mut self.staged.next_child_id);
        self.staged.files.push(file.clone());
        Ok(file)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}
