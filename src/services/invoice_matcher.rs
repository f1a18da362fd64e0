//! Resolves a supplier invoice to the entity it should be booked against.
//!
//! Strategies run in a fixed order and the first hit wins:
//!
//! 1. `OurReference` as an exact booking number, then the booking's assigned
//!    project, else the oldest active project linked to the booking.
//! 2. `Project` as a case-insensitive substring of a project name.
//! 3. The same against packing-job names.
//! 4. The same against large-project names.
//!
//! Every step appends to a human-readable trace. Steps within a strategy are
//! joined with ` -> `, strategies with `; `.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        BookingRepo, DbPool, DbResult, JobRepo, LargeProjectRepo, PackingJobRepo, ProjectRepo,
    },
    models::{InvoicePayload, MatchOutcome, MatchStrategy, MatchTarget, MatchType},
};

pub struct InvoiceMatcher {
    bookings: Arc<dyn BookingRepo>,
    projects: Arc<dyn ProjectRepo>,
    jobs: Arc<dyn JobRepo>,
    packing_jobs: Arc<dyn PackingJobRepo>,
    large_projects: Arc<dyn LargeProjectRepo>,
}

/// Accumulates the decision trace.
#[derive(Default)]
struct Trace {
    strategies: Vec<String>,
    attempts: Vec<MatchStrategy>,
}

impl Trace {
    fn record(&mut self, strategy: MatchStrategy, steps: Vec<String>) {
        self.attempts.push(strategy);
        self.strategies.push(steps.join(" -> "));
    }

    fn matched(
        self,
        target: MatchTarget,
        organization_id: Uuid,
        match_type: MatchType,
    ) -> MatchOutcome {
        MatchOutcome {
            target,
            organization_id: Some(organization_id),
            match_type,
            match_detail: self.strategies.join("; "),
            attempts: self.attempts,
        }
    }

    fn unmatched(mut self) -> MatchOutcome {
        if self.strategies.is_empty() {
            self.strategies
                .push("no OurReference or Project to match on".to_string());
        }
        MatchOutcome::unmatched(self.strategies.join("; "), self.attempts)
    }
}

impl InvoiceMatcher {
    pub fn new(
        bookings: Arc<dyn BookingRepo>,
        projects: Arc<dyn ProjectRepo>,
        jobs: Arc<dyn JobRepo>,
        packing_jobs: Arc<dyn PackingJobRepo>,
        large_projects: Arc<dyn LargeProjectRepo>,
    ) -> Self {
        Self {
            bookings,
            projects,
            jobs,
            packing_jobs,
            large_projects,
        }
    }

    pub fn from_db(db: &DbPool) -> Self {
        Self::new(
            db.bookings(),
            db.projects(),
            db.jobs(),
            db.packing_jobs(),
            db.large_projects(),
        )
    }

    /// Run the strategy chain. Database errors abort matching.
    pub async fn match_invoice(&self, payload: &InvoicePayload) -> DbResult<MatchOutcome> {
        let mut trace = Trace::default();

        if let Some(reference) = payload.our_reference() {
            let mut steps = vec![format!("OurReference '{reference}'")];
            let hit = self.match_booking(reference, &mut steps).await?;
            trace.record(MatchStrategy::BookingReference, steps);
            if let Some((target, org, match_type)) = hit {
                return Ok(trace.matched(target, org, match_type));
            }
        }

        let Some(hint) = payload.project_hint() else {
            return Ok(trace.unmatched());
        };

        if let Some(project) = self.projects.find_active_by_name(hint).await? {
            trace.record(
                MatchStrategy::ProjectName,
                vec![
                    format!("Project '{hint}'"),
                    format!("project '{}' ({})", project.name, project.id),
                ],
            );
            return Ok(trace.matched(
                MatchTarget::Project(project.id),
                project.organization_id,
                MatchType::ProjectName,
            ));
        }
        trace.record(
            MatchStrategy::ProjectName,
            vec![format!("Project '{hint}'"), "no active project name match".into()],
        );

        if let Some(packing) = self.packing_jobs.find_active_by_name(hint).await? {
            trace.record(
                MatchStrategy::PackingName,
                vec![
                    format!("Packing '{hint}'"),
                    format!("packing job '{}' ({})", packing.name, packing.id),
                ],
            );
            return Ok(trace.matched(
                MatchTarget::Packing(packing.id),
                packing.organization_id,
                MatchType::PackingName,
            ));
        }
        trace.record(
            MatchStrategy::PackingName,
            vec![format!("Packing '{hint}'"), "no active packing job name match".into()],
        );

        if let Some(large) = self.large_projects.find_active_by_name(hint).await? {
            trace.record(
                MatchStrategy::LargeProjectName,
                vec![
                    format!("Large project '{hint}'"),
                    format!("large project '{}' ({})", large.name, large.id),
                ],
            );
            return Ok(trace.matched(
                MatchTarget::LargeProject(large.id),
                large.organization_id,
                MatchType::LargeProjectName,
            ));
        }
        trace.record(
            MatchStrategy::LargeProjectName,
            vec![
                format!("Large project '{hint}'"),
                "no active large project name match".into(),
            ],
        );

        Ok(trace.unmatched())
    }

    async fn match_booking(
        &self,
        reference: &str,
        steps: &mut Vec<String>,
    ) -> DbResult<Option<(MatchTarget, Uuid, MatchType)>> {
        let Some(booking) = self.bookings.get_by_booking_number(reference).await? else {
            steps.push("no booking with that number".to_string());
            return Ok(None);
        };
        steps.push(format!("booking {} ({})", booking.booking_number, booking.id));

        if let Some(assigned_id) = booking.assigned_project_id {
            if let Some(project) = self.projects.get_active_by_id(assigned_id).await? {
                steps.push(format!(
                    "assigned project '{}' ({})",
                    project.name, project.id
                ));
                return Ok(Some((
                    MatchTarget::Project(project.id),
                    project.organization_id,
                    MatchType::BookingAssignedProject,
                )));
            }

            // The assignment may point at a job, which has no invoices.
            match self.jobs.get_by_id(assigned_id).await? {
                Some(job) => steps.push(format!(
                    "assigned id {assigned_id} is job '{}', not an active project",
                    job.name
                )),
                None => steps.push(format!(
                    "assigned id {assigned_id} is not an active project"
                )),
            }
        }

        match self.projects.find_active_by_booking(booking.id).await? {
            Some(project) => {
                steps.push(format!(
                    "linked project '{}' ({})",
                    project.name, project.id
                ));
                Ok(Some((
                    MatchTarget::Project(project.id),
                    project.organization_id,
                    MatchType::BookingLinkedProject,
                )))
            }
            None => {
                steps.push("no active project linked to booking".to_string());
                Ok(None)
            }
        }
    }
}
