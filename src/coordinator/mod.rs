// Pod coordinator - the service facade over store, notifier and clock
//
// Every mutation follows load -> validate -> mutate -> save while holding
// the project: the in-process lock first, then the store lease that keeps
// other processes on the same store out. Notifications go out on a spawned
// task after the save.

pub mod locks;

use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::errors::EngineError;
use crate::notify::{HandoffNotice, LogNotifier, Notifier};
use crate::observability::{engine_metrics, OperationTimer};
use crate::pod::Project;
use crate::progression::{self, ElapsedUpdate, HandoffOutcome};
use crate::store::{ProjectLease, ProjectStore, StoreError};
use crate::tasks::{
    self, can_create_task, can_edit_handoff, can_edit_task, ensure_allowed, Actor, NewTask, Task,
    TaskStatus,
};
use crate::telemetry::{create_handoff_span, create_operation_span, generate_correlation_id};
use crate::workflows::ProjectDraft;

pub use locks::ProjectLocks;

/// Result of an accepted hand-off.
#[derive(Debug)]
pub struct HandoffReceipt {
    /// Project as saved
    pub project: Project,
    pub outcome: HandoffOutcome,
    /// Set when a notification was dispatched; resolves to whether it was delivered
    pub notification: Option<JoinHandle<bool>>,
}

impl HandoffReceipt {
    /// Wait for the dispatched notification, if any.
    pub async fn notification_delivered(&mut self) -> Option<bool> {
        let handle = self.notification.take()?;
        handle.await.ok()
    }
}

/// What one tick did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    /// In-progress projects that were looked at
    pub sampled: usize,
    pub updated: Vec<(String, ElapsedUpdate)>,
    /// Projects held by another operation and left for the next tick
    pub skipped_locked: Vec<String>,
    pub failed: Vec<String>,
}

/// Exclusive hold on one project; the lease is released before the local lock.
struct ProjectHold {
    _lease: ProjectLease,
    _guard: OwnedMutexGuard<()>,
}

pub struct PodCoordinator {
    store: Arc<dyn ProjectStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    locks: ProjectLocks,
}

impl PodCoordinator {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self {
            store,
            notifier: Arc::new(LogNotifier),
            clock: Arc::new(SystemClock),
            locks: ProjectLocks::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn ProjectStore> {
        &self.store
    }

    async fn hold(&self, project_id: &str) -> Result<ProjectHold, EngineError> {
        let guard = self.locks.acquire(project_id).await;
        let lease = self.store.lock(project_id).await?;
        Ok(ProjectHold {
            _lease: lease,
            _guard: guard,
        })
    }

    async fn load_existing(&self, project_id: &str) -> Result<Project, EngineError> {
        match self.store.load(project_id).await {
            Ok(project) => Ok(project),
            Err(StoreError::NotFound { .. }) => Err(EngineError::not_found("project", project_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Save a mutated project, refusing snapshots that break the data model.
    async fn commit(&self, project: &Project) -> Result<(), EngineError> {
        if let Err(violations) = project.validate() {
            let reasons: Vec<String> = violations.iter().map(ToString::to_string).collect();
            error!(project_id = %project.id, violations = ?reasons, "Refusing to save inconsistent project");
            return Err(EngineError::validation(format!(
                "project state would become inconsistent: {}",
                reasons.join("; ")
            )));
        }
        self.store.save(project).await?;
        Ok(())
    }

    pub async fn create_project(&self, draft: ProjectDraft, launch: bool) -> Result<Project, EngineError> {
        let correlation_id = generate_correlation_id();
        let span = create_operation_span("create_project", None, &correlation_id);
        self.create_project_inner(draft, launch).instrument(span).await
    }

    async fn create_project_inner(&self, draft: ProjectDraft, launch: bool) -> Result<Project, EngineError> {
        let id = Uuid::new_v4().simple().to_string()[..8].to_string();
        let project = Project::from_draft(draft, id, self.clock.now(), launch)?;

        let _hold = self.hold(&project.id).await?;
        self.commit(&project).await?;

        info!(
            project_id = %project.id,
            members = project.members.len(),
            status = %project.status,
            "Project created"
        );
        Ok(project)
    }

    pub async fn launch_project(&self, project_id: &str) -> Result<Project, EngineError> {
        let _hold = self.hold(project_id).await?;
        let mut project = self.load_existing(project_id).await?;
        project.launch(self.clock.now())?;
        self.commit(&project).await?;
        Ok(project)
    }

    pub async fn update_definition(
        &self,
        project_id: &str,
        draft: ProjectDraft,
    ) -> Result<Project, EngineError> {
        let _hold = self.hold(project_id).await?;
        let mut project = self.load_existing(project_id).await?;
        project.replace_definition(draft)?;
        self.commit(&project).await?;
        info!(project_id = %project_id, "Workflow definition updated");
        Ok(project)
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<(), EngineError> {
        {
            let _hold = self.hold(project_id).await?;
            match self.store.delete(project_id).await {
                Ok(()) => {}
                Err(StoreError::NotFound { .. }) => {
                    return Err(EngineError::not_found("project", project_id))
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.locks.forget(project_id);
        Ok(())
    }

    pub async fn load_project(&self, project_id: &str) -> Result<Project, EngineError> {
        self.load_existing(project_id).await
    }

    /// Every stored project, ordered by creation time.
    pub async fn list_projects(&self) -> Result<Vec<Project>, EngineError> {
        let mut projects = Vec::new();
        for id in self.store.list_ids().await? {
            match self.store.load(&id).await {
                Ok(project) => projects.push(project),
                // deleted between listing and loading
                Err(StoreError::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(projects)
    }

    pub async fn submit_handoff(
        &self,
        project_id: &str,
        member_id: &str,
        link: &str,
    ) -> Result<HandoffReceipt, EngineError> {
        self.submit_handoff_as(None, project_id, member_id, link).await
    }

    /// Submit on behalf of `actor`, who must be allowed to edit the member's hand-off.
    pub async fn submit_handoff_as(
        &self,
        actor: Option<&Actor>,
        project_id: &str,
        member_id: &str,
        link: &str,
    ) -> Result<HandoffReceipt, EngineError> {
        let correlation_id = generate_correlation_id();
        let span = create_handoff_span(project_id, member_id, &correlation_id);

        async {
            let timer = OperationTimer::new("submit_handoff");
            let result = self
                .submit_handoff_locked(actor, project_id, member_id, link)
                .await;
            timer.finish();

            if let Err(e) = &result {
                engine_metrics().record_rejection();
                warn!(error.kind = e.kind(), error = %e, "Hand-off rejected");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn submit_handoff_locked(
        &self,
        actor: Option<&Actor>,
        project_id: &str,
        member_id: &str,
        link: &str,
    ) -> Result<HandoffReceipt, EngineError> {
        let _hold = self.hold(project_id).await?;
        let mut project = self.load_existing(project_id).await?;
        // unknown members are reported by the engine
        if let (Some(actor), Some(member)) = (actor, project.member(member_id)) {
            ensure_allowed(can_edit_handoff(actor, member), actor, "hand off for this member")?;
        }

        let outcome = progression::submit_handoff(&mut project, member_id, link, self.clock.now())?;
        self.commit(&project).await?;

        let metrics = engine_metrics();
        let notification = match &outcome {
            HandoffOutcome::Advanced {
                completed_member,
                next_member,
                ..
            } => {
                metrics.record_advance();
                let notice = HandoffNotice::new(&project, completed_member, next_member);
                Some(self.dispatch_notification(notice))
            }
            HandoffOutcome::Finished { .. } => {
                metrics.record_completion();
                None
            }
            HandoffOutcome::LinkUpdated { .. } => {
                metrics.record_link_edit();
                None
            }
        };

        Ok(HandoffReceipt {
            project,
            outcome,
            notification,
        })
    }

    fn dispatch_notification(&self, notice: HandoffNotice) -> JoinHandle<bool> {
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(
            async move {
                match notifier.notify(&notice).await {
                    Ok(()) => {
                        engine_metrics().record_notification(true);
                        true
                    }
                    Err(e) => {
                        engine_metrics().record_notification(false);
                        warn!(
                            notifier = notifier.name(),
                            project_id = %notice.project_id,
                            recipient = %notice.recipient.id,
                            error = %e,
                            "Hand-off notification failed"
                        );
                        false
                    }
                }
            }
            .in_current_span(),
        )
    }

    pub async fn create_task(&self, project_id: &str, new_task: NewTask) -> Result<Task, EngineError> {
        self.create_task_as(None, project_id, new_task).await
    }

    pub async fn create_task_as(
        &self,
        actor: Option<&Actor>,
        project_id: &str,
        new_task: NewTask,
    ) -> Result<Task, EngineError> {
        let _hold = self.hold(project_id).await?;
        let mut project = self.load_existing(project_id).await?;
        if let Some(actor) = actor {
            ensure_allowed(can_create_task(actor, &project), actor, "create tasks here")?;
        }
        let task = tasks::create_task(&mut project, new_task, self.clock.now())?;
        self.commit(&project).await?;
        Ok(task)
    }

    pub async fn update_task_status(
        &self,
        project_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<Task, EngineError> {
        self.update_task_status_as(None, project_id, task_id, status).await
    }

    pub async fn update_task_status_as(
        &self,
        actor: Option<&Actor>,
        project_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<Task, EngineError> {
        let _hold = self.hold(project_id).await?;
        let mut project = self.load_existing(project_id).await?;
        check_task_edit(actor, &project, task_id)?;
        let task = tasks::update_task_status(&mut project, task_id, status, self.clock.now())?;
        self.commit(&project).await?;
        Ok(task)
    }

    pub async fn attach_proof_link(
        &self,
        project_id: &str,
        task_id: &str,
        link: &str,
    ) -> Result<Task, EngineError> {
        self.attach_proof_link_as(None, project_id, task_id, link).await
    }

    pub async fn attach_proof_link_as(
        &self,
        actor: Option<&Actor>,
        project_id: &str,
        task_id: &str,
        link: &str,
    ) -> Result<Task, EngineError> {
        let _hold = self.hold(project_id).await?;
        let mut project = self.load_existing(project_id).await?;
        check_task_edit(actor, &project, task_id)?;
        let task = tasks::attach_proof_link(&mut project, task_id, link)?;
        self.commit(&project).await?;
        Ok(task)
    }

    /// One clock-sampler pass over every stored project.
    ///
    /// Projects locked by a concurrent operation are skipped, never waited on.
    /// A failure on one project is logged and does not stop the pass.
    pub async fn tick(&self) -> Result<TickReport, EngineError> {
        let now = self.clock.now();
        let mut report = TickReport::default();

        for project_id in self.store.list_ids().await? {
            let Some(guard) = self.locks.try_acquire(&project_id) else {
                report.skipped_locked.push(project_id);
                continue;
            };
            let lease = match self.store.try_lock(&project_id).await {
                Ok(lease) => lease,
                Err(StoreError::Lock { reason }) => {
                    debug!(project_id = %project_id, reason = %reason, "Project held elsewhere, skipping");
                    report.skipped_locked.push(project_id);
                    continue;
                }
                Err(e) => {
                    error!(project_id = %project_id, error = %e, "Tick failed to lease project");
                    report.failed.push(project_id);
                    continue;
                }
            };
            let _hold = ProjectHold {
                _lease: lease,
                _guard: guard,
            };

            let mut project = match self.store.load(&project_id).await {
                Ok(project) => project,
                Err(StoreError::NotFound { .. }) => continue,
                Err(e) => {
                    error!(project_id = %project_id, error = %e, "Tick failed to load project");
                    report.failed.push(project_id);
                    continue;
                }
            };

            if project.current_active_member().is_none() {
                continue;
            }
            report.sampled += 1;

            let Some(update) = progression::sample_active_member(&mut project, now) else {
                continue;
            };

            if let Err(e) = self.store.save(&project).await {
                error!(project_id = %project_id, error = %e, "Tick failed to save project");
                report.failed.push(project_id);
                continue;
            }
            report.updated.push((project_id, update));
        }

        engine_metrics().record_tick(
            report.updated.len() as u64,
            report.skipped_locked.len() as u64,
        );
        debug!(
            sampled = report.sampled,
            updated = report.updated.len(),
            skipped = report.skipped_locked.len(),
            failed = report.failed.len(),
            "Tick complete"
        );
        Ok(report)
    }
}

/// Unknown tasks fall through to the lifecycle, which reports them.
fn check_task_edit(actor: Option<&Actor>, project: &Project, task_id: &str) -> Result<(), EngineError> {
    if let (Some(actor), Some(task)) = (actor, project.task(task_id)) {
        ensure_allowed(can_edit_task(actor, task, project), actor, "edit this task")?;
    }
    Ok(())
}
