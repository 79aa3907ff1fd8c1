//! Chat message templates rendered with `minijinja`.

use crate::task::domain::Task;
use crate::user::domain::User;
use chrono::{DateTime, Utc};
use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while preparing or rendering templates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// A template failed to compile or render.
    #[error("template '{template}' failed: {reason}")]
    Template {
        /// Template name.
        template: &'static str,
        /// Engine error message.
        reason: String,
    },
}

/// Result type for notification composition.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Every chat text the bot produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Shared task summary block, included by other templates.
    TaskSummary,
    /// Owner copy of a new task.
    TaskCreated,
    /// Assignee copy of a new task.
    TaskAssigned,
    /// Owner notice that the assignee accepted.
    TaskAccepted,
    /// Assignee message after accepting.
    AcceptedSummary,
    /// Assignee message asking for evidence.
    EvidencePrompt,
    /// Assignee confirmation after evidence was stored.
    EvidenceReceived,
    /// Owner summary of submitted evidence.
    EvidenceSubmitted,
    /// Caption for forwarded media evidence.
    EvidenceCaption,
    /// Owner prompt carrying the Approve button after forwarded media.
    ApprovalPrompt,
    /// Owner message after approving.
    TaskApprovedOwner,
    /// Assignee notice of approval.
    TaskApprovedAssignee,
    /// Message after the owner rejected.
    TaskRejected,
    /// Any transition failure.
    ActionFailed,
    /// Undecodable button payload.
    UnknownAction,
    /// Content sent while no evidence is expected.
    Guidance,
    /// Empty or unusable evidence.
    EvidenceInvalid,
    /// Reply to `/start` from a registered user.
    Start,
    /// Reply to anyone the directory does not know.
    UnknownUser,
    /// Storage or other internal failure.
    InternalError,
}

impl Template {
    /// All templates.
    pub const ALL: [Self; 20] = [
        Self::TaskSummary,
        Self::TaskCreated,
        Self::TaskAssigned,
        Self::TaskAccepted,
        Self::AcceptedSummary,
        Self::EvidencePrompt,
        Self::EvidenceReceived,
        Self::EvidenceSubmitted,
        Self::EvidenceCaption,
        Self::ApprovalPrompt,
        Self::TaskApprovedOwner,
        Self::TaskApprovedAssignee,
        Self::TaskRejected,
        Self::ActionFailed,
        Self::UnknownAction,
        Self::Guidance,
        Self::EvidenceInvalid,
        Self::Start,
        Self::UnknownUser,
        Self::InternalError,
    ];

    /// Returns the template name registered with the engine.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TaskSummary => "task_summary",
            Self::TaskCreated => "task_created",
            Self::TaskAssigned => "task_assigned",
            Self::TaskAccepted => "task_accepted",
            Self::AcceptedSummary => "accepted_summary",
            Self::EvidencePrompt => "evidence_prompt",
            Self::EvidenceReceived => "evidence_received",
            Self::EvidenceSubmitted => "evidence_submitted",
            Self::EvidenceCaption => "evidence_caption",
            Self::ApprovalPrompt => "approval_prompt",
            Self::TaskApprovedOwner => "task_approved_owner",
            Self::TaskApprovedAssignee => "task_approved_assignee",
            Self::TaskRejected => "task_rejected",
            Self::ActionFailed => "action_failed",
            Self::UnknownAction => "unknown_action",
            Self::Guidance => "guidance",
            Self::EvidenceInvalid => "evidence_invalid",
            Self::Start => "start",
            Self::UnknownUser => "unknown_user",
            Self::InternalError => "internal_error",
        }
    }

    const fn source(self) -> &'static str {
        match self {
            Self::TaskSummary => concat!(
                "Name: {{ name }}\n",
                "ID: {{ id }}\n",
                "{% if description %}Description: {{ description }}\n{% endif %}",
                "Deadline: {{ end_date }}\n",
                "Status: {{ status }}\n",
                "Created: {{ created_at }}",
            ),
            Self::TaskCreated => concat!(
                "Task created\n",
                "{% include 'task_summary' %}\n",
                "Assignee: {{ assignee or 'not assigned' }}",
            ),
            Self::TaskAssigned => concat!(
                "New task from {{ owner or 'a colleague' }}\n",
                "{% include 'task_summary' %}",
            ),
            Self::TaskAccepted => concat!(
                "{{ assignee or 'The assignee' }} accepted the task \"{{ name }}\".\n",
                "ID: {{ id }}\n",
                "Deadline: {{ end_date }}",
            ),
            Self::AcceptedSummary => concat!(
                "You accepted the task.\n",
                "{% include 'task_summary' %}\n",
                "Press Complete when the work is done.",
            ),
            Self::EvidencePrompt => concat!(
                "Send proof of completion for \"{{ name }}\" ",
                "as a text message, photo, video or document.",
            ),
            Self::EvidenceReceived => concat!(
                "Thanks! Your evidence for \"{{ name }}\" was sent to ",
                "{{ owner or 'the owner' }} for review.",
            ),
            Self::EvidenceSubmitted => concat!(
                "{{ assignee or 'The assignee' }} submitted evidence for \"{{ name }}\".\n",
                "ID: {{ id }}\n",
                "Completed: {{ completed_at }}\n",
                "{% if proof_text %}Proof: {{ proof_text }}",
                "{% else %}Proof: see the attachment below.{% endif %}",
            ),
            Self::EvidenceCaption => {
                "Evidence for \"{{ name }}\"{% if filename %}: {{ filename }}{% endif %}"
            }
            Self::ApprovalPrompt => {
                "Check the evidence for \"{{ name }}\" above and approve it when it is complete."
            }
            Self::TaskApprovedOwner => "You approved the task \"{{ name }}\".",
            Self::TaskApprovedAssignee => {
                "{{ owner or 'The owner' }} approved your task \"{{ name }}\". Well done!"
            }
            Self::TaskRejected => "Task \"{{ name }}\" was rejected.",
            Self::ActionFailed => "Task not found or you are not allowed to do that.",
            Self::UnknownAction => "This button is no longer supported.",
            Self::Guidance => concat!(
                "I am not waiting for evidence from you. ",
                "Press Complete on a task in progress first.",
            ),
            Self::EvidenceInvalid => concat!(
                "Evidence must not be empty. ",
                "Send a text message, photo, video or document.",
            ),
            Self::Start => "Hello! Your chat id is {{ chat_id }}.",
            Self::UnknownUser => concat!(
                "You are not registered yet. ",
                "Your chat id is {{ chat_id }}; share it with your administrator.",
            ),
            Self::InternalError => "Something went wrong. Please try again later.",
        }
    }
}

/// Formats a timestamp the way chat messages show dates.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d.%m.%Y %H:%M").to_string()
}

/// Render context describing one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    id: String,
    name: String,
    description: String,
    status: &'static str,
    end_date: String,
    created_at: String,
    completed_at: Option<String>,
    proof_text: Option<String>,
    owner: Option<String>,
    assignee: Option<String>,
    filename: Option<String>,
}

impl TaskView {
    /// Builds a view of `task` without party names.
    #[must_use]
    pub fn new(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            name: task.name().as_str().to_owned(),
            description: task.description().as_str().to_owned(),
            status: task.status().label(),
            end_date: format_timestamp(task.end_date()),
            created_at: format_timestamp(task.created_at()),
            completed_at: task.completed_at().map(format_timestamp),
            proof_text: task
                .evidence()
                .and_then(|evidence| evidence.proof_text())
                .map(str::to_owned),
            owner: None,
            assignee: None,
            filename: None,
        }
    }

    /// Adds the owner's display name.
    #[must_use]
    pub fn with_owner(mut self, owner: Option<&User>) -> Self {
        self.owner = owner.map(|user| user.display_name().as_str().to_owned());
        self
    }

    /// Adds the assignee's display name.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<&User>) -> Self {
        self.assignee = assignee.map(|user| user.display_name().as_str().to_owned());
        self
    }

    /// Adds the original file name of document evidence.
    #[must_use]
    pub fn with_filename(mut self, filename: Option<&str>) -> Self {
        self.filename = filename.map(str::to_owned);
        self
    }
}

/// Compiled chat templates.
#[derive(Debug)]
pub struct MessageTemplates {
    environment: Environment<'static>,
}

impl MessageTemplates {
    /// Compiles every template.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Template`] when a template does not
    /// compile.
    pub fn new() -> NotificationResult<Self> {
        let mut environment = Environment::new();
        for template in Template::ALL {
            environment
                .add_template(template.name(), template.source())
                .map_err(|err| NotificationError::Template {
                    template: template.name(),
                    reason: err.to_string(),
                })?;
        }
        Ok(Self { environment })
    }

    /// Renders `template` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Template`] when rendering fails.
    pub fn render(
        &self,
        template: Template,
        context: impl Serialize,
    ) -> NotificationResult<String> {
        let fail = |err: minijinja::Error| NotificationError::Template {
            template: template.name(),
            reason: err.to_string(),
        };
        self.environment
            .get_template(template.name())
            .map_err(fail)?
            .render(context)
            .map_err(fail)
    }

    /// Renders a template that takes no variables.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Template`] when rendering fails.
    pub fn render_plain(&self, template: Template) -> NotificationResult<String> {
        self.render(template, minijinja::context! {})
    }
}
