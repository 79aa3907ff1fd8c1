//! Shared wiring for in-memory integration tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use mockable::{Clock, DefaultClock};
use taskbot::{
    bot::{
        domain::{ButtonPayload, ButtonVerb},
        services::{EvidenceContexts, InteractionRouter},
    },
    messaging::{
        adapters::memory::InMemoryTransport,
        domain::{CallbackId, ChatId, InboundEvent, MessageId, MessageRef},
    },
    notification::{
        domain::MessageTemplates,
        services::{CreationNotifier, DispatcherConfig, NotificationComposer, NotificationDispatcher},
    },
    task::{
        adapters::memory::InMemoryTaskRepository,
        domain::TaskId,
        services::{CreateTaskRequest, LifecycleEngine, TaskService},
    },
    user::{
        adapters::memory::InMemoryUserDirectory,
        domain::{DisplayName, Email, User},
        ports::UserDirectory,
    },
};

pub const OWNER_CHAT: i64 = 100;
pub const ASSIGNEE_CHAT: i64 = 200;

pub type TestRouter = InteractionRouter<InMemoryTaskRepository, InMemoryUserDirectory, DefaultClock>;
pub type TestTaskService = TaskService<InMemoryTaskRepository, DefaultClock>;

/// Fully wired bot over in-memory adapters.
pub struct Harness {
    pub transport: InMemoryTransport,
    pub repository: Arc<InMemoryTaskRepository>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub tasks: TestTaskService,
    pub router: Arc<TestRouter>,
    pub owner: User,
    pub assignee: User,
}

async fn member(
    directory: &InMemoryUserDirectory,
    name: &str,
    chat: i64,
) -> Result<User, eyre::Report> {
    let mut user = User::new(
        Email::new(format!("{}@example.com", name.to_ascii_lowercase()))?,
        DisplayName::new(name)?,
        &DefaultClock,
    );
    user.link_chat(Some(ChatId::new(chat)));
    directory.store(&user).await?;
    Ok(user)
}

impl Harness {
    /// Wires a bot whose outbound calls go to `transport`.
    pub async fn with_transport(transport: InMemoryTransport) -> Result<Self, eyre::Report> {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let clock = Arc::new(DefaultClock);
        let composer = Arc::new(NotificationComposer::new(Arc::new(MessageTemplates::new()?)));
        let dispatcher = Arc::new(NotificationDispatcher::start(
            Arc::new(transport.clone()),
            DispatcherConfig {
                workers: 2,
                queue_capacity: 32,
                send_timeout: Duration::from_secs(2),
            },
        ));

        let owner = member(&directory, "Olga", OWNER_CHAT).await?;
        let assignee = member(&directory, "Ivan", ASSIGNEE_CHAT).await?;

        let tasks = TaskService::new(Arc::clone(&repository), Arc::clone(&clock)).with_creation_hook(
            Arc::new(CreationNotifier::new(
                Arc::clone(&directory),
                Arc::clone(&composer),
                Arc::clone(&dispatcher),
            )),
        );
        let router = Arc::new(InteractionRouter::new(
            LifecycleEngine::new(Arc::clone(&repository), Arc::clone(&clock)),
            directory,
            Arc::new(transport.clone()),
            composer,
            Arc::clone(&dispatcher),
            EvidenceContexts::new(Duration::from_secs(1800), clock),
        ));

        Ok(Self {
            transport,
            repository,
            dispatcher,
            tasks,
            router,
            owner,
            assignee,
        })
    }

    /// Wires a bot over a fresh recording transport.
    pub async fn new() -> Result<Self, eyre::Report> {
        Self::with_transport(InMemoryTransport::new()).await
    }

    /// Creates a task from the owner to the assignee.
    pub async fn create_task(&self, name: &str) -> Result<TaskId, eyre::Report> {
        let request = CreateTaskRequest::new(
            self.owner.id(),
            name,
            DefaultClock.utc() + TimeDelta::days(1),
        )
        .with_assignee(self.assignee.id());
        Ok(self.tasks.create(request).await?.id())
    }
}

/// Builds a button press as the transport would report it.
pub fn press(chat: i64, verb: ButtonVerb, task_id: TaskId) -> InboundEvent {
    InboundEvent::ButtonPress {
        callback_id: CallbackId::new(format!("{chat}-{}", verb.as_str())),
        actor: ChatId::new(chat),
        payload: ButtonPayload::new(verb, task_id).to_string(),
        message: Some(MessageRef::new(ChatId::new(chat), MessageId::new(1))),
    }
}

/// Builds a text message from `chat`.
pub fn text(chat: i64, body: &str) -> InboundEvent {
    InboundEvent::Text {
        actor: ChatId::new(chat),
        text: body.to_owned(),
    }
}
