//! Unit tests for notification composition and dispatch.


use crate::messaging::domain::ChatId;
use crate::task::domain::{
    Evidence, NewTaskParams, Task, TaskDescription, TaskName, TransitionCommand,
};
use crate::user::domain::{DisplayName, Email, User};
use chrono::{TimeDelta, Utc};
use mockable::DefaultClock;

fn user(name: &str, chat: Option<i64>) -> User {
    let mut user = User::new(
        Email::new(format!("{}@example.com", name.to_ascii_lowercase())).expect("valid email"),
        DisplayName::new(name).expect("valid name"),
        &DefaultClock,
    );
    user.link_chat(chat.map(ChatId::new));
    user
}

fn task(owner: &User, assignee: Option<&User>) -> Task {
    Task::new(
        NewTaskParams {
            name: TaskName::new("Fix the printer").expect("valid name"),
            description: TaskDescription::new("Third floor").expect("valid description"),
            owner: owner.id(),
            assignee: assignee.map(User::id),
            end_date: Utc::now() + TimeDelta::days(1),
        },
        &DefaultClock,
    )
    .expect("valid task")
}

fn with_evidence(mut task: Task, evidence: Evidence) -> Task {
    let actor = task.assignee().expect("assigned task");
    task.apply(&TransitionCommand::submit_evidence(
        task.id(),
        actor,
        evidence,
        Utc::now(),
    ));
    task
}
