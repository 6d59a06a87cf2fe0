//! Render-ready snapshot of the list: the two partitions plus a
//! notification for the last action.

use shared::domain::Item;

use crate::controller::{EditSession, Feedback, ListAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

fn success_verb(action: ListAction) -> Option<&'static str> {
    match action {
        ListAction::Add => Some("Added"),
        ListAction::Remove => Some("Removed"),
        ListAction::Edit => Some("Updated"),
        ListAction::Complete => Some("Completed"),
        ListAction::Incomplete => Some("Reopened"),
        ListAction::Error => None,
    }
}

impl Notification {
    pub fn from_feedback(feedback: &Feedback) -> Option<Self> {
        let action = feedback.last_action?;
        let Some(verb) = success_verb(action) else {
            let reason = feedback
                .error_reason
                .as_deref()
                .filter(|reason| !reason.is_empty())
                .unwrap_or("something went wrong");
            return Some(Self {
                kind: NotificationKind::Error,
                message: format!("Error: {reason}"),
            });
        };

        let target = feedback.last_target.as_ref()?;
        Some(Self {
            kind: NotificationKind::Success,
            message: format!("{verb} \"{}\"", target.desc),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub todo: Vec<Item>,
    pub done: Vec<Item>,
    pub loading: bool,
    pub editing: Option<EditSession>,
    pub notification: Option<Notification>,
}

impl ListView {
    pub fn build(
        items: &[Item],
        feedback: &Feedback,
        loading: bool,
        editing: Option<EditSession>,
    ) -> Self {
        let (done, todo): (Vec<Item>, Vec<Item>) = items.iter().cloned().partition(|item| item.done);
        Self {
            todo,
            done,
            loading,
            editing,
            notification: Notification::from_feedback(feedback),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.todo.is_empty() && self.done.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_keep_collection_order() {
        let items = vec![
            Item::new("1", "a", false),
            Item::new("2", "b", true),
            Item::new("3", "c", false),
            Item::new("4", "d", true),
        ];
        let view = ListView::build(&items, &Feedback::default(), false, None);
        let ids = |items: &[Item]| items.iter().map(|i| i.uid.to_string()).collect::<Vec<_>>();
        assert_eq!(ids(&view.todo), vec!["1", "3"]);
        assert_eq!(ids(&view.done), vec!["2", "4"]);
        assert_eq!(view.notification, None);
    }

    #[test]
    fn error_notification_falls_back_to_generic_text() {
        let feedback = Feedback {
            last_action: Some(ListAction::Error),
            last_target: None,
            error_reason: None,
        };
        let note = Notification::from_feedback(&feedback).expect("notification");
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, "Error: something went wrong");
    }

    #[test]
    fn completion_notification_names_the_item() {
        let feedback = Feedback {
            last_action: Some(ListAction::Complete),
            last_target: Some(Item::new("1", "buy milk", true)),
            error_reason: None,
        };
        let note = Notification::from_feedback(&feedback).expect("notification");
        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.message, "Completed \"buy milk\"");
    }
}
