//! Plain-text rendering of a `ListView`.

use std::fmt::Write as _;

use client_core::{ListView, NotificationKind};
use shared::domain::Item;

const SHORT_ID_LEN: usize = 8;
const NOTHING_TO_DO: &str = "You're Free Of ToDos!";

pub fn short_id(item: &Item) -> &str {
    let id = item.uid.as_str();
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((cut, _)) => &id[..cut],
        None => id,
    }
}

fn render_item(out: &mut String, item: &Item, view: &ListView) {
    let mark = if item.done { "[x]" } else { "[ ]" };
    let editing = view
        .editing
        .as_ref()
        .filter(|session| session.id == item.uid);
    match editing {
        Some(session) => {
            let _ = writeln!(
                out,
                "  {mark} {:<width$}  {} -> {}",
                short_id(item),
                item.desc,
                session.draft,
                width = SHORT_ID_LEN
            );
        }
        None => {
            let _ = writeln!(
                out,
                "  {mark} {:<width$}  {}",
                short_id(item),
                item.desc,
                width = SHORT_ID_LEN
            );
        }
    }
}

fn render_partition(
    out: &mut String,
    title: &str,
    empty_text: &str,
    items: &[Item],
    view: &ListView,
) {
    let _ = writeln!(out, "{title} ({})", items.len());
    if items.is_empty() {
        let _ = writeln!(out, "  {empty_text}");
    }
    for item in items {
        render_item(out, item, view);
    }
}

pub fn render(view: &ListView) -> String {
    let mut out = String::new();
    render_partition(&mut out, "TO DO", NOTHING_TO_DO, &view.todo, view);
    out.push('\n');
    render_partition(&mut out, "DONE", "(empty)", &view.done, view);
    if view.loading {
        out.push_str("\n... waiting for the item store\n");
    }
    if let Some(note) = &view.notification {
        let prefix = match note.kind {
            NotificationKind::Success => "*",
            NotificationKind::Error => "!",
        };
        let _ = writeln!(out, "\n{prefix} {}", note.message);
    }
    out
}

#[cfg(test)]
mod tests {
    use client_core::{Feedback, ListAction};

    use super::*;

    #[test]
    fn renders_both_partitions_and_notification() {
        let items = vec![
            Item::new("0f8fad5b-d9cb-469f-a165-70867728950e", "buy milk", false),
            Item::new("2", "walk dog", true),
        ];
        let feedback = Feedback {
            last_action: Some(ListAction::Complete),
            last_target: Some(items[1].clone()),
            error_reason: None,
        };
        let text = render(&ListView::build(&items, &feedback, false, None));

        assert!(text.contains("TO DO (1)"));
        assert!(text.contains("[ ] 0f8fad5b  buy milk"));
        assert!(text.contains("DONE (1)"));
        assert!(text.contains("[x] 2         walk dog"));
        assert!(text.contains("* Completed \"walk dog\""));
    }

    #[test]
    fn empty_todo_partition_says_nothing_to_do() {
        let text = render(&ListView::build(&[], &Feedback::default(), false, None));
        assert!(text.contains("TO DO (0)\n  You're Free Of ToDos!\n"));
        assert!(text.contains("DONE (0)\n  (empty)\n"));
    }

    #[test]
    fn all_done_list_still_shows_empty_todo_message() {
        let items = vec![Item::new("2", "walk dog", true)];
        let text = render(&ListView::build(&items, &Feedback::default(), false, None));
        assert!(text.contains("You're Free Of ToDos!"));
        assert!(!text.contains("(empty)"));
    }
}
