use crate::events::{StatePayload, ViewEntry};
use crate::expiration::EXPIRATION_WARNING_DAYS;
use crate::models::{FilterMode, IconLibrary, SortDirection, Theme};

struct Glyphs {
    open: &'static str,
    done: &'static str,
    archived: &'static str,
    warning: &'static str,
    storage: &'static str,
}

fn glyphs(library: IconLibrary) -> Glyphs {
    match library {
        IconLibrary::FontAwesome => Glyphs {
            open: "[ ]",
            done: "[x]",
            archived: "[#]",
            warning: "(!)",
            storage: "[db]",
        },
        IconLibrary::Octicons => Glyphs {
            open: "○",
            done: "✓",
            archived: "▣",
            warning: "⚠",
            storage: "⛁",
        },
    }
}

pub fn format_days_left(days_left: u32) -> String {
    match days_left {
        0 => "deletes at next check".to_string(),
        1 => "1 day left".to_string(),
        n => format!("{n} days left"),
    }
}

fn header(payload: &StatePayload) -> String {
    let theme = match payload.settings.theme {
        Theme::Light => "light",
        Theme::Dark => "dark",
    };
    let order = match payload.sort_direction {
        SortDirection::Desc => "newest first",
        SortDirection::Asc => "oldest first",
    };
    format!(
        "[{theme}] {} ({order}) | active: {} done: {} archived: {}",
        payload.filter.as_str(),
        payload.counts.active,
        payload.counts.completed,
        payload.counts.archived,
    )
}

fn entry_line(entry: &ViewEntry, glyphs: &Glyphs) -> String {
    let task = &entry.task;
    let mark = if task.archived {
        glyphs.archived
    } else if task.completed {
        glyphs.done
    } else {
        glyphs.open
    };
    match entry.days_left {
        Some(days) => format!("  {mark} {} {} ({})", task.id, task.text, format_days_left(days)),
        None => format!("  {mark} {} {}", task.id, task.text),
    }
}

fn empty_message(filter: FilterMode) -> &'static str {
    match filter {
        FilterMode::All => "  nothing to do",
        FilterMode::Active => "  no open tasks",
        FilterMode::Completed => "  no completed tasks",
        FilterMode::Archived => "  archive is empty",
    }
}

/// Plain-text frame for the terminal front end.
pub fn render_payload(payload: &StatePayload) -> String {
    let glyphs = glyphs(payload.settings.icon_library);
    let mut lines = vec![header(payload)];

    if !payload.storage_available {
        lines.push(format!(
            "{} storage unavailable: changes last for this session only",
            glyphs.storage
        ));
    }

    if payload.view.is_empty() {
        lines.push(empty_message(payload.filter).to_string());
    } else {
        lines.extend(payload.view.iter().map(|entry| entry_line(entry, &glyphs)));
    }

    if !payload.expiring.is_empty() {
        let count = payload.expiring.len();
        let noun = if count == 1 { "task" } else { "tasks" };
        lines.push(format!(
            "{} {count} archived {noun} will be deleted within {EXPIRATION_WARNING_DAYS} days",
            glyphs.warning
        ));
        for item in &payload.expiring {
            lines.push(format!(
                "    {} ({})",
                item.task.text,
                format_days_left(item.days_left)
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiration::ExpiringTask;
    use crate::models::{Settings, Task};
    use crate::view::TaskCounts;

    fn make_task(id: i64, text: &str, completed: bool, archived: bool) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed,
            archived,
            archived_at: archived.then_some(0),
        }
    }

    fn make_payload(view: Vec<ViewEntry>) -> StatePayload {
        StatePayload {
            view,
            filter: FilterMode::All,
            sort_direction: SortDirection::Desc,
            counts: TaskCounts::default(),
            expiring: Vec::new(),
            storage_available: true,
            settings: Settings::default(),
        }
    }

    #[test]
    fn format_days_left_reads_naturally() {
        assert_eq!(format_days_left(0), "deletes at next check");
        assert_eq!(format_days_left(1), "1 day left");
        assert_eq!(format_days_left(12), "12 days left");
    }

    #[test]
    fn renders_header_and_entries() {
        let mut payload = make_payload(vec![
            ViewEntry {
                task: make_task(2, "open one", false, false),
                days_left: None,
            },
            ViewEntry {
                task: make_task(1, "finished", true, false),
                days_left: None,
            },
        ]);
        payload.counts = TaskCounts {
            archived: 0,
            expiring: 0,
            active: 2,
            completed: 1,
        };

        let text = render_payload(&payload);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[light] all (newest first) | active: 2 done: 1 archived: 0",
                "  [ ] 2 open one",
                "  [x] 1 finished",
            ]
        );
    }

    #[test]
    fn icon_library_switches_glyphs() {
        let mut payload = make_payload(vec![ViewEntry {
            task: make_task(5, "boxed", false, true),
            days_left: Some(3),
        }]);
        payload.filter = FilterMode::Archived;
        payload.settings.icon_library = IconLibrary::Octicons;
        payload.settings.theme = Theme::Dark;

        let text = render_payload(&payload);
        assert!(text.starts_with("[dark] archived (newest first)"));
        assert!(text.contains("  ▣ 5 boxed (3 days left)"));
    }

    #[test]
    fn renders_empty_views_storage_and_expiring_notices() {
        let mut payload = make_payload(Vec::new());
        payload.storage_available = false;
        payload.expiring = vec![ExpiringTask {
            task: make_task(9, "old note", false, true),
            days_left: 2,
        }];

        let text = render_payload(&payload);
        assert!(text.contains("[db] storage unavailable"));
        assert!(text.contains("  nothing to do"));
        assert!(text.contains("(!) 1 archived task will be deleted within 7 days"));
        assert!(text.contains("    old note (2 days left)"));
    }
}
