use crate::events::StatePayload;
use crate::models::{FilterMode, SortDirection, TaskId};
use crate::state::AppState;

pub const HELP_TEXT: &str = "\
commands:
  add <text>            create a task
  toggle <id>           mark done / not done
  edit <id> <text>      replace the task text
  archive <id>          move to the archive (kept 30 days)
  restore <id>          bring back from the archive
  delete <id>           delete permanently
  filter <all|active|completed|archived>
  archived              show the archive
  sort [asc|desc]       set or flip the sort direction
  purge                 drop expired archived tasks now
  theme                 switch light/dark
  icons                 switch icon set
  list                  redraw
  help                  this text
  quit";

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Toggle(TaskId),
    Edit(TaskId, String),
    Archive(TaskId),
    Restore(TaskId),
    Delete(TaskId),
    Filter(FilterMode),
    /// `None` flips the current direction.
    Sort(Option<SortDirection>),
    Purge,
    Theme,
    Icons,
    List,
    Help,
    Quit,
}

fn parse_id(value: &str) -> Result<TaskId, String> {
    value
        .trim()
        .parse::<TaskId>()
        .map_err(|_| format!("invalid task id: {}", value.trim()))
}

fn split_id_and_text(rest: &str) -> Result<(TaskId, String), String> {
    let rest = rest.trim();
    let (id, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Ok((parse_id(id)?, text.trim().to_string()))
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let command = match name.to_lowercase().as_str() {
        "add" | "new" => Command::Add(rest.to_string()),
        "toggle" | "done" => Command::Toggle(parse_id(rest)?),
        "edit" => {
            let (id, text) = split_id_and_text(rest)?;
            Command::Edit(id, text)
        }
        "archive" => Command::Archive(parse_id(rest)?),
        "restore" => Command::Restore(parse_id(rest)?),
        "delete" | "rm" => Command::Delete(parse_id(rest)?),
        "filter" => Command::Filter(
            FilterMode::parse(rest).ok_or_else(|| format!("unknown filter: {rest}"))?,
        ),
        "archived" => Command::Filter(FilterMode::Archived),
        "sort" => match rest.to_lowercase().as_str() {
            "" => Command::Sort(None),
            "asc" | "oldest" => Command::Sort(Some(SortDirection::Asc)),
            "desc" | "newest" => Command::Sort(Some(SortDirection::Desc)),
            other => return Err(format!("unknown sort direction: {other}")),
        },
        "purge" => Command::Purge,
        "theme" => Command::Theme,
        "icons" => Command::Icons,
        "list" | "ls" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(command))
}

/// Applies a command and returns the refreshed state. Unknown ids are not
/// errors; only blank task text and a refused create are reported.
pub fn run_command(state: &mut AppState, command: Command) -> CommandResult<StatePayload> {
    match command {
        Command::Add(text) => {
            if let Err(error) = state.add_task(&text) {
                return err(&error.to_string());
            }
        }
        Command::Toggle(id) => {
            state.toggle_task(id);
        }
        Command::Edit(id, text) => {
            if text.trim().is_empty() {
                return err("task text must not be empty");
            }
            state.edit_task(id, &text);
        }
        Command::Archive(id) => {
            state.archive_task(id);
        }
        Command::Restore(id) => {
            state.restore_task(id);
        }
        Command::Delete(id) => {
            state.delete_task(id);
        }
        Command::Filter(filter) => state.set_filter(filter),
        Command::Sort(Some(direction)) => state.set_sort_direction(direction),
        Command::Sort(None) => {
            state.toggle_sort_direction();
        }
        Command::Purge => {
            state.purge_expired();
        }
        Command::Theme => {
            state.toggle_theme();
        }
        Command::Icons => {
            state.toggle_icon_library();
        }
        Command::List | Command::Help | Command::Quit => {}
    }
    ok(state.snapshot())
}
