//! User slash-command parser.
//!
//! Parses `/command arg1 arg2 ...` input lines into typed [`ParsedCommand`]
//! values that the event handler can act on.

use crate::dashboard::{WidgetPatch, WidgetType};

/// A parsed user command. Each variant corresponds to a `/command`.
#[derive(Debug, PartialEq)]
pub enum ParsedCommand {
    Edit,
    Add,
    Submit { patch: WidgetPatch },
    Close,
    Delete { id: String },
    Duplicate { id: String },
    Change { id: String },
    Move { id: String, breakpoint: String, x: u32, y: u32, w: u32, h: u32 },
    Undo,
    Redo,
    List,
    Save,
    Help,
    Quit,
}

/// Parse a slash-command string into a [`ParsedCommand`].
///
/// Returns `None` if the input does not start with `/` or is not a recognized
/// command. Commands are case-insensitive.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let cmd = parts.next()?.to_lowercase();
    let rest = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "edit" | "e" => Some(ParsedCommand::Edit),
        "add" | "new" => Some(ParsedCommand::Add),
        "submit" | "ok" => Some(ParsedCommand::Submit {
            patch: parse_patch(rest)?,
        }),
        "close" | "cancel" => Some(ParsedCommand::Close),
        "delete" | "del" | "rm" => Some(ParsedCommand::Delete {
            id: first_word(rest)?,
        }),
        "dup" | "duplicate" => Some(ParsedCommand::Duplicate {
            id: first_word(rest)?,
        }),
        "change" | "configure" => Some(ParsedCommand::Change {
            id: first_word(rest)?,
        }),
        "move" | "mv" => {
            let args: Vec<&str> = rest.split_whitespace().collect();
            if args.len() != 6 {
                return None;
            }
            let nums: Vec<u32> = args[2..]
                .iter()
                .map(|s| s.parse().ok())
                .collect::<Option<_>>()?;
            Some(ParsedCommand::Move {
                id: args[0].to_string(),
                breakpoint: args[1].to_string(),
                x: nums[0],
                y: nums[1],
                w: nums[2],
                h: nums[3],
            })
        }
        "undo" | "u" => Some(ParsedCommand::Undo),
        "redo" | "r" => Some(ParsedCommand::Redo),
        "list" | "ls" => Some(ParsedCommand::List),
        "save" => Some(ParsedCommand::Save),
        "help" | "h" | "?" => Some(ParsedCommand::Help),
        "quit" | "exit" | "q" => Some(ParsedCommand::Quit),
        _ => None,
    }
}

fn first_word(s: &str) -> Option<String> {
    s.split_whitespace().next().map(str::to_string)
}

/// Parse `key=value` pairs into a patch. Values may be double-quoted, and a
/// `config` value may be a JSON object containing spaces.
///
/// Recognized keys: `type`, `title`, `config`, `source`.
fn parse_patch(s: &str) -> Option<WidgetPatch> {
    let mut patch = WidgetPatch::default();
    for token in tokenize(s) {
        let (key, value) = token.split_once('=')?;
        match key.to_lowercase().as_str() {
            "type" => patch.widget_type = Some(WidgetType::parse(value)?),
            "title" => patch.title = Some(value.to_string()),
            "config" => patch.config = Some(serde_json::from_str(value).ok()?),
            "source" | "data_source" => patch.data_source = Some(value.to_string()),
            _ => return None,
        }
    }
    Some(patch)
}

/// Split on whitespace, keeping double-quoted runs and `{...}` JSON intact.
/// Surrounding quotes are stripped.
fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut depth = 0u32;

    for c in s.chars() {
        match c {
            '"' if depth == 0 => in_quotes = !in_quotes,
            '{' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            '}' if !in_quotes => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && !in_quotes && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

pub const HELP_LINES: &[&str] = &[
    "/edit                          toggle edit mode (leaving saves pending changes)",
    "/add                           open the create-widget form",
    "/change <id>                   open the edit form for a widget",
    "/submit key=value ...          submit the open form (type, title, source, config)",
    "/close                         close the form without changes",
    "/delete <id>                   delete a widget",
    "/dup <id>                      duplicate a widget",
    "/move <id> <bp> <x> <y> <w> <h>  drag/resize a widget in one breakpoint",
    "/undo, /redo                   step through history",
    "/list                          show widgets and layout",
    "/save                          write the dashboard document",
    "/quit                          exit",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("/undo"), Some(ParsedCommand::Undo));
        assert_eq!(parse_command("  /EDIT "), Some(ParsedCommand::Edit));
        assert_eq!(
            parse_command("/delete demo-users"),
            Some(ParsedCommand::Delete {
                id: "demo-users".into()
            })
        );
        assert_eq!(parse_command("/delete"), None);
        assert_eq!(parse_command("undo"), None);
        assert_eq!(parse_command("/frobnicate"), None);
    }

    #[test]
    fn test_parse_move() {
        assert_eq!(
            parse_command("/move A lg 0 4 8 4"),
            Some(ParsedCommand::Move {
                id: "A".into(),
                breakpoint: "lg".into(),
                x: 0,
                y: 4,
                w: 8,
                h: 4
            })
        );
        assert_eq!(parse_command("/move A lg 0 4 8"), None);
        assert_eq!(parse_command("/move A lg 0 4 8 -1"), None);
    }

    #[test]
    fn test_parse_submit_with_quotes_and_json() {
        let cmd = parse_command(
            r#"/submit type=kpi title="Total Revenue" config={"format": "currency"} source=metrics.revenue"#,
        );
        let Some(ParsedCommand::Submit { patch }) = cmd else {
            panic!("expected a submit command");
        };
        assert_eq!(patch.widget_type, Some(WidgetType::Kpi));
        assert_eq!(patch.title.as_deref(), Some("Total Revenue"));
        assert_eq!(patch.config, Some(json!({"format": "currency"})));
        assert_eq!(patch.data_source.as_deref(), Some("metrics.revenue"));
    }

    #[test]
    fn test_parse_submit_rejects_bad_input() {
        assert_eq!(parse_command("/submit type=gauge"), None);
        assert_eq!(parse_command("/submit colour=red"), None);
        assert_eq!(parse_command("/submit config={oops"), None);
        assert_eq!(
            parse_command("/submit"),
            Some(ParsedCommand::Submit {
                patch: WidgetPatch::default()
            })
        );
    }
}
