//! Interactive line-based front end for the desk.

use super::table;
use crate::application::{Added, Desk, DeskView, Status};
use crate::domain::Summary;
use std::io::{self, BufRead, Write};

const HELP: &str = "\
Commands:
  add <name>                         add a customer
  all                                list every customer, newest first
  today                              list today's customers in queue order
  search [name=..] [id=..] [seq=..]  search (name/id are case-sensitive)
  stats                              show total and today's counts
  help                               show this help
  quit                               leave
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add(String),
    All,
    Today,
    Search {
        name: String,
        id: String,
        seq: String,
    },
    Stats,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "" => Ok(ShellCommand::Empty),
        "add" => Ok(ShellCommand::Add(rest.to_string())),
        "all" | "list" => Ok(ShellCommand::All),
        "today" => Ok(ShellCommand::Today),
        "search" | "find" => parse_search(rest),
        "stats" => Ok(ShellCommand::Stats),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("Unknown command '{other}', type 'help'")),
    }
}

// `name=Mary Ann seq=3`: words without a key continue the previous value.
fn parse_search(args: &str) -> Result<ShellCommand, String> {
    let mut fields: [String; 3] = Default::default();
    let mut current: Option<usize> = None;

    for word in args.split_whitespace() {
        let keyed = word.split_once('=').and_then(|(key, value)| {
            let slot = match key {
                "name" => 0,
                "id" => 1,
                "seq" => 2,
                _ => return None,
            };
            Some((slot, value))
        });

        match (keyed, current) {
            (Some((slot, value)), _) => {
                fields[slot] = value.to_string();
                current = Some(slot);
            }
            (None, Some(slot)) => {
                fields[slot].push(' ');
                fields[slot].push_str(word);
            }
            (None, None) => {
                return Err(format!(
                    "Expected name=, id= or seq= before '{word}'"
                ));
            }
        }
    }

    let [name, id, seq] = fields;
    Ok(ShellCommand::Search { name, id, seq })
}

/// Run the read-eval-print loop until `quit` or end of input.
///
/// A line that is not valid UTF-8 is reported and skipped.
pub fn run(desk: &Desk, mut input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
    match desk.summary() {
        Ok(summary) => table::render_summary(out, &summary)?,
        Err(err) => table::render_status(out, &Status::error(&err))?,
    }
    writeln!(out, "Type 'help' for commands.")?;

    let mut line = Vec::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let parsed = std::str::from_utf8(&line)
            .map_err(|_| "Line is not valid UTF-8 text, ignored".to_string())
            .and_then(parse_command);
        let command = match parsed {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "error: {message}")?;
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        execute(desk, command, out)?;
    }
    Ok(())
}

enum Screen {
    Added(Added),
    List(DeskView),
    Counts(Summary),
    Help,
}

pub fn execute(desk: &Desk, command: ShellCommand, out: &mut impl Write) -> io::Result<()> {
    let screen = match command {
        ShellCommand::Add(name) => desk.add(&name).map(Screen::Added),
        ShellCommand::All => desk.show_all().map(Screen::List),
        ShellCommand::Today => desk.show_today().map(Screen::List),
        ShellCommand::Search { name, id, seq } => desk.search(&name, &id, &seq).map(Screen::List),
        ShellCommand::Stats => desk.summary().map(Screen::Counts),
        ShellCommand::Help => Ok(Screen::Help),
        ShellCommand::Quit | ShellCommand::Empty => return Ok(()),
    };

    match screen {
        Ok(Screen::Added(added)) => {
            table::render_added(out, &added.customer)?;
            table::render_summary(out, &added.view.summary)?;
            table::render_status(out, &added.view.status)
        }
        Ok(Screen::List(view)) => table::render_view(out, &view),
        Ok(Screen::Counts(summary)) => table::render_summary(out, &summary),
        Ok(Screen::Help) => write!(out, "{HELP}"),
        Err(err) => table::render_status(out, &Status::error(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::db::Database;
    use crate::infra::speech::SilentNotifier;
    use std::io::Cursor;
    use std::sync::Arc;

    fn session(db: &Database, script: impl AsRef<[u8]>) -> String {
        let desk = Desk::new(db.customer_repo(), Arc::new(SilentNotifier));
        let mut out = Vec::new();
        run(&desk, Cursor::new(script.as_ref().to_vec()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  "), Ok(ShellCommand::Empty));
        assert_eq!(
            parse_command("add  Mary Ann "),
            Ok(ShellCommand::Add("Mary Ann".into()))
        );
        assert_eq!(parse_command("TODAY"), Ok(ShellCommand::Today));
        assert_eq!(parse_command("exit"), Ok(ShellCommand::Quit));
        assert!(parse_command("delete 3").is_err());
    }

    #[test]
    fn test_parse_search_fields() {
        assert_eq!(
            parse_command("search name=Mary Ann seq=3"),
            Ok(ShellCommand::Search {
                name: "Mary Ann".into(),
                id: String::new(),
                seq: "3".into(),
            })
        );
        assert_eq!(
            parse_command("search id=AB12"),
            Ok(ShellCommand::Search {
                name: String::new(),
                id: "AB12".into(),
                seq: String::new(),
            })
        );
        assert!(parse_command("search Mary").is_err());
    }

    #[test]
    fn test_session_adds_lists_and_reports_errors() {
        let db = Database::open_in_memory().unwrap();
        let transcript = session(
            &db,
            "add Alice\nadd   \nadd Bob\ntoday\nsearch seq=x\nsearch name=Zed\nstats\nquit\nadd Never\n",
        );

        assert!(transcript.starts_with("Total: 0  Today: 0\n"));
        assert!(transcript.contains("Customer 'Alice' has been added successfully!"));
        assert!(transcript.contains("ok: Added customer: Bob (#02)"));
        assert!(transcript.contains("error: Invalid input: Please enter a customer name to continue"));
        assert!(transcript.contains("error: Invalid input: Daily number must be a valid number"));
        assert!(transcript.contains("warning: No customers found"));
        assert!(transcript.contains("Total: 2  Today: 2"));
        assert!(!transcript.contains("Never"));

        let today = transcript
            .lines()
            .skip_while(|line| !line.starts_with("Daily #"))
            .nth(2)
            .unwrap();
        assert!(today.starts_with("#01"));
        assert!(today.contains("Alice"));

        assert_eq!(db.customer_repo().count_all().unwrap(), 2);
    }

    #[test]
    fn test_session_ends_at_eof() {
        let db = Database::open_in_memory().unwrap();
        let transcript = session(&db, "help\nbogus\n");
        assert!(transcript.contains("Commands:"));
        assert!(transcript.contains("error: Unknown command 'bogus'"));
    }

    #[test]
    fn test_session_skips_undecodable_lines() {
        let db = Database::open_in_memory().unwrap();
        let transcript = session(&db, b"add Alice\n\xff\xfe\nadd Bob\nquit\n");

        assert!(transcript.contains("error: Line is not valid UTF-8 text, ignored"));
        assert!(transcript.contains("ok: Added customer: Bob (#02)"));
        assert_eq!(db.customer_repo().count_all().unwrap(), 2);
    }
}
