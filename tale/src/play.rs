//! The interactive story loop.
//!
//! Reads numbered choices from stdin and drives a StorySession turn by
//! turn. Anything that is not a valid choice re-prompts with the same
//! menu; `quit` (or end of input) flushes pending scenes and exits.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tale_core::{ActionMenu, SessionConfig, SessionError, StoryError, StorySession, StorySummary};

/// Command line options for a story run.
#[derive(Debug, Default)]
pub struct Options {
    pub name: Option<String>,
    pub scene: Option<String>,
    pub model: Option<String>,
    pub journal: Option<PathBuf>,
}

/// Parse story options from command line arguments.
pub fn parse_options(args: &[String]) -> Options {
    let mut options = Options::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--name" => {
                if let Some(name) = args.get(i + 1) {
                    options.name = Some(name.clone());
                    i += 1;
                }
            }
            "--scene" => {
                if let Some(scene) = args.get(i + 1) {
                    options.scene = Some(scene.clone());
                    i += 1;
                }
            }
            "--model" => {
                if let Some(model) = args.get(i + 1) {
                    options.model = Some(model.clone());
                    i += 1;
                }
            }
            "--journal" => {
                if let Some(path) = args.get(i + 1) {
                    options.journal = Some(PathBuf::from(path));
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    options
}

/// Run the story loop until the player quits or input ends.
pub async fn run(options: Options) -> Result<(), SessionError> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let name = match options.name {
        Some(name) => name,
        None => match prompt_name(&mut lines) {
            Some(name) => name,
            None => {
                println!("Goodbye!");
                return Ok(());
            }
        },
    };

    let scene = match options.scene {
        Some(scene) => Some(scene),
        None => match prompt_scene(&mut lines) {
            Some(scene) => scene,
            None => {
                println!("Goodbye!");
                return Ok(());
            }
        },
    };

    let mut config = SessionConfig::new(&name);
    if let Some(scene) = scene {
        config = config.with_opening_scene(scene);
    }
    if let Some(model) = options.model {
        config = config.with_model(model);
    }
    if let Some(path) = options.journal {
        config = config.with_journal_path(path);
    }

    let mut session = StorySession::new(config)?;

    println!();
    println!("The storyteller is setting the stage...");
    session.begin().await?;
    print_summary(session.summary());

    loop {
        let menu = session.propose_actions().await?;
        let text = menu_text(session.current_scene(), &name, &menu);

        let outcome = loop {
            let choice = match prompt_choice(&mut lines, &text) {
                Some(choice) => choice,
                None => {
                    session.finish().await?;
                    println!("Goodbye!");
                    return Ok(());
                }
            };

            match session.advance(&menu, choice).await {
                Ok(outcome) => break outcome,
                Err(SessionError::Story(e @ StoryError::InvalidChoice { .. })) => {
                    println!("{e}");
                    continue;
                }
                Err(e) => return Err(e),
            }
        };

        print!("{}", turn_text(&outcome.scene));

        if outcome.compacted {
            print_summary(session.summary());
        }
    }
}

/// Ask for the character's name, re-prompting until one is given.
///
/// Returns `None` when input ends first.
fn prompt_name(lines: &mut impl Iterator<Item = io::Result<String>>) -> Option<String> {
    loop {
        print!("What is the character's name? ");
        io::stdout().flush().ok();

        let line = lines.next()?.ok()?;
        let name = line.trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
        println!("The story needs a name to begin.");
    }
}

/// Ask for the opening scene.
///
/// Returns `None` when input ends, `Some(None)` when the player leaves
/// it blank for the storyteller to invent.
fn prompt_scene(lines: &mut impl Iterator<Item = io::Result<String>>) -> Option<Option<String>> {
    print!("What is the first scene? ");
    io::stdout().flush().ok();

    let line = lines.next()?.ok()?;
    let scene = line.trim();
    if scene.is_empty() {
        Some(None)
    } else {
        Some(Some(scene.to_string()))
    }
}

/// Show the menu and read the player's numbered choice, re-prompting
/// until a line parses as a number.
///
/// Returns `None` when the player quits or input ends.
fn prompt_choice(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    menu: &str,
) -> Option<i64> {
    loop {
        println!();
        print!("{menu}");
        print!("> ");
        io::stdout().flush().ok();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {e}");
                return None;
            }
            None => {
                println!();
                return None;
            }
        };
        let line = line.trim();

        if is_quit(line) {
            return None;
        }

        match line.parse() {
            Ok(choice) => return Some(choice),
            Err(_) => println!("Please enter a valid number."),
        }
    }
}

fn is_quit(line: &str) -> bool {
    line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q")
}

fn menu_text(scene: &str, name: &str, menu: &ActionMenu) -> String {
    format!(
        "{scene}\n\n{name}, you have the following options for what to do next:\n\n{}\n",
        menu.numbered()
    )
}

/// What gets printed as soon as a turn resolves, before the next menu.
fn turn_text(scene: &str) -> String {
    format!("\n{scene}\n")
}

fn print_summary(summary: &StorySummary) {
    if summary.is_empty() {
        return;
    }
    println!();
    println!("{}", summary.as_context());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(inputs: &[&str]) -> impl Iterator<Item = io::Result<String>> {
        inputs
            .iter()
            .map(|s| Ok(s.to_string()))
            .collect::<Vec<io::Result<String>>>()
            .into_iter()
    }

    #[test]
    fn test_parse_options() {
        let args: Vec<String> = ["tale", "--name", "Aria", "--journal", "aria.json"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let options = parse_options(&args);

        assert_eq!(options.name.as_deref(), Some("Aria"));
        assert_eq!(options.journal, Some(PathBuf::from("aria.json")));
        assert!(options.scene.is_none());
        assert!(options.model.is_none());
    }

    #[test]
    fn test_parse_options_ignores_trailing_flag_without_value() {
        let args: Vec<String> = ["tale", "--name"].iter().map(|s| s.to_string()).collect();

        let options = parse_options(&args);

        assert!(options.name.is_none());
    }

    #[test]
    fn test_menu_text_format() {
        let menu = ActionMenu::new(vec!["Look around".to_string(), "Leave".to_string()])
            .expect("menu should build");

        let text = menu_text("A dark cave.", "Aria", &menu);

        assert_eq!(
            text,
            "A dark cave.\n\nAria, you have the following options for what to do next:\n\n\
             1. Look around\n2. Leave\n"
        );
    }

    #[test]
    fn test_turn_text_shows_the_new_scene() {
        assert_eq!(turn_text("The door gives way."), "\nThe door gives way.\n");
    }

    #[test]
    fn test_is_quit() {
        assert!(is_quit("quit"));
        assert!(is_quit("QUIT"));
        assert!(is_quit("q"));
        assert!(is_quit("Q"));
        assert!(!is_quit("quite"));
        assert!(!is_quit("2"));
        assert!(!is_quit(""));
    }

    #[test]
    fn test_prompt_name_skips_blank_lines() {
        let mut lines = scripted(&["", "   ", "Aria"]);

        assert_eq!(prompt_name(&mut lines), Some("Aria".to_string()));
    }

    #[test]
    fn test_prompt_name_ends_on_eof() {
        let mut lines = scripted(&[]);

        assert_eq!(prompt_name(&mut lines), None);
    }

    #[test]
    fn test_prompt_scene_blank_defers_to_storyteller() {
        let mut lines = scripted(&[""]);

        assert_eq!(prompt_scene(&mut lines), Some(None));
    }

    #[test]
    fn test_prompt_scene_keeps_text() {
        let mut lines = scripted(&["A ruined tower at dawn."]);

        assert_eq!(
            prompt_scene(&mut lines),
            Some(Some("A ruined tower at dawn.".to_string()))
        );
    }

    #[test]
    fn test_prompt_choice_reprompts_until_number() {
        let mut lines = scripted(&["abc", "", "2"]);

        assert_eq!(prompt_choice(&mut lines, "menu\n"), Some(2));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_prompt_choice_accepts_any_integer() {
        // Range is the menu's concern; the prompt only cares about parsing.
        let mut lines = scripted(&["99"]);
        assert_eq!(prompt_choice(&mut lines, "menu\n"), Some(99));

        let mut lines = scripted(&["-3"]);
        assert_eq!(prompt_choice(&mut lines, "menu\n"), Some(-3));
    }

    #[test]
    fn test_prompt_choice_ends_on_quit() {
        let mut lines = scripted(&["q"]);

        assert_eq!(prompt_choice(&mut lines, "menu\n"), None);
    }

    #[test]
    fn test_prompt_choice_ends_on_eof() {
        let mut lines = scripted(&[]);

        assert_eq!(prompt_choice(&mut lines, "menu\n"), None);
    }

    #[test]
    fn test_prompt_choice_ends_on_read_error() {
        let mut lines = std::iter::once(Err::<String, _>(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "stdin closed",
        )));

        assert_eq!(prompt_choice(&mut lines, "menu\n"), None);
    }
}
