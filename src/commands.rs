//! Command surface
//!
//! The three exploration commands work against any [`Inspector`]:
//!
//! - `explore ARG`: ARG as a value if it evaluates, otherwise as a type
//! - `explore value ARG`: ARG must evaluate to a value
//! - `explore type ARG`: ARG as a type name, otherwise the type of the value
//!   ARG evaluates to
//!
//! [`Command`] is the line-level grammar of the REPL, which adds `print`,
//! `set var`, `help` and `quit` on top of the exploration commands.

use crate::explore::{
    Console, ExploreError, Explorer, InspectError, Inspector, ValueHandle,
};
use crate::inspect::ProgramImage;
use tracing::debug;

pub const EXPLORE_HELP: &str = "\
Explore a value or a type valid in the current context.

Usage: explore ARG

- ARG is either a valid expression or a type name.
- At any stage of exploration, hit the return key (instead of a
choice, if any) to return to the enclosing type or value.";

pub const EXPLORE_VALUE_HELP: &str = "\
Explore value of an expression valid in the current context.

Usage: explore value ARG

- ARG is a valid expression.
- At any stage of exploration, hit the return key (instead of a
choice, if any) to return to the enclosing value.";

pub const EXPLORE_TYPE_HELP: &str = "\
Explore a type or the type of an expression.

Usage: explore type ARG

- ARG is a valid expression or a type name.
- At any stage of exploration, hit the return key (instead of a
choice, if any) to return to the enclosing type.";

const REPL_HELP: &str = "\
List of commands:

explore ARG -- Explore a value or a type valid in the current context
explore value ARG -- Explore value of an expression valid in the current context
explore type ARG -- Explore a type or the type of an expression
print EXPR -- Print the value of an expression
set var LVALUE = EXPR -- Assign to a variable of the program image
help [COMMAND] -- Show this list, or the help of one command
quit -- Leave the explorer";

/// Errors reported by REPL commands
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Explore(#[from] ExploreError),

    #[error(transparent)]
    Inspect(#[from] InspectError),

    #[error("Undefined command: \"{0}\".  Try \"help\".")]
    Unknown(String),

    #[error("Argument required ({0}).")]
    Usage(&'static str),
}

fn require_argument(command: &'static str, arg: &str) -> Result<(), ExploreError> {
    if arg.trim().is_empty() {
        Err(ExploreError::MissingArgument { command })
    } else {
        Ok(())
    }
}

/// `explore ARG`
pub fn explore<I: Inspector, C: Console>(
    inspector: &I,
    console: &mut C,
    arg: &str,
) -> Result<(), ExploreError> {
    require_argument("explore", arg)?;
    let arg = arg.trim();

    match inspector.evaluate_expression(arg) {
        Ok(value) => {
            Explorer::new(console).explore_value(arg, &value, false);
            return Ok(());
        }
        Err(err) => debug!(arg, %err, "not a value"),
    }

    match inspector.resolve_type_name(arg) {
        Ok(ty) => {
            Explorer::new(console).explore_type(arg, &ty, false);
            Ok(())
        }
        Err(err) => {
            debug!(arg, %err, "not a type");
            Err(ExploreError::NeitherValueNorType(arg.to_string()))
        }
    }
}

/// `explore value ARG`
pub fn explore_value<I: Inspector, C: Console>(
    inspector: &I,
    console: &mut C,
    arg: &str,
) -> Result<(), ExploreError> {
    require_argument("explore value", arg)?;
    let arg = arg.trim();

    let value = inspector.evaluate_expression(arg).map_err(|err| {
        debug!(arg, %err, "not a value");
        ExploreError::NotAValue(arg.to_string())
    })?;
    Explorer::new(console).explore_value(arg, &value, false);
    Ok(())
}

/// `explore type ARG`
pub fn explore_type<I: Inspector, C: Console>(
    inspector: &I,
    console: &mut C,
    arg: &str,
) -> Result<(), ExploreError> {
    require_argument("explore type", arg)?;
    let arg = arg.trim();

    if let Ok(ty) = inspector.resolve_type_name(arg) {
        Explorer::new(console).explore_type(arg, &ty, false);
        return Ok(());
    }

    match inspector.evaluate_expression(arg) {
        Ok(value) => {
            let ty = value.ty();
            let name = ty.to_string();
            console.writeln(&format!("'{}' is of type '{}'.", arg, name));
            Explorer::new(console).explore_type(&name, &ty, false);
            Ok(())
        }
        Err(err) => {
            debug!(arg, %err, "neither type nor value");
            Err(ExploreError::NotATypeOrValue(arg.to_string()))
        }
    }
}

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Explore(String),
    ExploreValue(String),
    ExploreType(String),
    Print(String),
    SetVar { lvalue: String, value: String },
    Help(Option<String>),
    Quit,
}

/// Whether the REPL keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Split `line` into its first word and the rest
fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(char::is_whitespace) {
        Some(end) => (&line[..end], line[end..].trim_start()),
        None => (line, ""),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Empty);
        }

        let (word, rest) = split_word(line);
        match word {
            "explore" => {
                let (sub, sub_rest) = split_word(rest);
                Ok(match sub {
                    "value" => Command::ExploreValue(sub_rest.to_string()),
                    "type" => Command::ExploreType(sub_rest.to_string()),
                    _ => Command::Explore(rest.to_string()),
                })
            }
            "print" | "p" => Ok(Command::Print(rest.to_string())),
            "set" => {
                let (sub, assignment) = split_word(rest);
                if sub != "var" && sub != "variable" {
                    return Err(CommandError::Unknown(line.to_string()));
                }
                let (lvalue, value) = assignment
                    .split_once('=')
                    .ok_or(CommandError::Usage("set var LVALUE = EXPR"))?;
                let (lvalue, value) = (lvalue.trim(), value.trim());
                if lvalue.is_empty() || value.is_empty() {
                    return Err(CommandError::Usage("set var LVALUE = EXPR"));
                }
                Ok(Command::SetVar {
                    lvalue: lvalue.to_string(),
                    value: value.to_string(),
                })
            }
            "help" | "h" => Ok(Command::Help(
                Some(rest.to_string()).filter(|topic| !topic.is_empty()),
            )),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }

    /// Run the command against `image`
    pub fn execute<C: Console>(
        self,
        image: &ProgramImage,
        console: &mut C,
    ) -> Result<Flow, CommandError> {
        match self {
            Command::Empty => {}
            Command::Explore(arg) => explore(image, console, &arg)?,
            Command::ExploreValue(arg) => explore_value(image, console, &arg)?,
            Command::ExploreType(arg) => explore_type(image, console, &arg)?,
            Command::Print(expr) => {
                if expr.trim().is_empty() {
                    return Err(CommandError::Usage("print EXPR"));
                }
                let rendered = image.evaluate(&expr)?.render()?;
                console.writeln(&format!("{} = {}", expr.trim(), rendered));
            }
            Command::SetVar { lvalue, value } => {
                image.assign(&lvalue, &value)?;
            }
            Command::Help(topic) => {
                let text = match topic.as_deref() {
                    None => REPL_HELP,
                    Some("explore") => EXPLORE_HELP,
                    Some("explore value") => EXPLORE_VALUE_HELP,
                    Some("explore type") => EXPLORE_TYPE_HELP,
                    Some(other) => return Err(CommandError::Unknown(other.to_string())),
                };
                console.writeln(text);
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_explore_variants() {
        assert_eq!(
            Command::parse("explore inventory").unwrap(),
            Command::Explore("inventory".to_string())
        );
        assert_eq!(
            Command::parse("  explore value  *head ").unwrap(),
            Command::ExploreValue("*head".to_string())
        );
        assert_eq!(
            Command::parse("explore type struct node").unwrap(),
            Command::ExploreType("struct node".to_string())
        );
        assert_eq!(
            Command::parse("explore").unwrap(),
            Command::Explore(String::new())
        );
        assert_eq!(
            Command::parse("explore values").unwrap(),
            Command::Explore("values".to_string())
        );
    }

    #[test]
    fn test_parse_set_var() {
        assert_eq!(
            Command::parse("set var nodes[1].value = 3 * 7").unwrap(),
            Command::SetVar {
                lvalue: "nodes[1].value".to_string(),
                value: "3 * 7".to_string()
            }
        );
        assert!(matches!(
            Command::parse("set var x"),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            Command::parse("set width 80"),
            Err(CommandError::Unknown(_))
        ));
    }

    #[test]
    fn test_parse_meta_commands() {
        assert_eq!(Command::parse("   ").unwrap(), Command::Empty);
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
        assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
        assert_eq!(Command::parse("help").unwrap(), Command::Help(None));
        assert_eq!(
            Command::parse("help explore type").unwrap(),
            Command::Help(Some("explore type".to_string()))
        );
        assert_eq!(
            Command::parse("frobnicate now").unwrap_err().to_string(),
            "Undefined command: \"frobnicate\".  Try \"help\"."
        );
    }
}
