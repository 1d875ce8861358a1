// Integration tests for the REPL command layer and expression evaluation

use cexplore::commands::{Command, CommandError, Flow};
use cexplore::console::ScriptedConsole;
use cexplore::inspect::ProgramImage;
use cexplore::memory::RODATA_BASE;

fn inventory() -> ProgramImage {
    ProgramImage::load(include_str!("../demos/inventory.c")).expect("demo image should load")
}

/// Run one command line and return its flow together with everything printed
fn run(image: &ProgramImage, line: &str) -> (Result<Flow, CommandError>, String) {
    let mut console = ScriptedConsole::new(Vec::<String>::new());
    let result = Command::parse(line).and_then(|command| command.execute(image, &mut console));
    (result, console.transcript().to_string())
}

fn print(image: &ProgramImage, expr: &str) -> String {
    let (result, output) = run(image, &format!("print {}", expr));
    result.expect("print should succeed");
    output
}

#[test]
fn test_print_values() {
    let image = inventory();

    assert_eq!(print(&image, "counter"), "counter = 0\n");
    assert_eq!(print(&image, "head->next->id"), "head->next->id = 102\n");
    assert_eq!(print(&image, "badge.letters[0]"), "badge.letters[0] = 68 'D'\n");
    assert_eq!(print(&image, "items[2].kind"), "items[2].kind = CONSUMABLE\n");
    assert_eq!(
        print(&image, "items[0].label"),
        format!("items[0].label = 0x{:x} \"hammer\"\n", RODATA_BASE)
    );
    assert_eq!(print(&image, "shelf.bins"), "shelf.bins = {1, 2, 3, 4}\n");
}

#[test]
fn test_print_arithmetic() {
    let image = inventory();

    assert_eq!(print(&image, "'a' + 1"), "'a' + 1 = 98\n");
    assert_eq!(print(&image, "shelf.bins[3] - shelf.bins[0] * 2"), "shelf.bins[3] - shelf.bins[0] * 2 = 2\n");
    assert_eq!(print(&image, "0.5 + 0.25"), "0.5 + 0.25 = 0.75\n");
    assert_eq!(print(&image, "-3 * 2"), "-3 * 2 = -6\n");
}

#[test]
fn test_print_pointer_arithmetic() {
    let image = inventory();

    assert_eq!(print(&image, "(head + 1)->id"), "(head + 1)->id = 102\n");
    assert_eq!(print(&image, "&items[2] - head"), "&items[2] - head = 2\n");
    assert_eq!(print(&image, "*(shelf.bins + 2)"), "*(shelf.bins + 2) = 3\n");
    assert_eq!(print(&image, "(items + 2)->unit_price"), "(items + 2)->unit_price = 3.75\n");
}

#[test]
fn test_print_errors() {
    let image = inventory();

    let (result, output) = run(&image, "print nosuch");
    assert_eq!(
        result.unwrap_err().to_string(),
        "No symbol \"nosuch\" in current context."
    );
    assert!(output.is_empty());

    let (result, _) = run(&image, "print *dangling");
    assert_eq!(
        result.unwrap_err().to_string(),
        "Cannot access memory at address 0x10"
    );

    let (result, _) = run(&image, "print");
    assert!(matches!(result, Err(CommandError::Usage(_))));
}

#[test]
fn test_print_member_of_wrapped_address() {
    let image = ProgramImage::load(
        "struct big { long a; long b; long c; };
         struct big first[1];
         struct big *p = first;",
    )
    .expect("test image should load");

    let (result, output) = run(&image, "print p[-262315].c");
    assert_eq!(
        result.unwrap_err().to_string(),
        "Cannot access memory at address 0xfffffffffffffff8"
    );
    assert!(output.is_empty());
}

#[test]
fn test_set_var_updates_memory() {
    let image = inventory();

    let (result, output) = run(&image, "set var counter = 41 + 1");
    assert_eq!(result.unwrap(), Flow::Continue);
    assert!(output.is_empty());
    assert_eq!(print(&image, "counter"), "counter = 42\n");

    run(&image, "set var items[1].next = &items[0]").0.unwrap();
    assert_eq!(print(&image, "head->next->next->id"), "head->next->next->id = 101\n");

    run(&image, "set var featured.quantity = 7").0.unwrap();
    assert_eq!(print(&image, "items[1].quantity"), "items[1].quantity = 7\n");
}

#[test]
fn test_set_var_rejects_bad_targets() {
    let image = inventory();

    let (result, _) = run(&image, "set var *motto = 'C'");
    assert!(result
        .unwrap_err()
        .to_string()
        .starts_with("Cannot write to read-only memory at address 0x"));

    let (result, _) = run(&image, "set var 3 = 4");
    assert_eq!(
        result.unwrap_err().to_string(),
        "Left operand of assignment is not an lvalue."
    );
}

#[test]
fn test_explore_through_command_line() {
    let image = inventory();
    let mut console = ScriptedConsole::new([""]);

    let flow = Command::parse("explore value items[0]")
        .and_then(|command| command.execute(&image, &mut console))
        .expect("explore value should succeed");

    assert_eq!(flow, Flow::Continue);
    assert!(console
        .transcript()
        .contains("The value of 'items[0]' is a struct/class of type 'struct item'"));
}

#[test]
fn test_explore_errors_through_command_line() {
    let image = inventory();

    let (result, _) = run(&image, "explore");
    assert_eq!(
        result.unwrap_err().to_string(),
        "ERROR: 'explore' requires an argument."
    );

    let (result, _) = run(&image, "explore value");
    assert_eq!(
        result.unwrap_err().to_string(),
        "ERROR: 'explore value' requires an argument."
    );

    let (result, _) = run(&image, "explore value struct item");
    assert_eq!(
        result.unwrap_err().to_string(),
        "'struct item' does not evaluate to a value in the current context."
    );
}

#[test]
fn test_help_and_quit() {
    let image = inventory();

    let (result, output) = run(&image, "help");
    assert_eq!(result.unwrap(), Flow::Continue);
    assert!(output.starts_with("List of commands:"));

    let (_, output) = run(&image, "help explore type");
    assert!(output.starts_with("Explore a type or the type of an expression."));

    let (result, _) = run(&image, "help frobnicate");
    assert!(matches!(result, Err(CommandError::Unknown(_))));

    assert_eq!(run(&image, "quit").0.unwrap(), Flow::Quit);
    assert_eq!(run(&image, "").0.unwrap(), Flow::Continue);
}
