// Integration tests for whole exploration sessions
//
// Every test loads a program image, runs one explore command against a
// scripted console and checks the transcript the user would have seen.

use cexplore::commands::{explore, explore_type, explore_value};
use cexplore::console::ScriptedConsole;
use cexplore::explore::constants::MAX_EXPLORE_DEPTH;
use cexplore::inspect::ProgramImage;

const FIELD_PROMPT: &str = "Enter the field number of choice: ";
const PARENT_PROMPT: &str = "\nPress enter to return to parent value: ";

fn inventory() -> ProgramImage {
    ProgramImage::load(include_str!("../demos/inventory.c")).expect("demo image should load")
}

fn load(source: &str) -> ProgramImage {
    ProgramImage::load(source).expect("test image should load")
}

/// Run `explore ARG` with the given answers and return the console
fn session(image: &ProgramImage, arg: &str, input: &[&str]) -> ScriptedConsole {
    let mut console = ScriptedConsole::new(input.iter().copied());
    explore(image, &mut console, arg).expect("explore should accept the argument");
    console
}

#[test]
fn test_scalar_root_prints_without_prompting() {
    let image = inventory();
    let console = session(&image, "counter", &[]);

    assert_eq!(
        console.transcript(),
        "'counter' is a scalar value of type 'int'.\ncounter = 0\n"
    );
    assert!(console.prompts().is_empty());
}

#[test]
fn test_struct_table_shows_scalars_inline() {
    let image = inventory();
    let console = session(&image, "items[2]", &[""]);
    let transcript = console.transcript();

    assert!(transcript.contains(
        "The value of 'items[2]' is of type 'Item' which is a typedef of type 'struct item'\n"
    ));
    assert!(transcript.contains(
        "The value of 'items[2]' is a struct/class of type 'struct item' with the following fields:\n"
    ));
    assert!(transcript.contains("          id = 103 .. (Value of type 'int')\n"));
    assert!(transcript.contains("       label = <Enter 0 to explore this field of type 'char *'>\n"));
    assert!(transcript.contains("        kind = CONSUMABLE .. (Value of type 'enum category')\n"));
    assert!(transcript.contains("    quantity = 40 .. (Value of type 'unsigned short')\n"));
    assert!(transcript.contains("  unit_price = 3.75 .. (Value of type 'double')\n"));
    assert!(transcript.contains(
        "    supplier = <Enter 1 to explore this field of type 'struct supplier *'>\n"
    ));
    assert!(transcript.contains("        next = <Enter 2 to explore this field of type 'struct item *'>\n"));

    // Cancelling at the root returns silently
    assert_eq!(console.prompts(), [FIELD_PROMPT]);
    assert!(!transcript.contains("Returning to parent value"));
}

#[test]
fn test_struct_offers_only_non_scalar_fields() {
    let image = load(
        "struct inner { int v; };
         struct outer { int a; struct inner b; };
         struct outer o = { 1, { 2 } };",
    );
    let console = session(&image, "o", &["0", "", ""]);

    assert_eq!(
        console.count_lines_containing("<Enter 0 to explore this field of type 'struct inner'>"),
        2
    );
    assert_eq!(console.count_lines_containing("<Enter 1"), 0);
    assert_eq!(console.count_lines_containing("a = 1 .. (Value of type 'int')"), 2);
    assert!(console.transcript().contains(
        "The value of 'o.b' is a struct/class of type 'struct inner' with the following fields:\n"
    ));
    assert!(console.transcript().contains("  v = 2 .. (Value of type 'int')\n"));
    assert_eq!(console.prompts(), [FIELD_PROMPT, PARENT_PROMPT, FIELD_PROMPT]);
    assert_eq!(console.remaining(), 0);
}

#[test]
fn test_union_offers_every_field() {
    let image = inventory();
    let console = session(&image, "badge", &[""]);
    let transcript = console.transcript();

    assert!(transcript.contains(
        "The value of 'badge' is a union of type 'union tag' with the following fields:\n"
    ));
    assert!(transcript.contains("<Enter 0 to explore this field of type 'int'>"));
    assert!(transcript.contains("<Enter 1 to explore this field of type 'char [4]'>"));
    assert!(transcript.contains("<Enter 2 to explore this field of type 'struct supplier *'>"));
    assert_eq!(console.count_lines_containing(" .. (Value of type"), 0);
}

#[test]
fn test_union_member_is_a_scalar_child() {
    let image = inventory();
    let console = session(&image, "badge", &["0", "", ""]);
    let transcript = console.transcript();

    assert!(transcript.contains("'badge.code' is a scalar value of type 'int'.\n"));
    assert!(transcript.contains("badge.code = 1094861636\n"));
    assert!(transcript.contains("\nReturning to parent value...\n"));
    assert_eq!(console.prompts(), [FIELD_PROMPT, PARENT_PROMPT, FIELD_PROMPT]);
}

#[test]
fn test_struct_without_fields() {
    let image = inventory();
    let console = session(&image, "marker", &[]);

    assert_eq!(
        console.transcript(),
        "The value of 'marker' is a struct/class of type 'struct empty_marker' with no fields.\n"
    );
    assert!(console.prompts().is_empty());
}

#[test]
fn test_struct_with_only_artificial_fields() {
    let image = load(
        "struct vt { void **_vptr_vt; };
         struct holder { struct vt inner; int n; };
         struct vt v;
         struct holder h;",
    );

    let console = session(&image, "v", &[]);
    assert_eq!(
        console.transcript(),
        "The value of 'v' is a struct/class of type 'struct vt' with no fields.\n"
    );
    assert!(console.prompts().is_empty());

    let console = session(&image, "h", &["0", "", ""]);
    assert!(console
        .transcript()
        .contains("The value of 'h.inner' is a struct/class of type 'struct vt' with no fields.\n"));
    assert_eq!(console.prompts(), [FIELD_PROMPT, PARENT_PROMPT, FIELD_PROMPT]);
    assert_eq!(console.remaining(), 0);
}

#[test]
fn test_base_classes_and_hidden_fields() {
    let image = inventory();
    let console = session(&image, "record", &["0", "", ""]);
    let transcript = console.transcript();

    assert!(transcript.contains("    entity = <Enter 0 to explore this base class of type 'struct entity'>\n"));
    assert!(transcript.contains("  revision = 2 .. (Value of type 'int')\n"));
    assert!(!transcript.contains("_vptr"));
    assert!(transcript.contains(
        "The value of 'record.entity' is a struct/class of type 'struct entity' with the following fields:\n"
    ));
    assert!(transcript.contains("  serial = 7 .. (Value of type 'long')\n"));
    assert_eq!(console.prompts(), [FIELD_PROMPT, PARENT_PROMPT, FIELD_PROMPT]);
}

#[test]
fn test_array_explores_one_index_per_round() {
    let image = inventory();
    let console = session(&image, "shelf.bins", &["0", "", "1", "", "x"]);
    let transcript = console.transcript();

    assert_eq!(console.count_lines_containing("'shelf.bins' is an array of 'int'."), 3);
    assert_eq!(console.count_lines_containing("is a scalar value of type 'int'."), 2);
    assert!(transcript.contains("(shelf.bins)[0] = 1\n"));
    assert!(transcript.contains("(shelf.bins)[1] = 2\n"));
    assert_eq!(console.remaining(), 0);
    assert_eq!(
        console.prompts().last().map(String::as_str),
        Some("Enter the index of the element you want to explore in 'shelf.bins': ")
    );
}

#[test]
fn test_child_array_announces_return() {
    let image = inventory();
    let console = session(&image, "shelf", &["0", "", ""]);

    assert!(console
        .transcript()
        .contains("'shelf.bins' is an array of 'int'.\n"));
    assert_eq!(console.count_lines_containing("Returning to parent value..."), 1);
}

#[test]
fn test_unreadable_array_element_keeps_prompting() {
    // One struct pair is 16 bytes, exactly the guard gap, so index 3 of
    // `first` falls in the gap and index 4 lands on `second`
    let image = load(
        "struct pair { long a; long b; };
         struct pair first[3] = { { 1, 2 }, { 3, 4 }, { 5, 6 } };
         struct pair second[1] = { { 7, 8 } };",
    );
    let console = session(&image, "first", &["3", "4", "", ""]);
    let transcript = console.transcript();

    assert_eq!(console.count_lines_containing("Cannot read value at index 3."), 1);
    assert!(transcript.contains(
        "The value of 'first[4]' is a struct/class of type 'struct pair' with the following fields:\n"
    ));
    assert!(transcript.contains("  a = 7 .. (Value of type 'long')\n"));
    assert_eq!(console.count_lines_containing("'first' is an array of 'struct pair'."), 3);
    assert_eq!(console.remaining(), 0);
}

#[test]
fn test_pointer_to_single_value() {
    let image = inventory();
    let console = session(&image, "head", &["y", ""]);
    let transcript = console.transcript();

    assert!(transcript.contains("'head' is a pointer to a value of type 'Item'\n"));
    assert!(transcript.contains(
        "The value of '*head' is a struct/class of type 'struct item' with the following fields:\n"
    ));
    assert!(transcript.contains("          id = 101 .. (Value of type 'int')\n"));
    assert!(transcript.contains("\nReturning to parent value...\n"));
    assert_eq!(console.prompts().len(), 2);
}

#[test]
fn test_pointer_as_array() {
    let image = inventory();
    let console = session(&image, "head", &["n", "y", "2", "", "q"]);
    let transcript = console.transcript();

    assert_eq!(
        console.count_lines_containing("The value of 'head[2]' is a struct/class"),
        1
    );
    assert!(transcript.contains("          id = 103 .. (Value of type 'int')\n"));
    assert_eq!(console.remaining(), 0);
    assert_eq!(
        console.prompts().last().map(String::as_str),
        Some("Enter the index of the element you want to explore in 'head': ")
    );
}

#[test]
fn test_unreadable_pointer_element_then_readable_one() {
    let image = load(
        "struct pair { long a; long b; };
         struct pair first[3];
         struct pair second[1] = { { 7, 8 } };
         struct pair *cursor = first;",
    );
    let console = session(&image, "cursor", &["n", "y", "3", "4", "", "q"]);
    let transcript = console.transcript();

    assert_eq!(console.count_lines_containing("Cannot read value at index 3."), 1);
    assert!(transcript.contains(
        "The value of 'cursor[4]' is a struct/class of type 'struct pair' with the following fields:\n"
    ));
    assert!(transcript.contains("  b = 8 .. (Value of type 'long')\n"));
    assert_eq!(console.remaining(), 0);
}

#[test]
fn test_pointer_declined_both_ways_prints_nothing_more() {
    let image = inventory();
    let console = session(&image, "head", &["n", "n"]);

    assert_eq!(
        console.transcript(),
        "'head' is a pointer to a value of type 'Item'\n\
         Continue exploring it as a pointer to a single value [y/n]: n\n\
         Continue exploring it as a pointer to an array [y/n]: n\n"
    );
}

#[test]
fn test_invalid_pointers() {
    let image = inventory();

    let console = session(&image, "dangling", &["y"]);
    assert!(console
        .transcript()
        .ends_with("'dangling' is a pointer pointing to an invalid memory location.\n"));
    assert_eq!(console.prompts().len(), 1);

    let console = session(&image, "handle", &["y"]);
    assert!(console
        .transcript()
        .contains("'handle' is a pointer pointing to an invalid memory location.\n"));

    // As a child the user still gets to acknowledge the failure
    let console = session(&image, "items[2]", &["2", "y", "", ""]);
    assert!(console
        .transcript()
        .contains("'(items[2]).next' is a pointer pointing to an invalid memory location.\n"));
    assert_eq!(
        console.prompts(),
        [
            FIELD_PROMPT,
            "Continue exploring it as a pointer to a single value [y/n]: ",
            PARENT_PROMPT,
            FIELD_PROMPT
        ]
    );
}

#[test]
fn test_pointer_into_zero_sized_global_is_invalid() {
    let image = load(
        "struct empty_marker { };
         struct empty_marker marker;
         int *q = (int *)&marker;",
    );
    let console = session(&image, "q", &["y", ""]);

    assert!(console
        .transcript()
        .ends_with("'q' is a pointer pointing to an invalid memory location.\n"));
    assert_eq!(console.prompts().len(), 1);
    assert_eq!(console.remaining(), 1);
}

#[test]
fn test_member_past_end_of_address_space_is_rejected() {
    let image = load(
        "struct big { long a; long b; long c; };
         struct big first[1];
         struct big *p = first;",
    );
    let mut console = ScriptedConsole::new(Vec::<String>::new());

    let err = explore(&image, &mut console, "p[-262315].c").unwrap_err();
    assert_eq!(
        err.to_string(),
        "'p[-262315].c' neither evaluates to a value nor is a type in the current context."
    );
    assert!(console.transcript().is_empty());
}

#[test]
fn test_char_pointer_field() {
    let image = inventory();
    let console = session(&image, "items[0]", &["0", "y", "", ""]);

    assert!(console
        .transcript()
        .contains("'*((items[0]).label)' is a scalar value of type 'char'.\n*((items[0]).label) = 104 'h'\n"));
}

#[test]
fn test_typedef_is_transparent() {
    let image = inventory();
    let through_typedef = session(&image, "items[1]", &[""]);
    let direct = session(&image, "(struct item) items[1]", &[""]);

    let rows = |console: &ScriptedConsole| -> Vec<String> {
        console
            .transcript()
            .lines()
            .filter(|line| line.starts_with("  "))
            .map(str::to_string)
            .collect()
    };
    assert_eq!(rows(&through_typedef).len(), 7);
    assert_eq!(rows(&through_typedef), rows(&direct));
    assert!(!direct.transcript().contains("typedef"));
}

#[test]
fn test_reference_is_transparent() {
    let image = inventory();
    let console = session(&image, "featured", &[""]);
    let transcript = console.transcript();

    assert!(transcript.starts_with(
        "The value of 'featured' is of type 'Item' which is a typedef of type 'struct item'\n"
    ));
    assert!(transcript.contains("          id = 102 .. (Value of type 'int')\n"));
}

#[test]
fn test_cyclic_list_is_navigable() {
    let image = load(
        "struct node { int value; struct node *next; };
         struct node ring = { 1, &ring };",
    );
    let levels = 20;
    let mut input = Vec::new();
    for _ in 0..levels {
        input.extend(["0", "y"]);
    }
    input.extend(std::iter::repeat("").take(levels + 1));

    let console = session(&image, "ring", &input);

    assert!(console
        .transcript()
        .contains("The value of '*((*(ring.next)).next)' is a struct/class"));
    assert_eq!(console.count_lines_containing("Returning to parent value..."), levels);
    assert_eq!(console.count_lines_containing("  value = 1 .. (Value of type 'int')"), 2 * levels + 1);
    assert_eq!(console.remaining(), 0);
}

#[test]
fn test_depth_limit_stops_runaway_recursion() {
    // Deep recursion needs more stack than the default test thread has
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let image = load(
                "struct node { int value; struct node *next; };
                 struct node ring = { 1, &ring };",
            );
            // Each level is one struct and one pointer dispatch; the script
            // runs out right as the limit is hit so unwinding reads EOF
            let mut input = Vec::new();
            for _ in 0..MAX_EXPLORE_DEPTH / 2 {
                input.extend(["0", "y"]);
            }
            let console = session(&image, "ring", &input);
            console.count_lines_containing("Exploration depth limit reached at '")
        })
        .expect("test thread should spawn");

    assert_eq!(handle.join().expect("test thread should not panic"), 1);
}

#[test]
fn test_redisplay_reflects_live_memory() {
    let image = inventory();
    let writer = image.clone();
    let mut console = ScriptedConsole::new(["0"])
        .then(move || {
            writer
                .assign("shelf.aisle", "'Z'")
                .expect("assignment should succeed");
        })
        .line("")
        .line("");

    explore(&image, &mut console, "shelf").expect("explore should accept the argument");
    let transcript = console.transcript();

    let before = transcript
        .find("  aisle = 66 'B' .. (Value of type 'char')")
        .expect("first display shows the original value");
    let after = transcript
        .find("  aisle = 90 'Z' .. (Value of type 'char')")
        .expect("redisplay shows the new value");
    assert!(before < after);
}

#[test]
fn test_unsupported_category() {
    let image = inventory();
    let console = session(&image, "restock", &[]);

    assert_eq!(
        console.transcript(),
        "Explorer for type 'int (struct item *, int)' not yet available.\n\n"
    );
}

#[test]
fn test_type_exploration_offers_every_field() {
    let image = inventory();
    let console = session(&image, "struct item", &["6", "", ""]);
    let transcript = console.transcript();

    assert!(transcript.starts_with("'struct item' is a struct/class with the following fields:\n\n"));
    assert!(transcript.contains("          id = <Enter 0 to explore this field of type 'int'>\n"));
    assert!(transcript.contains("  unit_price = <Enter 4 to explore this field of type 'double'>\n"));
    assert!(transcript.contains(
        "\nfield 'next' of 'struct item' is a pointer to a value of type 'struct item'.\n"
    ));
    assert!(transcript.contains(
        "the pointee type of field 'next' of 'struct item' is a struct/class of type 'struct item' with the following fields:\n"
    ));
    assert!(transcript.contains("\nReturning to enclosing type...\n"));
    assert_eq!(console.remaining(), 0);
}

#[test]
fn test_type_scalar_child() {
    let image = inventory();
    let console = session(&image, "struct supplier", &["1", "", ""]);

    assert!(console
        .transcript()
        .contains("field 'rating' of 'struct supplier' is of a scalar type 'int'.\n"));
    assert_eq!(
        console.prompts()[1],
        "\nPress enter to return to enclosing type: "
    );
}

#[test]
fn test_typedef_type() {
    let image = inventory();
    let console = session(&image, "Item", &[""]);

    assert!(console
        .transcript()
        .starts_with("The type 'Item' is a typedef of type 'struct item'.\n'Item' is a struct/class with the following fields:\n"));
}

#[test]
fn test_explore_type_of_a_value() {
    let image = inventory();
    let mut console = ScriptedConsole::new(Vec::<String>::new());
    explore_type(&image, &mut console, "counter").expect("counter is a value");

    assert_eq!(
        console.transcript(),
        "'counter' is of type 'int'.\n'int' is a scalar type.\n"
    );

    let mut console = ScriptedConsole::new(Vec::<String>::new());
    explore_type(&image, &mut console, "enum category").expect("enum category is a type");
    assert_eq!(console.transcript(), "'enum category' is an enumerated type.\n");
}

#[test]
fn test_explore_value_rejects_types() {
    let image = inventory();
    let mut console = ScriptedConsole::new(Vec::<String>::new());

    let err = explore_value(&image, &mut console, "struct item").unwrap_err();
    assert_eq!(
        err.to_string(),
        "'struct item' does not evaluate to a value in the current context."
    );
    assert!(console.transcript().is_empty());
}

#[test]
fn test_argument_errors() {
    let image = inventory();
    let mut console = ScriptedConsole::new(Vec::<String>::new());

    assert_eq!(
        explore(&image, &mut console, "  ").unwrap_err().to_string(),
        "ERROR: 'explore' requires an argument."
    );
    assert_eq!(
        explore_value(&image, &mut console, "").unwrap_err().to_string(),
        "ERROR: 'explore value' requires an argument."
    );
    assert_eq!(
        explore_type(&image, &mut console, "").unwrap_err().to_string(),
        "ERROR: 'explore type' requires an argument."
    );
    assert_eq!(
        explore(&image, &mut console, "nosuch").unwrap_err().to_string(),
        "'nosuch' neither evaluates to a value nor is a type in the current context."
    );
    assert_eq!(
        explore_type(&image, &mut console, "struct nosuch")
            .unwrap_err()
            .to_string(),
        "'struct nosuch' is not a type or value in the current context."
    );
    assert!(console.transcript().is_empty());
}
