// Return banners and prompts shared by the handlers

use super::dispatch::Explorer;
use super::host::Console;

impl<C: Console> Explorer<'_, C> {
    pub(crate) fn return_to_parent_value(&mut self) {
        self.console.writeln("\nReturning to parent value...\n");
    }

    pub(crate) fn return_to_parent_value_prompt(&mut self) {
        self.console
            .read_line("\nPress enter to return to parent value: ");
    }

    pub(crate) fn return_to_enclosing_type(&mut self) {
        self.console.writeln("\nReturning to enclosing type...\n");
    }

    pub(crate) fn return_to_enclosing_type_prompt(&mut self) {
        self.console
            .read_line("\nPress enter to return to enclosing type: ");
    }

    /// Prompt for an integer; anything else (including an empty line) is `None`
    pub(crate) fn read_index(&mut self, prompt: &str) -> Option<i64> {
        self.console.read_line(prompt).trim().parse().ok()
    }
}
