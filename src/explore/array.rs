// Arrays: one index per round, the dispatcher repeats the prompt

use super::dispatch::{Explorer, Outcome};
use super::host::{Console, TypeHandle, ValueHandle};
use super::path::index_path;
use tracing::warn;

impl<C: Console> Explorer<'_, C> {
    pub(crate) fn explore_array_value<V: ValueHandle>(
        &mut self,
        path: &str,
        value: &V,
        is_child: bool,
    ) -> Outcome {
        let element_type = value
            .ty()
            .target()
            .map(|t| t.to_string())
            .unwrap_or_default();
        self.console
            .writeln(&format!("'{}' is an array of '{}'.", path, element_type));

        let prompt = format!(
            "Enter the index of the element you want to explore in '{}': ",
            path
        );
        let Some(index) = self.read_index(&prompt) else {
            if is_child {
                self.return_to_parent_value();
            }
            return Outcome::Return;
        };

        let element = value.index(index).and_then(|element| {
            element.fetch()?;
            Ok(element)
        });
        match element {
            Ok(element) => {
                self.explore_value(&index_path(path, index), &element, true);
            }
            Err(err) => {
                warn!(path, index, %err, "array element unreadable");
                self.console
                    .writeln(&format!("Cannot read value at index {}.", index));
            }
        }
        Outcome::Repeat
    }

    pub(crate) fn explore_array_type<T: TypeHandle>(
        &mut self,
        name: &str,
        ty: &T,
        is_child: bool,
    ) -> Outcome {
        let Some(element) = ty.target() else {
            return self.report_unsupported(ty);
        };
        self.console
            .writeln(&format!("{} is an array of '{}'.", name, element));

        self.explore_type(&format!("the array element of {}", name), &element, is_child);
        Outcome::Return
    }
}
