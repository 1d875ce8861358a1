// Pointers: follow as a single value, or index as an array

use super::dispatch::{Explorer, Outcome};
use super::host::{Console, TypeHandle, ValueHandle};
use super::path::{deref_path, index_path};
use tracing::warn;

impl<C: Console> Explorer<'_, C> {
    pub(crate) fn explore_pointer_value<V: ValueHandle>(
        &mut self,
        path: &str,
        value: &V,
        is_child: bool,
    ) -> Outcome {
        let pointee = pointee_name(&value.ty());
        self.console.writeln(&format!(
            "'{}' is a pointer to a value of type '{}'",
            path, pointee
        ));

        let option = self
            .console
            .read_line("Continue exploring it as a pointer to a single value [y/n]: ");
        if option.trim() == "y" {
            match value.dereference().and_then(|target| {
                target.fetch()?;
                Ok(target)
            }) {
                Ok(target) => self.explore_value(&deref_path(path), &target, true),
                Err(err) => {
                    warn!(path, %err, "pointer target unreadable");
                    self.console.writeln(&format!(
                        "'{}' is a pointer pointing to an invalid memory location.",
                        path
                    ));
                    if is_child {
                        self.return_to_parent_value_prompt();
                    }
                }
            }
            return Outcome::Return;
        }

        let option = self
            .console
            .read_line("Continue exploring it as a pointer to an array [y/n]: ");
        if option.trim() == "y" {
            let prompt = format!(
                "Enter the index of the element you want to explore in '{}': ",
                path
            );
            while let Some(index) = self.read_index(&prompt) {
                let element = value.index(index).and_then(|element| {
                    element.fetch()?;
                    Ok(element)
                });
                match element {
                    Ok(element) => self.explore_value(&index_path(path, index), &element, true),
                    Err(err) => {
                        warn!(path, index, %err, "pointer element unreadable");
                        self.console
                            .writeln(&format!("Cannot read value at index {}.", index));
                    }
                }
            }
        }

        Outcome::Return
    }

    pub(crate) fn explore_pointer_type<T: TypeHandle>(
        &mut self,
        name: &str,
        ty: &T,
        is_child: bool,
    ) -> Outcome {
        let Some(target) = ty.target() else {
            return self.report_unsupported(ty);
        };
        self.console.writeln(&format!(
            "\n{} is a pointer to a value of type '{}'.",
            name, target
        ));

        self.explore_type(&format!("the pointee type of {}", name), &target, is_child);
        Outcome::Return
    }
}

fn pointee_name<T: TypeHandle>(ty: &T) -> String {
    ty.target()
        .map(|target| target.to_string())
        .unwrap_or_else(|| "void".to_string())
}
