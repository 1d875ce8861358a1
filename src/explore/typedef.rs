// Typedefs: disclose the alias, then explore the underlying type in place

use super::dispatch::{Explorer, Outcome};
use super::host::{Console, TypeCode, TypeHandle, ValueHandle};

impl<C: Console> Explorer<'_, C> {
    pub(crate) fn explore_typedef_value<V: ValueHandle>(
        &mut self,
        path: &str,
        value: &V,
        is_child: bool,
    ) -> Outcome {
        let ty = value.ty();
        let actual = ty.strip_typedefs();
        // A chain that never bottoms out
        if actual.code() == TypeCode::Typedef {
            return self.report_unsupported(&ty);
        }

        self.console.writeln(&format!(
            "The value of '{}' is of type '{}' which is a typedef of type '{}'",
            path, ty, actual
        ));

        match value.cast_to(&actual) {
            Ok(underlying) => self.explore_value(path, &underlying, is_child),
            Err(err) => {
                self.console.writeln(&format!("{} = <error: {}>", path, err));
                if is_child {
                    self.return_to_parent_value_prompt();
                }
            }
        }
        Outcome::Return
    }

    pub(crate) fn explore_typedef_type<T: TypeHandle>(
        &mut self,
        name: &str,
        ty: &T,
        is_child: bool,
    ) -> Outcome {
        let actual = ty.strip_typedefs();
        if actual.code() == TypeCode::Typedef {
            return self.report_unsupported(ty);
        }

        if is_child {
            self.console.writeln(&format!(
                "The type of {} is a typedef of type '{}'.",
                name, actual
            ));
        } else {
            self.console.writeln(&format!(
                "The type '{}' is a typedef of type '{}'.",
                name, actual
            ));
        }

        self.explore_type(name, &actual, is_child);
        Outcome::Return
    }
}
