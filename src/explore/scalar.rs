// Scalar values and types: terminal nodes

use super::dispatch::{Explorer, Outcome};
use super::host::{Console, TypeCode, TypeHandle, ValueHandle};

impl<C: Console> Explorer<'_, C> {
    pub(crate) fn explore_scalar_value<V: ValueHandle>(
        &mut self,
        path: &str,
        value: &V,
        is_child: bool,
    ) -> Outcome {
        let rendered = value
            .render()
            .unwrap_or_else(|err| format!("<error: {}>", err));
        self.console.writeln(&format!(
            "'{}' is a scalar value of type '{}'.",
            path,
            value.ty()
        ));
        self.console.writeln(&format!("{} = {}", path, rendered));

        if is_child {
            self.return_to_parent_value_prompt();
            self.return_to_parent_value();
        }
        Outcome::Return
    }

    pub(crate) fn explore_scalar_type<T: TypeHandle>(
        &mut self,
        name: &str,
        ty: &T,
        is_child: bool,
    ) -> Outcome {
        let line = match (ty.code() == TypeCode::Enum, is_child) {
            (true, true) => format!("{} is of an enumerated type '{}'.", name, ty),
            (true, false) => format!("'{}' is an enumerated type.", name),
            (false, true) => format!("{} is of a scalar type '{}'.", name, ty),
            (false, false) => format!("'{}' is a scalar type.", name),
        };
        self.console.writeln(&line);

        if is_child {
            self.return_to_enclosing_type_prompt();
            self.return_to_enclosing_type();
        }
        Outcome::Return
    }
}
