// References are transparent: the referent is explored under the same path

use super::dispatch::{Explorer, Outcome};
use super::host::{Console, TypeHandle, ValueHandle};
use tracing::warn;

impl<C: Console> Explorer<'_, C> {
    pub(crate) fn explore_reference_value<V: ValueHandle>(
        &mut self,
        path: &str,
        value: &V,
        is_child: bool,
    ) -> Outcome {
        match value.referenced_value() {
            Ok(referent) => self.explore_value(path, &referent, is_child),
            Err(err) => {
                warn!(path, %err, "cannot follow reference");
                self.console.writeln(&format!(
                    "Cannot access the value referenced by '{}': {}",
                    path, err
                ));
                if is_child {
                    self.return_to_parent_value_prompt();
                }
            }
        }
        Outcome::Return
    }

    pub(crate) fn explore_reference_type<T: TypeHandle>(
        &mut self,
        name: &str,
        ty: &T,
        is_child: bool,
    ) -> Outcome {
        match ty.target() {
            Some(target) => self.explore_type(name, &target, is_child),
            None => return self.report_unsupported(ty),
        }
        Outcome::Return
    }
}
