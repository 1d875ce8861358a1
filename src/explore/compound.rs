//! Structs, classes and unions
//!
//! A compound node shows a table of its non-artificial fields and lets the
//! user pick one to descend into. Menu choices are numbered from 0 in
//! declaration order over the explorable fields only, and the number typed
//! at the prompt indexes straight into the list of choices.
//!
//! For a struct/class value, fields of scalar type are shown inline with
//! their current value and are not choices. A union has no statically known
//! active member, so every field of a union is a choice. In the type variant
//! every field is a choice.

use super::category::Category;
use super::dispatch::{Explorer, Outcome};
use super::host::{Console, FieldDescriptor, TypeCode, TypeHandle, ValueHandle};
use super::path::field_path;

/// One numbered entry of a field menu
struct Choice<N> {
    path: String,
    node: N,
}

fn type_desc(code: TypeCode) -> &'static str {
    if code == TypeCode::Union {
        "union"
    } else {
        "struct/class"
    }
}

fn field_desc<T>(field: &FieldDescriptor<T>) -> &'static str {
    if field.is_base_class {
        "base class"
    } else {
        "field"
    }
}

fn real_fields<T: TypeHandle>(ty: &T) -> Vec<FieldDescriptor<T>> {
    ty.fields()
        .into_iter()
        .filter(|field| !field.is_artificial)
        .collect()
}

/// Format the field table, names right-aligned to the longest one
fn field_table(rows: &[(String, String)]) -> String {
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(name, text)| format!("  {:>width$} = {}\n", name, text, width = width))
        .collect()
}

impl<C: Console> Explorer<'_, C> {
    pub(crate) fn explore_compound_value<V: ValueHandle>(
        &mut self,
        path: &str,
        value: &V,
        is_child: bool,
    ) -> Outcome {
        let ty = value.ty();
        let is_union = ty.code() == TypeCode::Union;
        let desc = type_desc(ty.code());
        let fields = real_fields(&ty);

        if fields.is_empty() {
            self.console.writeln(&format!(
                "The value of '{}' is a {} of type '{}' with no fields.",
                path, desc, ty
            ));
            if is_child {
                self.return_to_parent_value_prompt();
            }
            return Outcome::Return;
        }

        self.console.writeln(&format!(
            "The value of '{}' is a {} of type '{}' with the following fields:\n",
            path, desc, ty
        ));

        let mut choices: Vec<Choice<V>> = Vec::new();
        let mut rows = Vec::with_capacity(fields.len());
        for field in &fields {
            let field_value = if field.is_base_class {
                value.cast_to(&field.ty)
            } else {
                value.field_value(field)
            };

            let text = match field_value {
                Err(err) => format!("<error: {}>", err),
                Ok(field_value) => {
                    if !is_union && field.ty.category() == Category::Scalar {
                        let rendered = field_value
                            .render()
                            .unwrap_or_else(|err| format!("<error: {}>", err));
                        format!("{} .. (Value of type '{}')", rendered, field.ty)
                    } else {
                        let text = format!(
                            "<Enter {} to explore this {} of type '{}'>",
                            choices.len(),
                            field_desc(field),
                            field.ty
                        );
                        choices.push(Choice {
                            path: field_path(path, &field.name),
                            node: field_value,
                        });
                        text
                    }
                }
            };
            rows.push((field.name.clone(), text));
        }

        self.console.writeln(&field_table(&rows));

        if choices.is_empty() {
            if is_child {
                self.return_to_parent_value_prompt();
            }
            return Outcome::Return;
        }

        let input = self.console.read_line("Enter the field number of choice: ");
        match input.trim().parse::<usize>().ok().and_then(|n| choices.get(n)) {
            Some(choice) => {
                self.explore_value(&choice.path, &choice.node, true);
                Outcome::Repeat
            }
            None => {
                if is_child {
                    self.return_to_parent_value();
                }
                Outcome::Return
            }
        }
    }

    pub(crate) fn explore_compound_type<T: TypeHandle>(
        &mut self,
        name: &str,
        ty: &T,
        is_child: bool,
    ) -> Outcome {
        let desc = type_desc(ty.code());
        let fields = real_fields(ty);

        if fields.is_empty() {
            if is_child {
                self.console.writeln(&format!(
                    "{} is a {} of type '{}' with no fields.",
                    name, desc, ty
                ));
                self.return_to_enclosing_type_prompt();
            } else {
                self.console
                    .writeln(&format!("'{}' is a {} with no fields.", name, desc));
            }
            return Outcome::Return;
        }

        if is_child {
            self.console.writeln(&format!(
                "{} is a {} of type '{}' with the following fields:\n",
                name, desc, ty
            ));
        } else {
            self.console.writeln(&format!(
                "'{}' is a {} with the following fields:\n",
                name, desc
            ));
        }

        let mut choices = Vec::with_capacity(fields.len());
        let mut rows = Vec::with_capacity(fields.len());
        for (number, field) in fields.iter().enumerate() {
            let desc = field_desc(field);
            rows.push((
                field.name.clone(),
                format!(
                    "<Enter {} to explore this {} of type '{}'>",
                    number, desc, field.ty
                ),
            ));
            let path = if is_child {
                format!("{} '{}' of {}", desc, field.name, name)
            } else {
                format!("{} '{}' of '{}'", desc, field.name, name)
            };
            choices.push(Choice {
                path,
                node: field.ty.clone(),
            });
        }

        self.console.writeln(&field_table(&rows));

        let input = self.console.read_line("Enter the field number of choice: ");
        match input.trim().parse::<usize>().ok().and_then(|n| choices.get(n)) {
            Some(choice) => {
                self.explore_type(&choice.path, &choice.node, true);
                Outcome::Repeat
            }
            None => {
                if is_child {
                    self.return_to_enclosing_type();
                }
                Outcome::Return
            }
        }
    }
}
