//! The fixed primitive type registry.

/// A PLC type. The registry is fixed and closed — there are no
/// user-defined types, so there is no `Adt`/`Named` variant the way a
/// general compiler's type system would have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Any,
    Nil,
    /// Virtual supertype of `Integer`, `Decimal`, `Character`, `String`
    /// — exists only for the ordered-comparison operators.
    Comparable,
    Integer,
    Decimal,
    Boolean,
    Character,
    String,
    /// Convenience type for built-in iteration helpers. No grammar
    /// production currently yields a value of this type (the `for`
    /// loop is C-style, not an iterator `for-each`); it is part of the
    /// registry for data-model completeness and a future iteration
    /// helper.
    IntegerIterable,
}

impl Type {
    /// The name this type is emitted as by `plc-emit` when it appears
    /// in a declaration or parameter position. Types outside the four
    /// explicitly mapped ones pass through under their own name,
    /// except `Nil`, which only ever appears as an omitted method
    /// return type and is emitted as the target language's `void`.
    pub fn target_name(&self) -> &'static str {
        match self {
            Type::Integer => "int",
            Type::Decimal => "double",
            Type::Boolean => "boolean",
            Type::String => "String",
            Type::Nil => "void",
            Type::Any => "Any",
            Type::Comparable => "Comparable",
            Type::Character => "Character",
            Type::IntegerIterable => "IntegerIterable",
        }
    }

    /// The orderable primitives `Comparable` stands in for.
    pub fn is_comparable_member(&self) -> bool {
        matches!(self, Type::Integer | Type::Decimal | Type::Character | Type::String)
    }
}

/// The widening relation permitting `source` to be used where `target`
/// is expected.
pub fn is_assignable(target: Type, source: Type) -> bool {
    target == source || target == Type::Any || (target == Type::Comparable && source.is_comparable_member())
}

/// Resolves a source type-name identifier (as written after `:` in a
/// declaration, parameter, or return-type position) to a [`Type`].
pub fn lookup_type_name(name: &str) -> Option<Type> {
    Some(match name {
        "Any" => Type::Any,
        "Nil" => Type::Nil,
        "Comparable" => Type::Comparable,
        "Integer" => Type::Integer,
        "Decimal" => Type::Decimal,
        "Boolean" => Type::Boolean,
        "Character" => Type::Character,
        "String" => Type::String,
        "IntegerIterable" => Type::IntegerIterable,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_assignable() {
        assert!(is_assignable(Type::Integer, Type::Integer));
    }

    #[test]
    fn any_accepts_everything() {
        assert!(is_assignable(Type::Any, Type::String));
        assert!(is_assignable(Type::Any, Type::Nil));
    }

    #[test]
    fn comparable_accepts_only_orderable_primitives() {
        assert!(is_assignable(Type::Comparable, Type::Integer));
        assert!(is_assignable(Type::Comparable, Type::Character));
        assert!(!is_assignable(Type::Comparable, Type::Any));
        assert!(!is_assignable(Type::Comparable, Type::Nil));
    }

    #[test]
    fn unrelated_primitives_are_not_assignable() {
        assert!(!is_assignable(Type::Integer, Type::Decimal));
        assert!(!is_assignable(Type::String, Type::Integer));
    }
}
