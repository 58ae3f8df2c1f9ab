//! Structural compatibility between types.

use super::{PrimitiveKind, Type};

/// Can a value of type `right` be used where `left` is expected?
///
/// Functions compare inputs contravariantly and the output covariantly.
/// Pointers require identical referenced types no matter what
/// `allow_covariant` says. With `allow_covariant`, `int` widens to
/// `double`. Anything involving `unspecified` is incompatible.
pub fn deep_compare(left: &Type, right: &Type, allow_covariant: bool) -> bool {
    if left.is_unspecified() || right.is_unspecified() {
        return false;
    }

    match (left, right) {
        (Type::Function(expected), Type::Function(actual)) => {
            expected.inputs.len() == actual.inputs.len()
                && expected
                    .inputs
                    .iter()
                    .zip(&actual.inputs)
                    .all(|(wanted, given)| deep_compare(given, wanted, allow_covariant))
                && deep_compare(&expected.output, &actual.output, allow_covariant)
        }
        (Type::Function(_), _) => false,
        (Type::Pointer(expected), Type::Pointer(actual)) => deep_compare(expected, actual, false),
        (Type::Pointer(_), _) => false,
        (
            Type::Primitive(PrimitiveKind::Double),
            Type::Primitive(PrimitiveKind::Int | PrimitiveKind::Double),
        ) if allow_covariant => true,
        _ => left == right,
    }
}
