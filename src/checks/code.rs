//! The difference-code catalog of the built-in checks.
//!
//! Codes are the external contract: downstream filtering and suppression
//! key on them, so they stay stable across releases once published. Each
//! code carries its default classification and the message key used to
//! render its description.

use crate::messages::MessageBundle;
use crate::model::{Compatibility, DifferenceBuilder, Difference, Severity};

use Compatibility::{Binary, Semantic, Source};
use Severity::{Breaking, NonBreaking, PotentiallyBreaking};

/// Stable machine codes emitted by the built-in check catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    ClassAdded,
    ClassRemoved,
    ClassKindChanged,
    FieldAdded,
    FieldRemoved,
    FieldTypeChanged,
    FieldConstantValueChanged,
    FieldNowConstant,
    FieldConstantRemoved,
    MethodAdded,
    MethodRemoved,
    MethodReturnTypeChanged,
    AnnotationAdded,
    AnnotationRemoved,
}

impl Code {
    /// The stable machine code string.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Code::ClassAdded => "class.added",
            Code::ClassRemoved => "class.removed",
            Code::ClassKindChanged => "class.kindChanged",
            Code::FieldAdded => "field.added",
            Code::FieldRemoved => "field.removed",
            Code::FieldTypeChanged => "field.typeChanged",
            Code::FieldConstantValueChanged => "field.constantValueChanged",
            Code::FieldNowConstant => "field.nowConstant",
            Code::FieldConstantRemoved => "field.constantRemoved",
            Code::MethodAdded => "method.added",
            Code::MethodRemoved => "method.removed",
            Code::MethodReturnTypeChanged => "method.returnTypeChanged",
            Code::AnnotationAdded => "annotation.added",
            Code::AnnotationRemoved => "annotation.removed",
        }
    }

    /// Short human name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Code::ClassAdded => "class added",
            Code::ClassRemoved => "class removed",
            Code::ClassKindChanged => "class kind changed",
            Code::FieldAdded => "field added",
            Code::FieldRemoved => "field removed",
            Code::FieldTypeChanged => "field type changed",
            Code::FieldConstantValueChanged => "constant value changed",
            Code::FieldNowConstant => "field became constant",
            Code::FieldConstantRemoved => "constant field removed",
            Code::MethodAdded => "method added",
            Code::MethodRemoved => "method removed",
            Code::MethodReturnTypeChanged => "return type changed",
            Code::AnnotationAdded => "annotation added",
            Code::AnnotationRemoved => "annotation removed",
        }
    }

    /// Default classification of this code's impact.
    #[must_use]
    pub fn classification(self) -> &'static [(Compatibility, Severity)] {
        match self {
            Code::ClassAdded | Code::FieldAdded | Code::MethodAdded => {
                &[(Source, NonBreaking), (Binary, NonBreaking)]
            }
            Code::ClassRemoved
            | Code::ClassKindChanged
            | Code::FieldRemoved
            | Code::FieldTypeChanged
            | Code::FieldConstantRemoved
            | Code::MethodRemoved
            | Code::MethodReturnTypeChanged => &[(Source, Breaking), (Binary, Breaking)],
            Code::FieldConstantValueChanged | Code::FieldNowConstant => &[
                (Source, NonBreaking),
                (Binary, NonBreaking),
                (Semantic, PotentiallyBreaking),
            ],
            Code::AnnotationAdded | Code::AnnotationRemoved => {
                &[(Source, NonBreaking), (Semantic, PotentiallyBreaking)]
            }
        }
    }

    /// Start a difference for this code with its name, default
    /// classification and a description rendered from the message bundle.
    #[must_use]
    pub fn into_difference(
        self,
        bundle: &dyn MessageBundle,
        locale: &str,
        args: &[&str],
    ) -> DifferenceBuilder {
        let mut builder = Difference::builder(self.code())
            .name(self.display_name())
            .description(bundle.message(self.code(), locale, args));
        for &(dimension, severity) in self.classification() {
            builder = builder.classify(dimension, severity);
        }
        builder
    }
}
