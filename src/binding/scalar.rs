//! Scalar variables and their enumerated attributes.

use std::fmt;

use super::types::TypeDescriptor;
use super::ValueReference;

macro_rules! attribute_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            /// Attribute spelling in the description document.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Case-insensitive parse of an attribute value.
            pub fn parse(text: &str) -> Option<Self> {
                let text = text.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(text))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

attribute_enum! {
    /// Role of a scalar variable in data flow.
    Causality {
        Parameter => "parameter",
        CalculatedParameter => "calculatedParameter",
        Input => "input",
        Output => "output",
        Local => "local",
        Independent => "independent",
    }
}

attribute_enum! {
    Variability {
        Constant => "constant",
        Fixed => "fixed",
        Tunable => "tunable",
        Discrete => "discrete",
        Continuous => "continuous",
    }
}

attribute_enum! {
    Initial {
        Exact => "exact",
        Approx => "approx",
        Calculated => "calculated",
    }
}

/// One exchange-visible quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarVariable {
    pub name: String,
    pub value_reference: ValueReference,
    pub description: Option<String>,
    /// `None` when the document omits the attribute.
    pub causality: Option<Causality>,
    pub variability: Option<Variability>,
    pub initial: Option<Initial>,
    pub ty: TypeDescriptor,
}

impl ScalarVariable {
    pub fn new(name: impl Into<String>, value_reference: ValueReference, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            value_reference,
            description: None,
            causality: None,
            variability: None,
            initial: None,
            ty,
        }
    }

    pub fn with_causality(mut self, causality: Causality) -> Self {
        self.causality = Some(causality);
        self
    }

    pub fn with_variability(mut self, variability: Variability) -> Self {
        self.variability = Some(variability);
        self
    }

    pub fn with_initial(mut self, initial: Initial) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Causality with the document default applied (an absent attribute means parameter).
    pub fn effective_causality(&self) -> Causality {
        self.causality.unwrap_or(Causality::Parameter)
    }
}
