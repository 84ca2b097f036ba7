//! `define_port_error!` builds the error enum of a driven port.
//!
//! Each variant gets a `thiserror` message, a snake_case constructor taking
//! `impl Into<_>` for every field, and a stable `kind()` label used when
//! logging adapter failures.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),+ }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                Self::$variant { $($field: $field.into()),+ }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),+ $(,)? } )? => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),+ } )?,
            )+
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),+ } )?);
            )+

            /// Snake_case name of the variant, for structured logs.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant $( { $($field: _),+ } )? => {
                            ::paste::paste! { stringify!([<$variant:snake>]) }
                        }
                    )+
                }
            }
        }
    };
}

pub(crate) use define_port_error;
