//! Declarative accessor interfaces.

/// Declare a configuration interface: a struct whose methods read live,
/// typed values from a [`ConfigAccessor`](crate::ConfigAccessor).
///
/// Each `fn name() -> Type;` reads the alias `dotted(Struct).dotted(name)`,
/// or `namespace.dotted(name)` when the struct is declared `in "namespace"`.
/// Methods without a default return `Result<Option<Type>, ConfigError>`;
/// methods declared `= expr` return `Result<Type, ConfigError>` and evaluate
/// `expr` whenever the alias is absent.
///
/// ```rust
/// use accessor::{ConfigAccessor, config_interface};
/// use config::InMemoryConfigurationRepository;
/// use std::sync::Arc;
///
/// config_interface! {
///     /// Settings of the checkout service.
///     pub struct CheckoutSettings {
///         fn retry_limit() -> u32 = 3;
///         fn banner() -> String;
///     }
/// }
///
/// let accessor = ConfigAccessor::new(Arc::new(InMemoryConfigurationRepository::new()));
/// let checkout = CheckoutSettings::new(&accessor);
///
/// assert_eq!(checkout.retry_limit().unwrap(), 3);
/// assert_eq!(checkout.banner().unwrap(), None);
/// assert!(accessor.registry().lookup("CheckoutSettings", "retry_limit").is_some());
/// ```
#[macro_export]
macro_rules! config_interface {
    (@namespace) => {
        ::std::option::Option::None
    };
    (@namespace $ns:literal) => {
        ::std::option::Option::Some($ns)
    };

    (@has_default) => {
        false
    };
    (@has_default $default:expr) => {
        true
    };

    (@ret $ty:ty) => {
        ::std::result::Result<::std::option::Option<$ty>, $crate::ConfigError>
    };
    (@ret $ty:ty, $default:expr) => {
        ::std::result::Result<$ty, $crate::ConfigError>
    };

    (@get $accessor:expr, $descriptor:expr, $ty:ty) => {
        $accessor.get::<$ty>($descriptor)
    };
    (@get $accessor:expr, $descriptor:expr, $ty:ty, $default:expr) => {
        $accessor.get_or::<$ty>($descriptor, || $default)
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(in $ns:literal)? {
            $(
                $(#[$method_meta:meta])*
                fn $method:ident() -> $ty:ty $(= $default:expr)?;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            accessor: $crate::ConfigAccessor,
            $(
                $method: ::std::sync::Arc<$crate::AccessorDescriptor>,
            )*
        }

        impl $name {
            /// Register this interface's methods and bind them to `accessor`.
            pub fn new(accessor: &$crate::ConfigAccessor) -> Self {
                let namespace: ::std::option::Option<&str> =
                    $crate::config_interface!(@namespace $($ns)?);
                Self {
                    accessor: accessor.clone(),
                    $(
                        $method: accessor.register::<$ty>(
                            stringify!($name),
                            stringify!($method),
                            namespace,
                            $crate::config_interface!(@has_default $($default)?)
                        ),
                    )*
                }
            }

            /// Descriptors of every method, in declaration order.
            pub fn descriptors(&self) -> ::std::vec::Vec<::std::sync::Arc<$crate::AccessorDescriptor>> {
                ::std::vec![$(self.$method.clone()),*]
            }

            $(
                $(#[$method_meta])*
                pub fn $method(&self) -> $crate::config_interface!(@ret $ty $(, $default)?) {
                    $crate::config_interface!(@get self.accessor, &self.$method, $ty $(, $default)?)
                }
            )*
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("accessor", &self.accessor)
                    .finish()
            }
        }
    };
}
