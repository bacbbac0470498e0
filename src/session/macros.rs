//! Method logging macros.
//!
//! Each one resolves the qualified name of the enclosing function and passes
//! it to the matching `Session::log_method_*` call as the log category.

/// Qualified name of the enclosing function, such as `my_app::orders::create`.
///
/// Closure and async-block suffixes are stripped, so the name inside an
/// `async fn` is the function itself.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(here);
        let name = name.strip_suffix("::here").unwrap_or(name);
        name.trim_end_matches("::{{closure}}")
    }};
}

/// ```ignore
/// log_method_enter!(session);
/// ```
#[macro_export]
macro_rules! log_method_enter {
    ($session:expr) => {
        $session.log_method_enter($crate::function_name!())
    };
}

/// One entry per argument, subcategorized by position.
///
/// ```ignore
/// log_method_parameter!(session, order_id, quantity);
/// ```
#[macro_export]
macro_rules! log_method_parameter {
    ($session:expr $(, $value:expr)* $(,)?) => {
        $session.log_method_parameter(
            $crate::function_name!(),
            &[$(&$value as &dyn ::std::fmt::Debug),*],
        )
    };
}

#[macro_export]
macro_rules! log_method_return {
    ($session:expr $(, $value:expr)* $(,)?) => {
        $session.log_method_return(
            $crate::function_name!(),
            &[$(&$value as &dyn ::std::fmt::Debug),*],
        )
    };
}

#[macro_export]
macro_rules! log_method_exit {
    ($session:expr) => {
        $session.log_method_exit($crate::function_name!())
    };
}
