pub mod api;
pub mod config;
pub mod debounce;
pub mod i18n;
pub mod lifecycle;
pub mod route;
pub mod shell;

#[cfg(test)]
pub(crate) mod test_support;
