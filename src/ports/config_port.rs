//! Configuration access port trait.

/// Raw key lookup. Parsing and validation of the values happens in
/// [`crate::domain::config_validation`], so every adapter reports bad values
/// the same way.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
