//! Configuration access port trait.

use std::collections::HashMap;

use crate::domain::error::VolbreakError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// Every key of `section` as a number; boolean words map to 1 and 0.
    /// A missing section yields an empty map.
    fn section_params(&self, section: &str) -> Result<HashMap<String, f64>, VolbreakError>;
}
