//! Loads and validates a [`Configuration`], optionally folding in the
//! CLI's `-v` flag. Kept as its own type (rather than inlined in `main.rs`)
//! since the teacher's `ConfigLoader` is itself a thin static-method struct
//! wrapping per-record `from_file`/`validate` calls.

use std::path::Path;

use config_types::Configuration;

use crate::error::SlicerError;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from `path`, falling back to
    /// [`Configuration::default`] if `path` is `None`, then validates it.
    pub fn load<P: AsRef<Path>>(path: Option<P>, verbose: bool) -> Result<Configuration, SlicerError> {
        let mut config = match path {
            Some(path) => Configuration::from_file(path)?,
            None => Configuration::default(),
        };
        config.verbose = config.verbose || verbose;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_falls_back_to_defaults() {
        let config = ConfigLoader::load::<&Path>(None, true).unwrap();
        assert!(config.verbose);
    }
}
