//! This module is responsible for preparing the resources needed by the application,
//! such as directories and configurations.

pub mod resource {
    use super::SignBridgeProperty;

    /// Initialize the application resources and return a SignBridgeProperty
    /// instance containing paths and configurations.
    pub fn init() -> SignBridgeProperty {
        // Prepare the app data directories
        let paths = crate::module::util::path::dir::create_app_sub_dir();

        // Load the app configuration file, generating the default on first run
        let conf =
            crate::module::util::conf::toml::load(&paths.dir.data).expect("Can't load config.");

        SignBridgeProperty { path: paths, conf }
    }
}

/// This struct represents the properties of the app, such as paths and configurations.
#[derive(Debug, Clone)]
pub struct SignBridgeProperty {
    pub path: crate::module::util::path::SignBridgePath, // The paths of the app resources
    pub conf: crate::module::util::conf::Config,         // The configurations of the app
}
