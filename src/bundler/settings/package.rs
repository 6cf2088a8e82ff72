//! Release identity of the bundle.

/// Product name and release version.
///
/// Together with the platform key these determine the archive name
/// `<product_name>-runtime-v<version>-<platform>.tar.gz`.
///
/// # Examples
///
/// ```no_run
/// use runtime_bundler::bundler::PackageSettings;
///
/// let settings = PackageSettings {
///     product_name: "reviewer".into(),
///     version: "1.2.3".into(),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct PackageSettings {
    /// Product name, used for the dispatcher script and the archive name.
    pub product_name: String,

    /// Release version as given on the command line.
    ///
    /// Example: "1.2.3", "0.4.0-rc.1"
    pub version: String,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            product_name: super::DEFAULT_PRODUCT.to_string(),
            version: String::new(),
        }
    }
}
