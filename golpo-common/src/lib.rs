pub mod models;
pub mod utils;

pub use color_eyre::{
    eyre::{bail, eyre as err, Context, Report},
    install,
};

#[twelf::config]
pub struct Conf {
    /// Path to the published catalog JSON document
    pub catalog: String,

    /// Path to the admin editor's working copy of the catalog
    pub workbench: String,

    /// Password for the admin editor, required by `golpo admin`
    pub admin_token: Option<String>,
}
