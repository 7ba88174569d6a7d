pub mod errors;
pub mod models;

pub mod modules;

pub(crate) mod macros {
    pub mod analysis_error_handler;
}
