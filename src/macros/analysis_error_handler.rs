/// logs a failed analyzer and hands the result back unchanged, so the
/// failure ends up in the snapshot slot of that analyzer
macro_rules! handle_analysis_error {
    ( $data:expr, $target:expr, $type_str:expr) => {
        match $data {
            Ok(e) => Ok(e),
            Err(error) => {
                log::error!(target:$target, "Error running {}. (error: {})", $type_str, error);
                Err(error)
            }
        }
    };
}

/// returns the error from the calling function, used for failures that abort
/// the whole analysis run. the caller of the run reports it
macro_rules! handle_fatal_analysis_error {
    ( $data:expr, $target:expr, $type_str:expr) => {
        match $data {
            Ok(e) => e,
            Err(error) => {
                log::debug!(target:$target, "Aborting analysis, {} failed. (error: {})", $type_str, error);
                return Err(error);
            }
        }
    };
}

pub(crate) use handle_analysis_error;
pub(crate) use handle_fatal_analysis_error;
