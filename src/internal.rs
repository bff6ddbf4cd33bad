use std::fmt::Display;

use tracing::log;

/// Downgrades a failure to a warning for steps that must not abort the run.
pub trait WarnExt {
    fn warn<C>(self, msg: C)
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> WarnExt for Result<T, E>
where
    E: std::fmt::Debug,
{
    fn warn<C>(self, msg: C)
    where
        C: Display + Send + Sync + 'static,
    {
        if let Err(e) = self {
            log::warn!("{}: {:?}", msg, e);
        }
    }
}
