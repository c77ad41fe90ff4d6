//! Navigator trait.

/// Sends the user somewhere else, typically the login screen.
///
/// Called exactly once per torn-down session, with the configured login path.
pub trait Navigator: Send + Sync {
    fn go_to(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn go_to(&self, path: &str) {
        self(path)
    }
}
