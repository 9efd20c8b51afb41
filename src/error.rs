use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScopeError>;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid commit input in {source_name}: {message}")]
    Input { source_name: String, message: String },
    #[error("Git error: {0}")]
    Git(Box<dyn std::error::Error + Send + Sync + 'static>),
}

// gix errors are large; box them on the way in
macro_rules! boxed_git_errors {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for ScopeError {
                fn from(err: $err) -> Self {
                    ScopeError::Git(Box::new(err))
                }
            }
        )*
    };
}

boxed_git_errors!(
    gix::discover::Error,
    gix::object::find::existing::Error,
    gix::object::find::existing::with_conversion::Error,
    gix::object::commit::Error,
    gix::objs::decode::Error,
    gix::reference::find::existing::Error,
    gix::head::peel::to_commit::Error,
    gix::repository::diff_tree_to_tree::Error,
);
