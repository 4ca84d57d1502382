// pipewright/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures that originate inside the engine or its ready-made middlewares.
///
/// Pipes are generic over the caller's error type; engine failures reach the
/// caller through that type's `From<PipeError>` impl.
#[derive(Debug, Error)]
pub enum PipeError {
  #[error("Step raised an error: {message}")]
  Thrown { message: String },

  /// A failure from user code, usually reached through `?` on an
  /// `anyhow::Result` inside a middleware whose error type is `PipeError`:
  ///
  /// ```ignore
  /// let parse = from_fn(|_deps: Arc<Deps>| move |raw: String, _history: History<String>| async move {
  ///   let port: u16 = read_port(&raw)?; // anyhow::Result<u16>
  ///   Ok::<_, PipeError>(Control::Continue(port.to_string()))
  /// });
  /// ```
  #[error("Error in user-provided middleware or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal pipewright error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for PipeError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap instead of nesting HandlerError(HandlerError(..)).
    match err.downcast::<PipeError>() {
      Ok(pipe_err) => pipe_err,
      Err(source) => PipeError::HandlerError { source },
    }
  }
}

pub type PipeResult<T, E = PipeError> = std::result::Result<T, E>;

/// Bound every pipe error type satisfies.
///
/// `From<PipeError>` lets the engine report its own failures (and the
/// `throw_error` middleware) in the caller's error type.
pub trait StepError: std::error::Error + From<PipeError> + Send + Sync + 'static {}

impl<T> StepError for T where T: std::error::Error + From<PipeError> + Send + Sync + 'static {}
