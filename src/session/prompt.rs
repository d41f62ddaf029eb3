use crate::error::AppError;

/// What came back from the operator. `Interrupted` means Ctrl+C.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    Value(T),
    Interrupted,
}

/// The operator's side of the edit session.
pub trait Prompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<Answer<bool>, AppError>;

    /// Returns the index of the chosen item.
    fn select(&mut self, question: &str, choices: &[String]) -> Result<Answer<usize>, AppError>;

    fn input(&mut self, question: &str, initial: &str) -> Result<Answer<String>, AppError>;

    /// Shows a one-line status message alongside the next prompt.
    fn notify(&mut self, message: &str);
}
