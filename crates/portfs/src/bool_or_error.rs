/// Three-way answer for backend state queries.
///
/// Wherever a boolean question ("does this path exist?", "did we claim the
/// lock?") can also fail to be evaluated (permission error, I/O error), the
/// answer is one of these three states.  There is deliberately no conversion
/// to `bool`: callers must say which of the three states they are looking
/// for, so an error can never be mistaken for a definitive no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolOrError {
    False,
    True,
    /// The question could not be evaluated.
    #[default]
    Error,
}

impl BoolOrError {
    pub fn is_false(self) -> bool {
        matches!(self, BoolOrError::False)
    }

    pub fn is_true(self) -> bool {
        matches!(self, BoolOrError::True)
    }

    pub fn is_error(self) -> bool {
        matches!(self, BoolOrError::Error)
    }

    /// Overwrite with the error state.
    pub fn set_error(&mut self) {
        *self = BoolOrError::Error;
    }

    /// Overwrite with a definitive answer.
    pub fn set(&mut self, t_or_f: bool) {
        *self = BoolOrError::from(t_or_f);
    }
}

impl From<bool> for BoolOrError {
    fn from(t_or_f: bool) -> Self {
        if t_or_f {
            BoolOrError::True
        } else {
            BoolOrError::False
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_error() {
        let answer = BoolOrError::default();
        assert!(answer.is_error());
        assert!(!answer.is_true());
        assert!(!answer.is_false());
    }

    #[test]
    fn constructed_from_bool() {
        assert!(BoolOrError::from(true).is_true());
        assert!(BoolOrError::from(false).is_false());
        assert!(!BoolOrError::from(false).is_error());
    }

    #[test]
    fn mutators() {
        let mut answer = BoolOrError::from(true);
        answer.set_error();
        assert!(answer.is_error());
        answer.set(false);
        assert!(answer.is_false());
        answer.set(true);
        assert!(answer.is_true());
    }
}
