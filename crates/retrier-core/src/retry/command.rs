//! Commands executed by the retry loop

use super::outcome::Outcome;

/// A fallible operation that can be attempted repeatedly
///
/// Implemented for every `FnMut(u32) -> Result<T, E>` closure. Implement it
/// directly for types that carry their own state between attempts.
///
/// # Example
///
/// ```rust
/// use retrier_core::retry::Operation;
///
/// struct Flaky {
///     fail_until: u32,
/// }
///
/// impl Operation for Flaky {
///     type Output = u32;
///     type Error = String;
///
///     fn call(&mut self, attempt: u32) -> Result<u32, String> {
///         if attempt < self.fail_until {
///             Err(format!("attempt {} failed", attempt))
///         } else {
///             Ok(attempt)
///         }
///     }
/// }
/// ```
pub trait Operation {
    /// Value produced on success
    type Output;
    /// Error produced on failure
    type Error;

    /// Run the operation for the given attempt (1-indexed)
    fn call(&mut self, attempt: u32) -> Result<Self::Output, Self::Error>;
}

impl<F, T, E> Operation for F
where
    F: FnMut(u32) -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    fn call(&mut self, attempt: u32) -> Result<T, E> {
        self(attempt)
    }
}

/// Wraps the operation driven by a [`crate::Retry`]
#[derive(Debug, Clone)]
pub struct Command<O> {
    handler: O,
}

impl<O: Operation> Command<O> {
    /// Create a command from an operation
    pub fn new(handler: O) -> Self {
        Self { handler }
    }

    /// Run the operation and capture its result as an [`Outcome`]
    pub fn invoke(&mut self, attempt: u32) -> Outcome<O::Output, O::Error> {
        self.handler.call(attempt).into()
    }

    /// Consume the command and return the wrapped operation
    pub fn into_inner(self) -> O {
        self.handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown {
        remaining: u32,
    }

    impl Operation for Countdown {
        type Output = &'static str;
        type Error = u32;

        fn call(&mut self, _attempt: u32) -> Result<&'static str, u32> {
            if self.remaining == 0 {
                Ok("liftoff")
            } else {
                self.remaining -= 1;
                Err(self.remaining)
            }
        }
    }

    #[test]
    fn test_closure_receives_attempt() {
        let mut seen = Vec::new();
        let mut command = Command::new(|attempt: u32| {
            seen.push(attempt);
            Ok::<_, ()>(attempt * 10)
        });

        assert_eq!(command.invoke(1), Outcome::Success(10));
        assert_eq!(command.invoke(2), Outcome::Success(20));
        drop(command);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_failure_becomes_outcome() {
        let mut command = Command::new(|_attempt: u32| Err::<(), _>("nope"));
        assert_eq!(command.invoke(1), Outcome::Failure("nope"));
    }

    #[test]
    fn test_operation_struct() {
        let mut command = Command::new(Countdown { remaining: 1 });
        assert_eq!(command.invoke(1), Outcome::Failure(0));
        assert_eq!(command.invoke(2), Outcome::Success("liftoff"));
        assert_eq!(command.into_inner().remaining, 0);
    }
}
