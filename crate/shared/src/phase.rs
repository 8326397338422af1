use std::cell::RefCell;

/// The pipeline stage currently executing. `should_continue` treats
/// `Parsing` specially: the parser is expected to keep going after an error
/// via panic-mode recovery so the user sees as many diagnostics as possible
/// in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationPhase {
    Lexing,
    Parsing,
    Semantic,
}

#[derive(Debug)]
struct PhaseState {
    phase: CompilationPhase,
    error_count: usize,
    warning_count: usize,
}

impl Default for PhaseState {
    fn default() -> Self {
        PhaseState {
            phase: CompilationPhase::Lexing,
            error_count: 0,
            warning_count: 0,
        }
    }
}

thread_local! {
    static STATE: RefCell<PhaseState> = RefCell::new(PhaseState::default());
}

/// The diagnostic phase context: error/warning counters and the current
/// phase. Conceptually process-global long-lived state, but kept
/// thread-local here so that each compilation unit running on its own
/// thread gets an independent context, and so tests running in parallel
/// don't trample each other's counters.
pub struct PhaseContext;

impl PhaseContext {
    pub fn set_phase(phase: CompilationPhase) {
        STATE.with(|s| s.borrow_mut().phase = phase);
    }

    pub fn current_phase() -> CompilationPhase {
        STATE.with(|s| s.borrow().phase)
    }

    pub fn record_error() {
        STATE.with(|s| s.borrow_mut().error_count += 1);
    }

    pub fn record_warning() {
        STATE.with(|s| s.borrow_mut().warning_count += 1);
    }

    pub fn error_count() -> usize {
        STATE.with(|s| s.borrow().error_count)
    }

    pub fn warning_count() -> usize {
        STATE.with(|s| s.borrow().warning_count)
    }

    /// `true` when no errors have been recorded, except during `Parsing`,
    /// which is allowed to continue after errors.
    pub fn should_continue() -> bool {
        Self::current_phase() == CompilationPhase::Parsing || Self::error_count() == 0
    }

    /// Prints the total error/warning counts and, if there were errors,
    /// exits the process with code 1.
    pub fn print_summary() {
        let errors = Self::error_count();
        let warnings = Self::warning_count();
        if errors == 0 && warnings == 0 {
            return;
        }
        let mut parts = Vec::new();
        if errors > 0 {
            parts.push(format!("{} error{}", errors, if errors == 1 { "" } else { "s" }));
        }
        if warnings > 0 {
            parts.push(format!("{} warning{}", warnings, if warnings == 1 { "" } else { "s" }));
        }
        eprintln!("compilation finished with {}", parts.join(", "));
        if errors > 0 {
            std::process::exit(1);
        }
    }

    /// Resets the counters and phase. Only meant for test isolation, since
    /// the thread-local state otherwise lives for the life of the thread.
    #[doc(hidden)]
    pub fn reset_for_test() {
        STATE.with(|s| *s.borrow_mut() = PhaseState::default());
    }
}

/// Scoped guard that sets the current phase on construction and, on drop,
/// terminates the process if the phase produced unrecoverable errors.
pub struct PhaseGuard {
    _private: (),
}

impl PhaseGuard {
    pub fn enter(phase: CompilationPhase) -> Self {
        PhaseContext::set_phase(phase);
        PhaseGuard { _private: () }
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        if !PhaseContext::should_continue() {
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_phase_tolerates_errors() {
        PhaseContext::reset_for_test();
        PhaseContext::set_phase(CompilationPhase::Parsing);
        PhaseContext::record_error();
        assert!(PhaseContext::should_continue());
    }

    #[test]
    fn non_parsing_phase_does_not_tolerate_errors() {
        PhaseContext::reset_for_test();
        PhaseContext::set_phase(CompilationPhase::Semantic);
        PhaseContext::record_error();
        assert!(!PhaseContext::should_continue());
    }

    #[test]
    fn guard_drop_is_a_no_op_without_errors() {
        PhaseContext::reset_for_test();
        {
            let _guard = PhaseGuard::enter(CompilationPhase::Lexing);
        }
        assert_eq!(PhaseContext::error_count(), 0);
    }
}
