//! Finite state machine (Mealy machine).

use std::fmt;

use crate::*;

/// Finite state machine (Mealy machine).
///
/// The FSM function maps the inputs of the current cycle and the current state to the outputs of the current cycle
/// and the state of the next cycle.
pub struct Fsm<I, O, S: Signal> {
    /// Module name.
    module_name: String,
    /// FSM function.
    f: Box<dyn Fn(&I, &S) -> (O, S)>,
    /// Initial value of registers in the FSM.
    init: S,
    /// Current value of registers in the FSM.
    state: S,
}

impl<I, O, S: Signal> Fsm<I, O, S> {
    /// Creates a new FSM.
    pub fn new<F>(module_name: &str, f: F, init: S) -> Self
    where F: 'static + Fn(&I, &S) -> (O, S) {
        Self { module_name: module_name.to_string(), f: Box::new(f), state: init.clone(), init }
    }

    /// Module name.
    pub fn module_name(&self) -> &str { &self.module_name }

    /// Current value of registers.
    pub fn state(&self) -> &S { &self.state }
}

impl<I, O, S: Signal> fmt::Debug for Fsm<I, O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fsm")
            .field("module_name", &self.module_name)
            .field("init", &self.init)
            .field("state", &self.state)
            .finish()
    }
}

impl<I: Clone + fmt::Debug, O: Clone + fmt::Debug, S: Signal> Component for Fsm<I, O, S> {
    type Input = I;
    type Output = O;

    fn comb(&self, input: &I) -> O { (self.f)(input, &self.state).0 }

    fn tick(&mut self, input: &I, rst: bool) {
        if rst {
            self.state = self.init.clone();
            return;
        }

        let (_, next) = (self.f)(input, &self.state);
        log::trace!("{}: {:?} -> {:?}", self.module_name, self.state, next);
        self.state = next;
    }

    fn trace(&self, prefix: &str, tracer: &mut Tracer) {
        let prefix = Some(prefix.to_string()).filter(|p| !p.is_empty());
        let name = join_options("_", [prefix, Some(self.module_name.clone())]);
        tracer.probe(&name.unwrap_or_default(), &self.state);
    }
}
