#![allow(dead_code)]

use rox::sink::{CollectingReporter, SharedOutput};
use rox::{Lox, Outcome};

/// A `Lox` session whose printed output and diagnostics are captured.
pub struct Session {
    pub lox: Lox,
    output: SharedOutput,
    reporter: CollectingReporter,
}

impl Session {
    pub fn new() -> Self {
        let output = SharedOutput::new();
        let reporter = CollectingReporter::new();

        let lox = Lox::with_sinks(Box::new(output.clone()), Box::new(reporter.clone()));

        Self {
            lox,
            output,
            reporter,
        }
    }

    pub fn run(&mut self, source: &str) -> Outcome {
        self.lox.run(source)
    }

    pub fn output(&self) -> Vec<String> {
        self.output.lines()
    }

    pub fn errors(&self) -> Vec<String> {
        self.reporter.messages()
    }
}

/// Run `source` in a fresh session.
pub fn run(source: &str) -> (Outcome, Vec<String>, Vec<String>) {
    let mut session = Session::new();
    let outcome = session.run(source);

    (outcome, session.output(), session.errors())
}

/// Run `source` and require it to finish cleanly, returning printed lines.
pub fn run_ok(source: &str) -> Vec<String> {
    let (outcome, output, errors) = run(source);

    assert_eq!(outcome, Outcome::Completed, "diagnostics: {:?}", errors);
    assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);

    output
}
