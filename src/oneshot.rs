use std::io::Write;

use crate::api::AskService;
use crate::chat::{Entry, InputBuffer, Role, SubmissionController, Surface, Transcript};

/// Surface that writes each entry as a plain `Label: text` line.
pub struct LinePrinter<W: Write> {
    out: W,
}

impl<W: Write> LinePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, entry: &Entry) {
        if let Err(err) = writeln!(self.out, "{}: {}", entry.role.label(), entry.text) {
            tracing::warn!(error = %err, "failed to print transcript entry");
        }
    }
}

impl<W: Write> Surface for LinePrinter<W> {
    fn appended(&mut self, _index: usize, entry: &Entry) {
        self.print(entry);
    }

    fn updated(&mut self, _index: usize, entry: &Entry) {
        self.print(entry);
    }
}

/// Send a single question through the submission pipeline, printing the
/// transcript to `out`. Returns the final assistant text, or `None` when the
/// question was blank.
pub async fn ask_once<W: Write>(
    service: &dyn AskService,
    question: &str,
    out: W,
) -> (Option<String>, W) {
    let mut transcript = Transcript::new(LinePrinter::new(out));
    let mut input = InputBuffer::new();
    let mut controller = SubmissionController::new();

    input.set_text(question);
    let sent = controller
        .submit_and_wait(&mut input, &mut transcript, service)
        .await;

    let answer = transcript
        .last()
        .filter(|entry| sent && entry.role == Role::Assistant)
        .map(|entry| entry.text.clone());

    (answer, transcript.into_surface().into_inner())
}
