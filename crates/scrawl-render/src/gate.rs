// this_file: crates/scrawl-render/src/gate.rs

//! Coalescing of overlapping render requests onto one display slot.
//!
//! At most one render runs at a time. Requests arriving meanwhile collapse
//! into a single pending slot (newest wins); when the running render
//! finishes with a request pending, its output is thrown away and the
//! pending request is rendered instead. Only the newest completed render
//! ever reaches the display slot.

use crate::engine::RenderedDocument;
use crate::export::{ExportOutput, Exporter};
use log::{debug, warn};
use parking_lot::Mutex;
use scrawl_core::{Document, Result, ScrawlError};
use std::sync::Arc;

/// Permission to run one render. Only [`RenderGate`] creates these.
#[derive(Debug)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of [`RenderGate::try_begin`].
#[derive(Debug)]
pub enum Admission {
    /// Render `Document` now, then call [`RenderGate::complete`]
    Start(Ticket, Document),
    /// Another render is running; the request is now the pending one
    Coalesced,
}

/// Outcome of [`RenderGate::complete`].
#[derive(Debug)]
pub enum Completion {
    /// The result is now on display
    Published,
    /// The result was discarded; render the newer request next
    Superseded(Ticket, Document),
}

#[derive(Default)]
struct GateState {
    in_flight: bool,
    pending: Option<Document>,
    generation: u64,
    display: Option<Arc<RenderedDocument>>,
}

/// Guards the shared display slot.
#[derive(Default)]
pub struct RenderGate {
    state: Mutex<GateState>,
}

impl RenderGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self, doc: Document) -> Admission {
        let mut state = self.state.lock();
        if state.in_flight {
            if state.pending.replace(doc).is_some() {
                debug!(target: "scrawl::render", "pending render replaced by a newer request");
            }
            return Admission::Coalesced;
        }
        state.in_flight = true;
        state.generation += 1;
        Admission::Start(
            Ticket {
                generation: state.generation,
            },
            doc,
        )
    }

    pub fn complete(&self, ticket: Ticket, rendered: RenderedDocument) -> Completion {
        let mut state = self.state.lock();
        debug_assert_eq!(ticket.generation, state.generation);
        match state.pending.take() {
            Some(next) => {
                state.generation += 1;
                debug!(
                    target: "scrawl::render",
                    "render {} superseded by {}",
                    ticket.generation,
                    state.generation
                );
                Completion::Superseded(
                    Ticket {
                        generation: state.generation,
                    },
                    next,
                )
            }
            None => {
                state.display = Some(Arc::new(rendered));
                state.in_flight = false;
                Completion::Published
            }
        }
    }

    /// Give up a failed render. Returns the pending request to run next, if any.
    pub fn abort(&self, ticket: Ticket) -> Option<(Ticket, Document)> {
        let mut state = self.state.lock();
        debug_assert_eq!(ticket.generation, state.generation);
        match state.pending.take() {
            Some(next) => {
                state.generation += 1;
                Some((
                    Ticket {
                        generation: state.generation,
                    },
                    next,
                ))
            }
            None => {
                state.in_flight = false;
                None
            }
        }
    }

    /// Reset after a render that never returned. The pending request is
    /// dropped so it cannot later overtake a newer submission.
    fn abandon(&self) {
        let mut state = self.state.lock();
        if state.pending.take().is_some() {
            warn!(target: "scrawl::render", "pending render dropped after a panicking render");
        }
        state.in_flight = false;
    }

    /// Render `doc` through the gate.
    ///
    /// Returns `Ok(None)` when the request was coalesced into a render that
    /// another caller is driving; otherwise renders until no request is
    /// pending and returns what was published.
    pub fn submit<F>(&self, doc: Document, mut render: F) -> Result<Option<Arc<RenderedDocument>>>
    where
        F: FnMut(&Document) -> Result<RenderedDocument>,
    {
        let (mut ticket, mut doc) = match self.try_begin(doc) {
            Admission::Start(ticket, doc) => (ticket, doc),
            Admission::Coalesced => return Ok(None),
        };
        loop {
            let guard = UnwindGuard { gate: self };
            let outcome = render(&doc);
            guard.disarm();
            match outcome {
                Ok(rendered) => match self.complete(ticket, rendered) {
                    Completion::Published => return Ok(self.current()),
                    Completion::Superseded(next_ticket, next_doc) => {
                        ticket = next_ticket;
                        doc = next_doc;
                    }
                },
                Err(err) => match self.abort(ticket) {
                    Some((next_ticket, next_doc)) => {
                        warn!(target: "scrawl::render", "render failed, moving to pending request: {err}");
                        ticket = next_ticket;
                        doc = next_doc;
                    }
                    None => return Err(err),
                },
            }
        }
    }

    /// Most recently published render.
    pub fn current(&self) -> Option<Arc<RenderedDocument>> {
        self.state.lock().display.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Export what is on display. Fails with a retryable
    /// [`ScrawlError::ExportUnavailable`] until a render has completed.
    pub fn export_current(&self, exporter: &Exporter) -> Result<ExportOutput> {
        let current = self.current().ok_or_else(|| {
            ScrawlError::export_unavailable(
                exporter.format().extension(),
                "no render has completed yet",
            )
        })?;
        exporter.export(&current)
    }
}

/// Frees the gate if the render closure unwinds.
struct UnwindGuard<'g> {
    gate: &'g RenderGate,
}

impl UnwindGuard<'_> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        self.gate.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_core::{ExportFormat, Settings};
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::mpsc;
    use std::thread;

    fn rendered(text: &str) -> RenderedDocument {
        RenderedDocument {
            pages: Vec::new(),
            line_count: text.len(),
            face: text.to_string(),
        }
    }

    fn doc(text: &str) -> Document {
        Document::new(text, Settings::default())
    }

    #[test]
    fn test_newest_pending_wins() {
        let gate = RenderGate::new();
        let Admission::Start(ticket, first) = gate.try_begin(doc("a")) else {
            panic!("idle gate must admit");
        };
        assert_eq!(first.text, "a");
        assert!(matches!(gate.try_begin(doc("b")), Admission::Coalesced));
        assert!(matches!(gate.try_begin(doc("c")), Admission::Coalesced));

        let Completion::Superseded(ticket, next) = gate.complete(ticket, rendered("a")) else {
            panic!("pending request must supersede");
        };
        assert_eq!(next.text, "c");
        assert!(gate.current().is_none());

        assert!(matches!(gate.complete(ticket, rendered("c")), Completion::Published));
        assert_eq!(gate.current().unwrap().face, "c");
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_export_before_render_is_retryable() {
        let gate = RenderGate::new();
        let err = gate
            .export_current(&Exporter::new(ExportFormat::Png))
            .unwrap_err();
        assert!(err.is_retryable());
        gate.submit(doc("x"), |d| Ok(rendered(&d.text))).unwrap();
        assert!(gate.export_current(&Exporter::new(ExportFormat::Png)).is_ok());
    }

    #[test]
    fn test_failed_render_frees_gate() {
        let gate = RenderGate::new();
        let err = gate
            .submit(doc("x"), |_| Err(ScrawlError::render("boom")))
            .unwrap_err();
        assert!(matches!(err, ScrawlError::Render(_)));
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_concurrent_submits_coalesce() {
        let gate = Arc::new(RenderGate::new());
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let worker = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                let mut renders = Vec::new();
                let published = gate
                    .submit(doc("first"), |d| {
                        renders.push(d.text.clone());
                        if d.text == "first" {
                            started_tx.send(()).unwrap();
                            release_rx.recv().unwrap();
                        }
                        Ok(rendered(&d.text))
                    })
                    .unwrap();
                (renders, published)
            })
        };

        started_rx.recv().unwrap();
        assert!(gate.submit(doc("second"), |_| unreachable!()).unwrap().is_none());
        assert!(gate.submit(doc("third"), |_| unreachable!()).unwrap().is_none());
        release_tx.send(()).unwrap();

        let (renders, published) = worker.join().unwrap();
        assert_eq!(renders, vec!["first".to_string(), "third".to_string()]);
        assert_eq!(published.unwrap().face, "third");
        assert_eq!(gate.current().unwrap().face, "third");
    }

    #[test]
    fn test_panicking_render_frees_gate() {
        let gate = RenderGate::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = gate.submit(doc("boom"), |_| panic!("renderer blew up"));
        }));
        assert!(outcome.is_err());
        assert!(!gate.is_busy());
        assert!(gate.current().is_none());

        let published = gate
            .submit(doc("after"), |d| Ok(rendered(&d.text)))
            .unwrap();
        assert_eq!(published.unwrap().face, "after");
    }

    #[test]
    fn test_abandon_drops_stale_pending() {
        let gate = RenderGate::new();
        assert!(matches!(gate.try_begin(doc("running")), Admission::Start(..)));
        assert!(matches!(gate.try_begin(doc("stale")), Admission::Coalesced));
        gate.abandon();
        assert!(!gate.is_busy());

        let mut renders = Vec::new();
        gate.submit(doc("fresh"), |d| {
            renders.push(d.text.clone());
            Ok(rendered(&d.text))
        })
        .unwrap();
        assert_eq!(renders, vec!["fresh".to_string()]);
    }
}
