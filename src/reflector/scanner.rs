//! Streaming meta-tag scanner.
//!
//! # Responsibilities
//! - Push the upstream body through an `lol_html` rewriter chunk by chunk
//! - Bind one `meta` selector per tracked field
//! - Capture the `content` attribute of every match into its slot
//!
//! # Design Decisions
//! - No tree is built and the rewritten output is discarded; only the
//!   element handlers matter
//! - Markup the tokenizer has to buffer is capped by `MemorySettings`;
//!   going over the cap fails the scan
//! - The rewriter is not `Send`, so `scan_body` owns it on the blocking
//!   pool and hands it chunks over a bounded channel
//! - Attribute values are captured as `lol_html` reports them, without
//!   character reference decoding

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;
use lol_html::errors::RewritingError;
use lol_html::{element, ElementContentHandlers, HtmlRewriter, MemorySettings, Selector, Settings};
use tokio::sync::mpsc;

use crate::reflector::types::{Field, MetadataRecord, ReflectError, ReflectResult};
use crate::reflector::upstream::UpstreamBody;

/// Default cap on markup buffered while scanning one body.
pub const DEFAULT_SCAN_MEMORY_LIMIT: usize = 4 * 1024 * 1024;

/// One selector bound to a capture slot.
#[derive(Debug, Clone, Copy)]
pub struct CaptureRule {
    pub selector: &'static str,
    pub field: Field,
}

/// The tags the reflector cares about.
pub static CAPTURE_RULES: [CaptureRule; 4] = [
    CaptureRule {
        selector: r#"meta[property="og:type"]"#,
        field: Field::OgType,
    },
    CaptureRule {
        selector: r#"meta[property="og:title"]"#,
        field: Field::OgTitle,
    },
    CaptureRule {
        selector: r#"meta[property="og:description"]"#,
        field: Field::OgDescription,
    },
    CaptureRule {
        selector: r#"meta[name="theme-color"]"#,
        field: Field::ThemeColor,
    },
];

const CAPTURED_ATTRIBUTE: &str = "content";

const PREALLOCATED_BUFFER_BYTES: usize = 1024;

/// Chunks in flight between the body reader and the scanner.
const CHUNK_QUEUE_DEPTH: usize = 16;

type Sink = fn(&[u8]);

fn discard(_: &[u8]) {}

/// Incremental scanner fed with body chunks.
pub struct MetaScanner {
    rewriter: HtmlRewriter<'static, Sink>,
    record: Rc<RefCell<MetadataRecord>>,
}

impl MetaScanner {
    /// Create a scanner matching [`CAPTURE_RULES`] that buffers at most
    /// `memory_limit` bytes of markup.
    pub fn new(memory_limit: usize) -> Self {
        let record = Rc::new(RefCell::new(MetadataRecord::default()));

        let mut memory = MemorySettings::default();
        memory.max_allowed_memory_usage = memory_limit;
        memory.preallocated_parsing_buffer_size = PREALLOCATED_BUFFER_BYTES.min(memory_limit);

        let settings = Settings {
            element_content_handlers: CAPTURE_RULES
                .iter()
                .map(|rule| capture_handler(rule, &record))
                .collect(),
            memory_settings: memory,
            strict: false,
            ..Settings::new()
        };

        Self {
            rewriter: HtmlRewriter::new(settings, discard as Sink),
            record,
        }
    }

    /// Feed the next chunk of the document.
    pub fn feed(&mut self, chunk: &[u8]) -> ReflectResult<()> {
        self.rewriter.write(chunk).map_err(scan_error)
    }

    /// Signal end of input and return what was captured.
    pub fn finish(self) -> ReflectResult<MetadataRecord> {
        self.rewriter.end().map_err(scan_error)?;
        Ok(self.record.take())
    }
}

/// Every match assigns its slot, so the last one wins; a match without
/// `content` clears it.
fn capture_handler(
    rule: &CaptureRule,
    record: &Rc<RefCell<MetadataRecord>>,
) -> (Cow<'static, Selector>, ElementContentHandlers<'static>) {
    let record = Rc::clone(record);
    let field = rule.field;
    element!(rule.selector, move |el| {
        *record.borrow_mut().slot_mut(field) = el.get_attribute(CAPTURED_ATTRIBUTE);
        Ok(())
    })
}

fn scan_error(err: RewritingError) -> ReflectError {
    ReflectError::Scan(err.to_string())
}

/// Drive `body` to completion through a [`MetaScanner`].
pub async fn scan_body<B: UpstreamBody>(
    mut body: B,
    memory_limit: usize,
) -> ReflectResult<MetadataRecord> {
    let (tx, mut rx) = mpsc::channel::<Bytes>(CHUNK_QUEUE_DEPTH);
    let scan = tokio::task::spawn_blocking(move || {
        let mut scanner = MetaScanner::new(memory_limit);
        while let Some(chunk) = rx.blocking_recv() {
            scanner.feed(&chunk)?;
        }
        scanner.finish()
    });

    let mut total = 0usize;
    while let Some(chunk) = body.next_chunk().await? {
        total += chunk.len();
        if tx.send(chunk).await.is_err() {
            // Scanner stopped early; its result carries the reason.
            break;
        }
    }
    drop(tx);
    tracing::trace!(bytes = total, "Upstream body drained");

    scan.await.map_err(|err| ReflectError::Scan(err.to_string()))?
}

/// Scan an in-memory document in one go.
pub fn scan_document(document: impl AsRef<[u8]>) -> ReflectResult<MetadataRecord> {
    let mut scanner = MetaScanner::new(DEFAULT_SCAN_MEMORY_LIMIT);
    scanner.feed(document.as_ref())?;
    scanner.finish()
}
