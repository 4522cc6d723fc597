//! In-memory tracing capture for assertions on spans and events.
//!
//! Spans are recorded when they close, so a span only appears once the
//! instrumented call has returned.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
};
use tracing_subscriber::{Layer, layer::Context, prelude::*, registry::LookupSpan};

/// One captured span or event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Captured {
    /// A span that has closed.
    Span {
        /// Span name from its metadata.
        name: String,
        /// Fields recorded at creation or later via `Span::record`.
        fields: BTreeMap<String, String>,
    },
    /// An emitted event.
    Event {
        /// Event level.
        level: Level,
        /// Fields, including `message`.
        fields: BTreeMap<String, String>,
    },
}

impl Captured {
    /// Returns the value of `field`, if present.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&str> {
        match self {
            Self::Span { fields, .. } | Self::Event { fields, .. } => {
                fields.get(field).map(String::as_str)
            }
        }
    }
}

/// A [`Layer`] that stores every closed span and emitted event in order.
///
/// # Examples
/// ```
/// use graphhds_test_support::trace::CaptureLayer;
///
/// let capture = CaptureLayer::default();
/// let answer = capture.run(|| {
///     tracing::info_span!("work", size = 3).in_scope(|| tracing::warn!(kind = "odd", "careful"));
///     42
/// });
/// assert_eq!(answer, 42);
/// assert_eq!(capture.span("work").and_then(|s| s.field("size").map(str::to_owned)), Some("3".to_owned()));
/// assert_eq!(capture.events_at(tracing::Level::WARN).len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct CaptureLayer {
    log: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureLayer {
    /// Runs `body` with this layer installed as the thread's default
    /// subscriber.
    pub fn run<T>(&self, body: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, body)
    }

    /// Everything captured so far, in completion order.
    #[must_use]
    pub fn entries(&self) -> Vec<Captured> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of the closed spans, in completion order.
    #[must_use]
    pub fn span_names(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                Captured::Span { name, .. } => Some(name),
                Captured::Event { .. } => None,
            })
            .collect()
    }

    /// The first closed span called `name`.
    #[must_use]
    pub fn span(&self, name: &str) -> Option<Captured> {
        self.entries()
            .into_iter()
            .find(|entry| matches!(entry, Captured::Span { name: n, .. } if n == name))
    }

    /// Events emitted at exactly `level`.
    #[must_use]
    pub fn events_at(&self, level: Level) -> Vec<Captured> {
        self.entries()
            .into_iter()
            .filter(|entry| matches!(entry, Captured::Event { level: l, .. } if *l == level))
            .collect()
    }

    /// Returns `true` when any event message contains `needle`.
    #[must_use]
    pub fn saw_message(&self, needle: &str) -> bool {
        self.entries().iter().any(|entry| {
            matches!(entry, Captured::Event { .. })
                && entry.field("message").is_some_and(|message| message.contains(needle))
        })
    }

    fn push(&self, entry: Captured) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

struct PendingSpan {
    name: &'static str,
    fields: BTreeMap<String, String>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut pending = PendingSpan {
            name: attrs.metadata().name(),
            fields: BTreeMap::new(),
        };
        attrs.record(&mut FieldSink(&mut pending.fields));
        span.extensions_mut().insert(pending);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id)
            && let Some(pending) = span.extensions_mut().get_mut::<PendingSpan>()
        {
            values.record(&mut FieldSink(&mut pending.fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldSink(&mut fields));
        self.push(Captured::Event {
            level: *event.metadata().level(),
            fields,
        });
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let Some(pending) = span.extensions_mut().remove::<PendingSpan>() else {
            return;
        };
        self.push(Captured::Span {
            name: pending.name.to_owned(),
            fields: pending.fields,
        });
    }
}

/// Stores every field as a display string. Strings are stored unquoted.
struct FieldSink<'a>(&'a mut BTreeMap<String, String>);

impl FieldSink<'_> {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_owned(), value);
    }
}

impl Visit for FieldSink<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_owned());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}
