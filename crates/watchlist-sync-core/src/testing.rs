use crate::resolver::ResolutionStrategy;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};
use watchlist_sync_models::{ImdbId, KeyEncoding, RatingKey, ResolutionMapping};
use watchlist_sync_sources::WatchlistService;

pub fn imdb(id: &str) -> ImdbId {
    ImdbId::parse(id).unwrap()
}

/// Deterministic 24-char hex key derived from a short label
pub fn hex(label: &str) -> RatingKey {
    let digits: String = label.bytes().map(|b| format!("{:02x}", b)).collect();
    RatingKey::hex(&format!("{:0>24}", digits)).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Add(String),
    Remove(String),
}

pub struct FakeWatchlist {
    pub keys: HashSet<RatingKey>,
    pub encoding: KeyEncoding,
    pub fail_on: Option<String>,
    pub calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeWatchlist {
    pub fn new(keys: impl IntoIterator<Item = RatingKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            encoding: KeyEncoding::Hex,
            fail_on: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WatchlistService for FakeWatchlist {
    fn key_encoding(&self) -> KeyEncoding {
        self.encoding
    }

    async fn read(&self) -> Result<HashSet<RatingKey>> {
        Ok(self.keys.clone())
    }

    async fn add(&self, key: &RatingKey) -> Result<()> {
        if self.fail_on.as_deref() == Some(key.as_str()) {
            anyhow::bail!("503 Service Unavailable");
        }
        self.calls.lock().unwrap().push(Call::Add(key.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &RatingKey) -> Result<()> {
        if self.fail_on.as_deref() == Some(key.as_str()) {
            anyhow::bail!("503 Service Unavailable");
        }
        self.calls.lock().unwrap().push(Call::Remove(key.to_string()));
        Ok(())
    }
}

/// Strategy answering from a fixed table, recording each batch it was asked for
pub struct FakeStrategy {
    pub table: Vec<(ImdbId, RatingKey)>,
    pub encoding: KeyEncoding,
    pub fail: bool,
    pub requests: Mutex<Vec<Vec<ImdbId>>>,
}

impl FakeStrategy {
    pub fn new(table: Vec<(ImdbId, RatingKey)>) -> Self {
        Self {
            table,
            encoding: KeyEncoding::Hex,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ImdbId>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResolutionStrategy for FakeStrategy {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn key_encoding(&self) -> KeyEncoding {
        self.encoding
    }

    async fn resolve(&self, ids: &[ImdbId]) -> Result<ResolutionMapping> {
        self.requests.lock().unwrap().push(ids.to_vec());
        if self.fail {
            anyhow::bail!("endpoint unreachable");
        }
        let mut mapping = ResolutionMapping::new();
        for (id, key) in &self.table {
            if ids.contains(id) {
                mapping.insert_first(id.clone(), key.clone());
            }
        }
        Ok(mapping)
    }
}

/// Write a Parquet index with an INT64 `imdb_numeric_id` column and a
/// nullable binary `key` column
pub fn write_index_file(path: &Path, rows: &[(i64, Option<&str>)]) {
    use parquet::data_type::{ByteArray, ByteArrayType, Int64Type};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;

    let schema =
        parse_message_type("message plex_index { REQUIRED INT64 imdb_numeric_id; OPTIONAL BYTE_ARRAY key; }")
            .unwrap();
    let file = std::fs::File::create(path).unwrap();
    let mut writer = SerializedFileWriter::new(
        file,
        Arc::new(schema),
        Arc::new(WriterProperties::builder().build()),
    )
    .unwrap();

    let ids: Vec<i64> = rows.iter().map(|(id, _)| *id).collect();
    let keys: Vec<ByteArray> = rows
        .iter()
        .filter_map(|(_, key)| key.map(|k| ByteArray::from(decode_hex(k))))
        .collect();
    let definition_levels: Vec<i16> = rows.iter().map(|(_, key)| i16::from(key.is_some())).collect();

    let mut row_group = writer.next_row_group().unwrap();
    let mut column = row_group.next_column().unwrap().unwrap();
    column.typed::<Int64Type>().write_batch(&ids, None, None).unwrap();
    column.close().unwrap();
    let mut column = row_group.next_column().unwrap().unwrap();
    column
        .typed::<ByteArrayType>()
        .write_batch(&keys, Some(&definition_levels), None)
        .unwrap();
    column.close().unwrap();
    row_group.close().unwrap();
    writer.close().unwrap();
}

fn decode_hex(value: &str) -> Vec<u8> {
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).unwrap())
        .collect()
}

/// Counts WARN events emitted on the current thread while the guard lives
pub struct WarningCounter {
    count: Arc<AtomicUsize>,
    _guard: DefaultGuard,
}

impl WarningCounter {
    pub fn install() -> Self {
        let count = Arc::new(AtomicUsize::new(0));
        let layer = CountWarnings(count.clone());
        let guard = tracing::subscriber::set_default(Registry::default().with(layer));
        Self { count, _guard: guard }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

struct CountWarnings(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for CountWarnings {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Records the message of every INFO event on the current thread while it lives
pub struct MessageCapture {
    messages: Arc<Mutex<Vec<String>>>,
    _guard: DefaultGuard,
}

impl MessageCapture {
    pub fn install() -> Self {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let layer = CaptureInfo(messages.clone());
        let guard = tracing::subscriber::set_default(Registry::default().with(layer));
        Self {
            messages,
            _guard: guard,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

struct CaptureInfo(Arc<Mutex<Vec<String>>>);

impl<S: Subscriber> Layer<S> for CaptureInfo {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::INFO {
            return;
        }
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.0.lock().unwrap().push(message);
        }
    }
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}
